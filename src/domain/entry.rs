//! Survey entries
//!
//! A single submitted estimate and the contact details that may be attached
//! to it afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Contact details an attendee may leave after submitting an estimate.
///
/// Every field is optional. Blank input is treated the same as no input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ContactDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Trim every field and drop the ones that end up empty.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            name: clean(self.name),
            company: clean(self.company),
            email: clean(self.email),
            phone: clean(self.phone),
        }
    }

    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.company.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// A persisted survey submission.
///
/// `amount` and `created_at` never change after creation; only the contact
/// fields and `has_contact` do, through contact attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyEntry {
    pub id: i64,
    pub amount: Decimal,
    #[serde(flatten)]
    pub contact: ContactDetails,
    pub has_contact: bool,
    pub created_at: DateTime<Utc>,
}
