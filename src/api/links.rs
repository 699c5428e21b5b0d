//! Survey links
//!
//! Deep links into the survey UI. The UI decides what each `view` shows; the
//! API only builds the URLs (the survey link is what the QR code encodes).

/// Builds the public links handed out to attendees
#[derive(Debug, Clone)]
pub struct SurveyLinks {
    base_url: String,
}

impl SurveyLinks {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Link to the estimate form
    pub fn survey_url(&self) -> String {
        format!("{}/?view=survey_form", self.base_url)
    }

    /// Link to the thank-you page that offers to leave contact details
    pub fn contact_url(&self, entry_id: i64) -> String {
        format!(
            "{}/?view=thank_you_with_contact_option&entry_id={}",
            self.base_url, entry_id
        )
    }
}
