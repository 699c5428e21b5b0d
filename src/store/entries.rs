//! Entry Store
//!
//! Survey entries table: creation inside the caller's transaction, contact
//! attachment as a single statement, and the admin listings.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

use crate::domain::{decimal_from_minor_units, Amount, ContactDetails, SurveyEntry};

use super::StoreError;

/// Columns selected for every entry read
const ENTRY_COLUMNS: &str = "id, amount_cents, contact_name, contact_company, contact_email, \
                             contact_phone, has_contact, created_at";

/// Raw row from `survey_entries`
#[derive(Debug, FromRow)]
struct EntryRow {
    id: i64,
    amount_cents: i64,
    contact_name: Option<String>,
    contact_company: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    has_contact: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<EntryRow> for SurveyEntry {
    type Error = StoreError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        if row.amount_cents < 0 {
            return Err(StoreError::CorruptRow(format!(
                "entry {} has negative amount {}",
                row.id, row.amount_cents
            )));
        }

        Ok(SurveyEntry {
            id: row.id,
            amount: decimal_from_minor_units(row.amount_cents),
            contact: ContactDetails {
                name: row.contact_name,
                company: row.contact_company,
                email: row.contact_email,
                phone: row.contact_phone,
            },
            has_contact: row.has_contact,
            created_at: row.created_at,
        })
    }
}

fn into_entries(rows: Vec<EntryRow>) -> Result<Vec<SurveyEntry>, StoreError> {
    rows.into_iter().map(SurveyEntry::try_from).collect()
}

/// Store for survey entries
#[derive(Debug, Clone)]
pub struct EntryStore {
    pool: SqlitePool,
}

impl EntryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new entry without contact details.
    ///
    /// Runs inside the caller's transaction so the total increment can commit
    /// together with it.
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        amount: &Amount,
        created_at: DateTime<Utc>,
    ) -> Result<SurveyEntry, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO survey_entries (amount_cents, has_contact, created_at)
            VALUES (?1, 0, ?2)
            RETURNING {ENTRY_COLUMNS}
            "#
        );

        let row: EntryRow = sqlx::query_as(&sql)
            .bind(amount.to_minor_units())
            .bind(created_at)
            .fetch_one(&mut **tx)
            .await?;

        SurveyEntry::try_from(row)
    }

    /// Overwrite the contact fields of an entry and mark it as having contact.
    ///
    /// Absent fields are stored as NULL, so repeated calls are last-write-wins.
    /// The amount is never touched.
    pub async fn attach_contact(
        &self,
        entry_id: i64,
        contact: &ContactDetails,
    ) -> Result<SurveyEntry, StoreError> {
        let sql = format!(
            r#"
            UPDATE survey_entries
            SET
                contact_name = ?1,
                contact_company = ?2,
                contact_email = ?3,
                contact_phone = ?4,
                has_contact = 1
            WHERE id = ?5
            RETURNING {ENTRY_COLUMNS}
            "#
        );

        let row: Option<EntryRow> = sqlx::query_as(&sql)
            .bind(&contact.name)
            .bind(&contact.company)
            .bind(&contact.email)
            .bind(&contact.phone)
            .bind(entry_id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(StoreError::EntryNotFound(entry_id))
            .and_then(SurveyEntry::try_from)
    }

    pub async fn find(&self, entry_id: i64) -> Result<Option<SurveyEntry>, StoreError> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM survey_entries WHERE id = ?1");

        let row: Option<EntryRow> = sqlx::query_as(&sql)
            .bind(entry_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SurveyEntry::try_from).transpose()
    }

    /// Entries that have contact details, newest first
    pub async fn list_with_contact(&self) -> Result<Vec<SurveyEntry>, StoreError> {
        let sql = format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM survey_entries
            WHERE has_contact = 1
            ORDER BY created_at DESC, id DESC
            "#
        );

        let rows: Vec<EntryRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        into_entries(rows)
    }

    /// Every entry, newest first
    pub async fn list_all(&self) -> Result<Vec<SurveyEntry>, StoreError> {
        let sql = format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM survey_entries
            ORDER BY created_at DESC, id DESC
            "#
        );

        let rows: Vec<EntryRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        into_entries(rows)
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM survey_entries")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
