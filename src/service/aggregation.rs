//! Aggregation Service
//!
//! Keeps the running total consistent with the entry ledger. This is the only
//! writer of the total; the API and the presenter poller go through it.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::domain::{Amount, ContactDetails, SurveyEntry, TotalSnapshot, DEFAULT_SHARE_PERCENT};
use crate::error::{AppError, AppResult};
use crate::store::{EntryStore, TotalStore};

/// Service owning the entry ledger and the running total
#[derive(Debug, Clone)]
pub struct AggregationService {
    pool: SqlitePool,
    entries: EntryStore,
    totals: TotalStore,
    share_percent: Decimal,
}

impl AggregationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            entries: EntryStore::new(pool.clone()),
            totals: TotalStore::new(pool.clone()),
            pool,
            share_percent: DEFAULT_SHARE_PERCENT,
        }
    }

    /// Use a different share percentage for snapshots
    pub fn with_share_percent(mut self, share_percent: Decimal) -> Self {
        self.share_percent = share_percent;
        self
    }

    /// Make sure the total row exists. Called once at startup before serving.
    pub async fn initialize(&self) -> AppResult<()> {
        if self.totals.bootstrap().await? {
            tracing::info!("Running total initialized at 0");
        } else {
            tracing::debug!("Running total already initialized");
        }
        Ok(())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Validate `amount` and record it. Returns the new entry id.
    pub async fn create_entry(&self, amount: Decimal) -> AppResult<i64> {
        let amount = Amount::new(amount)?;
        let entry = self.add_entry(&amount).await?;
        Ok(entry.id)
    }

    /// Record an entry and add its amount to the total in one transaction.
    ///
    /// Either both the entry and the increment commit or neither does, so a
    /// failed submission can simply be resubmitted.
    pub async fn add_entry(&self, amount: &Amount) -> AppResult<SurveyEntry> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let entry = self.entries.insert(&mut tx, amount, now).await?;
        self.totals
            .increment(&mut tx, amount.to_minor_units(), now)
            .await?;

        tx.commit().await?;

        tracing::info!(
            entry_id = entry.id,
            amount = %amount,
            "Survey entry recorded"
        );

        Ok(entry)
    }

    /// Attach contact details to an existing entry. The total is not touched.
    pub async fn attach_contact(
        &self,
        entry_id: i64,
        contact: ContactDetails,
    ) -> AppResult<SurveyEntry> {
        let contact = contact.normalized();
        if contact.is_empty() {
            tracing::debug!(entry_id, "Contact form submitted without any details");
        }

        match self.entries.attach_contact(entry_id, &contact).await {
            Ok(entry) => {
                tracing::info!(entry_id, "Contact details attached");
                Ok(entry)
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(entry_id, "Contact details for unknown entry");
                Err(AppError::EntryNotFound(entry_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Set the total to zero. Entry history is kept.
    pub async fn reset(&self) -> AppResult<Decimal> {
        let total = self.totals.reset().await?;

        tracing::warn!(last_updated = %total.last_updated, "Running total reset");

        Ok(total.current_total)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current total, bootstrapping the total row on first access
    pub async fn get_total(&self) -> AppResult<Decimal> {
        Ok(self.snapshot().await?.total)
    }

    /// Current total with its derived share
    pub async fn snapshot(&self) -> AppResult<TotalSnapshot> {
        let aggregate = match self.totals.read().await? {
            Some(aggregate) => aggregate,
            None => {
                self.totals.bootstrap().await?;
                self.totals
                    .read()
                    .await?
                    .ok_or_else(|| AppError::Internal("Total row missing after bootstrap".to_string()))?
            }
        };

        Ok(TotalSnapshot::new(aggregate, self.share_percent))
    }

    pub async fn list_contact_entries(&self) -> AppResult<Vec<SurveyEntry>> {
        Ok(self.entries.list_with_contact().await?)
    }

    pub async fn list_all_entries(&self) -> AppResult<Vec<SurveyEntry>> {
        Ok(self.entries.list_all().await?)
    }

    pub async fn find_entry(&self, entry_id: i64) -> AppResult<Option<SurveyEntry>> {
        Ok(self.entries.find(entry_id).await?)
    }

    pub async fn count_entries(&self) -> AppResult<i64> {
        Ok(self.entries.count().await?)
    }
}
