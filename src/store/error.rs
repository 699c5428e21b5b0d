//! Store Errors

/// Errors that can occur while reading or writing the survey store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No entry with this id
    #[error("Survey entry not found: {0}")]
    EntryNotFound(i64),

    /// Adding this many cents would push the total past the i64 range
    #[error("Running total overflow adding {0} cents")]
    TotalOverflow(i64),

    /// A persisted row violates a domain invariant
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Store unreachable or statement failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::EntryNotFound(_))
    }
}
