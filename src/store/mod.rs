//! Store module
//!
//! Persistence for survey entries and the running total (SQLite).
//! The store is the single source of truth; nothing is cached in-process.

mod entries;
mod error;
mod totals;

pub use entries::EntryStore;
pub use error::StoreError;
pub use totals::TotalStore;
