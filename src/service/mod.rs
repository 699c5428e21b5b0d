//! Service module
//!
//! Operations exposed to the HTTP layer and the presenter poller.

mod aggregation;

pub use aggregation::AggregationService;
