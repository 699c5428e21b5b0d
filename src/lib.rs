//! live_survey Library
//!
//! Re-exports modules for integration testing and the binaries.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod poller;
pub mod service;
pub mod store;

mod error;

pub use config::Config;
pub use domain::{Amount, AmountError, ContactDetails, SurveyEntry, TotalSnapshot};
pub use error::{AppError, AppResult, ErrorResponse};
pub use service::AggregationService;
