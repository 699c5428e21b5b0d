//! Presenter poller
//!
//! Re-reads the running total on a fixed cadence and on manual refresh, and
//! publishes the latest reading for the presenter view. Purely a reader: a
//! failed read is shown as "value unavailable" and retried on the next tick.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::domain::{format_euro, TotalSnapshot};
use crate::error::AppResult;
use crate::service::AggregationService;

/// Shown instead of a number when the total cannot be read
pub const UNAVAILABLE_TEXT: &str = "value unavailable";

/// Shown before the first read completes
pub const PENDING_TEXT: &str = "loading";

/// Anything the poller can read a total from
#[async_trait]
pub trait TotalSource: Send + Sync + 'static {
    async fn fetch_snapshot(&self) -> AppResult<TotalSnapshot>;
}

#[async_trait]
impl TotalSource for AggregationService {
    async fn fetch_snapshot(&self) -> AppResult<TotalSnapshot> {
        self.snapshot().await
    }
}

/// Latest result of polling the total
#[derive(Debug, Clone, PartialEq)]
pub enum TotalReading {
    /// No poll has completed yet
    Pending,
    Available {
        snapshot: TotalSnapshot,
        fetched_at: DateTime<Utc>,
    },
    Unavailable {
        reason: String,
        /// First failed poll of the current outage
        since: DateTime<Utc>,
    },
}

impl TotalReading {
    pub fn is_available(&self) -> bool {
        matches!(self, TotalReading::Available { .. })
    }

    pub fn total(&self) -> Option<Decimal> {
        match self {
            TotalReading::Available { snapshot, .. } => Some(snapshot.total),
            _ => None,
        }
    }

    /// Render the reading for display
    pub fn render(&self, refresh_interval: Duration) -> PresenterView {
        let refresh_interval_secs = refresh_interval.as_secs();

        match self {
            TotalReading::Available {
                snapshot,
                fetched_at,
            } => PresenterView {
                available: true,
                total: Some(snapshot.total),
                share: Some(snapshot.share),
                share_percent: Some(snapshot.share_percent),
                total_display: format_euro(snapshot.total),
                share_display: format_euro(snapshot.share),
                fetched_at: Some(*fetched_at),
                unavailable_since: None,
                refresh_interval_secs,
            },
            TotalReading::Unavailable { since, .. } => PresenterView {
                available: false,
                total: None,
                share: None,
                share_percent: None,
                total_display: UNAVAILABLE_TEXT.to_string(),
                share_display: UNAVAILABLE_TEXT.to_string(),
                fetched_at: None,
                unavailable_since: Some(*since),
                refresh_interval_secs,
            },
            TotalReading::Pending => PresenterView {
                available: false,
                total: None,
                share: None,
                share_percent: None,
                total_display: PENDING_TEXT.to_string(),
                share_display: PENDING_TEXT.to_string(),
                fetched_at: None,
                unavailable_since: None,
                refresh_interval_secs,
            },
        }
    }
}

/// What the presenter view displays
#[derive(Debug, Clone, Serialize)]
pub struct PresenterView {
    pub available: bool,
    pub total: Option<Decimal>,
    pub share: Option<Decimal>,
    pub share_percent: Option<Decimal>,
    pub total_display: String,
    pub share_display: String,
    pub fetched_at: Option<DateTime<Utc>>,
    pub unavailable_since: Option<DateTime<Utc>>,
    pub refresh_interval_secs: u64,
}

/// Configuration for the poller
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between automatic polls
    pub interval: Duration,
}

/// Cheap, cloneable read side of a running poller
#[derive(Debug, Clone)]
pub struct PresenterFeed {
    readings: watch::Receiver<TotalReading>,
    refresh: Arc<Notify>,
    interval: Duration,
}

impl PresenterFeed {
    /// Most recent reading, rendered
    pub fn view(&self) -> PresenterView {
        self.readings.borrow().render(self.interval)
    }

    /// Ask the poller to read now instead of waiting for the next tick
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn subscribe(&self) -> watch::Receiver<TotalReading> {
        self.readings.clone()
    }
}

/// Handle to the background poll task
#[derive(Debug)]
pub struct PollerHandle {
    feed: PresenterFeed,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn feed(&self) -> PresenterFeed {
        self.feed.clone()
    }

    /// Stop polling and wait for the task to finish
    pub async fn shutdown(self) {
        self.task.abort();
        // Cancellation is the expected outcome here
        let _ = self.task.await;
        tracing::info!("Total poller stopped");
    }
}

/// Polls a [`TotalSource`] and publishes [`TotalReading`]s
pub struct TotalPoller<S> {
    source: Arc<S>,
    config: PollerConfig,
    readings: watch::Sender<TotalReading>,
    refresh: Arc<Notify>,
}

impl<S: TotalSource> TotalPoller<S> {
    /// Start polling in the background. The first poll happens immediately.
    pub fn spawn(source: S, config: PollerConfig) -> PollerHandle {
        let (readings, receiver) = watch::channel(TotalReading::Pending);
        let refresh = Arc::new(Notify::new());

        let feed = PresenterFeed {
            readings: receiver,
            refresh: refresh.clone(),
            interval: config.interval,
        };

        let poller = Self {
            source: Arc::new(source),
            config,
            readings,
            refresh,
        };

        let task = tokio::spawn(async move {
            poller.run().await;
        });

        PollerHandle { feed, task }
    }

    async fn run(&self) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            "Total poller started"
        );

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.refresh.notified() => {
                    tracing::debug!("Manual total refresh requested");
                    ticker.reset();
                }
            }

            let reading = self.poll_once().await;
            let recovered = reading.is_available()
                && matches!(*self.readings.borrow(), TotalReading::Unavailable { .. });
            if recovered {
                tracing::info!(total = ?reading.total(), "Running total available again");
            }

            if self.readings.send(reading).is_err() {
                tracing::debug!("No presenter feeds left, stopping poller");
                break;
            }
        }
    }

    async fn poll_once(&self) -> TotalReading {
        match self.source.fetch_snapshot().await {
            Ok(snapshot) => TotalReading::Available {
                snapshot,
                fetched_at: Utc::now(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Running total unavailable");

                let since = match &*self.readings.borrow() {
                    TotalReading::Unavailable { since, .. } => *since,
                    _ => Utc::now(),
                };

                TotalReading::Unavailable {
                    reason: e.to_string(),
                    since,
                }
            }
        }
    }
}
