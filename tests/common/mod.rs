//! Common test utilities

#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use live_survey::api::{self, AdminSecret, AppState, SurveyLinks};
use live_survey::db;
use live_survey::poller::{PollerConfig, PollerHandle, TotalPoller};
use live_survey::AggregationService;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const ADMIN_PASSWORD: &str = "test_admin_123";
pub const BASE_URL: &str = "http://survey.test";

/// File-backed database in a temporary directory, removed on drop
pub struct TestDb {
    pub pool: SqlitePool,
    pub url: String,
    _dir: TempDir,
}

/// Setup test database - fresh SQLite file with migrations applied
pub async fn setup_test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("survey.db").display());

    let pool = db::connect_url(&url, 8)
        .await
        .expect("Failed to connect to DB");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    TestDb {
        pool,
        url,
        _dir: dir,
    }
}

/// Service on a fresh database with the total row bootstrapped
pub async fn setup_service() -> (TestDb, AggregationService) {
    let db = setup_test_db().await;
    let service = AggregationService::new(db.pool.clone());
    service
        .initialize()
        .await
        .expect("Failed to initialize total");
    (db, service)
}

pub struct TestApp {
    pub app: Router,
    pub service: AggregationService,
    pub poller: PollerHandle,
    pub db: TestDb,
}

/// Full router on a fresh database. The poller only polls on start and on
/// manual refresh.
pub async fn setup_test_app() -> TestApp {
    let (db, service) = setup_service().await;

    let poller = TotalPoller::spawn(
        service.clone(),
        PollerConfig {
            interval: Duration::from_secs(3600),
        },
    );

    let state = AppState::new(
        service.clone(),
        poller.feed(),
        AdminSecret::new(ADMIN_PASSWORD),
        SurveyLinks::new(BASE_URL),
    );

    TestApp {
        app: api::build_app(state),
        service,
        poller,
        db,
    }
}
