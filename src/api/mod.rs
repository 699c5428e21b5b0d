//! API module
//!
//! HTTP API endpoints and middleware.

pub mod context;
pub mod export;
pub mod links;
pub mod middleware;
pub mod routes;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::poller::PresenterFeed;
use crate::service::AggregationService;

pub use context::RequestContext;
pub use links::SurveyLinks;
pub use middleware::AdminSecret;
pub use routes::create_router;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: AggregationService,
    pub presenter: PresenterFeed,
    pub admin: AdminSecret,
    pub links: SurveyLinks,
}

impl AppState {
    pub fn new(
        service: AggregationService,
        presenter: PresenterFeed,
        admin: AdminSecret,
        links: SurveyLinks,
    ) -> Self {
        Self {
            service,
            presenter,
            admin,
            links,
        }
    }
}

/// Build the full application router
pub fn build_app(state: AppState) -> Router {
    // ServiceBuilder runs top to bottom: context -> logging -> handler
    let api_routes = create_router(state).layer(
        ServiceBuilder::new()
            .layer(axum_middleware::from_fn(middleware::context_middleware))
            .layer(axum_middleware::from_fn(middleware::logging_middleware)),
    );

    Router::new()
        // Health check (no auth)
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
