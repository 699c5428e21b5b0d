//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, State},
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{format_euro, Amount, ContactDetails, SurveyEntry};
use crate::error::AppError;
use crate::poller::PresenterView;

use super::context::RequestContext;
use super::export;
use super::middleware::admin_auth_middleware;
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct CreateEntryResponse {
    pub entry_id: i64,
    pub amount: Decimal,
    /// Where the attendee can leave contact details for this entry
    pub contact_url: String,
}

#[derive(Debug, Serialize)]
pub struct TotalResponse {
    pub total: Decimal,
    pub share: Decimal,
    pub share_percent: Decimal,
    pub total_display: String,
    pub share_display: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SurveyLinkResponse {
    pub survey_url: String,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub total: Decimal,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/reset", post(reset_total))
        .route("/entries", get(list_entries))
        .route("/contacts", get(list_contacts))
        .route("/entries.csv", get(export_entries))
        .route("/contacts.csv", get(export_contacts))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/entries", post(create_entry))
        .route("/entries/:entry_id/contact", post(attach_contact))
        .route("/total", get(get_total))
        .route("/survey-link", get(get_survey_link))
        .route("/presenter", get(get_presenter))
        .route("/presenter/refresh", post(refresh_presenter))
        .nest("/admin", admin_routes)
        .with_state(state)
}

// =========================================================================
// POST /entries
// =========================================================================

/// Record an estimate
async fn create_entry(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Json(request): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<CreateEntryResponse>), AppError> {
    let amount: Amount = request.amount.parse()?;

    let entry = state.service.add_entry(&amount).await?;

    tracing::debug!(
        entry_id = entry.id,
        correlation_id = %context.correlation_id,
        "Entry created via API"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateEntryResponse {
            entry_id: entry.id,
            amount: entry.amount,
            contact_url: state.links.contact_url(entry.id),
        }),
    ))
}

// =========================================================================
// POST /entries/:entry_id/contact
// =========================================================================

/// Attach contact details to an entry
async fn attach_contact(
    State(state): State<AppState>,
    Path(entry_id): Path<i64>,
    Json(contact): Json<ContactDetails>,
) -> Result<Json<SurveyEntry>, AppError> {
    let entry = state.service.attach_contact(entry_id, contact).await?;
    Ok(Json(entry))
}

// =========================================================================
// GET /total
// =========================================================================

/// Current total read straight from the store
async fn get_total(State(state): State<AppState>) -> Result<Json<TotalResponse>, AppError> {
    let snapshot = state.service.snapshot().await?;

    Ok(Json(TotalResponse {
        total: snapshot.total,
        share: snapshot.share,
        share_percent: snapshot.share_percent,
        total_display: format_euro(snapshot.total),
        share_display: format_euro(snapshot.share),
        last_updated: snapshot.last_updated,
    }))
}

// =========================================================================
// GET /survey-link
// =========================================================================

async fn get_survey_link(State(state): State<AppState>) -> Json<SurveyLinkResponse> {
    Json(SurveyLinkResponse {
        survey_url: state.links.survey_url(),
    })
}

// =========================================================================
// Presenter
// =========================================================================

/// Latest polled reading
async fn get_presenter(State(state): State<AppState>) -> Json<PresenterView> {
    Json(state.presenter.view())
}

/// Poll now instead of waiting for the next tick
async fn refresh_presenter(State(state): State<AppState>) -> StatusCode {
    state.presenter.request_refresh();
    StatusCode::ACCEPTED
}

// =========================================================================
// Admin
// =========================================================================

/// Set the running total back to zero. Entries are kept.
async fn reset_total(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> Result<Json<ResetResponse>, AppError> {
    let total = state.service.reset().await?;

    tracing::info!(
        client_ip = ?context.client_ip,
        correlation_id = %context.correlation_id,
        "Total reset by admin"
    );

    // Pick up the reset on the presenter view without waiting a full interval
    state.presenter.request_refresh();

    Ok(Json(ResetResponse { total }))
}

async fn list_entries(State(state): State<AppState>) -> Result<Json<Vec<SurveyEntry>>, AppError> {
    Ok(Json(state.service.list_all_entries().await?))
}

async fn list_contacts(
    State(state): State<AppState>,
) -> Result<Json<Vec<SurveyEntry>>, AppError> {
    Ok(Json(state.service.list_contact_entries().await?))
}

async fn export_entries(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let entries = state.service.list_all_entries().await?;
    let body = export::all_entries_csv(&entries)?;
    Ok(csv_download(export::ALL_ENTRIES_FILENAME, body))
}

async fn export_contacts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let entries = state.service.list_contact_entries().await?;
    let body = export::contacts_csv(&entries)?;
    Ok(csv_download(export::CONTACTS_FILENAME, body))
}

fn csv_download(filename: &str, body: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
}
