//! API Middleware
//!
//! Request context, admin authentication and request logging.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::error::AppError;

use super::context::{RequestContext, CORRELATION_ID_HEADER};
use super::AppState;

/// Header carrying the admin password
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

// =========================================================================
// Admin secret
// =========================================================================

/// SHA-256 digest of the admin password.
///
/// Only the digest is kept in memory; candidates are hashed and compared
/// digest to digest.
#[derive(Clone)]
pub struct AdminSecret {
    digest: [u8; 32],
}

impl AdminSecret {
    pub fn new(password: &str) -> Self {
        Self {
            digest: Sha256::digest(password.as_bytes()).into(),
        }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        candidate
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Short hex prefix of the digest, safe to log
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.digest[..4])
    }
}

impl std::fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSecret")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

// =========================================================================
// Request context
// =========================================================================

/// Attach a [`RequestContext`] to every request and echo its correlation id
pub async fn context_middleware(mut request: Request<Body>, next: Next) -> Response {
    let context = RequestContext::from_request(&request);
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;
    if let Some(value) = context.correlation_header() {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

// =========================================================================
// Admin authentication
// =========================================================================

/// Reject admin requests without the correct `X-Admin-Password`
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let context = request.extensions().get::<RequestContext>().copied();

    let authorized = request
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|candidate| state.admin.verify(candidate))
        .unwrap_or(false);

    if !authorized {
        tracing::warn!(
            uri = %request.uri(),
            client_ip = ?context.and_then(|ctx| ctx.client_ip),
            correlation_id = ?context.map(|ctx| ctx.correlation_id),
            "Rejected admin request"
        );
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &[ADMIN_PASSWORD_HEADER, "authorization", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request logging
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let headers = mask_headers_for_logging(request.headers());

    let context = request.extensions().get::<RequestContext>();
    let correlation_id = context.map(|ctx| ctx.correlation_id);
    let client_ip = context.and_then(|ctx| ctx.client_ip);

    let start = std::time::Instant::now();

    tracing::debug!(
        method = %method,
        uri = %uri,
        client_ip = ?client_ip,
        correlation_id = ?correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %start.elapsed().as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}
