//! Request context
//!
//! Correlation id and peer address, attached to every API request so handler
//! and middleware log lines can be tied together.

use std::net::{IpAddr, SocketAddr};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, HeaderValue, Request},
};
use uuid::Uuid;

/// Header carrying the request correlation id
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub correlation_id: Uuid,
    /// Absent when the router is driven without a socket
    pub client_ip: Option<IpAddr>,
}

impl RequestContext {
    /// Context for an incoming request. A missing or malformed
    /// `X-Correlation-Id` gets a fresh id.
    pub fn from_request(request: &Request<Body>) -> Self {
        let correlation_id = correlation_id_from(request.headers()).unwrap_or_else(Uuid::new_v4);
        let client_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());

        Self {
            correlation_id,
            client_ip,
        }
    }

    /// Value echoed back in the `X-Correlation-Id` response header
    pub fn correlation_header(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.correlation_id.to_string()).ok()
    }
}

fn correlation_id_from(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
}
