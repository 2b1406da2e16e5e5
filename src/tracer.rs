// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request tracing and correlation.
//!
//! Every request gets a [`TraceContext`]: the inbound `X-Trace-ID` when it is
//! usable, otherwise a fresh UUID. The context is stored in request extensions
//! for handlers, start and end events are logged, and the id is echoed in the
//! response `X-Trace-ID` header. Tracing never changes the response outcome.

use crate::limiter::ClientIdentity;
use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Correlation header, inbound and outbound.
pub const TRACE_HEADER: &str = "x-trace-id";

const MAX_TRACE_ID_LEN: usize = 128;

/// Per-request trace context.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
    pub client: ClientIdentity,
    pub started: Instant,
}

impl TraceContext {
    /// Build a context from inbound headers and the peer address.
    pub fn from_parts(headers: &HeaderMap, peer: Option<&SocketAddr>) -> Self {
        Self {
            trace_id: inbound_trace_id(headers).unwrap_or_else(generate_trace_id),
            client: ClientIdentity::from_peer(peer),
            started: Instant::now(),
        }
    }
}

/// Accept a caller-supplied id only if it is short printable ASCII.
fn inbound_trace_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(TRACE_HEADER)?.to_str().ok()?.trim();
    let usable = !value.is_empty()
        && value.len() <= MAX_TRACE_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic());
    usable.then(|| value.to_string())
}

pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Middleware wrapping every request.
pub async fn trace_requests(mut request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let context = TraceContext::from_parts(request.headers(), peer.as_ref());

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    info!(
        method = %method,
        path = %path,
        trace_id = %context.trace_id,
        client = %context.client,
        "http_request_received"
    );

    let trace_id = context.trace_id.clone();
    let client = context.client.clone();
    let started = context.started;
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    match HeaderValue::from_str(&trace_id) {
        Ok(value) => {
            response.headers_mut().insert(TRACE_HEADER, value);
        }
        Err(e) => warn!(trace_id = %trace_id, error = %e, "Could not echo trace id"),
    }

    info!(
        method = %method,
        path = %path,
        trace_id = %trace_id,
        client = %client,
        status_code = response.status().as_u16(),
        duration_ms = started.elapsed().as_secs_f64() * 1000.0,
        "http_response_sent"
    );

    response
}
