// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Router assembly.
//!
//! Layer order, outermost first: request tracer, CORS, then (for ingress
//! routes only) the rate limiter. CORS preflights are traced too.

use crate::auth::SIGNATURE_HEADER;
use crate::config::CorsConfig;
use crate::handlers::{
    enforce_rate_limit, fitness_tracker_webhook, generate_attestation, health, liveness, metrics,
    mocap_webhook, readiness, root, AppState,
};
use crate::tracer::{trace_requests, TRACE_HEADER};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

const RESERVED_PATHS: &[&str] = &[
    "/",
    "/health",
    "/health/live",
    "/health/ready",
    "/webhooks/fitness-tracker",
    "/webhooks/mocap",
    "/attestations/generate",
];

/// Build the gateway router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let ingress = Router::new()
        .route("/webhooks/fitness-tracker", post(fitness_tracker_webhook))
        .route("/webhooks/mocap", post(mocap_webhook))
        .route("/attestations/generate", post(generate_attestation))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_rate_limit,
        ));

    let mut probes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness));

    let metrics_path = state.config.metrics.path.as_str();
    if state.config.metrics.enabled {
        if metrics_path.starts_with('/') && !RESERVED_PATHS.contains(&metrics_path) {
            probes = probes.route(metrics_path, get(metrics));
        } else {
            warn!(path = %metrics_path, "Metrics path unusable, endpoint disabled");
        }
    }

    let cors = cors_layer(&state.config.cors);

    probes.merge(ingress).with_state(state).layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(trace_requests))
            .layer(cors),
    )
}

/// CORS policy for the configured browser origins.
///
/// Credentials are allowed, so a `*` entry cannot be sent as a literal
/// wildcard; it switches to echoing the request origin instead.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allow_origin = if config.allowed_origins.iter().any(|o| o.trim() == "*") {
        warn!("CORS_ORIGINS contains '*'; mirroring the request origin");
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_credentials(true)
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(SIGNATURE_HEADER),
            HeaderName::from_static(TRACE_HEADER),
        ])
        .expose_headers([HeaderName::from_static(TRACE_HEADER)])
}
