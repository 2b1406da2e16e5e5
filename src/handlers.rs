// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the kinetic gateway.
//!
//! Rate limiting runs as route middleware ahead of the webhook and
//! attestation handlers, so a rejected request never reaches signature
//! verification, hashing or issuance. Webhook handlers verify the signature
//! against the raw body bytes and only then parse them.

use crate::attestation::{AttestationIssuer, AttestationRequest, IssuedAttestation};
use crate::auth::{self, Verification, SIGNATURE_HEADER};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::event::{short_hash, EventSource, MotionEvent};
use crate::limiter::{ClientIdentity, RateLimitResult, RateLimiter};
use crate::metrics::GatewayMetrics;
use crate::tracer::{generate_trace_id, TraceContext};
use crate::validator::{validate_attestation, validate_event};
use axum::{
    body::Bytes,
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Remaining-budget header on admitted requests.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub limiter: RateLimiter,
    pub issuer: AttestationIssuer,
    pub clock: Arc<dyn Clock>,
    pub metrics: GatewayMetrics,
}

impl AppState {
    /// State with an in-memory rate-limit store and the system clock.
    pub fn new(config: Config) -> prometheus::Result<Self> {
        let limiter = RateLimiter::new(config.rate_limit.clone());
        Self::from_parts(config, limiter, Arc::new(SystemClock))
    }

    /// State over an injected limiter and clock.
    pub fn from_parts(
        config: Config,
        limiter: RateLimiter,
        clock: Arc<dyn Clock>,
    ) -> prometheus::Result<Self> {
        Ok(Self {
            issuer: AttestationIssuer::new(&config.attestation),
            metrics: GatewayMetrics::new()?,
            config,
            limiter,
            clock,
        })
    }
}

/// Webhook acceptance body.
#[derive(Debug, Serialize)]
pub struct WebhookAccepted {
    pub status: &'static str,
    pub data_hash: String,
    pub trace_id: String,
}

/// Attestation generation body.
#[derive(Debug, Serialize)]
pub struct AttestationGenerated {
    pub status: &'static str,
    #[serde(flatten)]
    pub attestation: IssuedAttestation,
}

/// Root service description.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub health: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub environment: String,
    pub services: ServiceStatus,
}

/// Configured collaborators.
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub rpc: bool,
    pub contracts: bool,
    pub webhook_auth: bool,
}

/// Liveness/readiness response.
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

fn trace_id_of(trace: Option<Extension<TraceContext>>) -> String {
    trace
        .map(|Extension(context)| context.trace_id)
        .unwrap_or_else(generate_trace_id)
}

/// Root endpoint.
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "Kinetic Ledger API Gateway",
        version: env!("CARGO_PKG_VERSION"),
        health: "/health",
    })
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        services: ServiceStatus {
            rpc: state.config.rpc_configured(),
            contracts: state.config.contracts_configured(),
            webhook_auth: state.config.secret_configured(),
        },
    })
}

/// Liveness probe.
pub async fn liveness() -> Json<ProbeResponse> {
    Json(ProbeResponse {
        status: "alive",
        reason: None,
    })
}

/// Readiness probe: requires an RPC endpoint and a webhook secret.
pub async fn readiness(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ProbeResponse>) {
    let reason = if !state.config.rpc_configured() {
        Some("RPC not configured")
    } else if !state.config.secret_configured() {
        Some("Webhook secret not configured")
    } else {
        None
    };

    match reason {
        None => (
            StatusCode::OK,
            Json(ProbeResponse {
                status: "ready",
                reason: None,
            }),
        ),
        Some(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeResponse {
                status: "not_ready",
                reason: Some(reason),
            }),
        ),
    }
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<Response> {
    let body = state
        .metrics
        .render()
        .map_err(|e| GatewayError::Internal(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
        body,
    )
        .into_response())
}

/// Sliding-window admission check, keyed by client identity.
pub async fn enforce_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let client = match request.extensions().get::<TraceContext>() {
        Some(context) => context.client.clone(),
        None => ClientIdentity::from_peer(
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr),
        ),
    };

    match state.limiter.admit(&client, state.clock.now()) {
        RateLimitResult::Allowed { remaining, .. } => {
            state.metrics.record_rate_limit(true);
            debug!(client = %client, remaining, "Request admitted");

            let mut response = next.run(request).await;
            response
                .headers_mut()
                .insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(remaining));
            response
        }
        RateLimitResult::Limited { retry_after } => {
            state.metrics.record_rate_limit(false);
            info!(
                client = %client,
                path = %request.uri().path(),
                retry_after_secs = retry_after.as_secs(),
                "rate_limit_exceeded"
            );
            GatewayError::RateLimited {
                limit: state.limiter.config().describe(),
                retry_after,
            }
            .into_response()
        }
    }
}

/// `POST /webhooks/fitness-tracker`
pub async fn fitness_tracker_webhook(
    State(state): State<Arc<AppState>>,
    trace: Option<Extension<TraceContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAccepted>> {
    ingest_event(&state, EventSource::FitnessTracker, trace_id_of(trace), &headers, &body)
}

/// `POST /webhooks/mocap`
pub async fn mocap_webhook(
    State(state): State<Arc<AppState>>,
    trace: Option<Extension<TraceContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAccepted>> {
    ingest_event(&state, EventSource::MotionCapture, trace_id_of(trace), &headers, &body)
}

/// Shared webhook pipeline: authenticate, parse, validate, hash.
pub fn ingest_event(
    state: &AppState,
    source: EventSource,
    trace_id: String,
    headers: &HeaderMap,
    raw_body: &[u8],
) -> Result<Json<WebhookAccepted>> {
    // A non-UTF-8 header is a present-but-wrong signature, not a missing one.
    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|v| v.to_str().unwrap_or_default());

    match auth::verify(raw_body, signature, &state.config.security.webhook_secret) {
        Ok(Verification::Verified) => {
            debug!(source = %source, trace_id = %trace_id, "Webhook signature verified");
        }
        Ok(Verification::SecretUnconfigured) => {
            warn!(
                source = %source,
                trace_id = %trace_id,
                "webhook_secret_unconfigured: signature verification skipped"
            );
        }
        Err(err) => {
            state.metrics.record_webhook(source.label(), "unauthorized");
            warn!(source = %source, trace_id = %trace_id, reason = %err, "webhook_auth_failed");
            return Err(err.into());
        }
    }

    let event: MotionEvent = serde_json::from_slice(raw_body).map_err(|e| {
        state.metrics.record_webhook(source.label(), "malformed");
        GatewayError::MalformedPayload(e.to_string())
    })?;

    validate_event(&event).into_result().map_err(|e| {
        state.metrics.record_webhook(source.label(), "invalid");
        GatewayError::from(e)
    })?;

    let data_hash = event.content_hash();
    state.metrics.record_webhook(source.label(), "accepted");
    info!(
        source = %source,
        trace_id = %trace_id,
        wallet = %event.wallet,
        event_type = %event.event_type,
        data_hash = %short_hash(&data_hash),
        "webhook_event_accepted"
    );

    Ok(Json(WebhookAccepted {
        status: "accepted",
        data_hash,
        trace_id,
    }))
}

/// `POST /attestations/generate`
pub async fn generate_attestation(
    State(state): State<Arc<AppState>>,
    trace: Option<Extension<TraceContext>>,
    body: Bytes,
) -> Result<Json<AttestationGenerated>> {
    let trace_id = trace_id_of(trace);

    let request: AttestationRequest = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::MalformedPayload(e.to_string()))?;

    if let Err(err) = validate_attestation(&request).into_result() {
        info!(trace_id = %trace_id, field = err.field(), error = %err, "attestation_request_rejected");
        return Err(err.into());
    }

    let attestation = state.issuer.issue(&request, &trace_id, state.clock.now());
    state.metrics.record_attestation();
    info!(
        trace_id = %trace_id,
        wallet = %request.wallet,
        nonce = attestation.nonce,
        expiry = attestation.expiry,
        "attestation_generated"
    );

    Ok(Json(AttestationGenerated {
        status: "generated",
        attestation,
    }))
}
