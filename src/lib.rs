// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Kinetic Gateway
//!
//! Ingress gateway for motion-event webhooks from fitness trackers and
//! motion-capture rigs:
//!
//! - Per-client sliding-window rate limiting (100 requests / 60 s default)
//! - HMAC-SHA256 webhook signature verification (`X-Signature`)
//! - Request correlation via `X-Trace-ID`
//! - Content hashing of accepted motion payloads
//! - Nonce/expiry envelopes for attestation requests (unsigned)

pub mod attestation;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod routes;
pub mod tracer;
pub mod validator;

pub use config::Config;
pub use error::GatewayError;
pub use handlers::AppState;
pub use limiter::{ClientIdentity, RateLimitResult, RateLimiter};
pub use routes::build_router;
pub use validator::{ValidationError, ValidationResult};
