// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Request-boundary validation.
//!
//! Implements input checks that run before any business logic:
//! - Basis-point scores within `0..=10000`
//! - Required identifiers present (wallet, embedding hash, event type)
//! - Non-negative event timestamps

use crate::attestation::AttestationRequest;
use crate::event::MotionEvent;
use serde_json::Number;
use thiserror::Error;
use tracing::debug;

/// Upper bound for basis-point scores (100.00%).
pub const MAX_BASIS_POINTS: i64 = 10_000;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{field} must be an integer between 0 and 10000 basis points, got {value}")]
    BasisPointsOutOfRange { field: &'static str, value: String },

    #[error("timestamp must not be negative, got {0}")]
    NegativeTimestamp(i64),
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) => *field,
            Self::BasisPointsOutOfRange { field, .. } => *field,
            Self::NegativeTimestamp(_) => "timestamp",
        }
    }
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Request is valid
    Valid,
    /// Request is invalid
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(e) => Err(e),
        }
    }
}

/// Check a basis-point score: an integer in `0..=10000`.
pub fn validate_basis_points(field: &'static str, value: &Number) -> ValidationResult {
    match value.as_i64() {
        Some(points) if (0..=MAX_BASIS_POINTS).contains(&points) => ValidationResult::Valid,
        _ => {
            debug!(field, value = %value, "Basis points out of range");
            ValidationResult::Invalid(ValidationError::BasisPointsOutOfRange {
                field,
                value: value.to_string(),
            })
        }
    }
}

fn require(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        debug!(field, "Missing required field");
        ValidationResult::Invalid(ValidationError::MissingField(field))
    } else {
        ValidationResult::Valid
    }
}

/// Validate an attestation request before issuance.
pub fn validate_attestation(request: &AttestationRequest) -> ValidationResult {
    let checks = [
        require("wallet", &request.wallet),
        require("embedding_hash", &request.embedding_hash),
        validate_basis_points("novelty_score", &request.novelty_score),
        validate_basis_points("confidence_score", &request.confidence_score),
    ];

    checks
        .into_iter()
        .find(|r| !r.is_valid())
        .unwrap_or(ValidationResult::Valid)
}

/// Validate a parsed motion event.
pub fn validate_event(event: &MotionEvent) -> ValidationResult {
    let wallet = require("wallet", &event.wallet);
    if !wallet.is_valid() {
        return wallet;
    }

    let event_type = require("event_type", &event.event_type);
    if !event_type.is_valid() {
        return event_type;
    }

    if event.timestamp < 0 {
        debug!(timestamp = event.timestamp, "Negative event timestamp");
        return ValidationResult::Invalid(ValidationError::NegativeTimestamp(event.timestamp));
    }

    ValidationResult::Valid
}
