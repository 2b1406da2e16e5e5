// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attestation nonce issuance.
//!
//! The issuer hands out a nonce/expiry envelope that downstream agents bind
//! into their signed claims. The envelope itself is **unsigned**: it is not a
//! verifiable attestation and must not be treated as a trust anchor.
//!
//! Nonces are wall-clock seconds, so two requests within the same second
//! receive the same nonce.

use crate::config::AttestationConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Request body for `/attestations/generate`.
///
/// Scores are basis points. They are taken as raw JSON numbers so that
/// fractional or oversized values reach
/// [`crate::validator::validate_attestation`] and are reported per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestationRequest {
    pub embedding_hash: String,
    pub novelty_score: Number,
    pub confidence_score: Number,
    pub wallet: String,
    #[serde(default)]
    pub compliance: Map<String, Value>,
}

/// Nonce/expiry envelope returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedAttestation {
    /// Unix seconds at issuance
    pub nonce: i64,
    /// Unix seconds after which the envelope is stale
    pub expiry: i64,
    pub trace_id: String,
}

/// Issues attestation envelopes.
#[derive(Debug, Clone)]
pub struct AttestationIssuer {
    lifetime_secs: i64,
}

impl AttestationIssuer {
    pub fn new(config: &AttestationConfig) -> Self {
        Self {
            // Keeps expiry > nonce for a zero lifetime
            lifetime_secs: i64::try_from(config.lifetime_secs)
                .unwrap_or(i64::MAX)
                .max(1),
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Issue an envelope for a validated request.
    pub fn issue(
        &self,
        _request: &AttestationRequest,
        trace_id: &str,
        now: DateTime<Utc>,
    ) -> IssuedAttestation {
        // timestamp() floors toward negative infinity
        let nonce = now.timestamp();
        IssuedAttestation {
            nonce,
            expiry: nonce.saturating_add(self.lifetime_secs),
            trace_id: trace_id.to_string(),
        }
    }
}

impl Default for AttestationIssuer {
    fn default() -> Self {
        Self::new(&AttestationConfig::default())
    }
}
