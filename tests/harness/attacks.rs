// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Attack simulation patterns for security testing.

/// How the simulated sender signs its webhooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signing {
    /// Correct HMAC over the exact body
    Valid,
    /// Signature header variants crafted without the secret
    Forged,
    /// No signature header at all
    Unsigned,
    /// Valid signature for a body that is then altered by one byte
    Tampered,
}

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of unique client addresses to simulate
    pub unique_clients: usize,
    /// Number of distinct event payloads
    pub unique_events: usize,
    /// Simulated milliseconds between requests
    pub spacing_ms: i64,
    /// Signing behaviour
    pub signing: Signing,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_clients: 1,
            unique_events: 10,
            spacing_ms: 100,
            signing: Signing::Valid,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single client flood - basic DoS from one address.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 250,
            spacing_ms: 10,
            ..Default::default()
        }
    }

    /// Distributed traffic - many clients, each well under the limit.
    pub fn distributed_attack() -> Self {
        Self {
            total_requests: 500,
            unique_clients: 100,
            unique_events: 50,
            spacing_ms: 20,
            ..Default::default()
        }
    }

    /// Forged signatures from a handful of clients.
    pub fn forged_signatures() -> Self {
        Self {
            total_requests: 60,
            unique_clients: 5,
            signing: Signing::Forged,
            ..Default::default()
        }
    }

    /// Unsigned webhooks.
    pub fn unsigned_flood() -> Self {
        Self {
            total_requests: 50,
            unique_clients: 5,
            signing: Signing::Unsigned,
            ..Default::default()
        }
    }

    /// Replayed signatures over modified bodies.
    pub fn tampered_replay() -> Self {
        Self {
            total_requests: 50,
            unique_clients: 5,
            unique_events: 1,
            signing: Signing::Tampered,
            ..Default::default()
        }
    }

    /// Slow drip - one client staying under the limit across several windows.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 300,
            spacing_ms: 700, // ~86 per minute < 100 limit
            ..Default::default()
        }
    }
}
