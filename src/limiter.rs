// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding-window rate limiter keyed by client identity.
//!
//! Each client owns an ordered sequence of admission timestamps. On every
//! check the sequence is pruned to the trailing window, compared against the
//! limit and, only when admitted, extended with the new timestamp. Rejected
//! attempts are never recorded, so they do not count against later windows.
//!
//! State lives behind the [`WindowStore`] trait. [`InMemoryWindowStore`] is a
//! sharded map; the prune-check-append sequence for one client runs under that
//! client's shard lock, so concurrent checks for the same client serialize
//! while different clients mostly land on different shards.

use crate::config::RateLimitConfig;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Floor for `retry_after` on a rejection.
const MIN_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Rate-limit key for an inbound request, the remote network address.
///
/// Never empty: requests without a known peer share the `"unknown"` identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::unknown()
        } else {
            Self(value)
        }
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    /// Identity for a peer address; the port is dropped so that reconnects
    /// from the same host share one window.
    pub fn from_peer(addr: Option<&SocketAddr>) -> Self {
        match addr {
            Some(addr) => Self(addr.ip().to_string()),
            None => Self::unknown(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in the current window
        remaining: u32,
        /// Time until the oldest recorded request leaves the window
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until a slot frees up
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Limit applied by a [`WindowStore`].
#[derive(Debug, Clone, Copy)]
pub struct WindowPolicy {
    pub max_requests: u32,
    pub window: chrono::Duration,
}

impl From<&RateLimitConfig> for WindowPolicy {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: i64::try_from(config.window_secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .unwrap_or(chrono::Duration::MAX),
        }
    }
}

/// Storage backend for per-client request windows.
///
/// Implementations must make `admit` atomic per identity: two concurrent calls
/// for the same identity must not both pass against the same stale count.
pub trait WindowStore: Send + Sync {
    /// Prune, check and (when allowed) record one admission attempt.
    fn admit(
        &self,
        identity: &ClientIdentity,
        now: DateTime<Utc>,
        policy: WindowPolicy,
    ) -> RateLimitResult;

    /// Drop identities with no timestamp inside the window ending at `now`.
    /// Returns how many identities were removed.
    fn evict_idle(&self, now: DateTime<Utc>, window: chrono::Duration) -> usize;

    /// Number of identities currently tracked.
    fn tracked_clients(&self) -> usize;
}

/// In-process sharded store.
#[derive(Debug, Default)]
pub struct InMemoryWindowStore {
    windows: DashMap<ClientIdentity, VecDeque<DateTime<Utc>>>,
}

impl InMemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowStore for InMemoryWindowStore {
    fn admit(
        &self,
        identity: &ClientIdentity,
        now: DateTime<Utc>,
        policy: WindowPolicy,
    ) -> RateLimitResult {
        let window_start = window_start(now, policy.window);

        // Shard write lock held until `entry` drops.
        let mut entry = self.windows.entry(identity.clone()).or_default();
        let timestamps = entry.value_mut();

        // retain rather than pop_front: wall-clock time can step backwards
        timestamps.retain(|t| *t >= window_start);

        let oldest = timestamps.iter().min().copied();
        let until_slot_frees = |oldest: Option<DateTime<Utc>>| match oldest {
            Some(t) => t
                .checked_add_signed(policy.window)
                .map_or(Duration::MAX, |frees_at| {
                    (frees_at - now).to_std().unwrap_or(Duration::ZERO)
                }),
            None => policy.window.to_std().unwrap_or(Duration::ZERO),
        };

        let count = u32::try_from(timestamps.len()).unwrap_or(u32::MAX);
        if count >= policy.max_requests {
            // The oldest timestamp is still inside at exactly now - window
            return RateLimitResult::Limited {
                retry_after: until_slot_frees(oldest).max(MIN_RETRY_AFTER),
            };
        }

        timestamps.push_back(now);
        RateLimitResult::Allowed {
            remaining: policy.max_requests - count - 1,
            reset_in: until_slot_frees(oldest.or(Some(now))),
        }
    }

    fn evict_idle(&self, now: DateTime<Utc>, window: chrono::Duration) -> usize {
        let window_start = window_start(now, window);
        let before = self.windows.len();
        self.windows
            .retain(|_, timestamps| timestamps.iter().any(|t| *t >= window_start));
        before.saturating_sub(self.windows.len())
    }

    fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

fn window_start(now: DateTime<Utc>, window: chrono::Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Thread-safe sliding-window rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn WindowStore>,
}

impl RateLimiter {
    /// Create a rate limiter backed by an in-memory store.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryWindowStore::new()))
    }

    /// Create a rate limiter over an injected store.
    pub fn with_store(config: RateLimitConfig, store: Arc<dyn WindowStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and record one request from `identity` at `now`.
    pub fn admit(&self, identity: &ClientIdentity, now: DateTime<Utc>) -> RateLimitResult {
        let result = self
            .store
            .admit(identity, now, WindowPolicy::from(&self.config));

        if let RateLimitResult::Limited { retry_after } = &result {
            debug!(client = %identity, ?retry_after, "Client rate limit exceeded");
        }
        result
    }

    /// Remove idle clients (called periodically).
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let removed = self
            .store
            .evict_idle(now, WindowPolicy::from(&self.config).window);
        if removed > 0 {
            debug!(removed, remaining = self.store.tracked_clients(), "Evicted idle clients");
        }
        removed
    }

    pub fn tracked_clients(&self) -> usize {
        self.store.tracked_clients()
    }
}
