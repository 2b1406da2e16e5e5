// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the kinetic gateway.
//!
//! Every value is runtime-configurable. [`Config::from_env`] reads process
//! environment variables; [`Config::from_lookup`] accepts any lookup so tests
//! can supply values without touching the environment.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Configuration for the gateway service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8000)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Deployment environment label (default: development)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Webhook authentication configuration
    #[serde(default)]
    pub security: SecurityConfig,

    /// Settlement chain configuration
    #[serde(default)]
    pub chain: ChainConfig,

    /// Attestation issuance configuration
    #[serde(default)]
    pub attestation: AttestationConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Downstream agent service URL
    #[serde(default = "default_agent_service_url")]
    pub agent_service_url: String,
}

/// Sliding-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per client within one window (default: 100)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Length of the trailing window in seconds (default: 60)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Interval between idle-client sweeps in seconds (default: 60)
    #[serde(default = "default_eviction_interval_secs")]
    pub eviction_interval_secs: u64,
}

/// Webhook authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Shared HMAC secret. Empty disables signature verification.
    #[serde(default)]
    pub webhook_secret: String,
}

/// Settlement chain configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Chain id (default: 421614)
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// AttestedMotion contract address, empty until deployed
    #[serde(default)]
    pub attested_motion_address: String,

    /// RewardsEscrow contract address, empty until deployed
    #[serde(default)]
    pub rewards_escrow_address: String,
}

/// Attestation issuance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationConfig {
    /// Seconds between nonce and expiry (default: 300)
    #[serde(default = "default_attestation_lifetime_secs")]
    pub lifetime_secs: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed browser origins
    #[serde(default = "default_cors_origins")]
    pub allowed_origins: Vec<String>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_max_requests() -> u32 {
    100
}

fn default_window_secs() -> u64 {
    60
}

fn default_eviction_interval_secs() -> u64 {
    60
}

fn default_rpc_url() -> String {
    "https://rpc.arc-testnet.circle.com".to_string()
}

fn default_chain_id() -> u64 {
    421614
}

fn default_attestation_lifetime_secs() -> u64 {
    300
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
    ]
}

fn default_agent_service_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            environment: default_environment(),
            rate_limit: RateLimitConfig::default(),
            security: SecurityConfig::default(),
            chain: ChainConfig::default(),
            attestation: AttestationConfig::default(),
            cors: CorsConfig::default(),
            metrics: MetricsConfig::default(),
            agent_service_url: default_agent_service_url(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            eviction_interval_secs: default_eviction_interval_secs(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            attested_motion_address: String::new(),
            rewards_escrow_address: String::new(),
        }
    }
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            lifetime_secs: default_attestation_lifetime_secs(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_cors_origins(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Missing or unparseable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            rate_limit: RateLimitConfig {
                max_requests: parse_var(&lookup, "RATE_LIMIT_REQUESTS")
                    .unwrap_or(defaults.rate_limit.max_requests),
                window_secs: parse_var(&lookup, "RATE_LIMIT_WINDOW_SECONDS")
                    .unwrap_or(defaults.rate_limit.window_secs),
                eviction_interval_secs: parse_var(&lookup, "RATE_LIMIT_EVICTION_SECONDS")
                    .unwrap_or(defaults.rate_limit.eviction_interval_secs),
            },
            security: SecurityConfig {
                webhook_secret: lookup("WEBHOOK_SECRET").unwrap_or_default(),
            },
            chain: ChainConfig {
                rpc_url: lookup("ARC_RPC_URL").unwrap_or(defaults.chain.rpc_url),
                chain_id: parse_var(&lookup, "ARC_CHAIN_ID").unwrap_or(defaults.chain.chain_id),
                attested_motion_address: lookup("ATTESTED_MOTION_ADDRESS").unwrap_or_default(),
                rewards_escrow_address: lookup("REWARDS_ESCROW_ADDRESS").unwrap_or_default(),
            },
            attestation: AttestationConfig {
                lifetime_secs: parse_var(&lookup, "ATTESTATION_LIFETIME_SECONDS")
                    .unwrap_or(defaults.attestation.lifetime_secs),
            },
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ORIGINS")
                    .map(|v| split_list(&v))
                    .unwrap_or(defaults.cors.allowed_origins),
            },
            metrics: MetricsConfig {
                enabled: lookup("METRICS_ENABLED")
                    .map(|v| v.trim().eq_ignore_ascii_case("true"))
                    .unwrap_or(defaults.metrics.enabled),
                path: lookup("METRICS_PATH").unwrap_or(defaults.metrics.path),
            },
            agent_service_url: lookup("AGENT_SERVICE_URL").unwrap_or(defaults.agent_service_url),
        }
    }

    /// Whether a usable http(s) RPC endpoint is configured.
    pub fn rpc_configured(&self) -> bool {
        Url::parse(&self.chain.rpc_url)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .unwrap_or(false)
    }

    /// Whether webhook signatures will be verified.
    pub fn secret_configured(&self) -> bool {
        !self.security.webhook_secret.is_empty()
    }

    /// Whether the settlement contracts have been deployed and configured.
    pub fn contracts_configured(&self) -> bool {
        !self.chain.attested_motion_address.is_empty()
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the idle sweep interval
    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_secs.max(1))
    }

    /// Human-readable limit, e.g. "100 requests per 60 seconds".
    pub fn describe(&self) -> String {
        format!(
            "{} requests per {} seconds",
            self.max_requests, self.window_secs
        )
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
