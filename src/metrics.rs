// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for admission decisions, webhook outcomes and
//! attestation issuance.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Gateway counters, registered on a private registry.
#[derive(Clone)]
pub struct GatewayMetrics {
    registry: Registry,
    rate_limit_decisions: IntCounterVec,
    webhook_events: IntCounterVec,
    attestations_issued: IntCounter,
}

impl GatewayMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let rate_limit_decisions = IntCounterVec::new(
            Opts::new(
                "gateway_rate_limit_decisions_total",
                "Rate limit decisions by outcome",
            ),
            &["outcome"],
        )?;
        let webhook_events = IntCounterVec::new(
            Opts::new("gateway_webhook_events_total", "Webhook events by source and outcome"),
            &["source", "outcome"],
        )?;
        let attestations_issued = IntCounter::new(
            "gateway_attestations_issued_total",
            "Attestation envelopes issued",
        )?;

        registry.register(Box::new(rate_limit_decisions.clone()))?;
        registry.register(Box::new(webhook_events.clone()))?;
        registry.register(Box::new(attestations_issued.clone()))?;

        Ok(Self {
            registry,
            rate_limit_decisions,
            webhook_events,
            attestations_issued,
        })
    }

    pub fn record_rate_limit(&self, allowed: bool) {
        let outcome = if allowed { "allowed" } else { "limited" };
        self.rate_limit_decisions.with_label_values(&[outcome]).inc();
    }

    pub fn record_webhook(&self, source: &str, outcome: &str) {
        self.webhook_events
            .with_label_values(&[source, outcome])
            .inc();
    }

    pub fn record_attestation(&self) {
        self.attestations_issued.inc();
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
