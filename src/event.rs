// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Motion events received on the webhook routes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// Device family that delivered an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    FitnessTracker,
    MotionCapture,
}

impl EventSource {
    /// Label used in log events and metrics.
    pub fn label(self) -> &'static str {
        match self {
            Self::FitnessTracker => "fitness_tracker",
            Self::MotionCapture => "mocap",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A motion event as posted by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    pub wallet: String,
    pub event_type: String,
    /// Unix seconds
    pub timestamp: i64,
    pub motion_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl MotionEvent {
    /// Content fingerprint of the motion data payload.
    pub fn content_hash(&self) -> String {
        content_hash(&self.motion_data)
    }
}

/// SHA-256 over the canonical JSON form of `motion_data`, lowercase hex.
///
/// Canonical form is compact JSON with object keys in sorted order at every
/// depth, so field order on the wire does not change the hash.
pub fn content_hash(motion_data: &Map<String, Value>) -> String {
    let mut canonical = String::new();
    write_canonical(&Value::Object(motion_data.clone()), &mut canonical);
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Shortened hash for log lines.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}
