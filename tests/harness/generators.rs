// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for attack simulation.

use kinetic_gateway::auth::sign;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Generate a pool of client addresses for testing.
pub fn generate_clients(count: usize) -> Vec<SocketAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, a, b, c)), 40_000)
        })
        .collect()
}

/// Generate distinct motion event bodies.
pub fn generate_events(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            format!(
                r#"{{"wallet":"0x{:040x}","event_type":"run","timestamp":{},"motion_data":{{"x":{},"y":{}}}}}"#,
                i,
                1_700_000_000 + i,
                i % 7,
                i
            )
        })
        .collect()
}

/// Signature header variants that must never authenticate `body`.
pub fn generate_forged_signatures(body: &str, secret: &str) -> Vec<String> {
    let valid = sign(body.as_bytes(), secret);
    let hex_part = valid.trim_start_matches("sha256=").to_string();

    let mut flipped_last = valid.clone().into_bytes();
    let last = flipped_last.len() - 1;
    flipped_last[last] = if flipped_last[last] == b'0' { b'1' } else { b'0' };

    vec![
        String::new(),
        "sha256=".to_string(),
        hex_part.clone(),
        format!("sha1={hex_part}"),
        valid.to_uppercase(),
        String::from_utf8(flipped_last).unwrap(),
        format!("{valid}00"),
        valid[..valid.len() - 1].to_string(),
        sign(body.as_bytes(), &format!("{secret}x")),
        sign(body.as_bytes(), ""),
        format!(" {valid}"),
    ]
}

/// Bodies that differ from `body` by one byte.
pub fn generate_tampered_bodies(body: &str) -> Vec<String> {
    (0..body.len())
        .step_by(7)
        .filter_map(|i| {
            let mut bytes = body.as_bytes().to_vec();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            String::from_utf8(bytes).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_clients() {
        let clients = generate_clients(256);
        assert_eq!(clients.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = clients.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_generate_events_are_json() {
        for event in generate_events(10) {
            let value: serde_json::Value = serde_json::from_str(&event).unwrap();
            assert!(value["motion_data"].is_object());
        }
    }

    #[test]
    fn test_forged_signatures_never_equal_valid() {
        let body = &generate_events(1)[0];
        let valid = sign(body.as_bytes(), "s3cret");
        assert!(generate_forged_signatures(body, "s3cret")
            .iter()
            .all(|forged| *forged != valid));
    }
}
