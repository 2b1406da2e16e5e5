// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HMAC-SHA256 webhook signature verification.
//!
//! Devices sign the exact request body bytes with the shared webhook secret
//! and send `X-Signature: sha256=<lowercase hex>`. Verification always runs
//! against the raw wire bytes, before any JSON parsing.

use hmac::digest::Key;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Prefix of the signature header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Authentication failures. Both map to the same generic 401 response.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing webhook signature")]
    MissingSignature,

    #[error("Invalid webhook signature")]
    InvalidSignature,
}

/// Successful verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Signature matched the configured secret
    Verified,
    /// No secret configured; the signature was not checked
    SecretUnconfigured,
}

/// HMAC keyed with `secret`.
///
/// The key is brought to the SHA-256 block size up front (hashed when longer,
/// zero-padded otherwise), which is the RFC 2104 key schedule and makes
/// construction infallible.
fn keyed_mac(secret: &[u8]) -> HmacSha256 {
    let mut key = Key::<HmacSha256>::default();
    if secret.len() > key.len() {
        let digest = Sha256::digest(secret);
        key[..digest.len()].copy_from_slice(&digest);
    } else {
        key[..secret.len()].copy_from_slice(secret);
    }
    <HmacSha256 as Mac>::new(&key)
}

/// Compute the `sha256=<hex>` signature header value for `body`.
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac = keyed_mac(secret.as_bytes());
    mac.update(body);
    format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    )
}

/// Verify `provided` against the HMAC of `raw_body` under `secret`.
///
/// The comparison is constant-time over the full header value.
pub fn verify(
    raw_body: &[u8],
    provided: Option<&str>,
    secret: &str,
) -> Result<Verification, AuthError> {
    if secret.is_empty() {
        return Ok(Verification::SecretUnconfigured);
    }

    let provided = provided.ok_or(AuthError::MissingSignature)?;
    let expected = sign(raw_body, secret);

    if bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
        Ok(Verification::Verified)
    } else {
        Err(AuthError::InvalidSignature)
    }
}
