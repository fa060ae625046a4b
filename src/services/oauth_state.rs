// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed OAuth `state` parameter.
//!
//! Format before encoding: `provider|issued_at_ms_hex|hmac_sha256_hex`, then
//! base64url without padding. The provider is part of the signed payload so
//! a Google state cannot complete a LinkedIn callback.

use crate::models::Provider;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// How long a sign-in may take between redirect and callback.
pub const STATE_MAX_AGE_MS: i64 = 10 * 60 * 1000;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("malformed state")]
    Malformed,
    #[error("state signature mismatch")]
    BadSignature,
    #[error("state issued for {0}")]
    WrongProvider(String),
    #[error("state expired")]
    Expired,
}

fn sign(payload: &str, key: &[u8]) -> anyhow::Result<String> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| anyhow::anyhow!("HMAC init failed: {e}"))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build a signed state for a sign-in started at `now_ms`.
pub fn issue(provider: Provider, now_ms: i64, key: &[u8]) -> anyhow::Result<String> {
    let payload = format!("{}|{:x}", provider, now_ms);
    let signature = sign(&payload, key)?;
    Ok(URL_SAFE_NO_PAD.encode(format!("{payload}|{signature}")))
}

/// Check a state returned to the callback for `provider`.
pub fn verify(state: &str, provider: Provider, now_ms: i64, key: &[u8]) -> Result<(), StateError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(state)
        .map_err(|_| StateError::Malformed)?;
    let decoded = String::from_utf8(bytes).map_err(|_| StateError::Malformed)?;

    let mut parts = decoded.splitn(3, '|');
    let (Some(state_provider), Some(issued_hex), Some(signature)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(StateError::Malformed);
    };

    let expected = sign(&format!("{state_provider}|{issued_hex}"), key)
        .map_err(|_| StateError::Malformed)?;
    if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
        return Err(StateError::BadSignature);
    }

    if state_provider != provider.as_str() {
        return Err(StateError::WrongProvider(state_provider.to_string()));
    }

    let issued_ms = i64::from_str_radix(issued_hex, 16).map_err(|_| StateError::Malformed)?;
    if now_ms - issued_ms > STATE_MAX_AGE_MS || issued_ms > now_ms {
        return Err(StateError::Expired);
    }

    Ok(())
}
