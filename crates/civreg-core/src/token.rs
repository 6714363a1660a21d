// SPDX-License-Identifier: Apache-2.0

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt::{Display, Formatter};

/// Bearer-token claims. Encoded as `base64url(json) + "." + hex(hmac-sha256)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenClaims {
    pub sub: i64,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TokenError {
    Malformed(String),
    Signature,
    Expired,
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed token: {msg}"),
            Self::Signature => f.write_str("token signature mismatch"),
            Self::Expired => f.write_str("token expired"),
        }
    }
}

impl std::error::Error for TokenError {}

pub fn encode_token(claims: &TokenClaims, secret: &[u8]) -> Result<String, TokenError> {
    let payload =
        serde_json::to_vec(claims).map_err(|e| TokenError::Malformed(e.to_string()))?;
    let body = URL_SAFE_NO_PAD.encode(payload);
    let mut mac = new_mac(secret)?;
    mac.update(body.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    Ok(format!("{body}.{signature}"))
}

/// Verifies the signature and expiry, then returns the claims.
///
/// Signature verification runs before any payload decoding so unsigned
/// garbage never reaches the JSON parser.
pub fn decode_token(
    token: &str,
    secret: &[u8],
    now_millis: i64,
) -> Result<TokenClaims, TokenError> {
    let (body, signature) = token
        .split_once('.')
        .ok_or_else(|| TokenError::Malformed("missing signature separator".to_string()))?;
    let raw_signature = hex::decode(signature).map_err(|_| TokenError::Signature)?;
    let mut mac = new_mac(secret)?;
    mac.update(body.as_bytes());
    mac.verify_slice(&raw_signature)
        .map_err(|_| TokenError::Signature)?;

    let payload = URL_SAFE_NO_PAD
        .decode(body)
        .map_err(|e| TokenError::Malformed(format!("payload decode failed: {e}")))?;
    let claims: TokenClaims =
        serde_json::from_slice(&payload).map_err(|e| TokenError::Malformed(e.to_string()))?;
    if claims.exp <= now_millis {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

fn new_mac(secret: &[u8]) -> Result<Hmac<Sha256>, TokenError> {
    Hmac::<Sha256>::new_from_slice(secret)
        .map_err(|e| TokenError::Malformed(format!("invalid secret: {e}")))
}
