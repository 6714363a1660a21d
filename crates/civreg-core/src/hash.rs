// SPDX-License-Identifier: Apache-2.0

use sha2::{Digest, Sha256};

/// Fallback mask for identity numbers too short to show both ends.
pub const GENERIC_MASK: &str = "****";

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Stable one-way digest of a raw identity number.
///
/// The hex digest is the unique lookup key everywhere in the system; the raw
/// number itself is never persisted or compared directly.
#[must_use]
pub fn hash_identity(raw: &str) -> String {
    sha256_hex(raw.as_bytes())
}

/// Display-safe form of an identity number: first four and last four
/// characters with a fixed-width mask between, e.g. `1234****5678`.
///
/// Inputs shorter than eight characters cannot show both ends without
/// overlap and collapse to [`GENERIC_MASK`].
#[must_use]
pub fn mask_identity(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() < 8 {
        return GENERIC_MASK.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{GENERIC_MASK}{tail}")
}
