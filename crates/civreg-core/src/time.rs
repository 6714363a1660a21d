// SPDX-License-Identifier: Apache-2.0

use std::time::{SystemTime, UNIX_EPOCH};

/// One day expressed in the unix-millis unit used by every stored timestamp.
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Wall-clock time as unix milliseconds.
///
/// Deterministic code paths (hashing, normalization) must not call this;
/// timestamps are stamped at the persistence boundary.
#[must_use]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as i64)
}
