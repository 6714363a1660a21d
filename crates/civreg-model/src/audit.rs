// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// One administrative action worth keeping a trail of. Appending is
/// best-effort; the acting request never fails because audit did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuditLogEntry {
    pub actor_email: String,
    pub action: String,
    pub details: Option<String>,
    pub recorded_at: i64,
}
