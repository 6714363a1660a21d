// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

pub const PVC_YES: &str = "YES";
pub const PVC_NO: &str = "NO";

/// One bulk-imported citizen record, keyed by the identity-number hash.
///
/// `pvc_status` is a free-form upper-cased string rather than a checked
/// enum: bulk imports carry whatever the spreadsheet said, and values
/// outside YES/NO are stored unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitizenRecord {
    pub identity_hash: String,
    pub identity_masked: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub state: Option<String>,
    pub lga: Option<String>,
    pub ward: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub pvc_status: String,
    pub imported_at: i64,
}
