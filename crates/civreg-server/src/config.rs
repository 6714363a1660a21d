// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Server-side knobs, normally assembled from `CIVREG_*` environment
/// variables in `main`.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Request body cap; bounds both registration photos and bulk uploads.
    pub max_upload_bytes: usize,
    pub default_page_limit: u32,
    pub max_page_limit: u32,
    pub token_secret: String,
    pub token_ttl_millis: i64,
    /// Enables `POST /auth/seed` for first-admin bootstrap. Off by default.
    pub allow_seed: bool,
    /// Where uploaded spreadsheets are staged before parsing.
    pub spool_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            default_page_limit: 50,
            max_page_limit: 500,
            token_secret: "civreg-dev-secret".to_string(),
            token_ttl_millis: 30 * 24 * 60 * 60 * 1000,
            allow_seed: false,
            spool_dir: std::env::temp_dir().join("civreg-spool"),
        }
    }
}
