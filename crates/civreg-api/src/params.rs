// SPDX-License-Identifier: Apache-2.0

use crate::errors::ApiError;
use civreg_store::CitizenFilter;
use std::collections::BTreeMap;

pub const DEFAULT_PAGE_LIMIT: u32 = 50;
pub const MAX_PAGE_LIMIT: u32 = 500;

/// 1-based pagination parameters as they arrive on the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

pub fn parse_page_params(query: &BTreeMap<String, String>) -> Result<PageParams, ApiError> {
    parse_page_params_with_limit(query, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT)
}

pub fn parse_page_params_with_limit(
    query: &BTreeMap<String, String>,
    default_limit: u32,
    max_limit: u32,
) -> Result<PageParams, ApiError> {
    let page = match query.get("page") {
        Some(raw) => {
            let value = raw
                .parse::<u32>()
                .map_err(|_| ApiError::invalid_param("page", raw))?;
            if value == 0 {
                return Err(ApiError::invalid_param("page", raw));
            }
            value
        }
        None => 1,
    };

    let limit = match query.get("limit") {
        Some(raw) => {
            let value = raw
                .parse::<u32>()
                .map_err(|_| ApiError::invalid_param("limit", raw))?;
            if value == 0 || value > max_limit {
                return Err(ApiError::invalid_param("limit", raw));
            }
            value
        }
        None => default_limit,
    };

    Ok(PageParams { page, limit })
}

/// Listing filter for imported citizen records. Absent params match
/// everything; `pvcStatus` is normalized to upper case to line up with
/// stored values.
#[must_use]
pub fn parse_citizen_filter(query: &BTreeMap<String, String>) -> CitizenFilter {
    CitizenFilter {
        pvc_status: query
            .get("pvcStatus")
            .map(|v| v.trim().to_ascii_uppercase())
            .filter(|v| !v.is_empty()),
        state: query
            .get("state")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
    }
}
