// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod dto;
mod errors;
mod params;

pub const CRATE_NAME: &str = "civreg-api";

pub use dto::{
    CitizenOut, ListResponse, LoginResponse, MessageResponse, RegisterResponse, RegistrationOut,
    StatsOut, StatsResponse, UploadResponse, UserOut,
};
pub use errors::{ApiError, ApiErrorCode};
pub use params::{
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, PageParams, parse_citizen_filter, parse_page_params,
    parse_page_params_with_limit,
};
