// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    ValidationFailed,
    InvalidQueryParameter,
    DuplicateIdentity,
    InvalidCredentials,
    Unauthorized,
    Forbidden,
    UploadRejected,
    ParseFailed,
    StorageFailed,
    Internal,
}

impl ApiErrorCode {
    /// HTTP status the code maps to. Duplicate identity is 400 (not 409) to
    /// match the public contract the clients were built against.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::ValidationFailed
            | Self::InvalidQueryParameter
            | Self::DuplicateIdentity
            | Self::UploadRejected => 400,
            Self::InvalidCredentials | Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::ParseFailed | Self::StorageFailed | Self::Internal => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::ValidationFailed, message, json!({}))
    }

    #[must_use]
    pub fn invalid_param(name: &str, value: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidQueryParameter,
            format!("invalid query parameter: {name}"),
            json!({"parameter": name, "value": value}),
        )
    }

    #[must_use]
    pub fn duplicate_identity(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::DuplicateIdentity, message, json!({}))
    }

    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::new(
            ApiErrorCode::InvalidCredentials,
            "Invalid credentials",
            json!({}),
        )
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Unauthorized, message, json!({}))
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Forbidden, message, json!({}))
    }

    #[must_use]
    pub fn upload_rejected(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::UploadRejected, message, json!({}))
    }

    #[must_use]
    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::ParseFailed, message, json!({}))
    }

    #[must_use]
    pub fn storage_failed(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::StorageFailed, message, json!({}))
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Internal, message, json!({}))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
