// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

impl UnknownVariant {
    #[must_use]
    pub fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

impl Display for UnknownVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {}: {}", self.field, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Authorization role attached to an admin user. Each protected endpoint
/// declares the subset of roles allowed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Board,
    OfficerRead,
    OfficerUpload,
    OfficerEngagement,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Board => "board",
            Self::OfficerRead => "officer_read",
            Self::OfficerUpload => "officer_upload",
            Self::OfficerEngagement => "officer_engagement",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, UnknownVariant> {
        match raw {
            "admin" => Ok(Self::Admin),
            "board" => Ok(Self::Board),
            "officer_read" => Ok(Self::OfficerRead),
            "officer_upload" => Ok(Self::OfficerUpload),
            "officer_engagement" => Ok(Self::OfficerEngagement),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAdminUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_roundtrips_through_strings() {
        for role in [
            Role::Admin,
            Role::Board,
            Role::OfficerRead,
            Role::OfficerUpload,
            Role::OfficerEngagement,
        ] {
            assert_eq!(Role::parse(role.as_str()), Ok(role));
        }
        assert!(Role::parse("superuser").is_err());
    }
}
