// SPDX-License-Identifier: Apache-2.0

use crate::user::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Workflow state of a public self-submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Verified,
    Contacted,
    Completed,
}

impl RegistrationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::Contacted => "CONTACTED",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, UnknownVariant> {
        match raw {
            "PENDING" => Ok(Self::Pending),
            "VERIFIED" => Ok(Self::Verified),
            "CONTACTED" => Ok(Self::Contacted),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(UnknownVariant::new("registration status", other)),
        }
    }
}

impl Display for RegistrationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A citizen self-submission as drafted by the intake handler; the store
/// assigns the row identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRegistration {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub surname: String,
    pub nationality: String,
    pub hometown: Option<String>,
    pub lga_of_origin: Option<String>,
    pub state_of_origin: Option<String>,
    pub dob: Option<String>,
    pub religion: Option<String>,
    pub gender: Option<String>,
    pub phone: String,
    pub is_whatsapp: bool,
    pub email: Option<String>,
    pub house_number: Option<String>,
    pub street_name: Option<String>,
    pub city: Option<String>,
    pub residence_lga: Option<String>,
    pub residence_state: Option<String>,
    pub pvc_status: Option<String>,
    pub identity_hash: String,
    pub identity_masked: String,
    pub image_url: String,
    pub emergency_name: Option<String>,
    pub emergency_rel: Option<String>,
    pub emergency_phone: Option<String>,
    pub status: RegistrationStatus,
    pub created_at: i64,
}

/// A persisted registration row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: i64,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub surname: String,
    pub nationality: String,
    pub hometown: Option<String>,
    pub lga_of_origin: Option<String>,
    pub state_of_origin: Option<String>,
    pub dob: Option<String>,
    pub religion: Option<String>,
    pub gender: Option<String>,
    pub phone: String,
    pub is_whatsapp: bool,
    pub email: Option<String>,
    pub house_number: Option<String>,
    pub street_name: Option<String>,
    pub city: Option<String>,
    pub residence_lga: Option<String>,
    pub residence_state: Option<String>,
    pub pvc_status: Option<String>,
    pub identity_hash: String,
    pub identity_masked: String,
    pub image_url: String,
    pub emergency_name: Option<String>,
    pub emergency_rel: Option<String>,
    pub emergency_phone: Option<String>,
    pub status: RegistrationStatus,
    pub created_at: i64,
}
