// SPDX-License-Identifier: Apache-2.0

//! Wire shapes. The identity hash never appears in any output DTO; the
//! registration listing additionally withholds the photo location.

use civreg_model::{CitizenRecord, Registration, RegistrationStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenOut {
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

impl From<CitizenRecord> for CitizenOut {
    fn from(record: CitizenRecord) -> Self {
        Self {
            identity_masked: record.identity_masked,
            first_name: record.first_name,
            last_name: record.last_name,
            gender: record.gender,
            date_of_birth: record.date_of_birth,
            state: record.state,
            lga: record.lga,
            ward: record.ward,
            phone: record.phone,
            email: record.email,
            address: record.address,
            pvc_status: record.pvc_status,
            imported_at: record.imported_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOut {
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
    pub identity_masked: String,
    pub emergency_name: Option<String>,
    pub emergency_rel: Option<String>,
    pub emergency_phone: Option<String>,
    pub status: RegistrationStatus,
    pub created_at: i64,
}

impl From<Registration> for RegistrationOut {
    fn from(reg: Registration) -> Self {
        Self {
            id: reg.id,
            first_name: reg.first_name,
            middle_name: reg.middle_name,
            surname: reg.surname,
            nationality: reg.nationality,
            hometown: reg.hometown,
            lga_of_origin: reg.lga_of_origin,
            state_of_origin: reg.state_of_origin,
            dob: reg.dob,
            religion: reg.religion,
            gender: reg.gender,
            phone: reg.phone,
            is_whatsapp: reg.is_whatsapp,
            email: reg.email,
            house_number: reg.house_number,
            street_name: reg.street_name,
            city: reg.city,
            residence_lga: reg.residence_lga,
            residence_state: reg.residence_state,
            pvc_status: reg.pvc_status,
            identity_masked: reg.identity_masked,
            emergency_name: reg.emergency_name,
            emergency_rel: reg.emergency_rel,
            emergency_phone: reg.emergency_phone,
            status: reg.status,
            created_at: reg.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsOut {
    #[serde(rename = "totalNINs")]
    pub total_nins: u64,
    #[serde(rename = "totalRegistrations")]
    pub total_registrations: u64,
    #[serde(rename = "totalPVC")]
    pub total_pvc: u64,
    #[serde(rename = "totalNonPVC")]
    pub total_non_pvc: u64,
    #[serde(rename = "newToday")]
    pub new_today: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub total: u64,
    pub data: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub registration_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub count: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOut {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatsOut,
}
