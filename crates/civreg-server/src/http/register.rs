// SPDX-License-Identifier: Apache-2.0

use crate::{AppState, api_error_response};
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use civreg_api::{ApiError, RegisterResponse};
use civreg_core::{hash_identity, mask_identity, now_millis};
use civreg_ingest::parse_date_of_birth;
use civreg_model::{NewRegistration, RegistrationStatus};
use civreg_store::StoreError;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, warn};

const IDENTITY_LEN: usize = 11;

/// Registration fields as submitted, either as JSON or as multipart text
/// fields. Camera captures arrive as base64 `imageData`; file uploads as a
/// multipart `imageFile` part.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RegisterPayload {
    first_name: Option<String>,
    middle_name: Option<String>,
    surname: Option<String>,
    nationality: Option<String>,
    hometown: Option<String>,
    lga_of_origin: Option<String>,
    state_of_origin: Option<String>,
    dob: Option<String>,
    religion: Option<String>,
    gender: Option<String>,
    phone: Option<String>,
    #[serde(rename = "isWhatsApp")]
    is_whatsapp: Value,
    email: Option<String>,
    house_number: Option<String>,
    street_name: Option<String>,
    city: Option<String>,
    residence_lga: Option<String>,
    residence_state: Option<String>,
    pvc_status: Option<String>,
    nin: Option<String>,
    emergency_name: Option<String>,
    emergency_rel: Option<String>,
    emergency_phone: Option<String>,
    image_data: Option<String>,
}

#[derive(Debug)]
struct UploadedImage {
    bytes: Vec<u8>,
    extension: String,
}

pub(crate) async fn register_citizen_handler(
    State(state): State<AppState>,
    request: Request,
) -> Response {
    let content_type = request
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let (payload, image_file) = if content_type.starts_with("multipart/form-data") {
        let multipart = match Multipart::from_request(request, &state).await {
            Ok(multipart) => multipart,
            Err(e) => {
                return api_error_response(&ApiError::validation(format!(
                    "invalid multipart body: {e}"
                )));
            }
        };
        match payload_from_multipart(multipart).await {
            Ok(parts) => parts,
            Err(e) => return api_error_response(&e),
        }
    } else {
        let bytes =
            match axum::body::to_bytes(request.into_body(), state.api.max_upload_bytes).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    return api_error_response(&ApiError::validation(format!(
                        "unreadable request body: {e}"
                    )));
                }
            };
        match serde_json::from_slice::<RegisterPayload>(&bytes) {
            Ok(payload) => (payload, None),
            Err(e) => {
                return api_error_response(&ApiError::validation(format!(
                    "invalid JSON body: {e}"
                )));
            }
        }
    };

    register_citizen(&state, payload, image_file).await
}

async fn register_citizen(
    state: &AppState,
    payload: RegisterPayload,
    image_file: Option<UploadedImage>,
) -> Response {
    let (Some(first_name), Some(surname), Some(phone), Some(nin)) = (
        nonempty(payload.first_name.as_deref()),
        nonempty(payload.surname.as_deref()),
        nonempty(payload.phone.as_deref()),
        nonempty(payload.nin.as_deref()),
    ) else {
        return api_error_response(&ApiError::validation("Missing required fields"));
    };

    if nin.chars().count() != IDENTITY_LEN {
        return api_error_response(&ApiError::validation("NIN must be 11 digits"));
    }

    // Exactly one image source must resolve to a storable location.
    let image = if let Some(file) = image_file {
        file
    } else if let Some(data) = payload.image_data.as_deref().filter(|v| !v.is_empty()) {
        match decode_base64_image(data) {
            Ok(image) => image,
            Err(e) => return api_error_response(&e),
        }
    } else {
        return api_error_response(&ApiError::validation("Image is required"));
    };

    let image_url = match state.media.store_image(image.bytes, &image.extension).await {
        Ok(url) => url,
        Err(e) => {
            error!("image store failed: {e}");
            return api_error_response(&ApiError::storage_failed("Failed to upload image"));
        }
    };

    let identity_hash = hash_identity(&nin);
    // Friendly pre-check; the store's unique index is the actual guard
    // against two concurrent submissions with the same number.
    match state.registrations.find_by_hash(&identity_hash).await {
        Ok(Some(_)) => {
            return api_error_response(&ApiError::duplicate_identity(
                "This NIN has already been registered.",
            ));
        }
        Ok(None) => {}
        Err(e) => {
            error!("duplicate pre-check failed: {e}");
            return api_error_response(&ApiError::storage_failed(
                "Server Error occurred during registration.",
            ));
        }
    }

    let registration = NewRegistration {
        first_name,
        middle_name: owned(payload.middle_name.as_deref()),
        surname,
        nationality: nonempty(payload.nationality.as_deref())
            .unwrap_or_else(|| "Nigerian".to_string()),
        hometown: owned(payload.hometown.as_deref()),
        lga_of_origin: owned(payload.lga_of_origin.as_deref()),
        state_of_origin: owned(payload.state_of_origin.as_deref()),
        dob: payload.dob.as_deref().and_then(parse_date_of_birth),
        religion: owned(payload.religion.as_deref()),
        gender: owned(payload.gender.as_deref()),
        phone,
        is_whatsapp: truthy(&payload.is_whatsapp),
        email: owned(payload.email.as_deref()),
        house_number: owned(payload.house_number.as_deref()),
        street_name: owned(payload.street_name.as_deref()),
        city: owned(payload.city.as_deref()),
        residence_lga: owned(payload.residence_lga.as_deref()),
        residence_state: owned(payload.residence_state.as_deref()),
        pvc_status: nonempty(payload.pvc_status.as_deref()).map(|v| v.to_ascii_uppercase()),
        identity_masked: mask_identity(&nin),
        identity_hash,
        image_url,
        emergency_name: owned(payload.emergency_name.as_deref()),
        emergency_rel: owned(payload.emergency_rel.as_deref()),
        emergency_phone: owned(payload.emergency_phone.as_deref()),
        status: RegistrationStatus::Pending,
        created_at: now_millis(),
    };

    match state.registrations.insert(&registration).await {
        Ok(registration_id) => (
            StatusCode::CREATED,
            Json(RegisterResponse {
                success: true,
                message: "Registration successful!".to_string(),
                registration_id,
            }),
        )
            .into_response(),
        // The unique index fired: a concurrent request won the race between
        // our pre-check and this insert. Same outward behavior as the check.
        Err(StoreError::Conflict(_)) => api_error_response(&ApiError::duplicate_identity(
            "This NIN has already been registered.",
        )),
        Err(e) => {
            error!("registration insert failed: {e}");
            api_error_response(&ApiError::storage_failed(
                "Server Error occurred during registration.",
            ))
        }
    }
}

async fn payload_from_multipart(
    mut multipart: Multipart,
) -> Result<(RegisterPayload, Option<UploadedImage>), ApiError> {
    let mut payload = RegisterPayload::default();
    let mut image = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(ApiError::validation(format!("invalid multipart body: {e}")));
            }
        };
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        if name == "imageFile" {
            let extension = image_extension(
                field.file_name().unwrap_or(""),
                field.content_type().unwrap_or(""),
            );
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("unreadable image upload: {e}")))?;
            if !bytes.is_empty() {
                image = Some(UploadedImage {
                    bytes: bytes.to_vec(),
                    extension,
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::validation(format!("unreadable field {name}: {e}")))?;
        assign_field(&mut payload, &name, value);
    }

    Ok((payload, image))
}

fn assign_field(payload: &mut RegisterPayload, name: &str, value: String) {
    match name {
        "firstName" => payload.first_name = Some(value),
        "middleName" => payload.middle_name = Some(value),
        "surname" => payload.surname = Some(value),
        "nationality" => payload.nationality = Some(value),
        "hometown" => payload.hometown = Some(value),
        "lgaOfOrigin" => payload.lga_of_origin = Some(value),
        "stateOfOrigin" => payload.state_of_origin = Some(value),
        "dob" => payload.dob = Some(value),
        "religion" => payload.religion = Some(value),
        "gender" => payload.gender = Some(value),
        "phone" => payload.phone = Some(value),
        "isWhatsApp" => payload.is_whatsapp = Value::String(value),
        "email" => payload.email = Some(value),
        "houseNumber" => payload.house_number = Some(value),
        "streetName" => payload.street_name = Some(value),
        "city" => payload.city = Some(value),
        "residenceLga" => payload.residence_lga = Some(value),
        "residenceState" => payload.residence_state = Some(value),
        "pvcStatus" => payload.pvc_status = Some(value),
        "nin" => payload.nin = Some(value),
        "emergencyName" => payload.emergency_name = Some(value),
        "emergencyRel" => payload.emergency_rel = Some(value),
        "emergencyPhone" => payload.emergency_phone = Some(value),
        "imageData" => payload.image_data = Some(value),
        other => warn!("ignoring unknown registration field: {other}"),
    }
}

/// Accepts raw base64 or a `data:<mime>;base64,...` URL from camera capture.
fn decode_base64_image(data: &str) -> Result<UploadedImage, ApiError> {
    let (mime, encoded) = match data.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .ok_or_else(|| ApiError::validation("Failed to upload image"))?,
        None => ("", data),
    };
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| ApiError::validation("Failed to upload image"))?;
    if bytes.is_empty() {
        return Err(ApiError::validation("Failed to upload image"));
    }
    Ok(UploadedImage {
        bytes,
        extension: extension_for_mime(mime).to_string(),
    })
}

fn image_extension(file_name: &str, content_type: &str) -> String {
    if let Some(ext) = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
    {
        return ext.to_ascii_lowercase();
    }
    extension_for_mime(content_type).to_string()
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

fn nonempty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn owned(value: Option<&str>) -> Option<String> {
    nonempty(value)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(s) => s == "true",
        _ => false,
    }
}
