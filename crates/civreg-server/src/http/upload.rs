// SPDX-License-Identifier: Apache-2.0

use crate::auth::authorize;
use crate::{AppState, api_error_response};
use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use civreg_api::{ApiError, UploadResponse};
use civreg_core::now_millis;
use civreg_ingest::{SpreadsheetFormat, import_spreadsheet};
use civreg_model::{NewAuditLogEntry, Role};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{debug, error, warn};

/// Bulk NIN import: stage the uploaded spreadsheet, run it through the
/// pipeline, and always attempt spool cleanup before responding.
pub(crate) async fn upload_nins_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let claims = match authorize(&state, &headers, &[Role::Admin, Role::OfficerUpload]) {
        Ok(claims) => claims,
        Err(e) => return api_error_response(&e),
    };

    let mut staged: Option<(PathBuf, SpreadsheetFormat)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                cleanup_spool(staged.as_ref().map(|(path, _)| path));
                return api_error_response(&ApiError::upload_rejected(format!(
                    "invalid multipart body: {e}"
                )));
            }
        };
        if field.name() != Some("csvFile") {
            continue;
        }
        let Some(file_name) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        let Some(format) = SpreadsheetFormat::from_file_name(&file_name) else {
            return api_error_response(&ApiError::upload_rejected(
                "Only CSV, XLSX, and XLS files are allowed!",
            ));
        };

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return api_error_response(&ApiError::upload_rejected(format!(
                    "unreadable upload: {e}"
                )));
            }
        };

        let seq = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
        let spool_path = state
            .api
            .spool_dir
            .join(format!("upload-{seq:08x}.{}", format.as_str()));
        if let Err(e) = std::fs::create_dir_all(&state.api.spool_dir)
            .and_then(|()| std::fs::write(&spool_path, &bytes))
        {
            error!("upload staging failed: {e}");
            return api_error_response(&ApiError::storage_failed("Error processing file"));
        }
        staged = Some((spool_path, format));
        break;
    }

    let Some((spool_path, format)) = staged else {
        return api_error_response(&ApiError::upload_rejected(
            "Please upload a CSV or Excel file",
        ));
    };

    let result = import_spreadsheet(state.citizens.as_ref(), &spool_path, format).await;
    // Cleanup runs on success and failure alike; its own failure is logged
    // and swallowed.
    cleanup_spool(Some(&spool_path));

    match result {
        Ok((outcome, events)) => {
            for event in &events {
                debug!(stage = ?event.stage, name = %event.name, fields = ?event.fields, "import event");
            }
            if let Err(e) = state
                .audit
                .append(&NewAuditLogEntry {
                    actor_email: claims.email.clone(),
                    action: "upload-nins".to_string(),
                    details: Some(format!(
                        "count={} errors={}",
                        outcome.count, outcome.errors
                    )),
                    recorded_at: now_millis(),
                })
                .await
            {
                warn!("audit append failed: {e}");
            }

            Json(UploadResponse {
                success: true,
                message: format!(
                    "Processed {} records successfully. {} errors.",
                    outcome.count, outcome.errors
                ),
                count: outcome.count,
                errors: outcome.errors,
            })
            .into_response()
        }
        Err(e) => {
            error!("bulk import failed: {e}");
            api_error_response(&ApiError::parse_failed("Error processing file"))
        }
    }
}

fn cleanup_spool(path: Option<&PathBuf>) {
    if let Some(path) = path {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("spool cleanup failed for {}: {e}", path.display());
        }
    }
}
