// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use civreg_api::ApiError;
use civreg_store::{
    AdminUserStore, AuditLogStore, CitizenRecordStore, MediaStore, RegistrationStore, SqliteStore,
};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64};

mod auth;
mod config;
mod http;
mod middleware;

pub const CRATE_NAME: &str = "civreg-server";

pub use auth::hash_password;
pub use config::ApiConfig;

#[derive(Clone)]
pub struct AppState {
    pub citizens: Arc<dyn CitizenRecordStore>,
    pub registrations: Arc<dyn RegistrationStore>,
    pub users: Arc<dyn AdminUserStore>,
    pub audit: Arc<dyn AuditLogStore>,
    pub media: Arc<dyn MediaStore>,
    pub api: Arc<ApiConfig>,
    pub ready: Arc<AtomicBool>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn with_config(
        citizens: Arc<dyn CitizenRecordStore>,
        registrations: Arc<dyn RegistrationStore>,
        users: Arc<dyn AdminUserStore>,
        audit: Arc<dyn AuditLogStore>,
        media: Arc<dyn MediaStore>,
        api: ApiConfig,
    ) -> Self {
        Self {
            citizens,
            registrations,
            users,
            audit,
            media,
            api: Arc::new(api),
            ready: Arc::new(AtomicBool::new(true)),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Wires every repository seam to one shared SQLite store.
    #[must_use]
    pub fn from_sqlite(
        store: Arc<SqliteStore>,
        media: Arc<dyn MediaStore>,
        api: ApiConfig,
    ) -> Self {
        Self::with_config(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            media,
            api,
        )
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/register", post(http::register::register_citizen_handler))
        .route("/auth/login", post(http::handlers::login_handler))
        .route("/auth/seed", post(http::handlers::seed_admin_handler))
        .route("/upload-nins", post(http::upload::upload_nins_handler))
        .route("/citizens", get(http::handlers::list_citizens_handler))
        .route(
            "/registrations",
            get(http::handlers::list_registrations_handler),
        )
        .route("/stats", get(http::handlers::stats_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.api.max_upload_bytes))
        .with_state(state)
}

/// Renders an [`ApiError`] in the public error shape.
pub(crate) fn api_error_response(err: &ApiError) -> Response {
    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = Json(json!({
        "success": false,
        "message": err.message,
        "code": err.code,
    }));
    (status, body).into_response()
}
