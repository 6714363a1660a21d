// SPDX-License-Identifier: Apache-2.0

use crate::auth::{authorize, hash_password, issue_token, verify_password};
use crate::{AppState, api_error_response};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use civreg_api::{
    ApiError, CitizenOut, ListResponse, LoginResponse, RegistrationOut, StatsOut, StatsResponse,
    UserOut, parse_citizen_filter, parse_page_params_with_limit,
};
use civreg_core::{DAY_MILLIS, now_millis};
use civreg_model::{NewAdminUser, NewAuditLogEntry, Role};
use civreg_store::{CitizenFilter, Page};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use tracing::{error, warn};

pub(crate) async fn healthz_handler() -> Response {
    Json(json!({"status": "ok"})).into_response()
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> Response {
    if state.ready.load(Ordering::Relaxed) {
        Json(json!({"status": "ready"})).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "not ready"})),
        )
            .into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

pub(crate) async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Response {
    let (Some(email), Some(password)) = (
        body.email.filter(|v| !v.trim().is_empty()),
        body.password.filter(|v| !v.is_empty()),
    ) else {
        return api_error_response(&ApiError::validation(
            "Please provide email and password",
        ));
    };

    let user = match state.users.find_by_email(email.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => return api_error_response(&ApiError::invalid_credentials()),
        Err(e) => {
            error!("login lookup failed: {e}");
            return api_error_response(&ApiError::storage_failed("Server Error"));
        }
    };

    if !verify_password(&password, &user.password_hash) {
        return api_error_response(&ApiError::invalid_credentials());
    }

    let token = match issue_token(&user, &state) {
        Ok(token) => token,
        Err(e) => {
            error!("token issue failed: {e}");
            return api_error_response(&ApiError::internal("Server Error"));
        }
    };

    if let Err(e) = state
        .audit
        .append(&NewAuditLogEntry {
            actor_email: user.email.clone(),
            action: "login".to_string(),
            details: None,
            recorded_at: now_millis(),
        })
        .await
    {
        warn!("audit append failed: {e}");
    }

    Json(LoginResponse {
        success: true,
        token,
        user: UserOut {
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_string(),
        },
    })
    .into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SeedRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<String>,
}

/// Bootstrap-only creation of the first admin account; disabled unless the
/// deployment explicitly opts in.
pub(crate) async fn seed_admin_handler(
    State(state): State<AppState>,
    Json(body): Json<SeedRequest>,
) -> Response {
    if !state.api.allow_seed {
        return api_error_response(&ApiError::forbidden("Admin seeding is disabled"));
    }
    let (Some(name), Some(email), Some(password)) = (
        body.name.filter(|v| !v.trim().is_empty()),
        body.email.filter(|v| !v.trim().is_empty()),
        body.password.filter(|v| !v.is_empty()),
    ) else {
        return api_error_response(&ApiError::validation("Missing required fields"));
    };
    let role = match Role::parse(body.role.as_deref().unwrap_or("admin")) {
        Ok(role) => role,
        Err(e) => return api_error_response(&ApiError::validation(e.to_string())),
    };

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("seed password hash failed: {e}");
            return api_error_response(&ApiError::internal("Server Error"));
        }
    };

    let user_id = match state
        .users
        .insert(&NewAdminUser {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password_hash,
            role,
            created_at: now_millis(),
        })
        .await
    {
        Ok(id) => id,
        Err(civreg_store::StoreError::Conflict(_)) => {
            return api_error_response(&ApiError::validation("Email already registered"));
        }
        Err(e) => {
            error!("seed insert failed: {e}");
            return api_error_response(&ApiError::storage_failed("Server Error"));
        }
    };

    let user = match state.users.find_by_email(email.trim()).await {
        Ok(Some(user)) => user,
        _ => {
            error!("seed user {user_id} not readable after insert");
            return api_error_response(&ApiError::storage_failed("Server Error"));
        }
    };
    let token = match issue_token(&user, &state) {
        Ok(token) => token,
        Err(e) => {
            error!("token issue failed: {e}");
            return api_error_response(&ApiError::internal("Server Error"));
        }
    };

    (
        StatusCode::CREATED,
        Json(LoginResponse {
            success: true,
            token,
            user: UserOut {
                name: user.name,
                email: user.email,
                role: user.role.as_str().to_string(),
            },
        }),
    )
        .into_response()
}

pub(crate) async fn list_citizens_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    if let Err(e) = authorize(
        &state,
        &headers,
        &[Role::Admin, Role::OfficerRead, Role::OfficerEngagement],
    ) {
        return api_error_response(&e);
    }

    let params = match parse_page_params_with_limit(
        &query,
        state.api.default_page_limit,
        state.api.max_page_limit,
    ) {
        Ok(params) => params,
        Err(e) => return api_error_response(&e),
    };
    let filter = parse_citizen_filter(&query);
    let page = Page::new(params.page, params.limit);

    let records = match state.citizens.find(&filter, page).await {
        Ok(records) => records,
        Err(e) => {
            error!("citizen listing failed: {e}");
            return api_error_response(&ApiError::storage_failed("Server Error"));
        }
    };
    let total = match state.citizens.count(&filter).await {
        Ok(total) => total,
        Err(e) => {
            error!("citizen count failed: {e}");
            return api_error_response(&ApiError::storage_failed("Server Error"));
        }
    };

    let data: Vec<CitizenOut> = records.into_iter().map(CitizenOut::from).collect();
    Json(ListResponse {
        success: true,
        count: data.len(),
        total,
        data,
    })
    .into_response()
}

pub(crate) async fn list_registrations_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    if let Err(e) = authorize(&state, &headers, &[Role::Admin, Role::Board]) {
        return api_error_response(&e);
    }

    let params = match parse_page_params_with_limit(
        &query,
        state.api.default_page_limit,
        state.api.max_page_limit,
    ) {
        Ok(params) => params,
        Err(e) => return api_error_response(&e),
    };
    let page = Page::new(params.page, params.limit);

    let registrations = match state.registrations.find(page).await {
        Ok(registrations) => registrations,
        Err(e) => {
            error!("registration listing failed: {e}");
            return api_error_response(&ApiError::storage_failed("Server Error"));
        }
    };
    let total = match state.registrations.count().await {
        Ok(total) => total,
        Err(e) => {
            error!("registration count failed: {e}");
            return api_error_response(&ApiError::storage_failed("Server Error"));
        }
    };

    let data: Vec<RegistrationOut> =
        registrations.into_iter().map(RegistrationOut::from).collect();
    Json(ListResponse {
        success: true,
        count: data.len(),
        total,
        data,
    })
    .into_response()
}

pub(crate) async fn stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    if let Err(e) = authorize(
        &state,
        &headers,
        &[Role::Admin, Role::Board, Role::OfficerRead],
    ) {
        return api_error_response(&e);
    }

    let stats = async {
        let total_nins = state.citizens.count(&CitizenFilter::default()).await?;
        let total_registrations = state.registrations.count().await?;
        let total_pvc = state.registrations.count_with_pvc("YES").await?;
        let total_non_pvc = state.registrations.count_with_pvc("NO").await?;
        // Sliding window from call time, not a calendar-day boundary.
        let new_today = state
            .registrations
            .count_created_since(now_millis() - DAY_MILLIS)
            .await?;
        Ok::<StatsOut, civreg_store::StoreError>(StatsOut {
            total_nins,
            total_registrations,
            total_pvc,
            total_non_pvc,
            new_today,
        })
    }
    .await;

    match stats {
        Ok(stats) => Json(StatsResponse {
            success: true,
            stats,
        })
        .into_response(),
        Err(e) => {
            error!("stats query failed: {e}");
            api_error_response(&ApiError::storage_failed("Server Error"))
        }
    }
}
