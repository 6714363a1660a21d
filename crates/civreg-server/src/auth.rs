// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::http::HeaderMap;
use civreg_api::ApiError;
use civreg_core::{TokenClaims, TokenError, decode_token, encode_token, now_millis};
use civreg_model::{AdminUser, Role};

const NOT_AUTHORIZED: &str = "Not authorized to access this route";

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))
}

/// Constant result shape on purpose: callers turn any `false` into the same
/// "Invalid credentials" response regardless of why verification failed.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

pub fn issue_token(user: &AdminUser, state: &AppState) -> Result<String, ApiError> {
    let iat = now_millis();
    let claims = TokenClaims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        iat,
        exp: iat + state.api.token_ttl_millis,
    };
    encode_token(&claims, state.api.token_secret.as_bytes())
        .map_err(|e| ApiError::internal(format!("token encoding failed: {e}")))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Validates the bearer token and checks the caller's role against the
/// endpoint's allow-set. Missing/bad token → 401, wrong role → 403.
pub(crate) fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    allowed: &[Role],
) -> Result<TokenClaims, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| ApiError::unauthorized(NOT_AUTHORIZED))?;
    let claims = decode_token(token, state.api.token_secret.as_bytes(), now_millis()).map_err(
        |e| match e {
            TokenError::Expired => ApiError::unauthorized("Session expired"),
            TokenError::Signature | TokenError::Malformed(_) => {
                ApiError::unauthorized(NOT_AUTHORIZED)
            }
            _ => ApiError::unauthorized(NOT_AUTHORIZED),
        },
    )?;
    let role =
        Role::parse(&claims.role).map_err(|_| ApiError::unauthorized(NOT_AUTHORIZED))?;
    if !allowed.contains(&role) {
        return Err(ApiError::forbidden(format!(
            "User role {role} is not authorized to access this route"
        )));
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_verifies_against_its_own_hash_only() {
        let hash = hash_password("password123").expect("hash");
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("password124", &hash));
        assert!(!verify_password("password123", "not-a-phc-string"));
    }
}
