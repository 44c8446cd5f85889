// SPDX-License-Identifier: AGPL-3.0-or-later

//! Registration and login endpoints.

use std::sync::LazyLock;

use axum::{extract::State, http::StatusCode, Json};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::{
    auth::{password, TOKEN_TTL_SECS},
    error::ApiError,
    state::AppState,
    storage::{StoreError, User},
};

/// Conventional `local@domain.tld` shape; no DNS or MX verification.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request body for user registration.
///
/// Missing fields deserialize as empty strings so they surface as a 400
/// validation error rather than a deserialization rejection.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name, unique across users
    #[serde(default)]
    pub nombre: String,
    /// Email, unique across users
    #[serde(default)]
    pub email: String,
    /// Plaintext password (hashed before storage)
    #[serde(default)]
    pub password: String,
    /// Must match `password`
    #[serde(default, rename = "confirmPassword")]
    pub confirm_password: String,
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Confirmation-only response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Successful login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    /// Bearer token; present verbatim in the Authorization header of
    /// subsequent requests
    pub token: String,
}

// =============================================================================
// Validation
// =============================================================================

/// Password policy: at least 8 characters with one uppercase letter, one
/// lowercase letter and one digit.
fn password_meets_policy(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

fn validate_registration(request: &RegisterRequest) -> Result<(), ApiError> {
    if request.nombre.is_empty()
        || request.email.is_empty()
        || request.password.is_empty()
        || request.confirm_password.is_empty()
    {
        return Err(ApiError::bad_request("All fields are required"));
    }

    if !EMAIL_REGEX.is_match(&request.email) {
        return Err(ApiError::bad_request("Invalid email address"));
    }

    if !password_meets_policy(&request.password) {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters with an uppercase letter, \
             a lowercase letter and a digit",
        ));
    }

    if request.password != request.confirm_password {
        return Err(ApiError::bad_request("Passwords do not match"));
    }

    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new user.
///
/// Validates input, checks name/email availability, hashes the password
/// and persists the user. The lookup checks are a fast-fail courtesy;
/// the storage layer enforces uniqueness transactionally, so a racing
/// duplicate still conflicts instead of creating a second row.
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Validation failure or name/email in use"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    validate_registration(&request)?;

    let existing_name = state.db.find_user_by_name(&request.nombre).map_err(|e| {
        error!(error = %e, "user name lookup failed");
        ApiError::internal("Registration failed")
    })?;
    if existing_name.is_some() {
        return Err(ApiError::bad_request("Name already in use"));
    }

    let existing_email = state.db.find_user_by_email(&request.email).map_err(|e| {
        error!(error = %e, "user email lookup failed");
        ApiError::internal("Registration failed")
    })?;
    if existing_email.is_some() {
        return Err(ApiError::bad_request("Email already registered"));
    }

    // bcrypt is CPU-bound; keep it off the async worker threads.
    let cost = state.config.bcrypt_cost;
    let plaintext = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plaintext, cost))
        .await
        .map_err(|e| {
            error!(error = %e, "password hashing task failed");
            ApiError::internal("Registration failed")
        })?
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            ApiError::internal("Registration failed")
        })?;

    let user = User::new(request.nombre, request.email, password_hash);
    match state.db.create_user(&user) {
        Ok(()) => {}
        Err(StoreError::Conflict("name")) => {
            return Err(ApiError::bad_request("Name already in use"));
        }
        Err(StoreError::Conflict(_)) => {
            return Err(ApiError::bad_request("Email already registered"));
        }
        Err(e) => {
            error!(error = %e, "user creation failed");
            return Err(ApiError::internal("Registration failed"));
        }
    }

    info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// Log a user in and mint a bearer token.
///
/// The token carries `{sub: user id, email, iat, exp}` with a fixed
/// one-hour time-to-live.
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing fields or incorrect password"),
        (status = 404, description = "Unknown email"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("All fields are required"));
    }

    let user = state
        .db
        .find_user_by_email(&request.email)
        .map_err(|e| {
            error!(error = %e, "user lookup failed");
            ApiError::internal("Login failed")
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let plaintext = request.password;
    let digest = user.password_hash.clone();
    let matched = tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &digest))
        .await
        .map_err(|e| {
            error!(error = %e, "password verification task failed");
            ApiError::internal("Login failed")
        })?;

    if !matched {
        return Err(ApiError::bad_request("Incorrect password"));
    }

    let token = state
        .keys
        .issue(&user.id, &user.email, TOKEN_TTL_SECS)
        .map_err(|e| {
            error!(error = %e, "token issuing failed");
            ApiError::internal("Login failed")
        })?;

    info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}
