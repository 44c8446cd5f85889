// SPDX-License-Identifier: AGPL-3.0-or-later

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! The `Authorization` header carries the raw token string verbatim —
//! no `Bearer ` prefix. That is the wire contract the existing mobile
//! client speaks.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthenticatedUser, AuthError};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Validates the token from the `Authorization` header and provides the
/// decoded identity. Handlers must scope every ownership-sensitive
/// operation to this identity, never to ids from the request body.
#[derive(Debug)]
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let claims = state.keys.verify(token)?;

        Ok(Auth(AuthenticatedUser::from_claims(claims)))
    }
}
