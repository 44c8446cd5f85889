// SPDX-License-Identifier: AGPL-3.0-or-later

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claim set embedded in an issued token.
///
/// Claims are integrity-protected by the HS256 signature but NOT
/// encrypted; never put secret material in here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the owning user's id
    pub sub: String,

    /// User's email at issue time
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Authenticated user information extracted from a verified token.
///
/// This is the type handlers receive; ownership-sensitive operations
/// must scope to `user_id` and never to ids supplied in request bodies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user id (token `sub` claim)
    pub user_id: String,

    /// Email recorded in the token
    pub email: String,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified claims.
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            expires_at: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_claims_maps_fields() {
        let claims = Claims {
            sub: "user_123".to_string(),
            email: "ana@x.com".to_string(),
            iat: 1700000000,
            exp: 1700003600,
        };

        let user = AuthenticatedUser::from_claims(claims);
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.email, "ana@x.com");
        assert_eq!(user.expires_at, 1700003600);
    }
}
