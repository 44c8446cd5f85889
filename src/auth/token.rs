// SPDX-License-Identifier: AGPL-3.0-or-later

//! Token issuing and verification (HS256 JWT).
//!
//! Keys are derived once from the configured secret and injected through
//! [`crate::state::AppState`]; nothing here reads the environment.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::{claims::Claims, error::AuthError};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Fixed token time-to-live: one hour.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Signing and verification keys for bearer tokens.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    /// Derive both keys from the shared HS256 secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mint a token for the given identity with the given time-to-live.
    pub fn issue(
        &self,
        user_id: &str,
        email: &str,
        ttl_secs: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify a presented token and return its claims.
    ///
    /// Expiry, bad signature and malformed input are reported as distinct
    /// [`AuthError`] variants so the client can differentiate re-login
    /// from retry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;

        let token_data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                _ => AuthError::InvalidToken,
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::new("test-secret")
    }

    #[test]
    fn issue_then_verify_round_trips_claims() {
        let keys = keys();
        let token = keys.issue("user_123", "ana@x.com", TOKEN_TTL_SECS).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.email, "ana@x.com");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let keys = keys();
        // Expired well past the leeway window.
        let token = keys.issue("user_123", "ana@x.com", -600).unwrap();

        assert_eq!(keys.verify(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn tampered_signature_is_invalid() {
        let keys = keys();
        let token = keys.issue("user_123", "ana@x.com", TOKEN_TTL_SECS).unwrap();

        // Flip the signature segment.
        let mut parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        parts[2] = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        let forged = parts.join(".");

        assert_eq!(keys.verify(&forged), Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let token = TokenKeys::new("other-secret")
            .issue("user_123", "ana@x.com", TOKEN_TTL_SECS)
            .unwrap();

        assert_eq!(keys().verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(keys().verify("not-a-jwt"), Err(AuthError::InvalidToken));
    }

    #[test]
    fn issuing_twice_produces_tokens_for_the_same_identity() {
        let keys = keys();
        let a = keys.issue("user_123", "ana@x.com", TOKEN_TTL_SECS).unwrap();
        let b = keys.issue("user_123", "ana@x.com", TOKEN_TTL_SECS).unwrap();

        assert_eq!(keys.verify(&a).unwrap().sub, keys.verify(&b).unwrap().sub);
    }
}
