// SPDX-License-Identifier: AGPL-3.0-or-later

//! Password hashing and verification (bcrypt).

use tracing::error;

/// Hash a plaintext password with a random salt at the given cost factor.
///
/// Identical input across calls yields different digests because the salt
/// is randomized per call.
pub fn hash_password(plain: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plain, cost)
}

/// Verify a plaintext password against a stored digest.
///
/// Fails closed: a malformed digest or any internal bcrypt error is
/// treated as a non-match, never as a match.
pub fn verify_password(plain: &str, digest: &str) -> bool {
    match bcrypt::verify(plain, digest) {
        Ok(matched) => matched,
        Err(e) => {
            error!(error = %e, "bcrypt verification error, treating as non-match");
            false
        }
    }
}
