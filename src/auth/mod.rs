// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Authentication Module
//!
//! Credential and token handling for the expense ledger API.
//!
//! ## Auth Flow
//!
//! 1. `POST /api/users/register` validates input, hashes the password
//!    with bcrypt and persists the user.
//! 2. `POST /api/users/login` verifies the password and mints an
//!    HS256-signed JWT with a fixed one-hour time-to-live.
//! 3. Every protected request presents that token verbatim in the
//!    `Authorization` header; the [`Auth`] extractor verifies it and
//!    hands the decoded identity to the handler.
//!
//! ## Security
//!
//! - Tokens are stateless and non-revocable before expiry (no blacklist)
//! - Claims are signed, not encrypted — no secrets go in claims
//! - Password verification fails closed on any internal error
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod token;

pub use claims::{AuthenticatedUser, Claims};
pub use error::AuthError;
pub use extractor::Auth;
pub use token::{TokenKeys, TOKEN_TTL_SECS};
