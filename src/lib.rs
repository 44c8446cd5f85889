// SPDX-License-Identifier: AGPL-3.0-or-later

//! Gasto Ledger - Personal Expense Ledger Service
//!
//! Backend service with credential-based login, JWT bearer
//! authorization, an append-only per-user expense ledger, and a
//! best-effort push notification after each write.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Passwords, tokens and the authorization gate
//! - `storage` - Embedded ledger database (redb)
//! - `notify` - Push-notification dispatch

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod notify;
pub mod state;
pub mod storage;
