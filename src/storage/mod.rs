// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Storage Module
//!
//! Persistence for users and expense records on an embedded redb
//! database (pure Rust, ACID, single writer).
//!
//! ## Storage Layout
//!
//! One database file, `ledger.redb`, under the configured data
//! directory. See [`database`] for the table layout.
//!
//! ## Important Notes
//!
//! - Name/email uniqueness is enforced transactionally in
//!   [`LedgerDatabase::create_user`], not by callers
//! - Expense records are append-only; there is no update or delete

pub mod database;
pub mod expenses;
pub mod users;

pub use database::{LedgerDatabase, StoreError, StoreResult};
pub use expenses::Expense;
pub use users::User;
