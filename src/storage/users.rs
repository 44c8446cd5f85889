// SPDX-License-Identifier: AGPL-3.0-or-later

//! User records and credential-store operations.
//!
//! Lookups are case-sensitive exact string matches; no normalization is
//! performed. A client that registers `Ana@X.com` must log in with
//! exactly that spelling. Documented limitation, not silently fixed.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::database::{
    LedgerDatabase, StoreError, StoreResult, USERS, USER_EMAIL_INDEX, USER_NAME_INDEX,
};

/// Stored user record.
///
/// Created on registration; never mutated or deleted. The password hash
/// stays inside the storage layer and must never reach a response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque user id
    pub id: String,
    /// Unique display name
    pub nombre: String,
    /// Unique email
    pub email: String,
    /// Salted bcrypt digest of the password
    pub password_hash: String,
    /// When the user registered
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a new user record with a fresh id.
    pub fn new(nombre: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            nombre,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

impl LedgerDatabase {
    /// Persist a new user, enforcing name and email uniqueness.
    ///
    /// The uniqueness checks and the inserts happen inside one write
    /// transaction, so two concurrent registrations for the same name or
    /// email cannot both commit.
    pub fn create_user(&self, user: &User) -> StoreResult<()> {
        let json = serde_json::to_vec(user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut name_index = write_txn.open_table(USER_NAME_INDEX)?;
            if name_index.get(user.nombre.as_str())?.is_some() {
                return Err(StoreError::Conflict("name"));
            }

            let mut email_index = write_txn.open_table(USER_EMAIL_INDEX)?;
            if email_index.get(user.email.as_str())?.is_some() {
                return Err(StoreError::Conflict("email"));
            }

            name_index.insert(user.nombre.as_str(), user.id.as_str())?;
            email_index.insert(user.email.as_str(), user.id.as_str())?;

            let mut users = write_txn.open_table(USERS)?;
            users.insert(user.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Exact-match lookup by name.
    pub fn find_user_by_name(&self, nombre: &str) -> StoreResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USER_NAME_INDEX)?;
        let Some(id) = index.get(nombre)? else {
            return Ok(None);
        };
        self.load_user(&read_txn, id.value())
    }

    /// Exact-match lookup by email.
    pub fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USER_EMAIL_INDEX)?;
        let Some(id) = index.get(email)? else {
            return Ok(None);
        };
        self.load_user(&read_txn, id.value())
    }

    fn load_user(
        &self,
        read_txn: &redb::ReadTransaction,
        id: &str,
    ) -> StoreResult<Option<User>> {
        let users = read_txn.open_table(USERS)?;
        match users.get(id)? {
            Some(value) => {
                let user: User = serde_json::from_slice(value.value())?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }
}
