// SPDX-License-Identifier: AGPL-3.0-or-later

//! Embedded ledger database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized User
//! - `user_name_index`: nombre → user_id
//! - `user_email_index`: email → user_id
//! - `expenses`: expense_id → serialized Expense
//! - `owner_expense_index`: composite key (user_id|!timestamp|expense_id) → ()
//!
//! Name and email uniqueness is enforced HERE, inside a single write
//! transaction: the index insert in [`create_user`] checks for an
//! existing key before inserting. redb's single-writer model makes that
//! check-and-insert atomic, so this is the authoritative uniqueness
//! guard; any handler-level lookup is only a fast-fail optimization.
//!
//! [`create_user`]: LedgerDatabase::create_user

use std::path::Path;

use redb::{Database, TableDefinition};

/// Primary user table: user_id → serialized User (JSON bytes).
pub(super) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Unique index: nombre → user_id. Case-sensitive exact keys.
pub(super) const USER_NAME_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("user_name_index");

/// Unique index: email → user_id. Case-sensitive exact keys.
pub(super) const USER_EMAIL_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("user_email_index");

/// Primary expense table: expense_id → serialized Expense (JSON bytes).
pub(super) const EXPENSES: TableDefinition<&str, &[u8]> = TableDefinition::new("expenses");

/// Index: composite key → ().
/// Key format: `user_id|!timestamp_be|expense_id` for newest-first range scans.
pub(super) const OWNER_EXPENSE_INDEX: TableDefinition<&[u8], ()> =
    TableDefinition::new("owner_expense_index");

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0} already in use")]
    Conflict(&'static str),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the owner_expense_index table.
///
/// Format: `user_id | inverted_timestamp_be_bytes | expense_id`
///
/// The inverted timestamp ensures newest-first ordering when scanning forward.
pub(super) fn make_index_key(user_id: &str, timestamp: i64, expense_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(user_id.len() + 1 + 8 + 1 + expense_id.len());
    key.extend_from_slice(user_id.as_bytes());
    key.push(b'|');
    key.extend_from_slice(&(!timestamp as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(expense_id.as_bytes());
    key
}

/// Build a prefix key for range scanning all expenses of a user.
pub(super) fn make_prefix(user_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(user_id.len() + 1);
    prefix.extend_from_slice(user_id.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Build the upper bound for a range scan (prefix with 0xFF bytes appended).
pub(super) fn make_prefix_end(user_id: &str) -> Vec<u8> {
    let mut end = Vec::with_capacity(user_id.len() + 1 + 20);
    end.extend_from_slice(user_id.as_bytes());
    end.push(b'|');
    end.extend_from_slice(&[0xFF; 20]);
    end
}

/// Extract the expense_id portion from a composite index key.
///
/// Key format: `user_id|timestamp_bytes|expense_id`. User ids are UUIDs
/// and never contain `|`, but the 8 timestamp bytes can, so the id is
/// located by skipping a fixed 8 bytes past the first separator.
pub(super) fn extract_expense_id_from_key(key: &[u8]) -> Option<String> {
    let first_pipe = key.iter().position(|&b| b == b'|')?;
    let second_pipe = first_pipe + 1 + 8;
    if key.get(second_pipe) != Some(&b'|') {
        return None;
    }
    String::from_utf8(key[second_pipe + 1..].to_vec()).ok()
}

// =============================================================================
// LedgerDatabase
// =============================================================================

/// Embedded ACID ledger database.
///
/// User and expense operations live in the sibling `users` and
/// `expenses` modules as further impl blocks on this type.
pub struct LedgerDatabase {
    pub(super) db: Database,
}

impl LedgerDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USER_NAME_INDEX)?;
            let _ = write_txn.open_table(USER_EMAIL_INDEX)?;
            let _ = write_txn.open_table(EXPENSES)?;
            let _ = write_txn.open_table(OWNER_EXPENSE_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redb::ReadableDatabase;

    #[test]
    fn open_creates_database_and_tables() {
        let dir = tempfile::tempdir().unwrap();
        let db = LedgerDatabase::open(&dir.path().join("ledger.redb")).unwrap();

        // Tables exist, so a fresh read transaction can open them.
        let read_txn = db.db.begin_read().unwrap();
        assert!(read_txn.open_table(USERS).is_ok());
        assert!(read_txn.open_table(OWNER_EXPENSE_INDEX).is_ok());
    }

    #[test]
    fn make_index_key_ordering() {
        // Newer timestamps should produce smaller composite keys (descending)
        let key_old = make_index_key("user-1", 1000, "exp-1");
        let key_new = make_index_key("user-1", 2000, "exp-2");
        assert!(key_new < key_old, "Newer timestamps should sort first");
    }

    #[test]
    fn extract_expense_id_round_trips() {
        let key = make_index_key("user-1", 1234, "exp-42");
        assert_eq!(extract_expense_id_from_key(&key), Some("exp-42".to_string()));
    }

    #[test]
    fn extract_handles_separator_byte_inside_timestamp() {
        // !131 ends in 0x7C, which is the b'|' separator byte.
        let key = make_index_key("user-1", 131, "exp-7");
        assert_eq!(extract_expense_id_from_key(&key), Some("exp-7".to_string()));
    }

    #[test]
    fn prefix_bounds_bracket_owner_keys() {
        let key = make_index_key("user-1", 1234, "exp-1");
        let prefix = make_prefix("user-1");
        let end = make_prefix_end("user-1");
        assert!(key.as_slice() > prefix.as_slice());
        assert!(key.as_slice() < end.as_slice());

        let other = make_index_key("user-2", 1234, "exp-1");
        assert!(other.as_slice() > end.as_slice());
    }
}
