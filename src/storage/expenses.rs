// SPDX-License-Identifier: AGPL-3.0-or-later

//! Expense records and append-only ledger operations.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::database::{
    extract_expense_id_from_key, make_index_key, make_prefix, make_prefix_end, LedgerDatabase,
    StoreResult, EXPENSES, OWNER_EXPENSE_INDEX,
};

/// Stored expense record.
///
/// Owned by exactly one user; immutable once appended, never deleted.
/// Serialized field names are the wire names the mobile client expects.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Expense {
    /// Expense id
    pub id: String,
    /// Owning user id (always the authenticated caller, never client-supplied)
    pub usuario_id: String,
    /// Amount, strictly positive
    pub monto: f64,
    /// Free-text description, non-empty
    pub descripcion: String,
    /// Server-assigned timestamp of the write
    pub fecha: DateTime<Utc>,
    /// Optional location
    pub ubicacion: Option<String>,
    /// Optional receipt-image reference
    pub imagen_recibo: Option<String>,
}

impl Expense {
    /// Build a new record with a fresh id and a server-assigned timestamp.
    pub fn new(
        usuario_id: String,
        monto: f64,
        descripcion: String,
        ubicacion: Option<String>,
        imagen_recibo: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            usuario_id,
            monto,
            descripcion,
            fecha: Utc::now(),
            ubicacion,
            imagen_recibo,
        }
    }
}

impl LedgerDatabase {
    /// Durably append an expense record to its owner's ledger.
    ///
    /// The record and its owner-index entry commit in one transaction;
    /// when this returns Ok the write is durable. Any notification the
    /// caller wants to fire happens strictly after this point.
    pub fn append_expense(&self, expense: &Expense) -> StoreResult<()> {
        let json = serde_json::to_vec(expense)?;
        let timestamp = expense.fecha.timestamp();

        let write_txn = self.db.begin_write()?;
        {
            let mut expenses = write_txn.open_table(EXPENSES)?;
            expenses.insert(expense.id.as_str(), json.as_slice())?;

            let mut index = write_txn.open_table(OWNER_EXPENSE_INDEX)?;
            let key = make_index_key(&expense.usuario_id, timestamp, &expense.id);
            index.insert(key.as_slice(), ())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// List all expenses owned by a user, newest first.
    pub fn list_expenses_by_owner(&self, usuario_id: &str) -> StoreResult<Vec<Expense>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(OWNER_EXPENSE_INDEX)?;
        let expenses = read_txn.open_table(EXPENSES)?;

        let prefix = make_prefix(usuario_id);
        let prefix_end = make_prefix_end(usuario_id);

        let mut results = Vec::new();
        for entry in index.range(prefix.as_slice()..prefix_end.as_slice())? {
            let entry = entry?;
            let key_bytes = entry.0.value();

            if let Some(expense_id) = extract_expense_id_from_key(key_bytes) {
                if let Some(value) = expenses.get(expense_id.as_str())? {
                    let expense: Expense = serde_json::from_slice(value.value())?;
                    results.push(expense);
                }
            }
        }

        Ok(results)
    }
}
