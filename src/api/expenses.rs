// SPDX-License-Identifier: AGPL-3.0-or-later

//! Expense endpoints: authorized append and list.
//!
//! Ownership comes exclusively from the verified token identity. A user
//! id appearing in a request body is not even deserialized, so a client
//! cannot write into another account.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::{
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::Expense,
};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request body for adding an expense.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddExpenseRequest {
    /// Amount spent; must be strictly positive
    pub monto: Option<f64>,
    /// Free-text description; must be non-empty
    pub descripcion: Option<String>,
    /// Optional location
    pub ubicacion: Option<String>,
    /// Optional receipt-image reference
    pub imagen_recibo: Option<String>,
    /// Optional push-notification destination for this write
    #[serde(rename = "userToken")]
    pub user_token: Option<String>,
}

/// Successful add response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddExpenseResponse {
    pub message: String,
    /// Id of the recorded expense
    #[serde(rename = "gastoId")]
    pub gasto_id: String,
}

/// Expense as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExpenseSummary {
    pub id: String,
    pub monto: f64,
    pub descripcion: String,
    pub fecha: String,
    pub ubicacion: Option<String>,
    pub imagen_recibo: Option<String>,
}

impl From<Expense> for ExpenseSummary {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            monto: expense.monto,
            descripcion: expense.descripcion,
            fecha: expense.fecha.to_rfc3339(),
            ubicacion: expense.ubicacion,
            imagen_recibo: expense.imagen_recibo,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Record a new expense for the authenticated user.
///
/// The record is committed before any notification attempt, and the 201
/// depends only on the commit. If `userToken` is supplied, a push
/// notification is dispatched as a spawned best-effort task whose
/// failure is logged and never surfaced.
#[utoipa::path(
    post,
    path = "/api/expenses/add",
    tag = "Expenses",
    request_body = AddExpenseRequest,
    security(("token" = [])),
    responses(
        (status = 201, description = "Expense recorded", body = AddExpenseResponse),
        (status = 400, description = "Missing or invalid monto/descripcion"),
        (status = 401, description = "Invalid or expired token"),
        (status = 403, description = "Missing token"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn add_expense(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<AddExpenseRequest>,
) -> Result<(StatusCode, Json<AddExpenseResponse>), ApiError> {
    let Some(monto) = request.monto else {
        return Err(ApiError::bad_request(
            "The monto and descripcion fields are required",
        ));
    };
    let descripcion = match request.descripcion {
        Some(d) if !d.trim().is_empty() => d,
        _ => {
            return Err(ApiError::bad_request(
                "The monto and descripcion fields are required",
            ));
        }
    };
    if !monto.is_finite() || monto <= 0.0 {
        return Err(ApiError::bad_request("monto must be a positive amount"));
    }

    let expense = Expense::new(
        user.user_id.clone(),
        monto,
        descripcion,
        request.ubicacion,
        request.imagen_recibo,
    );

    state.db.append_expense(&expense).map_err(|e| {
        error!(error = %e, user_id = %user.user_id, "expense write failed");
        ApiError::internal("Failed to record expense")
    })?;

    info!(user_id = %user.user_id, expense_id = %expense.id, "expense recorded");

    // Write is durable; anything past this point must not affect the response.
    if let Some(device_token) = request.user_token.filter(|t| !t.is_empty()) {
        dispatch_notification(&state, device_token, &expense);
    }

    Ok((
        StatusCode::CREATED,
        Json(AddExpenseResponse {
            message: "Expense recorded successfully".to_string(),
            gasto_id: expense.id,
        }),
    ))
}

/// Fire the post-write push notification as a detached task.
fn dispatch_notification(state: &AppState, device_token: String, expense: &Expense) {
    let notifier = state.notifier.clone();
    let expense_id = expense.id.clone();
    let title = "¡Nuevo gasto registrado!".to_string();
    let body = format!(
        "Has registrado un gasto de ${} en \"{}\".",
        expense.monto, expense.descripcion
    );

    tokio::spawn(async move {
        match notifier.send(&device_token, &title, &body).await {
            Ok(()) => info!(expense_id = %expense_id, "push notification sent"),
            Err(e) => warn!(
                expense_id = %expense_id,
                error = %e,
                "push notification failed"
            ),
        }
    });
}

/// List the authenticated user's expenses, newest first.
#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    security(("token" = [])),
    responses(
        (status = 200, description = "Expense list", body = [ExpenseSummary]),
        (status = 401, description = "Invalid or expired token"),
        (status = 403, description = "Missing token"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_expenses(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExpenseSummary>>, ApiError> {
    let expenses = state.db.list_expenses_by_owner(&user.user_id).map_err(|e| {
        error!(error = %e, user_id = %user.user_id, "expense listing failed");
        ApiError::internal("Failed to list expenses")
    })?;

    Ok(Json(expenses.into_iter().map(ExpenseSummary::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::notify::testing::RecordingSender;
    use crate::state::{test_state, test_state_with_notifier};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    fn auth(user_id: &str) -> Auth {
        Auth(AuthenticatedUser {
            user_id: user_id.to_string(),
            email: format!("{user_id}@x.com"),
            expires_at: 0,
        })
    }

    fn add_request(monto: f64, descripcion: &str) -> AddExpenseRequest {
        AddExpenseRequest {
            monto: Some(monto),
            descripcion: Some(descripcion.to_string()),
            ubicacion: None,
            imagen_recibo: None,
            user_token: None,
        }
    }

    #[tokio::test]
    async fn add_expense_persists_scoped_to_token_identity() {
        let (state, _dir) = test_state();

        let (status, Json(response)) = add_expense(
            auth("user-1"),
            State(state.clone()),
            Json(add_request(50.0, "lunch")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(!response.gasto_id.is_empty());

        let stored = state.db.list_expenses_by_owner("user-1").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, response.gasto_id);
        assert_eq!(stored[0].usuario_id, "user-1");
    }

    #[tokio::test]
    async fn missing_monto_or_descripcion_is_400() {
        let (state, _dir) = test_state();

        let mut request = add_request(50.0, "lunch");
        request.monto = None;
        let err = add_expense(auth("user-1"), State(state.clone()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let mut request = add_request(50.0, "lunch");
        request.descripcion = Some("   ".to_string());
        let err = add_expense(auth("user-1"), State(state.clone()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        assert!(state.db.list_expenses_by_owner("user-1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_positive_monto_is_400() {
        let (state, _dir) = test_state();

        for monto in [0.0, -5.0, f64::NAN] {
            let err = add_expense(
                auth("user-1"),
                State(state.clone()),
                Json(add_request(monto, "lunch")),
            )
            .await
            .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn body_supplied_user_id_is_ignored() {
        let (state, _dir) = test_state();

        // A hostile body smuggling another account's id deserializes with
        // the unknown field dropped.
        let request: AddExpenseRequest = serde_json::from_value(serde_json::json!({
            "monto": 25.0,
            "descripcion": "coffee",
            "usuario_id": "victim-account",
        }))
        .unwrap();

        add_expense(auth("attacker"), State(state.clone()), Json(request))
            .await
            .unwrap();

        assert!(state.db.list_expenses_by_owner("victim-account").unwrap().is_empty());
        let stored = state.db.list_expenses_by_owner("attacker").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].usuario_id, "attacker");
    }

    #[tokio::test]
    async fn notification_is_dispatched_with_device_token() {
        let sender = Arc::new(RecordingSender::default());
        let (state, _dir) = test_state_with_notifier(sender.clone());

        let mut request = add_request(50.0, "lunch");
        request.user_token = Some("device-abc".to_string());

        add_expense(auth("user-1"), State(state), Json(request))
            .await
            .unwrap();

        // The dispatch task is detached; give it a moment to run.
        for _ in 0..100 {
            if sender.calls.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(sender.calls.load(Ordering::SeqCst), 1);
        let (device_token, title, body) = sender.last.lock().unwrap().clone().unwrap();
        assert_eq!(device_token, "device-abc");
        assert_eq!(title, "¡Nuevo gasto registrado!");
        assert!(body.contains("50"));
        assert!(body.contains("lunch"));
    }

    #[tokio::test]
    async fn notification_failure_leaves_write_and_status_intact() {
        let sender = Arc::new(RecordingSender {
            fail: true,
            ..Default::default()
        });
        let (state, _dir) = test_state_with_notifier(sender.clone());

        let mut request = add_request(50.0, "lunch");
        request.user_token = Some("bad-device-token".to_string());

        let (status, Json(response)) =
            add_expense(auth("user-1"), State(state.clone()), Json(request))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);

        for _ in 0..100 {
            if sender.calls.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(sender.calls.load(Ordering::SeqCst), 1);

        // The failed push changed nothing about the persisted record.
        let stored = state.db.list_expenses_by_owner("user-1").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, response.gasto_id);
    }

    #[tokio::test]
    async fn no_device_token_means_no_dispatch() {
        let sender = Arc::new(RecordingSender::default());
        let (state, _dir) = test_state_with_notifier(sender.clone());

        add_expense(auth("user-1"), State(state), Json(add_request(10.0, "bus")))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn list_returns_only_own_expenses_newest_first() {
        let (state, _dir) = test_state();

        add_expense(auth("user-1"), State(state.clone()), Json(add_request(1.0, "first")))
            .await
            .unwrap();
        add_expense(auth("user-2"), State(state.clone()), Json(add_request(2.0, "other")))
            .await
            .unwrap();

        let Json(listed) = list_expenses(auth("user-1"), State(state.clone())).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].descripcion, "first");

        let Json(empty) = list_expenses(auth("user-3"), State(state)).await.unwrap();
        assert!(empty.is_empty());
    }
}
