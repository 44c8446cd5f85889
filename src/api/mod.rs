// SPDX-License-Identifier: AGPL-3.0-or-later

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod expenses;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/expenses", get(expenses::list_expenses))
        .route("/expenses/add", post(expenses::add_expense));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        users::register,
        users::login,
        expenses::add_expense,
        expenses::list_expenses,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            users::RegisterRequest,
            users::LoginRequest,
            users::MessageResponse,
            users::LoginResponse,
            expenses::AddExpenseRequest,
            expenses::AddExpenseResponse,
            expenses::ExpenseSummary
        )
    ),
    tags(
        (name = "Users", description = "Registration and login"),
        (name = "Expenses", description = "Personal expense ledger"),
        (name = "Health", description = "Service probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Auth, AuthError};
    use crate::state::test_state;
    use axum::extract::{FromRequestParts, State};
    use axum::http::{Request, StatusCode};
    use axum::Json;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _dir) = test_state();
        let app = router(state);
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    /// Drive a request with the given Authorization header through the gate.
    async fn authorize(state: &AppState, token: Option<&str>) -> Result<Auth, AuthError> {
        let mut builder = Request::builder().uri("/api/expenses");
        if let Some(token) = token {
            builder = builder.header("Authorization", token);
        }
        let mut parts = builder.body(()).unwrap().into_parts().0;
        Auth::from_request_parts(&mut parts, state).await
    }

    /// End-to-end flow: register, conflict on re-register, login, list
    /// empty, add one expense, list it back.
    #[tokio::test]
    async fn register_login_add_list_flow() {
        let (state, _dir) = test_state();

        // Register ana.
        let (status, _) = users::register(
            State(state.clone()),
            Json(users::RegisterRequest {
                nombre: "ana".to_string(),
                email: "ana@x.com".to_string(),
                password: "Passw0rd".to_string(),
                confirm_password: "Passw0rd".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        // Re-registering the same name conflicts.
        let err = users::register(
            State(state.clone()),
            Json(users::RegisterRequest {
                nombre: "ana".to_string(),
                email: "ana2@x.com".to_string(),
                password: "Passw0rd".to_string(),
                confirm_password: "Passw0rd".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        // Login yields a token the gate accepts.
        let Json(login) = users::login(
            State(state.clone()),
            Json(users::LoginRequest {
                email: "ana@x.com".to_string(),
                password: "Passw0rd".to_string(),
            }),
        )
        .await
        .unwrap();

        let auth = authorize(&state, Some(&login.token)).await.unwrap();

        // No expenses yet.
        let Json(listed) = expenses::list_expenses(auth, State(state.clone()))
            .await
            .unwrap();
        assert!(listed.is_empty());

        // Add one.
        let auth = authorize(&state, Some(&login.token)).await.unwrap();
        let (status, Json(added)) = expenses::add_expense(
            auth,
            State(state.clone()),
            Json(expenses::AddExpenseRequest {
                monto: Some(50.0),
                descripcion: Some("lunch".to_string()),
                ubicacion: None,
                imagen_recibo: None,
                user_token: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(!added.gasto_id.is_empty());

        // It comes back in the list.
        let auth = authorize(&state, Some(&login.token)).await.unwrap();
        let Json(listed) = expenses::list_expenses(auth, State(state.clone()))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, added.gasto_id);
        assert_eq!(listed[0].monto, 50.0);
        assert_eq!(listed[0].descripcion, "lunch");

        // And the gate still rejects requests without a token.
        let err = authorize(&state, None).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
