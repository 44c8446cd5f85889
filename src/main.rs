// SPDX-License-Identifier: AGPL-3.0-or-later

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use gasto_ledger::api::router;
use gasto_ledger::config::AppConfig;
use gasto_ledger::notify::{FcmSender, NoopSender, PushSender};
use gasto_ledger::state::AppState;
use gasto_ledger::storage::LedgerDatabase;

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("Failed to load configuration");

    init_tracing(&config.log_format);

    let db = LedgerDatabase::open(&config.database_path()).expect("Failed to open ledger database");

    let notifier: Arc<dyn PushSender> = match config.fcm_server_key.clone() {
        Some(key) => {
            info!("FCM push notifications enabled");
            Arc::new(
                FcmSender::new(key, config.fcm_api_url.clone())
                    .expect("Failed to build FCM client"),
            )
        }
        None => {
            info!("No FCM server key configured, push notifications disabled");
            Arc::new(NoopSender)
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    let state = AppState::new(db, config, notifier);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    info!("Gasto Ledger listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing(format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install shutdown signal handler");
    info!("Shutdown signal received, stopping server");
}
