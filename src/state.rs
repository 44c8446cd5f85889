// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::config::AppConfig;
use crate::notify::PushSender;
use crate::storage::LedgerDatabase;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<LedgerDatabase>,
    pub keys: Arc<TokenKeys>,
    pub notifier: Arc<dyn PushSender>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        db: LedgerDatabase,
        config: AppConfig,
        notifier: Arc<dyn PushSender>,
    ) -> Self {
        let keys = TokenKeys::new(&config.jwt_secret);
        Self {
            db: Arc::new(db),
            keys: Arc::new(keys),
            notifier,
            config: Arc::new(config),
        }
    }
}

/// Build a state over a throwaway database for handler tests.
#[cfg(test)]
pub fn test_state() -> (AppState, tempfile::TempDir) {
    use crate::notify::NoopSender;

    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db = LedgerDatabase::open(&dir.path().join("test.redb")).expect("failed to open db");
    let config = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_dir: dir.path().to_path_buf(),
        jwt_secret: "test-secret".to_string(),
        // Minimum bcrypt cost keeps tests fast.
        bcrypt_cost: 4,
        fcm_server_key: None,
        fcm_api_url: None,
        log_format: "pretty".to_string(),
    };
    (AppState::new(db, config, Arc::new(NoopSender)), dir)
}

/// Same as [`test_state`] but with a caller-supplied notifier.
#[cfg(test)]
pub fn test_state_with_notifier(
    notifier: Arc<dyn PushSender>,
) -> (AppState, tempfile::TempDir) {
    let (mut state, dir) = test_state();
    state.notifier = notifier;
    (state, dir)
}
