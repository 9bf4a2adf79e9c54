//! Application state

use crate::config::ServerConfig;
use crate::session::{MemorySessionStore, SessionStore};
use crate::storage::{MemoryStorage, Storage};
use std::sync::Arc;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: ServerConfig,
}

impl AppState {
    /// State with an in-memory session store sized from `config`.
    pub fn new(storage: Arc<dyn Storage>, config: ServerConfig) -> Self {
        let sessions = Arc::new(MemorySessionStore::new(config.session_max_age));
        Self::with_sessions(storage, sessions, config)
    }

    pub fn with_sessions(
        storage: Arc<dyn Storage>,
        sessions: Arc<dyn SessionStore>,
        config: ServerConfig,
    ) -> Self {
        Self {
            storage,
            sessions,
            config,
        }
    }

    /// Fully in-process state, used for development and tests
    pub fn in_memory(config: ServerConfig) -> Self {
        Self::new(Arc::new(MemoryStorage::new()), config)
    }

    /// `Set-Cookie` value carrying a fresh session token.
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
            self.config.cookie_name,
            token,
            self.config.session_max_age.as_secs()
        )
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0",
            self.config.cookie_name
        )
    }
}
