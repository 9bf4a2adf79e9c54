//! Server configuration

use std::time::Duration;

pub const DEFAULT_COOKIE_NAME: &str = "stackwave.sid";
pub const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Session lifetime; also the cookie `Max-Age`.
    pub session_max_age: Duration,
    pub cookie_name: String,
    /// Insert the demo proposals into an empty store at startup.
    pub seed_on_start: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            session_max_age: DEFAULT_SESSION_MAX_AGE,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            seed_on_start: true,
        }
    }
}
