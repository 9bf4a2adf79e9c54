//! Session store
//!
//! A session maps an opaque cookie token to a user id. Sessions expire after
//! a fixed max age; expired entries are treated as absent.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Start a session for `user_id` and return its token.
    async fn create(&self, user_id: i32) -> String;

    /// User bound to `token`, if the session exists and has not expired.
    async fn user_id(&self, token: &str) -> Option<i32>;

    /// End a session. Returns whether a live session was removed.
    async fn destroy(&self, token: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: i32,
    pub created_at: Instant,
}

pub struct MemorySessionStore {
    sessions: DashMap<String, AuthSession>,
    max_age: Duration,
}

impl MemorySessionStore {
    pub fn new(max_age: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn is_expired(&self, session: &AuthSession) -> bool {
        session.created_at.elapsed() >= self.max_age
    }

    /// Drop every expired session.
    pub fn prune(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.created_at.elapsed() < self.max_age);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            debug!("Pruned {} expired sessions", removed);
        }
        removed
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: i32) -> String {
        self.prune();
        let token = uuid::Uuid::new_v4().to_string();
        self.sessions.insert(
            token.clone(),
            AuthSession {
                user_id,
                created_at: Instant::now(),
            },
        );
        token
    }

    async fn user_id(&self, token: &str) -> Option<i32> {
        {
            let session = self.sessions.get(token)?;
            if !self.is_expired(&session) {
                return Some(session.user_id);
            }
        }
        // Shard guard must be released before removing.
        self.sessions.remove(token);
        None
    }

    async fn destroy(&self, token: &str) -> bool {
        match self.sessions.remove(token) {
            Some((_, session)) => !self.is_expired(&session),
            None => false,
        }
    }
}
