//! StackWave governance server
//!
//! Axum HTTP API over a pluggable storage repository and session store.
//! Routes, input rules and response shapes come from `stackwave-contract`.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod seed;
pub mod session;
pub mod state;
pub mod storage;

pub use api::router;
pub use config::ServerConfig;
pub use db::PgStorage;
pub use error::{ApiError, ApiResult};
pub use session::{MemorySessionStore, SessionStore};
pub use state::AppState;
pub use storage::{MemoryStorage, Storage, StorageError};

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Serve the API on `listener` until the process is stopped.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    serve_with_shutdown(listener, state, std::future::pending()).await
}

/// Serve the API until `shutdown` resolves, then drain in-flight requests.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Governance API listening on http://{}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
