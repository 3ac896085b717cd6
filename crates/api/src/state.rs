use std::sync::Arc;

use mutuelle_core::lifecycle::LifecyclePolicy;

use crate::config::ServerConfig;
use crate::documents::DocumentService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mutuelle_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Membership card and receipt generation.
    pub documents: Arc<DocumentService>,
}

impl AppState {
    /// Lifecycle policy for a write happening now.
    pub fn lifecycle_policy(&self) -> LifecyclePolicy {
        LifecyclePolicy::now(self.config.window_rule)
    }
}
