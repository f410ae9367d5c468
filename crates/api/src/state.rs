use std::sync::Arc;

use rollcall_core::service::CheckinService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (login and health checks).
    pub pool: rollcall_db::DbPool,
    /// Server configuration, including the JWT signing key.
    pub config: Arc<ServerConfig>,
    /// Check-in service over the configured store.
    pub checkin: Arc<CheckinService>,
}
