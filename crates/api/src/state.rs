use std::sync::Arc;

use upkeep_db::Store;
use upkeep_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Repository bundle (PostgreSQL or in-memory).
    pub store: Store,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus for maintenance notifications.
    pub events: Arc<EventBus>,
}
