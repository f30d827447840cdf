//! Tempo Server State
//!
//! Application state shared across request handlers. Provides access to
//! the series store and server configuration.
//!
//! @version 0.1.0
//! @author Tempo Development Team

use crate::config::ServerConfig;
use std::sync::Arc;
use tempo_series::SeriesStore;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<SeriesStore>,
}

impl AppState {
    /// Create new application state over an already-wired store.
    pub fn new(config: ServerConfig, store: Arc<SeriesStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
