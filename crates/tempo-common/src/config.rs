//! Tempo Config - Configuration Structures
//!
//! Configuration for the series store. Supports programmatic construction
//! with sensible defaults.
//!
//! @version 0.1.0
//! @author Tempo Development Team

use serde::{Deserialize, Serialize};

// =============================================================================
// Store Configuration
// =============================================================================

/// Configuration for the series store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of points accepted in a single batch append.
    pub max_points_per_batch: usize,
    /// Maximum number of tags on a single series.
    pub max_tags_per_series: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_points_per_batch: 10_000,
            max_tags_per_series: 64,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
