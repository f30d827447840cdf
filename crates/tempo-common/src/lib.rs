//! Tempo Common - Shared Types and Utilities
//!
//! Foundational types used across all Tempo components. Provides the unified
//! error taxonomy, timestamp parsing, and configuration structures shared by
//! the series engine and the API server.
//!
//! Key Features:
//! - Unified error types with user-error and retryable classification
//! - Strict ISO 8601 timestamp parsing (no silent defaults)
//! - Store configuration with sensible limits
//!
//! @version 0.1.0
//! @author Tempo Development Team

pub mod config;
pub mod error;
pub mod time;

pub use config::StoreConfig;
pub use error::{Result, TempoError};
pub use time::{format_timestamp, parse_timestamp};
