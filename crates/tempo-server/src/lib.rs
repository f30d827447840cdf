//! Tempo Server - REST API
//!
//! HTTP boundary for the Tempo time series platform. Exposes series CRUD,
//! point ingestion, and range/aggregation queries over REST, mapping the
//! core's typed errors onto response classes.
//!
//! Key Features:
//! - Series and data point CRUD endpoints
//! - All-or-nothing batch ingestion endpoint
//! - Range, limit, and aggregation query parameters
//! - Uniform error-to-status mapping
//!
//! @version 0.1.0
//! @author Tempo Development Team

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use router::create_router;
pub use state::AppState;
