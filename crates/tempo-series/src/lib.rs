//! Tempo Series - Time Series Data Engine
//!
//! The core data engine for named time series. Owns the series/point data
//! model and its identity and ordering invariants, exposes a store for CRUD
//! and point ingestion against a pluggable storage backend, and provides a
//! pure query engine for range filtering, limiting, and aggregation.
//!
//! Key Features:
//! - Stable point identity independent of any storage representation
//! - Per-series mutual exclusion for lost-update-free ingestion
//! - All-or-nothing batch ingestion
//! - Inclusive range queries with average/min/max/sum/count aggregation
//!
//! @version 0.1.0
//! @author Tempo Development Team

pub mod memory;
pub mod query;
pub mod store;
pub mod types;

pub use memory::MemoryBackend;
pub use query::{AggregateFunction, AggregateOutcome, PointQuery, QueryEngine, QueryResult};
pub use store::{CreateSeries, SeriesStore, StorageBackend};
pub use types::{
    DataPoint, MetadataUpdate, PointId, PointUpdate, SeriesFilter, SeriesId, SeriesSummary,
    TimeSeries,
};
