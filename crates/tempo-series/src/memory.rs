//! Tempo Memory Backend
//!
//! In-memory storage backend for the series store. Keeps whole series
//! records keyed by external id, enforces id uniqueness, and models the
//! connection lifecycle explicitly: operations against a disconnected
//! handle fail with `Unavailable`.
//!
//! @version 0.1.0
//! @author Tempo Development Team

use crate::store::StorageBackend;
use crate::types::{SeriesFilter, SeriesId, TimeSeries};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tempo_common::{Result, TempoError};

// =============================================================================
// Memory Backend
// =============================================================================

/// In-memory implementation of the storage port.
#[derive(Default)]
pub struct MemoryBackend {
    connected: AtomicBool,
    records: RwLock<HashMap<SeriesId, TimeSeries>>,
}

impl MemoryBackend {
    /// Create a new, disconnected backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored series records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check if the backend holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn ensure_connected(&self) -> Result<()> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(TempoError::Unavailable(
                "storage backend is not connected".to_string(),
            ));
        }
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    fn connect(&self) -> Result<()> {
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::Release);
        Ok(())
    }

    fn insert(&self, series: &TimeSeries) -> Result<()> {
        self.ensure_connected()?;
        let mut records = self.records.write();

        if records.contains_key(&series.id) {
            return Err(TempoError::Conflict(format!(
                "time series with id {} already exists",
                series.id
            )));
        }

        records.insert(series.id.clone(), series.clone());
        Ok(())
    }

    fn fetch(&self, id: &SeriesId) -> Result<Option<TimeSeries>> {
        self.ensure_connected()?;
        Ok(self.records.read().get(id).cloned())
    }

    fn store(&self, series: &TimeSeries) -> Result<()> {
        self.ensure_connected()?;
        let mut records = self.records.write();

        if !records.contains_key(&series.id) {
            return Err(TempoError::NotFound(format!("time series {}", series.id)));
        }

        records.insert(series.id.clone(), series.clone());
        Ok(())
    }

    fn remove(&self, id: &SeriesId) -> Result<bool> {
        self.ensure_connected()?;
        Ok(self.records.write().remove(id).is_some())
    }

    fn find(&self, filter: &SeriesFilter) -> Result<Vec<TimeSeries>> {
        self.ensure_connected()?;
        let records = self.records.read();

        let mut found: Vec<TimeSeries> = records
            .values()
            .filter(|series| filter.matches(series))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }
}

// =============================================================================
// Tests
// =============================================================================
