//! Tempo Series Store
//!
//! CRUD and ingestion operations for time series against a pluggable
//! storage backend. The backend persists whole series records keyed by
//! their external id; the store layers identity assignment, validation,
//! batch atomicity, and per-series mutual exclusion on top.
//!
//! @version 0.1.0
//! @author Tempo Development Team

use crate::types::{
    DataPoint, MetadataUpdate, PointId, PointUpdate, SeriesFilter, SeriesId, SeriesSummary,
    TimeSeries,
};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tempo_common::{parse_timestamp, Result, StoreConfig, TempoError};

// =============================================================================
// Storage Backend Port
// =============================================================================

/// Persistence collaborator for series records.
///
/// A backend is an explicit, lifecycle-scoped handle: it must be connected
/// before use and every operation fails with `Unavailable` while it is not.
/// Records are written and read as whole units (point list embedded), and
/// the backend enforces uniqueness of the external series id, reporting a
/// duplicate as `Conflict`.
pub trait StorageBackend: Send + Sync {
    /// Open the backend for use.
    fn connect(&self) -> Result<()>;

    /// Close the backend. Subsequent operations fail with `Unavailable`.
    fn disconnect(&self) -> Result<()>;

    /// Insert a new record; `Conflict` if the id already exists.
    fn insert(&self, series: &TimeSeries) -> Result<()>;

    /// Fetch a record by external id.
    fn fetch(&self, id: &SeriesId) -> Result<Option<TimeSeries>>;

    /// Replace an existing record as a unit.
    fn store(&self, series: &TimeSeries) -> Result<()>;

    /// Remove a record. Returns true if it existed.
    fn remove(&self, id: &SeriesId) -> Result<bool>;

    /// Find records matching the listing filter.
    fn find(&self, filter: &SeriesFilter) -> Result<Vec<TimeSeries>>;
}

// =============================================================================
// Create Request
// =============================================================================

/// Payload for creating a series.
#[derive(Debug, Clone)]
pub struct CreateSeries {
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub units: String,
    pub tags: BTreeSet<String>,
}

// =============================================================================
// Series Store
// =============================================================================

/// The series store: the single logical entry point for all series and
/// point operations.
///
/// Mutations on one series are serialized by a per-series guard held for
/// the whole fetch-modify-store cycle, so two concurrent appends to the
/// same series never lose one of them and a delete racing an update
/// resolves deterministically. Operations on different series do not
/// contend.
pub struct SeriesStore {
    backend: Arc<dyn StorageBackend>,
    config: StoreConfig,
    locks: Mutex<HashMap<SeriesId, Arc<Mutex<()>>>>,
}

impl SeriesStore {
    /// Create a store over the given backend with default configuration.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_config(backend, StoreConfig::default())
    }

    /// Create a store with custom configuration.
    pub fn with_config(backend: Arc<dyn StorageBackend>, config: StoreConfig) -> Self {
        Self {
            backend,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Access the underlying backend handle.
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    fn series_guard(&self, id: &SeriesId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks.entry(id.clone()).or_default().clone()
    }

    fn fetch_required(&self, id: &SeriesId) -> Result<TimeSeries> {
        self.backend
            .fetch(id)?
            .ok_or_else(|| TempoError::NotFound(format!("time series {}", id)))
    }

    // -------------------------------------------------------------------------
    // Series Operations
    // -------------------------------------------------------------------------

    /// Create a new, empty series with validated metadata.
    pub fn create_series(&self, request: CreateSeries) -> Result<SeriesSummary> {
        if request.tags.len() > self.config.max_tags_per_series {
            return Err(TempoError::Validation(format!(
                "too many tags: {} exceeds the limit of {}",
                request.tags.len(),
                self.config.max_tags_per_series
            )));
        }

        let series = TimeSeries::new(
            request.name,
            request.description,
            request.frequency,
            request.units,
            request.tags,
        )?;

        self.backend.insert(&series)?;
        Ok(series.summary())
    }

    /// List series metadata matching the filter. Points are omitted.
    pub fn list_series(&self, filter: &SeriesFilter) -> Result<Vec<SeriesSummary>> {
        let found = self.backend.find(filter)?;
        Ok(found.iter().map(TimeSeries::summary).collect())
    }

    /// Get a full series, points included.
    pub fn get_series(&self, id: &SeriesId) -> Result<TimeSeries> {
        self.fetch_required(id)
    }

    /// Apply a partial metadata update to a series.
    pub fn update_series(&self, id: &SeriesId, update: &MetadataUpdate) -> Result<SeriesSummary> {
        let guard = self.series_guard(id);
        let _held = guard.lock();

        let mut series = self.fetch_required(id)?;
        series.apply_metadata(update)?;
        self.backend.store(&series)?;
        Ok(series.summary())
    }

    /// Delete a series and all owned points.
    ///
    /// Returns the number of series removed (0 or 1); absence is reported
    /// via the count, never as an error.
    pub fn delete_series(&self, id: &SeriesId) -> Result<usize> {
        let guard = self.series_guard(id);
        let removed = {
            let _held = guard.lock();
            self.backend.remove(id)?
        };

        if removed {
            self.locks.lock().remove(id);
        }
        Ok(usize::from(removed))
    }

    // -------------------------------------------------------------------------
    // Point Operations
    // -------------------------------------------------------------------------

    /// Append a single point. The timestamp text must parse; on failure
    /// nothing is appended.
    pub fn append_point(
        &self,
        id: &SeriesId,
        timestamp_text: &str,
        value: f64,
    ) -> Result<TimeSeries> {
        let timestamp = parse_timestamp(timestamp_text)?;

        let guard = self.series_guard(id);
        let _held = guard.lock();

        let mut series = self.fetch_required(id)?;
        series.append_point(timestamp, value);
        self.backend.store(&series)?;
        Ok(series)
    }

    /// Append a batch of points, all-or-nothing.
    ///
    /// Every timestamp is parsed before any point is appended; one bad
    /// timestamp rejects the entire batch and the series is unchanged.
    pub fn append_points(&self, id: &SeriesId, batch: &[(String, f64)]) -> Result<TimeSeries> {
        if batch.len() > self.config.max_points_per_batch {
            return Err(TempoError::Validation(format!(
                "batch of {} points exceeds the limit of {}",
                batch.len(),
                self.config.max_points_per_batch
            )));
        }

        let mut parsed = Vec::with_capacity(batch.len());
        for (timestamp_text, value) in batch {
            parsed.push((parse_timestamp(timestamp_text)?, *value));
        }

        let guard = self.series_guard(id);
        let _held = guard.lock();

        let mut series = self.fetch_required(id)?;
        for (timestamp, value) in parsed {
            series.append_point(timestamp, value);
        }
        self.backend.store(&series)?;
        Ok(series)
    }

    /// Apply a partial update to a point.
    ///
    /// A missing series and a missing point produce the same `NotFound`;
    /// callers cannot distinguish the two from the result alone.
    pub fn update_point(
        &self,
        id: &SeriesId,
        point_id: &PointId,
        update: &PointUpdate,
    ) -> Result<DataPoint> {
        let guard = self.series_guard(id);
        let _held = guard.lock();

        let not_found = || TempoError::NotFound("time series or data point".to_string());

        let mut series = self.backend.fetch(id)?.ok_or_else(not_found)?;
        let updated = series.update_point(point_id, update)?.ok_or_else(not_found)?;
        self.backend.store(&series)?;
        Ok(updated)
    }

    /// Delete a point by identity.
    ///
    /// Returns whether a point was found and removed; an absent series
    /// reports false exactly like an absent point.
    pub fn delete_point(&self, id: &SeriesId, point_id: &PointId) -> Result<bool> {
        let guard = self.series_guard(id);
        let _held = guard.lock();

        let Some(mut series) = self.backend.fetch(id)? else {
            return Ok(false);
        };

        if !series.remove_point(point_id) {
            return Ok(false);
        }

        self.backend.store(&series)?;
        Ok(true)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use std::thread;

    fn connected_store() -> SeriesStore {
        let backend = Arc::new(MemoryBackend::new());
        backend.connect().unwrap();
        SeriesStore::new(backend)
    }

    fn create_temp(store: &SeriesStore) -> SeriesId {
        store
            .create_series(CreateSeries {
                name: "temp".to_string(),
                description: None,
                frequency: "1h".to_string(),
                units: "C".to_string(),
                tags: BTreeSet::new(),
            })
            .unwrap()
            .id
    }

    #[test]
    fn test_create_validates_required_fields() {
        let store = connected_store();
        let result = store.create_series(CreateSeries {
            name: String::new(),
            description: None,
            frequency: "1h".to_string(),
            units: "C".to_string(),
            tags: BTreeSet::new(),
        });
        assert!(matches!(result, Err(TempoError::Validation(_))));
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let store = connected_store();
        let id = create_temp(&store);

        let series = store.get_series(&id).unwrap();
        assert_eq!(series.name, "temp");
        assert_eq!(series.point_count(), 0);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = connected_store();
        let result = store.get_series(&SeriesId::new("missing"));
        assert!(matches!(result, Err(TempoError::NotFound(_))));
    }

    #[test]
    fn test_list_series_metadata_only() {
        let store = connected_store();
        create_temp(&store);
        store
            .create_series(CreateSeries {
                name: "humidity".to_string(),
                description: None,
                frequency: "1h".to_string(),
                units: "%".to_string(),
                tags: ["weather".to_string()].into_iter().collect(),
            })
            .unwrap();

        let all = store.list_series(&SeriesFilter::new()).unwrap();
        assert_eq!(all.len(), 2);

        let named = store
            .list_series(&SeriesFilter::new().with_name("humidity"))
            .unwrap();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].units, "%");

        let tagged = store
            .list_series(
                &SeriesFilter::new().with_tags(["weather".to_string(), "other".to_string()].into_iter().collect()),
            )
            .unwrap();
        assert_eq!(tagged.len(), 1);
    }

    #[test]
    fn test_delete_series_idempotent_counts() {
        let store = connected_store();
        let id = create_temp(&store);

        assert_eq!(store.delete_series(&id).unwrap(), 1);
        assert_eq!(store.delete_series(&id).unwrap(), 0);
        assert_eq!(store.delete_series(&SeriesId::new("never-existed")).unwrap(), 0);
    }

    #[test]
    fn test_append_point_and_parse_failure() {
        let store = connected_store();
        let id = create_temp(&store);

        let series = store.append_point(&id, "2024-01-01T00:00:00Z", 10.0).unwrap();
        assert_eq!(series.point_count(), 1);

        let result = store.append_point(&id, "january first", 11.0);
        assert!(matches!(result, Err(TempoError::Validation(_))));
        assert_eq!(store.get_series(&id).unwrap().point_count(), 1);
    }

    #[test]
    fn test_append_to_missing_series() {
        let store = connected_store();
        let result = store.append_point(&SeriesId::new("nope"), "2024-01-01T00:00:00Z", 1.0);
        assert!(matches!(result, Err(TempoError::NotFound(_))));
    }

    #[test]
    fn test_batch_append_all_or_nothing() {
        let store = connected_store();
        let id = create_temp(&store);

        let batch = vec![
            ("2024-01-01T00:00:00Z".to_string(), 1.0),
            ("not-a-timestamp".to_string(), 2.0),
            ("2024-01-01T02:00:00Z".to_string(), 3.0),
        ];
        let result = store.append_points(&id, &batch);
        assert!(matches!(result, Err(TempoError::Validation(_))));
        assert_eq!(store.get_series(&id).unwrap().point_count(), 0);

        let good = vec![
            ("2024-01-01T00:00:00Z".to_string(), 1.0),
            ("2024-01-01T01:00:00Z".to_string(), 2.0),
        ];
        let series = store.append_points(&id, &good).unwrap();
        assert_eq!(series.point_count(), 2);
    }

    #[test]
    fn test_batch_size_limit() {
        let backend = Arc::new(MemoryBackend::new());
        backend.connect().unwrap();
        let store = SeriesStore::with_config(
            backend,
            StoreConfig { max_points_per_batch: 2, max_tags_per_series: 64 },
        );
        let id = create_temp(&store);

        let batch: Vec<(String, f64)> = (0..3)
            .map(|i| (format!("2024-01-01T0{}:00:00Z", i), i as f64))
            .collect();
        assert!(matches!(
            store.append_points(&id, &batch),
            Err(TempoError::Validation(_))
        ));
    }

    #[test]
    fn test_update_point_not_found_is_uniform() {
        let store = connected_store();
        let id = create_temp(&store);
        let update = PointUpdate { timestamp: None, value: Some(5.0) };

        // Missing point in an existing series.
        let missing_point = store.update_point(&id, &PointId::new("nope"), &update);
        // Missing series entirely.
        let missing_series =
            store.update_point(&SeriesId::new("nope"), &PointId::new("nope"), &update);

        let msg_point = match missing_point {
            Err(TempoError::NotFound(msg)) => msg,
            other => panic!("expected NotFound, got {:?}", other),
        };
        let msg_series = match missing_series {
            Err(TempoError::NotFound(msg)) => msg,
            other => panic!("expected NotFound, got {:?}", other),
        };
        assert_eq!(msg_point, msg_series);
    }

    #[test]
    fn test_update_point_persists() {
        let store = connected_store();
        let id = create_temp(&store);
        let series = store.append_point(&id, "2024-01-01T00:00:00Z", 1.0).unwrap();
        let point_id = series.points[0].id.clone();

        let updated = store
            .update_point(
                &id,
                &point_id,
                &PointUpdate { timestamp: Some("2024-03-01T00:00:00Z".to_string()), value: Some(7.5) },
            )
            .unwrap();
        assert_eq!(updated.value, 7.5);

        let reloaded = store.get_series(&id).unwrap();
        assert_eq!(reloaded.point(&point_id).unwrap().value, 7.5);
    }

    #[test]
    fn test_delete_point() {
        let store = connected_store();
        let id = create_temp(&store);
        let series = store.append_point(&id, "2024-01-01T00:00:00Z", 1.0).unwrap();
        let point_id = series.points[0].id.clone();

        assert!(store.delete_point(&id, &point_id).unwrap());
        assert!(!store.delete_point(&id, &point_id).unwrap());
        assert!(!store.delete_point(&SeriesId::new("nope"), &point_id).unwrap());
    }

    #[test]
    fn test_delete_series_cascades_points() {
        let store = connected_store();
        let id = create_temp(&store);
        store.append_point(&id, "2024-01-01T00:00:00Z", 1.0).unwrap();

        assert_eq!(store.delete_series(&id).unwrap(), 1);
        assert!(matches!(store.get_series(&id), Err(TempoError::NotFound(_))));
    }

    #[test]
    fn test_concurrent_appends_do_not_lose_points() {
        let backend = Arc::new(MemoryBackend::new());
        backend.connect().unwrap();
        let store = Arc::new(SeriesStore::new(backend));
        let id = create_temp(&store);

        let mut handles = Vec::new();
        for worker in 0..8 {
            let store = Arc::clone(&store);
            let id = id.clone();
            handles.push(thread::spawn(move || {
                for i in 0..25 {
                    let ts = format!("2024-01-01T{:02}:{:02}:00Z", worker, i);
                    store.append_point(&id, &ts, i as f64).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get_series(&id).unwrap().point_count(), 200);
    }
}
