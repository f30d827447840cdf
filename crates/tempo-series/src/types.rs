//! Tempo Series Types
//!
//! Core data types for time series storage and querying: series and point
//! identities, the point and series entities, metadata views, and the
//! listing filter.
//!
//! @version 0.1.0
//! @author Tempo Development Team

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tempo_common::{parse_timestamp, Result, TempoError};

// =============================================================================
// Identifiers
// =============================================================================

/// Externally visible identifier for a time series.
///
/// Assigned once at creation from a 128-bit random source and never reused.
/// Distinct from anything a storage backend keeps internally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesId(pub String);

impl SeriesId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SeriesId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SeriesId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Stable identifier for a data point within its owning series.
///
/// Assigned by the store at append time, independent of any
/// storage-internal sub-document identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointId(pub String);

impl PointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PointId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// Data Point
// =============================================================================

/// A single time series sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: PointId,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            id: PointId::generate(),
            timestamp,
            value,
        }
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Partial changes to a data point.
///
/// The timestamp stays textual until the update is applied so a parse
/// failure can abort the whole update with the point untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointUpdate {
    pub timestamp: Option<String>,
    pub value: Option<f64>,
}

impl PointUpdate {
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_none() && self.value.is_none()
    }
}

// =============================================================================
// Time Series
// =============================================================================

/// A named, tagged container of data points.
///
/// Points are kept in arrival order; query-time ordering is ascending by
/// timestamp with ties broken by append order (see `sorted_points`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    pub id: SeriesId,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub units: String,
    pub tags: BTreeSet<String>,
    pub points: Vec<DataPoint>,
}

impl TimeSeries {
    /// Create an empty series with validated metadata and a fresh identity.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        frequency: impl Into<String>,
        units: impl Into<String>,
        tags: BTreeSet<String>,
    ) -> Result<Self> {
        let name = name.into();
        let frequency = frequency.into();
        let units = units.into();

        require_non_empty("name", &name)?;
        require_non_empty("frequency", &frequency)?;
        require_non_empty("units", &units)?;

        Ok(Self {
            id: SeriesId::generate(),
            name,
            description,
            frequency,
            units,
            tags,
            points: Vec::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Point Operations
    // -------------------------------------------------------------------------

    /// Append a point, assigning its identity. Returns the new point.
    pub fn append_point(&mut self, timestamp: DateTime<Utc>, value: f64) -> &DataPoint {
        self.points.push(DataPoint::new(timestamp, value));
        self.points.last().expect("points cannot be empty after push")
    }

    /// Look up a point by identity.
    pub fn point(&self, id: &PointId) -> Option<&DataPoint> {
        self.points.iter().find(|p| &p.id == id)
    }

    /// Remove a point by identity. Returns true if it was present.
    pub fn remove_point(&mut self, id: &PointId) -> bool {
        let before = self.points.len();
        self.points.retain(|p| &p.id != id);
        self.points.len() != before
    }

    /// Apply a partial update to a point.
    ///
    /// Returns `Ok(None)` when the point id is absent. A timestamp that
    /// fails to parse aborts the whole update; the point keeps both its
    /// old timestamp and its old value.
    pub fn update_point(&mut self, id: &PointId, update: &PointUpdate) -> Result<Option<DataPoint>> {
        let parsed = match update.timestamp.as_deref() {
            Some(text) => Some(parse_timestamp(text)?),
            None => None,
        };

        let Some(point) = self.points.iter_mut().find(|p| &p.id == id) else {
            return Ok(None);
        };

        if let Some(timestamp) = parsed {
            point.timestamp = timestamp;
        }
        if let Some(value) = update.value {
            point.value = value;
        }

        Ok(Some(point.clone()))
    }

    /// Points in query-time order: ascending by timestamp, stable with
    /// respect to append order for equal timestamps.
    pub fn sorted_points(&self) -> Vec<DataPoint> {
        let mut points = self.points.clone();
        points.sort_by_key(|p| p.timestamp);
        points
    }

    /// Get the number of points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    // -------------------------------------------------------------------------
    // Metadata Operations
    // -------------------------------------------------------------------------

    /// Apply a partial metadata update, validating required fields.
    pub fn apply_metadata(&mut self, update: &MetadataUpdate) -> Result<()> {
        if let Some(ref name) = update.name {
            require_non_empty("name", name)?;
        }
        if let Some(ref frequency) = update.frequency {
            require_non_empty("frequency", frequency)?;
        }
        if let Some(ref units) = update.units {
            require_non_empty("units", units)?;
        }

        if let Some(ref name) = update.name {
            self.name = name.clone();
        }
        if let Some(ref description) = update.description {
            self.description = Some(description.clone());
        }
        if let Some(ref frequency) = update.frequency {
            self.frequency = frequency.clone();
        }
        if let Some(ref units) = update.units {
            self.units = units.clone();
        }
        if let Some(ref tags) = update.tags {
            self.tags = tags.clone();
        }

        Ok(())
    }

    /// Metadata-only view of this series.
    pub fn summary(&self) -> SeriesSummary {
        SeriesSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            frequency: self.frequency.clone(),
            units: self.units.clone(),
            tags: self.tags.clone(),
            point_count: self.points.len(),
        }
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TempoError::Validation(format!(
            "missing required field: {}",
            field
        )));
    }
    Ok(())
}

/// Partial changes to series metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub units: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}

// =============================================================================
// Series Summary
// =============================================================================

/// Metadata-only view of a series, returned by listing operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub id: SeriesId,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub units: String,
    pub tags: BTreeSet<String>,
    pub point_count: usize,
}

// =============================================================================
// Series Filter
// =============================================================================

/// Listing filter: the only two supported predicates.
///
/// `name` matches exactly; `tags` matches a series carrying ANY of the
/// given tags. There is no open-ended query pass-through.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesFilter {
    pub name: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}

impl SeriesFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tags(mut self, tags: BTreeSet<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Check whether a series matches this filter.
    pub fn matches(&self, series: &TimeSeries) -> bool {
        if let Some(ref name) = self.name {
            if &series.name != name {
                return false;
            }
        }
        if let Some(ref tags) = self.tags {
            if !tags.iter().any(|t| series.tags.contains(t)) {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
