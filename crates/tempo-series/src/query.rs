//! Tempo Series Query
//!
//! Pure query execution over an already-retrieved point sequence. Applies
//! an inclusive time-range filter, a stable ascending sort, an optional
//! limit, and an optional aggregation. Performs no I/O and keeps no state
//! between calls.
//!
//! @version 0.1.0
//! @author Tempo Development Team

use crate::types::DataPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempo_common::{Result, TempoError};

// =============================================================================
// Aggregate Function
// =============================================================================

/// Aggregation mode over the values of a filtered point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Average,
    Minimum,
    Maximum,
    Sum,
    Count,
}

impl AggregateFunction {
    /// Parse a mode name. Accepts both the short and long spellings.
    pub fn parse(text: &str) -> Result<Self> {
        match text {
            "avg" | "average" => Ok(Self::Average),
            "min" | "minimum" => Ok(Self::Minimum),
            "max" | "maximum" => Ok(Self::Maximum),
            "sum" => Ok(Self::Sum),
            "count" => Ok(Self::Count),
            other => Err(TempoError::Validation(format!(
                "unsupported aggregation type: {}. Supported types: avg, min, max, sum, count",
                other
            ))),
        }
    }

    /// Canonical mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::Sum => "sum",
            Self::Count => "count",
        }
    }

    /// Apply the aggregation to a set of values. None on an empty set.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }

        Some(match self {
            Self::Average => values.iter().sum::<f64>() / values.len() as f64,
            Self::Minimum => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Maximum => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Sum => values.iter().sum(),
            Self::Count => values.len() as f64,
        })
    }
}

// =============================================================================
// Point Query
// =============================================================================

/// A query over a series' points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub aggregation: Option<AggregateFunction>,
    /// Bucketed aggregation is accepted but intentionally not implemented;
    /// its presence only flags the result as a full-range aggregate.
    pub interval: Option<String>,
}

impl PointQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_aggregation(mut self, function: AggregateFunction) -> Self {
        self.aggregation = Some(function);
        self
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }
}

// =============================================================================
// Query Result
// =============================================================================

/// Result of executing a point query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Filtered, sorted, and limited points.
    pub points: Vec<DataPoint>,
    /// Present when the query requested an aggregation.
    pub aggregate: Option<AggregateOutcome>,
}

/// Outcome of an aggregation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateOutcome {
    pub function: AggregateFunction,
    /// None when the filtered set was empty. Not an error.
    pub value: Option<f64>,
    /// True when an interval was requested: the value still covers the
    /// whole filtered range, not per-interval buckets.
    pub spans_full_range: bool,
}

// =============================================================================
// Query Engine
// =============================================================================

/// Stateless executor for point queries.
pub struct QueryEngine;

impl QueryEngine {
    /// Execute a query against a point sequence.
    ///
    /// Pipeline: inclusive range filter, stable ascending sort by
    /// timestamp, limit, then aggregation over the surviving points.
    pub fn execute(points: &[DataPoint], query: &PointQuery) -> Result<QueryResult> {
        if query.limit == Some(0) {
            return Err(TempoError::Validation(
                "invalid limit: must be a positive integer".to_string(),
            ));
        }

        let mut filtered: Vec<DataPoint> = points
            .iter()
            .filter(|p| query.start.map_or(true, |s| p.timestamp >= s))
            .filter(|p| query.end.map_or(true, |e| p.timestamp <= e))
            .cloned()
            .collect();

        filtered.sort_by_key(|p| p.timestamp);

        if let Some(limit) = query.limit {
            filtered.truncate(limit);
        }

        let aggregate = query.aggregation.map(|function| {
            let values: Vec<f64> = filtered.iter().map(|p| p.value).collect();
            AggregateOutcome {
                function,
                value: function.apply(&values),
                spans_full_range: query.interval.is_some(),
            }
        });

        Ok(QueryResult { points: filtered, aggregate })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_common::parse_timestamp;

    fn point(ts: &str, value: f64) -> DataPoint {
        DataPoint::new(parse_timestamp(ts).unwrap(), value)
    }

    fn hourly_points() -> Vec<DataPoint> {
        vec![
            point("2024-01-01T00:00:00Z", 10.0),
            point("2024-01-01T02:00:00Z", 30.0),
            point("2024-01-01T01:00:00Z", 20.0),
        ]
    }

    #[test]
    fn test_no_filter_returns_sorted_points() {
        let result = QueryEngine::execute(&hourly_points(), &PointQuery::new()).unwrap();
        let values: Vec<f64> = result.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 20.0, 30.0]);
        assert!(result.aggregate.is_none());
    }

    #[test]
    fn test_range_filter_inclusive_bounds() {
        let points = hourly_points();
        let query = PointQuery::new()
            .with_start(parse_timestamp("2024-01-01T01:00:00Z").unwrap())
            .with_end(parse_timestamp("2024-01-01T02:00:00Z").unwrap());

        let result = QueryEngine::execute(&points, &query).unwrap();
        let values: Vec<f64> = result.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![20.0, 30.0]);
    }

    #[test]
    fn test_range_filter_half_open_sides() {
        let points = hourly_points();

        let from = PointQuery::new().with_start(parse_timestamp("2024-01-01T01:00:00Z").unwrap());
        assert_eq!(QueryEngine::execute(&points, &from).unwrap().points.len(), 2);

        let until = PointQuery::new().with_end(parse_timestamp("2024-01-01T01:00:00Z").unwrap());
        assert_eq!(QueryEngine::execute(&points, &until).unwrap().points.len(), 2);
    }

    #[test]
    fn test_concrete_midrange_scenario() {
        // create temp/1h/C, append (00:00, 10) (02:00, 30) (01:00, 20),
        // query [00:30, 01:30] -> exactly the value-20 point.
        let points = hourly_points();
        let query = PointQuery::new()
            .with_start(parse_timestamp("2024-01-01T00:30:00Z").unwrap())
            .with_end(parse_timestamp("2024-01-01T01:30:00Z").unwrap());

        let result = QueryEngine::execute(&points, &query).unwrap();
        assert_eq!(result.points.len(), 1);
        assert_eq!(result.points[0].value, 20.0);

        let average = QueryEngine::execute(
            &points,
            &PointQuery::new().with_aggregation(AggregateFunction::Average),
        )
        .unwrap();
        assert_eq!(average.aggregate.unwrap().value, Some(20.0));
    }

    #[test]
    fn test_limit_applies_after_sort() {
        let result =
            QueryEngine::execute(&hourly_points(), &PointQuery::new().with_limit(2)).unwrap();
        let values: Vec<f64> = result.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_zero_limit_is_validation_error() {
        let result = QueryEngine::execute(&hourly_points(), &PointQuery::new().with_limit(0));
        assert!(matches!(result, Err(TempoError::Validation(_))));
    }

    #[test]
    fn test_aggregation_identities() {
        let points = hourly_points();
        let run = |function| {
            QueryEngine::execute(&points, &PointQuery::new().with_aggregation(function))
                .unwrap()
                .aggregate
                .unwrap()
                .value
                .unwrap()
        };

        let sum = run(AggregateFunction::Sum);
        let avg = run(AggregateFunction::Average);
        let min = run(AggregateFunction::Minimum);
        let max = run(AggregateFunction::Maximum);
        let count = run(AggregateFunction::Count);

        assert_eq!(count, 3.0);
        assert!((sum - avg * count).abs() < 1e-9);
        assert!(min <= avg && avg <= max);
        assert_eq!(min, 10.0);
        assert_eq!(max, 30.0);
        assert_eq!(sum, 60.0);
    }

    #[test]
    fn test_empty_set_aggregates_to_none() {
        let points = hourly_points();
        let query = PointQuery::new()
            .with_start(parse_timestamp("2030-01-01T00:00:00Z").unwrap())
            .with_aggregation(AggregateFunction::Average);

        let result = QueryEngine::execute(&points, &query).unwrap();
        assert!(result.points.is_empty());
        let outcome = result.aggregate.unwrap();
        assert_eq!(outcome.value, None);
        assert_eq!(outcome.function, AggregateFunction::Average);
    }

    #[test]
    fn test_count_of_empty_set_is_none_value() {
        let query = PointQuery::new().with_aggregation(AggregateFunction::Count);
        let result = QueryEngine::execute(&[], &query).unwrap();
        assert_eq!(result.aggregate.unwrap().value, None);
    }

    #[test]
    fn test_unknown_mode_lists_supported_set() {
        let err = AggregateFunction::parse("median").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("median"));
        assert!(message.contains("avg, min, max, sum, count"));
    }

    #[test]
    fn test_mode_spellings() {
        assert_eq!(AggregateFunction::parse("avg").unwrap(), AggregateFunction::Average);
        assert_eq!(AggregateFunction::parse("average").unwrap(), AggregateFunction::Average);
        assert_eq!(AggregateFunction::parse("minimum").unwrap(), AggregateFunction::Minimum);
        assert_eq!(AggregateFunction::parse("max").unwrap(), AggregateFunction::Maximum);
        assert_eq!(AggregateFunction::Average.as_str(), "average");
    }

    #[test]
    fn test_interval_flags_full_range_aggregate() {
        let points = hourly_points();
        let query = PointQuery::new()
            .with_aggregation(AggregateFunction::Sum)
            .with_interval("5m");

        let outcome = QueryEngine::execute(&points, &query)
            .unwrap()
            .aggregate
            .unwrap();
        assert!(outcome.spans_full_range);
        assert_eq!(outcome.value, Some(60.0));

        let plain = QueryEngine::execute(
            &points,
            &PointQuery::new().with_aggregation(AggregateFunction::Sum),
        )
        .unwrap()
        .aggregate
        .unwrap();
        assert!(!plain.spans_full_range);
    }

    #[test]
    fn test_aggregation_sees_limited_set() {
        // The limit is applied before aggregation, so a count never
        // exceeds it.
        let points = hourly_points();
        let query = PointQuery::new()
            .with_limit(2)
            .with_aggregation(AggregateFunction::Count);

        let result = QueryEngine::execute(&points, &query).unwrap();
        assert_eq!(result.aggregate.unwrap().value, Some(2.0));
    }

    #[test]
    fn test_equal_timestamps_keep_append_order() {
        let ts = "2024-01-01T00:00:00Z";
        let points = vec![point(ts, 1.0), point(ts, 2.0), point(ts, 3.0)];

        let result = QueryEngine::execute(&points, &PointQuery::new()).unwrap();
        let values: Vec<f64> = result.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }
}
