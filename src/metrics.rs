//! Metrics collection for research sessions
//!
//! ## Table of Contents
//! - **MetricsCollector**: Bounded per-name time series with lazy creation
//! - **MetricSample**: A single timestamped observation
//! - **MetricSummary**: Derived statistics for one series

use crate::error::{CrucibleError, Result};
use crate::ring::RingBuffer;
use crate::stats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Default capacity of each named series
pub const DEFAULT_SERIES_CAPACITY: usize = 1000;

/// A single timestamped observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Observed value. Accepted as-is; NaN and negative values are stored
    /// unchanged so the collector never rewrites what a probe reported.
    pub value: f64,
    /// When the observation was recorded
    pub timestamp: DateTime<Utc>,
}

/// Summary statistics for one named series
///
/// Computed over the currently retained window only, i.e. the most recent
/// up-to-capacity samples after eviction. `min`/`max` skip NaN samples;
/// `mean`/`std_dev` propagate them unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Arithmetic mean of the retained samples
    pub mean: f64,
    /// Population standard deviation of the retained samples
    pub std_dev: f64,
    /// Smallest retained sample
    pub min: f64,
    /// Largest retained sample
    pub max: f64,
    /// Most recently recorded sample
    pub last: f64,
}

impl MetricSummary {
    fn from_values(values: &[f64]) -> Option<Self> {
        let mean = stats::mean(values)?;
        let std_dev = stats::population_std_dev(values)?;
        let last = *values.last()?;
        Some(Self {
            mean,
            std_dev,
            min: stats::minimum(values).unwrap_or(f64::NAN),
            max: stats::maximum(values).unwrap_or(f64::NAN),
            last,
        })
    }
}

/// Bounded time-series store for arbitrary named observations
///
/// Series are created lazily on first record and hold at most the configured
/// capacity of samples each; the oldest sample is evicted on overflow.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    observations: HashMap<String, RingBuffer<MetricSample>>,
    thresholds: HashMap<String, f64>,
    last_update: Option<DateTime<Utc>>,
    series_capacity: usize,
}

impl MetricsCollector {
    /// Create a collector with the default series capacity
    pub fn new() -> Self {
        Self {
            observations: HashMap::new(),
            thresholds: HashMap::new(),
            last_update: None,
            series_capacity: DEFAULT_SERIES_CAPACITY,
        }
    }

    /// Create a collector with a custom per-series capacity
    ///
    /// A capacity of zero is rejected as a configuration error.
    pub fn with_series_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CrucibleError::config("metric series capacity must be positive"));
        }
        Ok(Self {
            series_capacity: capacity,
            ..Self::new()
        })
    }

    /// Record an observation, timestamped now
    pub fn record_metric(&mut self, name: impl Into<String>, value: f64) {
        self.record_metric_at(name, value, Utc::now());
    }

    /// Record an observation with an explicit timestamp
    ///
    /// The named series is created on first use; creation and the first push
    /// happen in the same call, so an observed series is never empty.
    pub fn record_metric_at(
        &mut self,
        name: impl Into<String>,
        value: f64,
        timestamp: DateTime<Utc>,
    ) {
        let name = name.into();
        let capacity = self.series_capacity;
        let series = self
            .observations
            .entry(name.clone())
            .or_insert_with(|| RingBuffer::new_unchecked(capacity));
        if series.push(MetricSample { value, timestamp }).is_some() {
            debug!(metric = %name, "evicted oldest sample at capacity");
        }
        self.last_update = Some(timestamp);
    }

    /// Summaries for every series holding at least one sample
    ///
    /// Series without samples are omitted, not zero-filled.
    pub fn get_metrics_summary(&self) -> HashMap<String, MetricSummary> {
        self.observations
            .iter()
            .filter_map(|(name, series)| {
                let values: Vec<f64> = series.iter().map(|s| s.value).collect();
                MetricSummary::from_values(&values).map(|summary| (name.clone(), summary))
            })
            .collect()
    }

    /// The retained samples of one series, if it exists
    pub fn series(&self, name: &str) -> Option<&RingBuffer<MetricSample>> {
        self.observations.get(name)
    }

    /// Names of all recorded series
    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.observations.keys().map(String::as_str)
    }

    /// Number of recorded series
    pub fn series_count(&self) -> usize {
        self.observations.len()
    }

    /// Configure an alerting threshold for a metric
    ///
    /// Thresholds are advisory context for external collaborators; the
    /// collector itself does not enforce them.
    pub fn set_threshold(&mut self, name: impl Into<String>, value: f64) {
        self.thresholds.insert(name.into(), value);
    }

    /// The configured threshold for a metric, if any
    pub fn threshold(&self, name: &str) -> Option<f64> {
        self.thresholds.get(name).copied()
    }

    /// Timestamp of the most recent record call
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Per-series capacity this collector was built with
    pub fn series_capacity(&self) -> usize {
        self.series_capacity
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sample_summary() {
        let mut collector = MetricsCollector::new();
        collector.record_metric("throughput", 42.0);

        let summary = collector.get_metrics_summary();
        let s = summary.get("throughput").unwrap();
        assert_eq!(s.mean, 42.0);
        assert_eq!(s.min, 42.0);
        assert_eq!(s.max, 42.0);
        assert_eq!(s.last, 42.0);
        assert_eq!(s.std_dev, 0.0);
    }

    #[test]
    fn test_eviction_keeps_most_recent_capacity() {
        let mut collector = MetricsCollector::new();
        for i in 0..1001 {
            collector.record_metric("load", i as f64);
        }

        let series = collector.series("load").unwrap();
        assert_eq!(series.len(), 1000);
        // The very first sample (0.0) must be gone, the rest retained.
        assert_eq!(series.oldest().unwrap().value, 1.0);
        assert_eq!(series.newest().unwrap().value, 1000.0);
    }

    #[test]
    fn test_population_std_dev_in_summary() {
        let mut collector = MetricsCollector::new();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            collector.record_metric("fixture", v);
        }

        let summary = collector.get_metrics_summary();
        let s = summary.get("fixture").unwrap();
        assert!((s.std_dev - 2.0).abs() < 1e-12);
        assert_eq!(s.mean, 5.0);
    }

    #[test]
    fn test_unknown_series_omitted() {
        let collector = MetricsCollector::new();
        assert!(collector.get_metrics_summary().is_empty());
        assert!(collector.series("nope").is_none());
        assert_eq!(collector.last_update(), None);
    }

    #[test]
    fn test_nan_accepted_and_stored() {
        let mut collector = MetricsCollector::new();
        collector.record_metric("sensor", 1.0);
        collector.record_metric("sensor", f64::NAN);
        collector.record_metric("sensor", 3.0);

        let s = collector.get_metrics_summary().remove("sensor").unwrap();
        assert!(s.mean.is_nan());
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
        assert_eq!(s.last, 3.0);
        assert_eq!(collector.series("sensor").unwrap().len(), 3);
    }

    #[test]
    fn test_thresholds_are_advisory() {
        let mut collector = MetricsCollector::new();
        collector.set_threshold("latency", 250.0);
        collector.record_metric("latency", 900.0);

        assert_eq!(collector.threshold("latency"), Some(250.0));
        assert_eq!(collector.threshold("other"), None);
        // Recording over threshold still stores the sample unchanged.
        assert_eq!(collector.series("latency").unwrap().newest().unwrap().value, 900.0);
    }

    #[test]
    fn test_custom_capacity_validation() {
        assert!(MetricsCollector::with_series_capacity(0).is_err());
        let mut collector = MetricsCollector::with_series_capacity(2).unwrap();
        collector.record_metric("m", 1.0);
        collector.record_metric("m", 2.0);
        collector.record_metric("m", 3.0);
        assert_eq!(collector.series("m").unwrap().to_vec().len(), 2);
        assert_eq!(collector.series("m").unwrap().oldest().unwrap().value, 2.0);
    }

    #[test]
    fn test_last_update_tracks_explicit_timestamps() {
        let mut collector = MetricsCollector::new();
        let ts = Utc::now();
        collector.record_metric_at("m", 1.0, ts);
        assert_eq!(collector.last_update(), Some(ts));
    }
}
