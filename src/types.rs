//! Core types for the Crucible research platform
//!
//! ## Table of Contents
//! - **ComponentId**: Unique identifier for platform components
//! - **PerformanceSnapshot**: Per-cycle performance record with documented defaults

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for a platform component
///
/// Components are the loosely-coupled units whose health, mass and pairwise
/// interactions drive resource allocation. Identifiers are opaque strings
/// supplied by the session driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(String);

impl ComponentId {
    /// Create a new component identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ComponentId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&ComponentId> for ComponentId {
    fn from(id: &ComponentId) -> Self {
        id.clone()
    }
}

/// A per-cycle performance record
///
/// Named metric fields populated by the driver at the end of each research
/// cycle. Missing fields read as 0.0, so aggregate analysis over a mixed
/// history never fails on a partially-populated snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    metrics: HashMap<String, f64>,
}

/// Field name used by aggregate analysis to track overall cycle performance
pub const OVERALL_FIELD: &str = "overall";

impl PerformanceSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a metric field (builder style)
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Set a metric field
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.metrics.insert(name.into(), value);
    }

    /// Get a metric field, if present
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// The `overall` performance field, defaulting to 0.0 when absent
    pub fn overall(&self) -> f64 {
        self.get(OVERALL_FIELD).unwrap_or(0.0)
    }

    /// Number of populated fields
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether the snapshot has no fields
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
