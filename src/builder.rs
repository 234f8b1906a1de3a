//! SessionBuilder for configuring and constructing research sessions
//!
//! ## Table of Contents
//! - **SessionConfig**: Complete session configuration
//! - **SessionBuilder**: Builder pattern for session construction

use crate::episodes::EpisodeSource;
use crate::error::{CrucibleError, Result};
use crate::explain::ExplainabilitySystem;
use crate::metrics::{MetricsCollector, DEFAULT_SERIES_CAPACITY};
use crate::orchestrator::{AllocationModel, Orchestrator, DEFAULT_HISTORY_CAPACITY};
use crate::runtime::ResearchSession;
use crate::telemetry::SessionMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Complete research-session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Domain tag observations are explained under
    pub domain: String,
    /// Capacity of the orchestrator performance history
    pub performance_history_capacity: usize,
    /// Capacity of each named metric series
    pub metrics_series_capacity: usize,
    /// Capacity of the explanation history
    pub explanation_history_capacity: usize,
    /// Whether session telemetry is collected
    pub telemetry_enabled: bool,
    /// Resource pools seeded at construction
    pub resource_pools: HashMap<String, f64>,
    /// Minimum confidence per pattern kind
    pub confidence_thresholds: HashMap<String, f64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            domain: "research".to_string(),
            performance_history_capacity: DEFAULT_HISTORY_CAPACITY,
            metrics_series_capacity: DEFAULT_SERIES_CAPACITY,
            explanation_history_capacity: crate::explain::DEFAULT_HISTORY_CAPACITY,
            telemetry_enabled: true,
            resource_pools: HashMap::new(),
            confidence_thresholds: HashMap::new(),
        }
    }
}

impl SessionConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, capacity) in [
            ("performance_history_capacity", self.performance_history_capacity),
            ("metrics_series_capacity", self.metrics_series_capacity),
            ("explanation_history_capacity", self.explanation_history_capacity),
        ] {
            if capacity == 0 {
                return Err(CrucibleError::config(format!("{} must be positive", name)));
            }
        }
        if self.domain.trim().is_empty() {
            return Err(CrucibleError::config("domain must not be empty"));
        }
        for (pool, quantity) in &self.resource_pools {
            if !quantity.is_finite() || *quantity < 0.0 {
                return Err(CrucibleError::config(format!(
                    "resource pool '{}' must hold a finite non-negative quantity",
                    pool
                )));
            }
        }
        Ok(())
    }
}

/// Builder for constructing research sessions
pub struct SessionBuilder {
    config: SessionConfig,
    model: Option<Box<dyn AllocationModel>>,
    episodes: Option<Box<dyn EpisodeSource>>,
}

impl SessionBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            model: None,
            episodes: None,
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: SessionConfig) -> Self {
        Self {
            config,
            model: None,
            episodes: None,
        }
    }

    /// Set the explanation domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.config.domain = domain.into();
        self
    }

    /// Set the performance-history capacity
    pub fn performance_history_capacity(mut self, capacity: usize) -> Self {
        self.config.performance_history_capacity = capacity;
        self
    }

    /// Set the per-series metrics capacity
    pub fn metrics_series_capacity(mut self, capacity: usize) -> Self {
        self.config.metrics_series_capacity = capacity;
        self
    }

    /// Set the explanation-history capacity
    pub fn explanation_history_capacity(mut self, capacity: usize) -> Self {
        self.config.explanation_history_capacity = capacity;
        self
    }

    /// Enable or disable session telemetry
    pub fn telemetry(mut self, enabled: bool) -> Self {
        self.config.telemetry_enabled = enabled;
        self
    }

    /// Seed a resource pool
    pub fn with_resource_pool(mut self, name: impl Into<String>, quantity: f64) -> Self {
        self.config.resource_pools.insert(name.into(), quantity);
        self
    }

    /// Require a minimum confidence for a pattern kind
    pub fn with_confidence_threshold(mut self, kind: impl Into<String>, minimum: f64) -> Self {
        self.config.confidence_thresholds.insert(kind.into(), minimum);
        self
    }

    /// Use a custom allocation model
    pub fn with_allocation_model(mut self, model: Box<dyn AllocationModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Attach an episodic event source
    pub fn with_episode_source(mut self, source: Box<dyn EpisodeSource>) -> Self {
        self.episodes = Some(source);
        self
    }

    /// Validate the configuration and construct the session
    pub fn build(self) -> Result<ResearchSession> {
        self.config.validate()?;

        let mut orchestrator =
            Orchestrator::with_history_capacity(self.config.performance_history_capacity)?;
        if let Some(model) = self.model {
            orchestrator = orchestrator.with_model(model);
        }
        for (pool, quantity) in &self.config.resource_pools {
            orchestrator.set_resource_pool(pool.clone(), *quantity);
        }

        let metrics = MetricsCollector::with_series_capacity(self.config.metrics_series_capacity)?;

        let mut explainability =
            ExplainabilitySystem::with_history_size(self.config.explanation_history_capacity)?;
        for (kind, minimum) in &self.config.confidence_thresholds {
            explainability.set_confidence_threshold(kind.clone(), *minimum);
        }

        let telemetry = if self.config.telemetry_enabled {
            Some(Arc::new(SessionMetrics::new()?))
        } else {
            None
        };

        info!(
            domain = %self.config.domain,
            model = %orchestrator.model_name(),
            telemetry = self.config.telemetry_enabled,
            "research session built"
        );

        Ok(ResearchSession::new(
            self.config,
            orchestrator,
            metrics,
            explainability,
            telemetry,
            self.episodes,
        ))
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
