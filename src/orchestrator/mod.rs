//! Research orchestrator: resource allocation and aggregate analysis
//!
//! ## Table of Contents
//! - **Orchestrator**: Session-scoped component state and resource pools
//! - **AllocationModel**: Trait for allocation strategies
//! - **GravityAllocator**: Default physics-inspired allocation heuristic
//! - **AnalysisReport**: Aggregate analysis over interactions, research data
//!   and performance history

pub mod allocation;
pub mod analysis;

pub use allocation::{
    AllocationContext, AllocationModel, EqualSplitAllocator, GravityAllocator,
    MIN_SQUARED_DISTANCE,
};
pub use analysis::{AnalysisReport, InteractionAnalysis, PerformanceAnalysis, ResearchAnalysis};

use crate::error::{CrucibleError, Result};
use crate::ring::RingBuffer;
use crate::stats;
use crate::types::{ComponentId, PerformanceSnapshot};
use std::collections::HashMap;
use tracing::debug;

/// Mass assumed for components with no recorded mass
pub const DEFAULT_MASS: f64 = 1.0;

/// Health assumed for components with no recorded health
pub const DEFAULT_HEALTH: f64 = 0.5;

/// Default capacity of the performance history ring buffer
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Session-scoped orchestrator
///
/// Owns the shared resource pools and per-component state (mass, health,
/// homeostasis targets, observed influence relations) and derives resource
/// allocations and aggregate analysis from them. One instance lives for the
/// duration of a research session and is exclusively owned by the driver;
/// all mutation goes through `&mut self`.
pub struct Orchestrator {
    resources: HashMap<String, f64>,
    component_masses: HashMap<ComponentId, f64>,
    health_states: HashMap<ComponentId, f64>,
    homeostasis_targets: HashMap<ComponentId, f64>,
    pattern_network: HashMap<ComponentId, Vec<ComponentId>>,
    interaction_strengths: HashMap<(ComponentId, ComponentId), f64>,
    performance_history: RingBuffer<PerformanceSnapshot>,
    research_metrics: HashMap<String, Vec<f64>>,
    research_session: HashMap<String, f64>,
    analysis_results: Option<AnalysisReport>,
    last_allocation: Option<HashMap<ComponentId, f64>>,
    model: Box<dyn AllocationModel>,
}

impl Orchestrator {
    /// Create an orchestrator with default history capacity and the
    /// gravitational allocation model
    pub fn new() -> Self {
        Self {
            resources: HashMap::new(),
            component_masses: HashMap::new(),
            health_states: HashMap::new(),
            homeostasis_targets: HashMap::new(),
            pattern_network: HashMap::new(),
            interaction_strengths: HashMap::new(),
            performance_history: RingBuffer::new_unchecked(DEFAULT_HISTORY_CAPACITY),
            research_metrics: HashMap::new(),
            research_session: HashMap::new(),
            analysis_results: None,
            last_allocation: None,
            model: Box::new(GravityAllocator::new()),
        }
    }

    /// Create an orchestrator with a custom performance-history capacity
    pub fn with_history_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CrucibleError::config("performance history capacity must be positive"));
        }
        Ok(Self {
            performance_history: RingBuffer::new_unchecked(capacity),
            ..Self::new()
        })
    }

    /// Replace the allocation model (builder style)
    pub fn with_model(mut self, model: Box<dyn AllocationModel>) -> Self {
        self.model = model;
        self
    }

    /// Name of the active allocation model
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    // ------------------------------------------------------------------
    // Resource pools
    // ------------------------------------------------------------------

    /// Set the quantity held by a named resource pool
    ///
    /// Quantities are floored at zero; pools never go negative.
    pub fn set_resource_pool(&mut self, name: impl Into<String>, quantity: f64) {
        self.resources.insert(name.into(), quantity.max(0.0));
    }

    /// Quantity held by a named pool, if it exists
    pub fn resource_pool(&self, name: &str) -> Option<f64> {
        self.resources.get(name).copied()
    }

    /// Aggregate quantity across all pools
    pub fn total_resources(&self) -> f64 {
        self.resources.values().sum()
    }

    // ------------------------------------------------------------------
    // Component state
    // ------------------------------------------------------------------

    /// Set a component's mass, floored at zero
    pub fn set_mass(&mut self, id: impl Into<ComponentId>, mass: f64) {
        self.component_masses.insert(id.into(), mass.max(0.0));
    }

    /// A component's mass, defaulting to 1.0 when unknown
    pub fn mass(&self, id: &ComponentId) -> f64 {
        self.component_masses.get(id).copied().unwrap_or(DEFAULT_MASS)
    }

    /// Set a component's health, clamped to [0, 1]
    pub fn set_health(&mut self, id: impl Into<ComponentId>, health: f64) {
        self.health_states.insert(id.into(), health.clamp(0.0, 1.0));
    }

    /// A component's health, defaulting to 0.5 when unknown
    pub fn health(&self, id: &ComponentId) -> f64 {
        self.health_states.get(id).copied().unwrap_or(DEFAULT_HEALTH)
    }

    /// Set the homeostasis target external adaptation logic steers toward
    pub fn set_homeostasis_target(&mut self, id: impl Into<ComponentId>, target: f64) {
        self.homeostasis_targets.insert(id.into(), target.clamp(0.0, 1.0));
    }

    /// A component's homeostasis target, if one was set
    pub fn homeostasis_target(&self, id: &ComponentId) -> Option<f64> {
        self.homeostasis_targets.get(id).copied()
    }

    /// Record an observed influence relation in the pattern network
    ///
    /// Relations are directed; repeated links are ignored so neighbor lists
    /// stay duplicate-free in insertion order.
    pub fn link_components(&mut self, from: impl Into<ComponentId>, to: impl Into<ComponentId>) {
        let to = to.into();
        let neighbors = self.pattern_network.entry(from.into()).or_default();
        if !neighbors.contains(&to) {
            neighbors.push(to);
        }
    }

    /// Components a given component is observed to influence
    pub fn related_components(&self, id: &ComponentId) -> &[ComponentId] {
        self.pattern_network.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of components with outgoing relations
    pub fn pattern_network_size(&self) -> usize {
        self.pattern_network.len()
    }

    /// Record the strength of one directed interaction
    ///
    /// `(a, b)` and `(b, a)` are independent keys; a driver wanting
    /// symmetric interactions records both orders.
    pub fn set_interaction(
        &mut self,
        from: impl Into<ComponentId>,
        to: impl Into<ComponentId>,
        strength: f64,
    ) {
        self.interaction_strengths.insert((from.into(), to.into()), strength);
    }

    /// Strength of one directed interaction, if recorded
    pub fn interaction(&self, from: &ComponentId, to: &ComponentId) -> Option<f64> {
        self.interaction_strengths.get(&(from.clone(), to.clone())).copied()
    }

    // ------------------------------------------------------------------
    // Research data
    // ------------------------------------------------------------------

    /// Append a per-cycle performance snapshot to the bounded history
    pub fn record_performance(&mut self, snapshot: PerformanceSnapshot) {
        self.performance_history.push(snapshot);
    }

    /// The retained performance history, oldest first
    pub fn performance_history(&self) -> &RingBuffer<PerformanceSnapshot> {
        &self.performance_history
    }

    /// Set a named research-session value
    pub fn record_research_value(&mut self, name: impl Into<String>, value: f64) {
        self.research_session.insert(name.into(), value);
    }

    /// A named research-session value, if recorded
    pub fn research_value(&self, name: &str) -> Option<f64> {
        self.research_session.get(name).copied()
    }

    /// Append to a named auxiliary research series
    pub fn push_research_series(&mut self, name: impl Into<String>, value: f64) {
        self.research_metrics.entry(name.into()).or_default().push(value);
    }

    /// An auxiliary research series, if recorded
    pub fn research_series(&self, name: &str) -> Option<&[f64]> {
        self.research_metrics.get(name).map(Vec::as_slice)
    }

    // ------------------------------------------------------------------
    // Allocation and analysis
    // ------------------------------------------------------------------

    /// Distribute the aggregate resource pool across the given components
    ///
    /// Pure over the orchestrator state: the result is returned to the
    /// caller and nothing is written back. Duplicate input identifiers are
    /// collapsed to their first occurrence, so the result carries exactly
    /// one entry per distinct component and shares still sum to the total.
    /// An empty input yields an empty map.
    pub fn allocate_resources(&self, components: &[ComponentId]) -> HashMap<ComponentId, f64> {
        let mut distinct: Vec<ComponentId> = Vec::with_capacity(components.len());
        for id in components {
            if !distinct.contains(id) {
                distinct.push(id.clone());
            }
        }

        let ctx = AllocationContext::new(
            &self.component_masses,
            &self.health_states,
            self.total_resources(),
        );
        let allocation = self.model.allocate(&distinct, &ctx);
        debug!(
            model = %self.model.name(),
            components = distinct.len(),
            total = self.total_resources(),
            "computed resource allocation"
        );
        allocation
    }

    /// Persist an allocation the driver has decided to commit
    ///
    /// `allocate_resources` itself never mutates session state; committing
    /// is an explicit driver decision.
    pub fn commit_allocation(&mut self, allocation: &HashMap<ComponentId, f64>) {
        self.last_allocation = Some(allocation.clone());
    }

    /// The most recently committed allocation, if any
    pub fn last_allocation(&self) -> Option<&HashMap<ComponentId, f64>> {
        self.last_allocation.as_ref()
    }

    /// Aggregate interaction, research and performance statistics
    ///
    /// Sections whose backing collection is empty are omitted from the
    /// report rather than zero-filled. The report is also stored and
    /// readable via [`Orchestrator::analysis_results`] until the next call
    /// overwrites it.
    pub fn analyze_research_data(&mut self) -> AnalysisReport {
        let interaction = if self.interaction_strengths.is_empty() {
            None
        } else {
            let strengths: Vec<f64> = self.interaction_strengths.values().copied().collect();
            Some(InteractionAnalysis {
                mean_strength: stats::mean(&strengths).unwrap_or(0.0),
                network_size: self.pattern_network.len(),
            })
        };

        let research = if self.research_session.is_empty() {
            None
        } else {
            let values: Vec<f64> = self.research_session.values().copied().collect();
            Some(ResearchAnalysis {
                mean: stats::mean(&values).unwrap_or(0.0),
                std_dev: stats::population_std_dev(&values).unwrap_or(0.0),
            })
        };

        let performance = if self.performance_history.is_empty() {
            None
        } else {
            let overall: Vec<f64> =
                self.performance_history.iter().map(PerformanceSnapshot::overall).collect();
            let first = overall.first().copied().unwrap_or(0.0);
            let last = overall.last().copied().unwrap_or(0.0);
            Some(PerformanceAnalysis {
                mean_overall: stats::mean(&overall).unwrap_or(0.0),
                trend: last - first,
            })
        };

        let report = AnalysisReport {
            interaction,
            research,
            performance,
        };
        self.analysis_results = Some(report.clone());
        report
    }

    /// The report stored by the most recent `analyze_research_data` call
    pub fn analysis_results(&self) -> Option<&AnalysisReport> {
        self.analysis_results.as_ref()
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
