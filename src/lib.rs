//! # Crucible Research
//!
//! A Rust-native core for self-adaptive research platforms: loosely-coupled
//! components whose health, resources and pairwise interactions evolve over
//! discrete research cycles.
//!
//! ## Features
//!
//! - **Orchestration**: Gravitational resource allocation driven by
//!   component health and mass, with pluggable allocation models
//! - **Analysis**: Aggregate interaction, research and performance
//!   statistics that degrade gracefully on empty inputs
//! - **Metrics**: Bounded per-name time series with derived summaries
//! - **Explainability**: Cross-domain pattern registry, causal graph and
//!   explanation synthesis with confidence and alternatives
//! - **Telemetry**: Prometheus-compatible instrumentation of the session
//!   loop itself
//!
//! ## Quick Start
//!
//! ```rust
//! use crucible_research::prelude::*;
//!
//! fn main() -> crucible_research::Result<()> {
//!     let mut session = SessionBuilder::new()
//!         .with_resource_pool("compute", 100.0)
//!         .build()?;
//!
//!     let components = vec![
//!         ComponentId::from("collector"),
//!         ComponentId::from("analyzer"),
//!     ];
//!     session.orchestrator_mut().set_health("collector", 0.8);
//!     session.orchestrator_mut().set_mass("analyzer", 2.0);
//!
//!     let report = session.run_cycle(&components);
//!     assert_eq!(report.allocation.len(), 2);
//!     println!("{}", report.explanation.description);
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! The core is deliberately single-threaded: one research cycle is a
//! synchronous sequence of in-memory computations over session state that
//! is exclusively owned by the driver. Drivers running cycles from
//! multiple threads must wrap the session in their own mutual-exclusion
//! or actor boundary.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod builder;
pub mod episodes;
pub mod error;
pub mod explain;
pub mod lawgen;
pub mod metrics;
pub mod orchestrator;
pub mod ring;
pub mod runtime;
pub mod stats;
pub mod telemetry;
pub mod types;

// Re-exports for ergonomic API
pub use builder::{SessionBuilder, SessionConfig};
pub use episodes::{Episode, EpisodeSource, MemoryEpisodeStore};
pub use error::{CrucibleError, Result};
pub use explain::{
    CausalGraph, CrossDomainPattern, ExplainabilitySystem, Explanation, ExplanationContext,
    ExplanationModel, Observation,
};
pub use lawgen::{generate_law_file, LawGenConfig, LawSpec};
pub use metrics::{MetricSample, MetricSummary, MetricsCollector};
pub use orchestrator::{
    AllocationModel, AnalysisReport, EqualSplitAllocator, GravityAllocator, Orchestrator,
};
pub use ring::RingBuffer;
pub use runtime::{CycleReport, ResearchSession};
pub use telemetry::{SessionMetrics, TelemetryExporter, TelemetryHook};
pub use types::{ComponentId, PerformanceSnapshot};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::SessionBuilder;
    pub use crate::error::Result;
    pub use crate::explain::{ExplainabilitySystem, Observation};
    pub use crate::metrics::MetricsCollector;
    pub use crate::orchestrator::{GravityAllocator, Orchestrator};
    pub use crate::runtime::ResearchSession;
    pub use crate::types::{ComponentId, PerformanceSnapshot};
}
