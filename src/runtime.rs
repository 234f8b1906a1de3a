//! Research session runtime
//!
//! ## Table of Contents
//! - **ResearchSession**: Owns the orchestrator/metrics/explainability
//!   triad and drives the per-cycle control flow
//! - **CycleReport**: Result of one research cycle
//!
//! One research cycle is a synchronous sequence: allocate resources,
//! commit the result, analyze research data, record the observed
//! quantities, synthesize an explanation. The session is exclusively
//! owned by the driver and single-threaded by design; a concurrent driver
//! must put its own mutual-exclusion boundary around the session.

use crate::builder::SessionConfig;
use crate::episodes::EpisodeSource;
use crate::explain::{ExplainabilitySystem, Explanation, Observation};
use crate::metrics::MetricsCollector;
use crate::orchestrator::{AnalysisReport, Orchestrator};
use crate::telemetry::{SessionMetrics, Timer};
use crate::types::ComponentId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Result of one research cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Cycle number, starting at 1
    pub cycle: u64,
    /// Resource shares computed and committed this cycle
    pub allocation: HashMap<ComponentId, f64>,
    /// Aggregate analysis produced this cycle
    pub analysis: AnalysisReport,
    /// Explanation synthesized for this cycle's state change
    pub explanation: Explanation,
}

/// A running research session
///
/// Construct via [`crate::builder::SessionBuilder`].
pub struct ResearchSession {
    config: SessionConfig,
    orchestrator: Orchestrator,
    metrics: MetricsCollector,
    explainability: ExplainabilitySystem,
    telemetry: Option<Arc<SessionMetrics>>,
    episodes: Option<Box<dyn EpisodeSource>>,
    cycle: u64,
    last_health: HashMap<String, f64>,
}

impl ResearchSession {
    pub(crate) fn new(
        config: SessionConfig,
        orchestrator: Orchestrator,
        metrics: MetricsCollector,
        explainability: ExplainabilitySystem,
        telemetry: Option<Arc<SessionMetrics>>,
        episodes: Option<Box<dyn EpisodeSource>>,
    ) -> Self {
        Self {
            config,
            orchestrator,
            metrics,
            explainability,
            telemetry,
            episodes,
            cycle: 0,
            last_health: HashMap::new(),
        }
    }

    /// The session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The session orchestrator
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Mutable access to the orchestrator for driver updates
    pub fn orchestrator_mut(&mut self) -> &mut Orchestrator {
        &mut self.orchestrator
    }

    /// The session metrics collector
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Mutable access to the metrics collector
    pub fn metrics_mut(&mut self) -> &mut MetricsCollector {
        &mut self.metrics
    }

    /// The session explainability system
    pub fn explainability(&self) -> &ExplainabilitySystem {
        &self.explainability
    }

    /// Mutable access to the explainability system
    pub fn explainability_mut(&mut self) -> &mut ExplainabilitySystem {
        &mut self.explainability
    }

    /// Session telemetry, when enabled
    pub fn telemetry(&self) -> Option<&Arc<SessionMetrics>> {
        self.telemetry.as_ref()
    }

    /// Attach an episodic event source
    pub fn set_episode_source(&mut self, source: Box<dyn EpisodeSource>) {
        self.episodes = Some(source);
    }

    /// Number of completed cycles
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Run one research cycle over the given components
    ///
    /// Performs allocate, commit, analyze, record and explain in order and
    /// returns the combined result. Never fails; degenerate state yields
    /// empty allocations and a baseline-confidence explanation.
    pub fn run_cycle(&mut self, components: &[ComponentId]) -> CycleReport {
        let timer = Timer::start();

        let allocation = self.orchestrator.allocate_resources(components);
        let allocation_secs = timer.elapsed_secs();
        self.orchestrator.commit_allocation(&allocation);

        let analysis = self.orchestrator.analyze_research_data();

        for (component, share) in &allocation {
            self.metrics.record_metric(format!("allocation.{}", component), *share);
        }
        for component in components {
            self.metrics
                .record_metric(format!("health.{}", component), self.orchestrator.health(component));
        }
        if let Some(performance) = &analysis.performance {
            self.metrics.record_metric("performance.overall", performance.mean_overall);
        }

        let after: HashMap<String, f64> = components
            .iter()
            .map(|c| (c.to_string(), self.orchestrator.health(c)))
            .collect();
        let before = std::mem::replace(&mut self.last_health, after.clone());

        let mut observation = Observation::new(&self.config.domain)
            .with_state(before, after)
            .with_analysis(analysis.clone())
            .with_metrics(self.metrics.get_metrics_summary());
        if let Some(source) = &self.episodes {
            if let Some(episode) = source.recall(&self.config.domain) {
                observation.push_evidence(episode.as_evidence());
            }
        }

        let explanation = self.explainability.explain(observation);

        self.cycle += 1;
        if let Some(telemetry) = &self.telemetry {
            telemetry.record_cycle();
            telemetry.record_allocation(&allocation, allocation_secs);
            telemetry.record_explanation(explanation.confidence);
            telemetry.set_active_patterns(self.explainability.pattern_count() as f64);
        }
        info!(
            cycle = self.cycle,
            components = components.len(),
            confidence = explanation.confidence,
            "research cycle complete"
        );

        CycleReport {
            cycle: self.cycle,
            allocation,
            analysis,
            explanation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SessionBuilder;
    use crate::episodes::{Episode, MockEpisodeSource};

    fn ids(names: &[&str]) -> Vec<ComponentId> {
        names.iter().map(|n| ComponentId::from(*n)).collect()
    }

    fn session() -> ResearchSession {
        SessionBuilder::new()
            .domain("research")
            .with_resource_pool("compute", 100.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_cycle_allocates_and_commits() {
        let mut session = session();
        session.orchestrator_mut().set_health("a", 0.9);
        session.orchestrator_mut().set_health("b", 0.3);

        let report = session.run_cycle(&ids(&["a", "b"]));
        assert_eq!(report.cycle, 1);
        assert_eq!(report.allocation.len(), 2);
        let total: f64 = report.allocation.values().sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(session.orchestrator().last_allocation(), Some(&report.allocation));
    }

    #[test]
    fn test_cycle_records_metrics() {
        let mut session = session();
        session.run_cycle(&ids(&["a", "b"]));

        assert!(session.metrics().series("allocation.a").is_some());
        assert!(session.metrics().series("health.b").is_some());
        assert_eq!(session.cycle(), 1);
    }

    #[test]
    fn test_health_shift_between_cycles_is_explained() {
        let mut session = session();
        let components = ids(&["a", "b"]);
        session.orchestrator_mut().set_health("a", 0.5);
        session.orchestrator_mut().set_health("b", 0.5);
        session.run_cycle(&components);

        session.orchestrator_mut().set_health("a", 0.9);
        let report = session.run_cycle(&components);

        assert!(session.explainability().pattern("shift:a").is_some());
        assert!(report.explanation.context.causal_chain.iter().any(|n| n.contains(":a")));
    }

    #[test]
    fn test_telemetry_counts_cycles() {
        let mut session = session();
        session.run_cycle(&ids(&["a"]));
        session.run_cycle(&ids(&["a"]));

        let telemetry = session.telemetry().unwrap();
        let text = telemetry.gather_text().unwrap();
        assert!(text.contains("crucible_cycles_total 2"));
    }

    #[test]
    fn test_recalled_episode_becomes_evidence() {
        let mut source = MockEpisodeSource::new();
        source.expect_recall().returning(|query| {
            Some(Episode::new(query).with_attribute("note", "prior incident"))
        });

        let mut session = session();
        session.set_episode_source(Box::new(source));
        let report = session.run_cycle(&ids(&["a"]));

        assert!(report
            .explanation
            .evidence
            .iter()
            .any(|attrs| attrs.get("source").map(String::as_str) == Some("episode")));
    }

    #[test]
    fn test_empty_component_set_cycle_is_harmless() {
        let mut session = session();
        let report = session.run_cycle(&[]);
        assert!(report.allocation.is_empty());
        assert_eq!(report.cycle, 1);
        assert!(!report.explanation.description.is_empty());
    }
}
