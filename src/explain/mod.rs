//! Explainability engine: patterns, causal graph and explanation synthesis
//!
//! ## Table of Contents
//! - **ExplainabilitySystem**: Pattern registry, causal graph and bounded
//!   explanation history
//! - **Observation**: Before/after snapshot of one research cycle
//! - **Explanation / ExplanationContext**: Synthesized narrative with
//!   confidence, evidence and alternatives
//! - Submodules: [`patterns`], [`causal`], [`model`]

pub mod causal;
pub mod model;
pub mod patterns;

pub use causal::CausalGraph;
pub use model::{
    AbstractionRule, BoundsValidator, CausalAnalyzer, ConfidenceEstimator, DomainSpanRule,
    EvidenceWeightedEstimator, ExplanationModel, MagnitudeOrderedAnalyzer, MetricDriftDetector,
    PatternDetector, StateShiftDetector, Validator,
};
pub use patterns::CrossDomainPattern;

use crate::error::{CrucibleError, Result};
use crate::metrics::MetricSummary;
use crate::orchestrator::AnalysisReport;
use crate::ring::RingBuffer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};
use uuid::Uuid;

/// Default capacity of the explanation history
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Confidence assigned to an explanation with no supporting pattern
pub const BASELINE_CONFIDENCE: f64 = 0.1;

/// One research cycle as seen by the explainability engine
///
/// Carries the before/after state pair, the latest orchestrator analysis,
/// the current metrics summaries, and any extra evidence supplied by
/// external collaborators (e.g. recalled episodes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Domain tag selecting the explanation model
    pub domain: String,
    /// State snapshot before the observed change
    pub state_before: HashMap<String, f64>,
    /// State snapshot after the observed change
    pub state_after: HashMap<String, f64>,
    /// Latest aggregate analysis, if one was produced this cycle
    pub analysis: Option<AnalysisReport>,
    /// Current per-metric summaries
    pub metrics: HashMap<String, MetricSummary>,
    /// Additional evidence records from external sources
    pub extra_evidence: Vec<HashMap<String, String>>,
}

impl Observation {
    /// Create an observation for a domain with empty state
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            state_before: HashMap::new(),
            state_after: HashMap::new(),
            analysis: None,
            metrics: HashMap::new(),
            extra_evidence: Vec::new(),
        }
    }

    /// Attach the before/after state pair (builder style)
    pub fn with_state(
        mut self,
        before: HashMap<String, f64>,
        after: HashMap<String, f64>,
    ) -> Self {
        self.state_before = before;
        self.state_after = after;
        self
    }

    /// Attach the latest analysis report (builder style)
    pub fn with_analysis(mut self, report: AnalysisReport) -> Self {
        self.analysis = Some(report);
        self
    }

    /// Attach the current metric summaries (builder style)
    pub fn with_metrics(mut self, metrics: HashMap<String, MetricSummary>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Append an external evidence record
    pub fn push_evidence(&mut self, attributes: HashMap<String, String>) {
        self.extra_evidence.push(attributes);
    }

    /// Change in one state field; a missing side reads as 0.0
    pub fn delta(&self, key: &str) -> f64 {
        self.state_after.get(key).copied().unwrap_or(0.0)
            - self.state_before.get(key).copied().unwrap_or(0.0)
    }

    /// Fields that changed, with their deltas, ordered by descending
    /// magnitude (ties broken by name for determinism)
    pub fn changed_keys(&self) -> Vec<(String, f64)> {
        let mut keys: BTreeSet<&String> = self.state_before.keys().collect();
        keys.extend(self.state_after.keys());

        let mut changed: Vec<(String, f64)> = keys
            .into_iter()
            .map(|k| (k.clone(), self.delta(k)))
            .filter(|(_, delta)| *delta != 0.0)
            .collect();
        changed.sort_by(|a, b| {
            b.1.abs()
                .partial_cmp(&a.1.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        changed
    }

    /// Identifier of the causal-graph node for one state field
    pub fn event_node(&self, key: &str) -> String {
        format!("{}:{}", self.domain, key)
    }
}

/// Snapshot of the circumstances an explanation was synthesized in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationContext {
    /// When the explanation was synthesized
    pub timestamp: DateTime<Utc>,
    /// Domain the observation belonged to
    pub domain: String,
    /// State before the observed change
    pub state_before: HashMap<String, f64>,
    /// State after the observed change
    pub state_after: HashMap<String, f64>,
    /// Patterns active for this observation, highest confidence first
    pub active_patterns: Vec<CrossDomainPattern>,
    /// Inferred cause-to-effect path through the causal graph
    pub causal_chain: Vec<String>,
}

/// A synthesized explanation of one observed state change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    /// Unique explanation identifier
    pub id: Uuid,
    /// Circumstances the explanation was synthesized in
    pub context: ExplanationContext,
    /// Human-readable narrative summarizing the dominant pattern(s)
    pub description: String,
    /// Confidence in [0, 1], non-decreasing in pattern confidence and
    /// evidence count
    pub confidence: f64,
    /// Supporting evidence records, in collection order
    pub evidence: Vec<HashMap<String, String>>,
    /// Competing lower-confidence narratives
    pub alternative_explanations: Vec<String>,
    /// 0 for a raw-event narrative, higher for more generalized ones
    pub abstraction_level: u32,
}

/// Pattern registry, causal graph and explanation synthesis
///
/// One instance lives for a research session. Models are kept per domain
/// and lazily created with the standard capability set the first time a
/// domain is observed.
pub struct ExplainabilitySystem {
    explanation_history: RingBuffer<Explanation>,
    active_models: HashMap<String, ExplanationModel>,
    pattern_registry: HashMap<String, CrossDomainPattern>,
    confidence_thresholds: HashMap<String, f64>,
    causal_graph: CausalGraph,
}

impl ExplainabilitySystem {
    /// Create a system with the default history capacity
    pub fn new() -> Self {
        Self {
            explanation_history: RingBuffer::new_unchecked(DEFAULT_HISTORY_CAPACITY),
            active_models: HashMap::new(),
            pattern_registry: HashMap::new(),
            confidence_thresholds: HashMap::new(),
            causal_graph: CausalGraph::new(),
        }
    }

    /// Create a system with a custom history capacity
    ///
    /// A capacity of zero is rejected as a configuration error.
    pub fn with_history_size(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(CrucibleError::config("explanation history size must be positive"));
        }
        Ok(Self {
            explanation_history: RingBuffer::new_unchecked(size),
            ..Self::new()
        })
    }

    /// Register (or replace) the model for its domain
    pub fn register_model(&mut self, model: ExplanationModel) {
        debug!(domain = %model.domain(), "registered explanation model");
        self.active_models.insert(model.domain().to_string(), model);
    }

    /// The model for a domain, if one exists
    pub fn model(&self, domain: &str) -> Option<&ExplanationModel> {
        self.active_models.get(domain)
    }

    /// The model for a domain, creating the standard one on first use
    pub fn model_mut(&mut self, domain: &str) -> &mut ExplanationModel {
        self.active_models
            .entry(domain.to_string())
            .or_insert_with(|| ExplanationModel::standard(domain))
    }

    /// Minimum confidence required to retain patterns of a kind
    pub fn set_confidence_threshold(&mut self, kind: impl Into<String>, minimum: f64) {
        self.confidence_thresholds.insert(kind.into(), minimum.clamp(0.0, 1.0));
    }

    /// The configured threshold for a pattern kind, if any
    pub fn confidence_threshold(&self, kind: &str) -> Option<f64> {
        self.confidence_thresholds.get(kind).copied()
    }

    /// Upsert a detected pattern into the registry
    ///
    /// Returns whether the pattern was retained. Detections below the
    /// kind's configured threshold are discarded; kinds with no threshold
    /// are always accepted. Repeated detections of the same id update the
    /// stored entry instead of duplicating it.
    pub fn register_pattern(&mut self, pattern: CrossDomainPattern) -> bool {
        let threshold = self
            .confidence_thresholds
            .get(pattern.kind())
            .copied()
            .unwrap_or(0.0);
        if pattern.confidence < threshold {
            debug!(
                pattern = %pattern.id,
                confidence = pattern.confidence,
                threshold,
                "pattern below confidence threshold"
            );
            return false;
        }
        match self.pattern_registry.entry(pattern.id.clone()) {
            Entry::Occupied(mut entry) => entry.get_mut().merge_detection(&pattern),
            Entry::Vacant(entry) => {
                entry.insert(pattern);
            }
        }
        true
    }

    /// A registered pattern by id
    pub fn pattern(&self, id: &str) -> Option<&CrossDomainPattern> {
        self.pattern_registry.get(id)
    }

    /// All registered patterns
    pub fn patterns(&self) -> impl Iterator<Item = &CrossDomainPattern> {
        self.pattern_registry.values()
    }

    /// Number of registered patterns
    pub fn pattern_count(&self) -> usize {
        self.pattern_registry.len()
    }

    /// The causal graph accumulated so far
    pub fn causal_graph(&self) -> &CausalGraph {
        &self.causal_graph
    }

    /// Record an externally established causal chain
    ///
    /// Ensures every identifier exists as a node and each consecutive pair
    /// is connected; idempotent for already-known edges.
    pub fn record_causal_chain(&mut self, chain: &[String]) {
        self.causal_graph.add_chain(chain);
    }

    /// Synthesize an explanation for one observation
    ///
    /// Runs the domain model's detectors and analyzers, updates the
    /// pattern registry and causal graph, walks the graph from the event
    /// node most proximate to the state change, and appends the resulting
    /// explanation to the bounded history. Never fails: degenerate
    /// observations yield a baseline-confidence explanation.
    pub fn explain(&mut self, observation: Observation) -> Explanation {
        let domain = observation.domain.clone();

        // Detection and registry upkeep. Active patterns are re-read from
        // the registry so repeated detections carry merged support.
        let detected = self.model_mut(&domain).run_detectors(&observation);
        let mut active: Vec<CrossDomainPattern> = Vec::new();
        for pattern in detected {
            let id = pattern.id.clone();
            if self.register_pattern(pattern) {
                if let Some(updated) = self.pattern_registry.get(&id) {
                    active.push(updated.clone());
                }
            }
        }
        active.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        // Causal maintenance: merge proposed chains, then walk outgoing
        // edges from the most proximate event node.
        let proposed = self.model_mut(&domain).run_analyzers(&observation);
        for chain in &proposed {
            self.causal_graph.add_chain(chain);
        }
        let root = observation
            .changed_keys()
            .first()
            .map(|(key, _)| observation.event_node(key));
        let causal_chain = root
            .as_deref()
            .map(|r| self.causal_graph.walk_chain(r))
            .unwrap_or_default();

        let mut alternatives = Vec::new();
        if let Some(root) = &root {
            for alt in self.causal_graph.alternative_chains(root) {
                alternatives.push(format!("Alternative causal path: {}", alt.join(" -> ")));
            }
        }
        for pattern in active.iter().skip(1) {
            alternatives.push(format!(
                "Competing pattern '{}' (confidence {:.2})",
                pattern.id, pattern.confidence
            ));
        }

        let evidence = self.collect_evidence(&observation);
        let description = Self::describe(&domain, &active, &causal_chain, &observation);

        let base = active.first().map(|p| p.confidence).unwrap_or(BASELINE_CONFIDENCE);
        let confidence = self.model_mut(&domain).estimate_confidence(base, evidence.len());
        let abstraction_level = self.model_mut(&domain).abstraction_level(&observation, &active);

        let mut explanation = Explanation {
            id: Uuid::new_v4(),
            context: ExplanationContext {
                timestamp: Utc::now(),
                domain: domain.clone(),
                state_before: observation.state_before.clone(),
                state_after: observation.state_after.clone(),
                active_patterns: active,
                causal_chain,
            },
            description,
            confidence,
            evidence,
            alternative_explanations: alternatives,
            abstraction_level,
        };

        let failed: Vec<String> = self
            .model_mut(&domain)
            .failed_validators(&explanation)
            .into_iter()
            .map(String::from)
            .collect();
        for validator in &failed {
            warn!(validator = %validator, id = %explanation.id, "explanation rejected by validator, demoting confidence");
            explanation.confidence *= 0.5;
        }

        self.explanation_history.push(explanation.clone());
        debug!(
            id = %explanation.id,
            domain = %domain,
            confidence = explanation.confidence,
            "explanation recorded"
        );
        explanation
    }

    /// Synthesized explanations still retained, oldest first
    pub fn explanations(&self) -> impl Iterator<Item = &Explanation> {
        self.explanation_history.iter()
    }

    /// The most recent explanation, if any
    pub fn latest_explanation(&self) -> Option<&Explanation> {
        self.explanation_history.newest()
    }

    /// Number of retained explanations
    pub fn history_len(&self) -> usize {
        self.explanation_history.len()
    }

    /// Maximum number of retained explanations
    pub fn history_capacity(&self) -> usize {
        self.explanation_history.capacity()
    }

    fn collect_evidence(&self, observation: &Observation) -> Vec<HashMap<String, String>> {
        let mut evidence = Vec::new();

        let mut names: Vec<&String> = observation.metrics.keys().collect();
        names.sort();
        for name in names {
            if let Some(summary) = observation.metrics.get(name) {
                let mut attrs = HashMap::new();
                attrs.insert("source".to_string(), "metrics".to_string());
                attrs.insert("metric".to_string(), name.clone());
                attrs.insert("mean".to_string(), format!("{:.6}", summary.mean));
                attrs.insert("std_dev".to_string(), format!("{:.6}", summary.std_dev));
                attrs.insert("last".to_string(), format!("{:.6}", summary.last));
                evidence.push(attrs);
            }
        }

        if let Some(report) = &observation.analysis {
            if let Some(interaction) = &report.interaction {
                let mut attrs = HashMap::new();
                attrs.insert("source".to_string(), "analysis".to_string());
                attrs.insert("section".to_string(), "interaction".to_string());
                attrs.insert("mean_strength".to_string(), format!("{:.6}", interaction.mean_strength));
                attrs.insert("network_size".to_string(), interaction.network_size.to_string());
                evidence.push(attrs);
            }
            if let Some(research) = &report.research {
                let mut attrs = HashMap::new();
                attrs.insert("source".to_string(), "analysis".to_string());
                attrs.insert("section".to_string(), "research".to_string());
                attrs.insert("mean".to_string(), format!("{:.6}", research.mean));
                attrs.insert("std_dev".to_string(), format!("{:.6}", research.std_dev));
                evidence.push(attrs);
            }
            if let Some(performance) = &report.performance {
                let mut attrs = HashMap::new();
                attrs.insert("source".to_string(), "analysis".to_string());
                attrs.insert("section".to_string(), "performance".to_string());
                attrs.insert("mean_overall".to_string(), format!("{:.6}", performance.mean_overall));
                attrs.insert("trend".to_string(), format!("{:.6}", performance.trend));
                evidence.push(attrs);
            }
        }

        evidence.extend(observation.extra_evidence.iter().cloned());
        evidence
    }

    fn describe(
        domain: &str,
        active: &[CrossDomainPattern],
        causal_chain: &[String],
        observation: &Observation,
    ) -> String {
        match active.first() {
            Some(dominant) => {
                let domains: Vec<&str> = dominant.domains.iter().map(String::as_str).collect();
                if causal_chain.len() > 1 {
                    format!(
                        "Dominant pattern '{}' (confidence {:.2}) across [{}]; causal chain {}",
                        dominant.id,
                        dominant.confidence,
                        domains.join(", "),
                        causal_chain.join(" -> ")
                    )
                } else {
                    format!(
                        "Dominant pattern '{}' (confidence {:.2}) across [{}]",
                        dominant.id,
                        dominant.confidence,
                        domains.join(", ")
                    )
                }
            }
            None => format!(
                "No dominant pattern in domain '{}'; {} field(s) changed",
                domain,
                observation.changed_keys().len()
            ),
        }
    }
}

impl Default for ExplainabilitySystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shifted_observation(domain: &str, delta: f64) -> Observation {
        let mut before = HashMap::new();
        before.insert("health".to_string(), 0.5);
        let mut after = HashMap::new();
        after.insert("health".to_string(), 0.5 + delta);
        Observation::new(domain).with_state(before, after)
    }

    #[test]
    fn test_explain_records_history_and_patterns() {
        let mut system = ExplainabilitySystem::new();
        let explanation = system.explain(shifted_observation("perf", 0.4));

        assert!(!explanation.description.is_empty());
        assert!(explanation.confidence > 0.0 && explanation.confidence <= 1.0);
        assert_eq!(system.history_len(), 1);
        assert!(system.pattern("shift:health").is_some());
        assert!(system.causal_graph().contains("perf:health"));
    }

    #[test]
    fn test_history_never_exceeds_capacity() {
        let mut system = ExplainabilitySystem::with_history_size(3).unwrap();
        for i in 0..10 {
            system.explain(shifted_observation("perf", 0.1 + 0.01 * i as f64));
            assert!(system.history_len() <= 3);
        }
        assert_eq!(system.history_len(), 3);
    }

    #[test]
    fn test_zero_history_size_rejected() {
        assert!(ExplainabilitySystem::with_history_size(0).is_err());
    }

    #[test]
    fn test_threshold_gates_pattern_registration() {
        let mut system = ExplainabilitySystem::new();
        system.set_confidence_threshold("shift", 0.9);

        let explanation = system.explain(shifted_observation("perf", 0.3));
        assert_eq!(system.pattern_count(), 0);
        assert!(explanation.context.active_patterns.is_empty());
        // With nothing retained the explanation falls back to baseline
        // confidence boosted only by evidence.
        assert!(explanation.confidence < 0.5);
    }

    #[test]
    fn test_repeated_detection_upserts() {
        let mut system = ExplainabilitySystem::new();
        system.explain(shifted_observation("perf", 0.4));
        system.explain(shifted_observation("perf", 0.4));

        assert_eq!(system.pattern_count(), 1);
        let pattern = system.pattern("shift:health").unwrap();
        // Support accumulates across detections instead of duplicating.
        assert!((pattern.support["perf"] - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_observation_gets_baseline_explanation() {
        let mut system = ExplainabilitySystem::new();
        let explanation = system.explain(Observation::new("quiet"));

        assert!(explanation.context.active_patterns.is_empty());
        assert!(explanation.context.causal_chain.is_empty());
        assert!((explanation.confidence - BASELINE_CONFIDENCE).abs() < 1e-9);
        assert_eq!(explanation.abstraction_level, 0);
    }

    #[test]
    fn test_recorded_chain_feeds_later_walks() {
        let mut system = ExplainabilitySystem::new();
        let chain: Vec<String> = ["perf:health", "perf:latency", "io:queue"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        system.record_causal_chain(&chain);
        // Re-recording must not duplicate edges.
        system.record_causal_chain(&chain);
        assert_eq!(system.causal_graph().edge_count(), 2);

        let explanation = system.explain(shifted_observation("perf", 0.2));
        assert_eq!(
            explanation.context.causal_chain,
            vec!["perf:health".to_string(), "perf:latency".to_string(), "io:queue".to_string()]
        );
    }

    #[test]
    fn test_cyclic_chain_explanation_terminates() {
        let mut system = ExplainabilitySystem::new();
        let cycle: Vec<String> = ["perf:health", "perf:load", "perf:health"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        system.record_causal_chain(&cycle);

        let explanation = system.explain(shifted_observation("perf", 0.2));
        assert_eq!(explanation.context.causal_chain.len(), 2);
    }

    #[test]
    fn test_custom_empty_model_is_respected() {
        let mut system = ExplainabilitySystem::new();
        system.register_model(ExplanationModel::empty("perf"));

        let explanation = system.explain(shifted_observation("perf", 0.4));
        assert!(explanation.context.active_patterns.is_empty());
        assert_eq!(explanation.confidence, BASELINE_CONFIDENCE);
    }

    #[test]
    fn test_evidence_collected_from_metrics_and_analysis() {
        use crate::orchestrator::{InteractionAnalysis, PerformanceAnalysis};

        let mut metrics = HashMap::new();
        metrics.insert(
            "cpu".to_string(),
            MetricSummary { mean: 0.5, std_dev: 0.0, min: 0.5, max: 0.5, last: 0.5 },
        );
        let report = AnalysisReport {
            interaction: Some(InteractionAnalysis { mean_strength: 0.7, network_size: 2 }),
            research: None,
            performance: Some(PerformanceAnalysis { mean_overall: 0.4, trend: 0.1 }),
        };
        let observation = shifted_observation("perf", 0.2)
            .with_metrics(metrics)
            .with_analysis(report);

        let mut system = ExplainabilitySystem::new();
        let explanation = system.explain(observation);
        // One metric record plus two analysis sections.
        assert_eq!(explanation.evidence.len(), 3);
        assert_eq!(explanation.evidence[0]["source"], "metrics");
    }

    #[test]
    fn test_alternatives_surface_competing_chains() {
        let mut system = ExplainabilitySystem::new();
        system.record_causal_chain(
            &["perf:health", "perf:main"].iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        );
        system.record_causal_chain(
            &["perf:health", "perf:side"].iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        );

        let explanation = system.explain(shifted_observation("perf", 0.2));
        assert!(explanation
            .alternative_explanations
            .iter()
            .any(|alt| alt.contains("perf:side")));
    }
}
