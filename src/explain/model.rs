//! Pluggable explanation capabilities
//!
//! ## Table of Contents
//! - **PatternDetector / CausalAnalyzer / ConfidenceEstimator /
//!   AbstractionRule / Validator**: Capability traits
//! - **ExplanationModel**: Per-domain bundle of ordered capability sets
//! - Standard implementations of each capability
//!
//! Each capability set holds zero or more registered implementations and is
//! always invoked in registration order, so explanation synthesis stays
//! deterministic no matter how a domain's model was assembled.

use super::{CrossDomainPattern, Explanation, Observation};
use tracing::debug;

/// Detects candidate patterns in an observation
pub trait PatternDetector: Send + Sync {
    /// Inspect the observation and return zero or more candidate patterns
    fn detect(&self, observation: &Observation) -> Vec<CrossDomainPattern>;

    /// Detector name for logging
    fn name(&self) -> &str {
        "custom"
    }
}

/// Proposes causal chains implied by an observation
pub trait CausalAnalyzer: Send + Sync {
    /// Return candidate chains of event identifiers, cause first
    fn analyze(&self, observation: &Observation) -> Vec<Vec<String>>;

    /// Analyzer name for logging
    fn name(&self) -> &str {
        "custom"
    }
}

/// Refines explanation confidence from evidence
pub trait ConfidenceEstimator: Send + Sync {
    /// Produce a refined confidence from the current estimate and the
    /// amount of collected evidence
    ///
    /// Implementations must be monotonically non-decreasing in both
    /// arguments.
    fn estimate(&self, confidence: f64, evidence_count: usize) -> f64;

    /// Estimator name for logging
    fn name(&self) -> &str {
        "custom"
    }
}

/// Selects how abstracted an explanation's narrative should be
pub trait AbstractionRule: Send + Sync {
    /// Abstraction level for the observation: 0 is a raw-event narrative,
    /// higher values are progressively more generalized
    fn level(&self, observation: &Observation, active_patterns: &[CrossDomainPattern]) -> u32;

    /// Rule name for logging
    fn name(&self) -> &str {
        "custom"
    }
}

/// Validates a synthesized explanation
pub trait Validator: Send + Sync {
    /// Whether the explanation is internally consistent
    fn validate(&self, explanation: &Explanation) -> bool;

    /// Validator name for logging
    fn name(&self) -> &str {
        "custom"
    }
}

/// Per-domain bundle of the five capability sets
///
/// Detectors, analyzers, estimators, abstraction rules and validators are
/// registered into ordered collections and invoked in registration order.
pub struct ExplanationModel {
    domain: String,
    detectors: Vec<Box<dyn PatternDetector>>,
    analyzers: Vec<Box<dyn CausalAnalyzer>>,
    estimators: Vec<Box<dyn ConfidenceEstimator>>,
    abstraction_rules: Vec<Box<dyn AbstractionRule>>,
    validators: Vec<Box<dyn Validator>>,
}

impl ExplanationModel {
    /// Create a model with no registered capabilities
    pub fn empty(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            detectors: Vec::new(),
            analyzers: Vec::new(),
            estimators: Vec::new(),
            abstraction_rules: Vec::new(),
            validators: Vec::new(),
        }
    }

    /// Create a model with the standard capability set
    pub fn standard(domain: impl Into<String>) -> Self {
        let mut model = Self::empty(domain);
        model.register_detector(Box::new(StateShiftDetector::default()));
        model.register_detector(Box::new(MetricDriftDetector::default()));
        model.register_analyzer(Box::new(MagnitudeOrderedAnalyzer));
        model.register_estimator(Box::new(EvidenceWeightedEstimator::default()));
        model.register_abstraction_rule(Box::new(DomainSpanRule));
        model.register_validator(Box::new(BoundsValidator));
        model
    }

    /// Domain tag this model explains
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Register a pattern detector
    pub fn register_detector(&mut self, detector: Box<dyn PatternDetector>) {
        debug!(domain = %self.domain, detector = %detector.name(), "registered pattern detector");
        self.detectors.push(detector);
    }

    /// Register a causal analyzer
    pub fn register_analyzer(&mut self, analyzer: Box<dyn CausalAnalyzer>) {
        debug!(domain = %self.domain, analyzer = %analyzer.name(), "registered causal analyzer");
        self.analyzers.push(analyzer);
    }

    /// Register a confidence estimator
    pub fn register_estimator(&mut self, estimator: Box<dyn ConfidenceEstimator>) {
        debug!(domain = %self.domain, estimator = %estimator.name(), "registered confidence estimator");
        self.estimators.push(estimator);
    }

    /// Register an abstraction rule
    pub fn register_abstraction_rule(&mut self, rule: Box<dyn AbstractionRule>) {
        debug!(domain = %self.domain, rule = %rule.name(), "registered abstraction rule");
        self.abstraction_rules.push(rule);
    }

    /// Register a validator
    pub fn register_validator(&mut self, validator: Box<dyn Validator>) {
        debug!(domain = %self.domain, validator = %validator.name(), "registered validator");
        self.validators.push(validator);
    }

    /// Run every detector in registration order
    pub fn run_detectors(&self, observation: &Observation) -> Vec<CrossDomainPattern> {
        self.detectors
            .iter()
            .flat_map(|d| d.detect(observation))
            .collect()
    }

    /// Run every analyzer in registration order
    pub fn run_analyzers(&self, observation: &Observation) -> Vec<Vec<String>> {
        self.analyzers
            .iter()
            .flat_map(|a| a.analyze(observation))
            .collect()
    }

    /// Fold the confidence estimate through every estimator in order
    pub fn estimate_confidence(&self, base: f64, evidence_count: usize) -> f64 {
        self.estimators
            .iter()
            .fold(base, |confidence, e| e.estimate(confidence, evidence_count))
            .clamp(0.0, 1.0)
    }

    /// Highest abstraction level proposed by any registered rule
    pub fn abstraction_level(
        &self,
        observation: &Observation,
        active_patterns: &[CrossDomainPattern],
    ) -> u32 {
        self.abstraction_rules
            .iter()
            .map(|r| r.level(observation, active_patterns))
            .max()
            .unwrap_or(0)
    }

    /// Names of validators that reject the explanation, in order
    pub fn failed_validators(&self, explanation: &Explanation) -> Vec<&str> {
        self.validators
            .iter()
            .filter(|v| !v.validate(explanation))
            .map(|v| v.name())
            .collect()
    }

    /// Number of registered detectors
    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Number of registered validators
    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }
}

// ---------------------------------------------------------------------
// Standard capability implementations
// ---------------------------------------------------------------------

/// Detects fields whose value shifted between the before and after states
#[derive(Debug, Clone)]
pub struct StateShiftDetector {
    /// Minimum absolute delta to report a shift
    pub min_delta: f64,
}

impl Default for StateShiftDetector {
    fn default() -> Self {
        Self { min_delta: 0.05 }
    }
}

impl PatternDetector for StateShiftDetector {
    fn detect(&self, observation: &Observation) -> Vec<CrossDomainPattern> {
        observation
            .changed_keys()
            .into_iter()
            .filter(|(_, delta)| delta.abs() >= self.min_delta)
            .map(|(key, delta)| {
                let direction = if delta >= 0.0 { "increase" } else { "decrease" };
                CrossDomainPattern::new(format!("shift:{}", key))
                    .with_domain(&observation.domain)
                    .with_confidence(delta.abs() / (delta.abs() + 1.0))
                    .with_characteristic("field", key)
                    .with_characteristic("direction", direction)
                    .with_characteristic("delta", format!("{:.6}", delta))
                    .with_support(&observation.domain, delta.abs())
            })
            .collect()
    }

    fn name(&self) -> &str {
        "state-shift"
    }
}

/// Detects metric series whose latest sample drifts away from the mean
#[derive(Debug, Clone)]
pub struct MetricDriftDetector {
    /// Minimum z-score of the latest sample to report drift
    pub min_z_score: f64,
}

impl Default for MetricDriftDetector {
    fn default() -> Self {
        Self { min_z_score: 2.0 }
    }
}

impl PatternDetector for MetricDriftDetector {
    fn detect(&self, observation: &Observation) -> Vec<CrossDomainPattern> {
        let mut names: Vec<&String> = observation.metrics.keys().collect();
        names.sort();

        names
            .into_iter()
            .filter_map(|name| {
                let summary = observation.metrics.get(name)?;
                if summary.std_dev <= 0.0 {
                    return None;
                }
                let z = (summary.last - summary.mean).abs() / summary.std_dev;
                if !z.is_finite() || z < self.min_z_score {
                    return None;
                }
                Some(
                    CrossDomainPattern::new(format!("drift:{}", name))
                        .with_domain(&observation.domain)
                        .with_confidence(z / (z + 1.0))
                        .with_characteristic("metric", name.clone())
                        .with_characteristic("z_score", format!("{:.3}", z))
                        .with_support(&observation.domain, z),
                )
            })
            .collect()
    }

    fn name(&self) -> &str {
        "metric-drift"
    }
}

/// Orders changed state fields by magnitude into a single causal chain
///
/// The largest shift is taken as the most proximate cause and the chain
/// descends toward the smallest, each node named `domain:field`.
#[derive(Debug, Clone, Copy)]
pub struct MagnitudeOrderedAnalyzer;

impl CausalAnalyzer for MagnitudeOrderedAnalyzer {
    fn analyze(&self, observation: &Observation) -> Vec<Vec<String>> {
        let chain: Vec<String> = observation
            .changed_keys()
            .into_iter()
            .map(|(key, _)| observation.event_node(&key))
            .collect();
        if chain.is_empty() {
            Vec::new()
        } else {
            vec![chain]
        }
    }

    fn name(&self) -> &str {
        "magnitude-ordered"
    }
}

/// Boosts confidence toward 1.0 as evidence accumulates
///
/// `confidence + (1 - confidence) * (1 - retention^n)`: non-decreasing in
/// both the incoming estimate and the evidence count.
#[derive(Debug, Clone)]
pub struct EvidenceWeightedEstimator {
    /// Fraction of remaining uncertainty kept per piece of evidence
    pub retention: f64,
}

impl Default for EvidenceWeightedEstimator {
    fn default() -> Self {
        Self { retention: 0.9 }
    }
}

impl ConfidenceEstimator for EvidenceWeightedEstimator {
    fn estimate(&self, confidence: f64, evidence_count: usize) -> f64 {
        let gain = 1.0 - self.retention.powi(evidence_count.min(i32::MAX as usize) as i32);
        (confidence + (1.0 - confidence) * gain).clamp(0.0, 1.0)
    }

    fn name(&self) -> &str {
        "evidence-weighted"
    }
}

/// Abstraction grows with the number of domains the active patterns span
///
/// A single-domain event reads as a raw narrative (level 0); each
/// additional domain generalizes the narrative by one level.
#[derive(Debug, Clone, Copy)]
pub struct DomainSpanRule;

impl AbstractionRule for DomainSpanRule {
    fn level(&self, _observation: &Observation, active_patterns: &[CrossDomainPattern]) -> u32 {
        let spanned: std::collections::BTreeSet<&String> =
            active_patterns.iter().flat_map(|p| p.domains.iter()).collect();
        (spanned.len() as u32).saturating_sub(1)
    }

    fn name(&self) -> &str {
        "domain-span"
    }
}

/// Rejects structurally inconsistent explanations
#[derive(Debug, Clone, Copy)]
pub struct BoundsValidator;

impl Validator for BoundsValidator {
    fn validate(&self, explanation: &Explanation) -> bool {
        let chain = &explanation.context.causal_chain;
        let distinct: std::collections::HashSet<&String> = chain.iter().collect();
        explanation.confidence.is_finite()
            && (0.0..=1.0).contains(&explanation.confidence)
            && !explanation.description.is_empty()
            && distinct.len() == chain.len()
    }

    fn name(&self) -> &str {
        "bounds"
    }
}
