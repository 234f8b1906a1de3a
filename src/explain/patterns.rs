//! Cross-domain pattern records
//!
//! Patterns are recurring characteristics detected across one or more
//! domains. The registry keyed by pattern id lives on the explainability
//! system; repeated detections of the same id update the stored entry
//! instead of duplicating it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A recurring characteristic observed across domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossDomainPattern {
    /// Stable identifier; the prefix before the first `:` is the pattern
    /// kind used for confidence-threshold lookup
    pub id: String,
    /// Domains the pattern has been observed in
    pub domains: BTreeSet<String>,
    /// Arbitrary descriptive attributes
    pub characteristics: HashMap<String, String>,
    /// Detection confidence in [0, 1]
    pub confidence: f64,
    /// Evidence strength per domain
    pub support: HashMap<String, f64>,
}

impl CrossDomainPattern {
    /// Create a pattern with the given id and zero confidence
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domains: BTreeSet::new(),
            characteristics: HashMap::new(),
            confidence: 0.0,
            support: HashMap::new(),
        }
    }

    /// Add an observed domain (builder style)
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domains.insert(domain.into());
        self
    }

    /// Add a descriptive attribute (builder style)
    pub fn with_characteristic(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.characteristics.insert(key.into(), value.into());
        self
    }

    /// Set the detection confidence, clamped to [0, 1] (builder style)
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Record evidence strength for a domain (builder style)
    pub fn with_support(mut self, domain: impl Into<String>, strength: f64) -> Self {
        self.support.insert(domain.into(), strength);
        self
    }

    /// The pattern kind: the id prefix before the first `:`, or the whole
    /// id when there is none
    pub fn kind(&self) -> &str {
        self.id.split(':').next().unwrap_or(&self.id)
    }

    /// Fold a repeated detection of the same pattern into this entry
    ///
    /// Domains are unioned, characteristics overwritten by the newer
    /// detection, per-domain support accumulated, and confidence moved
    /// halfway toward the new detection so one noisy observation cannot
    /// swing an established pattern.
    pub fn merge_detection(&mut self, other: &CrossDomainPattern) {
        self.domains.extend(other.domains.iter().cloned());
        for (key, value) in &other.characteristics {
            self.characteristics.insert(key.clone(), value.clone());
        }
        for (domain, strength) in &other.support {
            *self.support.entry(domain.clone()).or_insert(0.0) += strength;
        }
        self.confidence = (self.confidence + (other.confidence - self.confidence) * 0.5).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_extraction() {
        assert_eq!(CrossDomainPattern::new("shift:latency").kind(), "shift");
        assert_eq!(CrossDomainPattern::new("plain").kind(), "plain");
    }

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(CrossDomainPattern::new("p").with_confidence(1.4).confidence, 1.0);
        assert_eq!(CrossDomainPattern::new("p").with_confidence(-0.2).confidence, 0.0);
    }

    #[test]
    fn test_merge_detection() {
        let mut existing = CrossDomainPattern::new("shift:x")
            .with_domain("perf")
            .with_confidence(0.4)
            .with_support("perf", 1.0);
        let update = CrossDomainPattern::new("shift:x")
            .with_domain("memory")
            .with_confidence(0.8)
            .with_support("perf", 0.5)
            .with_characteristic("direction", "increase");

        existing.merge_detection(&update);
        assert_eq!(existing.domains.len(), 2);
        assert!((existing.confidence - 0.6).abs() < 1e-12);
        assert_eq!(existing.support["perf"], 1.5);
        assert_eq!(existing.characteristics["direction"], "increase");
    }
}
