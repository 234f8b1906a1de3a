//! Aggregate analysis of session research data
//!
//! Each section of the report is backed by one orchestrator collection and
//! is omitted entirely (`None`) when that collection is empty. Analysis
//! never fails; on a freshly constructed orchestrator it returns an empty
//! report.

use serde::{Deserialize, Serialize};

/// Aggregate statistics over recorded pairwise interactions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionAnalysis {
    /// Mean of all recorded interaction strengths
    pub mean_strength: f64,
    /// Number of components with outgoing pattern-network relations
    pub network_size: usize,
}

/// Aggregate statistics over the research-session values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResearchAnalysis {
    /// Mean of all session values
    pub mean: f64,
    /// Population standard deviation of all session values
    pub std_dev: f64,
}

/// Aggregate statistics over the bounded performance history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAnalysis {
    /// Mean of the `overall` field across retained snapshots (missing
    /// fields read as 0.0)
    pub mean_overall: f64,
    /// Newest `overall` value minus the oldest retained one; 0.0 when only
    /// one snapshot is retained
    pub trend: f64,
}

/// Result of one `analyze_research_data` call
///
/// Sections are omitted, not zero-filled, when their backing collection is
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Interaction statistics, present when any strengths are recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<InteractionAnalysis>,
    /// Research statistics, present when any session values are recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research: Option<ResearchAnalysis>,
    /// Performance statistics, present when any snapshots are retained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceAnalysis>,
}

impl AnalysisReport {
    /// Whether every section is absent
    pub fn is_empty(&self) -> bool {
        self.interaction.is_none() && self.research.is_none() && self.performance.is_none()
    }
}
