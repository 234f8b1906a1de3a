//! Session-level telemetry
//!
//! ## Table of Contents
//! - **SessionMetrics**: Prometheus-compatible instrumentation of the
//!   research loop itself
//! - **TelemetryHook**: Custom telemetry callback trait
//! - **TelemetryExporter**: Text-format exporter with hook support
//! - **Timer**: Duration helper for instrumenting operations
//!
//! This instruments the platform (cycles run, allocations computed,
//! explanations emitted), not the research observations themselves — those
//! live in [`crate::metrics::MetricsCollector`]. Export stops at the
//! Prometheus text encoding; the core owns no network surface.

use crate::error::{CrucibleError, Result};
use crate::types::ComponentId;
use prometheus::{Counter, Gauge, GaugeVec, Histogram, HistogramOpts, Opts, Registry};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Core telemetry for a research session
pub struct SessionMetrics {
    registry: Registry,

    /// Research cycles completed
    pub cycles_total: Counter,
    /// Resource allocations computed
    pub allocations_total: Counter,
    /// Explanations synthesized
    pub explanations_total: Counter,
    /// Patterns currently held in the registry
    pub patterns_active: Gauge,
    /// Confidence distribution of synthesized explanations
    pub explanation_confidence: Histogram,
    /// Time spent computing allocations
    pub allocation_duration: Histogram,
    /// Latest allocated share per component
    pub resources_allocated: GaugeVec,
}

impl SessionMetrics {
    /// Create a new telemetry instance with its own registry
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let cycles_total =
            Counter::new("crucible_cycles_total", "Research cycles completed")?;
        let allocations_total =
            Counter::new("crucible_allocations_total", "Resource allocations computed")?;
        let explanations_total =
            Counter::new("crucible_explanations_total", "Explanations synthesized")?;
        let patterns_active =
            Gauge::new("crucible_patterns_active", "Patterns held in the registry")?;
        let explanation_confidence = Histogram::with_opts(
            HistogramOpts::new(
                "crucible_explanation_confidence",
                "Confidence of synthesized explanations",
            )
            .buckets(vec![0.1, 0.25, 0.5, 0.75, 0.9, 0.99]),
        )?;
        let allocation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "crucible_allocation_duration_seconds",
                "Time spent computing allocations",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;
        let resources_allocated = GaugeVec::new(
            Opts::new("crucible_resources_allocated", "Latest allocated share per component"),
            &["component"],
        )?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(allocations_total.clone()))?;
        registry.register(Box::new(explanations_total.clone()))?;
        registry.register(Box::new(patterns_active.clone()))?;
        registry.register(Box::new(explanation_confidence.clone()))?;
        registry.register(Box::new(allocation_duration.clone()))?;
        registry.register(Box::new(resources_allocated.clone()))?;

        Ok(Self {
            registry,
            cycles_total,
            allocations_total,
            explanations_total,
            patterns_active,
            explanation_confidence,
            allocation_duration,
            resources_allocated,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record one completed research cycle
    pub fn record_cycle(&self) {
        self.cycles_total.inc();
    }

    /// Record a computed allocation and its duration
    pub fn record_allocation(&self, allocation: &HashMap<ComponentId, f64>, duration_secs: f64) {
        self.allocations_total.inc();
        self.allocation_duration.observe(duration_secs);
        for (component, share) in allocation {
            self.resources_allocated
                .with_label_values(&[component.as_str()])
                .set(*share);
        }
    }

    /// Record a synthesized explanation
    pub fn record_explanation(&self, confidence: f64) {
        self.explanations_total.inc();
        self.explanation_confidence.observe(confidence);
    }

    /// Update the active-pattern gauge
    pub fn set_active_patterns(&self, count: f64) {
        self.patterns_active.set(count);
    }

    /// Gather all metrics as Prometheus text
    pub fn gather_text(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| CrucibleError::metrics(format!("Encode error: {}", e)))?;
        String::from_utf8(buffer).map_err(|e| CrucibleError::metrics(format!("UTF8 error: {}", e)))
    }
}

/// Trait for custom telemetry hooks
pub trait TelemetryHook: Send + Sync {
    /// Called before each export to contribute custom readings
    fn collect(&self, metrics: &SessionMetrics);

    /// Hook name for identification
    fn name(&self) -> &str;
}

/// Telemetry exporter producing Prometheus text format
pub struct TelemetryExporter {
    metrics: Arc<SessionMetrics>,
    hooks: Vec<Box<dyn TelemetryHook>>,
}

impl TelemetryExporter {
    /// Create a new exporter
    pub fn new(metrics: Arc<SessionMetrics>) -> Self {
        Self {
            metrics,
            hooks: Vec::new(),
        }
    }

    /// Register a custom telemetry hook
    pub fn register_hook(&mut self, hook: Box<dyn TelemetryHook>) {
        info!(hook = %hook.name(), "Registered telemetry hook");
        self.hooks.push(hook);
    }

    /// Run all hooks in registration order
    pub fn collect(&self) {
        for hook in &self.hooks {
            hook.collect(&self.metrics);
        }
    }

    /// Collect and export all metrics as text
    pub fn export(&self) -> Result<String> {
        self.collect();
        self.metrics.gather_text()
    }
}

/// Timer for measuring operation duration
pub struct Timer {
    start: std::time::Instant,
}

impl Timer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Get elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop and return elapsed seconds
    pub fn stop(self) -> f64 {
        self.elapsed_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = SessionMetrics::new().unwrap();
        assert!(metrics.gather_text().is_ok());
    }

    #[test]
    fn test_cycle_and_explanation_counters() {
        let metrics = SessionMetrics::new().unwrap();
        metrics.record_cycle();
        metrics.record_cycle();
        metrics.record_explanation(0.8);

        let text = metrics.gather_text().unwrap();
        assert!(text.contains("crucible_cycles_total 2"));
        assert!(text.contains("crucible_explanations_total 1"));
    }

    #[test]
    fn test_allocation_gauges() {
        let metrics = SessionMetrics::new().unwrap();
        let mut allocation = HashMap::new();
        allocation.insert(ComponentId::from("collector"), 42.5);
        metrics.record_allocation(&allocation, 0.001);

        let text = metrics.gather_text().unwrap();
        assert!(text.contains("crucible_resources_allocated"));
        assert!(text.contains("collector"));
    }

    #[test]
    fn test_exporter_runs_hooks() {
        struct PatternHook;
        impl TelemetryHook for PatternHook {
            fn collect(&self, metrics: &SessionMetrics) {
                metrics.set_active_patterns(7.0);
            }
            fn name(&self) -> &str {
                "pattern-hook"
            }
        }

        let metrics = Arc::new(SessionMetrics::new().unwrap());
        let mut exporter = TelemetryExporter::new(Arc::clone(&metrics));
        exporter.register_hook(Box::new(PatternHook));

        let text = exporter.export().unwrap();
        assert!(text.contains("crucible_patterns_active 7"));
    }

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let elapsed = timer.stop();
        assert!(elapsed >= 0.01);
    }
}
