//! Resource allocation models
//!
//! The orchestrator distributes the aggregate resource pool across
//! components each cycle. Allocation strategies are pluggable; the default
//! is a gravitational heuristic where component mass and health proximity
//! determine pull on the shared pool.

use crate::types::ComponentId;
use std::collections::HashMap;

use super::{DEFAULT_HEALTH, DEFAULT_MASS};

/// Floor applied to squared health distance between two components
///
/// Bounds the force any single pair can contribute, so a near-zero health
/// difference cannot produce an unbounded allocation.
pub const MIN_SQUARED_DISTANCE: f64 = 0.01;

/// Read-only view of the session state an allocation model may consult
pub struct AllocationContext<'a> {
    masses: &'a HashMap<ComponentId, f64>,
    health: &'a HashMap<ComponentId, f64>,
    total_resources: f64,
}

impl<'a> AllocationContext<'a> {
    /// Create a context over the orchestrator's component state
    pub fn new(
        masses: &'a HashMap<ComponentId, f64>,
        health: &'a HashMap<ComponentId, f64>,
        total_resources: f64,
    ) -> Self {
        Self {
            masses,
            health,
            total_resources,
        }
    }

    /// Mass of a component, defaulting to 1.0 when unknown
    pub fn mass(&self, id: &ComponentId) -> f64 {
        self.masses.get(id).copied().unwrap_or(DEFAULT_MASS)
    }

    /// Health of a component, defaulting to 0.5 when unknown
    pub fn health(&self, id: &ComponentId) -> f64 {
        self.health.get(id).copied().unwrap_or(DEFAULT_HEALTH)
    }

    /// Aggregate quantity across all resource pools
    pub fn total_resources(&self) -> f64 {
        self.total_resources
    }
}

/// Trait for implementing resource allocation strategies
///
/// Implementations must return exactly one entry per input component and
/// may not produce negative shares. The input slice is already
/// de-duplicated by the orchestrator.
pub trait AllocationModel: Send + Sync {
    /// Compute each component's share of the aggregate resource pool
    fn allocate(
        &self,
        components: &[ComponentId],
        ctx: &AllocationContext<'_>,
    ) -> HashMap<ComponentId, f64>;

    /// Model name for logging
    fn name(&self) -> &str {
        "custom"
    }
}

/// Gravitational allocation model
///
/// For each ordered pair of distinct components the pairwise force is
/// `mass_i * mass_j / max(d^2, 0.01)` with `d` the absolute health
/// difference. Shares are proportional to each component's accumulated
/// force, so components whose health sits close to many high-mass peers
/// receive more. When no pairwise force exists (a singleton set, or all
/// masses zero) the pool is split equally instead of dividing by zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct GravityAllocator;

impl GravityAllocator {
    /// Create a new gravity allocator
    pub fn new() -> Self {
        Self
    }
}

impl AllocationModel for GravityAllocator {
    fn allocate(
        &self,
        components: &[ComponentId],
        ctx: &AllocationContext<'_>,
    ) -> HashMap<ComponentId, f64> {
        if components.is_empty() {
            return HashMap::new();
        }

        let mut forces = vec![0.0_f64; components.len()];
        for (i, a) in components.iter().enumerate() {
            for (j, b) in components.iter().enumerate() {
                if i == j {
                    continue;
                }
                let distance = (ctx.health(a) - ctx.health(b)).abs();
                forces[i] += ctx.mass(a) * ctx.mass(b) / distance.powi(2).max(MIN_SQUARED_DISTANCE);
            }
        }

        let total_force: f64 = forces.iter().sum();
        let total_resources = ctx.total_resources();

        if total_force > 0.0 {
            components
                .iter()
                .zip(&forces)
                .map(|(id, force)| (id.clone(), force / total_force * total_resources))
                .collect()
        } else {
            let share = total_resources / components.len() as f64;
            components.iter().map(|id| (id.clone(), share)).collect()
        }
    }

    fn name(&self) -> &str {
        "gravity"
    }
}

/// Uniform allocation model
///
/// Ignores mass and health entirely and always splits the pool equally.
/// Useful as a control strategy when comparing allocation behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualSplitAllocator;

impl EqualSplitAllocator {
    /// Create a new equal-split allocator
    pub fn new() -> Self {
        Self
    }
}

impl AllocationModel for EqualSplitAllocator {
    fn allocate(
        &self,
        components: &[ComponentId],
        ctx: &AllocationContext<'_>,
    ) -> HashMap<ComponentId, f64> {
        if components.is_empty() {
            return HashMap::new();
        }
        let share = ctx.total_resources() / components.len() as f64;
        components.iter().map(|id| (id.clone(), share)).collect()
    }

    fn name(&self) -> &str {
        "equal-split"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<ComponentId> {
        names.iter().map(|n| ComponentId::from(*n)).collect()
    }

    #[test]
    fn test_gravity_zero_distance_is_bounded() {
        let masses = HashMap::new();
        let health = HashMap::new();
        let ctx = AllocationContext::new(&masses, &health, 100.0);
        let components = ids(&["a", "b"]);

        // Both components sit at default health, distance 0. The floor on
        // squared distance keeps the force finite.
        let allocation = GravityAllocator::new().allocate(&components, &ctx);
        assert_eq!(allocation.len(), 2);
        for share in allocation.values() {
            assert!(share.is_finite());
            assert!((share - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_gravity_favors_health_proximity() {
        let masses = HashMap::new();
        let mut health = HashMap::new();
        health.insert(ComponentId::from("near1"), 0.50);
        health.insert(ComponentId::from("near2"), 0.52);
        health.insert(ComponentId::from("far"), 0.95);
        let ctx = AllocationContext::new(&masses, &health, 300.0);
        let components = ids(&["near1", "near2", "far"]);

        let allocation = GravityAllocator::new().allocate(&components, &ctx);
        let near = allocation[&ComponentId::from("near1")];
        let far = allocation[&ComponentId::from("far")];
        assert!(near > far, "close-health components should pull more ({} vs {})", near, far);
    }

    #[test]
    fn test_gravity_all_zero_mass_falls_back_to_equal_split() {
        let mut masses = HashMap::new();
        masses.insert(ComponentId::from("a"), 0.0);
        masses.insert(ComponentId::from("b"), 0.0);
        let health = HashMap::new();
        let ctx = AllocationContext::new(&masses, &health, 10.0);

        let allocation = GravityAllocator::new().allocate(&ids(&["a", "b"]), &ctx);
        for share in allocation.values() {
            assert_eq!(*share, 5.0);
        }
    }

    #[test]
    fn test_equal_split_ignores_state() {
        let mut masses = HashMap::new();
        masses.insert(ComponentId::from("heavy"), 100.0);
        let health = HashMap::new();
        let ctx = AllocationContext::new(&masses, &health, 60.0);

        let allocation = EqualSplitAllocator::new().allocate(&ids(&["heavy", "light", "x"]), &ctx);
        for share in allocation.values() {
            assert!((share - 20.0).abs() < 1e-9);
        }
    }
}
