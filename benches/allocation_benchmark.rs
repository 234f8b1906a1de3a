//! Allocation and cycle benchmarks
//!
//! Benchmarks:
//! - Gravitational allocation across component-set sizes (the pairwise
//!   force accumulation is quadratic)
//! - Equal-split control strategy at the same sizes
//! - A full research cycle including analysis and explanation synthesis

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crucible_research::builder::SessionBuilder;
use crucible_research::orchestrator::{EqualSplitAllocator, Orchestrator};
use crucible_research::types::ComponentId;

/// Create an orchestrator populated with N components of varied state
fn populated_orchestrator(component_count: usize) -> (Orchestrator, Vec<ComponentId>) {
    let mut orch = Orchestrator::new();
    orch.set_resource_pool("compute", 1000.0);
    orch.set_resource_pool("storage", 500.0);

    let components: Vec<ComponentId> = (0..component_count)
        .map(|i| {
            let id = ComponentId::from(format!("component-{}", i));
            orch.set_health(&id, (i % 10) as f64 / 10.0);
            orch.set_mass(&id, 1.0 + (i % 5) as f64);
            id
        })
        .collect();

    (orch, components)
}

fn bench_gravity_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("gravity_allocation");
    for size in [10, 50, 100, 250] {
        let (orch, components) = populated_orchestrator(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(orch.allocate_resources(black_box(&components))));
        });
    }
    group.finish();
}

fn bench_equal_split_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("equal_split_allocation");
    for size in [10, 100] {
        let (orch, components) = populated_orchestrator(size);
        let orch = orch.with_model(Box::new(EqualSplitAllocator::new()));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(orch.allocate_resources(black_box(&components))));
        });
    }
    group.finish();
}

fn bench_full_cycle(c: &mut Criterion) {
    let components: Vec<ComponentId> =
        (0..20).map(|i| ComponentId::from(format!("component-{}", i))).collect();

    c.bench_function("full_research_cycle", |b| {
        let mut session = SessionBuilder::new()
            .with_resource_pool("compute", 1000.0)
            .telemetry(false)
            .build()
            .expect("session builds");
        for (i, id) in components.iter().enumerate() {
            session.orchestrator_mut().set_health(id, (i % 10) as f64 / 10.0);
        }

        let mut tick = 0u64;
        b.iter(|| {
            // Drift one component's health so every cycle observes a change.
            tick += 1;
            let wobble = (tick % 7) as f64 / 10.0;
            session.orchestrator_mut().set_health("component-0", wobble);
            black_box(session.run_cycle(&components))
        });
    });
}

criterion_group!(
    benches,
    bench_gravity_allocation,
    bench_equal_split_allocation,
    bench_full_cycle
);
criterion_main!(benches);
