//! Benchmarks for fitness evaluation and the generational loop.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use cohort_select::{
    compute::{
        SyntheticPoolSpec,
        evolution::{EvolutionEngine, FitnessEvaluator, GroupRng},
    },
    schema::{FitnessConfig, PopulationConfig, SelectionConfig},
};

fn bench_fitness(c: &mut Criterion) {
    let mut group = c.benchmark_group("fitness_evaluate");
    let pool = SyntheticPoolSpec {
        size: 5000,
        ..Default::default()
    }
    .generate(42)
    .unwrap();
    let evaluator = FitnessEvaluator::new(FitnessConfig::default(), &pool).unwrap();
    let mut rng = GroupRng::new(42);

    for group_size in [10, 100, 1000] {
        let members = rng.random_group(pool.len(), group_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(group_size),
            &group_size,
            |b, _| {
                b.iter(|| evaluator.evaluate(&pool, black_box(members.members())));
            },
        );
    }

    group.finish();
}

fn bench_generation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation_step");
    let pool = Arc::new(SyntheticPoolSpec::default().generate(7).unwrap());

    for population in [20, 80, 320] {
        let config = SelectionConfig {
            group_size: 100,
            population: PopulationConfig {
                size: population,
                generations: 1,
            },
            random_seed: Some(42),
            ..Default::default()
        };
        let mut engine = EvolutionEngine::new(config, Arc::clone(&pool)).unwrap();
        engine.initialize();

        group.bench_with_input(
            BenchmarkId::from_parameter(population),
            &population,
            |b, _| {
                b.iter(|| engine.step_generation());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_fitness, bench_generation_step);
criterion_main!(benches);
