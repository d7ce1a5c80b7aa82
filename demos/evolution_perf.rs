//! Quick evolution performance test

use std::sync::Arc;
use std::time::Instant;

use cohort_select::{
    compute::{SyntheticPoolSpec, evolution::EvolutionEngine},
    schema::{PopulationConfig, SelectionConfig},
};

fn main() {
    println!("=== Evolution Performance Test ===\n");

    // Test different pool sizes
    for pool_size in [500, 5_000, 50_000] {
        println!("Pool size: {}", pool_size);

        let pool = Arc::new(
            SyntheticPoolSpec {
                size: pool_size,
                ..Default::default()
            }
            .generate(42)
            .unwrap(),
        );
        let config = SelectionConfig {
            group_size: 100,
            population: PopulationConfig {
                size: 20,
                generations: 100,
            },
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = EvolutionEngine::new(config, pool).unwrap();
        let result = engine.run();
        let elapsed = start.elapsed();

        let total_evals = result.stats.total_evaluations;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!("  Generations:    {}", result.stats.generations);
        println!("  Evaluations:    {}", total_evals);
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!("  Evals/sec:      {:.1}", evals_per_sec);
        println!("  Best fitness:   {:.4}", result.stats.best_fitness);
        println!();
    }

    println!("=== Scalability Test (fixed 5000-candidate pool) ===\n");

    let pool = Arc::new(
        SyntheticPoolSpec {
            size: 5_000,
            ..Default::default()
        }
        .generate(42)
        .unwrap(),
    );

    // Test different population sizes
    for pop_size in [10, 20, 40, 80] {
        let config = SelectionConfig {
            group_size: 100,
            population: PopulationConfig {
                size: pop_size,
                generations: 50,
            },
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = EvolutionEngine::new(config, Arc::clone(&pool)).unwrap();
        let result = engine.run();
        let elapsed = start.elapsed();

        let total_evals = result.stats.total_evaluations;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!(
            "Population {}: {} evals in {:.2}s ({:.1} evals/sec)",
            pop_size,
            total_evals,
            elapsed.as_secs_f64(),
            evals_per_sec
        );
    }
}
