//! Evolutionary search for high-fitness candidate groups.
//!
//! # Overview
//!
//! - **Fitness** (`fitness`): weighted quality, diversity and regional coverage
//! - **Group operations** (`group`): random initialization, prefix crossover, mutation
//! - **Search** (`search`): generational genetic algorithm with tournament selection
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cohort_select::compute::SyntheticPoolSpec;
//! use cohort_select::compute::evolution::EvolutionEngine;
//! use cohort_select::schema::SelectionConfig;
//!
//! let pool = Arc::new(SyntheticPoolSpec::default().generate(1).unwrap());
//! let config = SelectionConfig {
//!     group_size: 50,
//!     ..Default::default()
//! };
//!
//! let mut engine = EvolutionEngine::new(config, pool).unwrap();
//! let result = engine.run_with_callback(|progress| {
//!     println!("Generation {}: best fitness = {:.3}",
//!         progress.generation, progress.best_fitness);
//! });
//!
//! println!("Best group fitness: {:.3}", result.best.fitness);
//! ```

mod fitness;
mod group;
mod search;

pub use fitness::FitnessEvaluator;
pub use group::{Group, GroupRng, group_distance, prefix_crossover};
pub use search::{EvolutionEngine, EvolutionError, ScoredGroup, tournament_select};
