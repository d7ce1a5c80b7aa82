//! Cohort selection - genetic search for diverse, high-quality candidate groups.
//!
//! Given a pool of candidates, each with a quality score and categorical
//! attributes, the crate searches for a fixed-size group that balances mean
//! quality against demographic diversity and regional coverage.
//!
//! # Architecture
//!
//! - `schema`: Configuration, record and result types
//! - `compute`: Candidate pool, fitness evaluation and the genetic search
//! - `report`: Loading candidate data and exporting selections
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cohort_select::{
//!     compute::evolution::EvolutionEngine,
//!     report::{load_pool, write_selection},
//!     schema::SelectionConfig,
//! };
//!
//! let pool = Arc::new(load_pool("candidates.json").unwrap());
//! let config = SelectionConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut engine = EvolutionEngine::new(config, Arc::clone(&pool)).unwrap();
//! let result = engine.run();
//!
//! println!("Best fitness: {:.2}", result.best.fitness);
//! write_selection("selected.json", &pool, &result.best).unwrap();
//! ```

pub mod compute;
pub mod report;
pub mod schema;

// Re-export commonly used types
pub use compute::CandidatePool;
pub use compute::evolution::{EvolutionEngine, EvolutionError};
pub use schema::{Candidate, EvolutionResult, SelectionConfig};
