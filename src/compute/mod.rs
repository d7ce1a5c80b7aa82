//! Compute module - candidate pool and the evolutionary search over it.

mod pool;
mod synthetic;

pub mod evolution;

pub use pool::*;
pub use synthetic::*;
