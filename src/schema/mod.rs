//! Schema module - Configuration, record and result types for cohort selection.

mod candidate;
mod config;
mod result;

pub use candidate::*;
pub use config::*;
pub use result::*;
