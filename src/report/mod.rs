//! Report module - loading candidate data and persisting selections.
//!
//! Everything here sits at the boundary of the search: the loader turns raw
//! records into a [`CandidatePool`](crate::compute::CandidatePool), and the
//! export and histogram helpers turn a finished group back into files and
//! plot-ready aggregates. Nothing is rendered.

mod export;
mod histogram;
mod loader;

pub use export::*;
pub use histogram::*;
pub use loader::*;
