//! Progress and result types produced by a selection run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The three terms of the objective for one group, before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FitnessBreakdown {
    /// Mean quality score of the members.
    pub mean_quality: f64,
    /// Summed distinct counts over the diversity fields, normalized.
    pub diversity: f64,
    /// Fraction of possible regions represented.
    pub coverage: f64,
}

/// Summary aggregates of a group, consumed by reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GroupSummary {
    /// Number of members.
    pub size: usize,
    /// Number of distinct members (less than `size` only with duplicates).
    pub distinct_members: usize,
    /// Mean quality score.
    pub mean_quality: f64,
    /// Distinct value count for each diversity field.
    pub distinct_per_field: BTreeMap<String, usize>,
    /// Distinct value count of the region field.
    pub distinct_regions: usize,
}

/// Snapshot of a group for export and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSnapshot {
    /// Member identifiers, in chromosome order.
    pub ids: Vec<String>,
    /// Combined fitness.
    pub fitness: f64,
    /// Unweighted objective terms.
    pub breakdown: FitnessBreakdown,
    /// Summary aggregates.
    pub summary: GroupSummary,
    /// Generation that produced the group (0 = initial population).
    pub generation: usize,
}

/// Evolution history for plotting. Index 0 is the initial population.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvolutionHistory {
    /// Best fitness per generation.
    pub best_fitness: Vec<f64>,
    /// Average fitness per generation.
    pub avg_fitness: Vec<f64>,
    /// Standard deviation per generation.
    pub fitness_std: Vec<f64>,
    /// Mean pairwise group distance per generation.
    pub diversity: Vec<f64>,
}

/// Current phase of evolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EvolutionPhase {
    /// Building the first population.
    #[default]
    Initializing,
    /// Running generations.
    Evolving,
    /// Generation budget exhausted.
    Complete,
    /// Stopped at a generation boundary by cancellation.
    Stopped,
}

/// Progress report handed to callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Generations completed so far (0 = initial population only).
    pub generation: usize,
    /// Total generations planned.
    pub total_generations: usize,
    /// Best fitness seen so far across all generations.
    pub best_fitness: f64,
    /// Average fitness of current population.
    pub avg_fitness: f64,
    /// Best fitness in the current population.
    pub generation_best: f64,
    /// Top groups of the current population.
    pub top_groups: Vec<GroupSnapshot>,
    /// Whether this generation falls on the reporting cadence.
    pub is_report: bool,
    /// Current phase of the algorithm.
    pub phase: EvolutionPhase,
}

/// Final result of a selection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Best group of the final population (first maximum on ties).
    pub best: GroupSnapshot,
    /// Best group observed in any generation.
    pub best_overall: GroupSnapshot,
    /// Statistics from the run.
    pub stats: EvolutionStats,
    /// Full history for analysis.
    pub history: EvolutionHistory,
}

/// Statistics from a selection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations run.
    pub generations: usize,
    /// Total fitness evaluations performed.
    pub total_evaluations: u64,
    /// Best fitness of the final population.
    pub final_best_fitness: f64,
    /// Best fitness observed in any generation.
    pub best_fitness: f64,
    /// Average fitness of final population.
    pub final_avg_fitness: f64,
    /// Mutation events (a position was overwritten).
    pub mutations_applied: u64,
    /// Crossover children shorter than the group size.
    pub degenerate_children: u64,
    /// Seed that drove every random draw of the run.
    pub random_seed: u64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Ran the configured number of generations.
    MaxGenerations,
    /// Cancelled at a generation boundary.
    Cancelled,
}
