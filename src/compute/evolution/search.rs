//! Generational genetic search over candidate groups.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::compute::CandidatePool;
use crate::schema::{
    ConfigError, DegenerateChildPolicy, EvolutionHistory, EvolutionPhase, EvolutionProgress,
    EvolutionResult, EvolutionStats, FitnessBreakdown, GroupSnapshot, SelectionConfig,
    SelectionMethod, StopReason,
};

use super::fitness::FitnessEvaluator;
use super::group::{Group, GroupRng, group_distance};

/// Errors that prevent a run from starting.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Pool holds {pool} candidates but groups need {group}")]
    InsufficientPoolSize { pool: usize, group: usize },
    #[error("Unknown categorical field: {0}")]
    UnknownField(String),
}

/// A group in the population together with its evaluation.
#[derive(Debug, Clone)]
pub struct ScoredGroup {
    /// Unique identifier within a run.
    pub id: u64,
    /// The chromosome.
    pub group: Group,
    /// Fitness score.
    pub fitness: f64,
    /// Unweighted objective terms.
    pub breakdown: FitnessBreakdown,
    /// Generation created.
    pub generation: usize,
    /// Parent IDs.
    pub parents: Vec<u64>,
}

impl ScoredGroup {
    /// Convert to snapshot for serialization.
    pub fn to_snapshot(&self, pool: &CandidatePool, evaluator: &FitnessEvaluator) -> GroupSnapshot {
        GroupSnapshot {
            ids: self
                .group
                .members()
                .iter()
                .filter_map(|&m| pool.get(m).map(|c| c.id.clone()))
                .collect(),
            fitness: self.fitness,
            breakdown: self.breakdown,
            summary: evaluator.summarize(pool, self.group.members()),
            generation: self.generation,
        }
    }
}

/// Tournament selection: draw `size` groups uniformly with replacement and
/// keep the fittest, a later draw winning ties.
///
/// Returns the index of the winner in `population`.
///
/// # Panics
/// Panics if `population` is empty.
pub fn tournament_select(population: &[ScoredGroup], size: usize, rng: &mut GroupRng) -> usize {
    let mut winner = rng.index(population.len());
    for _ in 1..size {
        let challenger = rng.index(population.len());
        if population[challenger].fitness >= population[winner].fitness {
            winner = challenger;
        }
    }
    winner
}

/// Evolution engine that runs the search.
pub struct EvolutionEngine {
    config: SelectionConfig,
    pool: Arc<CandidatePool>,
    evaluator: FitnessEvaluator,
    seed: u64,
    rng: GroupRng,
    population: Vec<ScoredGroup>,
    best: Option<ScoredGroup>,
    history: EvolutionHistory,
    generation: usize,
    next_id: u64,
    mutations_applied: u64,
    degenerate_children: u64,
    evaluations: u64,
    cancelled: Arc<AtomicBool>,
}

impl EvolutionEngine {
    /// Create a new evolution engine, validating the configuration against
    /// the pool.
    pub fn new(config: SelectionConfig, pool: Arc<CandidatePool>) -> Result<Self, EvolutionError> {
        config.validate()?;

        if pool.len() < config.group_size {
            return Err(EvolutionError::InsufficientPoolSize {
                pool: pool.len(),
                group: config.group_size,
            });
        }

        let evaluator = FitnessEvaluator::new(config.fitness.clone(), &pool)?;
        let seed = config.random_seed.unwrap_or_else(rand::random);

        Ok(Self {
            config,
            pool,
            evaluator,
            seed,
            rng: GroupRng::new(seed),
            population: Vec::new(),
            best: None,
            history: EvolutionHistory::default(),
            generation: 0,
            next_id: 0,
            mutations_applied: 0,
            degenerate_children: 0,
            evaluations: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get cancellation handle. Checked at generation boundaries.
    ///
    /// A cancellation is consumed by the run it stops; the next run starts
    /// with the flag cleared.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Seed driving every random draw of the run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    /// Current population.
    pub fn population(&self) -> &[ScoredGroup] {
        &self.population
    }

    /// Generations completed since initialization.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best group observed so far in any generation.
    pub fn best(&self) -> Option<&ScoredGroup> {
        self.best.as_ref()
    }

    /// Reset all run state and build the initial population.
    pub fn initialize(&mut self) {
        self.rng = GroupRng::new(self.seed);
        self.population.clear();
        self.best = None;
        self.history = EvolutionHistory::default();
        self.generation = 0;
        self.next_id = 0;
        self.mutations_applied = 0;
        self.degenerate_children = 0;
        self.evaluations = 0;

        for _ in 0..self.config.population.size {
            let group = self
                .rng
                .random_group(self.pool.len(), self.config.group_size);
            self.push_unscored(group, Vec::new(), 0);
        }

        self.evaluate_population();
        self.record_generation();
    }

    fn push_unscored(&mut self, group: Group, parents: Vec<u64>, generation: usize) {
        let scored = self.unscored(group, parents, generation);
        self.population.push(scored);
    }

    fn unscored(&mut self, group: Group, parents: Vec<u64>, generation: usize) -> ScoredGroup {
        let id = self.next_id;
        self.next_id += 1;
        ScoredGroup {
            id,
            group,
            fitness: 0.0,
            breakdown: FitnessBreakdown::default(),
            generation,
            parents,
        }
    }

    /// Evaluate all groups in the population.
    fn evaluate_population(&mut self) {
        let pool = &*self.pool;
        let evaluator = &self.evaluator;

        self.population.par_iter_mut().for_each(|scored| {
            let (fitness, breakdown) = evaluator.evaluate(pool, scored.group.members());
            scored.fitness = fitness;
            scored.breakdown = breakdown;
        });

        self.evaluations += self.population.len() as u64;
    }

    /// Pick two parents by independent tournaments. Both may be the same
    /// group. Initializes the population first if needed.
    pub fn select_parents(&mut self) -> (usize, usize) {
        if self.population.is_empty() {
            self.initialize();
        }
        let SelectionMethod::Tournament { size } = self.config.algorithm.selection;
        let first = tournament_select(&self.population, size, &mut self.rng);
        let second = tournament_select(&self.population, size, &mut self.rng);
        (first, second)
    }

    /// Run a single generation step: breed a full replacement population and
    /// evaluate it.
    pub fn step_generation(&mut self) {
        if self.population.is_empty() {
            self.initialize();
        }

        let ga = self.config.algorithm.clone();
        let group_size = self.config.group_size;
        let pool_size = self.pool.len();
        let next_generation = self.generation + 1;

        let population_size = self.config.population.size;
        let mut next = Vec::with_capacity(population_size);

        // Elitism: carry the best groups over unchanged
        let mut ranked: Vec<usize> = (0..self.population.len()).collect();
        ranked.sort_by(|&a, &b| {
            self.population[b]
                .fitness
                .total_cmp(&self.population[a].fitness)
        });
        for &i in ranked.iter().take(ga.elitism) {
            let elite = self.population[i].group.clone();
            let parents = vec![self.population[i].id];
            next.push(self.unscored(elite, parents, next_generation));
        }

        while next.len() < population_size {
            let (idx1, idx2) = self.select_parents();
            let parents = vec![self.population[idx1].id, self.population[idx2].id];

            let mut child = self.rng.crossover(
                &self.population[idx1].group,
                &self.population[idx2].group,
                group_size,
            );

            if child.len() < group_size {
                self.degenerate_children += 1;
                child = match ga.degenerate_child_policy {
                    DegenerateChildPolicy::Pad => self.rng.pad(child, pool_size, group_size),
                    DegenerateChildPolicy::Keep => {
                        warn!(
                            "generation {}: keeping short child ({} of {} members)",
                            next_generation,
                            child.len(),
                            group_size
                        );
                        child
                    }
                };
            }

            let (child, mutated) =
                self.rng
                    .mutate(child, ga.mutation_rate, pool_size, ga.mutation_policy);
            if mutated {
                self.mutations_applied += 1;
            }

            next.push(self.unscored(child, parents, next_generation));
        }

        self.population = next;
        self.generation = next_generation;
        self.evaluate_population();
        self.record_generation();
    }

    /// Index of the fittest group in the population, first maximum on ties.
    fn best_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, scored) in self.population.iter().enumerate() {
            match best {
                Some(b) if scored.fitness <= self.population[b].fitness => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// Best group of the current population, first maximum on ties.
    pub fn current_best(&self) -> Option<&ScoredGroup> {
        self.best_index().map(|i| &self.population[i])
    }

    fn average_fitness(&self) -> f64 {
        if self.population.is_empty() {
            return 0.0;
        }
        self.population.iter().map(|s| s.fitness).sum::<f64>() / self.population.len() as f64
    }

    /// Mean pairwise group distance of the population.
    fn compute_diversity(&self) -> f64 {
        if self.population.len() < 2 {
            return 0.0;
        }

        let mut total_distance = 0.0;
        let mut count = 0;

        for i in 0..self.population.len() {
            for j in (i + 1)..self.population.len() {
                total_distance +=
                    group_distance(&self.population[i].group, &self.population[j].group);
                count += 1;
            }
        }

        total_distance / count as f64
    }

    /// Append the current population's statistics to the history, update
    /// the best-so-far snapshot and log on the reporting cadence.
    fn record_generation(&mut self) {
        let Some(gen_best) = self.current_best().cloned() else {
            return;
        };

        let avg_fitness = self.average_fitness();
        let variance = self
            .population
            .iter()
            .map(|s| (s.fitness - avg_fitness).powi(2))
            .sum::<f64>()
            / self.population.len() as f64;
        let diversity = self.compute_diversity();

        self.history.best_fitness.push(gen_best.fitness);
        self.history.avg_fitness.push(avg_fitness);
        self.history.fitness_std.push(variance.sqrt());
        self.history.diversity.push(diversity);

        debug!(
            "generation {}: best = {:.4}, avg = {:.4}, std = {:.4}, diversity = {:.4}",
            self.generation,
            gen_best.fitness,
            avg_fitness,
            variance.sqrt(),
            diversity
        );

        if self.is_report_generation() {
            info!(
                "generation {}/{}: best fitness = {:.2}",
                self.generation, self.config.population.generations, gen_best.fitness
            );
        }

        let improved = self
            .best
            .as_ref()
            .is_none_or(|best| gen_best.fitness > best.fitness);
        if improved {
            self.best = Some(gen_best);
        }
    }

    /// Generations 1, 1 + interval, 1 + 2 * interval, ... and the last one.
    fn is_report_generation(&self) -> bool {
        self.generation >= 1
            && ((self.generation - 1) % self.config.reporting.interval == 0
                || self.generation == self.config.population.generations)
    }

    fn snapshot(&self, scored: &ScoredGroup) -> GroupSnapshot {
        scored.to_snapshot(&self.pool, &self.evaluator)
    }

    /// Get current progress.
    pub fn progress(&self) -> EvolutionProgress {
        let generation_best = self
            .current_best()
            .map(|s| s.fitness)
            .unwrap_or(f64::NEG_INFINITY);

        let top_groups = {
            let mut sorted: Vec<_> = self.population.iter().collect();
            sorted.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
            sorted
                .into_iter()
                .take(self.config.reporting.top_k)
                .map(|s| self.snapshot(s))
                .collect()
        };

        let phase = if self.cancelled.load(Ordering::Relaxed) {
            EvolutionPhase::Stopped
        } else if self.population.is_empty() {
            EvolutionPhase::Initializing
        } else if self.generation >= self.config.population.generations {
            EvolutionPhase::Complete
        } else {
            EvolutionPhase::Evolving
        };

        EvolutionProgress {
            generation: self.generation,
            total_generations: self.config.population.generations,
            best_fitness: self
                .best
                .as_ref()
                .map(|b| b.fitness)
                .unwrap_or(f64::NEG_INFINITY),
            avg_fitness: self.average_fitness(),
            generation_best,
            top_groups,
            is_report: self.is_report_generation(),
            phase,
        }
    }

    /// Check if evolution should stop.
    fn should_stop(&self) -> Option<StopReason> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }

        if self.generation >= self.config.population.generations {
            return Some(StopReason::MaxGenerations);
        }

        None
    }

    /// Run evolution with progress callback.
    ///
    /// The callback sees the initial population and then every generation.
    /// It only observes; it cannot influence the search.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> EvolutionResult
    where
        F: FnMut(&EvolutionProgress),
    {
        let start_time = Instant::now();

        info!(
            "starting search: pool = {}, group size = {}, population = {}, generations = {}, seed = {}",
            self.pool.len(),
            self.config.group_size,
            self.config.population.size,
            self.config.population.generations,
            self.seed
        );

        self.initialize();
        callback(&self.progress());

        let stop_reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }

            self.step_generation();
            callback(&self.progress());
        };

        let elapsed = start_time.elapsed().as_secs_f64();

        if stop_reason == StopReason::Cancelled {
            self.cancelled.store(false, Ordering::Relaxed);
        }

        // The population is never empty after initialize() since P >= 1.
        let final_best = self
            .current_best()
            .cloned()
            .unwrap_or_else(|| self.population[0].clone());
        let best_overall = self.best.clone().unwrap_or_else(|| final_best.clone());

        info!(
            "search finished after {} generations ({:?}): best fitness = {:.2}",
            self.generation, stop_reason, final_best.fitness
        );

        EvolutionResult {
            best: self.snapshot(&final_best),
            best_overall: self.snapshot(&best_overall),
            stats: EvolutionStats {
                generations: self.generation,
                total_evaluations: self.evaluations,
                final_best_fitness: final_best.fitness,
                best_fitness: best_overall.fitness,
                final_avg_fitness: self.average_fitness(),
                mutations_applied: self.mutations_applied,
                degenerate_children: self.degenerate_children,
                random_seed: self.seed,
                elapsed_seconds: elapsed,
                stop_reason,
            },
            history: self.history.clone(),
        }
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> EvolutionResult {
        self.run_with_callback(|_| {})
    }
}
