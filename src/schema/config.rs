//! Configuration types for cohort selection runs.
//!
//! Every field has a serde default, so a partial JSON document (or `{}`)
//! deserializes into a runnable configuration.

use serde::{Deserialize, Serialize};

/// Tolerance used when checking that the fitness weights sum to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Top-level configuration for a selection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Number of candidates in every group (K).
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    /// Population and generation settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Genetic operator settings.
    #[serde(default)]
    pub algorithm: GeneticAlgorithmConfig,
    /// Objective weights and normalization constants.
    #[serde(default)]
    pub fitness: FitnessConfig,
    /// Progress reporting cadence.
    #[serde(default)]
    pub reporting: ReportingConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
            population: PopulationConfig::default(),
            algorithm: GeneticAlgorithmConfig::default(),
            fitness: FitnessConfig::default(),
            reporting: ReportingConfig::default(),
            random_seed: None,
        }
    }
}

fn default_group_size() -> usize {
    100
}

/// Population and generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of groups in every generation (P).
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Number of generations to run (G). There is no early stopping.
    #[serde(default = "default_generations")]
    pub generations: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            generations: default_generations(),
        }
    }
}

fn default_population_size() -> usize {
    20
}
fn default_generations() -> usize {
    100
}

/// Genetic algorithm configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticAlgorithmConfig {
    /// Parent selection method.
    #[serde(default)]
    pub selection: SelectionMethod,
    /// Probability that a child has one position replaced (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// How a mutation picks the replacement candidate.
    #[serde(default)]
    pub mutation_policy: MutationPolicy,
    /// What to do with a crossover child shorter than the group size.
    #[serde(default)]
    pub degenerate_child_policy: DegenerateChildPolicy,
    /// Number of best groups copied unchanged into the next generation.
    #[serde(default)]
    pub elitism: usize,
}

impl Default for GeneticAlgorithmConfig {
    fn default() -> Self {
        Self {
            selection: SelectionMethod::default(),
            mutation_rate: default_mutation_rate(),
            mutation_policy: MutationPolicy::default(),
            degenerate_child_policy: DegenerateChildPolicy::default(),
            elitism: 0,
        }
    }
}

fn default_mutation_rate() -> f64 {
    0.1
}

/// Selection method for the genetic algorithm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method")]
pub enum SelectionMethod {
    /// Draw `size` groups with replacement and keep the fittest.
    /// A later draw wins ties.
    Tournament {
        #[serde(default = "default_tournament_size")]
        size: usize,
    },
}

impl Default for SelectionMethod {
    fn default() -> Self {
        Self::Tournament {
            size: default_tournament_size(),
        }
    }
}

fn default_tournament_size() -> usize {
    2
}

/// Replacement strategy used by the mutation operator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MutationPolicy {
    /// Redraw until the replacement is not already in the group.
    /// A group that already holds every pool member is left unchanged.
    #[default]
    Resample,
    /// Overwrite with any pool member, possibly introducing a duplicate.
    Literal,
}

/// Recovery policy for crossover children shorter than the group size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DegenerateChildPolicy {
    /// Top the child up with uniformly drawn candidates it does not hold.
    #[default]
    Pad,
    /// Keep the short child as produced.
    Keep,
}

/// Weighted objective configuration.
///
/// `fitness = quality_weight * mean_quality
///          + diversity_weight * 100 * diversity
///          + coverage_weight * 100 * coverage`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessConfig {
    /// Weight of the mean quality score (assumed to lie on 0-100).
    #[serde(default = "default_quality_weight")]
    pub quality_weight: f64,
    /// Weight of the normalized categorical diversity.
    #[serde(default = "default_diversity_weight")]
    pub diversity_weight: f64,
    /// Weight of the region coverage fraction.
    #[serde(default = "default_coverage_weight")]
    pub coverage_weight: f64,
    /// Categorical fields whose distinct-value counts are summed.
    #[serde(default = "default_diversity_fields")]
    pub diversity_fields: Vec<String>,
    /// Divisor applied to the summed distinct counts.
    #[serde(default = "default_diversity_normalization")]
    pub diversity_normalization: f64,
    /// Field whose distinct values measure coverage.
    #[serde(default = "default_region_field")]
    pub region_field: String,
    /// Number of possible values of the region field.
    #[serde(default = "default_region_count")]
    pub region_count: usize,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            quality_weight: default_quality_weight(),
            diversity_weight: default_diversity_weight(),
            coverage_weight: default_coverage_weight(),
            diversity_fields: default_diversity_fields(),
            diversity_normalization: default_diversity_normalization(),
            region_field: default_region_field(),
            region_count: default_region_count(),
        }
    }
}

fn default_quality_weight() -> f64 {
    0.5
}
fn default_diversity_weight() -> f64 {
    0.3
}
fn default_coverage_weight() -> f64 {
    0.2
}
fn default_diversity_fields() -> Vec<String> {
    vec![
        "income_bracket".to_string(),
        "race".to_string(),
        "school_type".to_string(),
    ]
}
fn default_diversity_normalization() -> f64 {
    10.0
}
fn default_region_field() -> String {
    "region".to_string()
}
fn default_region_count() -> usize {
    27
}

/// Progress reporting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Report every N generations (the final generation is always reported).
    #[serde(default = "default_report_interval")]
    pub interval: usize,
    /// Number of top groups included in progress snapshots.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            interval: default_report_interval(),
            top_k: default_top_k(),
        }
    }
}

fn default_report_interval() -> usize {
    10
}
fn default_top_k() -> usize {
    5
}

// ============================================================================
// Validation
// ============================================================================

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Group size must be at least 1")]
    ZeroGroupSize,
    #[error("Population size must be at least 1")]
    EmptyPopulation,
    #[error("Generation count must be at least 1")]
    ZeroGenerations,
    #[error("Mutation rate must be within [0, 1], got {0}")]
    InvalidMutationRate(f64),
    #[error("Invalid fitness weight: {0}")]
    InvalidWeight(String),
    #[error("Invalid normalization constant: {0}")]
    InvalidNormalization(String),
    #[error("Region field name must not be empty")]
    MissingRegionField,
    #[error("Elitism ({elitism}) must be smaller than the population size ({population})")]
    ElitismTooLarge { elitism: usize, population: usize },
    #[error("Tournament size must be at least 1")]
    InvalidTournamentSize,
    #[error("Reporting interval must be at least 1")]
    InvalidReportInterval,
}

impl SelectionConfig {
    /// Validate configuration values that do not depend on the pool.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group_size == 0 {
            return Err(ConfigError::ZeroGroupSize);
        }
        if self.population.size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.population.generations == 0 {
            return Err(ConfigError::ZeroGenerations);
        }

        let rate = self.algorithm.mutation_rate;
        if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidMutationRate(rate));
        }

        if self.algorithm.elitism >= self.population.size {
            return Err(ConfigError::ElitismTooLarge {
                elitism: self.algorithm.elitism,
                population: self.population.size,
            });
        }

        match self.algorithm.selection {
            SelectionMethod::Tournament { size } if size == 0 => {
                return Err(ConfigError::InvalidTournamentSize);
            }
            SelectionMethod::Tournament { .. } => {}
        }

        self.fitness.validate()?;

        if self.reporting.interval == 0 {
            return Err(ConfigError::InvalidReportInterval);
        }

        Ok(())
    }
}

impl FitnessConfig {
    /// Validate weights and normalization constants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("quality", self.quality_weight),
            ("diversity", self.diversity_weight),
            ("coverage", self.coverage_weight),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight(format!(
                    "{name} weight {weight} must be finite and non-negative"
                )));
            }
        }

        let sum: f64 = weights.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::InvalidWeight(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }

        if !self.diversity_normalization.is_finite() || self.diversity_normalization <= 0.0 {
            return Err(ConfigError::InvalidNormalization(format!(
                "diversity normalization {} must be positive",
                self.diversity_normalization
            )));
        }
        if self.region_count == 0 {
            return Err(ConfigError::InvalidNormalization(
                "region count must be positive".to_string(),
            ));
        }
        if self.region_field.is_empty() {
            return Err(ConfigError::MissingRegionField);
        }

        Ok(())
    }
}
