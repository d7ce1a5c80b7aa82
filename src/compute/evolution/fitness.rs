//! Fitness evaluation for candidate groups.
//!
//! The objective is a weighted sum of three terms:
//!
//! - mean quality of the members (already on a 0-100 scale),
//! - diversity: distinct values summed over the diversity fields, divided by
//!   a normalization constant, then scaled by 100,
//! - coverage: distinct values of the region field over the number of
//!   possible regions, scaled by 100.
//!
//! Evaluation is a pure function of the pool and the member list.

use std::collections::BTreeMap;

use crate::compute::CandidatePool;
use crate::schema::{FitnessBreakdown, FitnessConfig, GroupSummary};

use super::search::EvolutionError;

/// Evaluates groups against a pool.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    config: FitnessConfig,
    /// Pool column of each diversity field, in config order.
    diversity_columns: Vec<usize>,
    region_column: usize,
}

impl FitnessEvaluator {
    /// Create an evaluator, resolving field names against the pool.
    pub fn new(config: FitnessConfig, pool: &CandidatePool) -> Result<Self, EvolutionError> {
        let resolve = |name: &str| {
            pool.field_index(name)
                .ok_or_else(|| EvolutionError::UnknownField(name.to_string()))
        };

        let diversity_columns = config
            .diversity_fields
            .iter()
            .map(|name| resolve(name))
            .collect::<Result<Vec<_>, _>>()?;
        let region_column = resolve(&config.region_field)?;

        Ok(Self {
            config,
            diversity_columns,
            region_column,
        })
    }

    /// Fitness configuration in use.
    pub fn config(&self) -> &FitnessConfig {
        &self.config
    }

    /// Evaluate a group and return combined fitness and its unweighted terms.
    pub fn evaluate(&self, pool: &CandidatePool, members: &[usize]) -> (f64, FitnessBreakdown) {
        let breakdown = self.breakdown(pool, members);
        (self.combine(&breakdown), breakdown)
    }

    /// Combined fitness only.
    pub fn fitness(&self, pool: &CandidatePool, members: &[usize]) -> f64 {
        self.evaluate(pool, members).0
    }

    /// Compute the unweighted objective terms.
    pub fn breakdown(&self, pool: &CandidatePool, members: &[usize]) -> FitnessBreakdown {
        let distinct_sum: usize = self
            .diversity_columns
            .iter()
            .map(|&column| pool.distinct_count(column, members))
            .sum();
        let regions = pool.distinct_count(self.region_column, members);

        FitnessBreakdown {
            mean_quality: mean_quality(pool, members),
            diversity: distinct_sum as f64 / self.config.diversity_normalization,
            coverage: regions as f64 / self.config.region_count as f64,
        }
    }

    /// Apply the weights to a breakdown.
    pub fn combine(&self, breakdown: &FitnessBreakdown) -> f64 {
        self.config.quality_weight * breakdown.mean_quality
            + self.config.diversity_weight * 100.0 * breakdown.diversity
            + self.config.coverage_weight * 100.0 * breakdown.coverage
    }

    /// Summary aggregates reported alongside the final group.
    pub fn summarize(&self, pool: &CandidatePool, members: &[usize]) -> GroupSummary {
        let distinct_per_field: BTreeMap<String, usize> = self
            .config
            .diversity_fields
            .iter()
            .zip(&self.diversity_columns)
            .map(|(name, &column)| (name.clone(), pool.distinct_count(column, members)))
            .collect();

        let mut unique = members.to_vec();
        unique.sort_unstable();
        unique.dedup();

        GroupSummary {
            size: members.len(),
            distinct_members: unique.len(),
            mean_quality: mean_quality(pool, members),
            distinct_per_field,
            distinct_regions: pool.distinct_count(self.region_column, members),
        }
    }
}

/// Mean quality of the members; zero for an empty group.
fn mean_quality(pool: &CandidatePool, members: &[usize]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    members.iter().map(|&m| pool.quality(m)).sum::<f64>() / members.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Candidate;

    fn candidate(id: &str, quality: f64, income: &str, race: &str, region: &str) -> Candidate {
        Candidate::new(id, quality)
            .with_attribute("income_bracket", income)
            .with_attribute("race", race)
            .with_attribute("school_type", "public")
            .with_attribute("region", region)
    }

    fn test_pool() -> CandidatePool {
        CandidatePool::new(vec![
            candidate("a", 60.0, "A", "1", "SP"),
            candidate("b", 80.0, "B", "1", "RJ"),
            candidate("c", 70.0, "B", "2", "SP"),
            candidate("d", 90.0, "C", "3", "MG"),
            // same attributes as "a", higher quality
            candidate("e", 95.0, "A", "1", "SP"),
        ])
        .unwrap()
    }

    #[test]
    fn test_known_value() {
        let pool = test_pool();
        let evaluator = FitnessEvaluator::new(FitnessConfig::default(), &pool).unwrap();

        let (fitness, breakdown) = evaluator.evaluate(&pool, &[0, 1, 2]);
        // income {A, B} + race {1, 2} + school {public} = 5 distinct
        assert!((breakdown.mean_quality - 70.0).abs() < 1e-9);
        assert!((breakdown.diversity - 0.5).abs() < 1e-9);
        assert!((breakdown.coverage - 2.0 / 27.0).abs() < 1e-9);

        let expected = 0.5 * 70.0 + 0.3 * 50.0 + 0.2 * 100.0 * 2.0 / 27.0;
        assert!((fitness - expected).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let pool = test_pool();
        let evaluator = FitnessEvaluator::new(FitnessConfig::default(), &pool).unwrap();
        let members = [3, 1, 4, 0];
        assert_eq!(
            evaluator.fitness(&pool, &members).to_bits(),
            evaluator.fitness(&pool, &members).to_bits()
        );
    }

    #[test]
    fn test_quality_monotonic() {
        let pool = test_pool();
        let evaluator = FitnessEvaluator::new(FitnessConfig::default(), &pool).unwrap();

        // "e" shares every attribute with "a" but scores higher
        let low = evaluator.evaluate(&pool, &[0, 1]);
        let high = evaluator.evaluate(&pool, &[4, 1]);
        assert_eq!(low.1.diversity, high.1.diversity);
        assert_eq!(low.1.coverage, high.1.coverage);
        assert!(high.0 > low.0);
    }

    #[test]
    fn test_unknown_field() {
        let pool = test_pool();
        let config = FitnessConfig {
            region_field: "state".to_string(),
            ..Default::default()
        };
        let err = FitnessEvaluator::new(config, &pool).unwrap_err();
        assert!(matches!(err, EvolutionError::UnknownField(name) if name == "state"));
    }

    #[test]
    fn test_summary() {
        let pool = test_pool();
        let evaluator = FitnessEvaluator::new(FitnessConfig::default(), &pool).unwrap();

        let summary = evaluator.summarize(&pool, &[0, 2, 3, 3]);
        assert_eq!(summary.size, 4);
        assert_eq!(summary.distinct_members, 3);
        assert_eq!(summary.distinct_per_field["income_bracket"], 3);
        assert_eq!(summary.distinct_per_field["school_type"], 1);
        assert_eq!(summary.distinct_regions, 2);
    }

    #[test]
    fn test_empty_group() {
        let pool = test_pool();
        let evaluator = FitnessEvaluator::new(FitnessConfig::default(), &pool).unwrap();
        assert_eq!(evaluator.fitness(&pool, &[]), 0.0);
    }
}
