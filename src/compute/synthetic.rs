//! Synthetic candidate pools for tests, benchmarks and demos.

use rand::prelude::*;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use super::pool::{CandidatePool, PoolError};
use crate::schema::Candidate;

/// Distribution of generated quality scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QualityDistribution {
    /// Uniform on `[min, max]`.
    Uniform { min: f64, max: f64 },
    /// Normal, clamped to `[0, 100]`.
    Normal { mean: f64, std_dev: f64 },
}

/// A categorical field and how many values it takes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticField {
    pub name: String,
    pub cardinality: usize,
}

impl SyntheticField {
    pub fn new(name: impl Into<String>, cardinality: usize) -> Self {
        Self {
            name: name.into(),
            cardinality,
        }
    }
}

/// Recipe for a synthetic pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticPoolSpec {
    /// Number of candidates.
    pub size: usize,
    /// Quality score distribution.
    pub quality: QualityDistribution,
    /// Categorical fields, each value drawn uniformly.
    pub fields: Vec<SyntheticField>,
}

impl Default for SyntheticPoolSpec {
    /// 500 candidates, uniform quality on [0, 100], three 5-valued diversity
    /// fields and a 10-valued region field.
    fn default() -> Self {
        Self {
            size: 500,
            quality: QualityDistribution::Uniform {
                min: 0.0,
                max: 100.0,
            },
            fields: vec![
                SyntheticField::new("income_bracket", 5),
                SyntheticField::new("race", 5),
                SyntheticField::new("school_type", 5),
                SyntheticField::new("region", 10),
            ],
        }
    }
}

impl SyntheticPoolSpec {
    /// Generate a pool deterministically from a seed.
    pub fn generate(&self, seed: u64) -> Result<CandidatePool, PoolError> {
        let mut rng = StdRng::seed_from_u64(seed);

        if let Some(field) = self.fields.iter().find(|f| f.cardinality == 0) {
            return Err(PoolError::InvalidSpec(format!(
                "field {} has zero cardinality",
                field.name
            )));
        }

        let mut draw_quality: Box<dyn FnMut(&mut StdRng) -> f64> = match self.quality {
            QualityDistribution::Uniform { min, max } => {
                if !(min.is_finite() && max.is_finite() && min <= max) {
                    return Err(PoolError::InvalidSpec(format!(
                        "uniform bounds [{min}, {max}] are invalid"
                    )));
                }
                Box::new(move |rng: &mut StdRng| rng.gen_range(min..=max))
            }
            QualityDistribution::Normal { mean, std_dev } => {
                if !(mean.is_finite() && std_dev.is_finite() && std_dev >= 0.0) {
                    return Err(PoolError::InvalidSpec(format!(
                        "normal mean {mean} and std dev {std_dev} are invalid"
                    )));
                }
                let normal = Normal::new(mean, std_dev)
                    .map_err(|e| PoolError::InvalidSpec(e.to_string()))?;
                Box::new(move |rng: &mut StdRng| normal.sample(rng).clamp(0.0, 100.0))
            }
        };

        let width = self.size.max(1).to_string().len();
        let candidates = (0..self.size)
            .map(|i| {
                let quality = draw_quality(&mut rng);
                self.fields.iter().fold(
                    Candidate::new(format!("c{i:0width$}"), quality),
                    |candidate, field| {
                        let value = rng.gen_range(0..field.cardinality);
                        candidate.with_attribute(&field.name, format!("{}-{value}", field.name))
                    },
                )
            })
            .collect();

        CandidatePool::new(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_shape() {
        let pool = SyntheticPoolSpec::default().generate(1).unwrap();
        assert_eq!(pool.len(), 500);

        let region = pool.field_index("region").unwrap();
        assert!(pool.field_cardinality(region) <= 10);
        assert!(
            pool.candidates()
                .iter()
                .all(|c| (0.0..=100.0).contains(&c.quality))
        );
    }

    #[test]
    fn test_generation_is_seeded() {
        let spec = SyntheticPoolSpec::default();
        let a = spec.generate(9).unwrap();
        let b = spec.generate(9).unwrap();
        assert_eq!(a.candidates(), b.candidates());
    }

    #[test]
    fn test_normal_quality_clamped() {
        let spec = SyntheticPoolSpec {
            size: 200,
            quality: QualityDistribution::Normal {
                mean: 95.0,
                std_dev: 20.0,
            },
            fields: vec![SyntheticField::new("region", 3)],
        };
        let pool = spec.generate(3).unwrap();
        assert!(pool.candidates().iter().all(|c| c.quality <= 100.0));
    }

    #[test]
    fn test_invalid_specs() {
        let zero_field = SyntheticPoolSpec {
            fields: vec![SyntheticField::new("region", 0)],
            ..Default::default()
        };
        assert!(matches!(
            zero_field.generate(0),
            Err(PoolError::InvalidSpec(_))
        ));

        let bad_normal = SyntheticPoolSpec {
            quality: QualityDistribution::Normal {
                mean: 50.0,
                std_dev: -1.0,
            },
            ..Default::default()
        };
        assert!(matches!(
            bad_normal.generate(0),
            Err(PoolError::InvalidSpec(_))
        ));

        let nan_mean = SyntheticPoolSpec {
            quality: QualityDistribution::Normal {
                mean: f64::NAN,
                std_dev: 5.0,
            },
            ..Default::default()
        };
        assert!(matches!(
            nan_mean.generate(0),
            Err(PoolError::InvalidSpec(_))
        ));
    }
}
