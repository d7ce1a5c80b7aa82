//! Read-only candidate pool with interned categorical attributes.
//!
//! Groups refer to candidates by their position in the pool. Categorical
//! values are interned per field into dense codes so distinct-value counts
//! need no string hashing on the fitness path.

use std::collections::{BTreeSet, HashMap};

use crate::schema::Candidate;

/// Errors raised while building a pool.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PoolError {
    #[error("Duplicate candidate id: {0}")]
    DuplicateId(String),
    #[error("Candidate {id} has a non-finite quality score")]
    NonFiniteQuality { id: String },
    #[error("Invalid synthetic pool spec: {0}")]
    InvalidSpec(String),
}

/// Interned values of one categorical field.
#[derive(Debug, Clone)]
struct FieldColumn {
    name: String,
    /// Value names, indexed by code.
    values: Vec<String>,
    /// Code per candidate; `None` when the candidate lacks the field.
    codes: Vec<Option<u32>>,
}

/// Immutable, indexable collection of candidates with unique ids.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
    index: HashMap<String, usize>,
    columns: Vec<FieldColumn>,
}

impl CandidatePool {
    /// Build a pool, rejecting duplicate ids and non-finite scores.
    ///
    /// The field set is the union of attribute names across all candidates.
    pub fn new(candidates: Vec<Candidate>) -> Result<Self, PoolError> {
        let mut index = HashMap::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            if !candidate.quality.is_finite() {
                return Err(PoolError::NonFiniteQuality {
                    id: candidate.id.clone(),
                });
            }
            if index.insert(candidate.id.clone(), i).is_some() {
                return Err(PoolError::DuplicateId(candidate.id.clone()));
            }
        }

        let field_names: BTreeSet<&str> = candidates
            .iter()
            .flat_map(|c| c.attributes.keys().map(String::as_str))
            .collect();

        let columns = field_names
            .into_iter()
            .map(|name| intern_column(name, &candidates))
            .collect();

        Ok(Self {
            candidates,
            index,
            columns,
        })
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// All candidates in pool order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Candidate at a pool position.
    pub fn get(&self, member: usize) -> Option<&Candidate> {
        self.candidates.get(member)
    }

    /// Pool position of a candidate id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Quality score at a pool position.
    ///
    /// # Panics
    /// Panics if `member` is out of range.
    pub fn quality(&self, member: usize) -> f64 {
        self.candidates[member].quality
    }

    /// Sorted categorical field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Column index of a field name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Number of distinct values a field takes across the whole pool.
    pub fn field_cardinality(&self, field: usize) -> usize {
        self.columns[field].values.len()
    }

    /// Interned value code of a candidate for a field.
    pub fn code(&self, field: usize, member: usize) -> Option<u32> {
        self.columns[field].codes[member]
    }

    /// Value name for a code.
    pub fn value_name(&self, field: usize, code: u32) -> Option<&str> {
        self.columns[field]
            .values
            .get(code as usize)
            .map(String::as_str)
    }

    /// Count distinct known values of a field among the given members.
    pub fn distinct_count(&self, field: usize, members: &[usize]) -> usize {
        let column = &self.columns[field];
        let mut seen = vec![false; column.values.len()];
        let mut count = 0;
        for &member in members {
            if let Some(code) = column.codes[member]
                && !seen[code as usize]
            {
                seen[code as usize] = true;
                count += 1;
            }
        }
        count
    }

    /// Count how many members hold each known value of a field.
    /// Indexed by code.
    pub fn value_counts(&self, field: usize, members: &[usize]) -> Vec<usize> {
        let column = &self.columns[field];
        let mut counts = vec![0; column.values.len()];
        for &member in members {
            if let Some(code) = column.codes[member] {
                counts[code as usize] += 1;
            }
        }
        counts
    }
}

/// Intern one field's values in order of first appearance.
fn intern_column(name: &str, candidates: &[Candidate]) -> FieldColumn {
    let mut lookup: HashMap<&str, u32> = HashMap::new();
    let mut values = Vec::new();
    let codes = candidates
        .iter()
        .map(|c| {
            c.attributes.get(name).map(|value| {
                *lookup.entry(value.as_str()).or_insert_with(|| {
                    values.push(value.clone());
                    (values.len() - 1) as u32
                })
            })
        })
        .collect();

    FieldColumn {
        name: name.to_string(),
        values,
        codes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pool() -> CandidatePool {
        CandidatePool::new(vec![
            Candidate::new("a", 10.0)
                .with_attribute("region", "north")
                .with_attribute("race", "1"),
            Candidate::new("b", 20.0)
                .with_attribute("region", "south")
                .with_attribute("race", "1"),
            Candidate::new("c", 30.0).with_attribute("region", "north"),
        ])
        .unwrap()
    }

    #[test]
    fn test_pool_indexing() {
        let pool = sample_pool();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.position("b"), Some(1));
        assert_eq!(pool.position("z"), None);
        assert_eq!(pool.quality(2), 30.0);
        assert_eq!(pool.field_names().collect::<Vec<_>>(), vec!["race", "region"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = CandidatePool::new(vec![Candidate::new("a", 1.0), Candidate::new("a", 2.0)]);
        assert_eq!(result.unwrap_err(), PoolError::DuplicateId("a".to_string()));
    }

    #[test]
    fn test_non_finite_quality_rejected() {
        let result = CandidatePool::new(vec![Candidate::new("a", f64::NAN)]);
        assert!(matches!(result, Err(PoolError::NonFiniteQuality { .. })));
    }

    #[test]
    fn test_distinct_count_skips_missing() {
        let pool = sample_pool();
        let region = pool.field_index("region").unwrap();
        let race = pool.field_index("race").unwrap();

        assert_eq!(pool.field_cardinality(region), 2);
        assert_eq!(pool.distinct_count(region, &[0, 1, 2]), 2);
        assert_eq!(pool.distinct_count(region, &[0, 2]), 1);
        // "c" has no race attribute
        assert_eq!(pool.distinct_count(race, &[2]), 0);
        assert_eq!(pool.distinct_count(race, &[0, 1, 2]), 1);
    }

    #[test]
    fn test_value_counts() {
        let pool = sample_pool();
        let region = pool.field_index("region").unwrap();
        let counts = pool.value_counts(region, &[0, 1, 2, 2]);
        let north = pool.code(region, 0).unwrap();
        assert_eq!(pool.value_name(region, north), Some("north"));
        assert_eq!(counts[north as usize], 3);
        assert_eq!(counts.iter().sum::<usize>(), 4);
    }
}
