//! Persistence of selected groups and run results.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::compute::CandidatePool;
use crate::schema::{Candidate, EvolutionResult, GroupSnapshot};

/// Errors raised while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Candidate {0} is not in the pool")]
    UnknownCandidate(String),
}

/// Resolve a snapshot's ids back to pool positions, in snapshot order.
pub fn resolve_members(
    pool: &CandidatePool,
    snapshot: &GroupSnapshot,
) -> Result<Vec<usize>, ExportError> {
    snapshot
        .ids
        .iter()
        .map(|id| {
            pool.position(id)
                .ok_or_else(|| ExportError::UnknownCandidate(id.clone()))
        })
        .collect()
}

/// Distinct selected candidates, highest quality first.
pub fn ranked_selection(
    pool: &CandidatePool,
    snapshot: &GroupSnapshot,
) -> Result<Vec<Candidate>, ExportError> {
    let mut seen = HashSet::new();
    let mut selected: Vec<Candidate> = resolve_members(pool, snapshot)?
        .into_iter()
        .filter(|&m| seen.insert(m))
        .filter_map(|m| pool.get(m).cloned())
        .collect();

    selected.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    Ok(selected)
}

/// Write the selected candidates as a JSON array sorted by quality
/// descending. Returns the number of candidates written.
pub fn write_selection<P: AsRef<Path>>(
    path: P,
    pool: &CandidatePool,
    snapshot: &GroupSnapshot,
) -> Result<usize, ExportError> {
    let selected = ranked_selection(pool, snapshot)?;
    write_json(path, &selected)?;
    Ok(selected.len())
}

/// Write a whole run result as JSON.
pub fn write_result<P: AsRef<Path>>(path: P, result: &EvolutionResult) -> Result<(), ExportError> {
    write_json(path, result)
}

fn write_json<P: AsRef<Path>, T: serde::Serialize + ?Sized>(
    path: P,
    value: &T,
) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::load_pool;
    use crate::schema::{FitnessBreakdown, GroupSummary};
    use std::fs;
    use tempfile::tempdir;

    fn pool() -> CandidatePool {
        CandidatePool::new(vec![
            Candidate::new("low", 40.0).with_attribute("region", "SP"),
            Candidate::new("high", 90.0).with_attribute("region", "RJ"),
            Candidate::new("mid", 65.0).with_attribute("region", "SP"),
            Candidate::new("unused", 99.0).with_attribute("region", "MG"),
        ])
        .unwrap()
    }

    fn snapshot(ids: &[&str]) -> GroupSnapshot {
        GroupSnapshot {
            ids: ids.iter().map(|s| s.to_string()).collect(),
            fitness: 0.0,
            breakdown: FitnessBreakdown::default(),
            summary: GroupSummary::default(),
            generation: 0,
        }
    }

    #[test]
    fn test_ranked_by_quality() {
        let pool = pool();
        let ranked = ranked_selection(&pool, &snapshot(&["low", "high", "mid", "low"])).unwrap();
        let ids: Vec<_> = ranked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_unknown_candidate() {
        let err = ranked_selection(&pool(), &snapshot(&["ghost"])).unwrap_err();
        assert!(matches!(err, ExportError::UnknownCandidate(id) if id == "ghost"));
    }

    #[test]
    fn test_selection_reloads_as_pool() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("selection.json");
        let pool = pool();

        let written = write_selection(&path, &pool, &snapshot(&["mid", "high"])).unwrap();
        assert_eq!(written, 2);

        let reloaded = load_pool(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.candidates()[0].id, "high");
        assert_eq!(reloaded.candidates()[0].attributes["region"], "RJ");
    }

    #[test]
    fn test_write_result() {
        use crate::compute::SyntheticPoolSpec;
        use crate::compute::evolution::EvolutionEngine;
        use crate::schema::{PopulationConfig, SelectionConfig};
        use std::sync::Arc;

        let pool = Arc::new(
            SyntheticPoolSpec {
                size: 40,
                ..Default::default()
            }
            .generate(4)
            .unwrap(),
        );
        let config = SelectionConfig {
            group_size: 8,
            population: PopulationConfig {
                size: 4,
                generations: 3,
            },
            random_seed: Some(1),
            ..Default::default()
        };
        let result = EvolutionEngine::new(config, pool).unwrap().run();

        let dir = tempdir().unwrap();
        let path = dir.path().join("result.json");
        write_result(&path, &result).unwrap();

        let parsed: EvolutionResult = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.best.ids, result.best.ids);
        assert_eq!(parsed.history.best_fitness.len(), 4);
        assert_eq!(parsed.stats.random_seed, 1);
    }
}
