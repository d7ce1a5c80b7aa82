//! JSON candidate loader.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use crate::compute::{CandidatePool, PoolError};
use crate::schema::{Candidate, RawRecord};

/// Errors raised while loading a pool.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed candidate data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid pool: {0}")]
    Pool(#[from] PoolError),
    #[error("Input holds no complete records")]
    NoCompleteRecords,
}

/// One input row: raw sub-scores, or an already aggregated candidate (the
/// shape written by [`write_selection`](super::write_selection)).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PoolRecord {
    Raw(RawRecord),
    Candidate(Candidate),
}

impl PoolRecord {
    fn into_candidate(self) -> Option<Candidate> {
        match self {
            Self::Raw(raw) => raw.into_candidate(),
            Self::Candidate(candidate) => Some(candidate),
        }
    }
}

/// Load a pool from a JSON array of records.
pub fn load_pool<P: AsRef<Path>>(path: P) -> Result<CandidatePool, LoadError> {
    let path = path.as_ref();
    let pool = read_pool(BufReader::new(File::open(path)?))?;
    info!("loaded {} candidates from {}", pool.len(), path.display());
    Ok(pool)
}

/// Read a pool from any JSON source.
pub fn read_pool<R: Read>(reader: R) -> Result<CandidatePool, LoadError> {
    let records: Vec<PoolRecord> = serde_json::from_reader(reader)?;
    pool_from_records(records)
}

/// Aggregate records into a pool, dropping rows with a missing sub-score.
pub fn pool_from_records(records: Vec<PoolRecord>) -> Result<CandidatePool, LoadError> {
    let total = records.len();
    let candidates: Vec<Candidate> = records
        .into_iter()
        .filter_map(PoolRecord::into_candidate)
        .collect();

    let dropped = total - candidates.len();
    if dropped > 0 {
        warn!("dropped {dropped} of {total} records with missing scores");
    }

    if candidates.is_empty() {
        return Err(LoadError::NoCompleteRecords);
    }

    Ok(CandidatePool::new(candidates)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const RECORDS: &str = r#"[
        {"id": "1", "scores": [600.0, 700.0, 800.0, 500.0, 900.0],
         "attributes": {"income_bracket": "A", "race": "1", "school_type": "public", "region": "SP"}},
        {"id": "2", "scores": [650.0, null, 700.0, 720.0, 680.0],
         "attributes": {"income_bracket": "B", "race": "2", "school_type": "private", "region": "RJ"}},
        {"id": "3", "scores": [50.0, 60.0],
         "attributes": {"income_bracket": null, "region": "MG"}},
        {"id": "4", "quality": 75.5, "attributes": {"region": "BA"}}
    ]"#;

    #[test]
    fn test_drops_incomplete_records() {
        let pool = read_pool(RECORDS.as_bytes()).unwrap();

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.position("2"), None);
        assert_eq!(pool.quality(pool.position("1").unwrap()), 700.0);
        assert_eq!(pool.quality(pool.position("3").unwrap()), 55.0);
        assert_eq!(pool.quality(pool.position("4").unwrap()), 75.5);
    }

    #[test]
    fn test_null_attribute_is_unknown() {
        let pool = read_pool(RECORDS.as_bytes()).unwrap();
        let income = pool.field_index("income_bracket").unwrap();
        let third = pool.position("3").unwrap();

        assert_eq!(pool.code(income, third), None);
        assert_eq!(pool.distinct_count(income, &[third]), 0);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pool.json");
        fs::write(&path, RECORDS).unwrap();

        let pool = load_pool(&path).unwrap();
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();

        let missing = load_pool(dir.path().join("absent.json"));
        assert!(matches!(missing, Err(LoadError::Io(_))));

        let malformed = read_pool("{\"id\": 1}".as_bytes());
        assert!(matches!(malformed, Err(LoadError::Json(_))));

        let incomplete = read_pool(r#"[{"id": "x", "scores": [null]}]"#.as_bytes());
        assert!(matches!(incomplete, Err(LoadError::NoCompleteRecords)));

        let duplicate = read_pool(
            r#"[{"id": "x", "quality": 1.0}, {"id": "x", "quality": 2.0}]"#.as_bytes(),
        );
        assert!(matches!(
            duplicate,
            Err(LoadError::Pool(PoolError::DuplicateId(_)))
        ));
    }

    #[test]
    fn test_numeric_attribute_codes() {
        let json = r#"[
            {"id": "1", "scores": [600.0, 700.0], "attributes": {"race": 1, "school_type": 2, "region": "SP"}},
            {"id": "2", "scores": [500.0, 550.0], "attributes": {"race": 3, "school_type": 2, "region": 35}}
        ]"#;
        let pool = read_pool(json.as_bytes()).unwrap();
        let race = pool.field_index("race").unwrap();
        let school = pool.field_index("school_type").unwrap();

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.distinct_count(race, &[0, 1]), 2);
        assert_eq!(pool.distinct_count(school, &[0, 1]), 1);
        let code = pool.code(race, 0).unwrap();
        assert_eq!(pool.value_name(race, code), Some("1"));
    }

    #[test]
    fn test_aggregated_row_null_attribute() {
        let json = r#"[{"id": "1", "quality": 70.0, "attributes": {"race": null, "region": "SP"}}]"#;
        let pool = read_pool(json.as_bytes()).unwrap();
        let race = pool.field_index("race");

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.quality(0), 70.0);
        // the only race value was null, so the field never appears
        assert_eq!(race, None);
        assert!(pool.field_index("region").is_some());
    }
}
