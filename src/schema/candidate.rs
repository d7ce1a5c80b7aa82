//! Candidate records as supplied by the data loader.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A selectable candidate: a quality score plus categorical attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Stable unique identifier.
    pub id: String,
    /// Aggregate quality score, expected on a 0-100 scale.
    pub quality: f64,
    /// Categorical attributes keyed by field name.
    /// A missing key means the value is unknown; `null` reads as missing.
    #[serde(default, deserialize_with = "deserialize_attributes")]
    pub attributes: BTreeMap<String, String>,
}

impl Candidate {
    /// Create a candidate with no attributes.
    pub fn new(id: impl Into<String>, quality: f64) -> Self {
        Self {
            id: id.into(),
            quality,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }
}

/// A raw data row before aggregation: individual sub-scores that may be
/// missing, and categorical values that may be null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    /// Stable unique identifier.
    pub id: String,
    /// Raw sub-scores; `null` marks a missing score.
    pub scores: Vec<Option<f64>>,
    /// Categorical values; `null` marks an unknown value.
    #[serde(default, deserialize_with = "deserialize_optional_attributes")]
    pub attributes: BTreeMap<String, Option<String>>,
}

impl RawRecord {
    /// Aggregate into a [`Candidate`].
    ///
    /// Returns `None` when the record has no sub-scores or any sub-score is
    /// missing; such records are excluded from the pool.
    pub fn into_candidate(self) -> Option<Candidate> {
        if self.scores.is_empty() {
            return None;
        }

        let scores: Option<Vec<f64>> = self.scores.into_iter().collect();
        let scores = scores?;
        let quality = scores.iter().sum::<f64>() / scores.len() as f64;

        let attributes = self
            .attributes
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field, v)))
            .collect();

        Some(Candidate {
            id: self.id,
            quality,
            attributes,
        })
    }
}

/// A categorical value as it appears in input data: text, a numeric code
/// or a flag. Every form is kept as its text label.
#[derive(Deserialize)]
#[serde(untagged)]
enum AttributeValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl AttributeValue {
    fn into_label(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Integer(code) => code.to_string(),
            // integral codes exported as floats label the same as integers
            Self::Float(code) if code.fract() == 0.0 && code.abs() < 1e15 => {
                (code as i64).to_string()
            }
            Self::Float(code) => code.to_string(),
            Self::Flag(flag) => flag.to_string(),
        }
    }
}

fn deserialize_optional_attributes<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = BTreeMap::<String, Option<AttributeValue>>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|(field, value)| (field, value.map(AttributeValue::into_label)))
        .collect())
}

fn deserialize_attributes<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = deserialize_optional_attributes(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_mean() {
        let record = RawRecord {
            id: "a".to_string(),
            scores: vec![Some(500.0), Some(600.0), Some(700.0)],
            attributes: BTreeMap::from([
                ("region".to_string(), Some("SP".to_string())),
                ("race".to_string(), None),
            ]),
        };

        let candidate = record.into_candidate().unwrap();
        assert_eq!(candidate.id, "a");
        assert!((candidate.quality - 600.0).abs() < 1e-9);
        assert_eq!(candidate.attributes.get("region").map(String::as_str), Some("SP"));
        assert!(!candidate.attributes.contains_key("race"));
    }

    #[test]
    fn test_incomplete_record_dropped() {
        let record = RawRecord {
            id: "b".to_string(),
            scores: vec![Some(500.0), None],
            attributes: BTreeMap::new(),
        };
        assert!(record.into_candidate().is_none());

        let empty = RawRecord {
            id: "c".to_string(),
            scores: vec![],
            attributes: BTreeMap::new(),
        };
        assert!(empty.into_candidate().is_none());
    }

    #[test]
    fn test_raw_record_json_nulls() {
        let json = r#"{"id": "x", "scores": [1.0, null], "attributes": {"region": null}}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.scores, vec![Some(1.0), None]);
        assert_eq!(record.attributes.get("region"), Some(&None));
    }

    #[test]
    fn test_scalar_attribute_values() {
        let json = r#"{"id": "x", "scores": [1.0],
            "attributes": {"race": 1, "school_type": 2.0, "income_bracket": "B",
                           "treineiro": false, "ratio": 0.5}}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        let label = |field: &str| record.attributes[field].clone();

        assert_eq!(label("race"), Some("1".to_string()));
        assert_eq!(label("school_type"), Some("2".to_string()));
        assert_eq!(label("income_bracket"), Some("B".to_string()));
        assert_eq!(label("treineiro"), Some("false".to_string()));
        assert_eq!(label("ratio"), Some("0.5".to_string()));
    }

    #[test]
    fn test_candidate_null_attribute_dropped() {
        let json = r#"{"id": "y", "quality": 70.0, "attributes": {"race": null, "region": 35}}"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();

        assert!(!candidate.attributes.contains_key("race"));
        assert_eq!(candidate.attributes["region"], "35");
    }
}
