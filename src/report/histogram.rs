//! Plot-ready aggregates of a selected group.

use serde::{Deserialize, Serialize};

use crate::compute::CandidatePool;
use crate::compute::evolution::Group;

/// Equal-width histogram of member quality scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityHistogram {
    /// Lower edge of the first bin.
    pub min: f64,
    /// Upper edge of the last bin (inclusive).
    pub max: f64,
    /// Member count per bin.
    pub counts: Vec<usize>,
}

impl QualityHistogram {
    pub const DEFAULT_BINS: usize = 10;

    /// Bin the given values over their own range.
    ///
    /// A degenerate range is widened by 0.5 on each side; an empty input
    /// uses `[0, 1]`. `bins` is raised to at least 1.
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (mut min, mut max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        if values.is_empty() {
            (min, max) = (0.0, 1.0);
        } else if min == max {
            min -= 0.5;
            max += 0.5;
        }

        let mut counts = vec![0; bins];
        for &value in values {
            let position = (value - min) / (max - min) * bins as f64;
            let bin = (position.floor() as usize).min(bins - 1);
            counts[bin] += 1;
        }

        Self { min, max, counts }
    }

    /// Histogram of the quality scores of the given pool members.
    pub fn from_members(pool: &CandidatePool, members: &[usize], bins: usize) -> Self {
        let values: Vec<f64> = members
            .iter()
            .filter_map(|&m| pool.get(m).map(|c| c.quality))
            .collect();
        Self::from_values(&values, bins)
    }

    pub fn from_group(pool: &CandidatePool, group: &Group, bins: usize) -> Self {
        Self::from_members(pool, group.members(), bins)
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.bins() as f64
    }

    /// `bins + 1` edges from `min` to `max`.
    pub fn edges(&self) -> Vec<f64> {
        let width = self.bin_width();
        (0..=self.bins())
            .map(|i| self.min + width * i as f64)
            .collect()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Members per value of a categorical field, most frequent first (ties by
/// value name). Members lacking the field are not counted.
///
/// Returns `None` if the pool has no such field.
pub fn region_counts(
    pool: &CandidatePool,
    members: &[usize],
    field: &str,
) -> Option<Vec<(String, usize)>> {
    let column = pool.field_index(field)?;

    let mut counts: Vec<(String, usize)> = pool
        .value_counts(column, members)
        .into_iter()
        .enumerate()
        .filter(|&(_, count)| count > 0)
        .filter_map(|(code, count)| {
            pool.value_name(column, code as u32)
                .map(|name| (name.to_string(), count))
        })
        .collect();

    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Some(counts)
}
