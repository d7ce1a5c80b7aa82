//! Group representation and the stochastic operators acting on it.
//!
//! Provides random initialization, prefix crossover, and single-position
//! mutation. Every draw goes through [`GroupRng`] so a run is reproducible
//! from its seed.

use std::collections::HashSet;

use rand::prelude::*;
use rand::seq::index;

use crate::schema::MutationPolicy;

/// An ordered list of pool positions: one candidate subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    members: Vec<usize>,
}

impl Group {
    pub fn new(members: Vec<usize>) -> Self {
        Self { members }
    }

    /// Pool positions in chromosome order.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, member: usize) -> bool {
        self.members.contains(&member)
    }

    /// Number of distinct pool positions.
    pub fn distinct_len(&self) -> usize {
        self.members.iter().collect::<HashSet<_>>().len()
    }

    pub fn has_duplicates(&self) -> bool {
        self.distinct_len() != self.members.len()
    }

    pub fn into_members(self) -> Vec<usize> {
        self.members
    }
}

/// Random number generator wrapper for group operations.
#[derive(Debug, Clone)]
pub struct GroupRng {
    rng: StdRng,
}

impl GroupRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sample `group_size` distinct positions from `0..pool_size`, in random
    /// order.
    ///
    /// # Panics
    /// Panics if `group_size > pool_size`; callers validate this first.
    pub fn random_group(&mut self, pool_size: usize, group_size: usize) -> Group {
        Group::new(index::sample(&mut self.rng, pool_size, group_size).into_vec())
    }

    /// Uniform position in `0..len`.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Bernoulli draw.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability)
    }

    /// Prefix crossover.
    ///
    /// Takes the first `cut` members of `parent1`, with `cut` uniform in
    /// `[1, group_size - 1]`, then appends members of `parent2` that are not
    /// in that prefix, in `parent2`'s order, stopping at `group_size`. The
    /// child can come out short only when a parent holds duplicates.
    /// With `group_size == 1` the cut is fixed at 1.
    pub fn crossover(&mut self, parent1: &Group, parent2: &Group, group_size: usize) -> Group {
        let cut = if group_size > 1 {
            self.rng.gen_range(1..group_size)
        } else {
            1
        };
        prefix_crossover(parent1, parent2, cut, group_size)
    }

    /// With probability `rate`, overwrite one uniformly chosen position with
    /// a pool member drawn uniformly.
    ///
    /// Under [`MutationPolicy::Resample`] the draw is repeated until the
    /// replacement is not already in the group; a group already holding the
    /// whole pool is returned unchanged. Under [`MutationPolicy::Literal`]
    /// any member may be drawn, duplicates included.
    ///
    /// Returns the resulting group and whether a position was overwritten.
    pub fn mutate(
        &mut self,
        group: Group,
        rate: f64,
        pool_size: usize,
        policy: MutationPolicy,
    ) -> (Group, bool) {
        if group.is_empty() || pool_size == 0 || !self.chance(rate) {
            return (group, false);
        }

        let position = self.index(group.len());
        let replacement = match policy {
            MutationPolicy::Literal => Some(self.index(pool_size)),
            MutationPolicy::Resample => {
                let present: HashSet<usize> = group.members.iter().copied().collect();
                self.draw_absent(&present, pool_size)
            }
        };

        match replacement {
            Some(member) => {
                let mut members = group.into_members();
                members[position] = member;
                (Group::new(members), true)
            }
            None => (group, false),
        }
    }

    /// Top a short group up to `group_size` with uniformly drawn members it
    /// does not already hold. Stops early if the pool runs out.
    pub fn pad(&mut self, group: Group, pool_size: usize, group_size: usize) -> Group {
        let mut members = group.into_members();
        let mut present: HashSet<usize> = members.iter().copied().collect();

        while members.len() < group_size {
            match self.draw_absent(&present, pool_size) {
                Some(member) => {
                    present.insert(member);
                    members.push(member);
                }
                None => break,
            }
        }

        Group::new(members)
    }

    /// Rejection-sample a pool position outside `present`.
    fn draw_absent(&mut self, present: &HashSet<usize>, pool_size: usize) -> Option<usize> {
        let absent = pool_size.saturating_sub(present.iter().filter(|&&m| m < pool_size).count());
        if absent == 0 {
            return None;
        }
        loop {
            let member = self.index(pool_size);
            if !present.contains(&member) {
                return Some(member);
            }
        }
    }
}

/// Deterministic part of crossover for a fixed cut point.
pub fn prefix_crossover(parent1: &Group, parent2: &Group, cut: usize, group_size: usize) -> Group {
    let prefix = &parent1.members[..cut.min(parent1.len())];
    let in_prefix: HashSet<usize> = prefix.iter().copied().collect();

    let members = prefix
        .iter()
        .copied()
        .chain(
            parent2
                .members
                .iter()
                .copied()
                .filter(|m| !in_prefix.contains(m)),
        )
        .take(group_size)
        .collect();

    Group::new(members)
}

/// Jaccard distance between the member sets of two groups, in `[0, 1]`.
pub fn group_distance(a: &Group, b: &Group) -> f64 {
    let set_a: HashSet<usize> = a.members.iter().copied().collect();
    let set_b: HashSet<usize> = b.members.iter().copied().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    1.0 - intersection as f64 / union as f64
}
