//! Bounded search over small length adjustments
//!
//! A resolver that has a plausible assignment but several equally notatable
//! alternatives describes the alternatives as change groups: "give `delta` to
//! up to `max_changes` of these indices, taking it from that shrinkable index
//! (or from the free remainder)". Every combination across all groups is
//! scored with the beat-strength heuristic and the strongest one that keeps
//! the remainder non-negative wins.

use crate::engine::strength::BeatStrengthScorer;
use crate::errors::{MensuralError, Result};
use crate::models::length::{minimae, to_f64, Rational};

/// Lazy enumeration of subsets, smallest first
///
/// Yields the empty subset, then every subset of size 1, 2, ... up to
/// `max_size`, each size in lexicographic order of positions.
#[derive(Debug, Clone)]
pub struct Subsets {
    items: Vec<usize>,
    max_size: usize,
    positions: Option<Vec<usize>>,
    started: bool,
}

impl Subsets {
    pub fn new(items: Vec<usize>, max_size: usize) -> Self {
        let max_size = max_size.min(items.len());
        Self {
            items,
            max_size,
            positions: Some(Vec::new()),
            started: false,
        }
    }

    fn current(&self) -> Option<Vec<usize>> {
        self.positions
            .as_ref()
            .map(|positions| positions.iter().map(|&p| self.items[p]).collect())
    }
}

impl Iterator for Subsets {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if !self.started {
            self.started = true;
            return self.current();
        }

        let n = self.items.len();
        let max_size = self.max_size;
        let positions = self.positions.as_mut()?;
        let k = positions.len();

        // Advance within the current size
        let mut i = k;
        while i > 0 {
            i -= 1;
            if positions[i] < n - k + i {
                positions[i] += 1;
                for j in i + 1..k {
                    positions[j] = positions[j - 1] + 1;
                }
                return self.current();
            }
        }

        // Current size exhausted
        if k >= max_size {
            self.positions = None;
            return None;
        }
        *positions = (0..=k).collect();
        self.current()
    }
}

/// One set of interchangeable adjustments
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeGroup {
    /// Indices that may receive `delta`
    pub indices: Vec<usize>,
    /// At most this many of them change at once
    pub max_changes: usize,
    /// Amount added to each chosen index (negative shrinks them)
    pub delta: Rational,
    /// Index that gives back what the chosen indices gain
    pub shrinkable: Option<usize>,
}

/// Best candidate found by [`strongest_lengths`]
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    pub lengths: Vec<Rational>,
    /// Budget left after the chosen changes
    pub remaining: Rational,
    pub score: f64,
}

/// Search every combination of group changes for the strongest assignment
///
/// Each unit of change consumes `delta` from `remaining`; when a group has a
/// shrinkable index it also loses what the chosen indices gain. Candidates
/// that leave `remaining` below `-tolerance`, or that shrink any length to
/// zero, are discarded. Ties keep the earliest candidate (fewest changes
/// first). Returns `None` when nothing qualifies.
pub fn strongest_lengths(
    base: &[Rational],
    groups: &[ChangeGroup],
    remaining: Rational,
    scorer: &BeatStrengthScorer<'_>,
    tolerance: f64,
) -> Result<Option<Adjustment>> {
    for group in groups {
        let out_of_range = group
            .indices
            .iter()
            .chain(group.shrinkable.iter())
            .find(|&&i| i >= base.len());
        if let Some(index) = out_of_range {
            return Err(MensuralError::MalformedTokenSequence(format!(
                "adjustment index {} beyond sequence of {} tokens",
                index,
                base.len()
            )));
        }
    }

    let mut best = None;
    search(base, groups, remaining, scorer, tolerance, &mut best);
    Ok(best)
}

fn search(
    lengths: &[Rational],
    groups: &[ChangeGroup],
    remaining: Rational,
    scorer: &BeatStrengthScorer<'_>,
    tolerance: f64,
    best: &mut Option<Adjustment>,
) {
    let (group, rest) = match groups.split_first() {
        Some(split) => split,
        None => {
            if to_f64(remaining) < -tolerance {
                return;
            }
            let score = scorer.score(lengths);
            log::trace!("candidate {:?} remaining {} scores {}", lengths, remaining, score);
            if best.as_ref().map_or(true, |b| score > b.score) {
                *best = Some(Adjustment {
                    lengths: lengths.to_vec(),
                    remaining,
                    score,
                });
            }
            return;
        }
    };

    let zero = minimae(0);
    for subset in Subsets::new(group.indices.clone(), group.max_changes) {
        let mut candidate = lengths.to_vec();
        for &i in &subset {
            candidate[i] += group.delta;
        }
        let moved = group.delta * minimae(subset.len() as i32);
        if let Some(shrinkable) = group.shrinkable {
            candidate[shrinkable] -= moved;
        }
        if candidate.iter().any(|l| *l <= zero) {
            continue;
        }
        search(&candidate, rest, remaining - moved, scorer, tolerance, best);
    }
}
