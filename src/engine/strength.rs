//! Beat-strength heuristic
//!
//! Scores a complete candidate assignment: each token contributes
//! `type weight × positional strength at its onset`, so heavy note values
//! starting on strong beats score highest. Landing away from the brevis
//! boundary costs the distance in minimae.
//!
//! Legality is folded into the score: inside a run of consecutive ambiguous
//! semibreves, a member without a down stem may not outlast the run's last
//! plain member. Such candidates score `f64::NEG_INFINITY`.

use crate::engine::classify::AmbiguityBuckets;
use crate::models::length::{minimae, to_f64, Rational};
use crate::models::{Divisione, MensuralType, MetricFeel, NoteToken};

/// Weight of a token's contribution by note value
pub fn type_weight(mensural_type: MensuralType) -> Rational {
    match mensural_type {
        MensuralType::Maxima | MensuralType::Longa | MensuralType::Brevis | MensuralType::Semibrevis => {
            minimae(1)
        }
        MensuralType::Minima => Rational::new(1, 2),
        MensuralType::Semiminima => Rational::new(1, 4),
    }
}

fn divides(position: Rational, period: i32) -> bool {
    position.is_integer() && position.to_integer() % period == 0
}

/// Strength of a metrical position (in minimae from the start of the brevis)
pub fn positional_strength(feel: MetricFeel, position: Rational) -> Rational {
    match feel {
        MetricFeel::Triple => {
            if divides(position, 3) {
                minimae(1)
            } else if position.is_integer() {
                Rational::new(1, 3)
            } else {
                Rational::new(1, 9)
            }
        }
        MetricFeel::Quadruple => {
            if divides(position, 4) {
                minimae(1)
            } else if divides(position, 2) {
                Rational::new(1, 2)
            } else if position.is_integer() {
                Rational::new(1, 4)
            } else {
                Rational::new(1, 8)
            }
        }
        MetricFeel::Sesqui => {
            if divides(position, 6) {
                minimae(1)
            } else if divides(position, 3) {
                Rational::new(1, 2)
            } else if divides(position, 2) {
                Rational::new(1, 3)
            } else {
                Rational::new(1, 9)
            }
        }
    }
}

/// Scores candidate assignments for one brevis-group
#[derive(Debug, Clone)]
pub struct BeatStrengthScorer<'a> {
    tokens: &'a [NoteToken],
    feel: MetricFeel,
    capacity: Rational,
    /// Plain members of each run of consecutive ambiguous semibreves
    legality_runs: Vec<Vec<usize>>,
}

impl<'a> BeatStrengthScorer<'a> {
    pub fn new(tokens: &'a [NoteToken], divisione: &Divisione, buckets: &AmbiguityBuckets) -> Self {
        Self {
            tokens,
            feel: divisione.metric_feel(),
            capacity: minimae(divisione.minima_per_brevis() as i32),
            legality_runs: semibrevis_runs(buckets),
        }
    }

    /// Whether no plain semibrevis outlasts the last plain member of its run
    pub fn is_legal(&self, lengths: &[Rational]) -> bool {
        self.legality_runs.iter().all(|plain| match plain.last() {
            Some(&last) => plain.iter().all(|&i| lengths[i] <= lengths[last]),
            None => true,
        })
    }

    pub fn score(&self, lengths: &[Rational]) -> f64 {
        debug_assert_eq!(lengths.len(), self.tokens.len());
        if !self.is_legal(lengths) {
            return f64::NEG_INFINITY;
        }

        let mut position = minimae(0);
        let mut strength = 0.0;
        for (token, &length) in self.tokens.iter().zip(lengths) {
            let weight = type_weight(token.mensural_type);
            strength += to_f64(weight * positional_strength(self.feel, position));
            position += length;
        }

        strength - (to_f64(self.capacity) - to_f64(position)).abs()
    }
}

/// Group ambiguous semibreves into runs of consecutive token indices
fn semibrevis_runs(buckets: &AmbiguityBuckets) -> Vec<Vec<usize>> {
    let mut runs: Vec<Vec<usize>> = Vec::new();
    for index in buckets.all_semibreves() {
        let extends_run = runs
            .last()
            .and_then(|run| run.last())
            .map_or(false, |&prev| prev + 1 == index);
        match runs.last_mut() {
            Some(run) if extends_run => run.push(index),
            _ => runs.push(vec![index]),
        }
    }

    runs.into_iter()
        .map(|run| {
            run.into_iter()
                .filter(|i| buckets.semibrevis().contains(i))
                .collect()
        })
        .collect()
}
