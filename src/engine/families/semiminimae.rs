//! Semiminima trial assignments
//!
//! A semiminima lasts either 1/2 or 2/3 of a minima depending on the group it
//! sits in, and the notation only hints at which through the flag direction.
//! Every family tries the four (left-flag, right-flag) pairings in a fixed
//! order. Semiminima rests take one of the two values per run of consecutive
//! rests: when the pairing's values agree there is one variant, otherwise each
//! run independently takes the left or the right value.

use crate::engine::classify::AmbiguityBuckets;
use crate::errors::{MensuralError, Result};
use crate::models::length::Rational;

/// (left-flag, right-flag) lengths, in trial order
pub fn pairings() -> [(Rational, Rational); 4] {
    let half = Rational::new(1, 2);
    let two_thirds = Rational::new(2, 3);
    [
        (half, half),
        (two_thirds, half),
        (half, two_thirds),
        (two_thirds, two_thirds),
    ]
}

/// One candidate assignment for every semiminima of a group
#[derive(Debug, Clone, PartialEq)]
pub struct SemiminimaTrial {
    /// `None` for groups without semiminimae
    pub pairing: Option<(Rational, Rational)>,
    assignments: Vec<(usize, Rational)>,
}

impl SemiminimaTrial {
    /// The single trial of a group without semiminimae
    pub fn empty() -> Self {
        Self {
            pairing: None,
            assignments: Vec::new(),
        }
    }

    pub fn assignments(&self) -> &[(usize, Rational)] {
        &self.assignments
    }

    pub fn apply(&self, lengths: &mut [Option<Rational>]) {
        for &(index, length) in &self.assignments {
            lengths[index] = Some(length);
        }
    }
}

/// Group rest indices into runs of consecutive token positions
pub fn rest_runs(rests: &[usize]) -> Vec<Vec<usize>> {
    let mut runs: Vec<Vec<usize>> = Vec::new();
    for &index in rests {
        let extends_run = runs
            .last()
            .and_then(|run| run.last())
            .map_or(false, |&prev| prev + 1 == index);
        match runs.last_mut() {
            Some(run) if extends_run => run.push(index),
            _ => runs.push(vec![index]),
        }
    }
    runs
}

/// Every trial for the group's semiminimae, in scoring order
///
/// Fails with `MalformedTokenSequence` when the rests form more than
/// `max_rest_runs` separate runs, since each doubles the number of variants.
pub fn semiminima_trials(buckets: &AmbiguityBuckets, max_rest_runs: usize) -> Result<Vec<SemiminimaTrial>> {
    if !buckets.has_semiminimae() {
        return Ok(vec![SemiminimaTrial::empty()]);
    }

    let runs = rest_runs(buckets.semiminima_rest());
    if runs.len() > max_rest_runs {
        return Err(MensuralError::MalformedTokenSequence(format!(
            "{} separate semiminima rest runs exceed the limit of {}",
            runs.len(),
            max_rest_runs
        )));
    }

    let mut trials = Vec::new();
    for (left, right) in pairings() {
        let flagged: Vec<(usize, Rational)> = buckets
            .semiminima_left_flag()
            .iter()
            .map(|&i| (i, left))
            .chain(buckets.semiminima_right_flag().iter().map(|&i| (i, right)))
            .collect();

        // Bit j of the mask sends run j to the right-flag value
        let variants: u32 = if left == right { 1 } else { 1 << runs.len() };
        for mask in 0..variants {
            let mut assignments = flagged.clone();
            for (j, run) in runs.iter().enumerate() {
                let value = if mask >> j & 1 == 1 { right } else { left };
                assignments.extend(run.iter().map(|&i| (i, value)));
            }
            assignments.sort_unstable_by_key(|&(i, _)| i);
            trials.push(SemiminimaTrial {
                pairing: Some((left, right)),
                assignments,
            });
        }
    }
    Ok(trials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify::classify;
    use crate::models::{FlagOrientation, MensuralType, NoteToken, Stem};

    fn buckets_for(tokens: &[NoteToken]) -> AmbiguityBuckets {
        classify(tokens, &vec![None; tokens.len()]).unwrap()
    }

    fn sm_rest() -> NoteToken {
        NoteToken::rest(MensuralType::Semiminima)
    }

    #[test]
    fn test_no_semiminimae_single_empty_trial() {
        let buckets = buckets_for(&[NoteToken::note(MensuralType::Semibrevis)]);
        let trials = semiminima_trials(&buckets, 12).unwrap();
        assert_eq!(trials, vec![SemiminimaTrial::empty()]);
    }

    #[test]
    fn test_flags_only_four_trials() {
        let tokens = vec![
            NoteToken::note(MensuralType::Semiminima),
            NoteToken::note(MensuralType::Semiminima).with_flag(Stem::Up, FlagOrientation::Right),
        ];
        let trials = semiminima_trials(&buckets_for(&tokens), 12).unwrap();
        assert_eq!(trials.len(), 4);
        assert_eq!(trials[1].assignments(), &[(0, Rational::new(2, 3)), (1, Rational::new(1, 2))]);
    }

    #[test]
    fn test_rest_runs_vary_independently() {
        // two runs of rests: [0, 1] and [3]
        let tokens = vec![
            sm_rest(),
            sm_rest(),
            NoteToken::note(MensuralType::Semiminima),
            sm_rest(),
        ];
        let buckets = buckets_for(&tokens);
        assert_eq!(rest_runs(buckets.semiminima_rest()), vec![vec![0, 1], vec![3]]);

        let trials = semiminima_trials(&buckets, 12).unwrap();
        // 1 + 4 + 4 + 1
        assert_eq!(trials.len(), 10);

        let mixed = &trials[2];
        assert_eq!(mixed.pairing, Some((Rational::new(2, 3), Rational::new(1, 2))));
        assert_eq!(
            mixed.assignments(),
            &[
                (0, Rational::new(1, 2)),
                (1, Rational::new(1, 2)),
                (2, Rational::new(2, 3)),
                (3, Rational::new(2, 3)),
            ]
        );
    }

    #[test]
    fn test_too_many_rest_runs() {
        let tokens = vec![sm_rest(), NoteToken::note(MensuralType::Minima), sm_rest()];
        let lengths = vec![None, Some(Rational::from_integer(1)), None];
        let buckets = classify(&tokens, &lengths).unwrap();
        assert!(semiminima_trials(&buckets, 2).is_ok());
        assert!(matches!(
            semiminima_trials(&buckets, 1),
            Err(MensuralError::MalformedTokenSequence(_))
        ));
    }

    #[test]
    fn test_apply_fills_only_semiminimae() {
        let tokens = vec![NoteToken::note(MensuralType::Semibrevis), sm_rest()];
        let trials = semiminima_trials(&buckets_for(&tokens), 12).unwrap();
        let mut lengths = vec![None, None];
        trials[0].apply(&mut lengths);
        assert_eq!(lengths, vec![None, Some(Rational::new(1, 2))]);
    }
}
