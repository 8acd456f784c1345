//! Brevis-length translation engine
//!
//! Turns the tokens of one brevis-group into exact minima lengths. A call
//! walks these stages:
//!
//! ```text
//! Start -> UnchangeableFilled -> Classified -> FamilyResolved -> Done
//!                                     |                           ^
//!                                     +-> DoubledAndRetried ------+
//! ```
//!
//! `DoubledAndRetried` is taken once, when no assignment reaches the
//! divisione's capacity and doubling is allowed: the whole group is resolved
//! again against a local copy of the divisione holding twice the minimae.
//!
//! # Example
//!
//! ```
//! use trecento_mensural::{resolve_brevis_lengths, Divisione, MensuralType, NoteToken};
//!
//! let tokens = vec![
//!     NoteToken::note(MensuralType::Semibrevis),
//!     NoteToken::note(MensuralType::Minima),
//!     NoteToken::note(MensuralType::Semibrevis),
//! ];
//! let lengths = resolve_brevis_lengths(&tokens, &Divisione::new(".i.").unwrap()).unwrap();
//! assert_eq!(lengths.to_f64_vec(), vec![2.0, 1.0, 3.0]);
//! ```

use std::fmt;

use crate::config::ResolverConfig;
use crate::errors::{MensuralError, Result};
use crate::models::length::{known_total, minimae, to_f64, Rational};
use crate::models::{Divisione, LengthAssignment, NoteToken};

pub mod adjuster;
pub mod batch;
pub mod classify;
pub mod families;
pub mod strength;
pub mod unchangeable;

pub use adjuster::{strongest_lengths, ChangeGroup, Subsets};
pub use batch::resolve_batch;
pub use classify::{classify, AmbiguityBuckets, AmbiguityCategory};
pub use families::{FamilyDispatcher, FamilyResolver};
pub use strength::BeatStrengthScorer;
pub use unchangeable::{unchangeable_length, unchangeable_lengths};

use families::{resolve_family, FamilyContext};

/// Stage of one resolution call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    UnchangeableFilled,
    Classified,
    FamilyResolved,
    DoubledAndRetried,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::UnchangeableFilled => "unchangeable filled",
            Stage::Classified => "classified",
            Stage::FamilyResolved => "family resolved",
            Stage::DoubledAndRetried => "doubled and retried",
            Stage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

fn enter(stage: Stage, divisione: &Divisione, depth: usize) {
    log::debug!(
        "{} ({} minimae, depth {}): {}",
        divisione.standard_symbol(),
        divisione.minima_per_brevis(),
        depth,
        stage
    );
}

/// Convergence failure for `divisione`, reporting the closest total reached
pub(crate) fn inconsistent(divisione: &Divisione, resolved: Rational) -> MensuralError {
    MensuralError::InconsistentDivisione {
        symbol: divisione.standard_symbol().to_string(),
        resolved: to_f64(resolved),
        capacity: divisione.minima_per_brevis(),
        doubled: false,
    }
}

/// Resolves brevis-groups under one configuration
///
/// Holds no state between calls; one translator can serve any number of
/// groups, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct BrevisLengthTranslator {
    config: ResolverConfig,
}

impl BrevisLengthTranslator {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the length of every token of one brevis-group
    ///
    /// # Errors
    /// * `InvalidDivisione` for a capacity of zero or above
    ///   [`MAX_MINIMA_PER_BREVIS`](crate::models::divisione::MAX_MINIMA_PER_BREVIS)
    /// * `MalformedTokenSequence` for an empty group or a token with
    ///   inconsistent stems/flags
    /// * `UnsupportedNotation` for dragmas
    /// * `InconsistentDivisione` when no assignment fills the brevis, even
    ///   after the doubling retry
    pub fn resolve(&self, tokens: &[NoteToken], divisione: &Divisione) -> Result<LengthAssignment> {
        divisione.validate()?;
        if tokens.is_empty() {
            return Err(MensuralError::MalformedTokenSequence(
                "cannot resolve an empty token sequence".to_string(),
            ));
        }
        for token in tokens {
            token.validate()?;
        }

        let first = match resolve_group(tokens, divisione, &self.config, 0) {
            Err(MensuralError::InconsistentDivisione { resolved, .. }) if self.config.allow_doubling => resolved,
            other => return other.map(|lengths| self.finish(lengths, divisione, false)),
        };

        let doubled = divisione.doubled();
        log::warn!(
            "{}: best total {} misses {} minimae, retrying with {}",
            divisione.standard_symbol(),
            first,
            divisione.minima_per_brevis(),
            doubled.minima_per_brevis()
        );
        enter(Stage::DoubledAndRetried, &doubled, 0);

        match resolve_group(tokens, &doubled, &self.config, 0) {
            Ok(lengths) => Ok(self.finish(lengths, &doubled, true)),
            Err(MensuralError::InconsistentDivisione {
                symbol,
                resolved,
                capacity,
                ..
            }) => Err(MensuralError::InconsistentDivisione {
                symbol,
                resolved,
                capacity,
                doubled: true,
            }),
            Err(other) => Err(other),
        }
    }

    fn finish(&self, lengths: Vec<Rational>, divisione: &Divisione, doubled: bool) -> LengthAssignment {
        enter(Stage::Done, divisione, 0);
        LengthAssignment::new(lengths, divisione.minima_per_brevis(), doubled)
    }
}

/// Resolve with the default configuration
pub fn resolve_brevis_lengths(tokens: &[NoteToken], divisione: &Divisione) -> Result<LengthAssignment> {
    BrevisLengthTranslator::default().resolve(tokens, divisione)
}

/// One pass over a group at a fixed capacity, no doubling
///
/// `depth` is 0 for a caller's group; the octonaria/duodenaria family calls
/// back in at depth 1 for its down-stemmed sub-group.
pub(crate) fn resolve_group(
    tokens: &[NoteToken],
    divisione: &Divisione,
    config: &ResolverConfig,
    depth: usize,
) -> Result<Vec<Rational>> {
    enter(Stage::Start, divisione, depth);

    let lengths = unchangeable_lengths(tokens, divisione)?;
    enter(Stage::UnchangeableFilled, divisione, depth);

    let buckets = classify(tokens, &lengths)?;
    buckets.check_bounds(tokens.len())?;
    enter(Stage::Classified, divisione, depth);

    if buckets.is_empty() {
        return fixed_only(lengths, divisione);
    }

    let scorer = BeatStrengthScorer::new(tokens, divisione, &buckets);
    let ctx = FamilyContext {
        tokens,
        divisione,
        buckets: &buckets,
        scorer: &scorer,
        config,
        depth,
    };
    let resolved = resolve_family(&ctx, &lengths)?;
    enter(Stage::FamilyResolved, divisione, depth);
    Ok(resolved)
}

/// Accept a group with no ambiguous tokens if it spans whole breves
fn fixed_only(lengths: Vec<Option<Rational>>, divisione: &Divisione) -> Result<Vec<Rational>> {
    let resolved = known_total(&lengths);
    let capacity = minimae(divisione.minima_per_brevis() as i32);
    let spans_whole_breves = resolved > minimae(0) && (resolved / capacity).is_integer();
    if !spans_whole_breves {
        return Err(inconsistent(divisione, resolved));
    }
    Ok(lengths.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FlagOrientation, MensuralType, Stem};

    fn sb() -> NoteToken {
        NoteToken::note(MensuralType::Semibrevis)
    }

    fn m() -> NoteToken {
        NoteToken::note(MensuralType::Minima)
    }

    fn div(symbol: &str) -> Divisione {
        Divisione::new(symbol).unwrap()
    }

    fn lens(values: &[i32]) -> Vec<Rational> {
        values.iter().map(|&v| minimae(v)).collect()
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::DoubledAndRetried.to_string(), "doubled and retried");
    }

    #[test]
    fn test_empty_group_is_malformed() {
        assert!(matches!(
            resolve_brevis_lengths(&[], &div(".q.")),
            Err(MensuralError::MalformedTokenSequence(_))
        ));
    }

    #[test]
    fn test_zero_capacity_rejected_before_resolution() {
        let zero: Divisione = serde_json::from_str(r#"{"kind":"Quaternaria","minima_per_brevis":0}"#).unwrap();
        assert!(matches!(
            resolve_brevis_lengths(&[m()], &zero),
            Err(MensuralError::InvalidDivisione(_))
        ));
    }

    #[test]
    fn test_invalid_token_is_malformed() {
        let tokens = vec![NoteToken::note(MensuralType::Brevis).with_stem(Stem::Up)];
        assert!(matches!(
            resolve_brevis_lengths(&tokens, &div(".q.")),
            Err(MensuralError::MalformedTokenSequence(_))
        ));
    }

    #[test]
    fn test_dragma_surfaces_unsupported() {
        let tokens = vec![sb(), m().with_stem(Stem::Down)];
        assert!(matches!(
            resolve_brevis_lengths(&tokens, &div(".p.")),
            Err(MensuralError::UnsupportedNotation(_))
        ));
    }

    #[test]
    fn test_fixed_lengths_spanning_breves() {
        let tokens = vec![NoteToken::note(MensuralType::Longa)];
        let result = resolve_brevis_lengths(&tokens, &div(".o.")).unwrap();
        assert_eq!(result.lengths(), lens(&[16]).as_slice());
        assert!(!result.was_doubled());
    }

    #[test]
    fn test_fixed_lengths_short_of_capacity() {
        let translator = BrevisLengthTranslator::new(ResolverConfig {
            allow_doubling: false,
            ..Default::default()
        });
        let err = translator.resolve(&[m(), m()], &div(".q.")).unwrap_err();
        assert_eq!(
            err,
            MensuralError::InconsistentDivisione {
                symbol: ".q.".to_string(),
                resolved: 2.0,
                capacity: 4,
                doubled: false,
            }
        );
    }

    #[test]
    fn test_doubling_retry() {
        let result = resolve_brevis_lengths(&[sb(), sb(), sb()], &div(".q.")).unwrap();
        assert_eq!(result.lengths(), lens(&[2, 2, 4]).as_slice());
        assert!(result.was_doubled());
        assert_eq!(result.minima_per_brevis(), 8);
    }

    #[test]
    fn test_doubling_disabled() {
        let translator = BrevisLengthTranslator::new(ResolverConfig {
            allow_doubling: false,
            ..Default::default()
        });
        assert!(matches!(
            translator.resolve(&[sb(), sb(), sb()], &div(".q.")),
            Err(MensuralError::InconsistentDivisione { doubled: false, .. })
        ));
    }

    #[test]
    fn test_failure_after_doubling_is_flagged() {
        // eleven minimae fit neither 4 nor 8
        let tokens = vec![m(); 11];
        let err = resolve_brevis_lengths(&tokens, &div(".q.")).unwrap_err();
        assert!(matches!(
            err,
            MensuralError::InconsistentDivisione {
                doubled: true,
                capacity: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_right_flags_are_triplets() {
        let smr = NoteToken::note(MensuralType::Semiminima).with_flag(Stem::Up, FlagOrientation::Right);
        let tokens = vec![smr.clone(), smr.clone(), smr, m(), m()];
        let result = resolve_brevis_lengths(&tokens, &div(".q.")).unwrap();
        let two_thirds = Rational::new(2, 3);
        assert_eq!(
            result.lengths(),
            &[two_thirds, two_thirds, two_thirds, minimae(1), minimae(1)]
        );
    }

    #[test]
    fn test_sub_group_recursion_is_bounded() {
        let tokens = vec![sb().with_stem(Stem::Down); 4];
        let lengths = resolve_group(&tokens, &div(".d."), &ResolverConfig::default(), 0).unwrap();
        assert_eq!(lengths, lens(&[2, 4, 4, 2]));
    }
}
