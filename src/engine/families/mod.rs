//! Per-family resolution of ambiguous semibreves
//!
//! The six divisiones fall into four families that share a rule for the
//! ambiguous semibreves of a group. Each family implements
//! [`FamilyResolver`]; [`FamilyDispatcher`] picks the handler for a divisione.
//!
//! Resolution of one group runs every semiminima trial (see [`semiminimae`]),
//! lets the family fill the semibreves around it, and keeps the strongest
//! candidate that lands on the divisione's capacity.

use crate::config::ResolverConfig;
use crate::engine::adjuster::{strongest_lengths, ChangeGroup};
use crate::engine::classify::AmbiguityBuckets;
use crate::engine::inconsistent;
use crate::engine::strength::BeatStrengthScorer;
use crate::errors::{MensuralError, Result};
use crate::models::length::{known_total, minimae, total, within_tolerance, Rational};
use crate::models::{Divisione, DivisioneFamily, MensuralType, NoteToken};
use num_traits::Signed;

pub mod novenaria;
pub mod octonaria;
pub mod quaternaria;
pub mod semiminimae;
pub mod senaria_imperfecta;

pub use novenaria::Novenaria;
pub use octonaria::OctonariaDuodenaria;
pub use quaternaria::QuaternariaSenariaPerfecta;
pub use semiminimae::{semiminima_trials, SemiminimaTrial};
pub use senaria_imperfecta::SenariaImperfecta;

/// Everything a family needs to fill one group
pub struct FamilyContext<'a> {
    pub tokens: &'a [NoteToken],
    pub divisione: &'a Divisione,
    pub buckets: &'a AmbiguityBuckets,
    pub scorer: &'a BeatStrengthScorer<'a>,
    pub config: &'a ResolverConfig,
    /// 0 for a caller's group, 1 inside the multi-downstem sub-problem
    pub depth: usize,
}

impl<'a> FamilyContext<'a> {
    pub fn capacity(&self) -> Rational {
        minimae(self.divisione.minima_per_brevis() as i32)
    }

    /// Capacity not yet taken by known lengths
    pub fn remainder(&self, lengths: &[Option<Rational>]) -> Rational {
        self.capacity() - known_total(lengths)
    }

    /// A minima (note or rest) follows the token at `index`
    ///
    /// The final token has no follower and is never "followed by a minima".
    pub fn followed_by_minima(&self, index: usize) -> bool {
        self.tokens
            .get(index + 1)
            .map_or(false, |next| next.mensural_type == MensuralType::Minima)
    }

    /// 2 before a minima, 3 otherwise
    pub fn lookahead_length(&self, index: usize) -> Rational {
        if self.followed_by_minima(index) {
            minimae(2)
        } else {
            minimae(3)
        }
    }
}

/// Rule for filling the ambiguous semibreves of one family
pub trait FamilyResolver {
    fn family(&self) -> DivisioneFamily;

    /// Assign every ambiguous semibrevis in `lengths`
    ///
    /// Semiminimae are already set by the current trial. Returns `Ok(false)`
    /// when the trial leaves no room for a positive length somewhere.
    fn fill(&self, ctx: &FamilyContext<'_>, lengths: &mut [Option<Rational>]) -> Result<bool>;
}

/// Family dispatcher
#[derive(Debug, Clone)]
pub struct FamilyDispatcher {
    senaria_imperfecta: SenariaImperfecta,
    novenaria: Novenaria,
    quaternaria: QuaternariaSenariaPerfecta,
    octonaria: OctonariaDuodenaria,
}

impl FamilyDispatcher {
    pub fn new() -> Self {
        Self {
            senaria_imperfecta: SenariaImperfecta,
            novenaria: Novenaria,
            quaternaria: QuaternariaSenariaPerfecta,
            octonaria: OctonariaDuodenaria,
        }
    }

    /// Get the resolver for a family
    pub fn get_handler(&self, family: DivisioneFamily) -> &dyn FamilyResolver {
        match family {
            DivisioneFamily::SenariaImperfecta => &self.senaria_imperfecta,
            DivisioneFamily::Novenaria => &self.novenaria,
            DivisioneFamily::QuaternariaSenariaPerfecta => &self.quaternaria,
            DivisioneFamily::OctonariaDuodenaria => &self.octonaria,
        }
    }
}

impl Default for FamilyDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Sum of the lengths already assigned at `indices`
pub(crate) fn assigned_total(lengths: &[Option<Rational>], indices: impl IntoIterator<Item = usize>) -> Rational {
    indices
        .into_iter()
        .filter_map(|i| lengths[i])
        .fold(minimae(0), |acc, l| acc + l)
}

/// Every length of a filled group
pub(crate) fn settled(lengths: &[Option<Rational>]) -> Result<Vec<Rational>> {
    lengths
        .iter()
        .enumerate()
        .map(|(i, l)| {
            l.ok_or_else(|| MensuralError::MalformedTokenSequence(format!("token {} left without a length", i)))
        })
        .collect()
}

/// Replace `lengths` with the strongest adjustment, `Ok(false)` if none fits
pub(crate) fn apply_strongest(
    ctx: &FamilyContext<'_>,
    lengths: &mut [Option<Rational>],
    groups: &[ChangeGroup],
    remaining: Rational,
) -> Result<bool> {
    let base = settled(lengths)?;
    match strongest_lengths(&base, groups, remaining, ctx.scorer, ctx.config.tolerance)? {
        Some(adjustment) => {
            for (slot, length) in lengths.iter_mut().zip(adjustment.lengths) {
                *slot = Some(length);
            }
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Resolve the ambiguous tokens of a group
///
/// `base` holds the unchangeable lengths. Each semiminima trial is filled by
/// the family; complete candidates that reach the capacity are scored and the
/// highest score wins (earliest on ties).
pub fn resolve_family(ctx: &FamilyContext<'_>, base: &[Option<Rational>]) -> Result<Vec<Rational>> {
    let dispatcher = FamilyDispatcher::new();
    let resolver = dispatcher.get_handler(ctx.divisione.family());
    let capacity = ctx.capacity();

    let mut best: Option<(f64, Vec<Rational>)> = None;
    let mut closest = known_total(base);

    for trial in semiminima_trials(ctx.buckets, ctx.config.max_rest_runs)? {
        let mut lengths = base.to_vec();
        trial.apply(&mut lengths);
        if !resolver.fill(ctx, &mut lengths)? {
            continue;
        }

        let candidate = match lengths.iter().copied().collect::<Option<Vec<Rational>>>() {
            Some(candidate) => candidate,
            None => continue,
        };
        let resolved = total(&candidate);
        if (capacity - resolved).abs() < (capacity - closest).abs() {
            closest = resolved;
        }
        if !within_tolerance(resolved, capacity, ctx.config.tolerance) {
            continue;
        }

        let score = ctx.scorer.score(&candidate);
        log::trace!(
            "{} trial {:?} gives {:?}, score {}",
            ctx.divisione.standard_symbol(),
            trial.pairing,
            candidate,
            score
        );
        if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
            best = Some((score, candidate));
        }
    }

    best.map(|(_, lengths)| lengths)
        .ok_or_else(|| inconsistent(ctx.divisione, closest))
}
