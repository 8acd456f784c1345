//! Novenaria (`.n.`)
//!
//! Plain semibreves get 2 before a minima and 3 otherwise. One semibrevis
//! absorbs the remainder (floored at 3): the last down-stemmed one, or the
//! last plain one when it closes the group. A down-stemmed absorber in the
//! middle of the group may hand its stretch back to semibreves valued 2, one
//! minima each, wherever that lands notes on stronger beats.
//!
//! Without an absorber the leftover (or shortfall) is spread in single minimae
//! over the semibreves valued 2 (or taken from those valued 3).

use super::{apply_strongest, assigned_total, FamilyContext, FamilyResolver};
use crate::engine::adjuster::ChangeGroup;
use crate::errors::Result;
use crate::models::length::{minimae, Rational};
use crate::models::DivisioneFamily;

#[derive(Debug, Clone, Copy, Default)]
pub struct Novenaria;

impl Novenaria {
    fn absorber(ctx: &FamilyContext<'_>) -> Option<usize> {
        let buckets = ctx.buckets;
        buckets.semibrevis_downstem().last().copied().or_else(|| {
            if buckets.has_last_semibrevis() {
                buckets.semibrevis().last().copied()
            } else {
                None
            }
        })
    }
}

/// Plain semibreves currently valued `value`
fn valued(ctx: &FamilyContext<'_>, lengths: &[Option<Rational>], value: i32) -> Vec<usize> {
    ctx.buckets
        .semibrevis()
        .iter()
        .copied()
        .filter(|&i| lengths[i] == Some(minimae(value)))
        .collect()
}

impl FamilyResolver for Novenaria {
    fn family(&self) -> DivisioneFamily {
        DivisioneFamily::Novenaria
    }

    fn fill(&self, ctx: &FamilyContext<'_>, lengths: &mut [Option<Rational>]) -> Result<bool> {
        let plain = ctx.buckets.semibrevis();
        let down = ctx.buckets.semibrevis_downstem();
        let remaining = ctx.remainder(lengths);
        let absorber = Self::absorber(ctx);

        for &i in plain.iter().filter(|&&i| Some(i) != absorber) {
            lengths[i] = Some(ctx.lookahead_length(i));
        }
        for &i in down.iter().filter(|&&i| Some(i) != absorber) {
            lengths[i] = Some(minimae(3));
        }
        let others = plain.iter().chain(down).copied().filter(|&i| Some(i) != absorber);
        let leftover = remaining - assigned_total(lengths, others);

        let absorber = match absorber {
            Some(absorber) => absorber,
            None => {
                let group = if leftover > minimae(0) {
                    ChangeGroup {
                        indices: valued(ctx, lengths, 2),
                        max_changes: leftover.floor().to_integer() as usize,
                        delta: minimae(1),
                        shrinkable: None,
                    }
                } else if leftover < minimae(0) {
                    ChangeGroup {
                        indices: valued(ctx, lengths, 3),
                        max_changes: (-leftover).ceil().to_integer() as usize,
                        delta: minimae(-1),
                        shrinkable: None,
                    }
                } else {
                    return Ok(true);
                };
                return apply_strongest(ctx, lengths, &[group], leftover);
            }
        };

        let floor = minimae(3);
        lengths[absorber] = Some(leftover.max(floor));

        let stretchable = down.contains(&absorber) && absorber != ctx.buckets.last_index() && leftover > floor;
        if stretchable {
            let stretch = leftover - floor;
            let extendable = valued(ctx, lengths, 2);
            let group = ChangeGroup {
                max_changes: (stretch.floor().to_integer() as usize).min(extendable.len()),
                indices: extendable,
                delta: minimae(1),
                shrinkable: Some(absorber),
            };
            return apply_strongest(ctx, lengths, &[group], stretch);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::engine::classify::classify;
    use crate::engine::strength::BeatStrengthScorer;
    use crate::engine::unchangeable::unchangeable_lengths;
    use crate::models::{Divisione, MensuralType, NoteToken, Stem};

    /// Helper to fill one group directly, without semiminima trials
    fn fill(tokens: &[NoteToken]) -> Vec<i32> {
        let div = Divisione::new(".n.").unwrap();
        let mut lengths = unchangeable_lengths(tokens, &div).unwrap();
        let buckets = classify(tokens, &lengths).unwrap();
        let scorer = BeatStrengthScorer::new(tokens, &div, &buckets);
        let config = ResolverConfig::default();
        let ctx = FamilyContext {
            tokens,
            divisione: &div,
            buckets: &buckets,
            scorer: &scorer,
            config: &config,
            depth: 0,
        };
        assert!(Novenaria.fill(&ctx, &mut lengths).unwrap());
        lengths.iter().map(|l| l.unwrap().to_integer()).collect()
    }

    fn sb() -> NoteToken {
        NoteToken::note(MensuralType::Semibrevis)
    }

    fn m() -> NoteToken {
        NoteToken::note(MensuralType::Minima)
    }

    #[test]
    fn test_leftover_lands_on_downbeat() {
        assert_eq!(fill(&[sb(), m(), m(), m(), sb(), m()]), vec![3, 1, 1, 1, 2, 1]);
    }

    #[test]
    fn test_downstem_absorbs_remainder() {
        let tokens = vec![sb(), m(), m(), m(), sb().with_stem(Stem::Down), m()];
        assert_eq!(fill(&tokens), vec![2, 1, 1, 1, 3, 1]);
    }

    #[test]
    fn test_downstem_keeps_stretch_when_stronger() {
        let tokens = vec![sb(), m(), sb().with_stem(Stem::Down), m()];
        assert_eq!(fill(&tokens), vec![2, 1, 5, 1]);
    }

    #[test]
    fn test_final_semibrevis_absorbs() {
        assert_eq!(fill(&[sb(), sb(), sb()]), vec![3, 3, 3]);
    }

    #[test]
    fn test_absorber_floored_at_three() {
        let tokens = vec![sb(), m(), m(), m(), m(), m(), m(), sb()];
        assert_eq!(fill(&tokens), vec![2, 1, 1, 1, 1, 1, 1, 3]);
    }
}
