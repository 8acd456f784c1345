//! Octonaria and duodenaria (`.o.`, `.d.`)
//!
//! Plain semibreves are binary (2). A single down-stemmed semibrevis takes the
//! remainder; without one, the final plain semibrevis does. When two or more
//! down-stemmed semibreves are ambiguous together they share the remainder
//! with the outer members weighing half the inner ones (`[2, 4, 4, 2]` of 12).
//!
//! The share goes through the full engine once as its own brevis-group of
//! down-stemmed semibreves under a duodenaria of that capacity. That group
//! has the same shape one level down, so at the depth bound it lands on the
//! direct weighted split; the sub-group pass only adds its fixed-length,
//! classification and capacity checks on the way.

use super::{assigned_total, FamilyContext, FamilyResolver};
use crate::engine::resolve_group;
use crate::errors::Result;
use crate::models::length::{minimae, Rational};
use crate::models::{Divisione, DivisioneFamily, DivisioneKind, MensuralType, NoteToken, Stem};

#[derive(Debug, Clone, Copy, Default)]
pub struct OctonariaDuodenaria;

/// Split `share` over `count` members: 1 at each end, 2 inside
///
/// One or two members split evenly.
pub fn balanced_split(share: Rational, count: usize) -> Vec<Rational> {
    let weights: Vec<i32> = if count <= 2 {
        vec![1; count]
    } else {
        (0..count)
            .map(|i| if i == 0 || i == count - 1 { 1 } else { 2 })
            .collect()
    };
    let unit = share / minimae(weights.iter().sum::<i32>().max(1));
    weights.into_iter().map(|w| unit * minimae(w)).collect()
}

impl OctonariaDuodenaria {
    /// Lengths for `count` down-stemmed semibreves sharing `share` minimae
    fn split_share(ctx: &FamilyContext<'_>, share: Rational, count: usize) -> Result<Vec<Rational>> {
        if ctx.depth < ctx.config.max_recursion_depth && share.is_integer() {
            let mut sub_divisione = Divisione::from_kind(DivisioneKind::Duodenaria);
            sub_divisione.set_minima_per_brevis(share.to_integer() as u32)?;
            let tokens = vec![NoteToken::note(MensuralType::Semibrevis).with_stem(Stem::Down); count];
            log::debug!(
                "{}: resolving {} minimae over {} down-stemmed semibreves as a sub-group",
                ctx.divisione.standard_symbol(),
                share,
                count
            );
            return resolve_group(&tokens, &sub_divisione, ctx.config, ctx.depth + 1);
        }

        if ctx.depth == 0 && share.is_integer() {
            log::warn!(
                "{}: recursion limit {} reached, splitting {} minimae directly",
                ctx.divisione.standard_symbol(),
                ctx.config.max_recursion_depth,
                share
            );
        }
        Ok(balanced_split(share, count))
    }
}

impl FamilyResolver for OctonariaDuodenaria {
    fn family(&self) -> DivisioneFamily {
        DivisioneFamily::OctonariaDuodenaria
    }

    fn fill(&self, ctx: &FamilyContext<'_>, lengths: &mut [Option<Rational>]) -> Result<bool> {
        let buckets = ctx.buckets;
        let plain = buckets.semibrevis();
        let down = buckets.semibrevis_downstem();
        let remaining = ctx.remainder(lengths);
        let zero = minimae(0);

        if down.len() >= 2 {
            for &i in plain {
                lengths[i] = Some(minimae(2));
            }
            let share = remaining - assigned_total(lengths, plain.iter().copied());
            if share <= zero {
                return Ok(false);
            }
            let split = Self::split_share(ctx, share, down.len())?;
            for (&i, length) in down.iter().zip(split) {
                lengths[i] = Some(length);
            }
            return Ok(true);
        }

        let absorber = down.first().copied().or_else(|| {
            if buckets.has_last_semibrevis() {
                plain.last().copied()
            } else {
                None
            }
        });
        for &i in plain.iter().filter(|&&i| Some(i) != absorber) {
            lengths[i] = Some(minimae(2));
        }

        match absorber {
            Some(absorber) => {
                let others = plain.iter().copied().filter(|&i| i != absorber);
                let length = remaining - assigned_total(lengths, others);
                lengths[absorber] = Some(length);
                Ok(length > zero)
            }
            None => Ok(true),
        }
    }
}
