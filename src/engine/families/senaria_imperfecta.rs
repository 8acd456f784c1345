//! Senaria imperfecta (`.i.`)
//!
//! Resolved by local look-ahead alone. After reserving 3 minimae for every
//! down-stemmed semibrevis, the average of what is left over the plain
//! semibreves decides:
//!
//! | average      | each plain semibrevis                       |
//! |--------------|---------------------------------------------|
//! | 2            | 2                                           |
//! | between 2, 3 | 2 before a minima, 3 otherwise              |
//! | 3            | 3                                           |
//! | otherwise    | look-ahead, the last one takes the rest     |
//!
//! The last down-stemmed semibrevis takes whatever remains.

use super::{assigned_total, FamilyContext, FamilyResolver};
use crate::errors::Result;
use crate::models::length::{minimae, Rational};
use crate::models::DivisioneFamily;

#[derive(Debug, Clone, Copy, Default)]
pub struct SenariaImperfecta;

impl FamilyResolver for SenariaImperfecta {
    fn family(&self) -> DivisioneFamily {
        DivisioneFamily::SenariaImperfecta
    }

    fn fill(&self, ctx: &FamilyContext<'_>, lengths: &mut [Option<Rational>]) -> Result<bool> {
        let plain = ctx.buckets.semibrevis();
        let down = ctx.buckets.semibrevis_downstem();
        let remaining = ctx.remainder(lengths);
        let for_plain = remaining - minimae(3 * down.len() as i32);

        if let Some((&last, leading)) = plain.split_last() {
            let average = for_plain / minimae(plain.len() as i32);
            let (two, three) = (minimae(2), minimae(3));

            if average == two || average == three {
                for &i in plain {
                    lengths[i] = Some(average);
                }
            } else if average > two && average < three {
                for &i in plain {
                    lengths[i] = Some(ctx.lookahead_length(i));
                }
            } else {
                for &i in leading {
                    lengths[i] = Some(ctx.lookahead_length(i));
                }
                let assigned = assigned_total(lengths, leading.iter().copied());
                lengths[last] = Some(for_plain - assigned);
            }
        }

        if let Some((&last, leading)) = down.split_last() {
            for &i in leading {
                lengths[i] = Some(minimae(3));
            }
            let assigned = assigned_total(lengths, plain.iter().chain(leading).copied());
            lengths[last] = Some(remaining - assigned);
        }

        let zero = minimae(0);
        Ok(plain
            .iter()
            .chain(down)
            .all(|&i| lengths[i].map_or(false, |l| l > zero)))
    }
}
