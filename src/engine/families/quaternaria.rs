//! Quaternaria and senaria perfecta (`.q.`, `.p.`)
//!
//! Plain semibreves are binary (2), down-stemmed ones perfect (3). The
//! remainder goes to the final token when it is an ambiguous semibrevis,
//! otherwise to the last down-stemmed semibrevis. All the real choice in
//! these divisiones is in the semiminima trials.

use super::{assigned_total, FamilyContext, FamilyResolver};
use crate::errors::Result;
use crate::models::length::{minimae, Rational};
use crate::models::DivisioneFamily;

#[derive(Debug, Clone, Copy, Default)]
pub struct QuaternariaSenariaPerfecta;

impl FamilyResolver for QuaternariaSenariaPerfecta {
    fn family(&self) -> DivisioneFamily {
        DivisioneFamily::QuaternariaSenariaPerfecta
    }

    fn fill(&self, ctx: &FamilyContext<'_>, lengths: &mut [Option<Rational>]) -> Result<bool> {
        let buckets = ctx.buckets;
        let plain = buckets.semibrevis();
        let down = buckets.semibrevis_downstem();
        let remaining = ctx.remainder(lengths);

        let absorber = if buckets.has_last_downstem() || buckets.has_last_semibrevis() {
            Some(buckets.last_index())
        } else {
            down.last().copied()
        };

        for &i in plain.iter().filter(|&&i| Some(i) != absorber) {
            lengths[i] = Some(minimae(2));
        }
        for &i in down.iter().filter(|&&i| Some(i) != absorber) {
            lengths[i] = Some(minimae(3));
        }

        match absorber {
            Some(absorber) => {
                let others = plain.iter().chain(down).copied().filter(|&i| i != absorber);
                let length = remaining - assigned_total(lengths, others);
                lengths[absorber] = Some(length);
                Ok(length > minimae(0))
            }
            None => Ok(true),
        }
    }
}
