//! Many brevis-groups at once
//!
//! Groups are independent, so a score's worth of them can be resolved in any
//! order. With the `parallel` feature the work is spread over rayon's pool;
//! results always come back in input order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::BrevisLengthTranslator;
use crate::errors::Result;
use crate::models::{Divisione, LengthAssignment, NoteToken};

/// Resolve every `(tokens, divisione)` group, one result per group
pub fn resolve_batch(
    translator: &BrevisLengthTranslator,
    groups: &[(Vec<NoteToken>, Divisione)],
) -> Vec<Result<LengthAssignment>> {
    log::debug!("Resolving batch of {} brevis-groups", groups.len());

    #[cfg(feature = "parallel")]
    let results = groups
        .par_iter()
        .map(|(tokens, divisione)| translator.resolve(tokens, divisione))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results = groups
        .iter()
        .map(|(tokens, divisione)| translator.resolve(tokens, divisione))
        .collect();

    results
}
