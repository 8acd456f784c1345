//! Bucketing of context-dependent tokens
//!
//! Every token whose length is still unknown after the unchangeable pass falls
//! into exactly one notational category; each family resolver has its own rule
//! per category.

use crate::errors::{MensuralError, Result};
use crate::models::length::Rational;
use crate::models::{FlagOrientation, MensuralType, NoteToken, Stem};

/// Notational category of an ambiguous token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmbiguityCategory {
    Semibrevis,
    SemibrevisDownstem,
    SemiminimaRightFlag,
    SemiminimaLeftFlag,
    SemiminimaRest,
}

/// Indices of ambiguous tokens, by category, in sequence order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AmbiguityBuckets {
    semibrevis: Vec<usize>,
    semibrevis_downstem: Vec<usize>,
    semiminima_right_flag: Vec<usize>,
    semiminima_left_flag: Vec<usize>,
    semiminima_rest: Vec<usize>,
    token_count: usize,
}

impl AmbiguityBuckets {
    pub fn semibrevis(&self) -> &[usize] {
        &self.semibrevis
    }

    pub fn semibrevis_downstem(&self) -> &[usize] {
        &self.semibrevis_downstem
    }

    pub fn semiminima_right_flag(&self) -> &[usize] {
        &self.semiminima_right_flag
    }

    pub fn semiminima_left_flag(&self) -> &[usize] {
        &self.semiminima_left_flag
    }

    pub fn semiminima_rest(&self) -> &[usize] {
        &self.semiminima_rest
    }

    pub fn number_of_semibreves(&self) -> usize {
        self.semibrevis.len()
    }

    pub fn number_of_downstems(&self) -> usize {
        self.semibrevis_downstem.len()
    }

    pub fn number_of_right_flags(&self) -> usize {
        self.semiminima_right_flag.len()
    }

    pub fn number_of_left_flags(&self) -> usize {
        self.semiminima_left_flag.len()
    }

    pub fn number_of_semiminima_rests(&self) -> usize {
        self.semiminima_rest.len()
    }

    /// Index of the final token of the group
    pub fn last_index(&self) -> usize {
        self.token_count.saturating_sub(1)
    }

    /// The last plain ambiguous semibrevis is the final token of the group
    pub fn has_last_semibrevis(&self) -> bool {
        self.token_count > 0 && self.semibrevis.last() == Some(&self.last_index())
    }

    /// The final token is an ambiguous down-stemmed semibrevis
    pub fn has_last_downstem(&self) -> bool {
        self.token_count > 0 && self.semibrevis_downstem.last() == Some(&self.last_index())
    }

    pub fn has_semiminimae(&self) -> bool {
        !(self.semiminima_left_flag.is_empty()
            && self.semiminima_right_flag.is_empty()
            && self.semiminima_rest.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.semibrevis.is_empty() && self.semibrevis_downstem.is_empty() && !self.has_semiminimae()
    }

    pub fn category_of(&self, index: usize) -> Option<AmbiguityCategory> {
        let buckets = [
            (&self.semibrevis, AmbiguityCategory::Semibrevis),
            (&self.semibrevis_downstem, AmbiguityCategory::SemibrevisDownstem),
            (&self.semiminima_right_flag, AmbiguityCategory::SemiminimaRightFlag),
            (&self.semiminima_left_flag, AmbiguityCategory::SemiminimaLeftFlag),
            (&self.semiminima_rest, AmbiguityCategory::SemiminimaRest),
        ];
        buckets
            .iter()
            .find(|(indices, _)| indices.binary_search(&index).is_ok())
            .map(|(_, category)| *category)
    }

    /// Plain and down-stemmed semibrevis indices, merged in sequence order
    pub fn all_semibreves(&self) -> Vec<usize> {
        let mut all: Vec<usize> = self
            .semibrevis
            .iter()
            .chain(self.semibrevis_downstem.iter())
            .copied()
            .collect();
        all.sort_unstable();
        all
    }

    /// Fail if any bucket points past the end of the sequence
    pub fn check_bounds(&self, token_count: usize) -> Result<()> {
        let out_of_range = [
            &self.semibrevis,
            &self.semibrevis_downstem,
            &self.semiminima_right_flag,
            &self.semiminima_left_flag,
            &self.semiminima_rest,
        ]
        .iter()
        .flat_map(|bucket| bucket.iter())
        .find(|&&index| index >= token_count)
        .copied();

        match out_of_range {
            Some(index) => Err(MensuralError::MalformedTokenSequence(format!(
                "bucket index {} beyond sequence of {} tokens",
                index, token_count
            ))),
            None => Ok(()),
        }
    }

    fn push(&mut self, category: AmbiguityCategory, index: usize) {
        match category {
            AmbiguityCategory::Semibrevis => self.semibrevis.push(index),
            AmbiguityCategory::SemibrevisDownstem => self.semibrevis_downstem.push(index),
            AmbiguityCategory::SemiminimaRightFlag => self.semiminima_right_flag.push(index),
            AmbiguityCategory::SemiminimaLeftFlag => self.semiminima_left_flag.push(index),
            AmbiguityCategory::SemiminimaRest => self.semiminima_rest.push(index),
        }
    }
}

/// Category of a token whose length is unknown
///
/// Only semibreves (notes, or rests in octonaria/duodenaria) and semiminimae
/// can be ambiguous; any other type reaching here is a bug in the caller.
pub fn categorize(token: &NoteToken) -> Result<AmbiguityCategory> {
    match (token.mensural_type, token.is_rest) {
        (MensuralType::Semibrevis, true) => Ok(AmbiguityCategory::Semibrevis),
        (MensuralType::Semibrevis, false) => {
            if token.has_stem(Stem::Down) {
                Ok(AmbiguityCategory::SemibrevisDownstem)
            } else {
                Ok(AmbiguityCategory::Semibrevis)
            }
        }
        (MensuralType::Semiminima, true) => Ok(AmbiguityCategory::SemiminimaRest),
        (MensuralType::Semiminima, false) => match token.flag(Stem::Up) {
            Some(FlagOrientation::Right) => Ok(AmbiguityCategory::SemiminimaRightFlag),
            Some(FlagOrientation::Left) | None => Ok(AmbiguityCategory::SemiminimaLeftFlag),
        },
        (other, _) => Err(MensuralError::MalformedTokenSequence(format!(
            "{:?} has no context-dependent length",
            other
        ))),
    }
}

/// Partition the unknown-length indices into buckets
pub fn classify(tokens: &[NoteToken], lengths: &[Option<Rational>]) -> Result<AmbiguityBuckets> {
    if tokens.len() != lengths.len() {
        return Err(MensuralError::MalformedTokenSequence(format!(
            "{} tokens but {} lengths",
            tokens.len(),
            lengths.len()
        )));
    }

    let mut buckets = AmbiguityBuckets {
        token_count: tokens.len(),
        ..Default::default()
    };
    for (index, (token, length)) in tokens.iter().zip(lengths).enumerate() {
        if length.is_none() {
            buckets.push(categorize(token)?, index);
        }
    }
    Ok(buckets)
}
