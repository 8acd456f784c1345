//! Lengths fixed by a token's own notation
//!
//! Maxima, longa and brevis are multiples of the divisione's capacity; minimae
//! and side-stemmed semibreves have fixed lengths; a semibrevis rest is fixed in
//! the binary and ternary senaria/quaternaria/novenaria divisiones. Everything
//! else depends on context and is left as `None` for the family resolvers.

use crate::errors::{MensuralError, Result};
use crate::models::length::{minimae, Rational};
use crate::models::{Divisione, DivisioneKind, MensuralType, NoteToken, Stem};

/// Length of one token when its notation alone determines it
pub fn unchangeable_length(token: &NoteToken, divisione: &Divisione) -> Result<Option<Rational>> {
    let capacity = divisione.minima_per_brevis() as i32;

    let length = match token.mensural_type {
        MensuralType::Maxima => Some(minimae(4 * capacity)),
        MensuralType::Longa => Some(minimae(2 * capacity)),
        MensuralType::Brevis => Some(minimae(capacity)),
        MensuralType::Semibrevis if token.is_rest => match divisione.kind() {
            DivisioneKind::Quaternaria | DivisioneKind::SenariaImperfecta => {
                Some(Rational::new(capacity, 2))
            }
            DivisioneKind::SenariaPerfecta | DivisioneKind::Novenaria => {
                Some(Rational::new(capacity, 3))
            }
            DivisioneKind::Octonaria | DivisioneKind::Duodenaria => None,
        },
        MensuralType::Semibrevis => {
            if token.has_stem(Stem::Side) {
                Some(minimae(3))
            } else {
                None
            }
        }
        MensuralType::Minima => {
            if !token.is_rest && token.has_stem(Stem::Down) {
                return Err(MensuralError::UnsupportedNotation(
                    "dragmas (down-stemmed minimae) are not supported".to_string(),
                ));
            }
            if token.has_stem(Stem::Side) {
                Some(Rational::new(3, 2))
            } else {
                Some(minimae(1))
            }
        }
        MensuralType::Semiminima => None,
    };

    Ok(length)
}

/// Resolve every token's fixed length, in order
pub fn unchangeable_lengths(tokens: &[NoteToken], divisione: &Divisione) -> Result<Vec<Option<Rational>>> {
    tokens
        .iter()
        .map(|token| unchangeable_length(token, divisione))
        .collect()
}
