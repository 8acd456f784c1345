//! Exact lengths in minimae and the engine's output
//!
//! Lengths are kept as exact rationals (a triplet semiminima is exactly 2/3
//! of a minima) and only converted to floating point at the output boundary.

use num_rational::Rational32;
use serde::{Deserialize, Serialize};

/// Length in minimae
pub type Rational = Rational32;

/// Integer length in minimae
pub fn minimae(n: i32) -> Rational {
    Rational::from_integer(n)
}

pub fn to_f64(value: Rational) -> f64 {
    *value.numer() as f64 / *value.denom() as f64
}

/// Sum of the known entries of a partial assignment
pub fn known_total(lengths: &[Option<Rational>]) -> Rational {
    lengths
        .iter()
        .flatten()
        .fold(Rational::from_integer(0), |acc, l| acc + *l)
}

pub fn total(lengths: &[Rational]) -> Rational {
    lengths
        .iter()
        .fold(Rational::from_integer(0), |acc, l| acc + *l)
}

/// Whether two lengths agree within a floating tolerance
pub fn within_tolerance(a: Rational, b: Rational, tolerance: f64) -> bool {
    (to_f64(a) - to_f64(b)).abs() <= tolerance
}

/// Resolved lengths for one brevis-group, index-aligned with the input tokens
#[derive(Debug, Clone, PartialEq)]
pub struct LengthAssignment {
    lengths: Vec<Rational>,
    minima_per_brevis: u32,
    doubled: bool,
}

impl LengthAssignment {
    pub(crate) fn new(lengths: Vec<Rational>, minima_per_brevis: u32, doubled: bool) -> Self {
        Self {
            lengths,
            minima_per_brevis,
            doubled,
        }
    }

    /// Exact lengths
    pub fn lengths(&self) -> &[Rational] {
        &self.lengths
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.lengths.iter().map(|l| to_f64(*l)).collect()
    }

    pub fn total(&self) -> Rational {
        total(&self.lengths)
    }

    /// Capacity the lengths were resolved against (twice the divisione's if doubled)
    pub fn minima_per_brevis(&self) -> u32 {
        self.minima_per_brevis
    }

    /// True when the doubling retry produced this assignment
    pub fn was_doubled(&self) -> bool {
        self.doubled
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    pub fn into_lengths(self) -> Vec<Rational> {
        self.lengths
    }
}

/// Serializable view for downstream measure builders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthAssignmentView {
    pub lengths: Vec<f64>,
    pub minima_per_brevis: u32,
    pub doubled: bool,
}

impl From<&LengthAssignment> for LengthAssignmentView {
    fn from(assignment: &LengthAssignment) -> Self {
        Self {
            lengths: assignment.to_f64_vec(),
            minima_per_brevis: assignment.minima_per_brevis,
            doubled: assignment.doubled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triplets_sum_exactly() {
        let third = Rational::new(2, 3);
        assert_eq!(total(&[third, third, third]), minimae(2));
    }

    #[test]
    fn test_known_total_skips_unknown() {
        let partial = vec![Some(minimae(1)), None, Some(Rational::new(3, 2))];
        assert_eq!(known_total(&partial), Rational::new(5, 2));
    }

    #[test]
    fn test_within_tolerance() {
        assert!(within_tolerance(Rational::new(2, 3), Rational::new(6667, 10000), 1e-4));
        assert!(!within_tolerance(minimae(4), Rational::new(39, 10), 1e-4));
    }

    #[test]
    fn test_view_serializes() {
        let assignment = LengthAssignment::new(vec![minimae(2), Rational::new(1, 2)], 6, false);
        let view = LengthAssignmentView::from(&assignment);
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"lengths\":[2.0,0.5]"));
    }
}
