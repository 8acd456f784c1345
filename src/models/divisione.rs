//! Divisione: the six Italian rhythmic-grouping schemes
//!
//! A divisione fixes how many minimae fill one brevis and which metrical
//! family (and therefore which resolution strategy) applies to the notes
//! written inside it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{MensuralError, Result};

/// The six canonical divisiones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DivisioneKind {
    Quaternaria,
    SenariaImperfecta,
    SenariaPerfecta,
    Novenaria,
    Octonaria,
    Duodenaria,
}

/// Resolution strategy shared by one or more divisiones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DivisioneFamily {
    /// `.i.`
    SenariaImperfecta,
    /// `.n.`
    Novenaria,
    /// `.q.` and `.p.`
    QuaternariaSenariaPerfecta,
    /// `.o.` and `.d.`
    OctonariaDuodenaria,
}

/// Metrical grouping used by the beat-strength heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFeel {
    /// Groups of three minimae (`.i.`, `.n.`)
    Triple,
    /// Groups of four minimae (`.q.`, `.o.`, `.d.`)
    Quadruple,
    /// Three groups of two inside six (`.p.`)
    Sesqui,
}

impl DivisioneKind {
    pub const ALL: [DivisioneKind; 6] = [
        DivisioneKind::Quaternaria,
        DivisioneKind::SenariaImperfecta,
        DivisioneKind::SenariaPerfecta,
        DivisioneKind::Novenaria,
        DivisioneKind::Octonaria,
        DivisioneKind::Duodenaria,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DivisioneKind::Quaternaria => "quaternaria",
            DivisioneKind::SenariaImperfecta => "senaria imperfecta",
            DivisioneKind::SenariaPerfecta => "senaria perfecta",
            DivisioneKind::Novenaria => "novenaria",
            DivisioneKind::Octonaria => "octonaria",
            DivisioneKind::Duodenaria => "duodenaria",
        }
    }

    /// Three-character symbol as written in the sources (e.g. `.p.`)
    pub fn symbol(&self) -> &'static str {
        match self {
            DivisioneKind::Quaternaria => ".q.",
            DivisioneKind::SenariaImperfecta => ".i.",
            DivisioneKind::SenariaPerfecta => ".p.",
            DivisioneKind::Novenaria => ".n.",
            DivisioneKind::Octonaria => ".o.",
            DivisioneKind::Duodenaria => ".d.",
        }
    }

    pub fn default_minima_per_brevis(&self) -> u32 {
        match self {
            DivisioneKind::Quaternaria => 4,
            DivisioneKind::SenariaImperfecta => 6,
            DivisioneKind::SenariaPerfecta => 6,
            DivisioneKind::Novenaria => 9,
            DivisioneKind::Octonaria => 8,
            DivisioneKind::Duodenaria => 12,
        }
    }

    /// Modern time signature used when the brevis is rendered as a measure
    pub fn time_string(&self) -> &'static str {
        match self {
            DivisioneKind::Quaternaria => "2/4",
            DivisioneKind::SenariaImperfecta => "6/8",
            DivisioneKind::SenariaPerfecta => "3/4",
            DivisioneKind::Novenaria => "9/8",
            DivisioneKind::Octonaria => "2/4",
            DivisioneKind::Duodenaria => "3/4",
        }
    }

    pub fn family(&self) -> DivisioneFamily {
        match self {
            DivisioneKind::SenariaImperfecta => DivisioneFamily::SenariaImperfecta,
            DivisioneKind::Novenaria => DivisioneFamily::Novenaria,
            DivisioneKind::Quaternaria | DivisioneKind::SenariaPerfecta => {
                DivisioneFamily::QuaternariaSenariaPerfecta
            }
            DivisioneKind::Octonaria | DivisioneKind::Duodenaria => {
                DivisioneFamily::OctonariaDuodenaria
            }
        }
    }

    pub fn metric_feel(&self) -> MetricFeel {
        match self {
            DivisioneKind::SenariaImperfecta | DivisioneKind::Novenaria => MetricFeel::Triple,
            DivisioneKind::SenariaPerfecta => MetricFeel::Sesqui,
            DivisioneKind::Quaternaria | DivisioneKind::Octonaria | DivisioneKind::Duodenaria => {
                MetricFeel::Quadruple
            }
        }
    }

    /// Look up a divisione by name (case-insensitive) or by symbol
    ///
    /// Symbols may be written bare (`p`), half-dotted (`.p`, `p.`) or in the
    /// standard `.p.` form.
    pub fn parse(input: &str) -> Option<DivisioneKind> {
        let trimmed = input.trim();
        let lower = trimmed.to_lowercase();

        if let Some(kind) = Self::ALL.iter().find(|k| k.name() == lower) {
            return Some(*kind);
        }

        if trimmed.chars().count() > 3 {
            return None;
        }
        let letter = lower.trim_matches('.');
        if letter.chars().count() != 1 {
            return None;
        }
        let symbol = format!(".{}.", letter);
        Self::ALL.iter().find(|k| k.symbol() == symbol).copied()
    }
}

/// Largest capacity accepted for one brevis
///
/// Leaves room for a doubled maxima (eight breves) and sums of several such
/// tokens in `i32` rationals.
pub const MAX_MINIMA_PER_BREVIS: u32 = 1 << 16;

/// A divisione in effect for one brevis-group
///
/// `minima_per_brevis` starts at the kind's canonical value; it only changes
/// through [`Divisione::set_minima_per_brevis`] (doubling retry, synthetic
/// sub-problems). A deserialized value bypasses that setter, so
/// [`Divisione::validate`] runs again before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divisione {
    kind: DivisioneKind,
    minima_per_brevis: u32,
}

impl Divisione {
    /// Construct from a name (`"novenaria"`) or a 1-3 character symbol (`"n"`, `".n."`)
    pub fn new(name_or_symbol: &str) -> Result<Self> {
        DivisioneKind::parse(name_or_symbol)
            .map(Self::from_kind)
            .ok_or_else(|| MensuralError::InvalidDivisione(name_or_symbol.to_string()))
    }

    pub fn from_kind(kind: DivisioneKind) -> Self {
        Self {
            kind,
            minima_per_brevis: kind.default_minima_per_brevis(),
        }
    }

    /// All six divisiones with their canonical capacities
    pub fn all() -> Vec<Divisione> {
        DivisioneKind::ALL.iter().map(|k| Self::from_kind(*k)).collect()
    }

    pub fn kind(&self) -> DivisioneKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn standard_symbol(&self) -> &'static str {
        self.kind.symbol()
    }

    pub fn time_string(&self) -> &'static str {
        self.kind.time_string()
    }

    pub fn family(&self) -> DivisioneFamily {
        self.kind.family()
    }

    pub fn metric_feel(&self) -> MetricFeel {
        self.kind.metric_feel()
    }

    pub fn minima_per_brevis(&self) -> u32 {
        self.minima_per_brevis
    }

    /// Override the capacity
    ///
    /// Zero is rejected: every brevis holds at least one minima. So is
    /// anything above [`MAX_MINIMA_PER_BREVIS`].
    pub fn set_minima_per_brevis(&mut self, minima: u32) -> Result<()> {
        check_capacity(self.kind, minima)?;
        self.minima_per_brevis = minima;
        Ok(())
    }

    /// Check the capacity invariant
    pub fn validate(&self) -> Result<()> {
        check_capacity(self.kind, self.minima_per_brevis)
    }

    /// Copy of this divisione with the capacity doubled
    ///
    /// A validated divisione doubles to at most twice
    /// [`MAX_MINIMA_PER_BREVIS`], which still fits the length arithmetic.
    pub fn doubled(&self) -> Self {
        Self {
            kind: self.kind,
            minima_per_brevis: self.minima_per_brevis.saturating_mul(2),
        }
    }
}

fn check_capacity(kind: DivisioneKind, minima: u32) -> Result<()> {
    if minima == 0 {
        return Err(MensuralError::InvalidDivisione(format!(
            "{} with zero minima per brevis",
            kind.symbol()
        )));
    }
    if minima > MAX_MINIMA_PER_BREVIS {
        return Err(MensuralError::InvalidDivisione(format!(
            "{} with {} minima per brevis (at most {})",
            kind.symbol(),
            minima,
            MAX_MINIMA_PER_BREVIS
        )));
    }
    Ok(())
}

impl FromStr for Divisione {
    type Err = MensuralError;

    fn from_str(s: &str) -> Result<Self> {
        Divisione::new(s)
    }
}

impl fmt::Display for Divisione {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind.name(), self.kind.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_from_name_and_symbol() {
        let by_name = Divisione::new("Senaria Perfecta").unwrap();
        let by_symbol = Divisione::new(".p.").unwrap();
        assert_eq!(by_name, by_symbol);
        assert_eq!(by_name.minima_per_brevis(), 6);
        assert_eq!(by_name.time_string(), "3/4");
    }

    #[test]
    fn test_bare_letter_normalized() {
        for raw in ["n", ".n", "n.", ".n."] {
            let div = Divisione::new(raw).unwrap();
            assert_eq!(div.standard_symbol(), ".n.");
            assert_eq!(div.minima_per_brevis(), 9);
        }
    }

    #[test]
    fn test_invalid_divisione() {
        for raw in ["x", ".x.", "septenaria", "", "..n.."] {
            assert!(
                matches!(Divisione::new(raw), Err(MensuralError::InvalidDivisione(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_senarie_share_capacity_but_not_family() {
        let i = Divisione::new(".i.").unwrap();
        let p = Divisione::new(".p.").unwrap();
        assert_eq!(i.minima_per_brevis(), p.minima_per_brevis());
        assert_ne!(i.family(), p.family());
        assert_ne!(i.metric_feel(), p.metric_feel());
    }

    #[test]
    fn test_capacities() {
        let caps: Vec<u32> = Divisione::all().iter().map(|d| d.minima_per_brevis()).collect();
        assert_eq!(caps, vec![4, 6, 6, 9, 8, 12]);
    }

    #[test]
    fn test_set_minima_per_brevis() {
        let mut div = Divisione::new(".q.").unwrap();
        div.set_minima_per_brevis(8).unwrap();
        assert_eq!(div.minima_per_brevis(), 8);
        assert_eq!(div.standard_symbol(), ".q.");
        assert!(div.set_minima_per_brevis(0).is_err());
        assert_eq!(div.doubled().minima_per_brevis(), 16);
    }

    #[test]
    fn test_capacity_upper_bound() {
        let mut div = Divisione::new(".d.").unwrap();
        assert!(div.set_minima_per_brevis(MAX_MINIMA_PER_BREVIS).is_ok());
        assert!(matches!(
            div.set_minima_per_brevis(MAX_MINIMA_PER_BREVIS + 1),
            Err(MensuralError::InvalidDivisione(_))
        ));
        assert_eq!(div.minima_per_brevis(), MAX_MINIMA_PER_BREVIS);
    }

    #[test]
    fn test_deserialized_capacity_validated() {
        let zero: Divisione = serde_json::from_str(r#"{"kind":"Quaternaria","minima_per_brevis":0}"#).unwrap();
        assert!(matches!(zero.validate(), Err(MensuralError::InvalidDivisione(_))));

        let huge: Divisione =
            serde_json::from_str(r#"{"kind":"Octonaria","minima_per_brevis":4000000000}"#).unwrap();
        assert!(huge.validate().is_err());

        let ok: Divisione = serde_json::from_str(r#"{"kind":"Novenaria","minima_per_brevis":9}"#).unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(ok, Divisione::new(".n.").unwrap());
    }
}
