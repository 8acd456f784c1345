//! Note tokens consumed by the engine
//!
//! A token is one notated event inside a brevis-group: its coarse mensural
//! type, whether it is a rest, and the stem/flag marks that disambiguate its
//! length. Tokens are produced upstream (a tokenizer, a JSON file, hand-built
//! in tests) and only read by the engine.

use serde::{Deserialize, Serialize};

use crate::errors::{MensuralError, Result};

/// Coarse note-value class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MensuralType {
    Maxima,
    Longa,
    Brevis,
    Semibrevis,
    Minima,
    Semiminima,
}

impl MensuralType {
    /// Whether this type may carry stems at all
    pub fn takes_stems(&self) -> bool {
        matches!(
            self,
            MensuralType::Semibrevis | MensuralType::Minima | MensuralType::Semiminima
        )
    }
}

/// Stem direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stem {
    Up,
    Down,
    Side,
}

/// Flag orientation on a stem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagOrientation {
    Left,
    Right,
}

/// One notated event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteToken {
    pub mensural_type: MensuralType,

    #[serde(default)]
    pub is_rest: bool,

    /// Stems present on the note (kept sorted, no duplicates)
    #[serde(default)]
    pub stems: Vec<Stem>,

    /// Flag per stem; a stem with no entry is unflagged
    #[serde(default)]
    pub flags: Vec<(Stem, FlagOrientation)>,
}

impl NoteToken {
    /// A note of the given type
    ///
    /// Minimae and semiminimae are written with an upward stem, so they get
    /// one by default.
    pub fn note(mensural_type: MensuralType) -> Self {
        let stems = match mensural_type {
            MensuralType::Minima | MensuralType::Semiminima => vec![Stem::Up],
            _ => vec![],
        };
        Self {
            mensural_type,
            is_rest: false,
            stems,
            flags: vec![],
        }
    }

    /// A rest of the given type (rests carry no stems)
    pub fn rest(mensural_type: MensuralType) -> Self {
        Self {
            mensural_type,
            is_rest: true,
            stems: vec![],
            flags: vec![],
        }
    }

    /// Add a stem
    pub fn with_stem(mut self, stem: Stem) -> Self {
        if !self.stems.contains(&stem) {
            self.stems.push(stem);
            self.stems.sort();
        }
        self
    }

    /// Set the flag on a stem, adding the stem if missing
    pub fn with_flag(mut self, stem: Stem, orientation: FlagOrientation) -> Self {
        self = self.with_stem(stem);
        self.flags.retain(|(s, _)| *s != stem);
        self.flags.push((stem, orientation));
        self
    }

    pub fn has_stem(&self, stem: Stem) -> bool {
        self.stems.contains(&stem)
    }

    pub fn flag(&self, stem: Stem) -> Option<FlagOrientation> {
        self.flags
            .iter()
            .find(|(s, _)| *s == stem)
            .map(|(_, orientation)| *orientation)
    }

    pub fn is_semibrevis_note(&self) -> bool {
        self.mensural_type == MensuralType::Semibrevis && !self.is_rest
    }

    pub fn is_minima_note(&self) -> bool {
        self.mensural_type == MensuralType::Minima && !self.is_rest
    }

    /// Down-stemmed semibrevis (the "maior" form)
    pub fn is_downstem_semibrevis(&self) -> bool {
        self.is_semibrevis_note() && self.has_stem(Stem::Down)
    }

    /// Check the stem/flag invariants
    pub fn validate(&self) -> Result<()> {
        if !self.stems.is_empty() && !self.mensural_type.takes_stems() {
            return Err(MensuralError::MalformedTokenSequence(format!(
                "{:?} cannot carry stems",
                self.mensural_type
            )));
        }
        if self.is_rest && !self.stems.is_empty() {
            return Err(MensuralError::MalformedTokenSequence(format!(
                "{:?} rest cannot carry stems",
                self.mensural_type
            )));
        }
        if !self.flags.is_empty()
            && self.mensural_type != MensuralType::Semiminima
            && !self.has_stem(Stem::Down)
        {
            return Err(MensuralError::MalformedTokenSequence(format!(
                "{:?} without a down stem cannot carry flags",
                self.mensural_type
            )));
        }
        if let Some((stem, _)) = self.flags.iter().find(|(s, _)| !self.stems.contains(s)) {
            return Err(MensuralError::MalformedTokenSequence(format!(
                "flag on missing {:?} stem",
                stem
            )));
        }
        Ok(())
    }
}

/// Parse a token sequence from JSON
///
/// Expects an array of token objects, e.g.
/// `[{"mensural_type": "semibrevis", "stems": ["down"]}, {"mensural_type": "minima"}]`.
/// Missing fields default to an unstemmed, unflagged note.
pub fn tokens_from_json(json: &str) -> Result<Vec<NoteToken>> {
    serde_json::from_str(json)
        .map_err(|e| MensuralError::MalformedTokenSequence(format!("invalid token JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stems() {
        assert_eq!(NoteToken::note(MensuralType::Minima).stems, vec![Stem::Up]);
        assert_eq!(NoteToken::note(MensuralType::Semiminima).stems, vec![Stem::Up]);
        assert!(NoteToken::note(MensuralType::Semibrevis).stems.is_empty());
        assert!(NoteToken::rest(MensuralType::Semiminima).stems.is_empty());
    }

    #[test]
    fn test_with_flag_replaces_orientation() {
        let token = NoteToken::note(MensuralType::Semiminima)
            .with_flag(Stem::Up, FlagOrientation::Left)
            .with_flag(Stem::Up, FlagOrientation::Right);
        assert_eq!(token.flag(Stem::Up), Some(FlagOrientation::Right));
        assert_eq!(token.flags.len(), 1);
    }

    #[test]
    fn test_validate_rejects_stem_on_brevis() {
        let token = NoteToken::note(MensuralType::Brevis).with_stem(Stem::Down);
        assert!(matches!(
            token.validate(),
            Err(MensuralError::MalformedTokenSequence(_))
        ));
    }

    #[test]
    fn test_validate_flags() {
        let flagged_minima = NoteToken::note(MensuralType::Minima).with_flag(Stem::Up, FlagOrientation::Left);
        assert!(flagged_minima.validate().is_err());

        let flagged_downstem = NoteToken::note(MensuralType::Semibrevis)
            .with_stem(Stem::Down)
            .with_flag(Stem::Down, FlagOrientation::Right);
        assert!(flagged_downstem.validate().is_ok());
    }

    #[test]
    fn test_tokens_from_json() {
        let json = r#"[
            {"mensural_type": "semibrevis", "stems": ["down"]},
            {"mensural_type": "semiminima", "is_rest": true},
            {"mensural_type": "semiminima", "stems": ["up"], "flags": [["up", "right"]]}
        ]"#;
        let tokens = tokens_from_json(json).unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(tokens[0].is_downstem_semibrevis());
        assert!(tokens[1].is_rest);
        assert_eq!(tokens[2].flag(Stem::Up), Some(FlagOrientation::Right));
    }

    #[test]
    fn test_tokens_from_json_rejects_garbage() {
        assert!(tokens_from_json("{not: json}").is_err());
    }
}
