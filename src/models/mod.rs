//! Models module for the mensural engine
//!
//! This module contains the value types the engine reads and produces:
//! divisiones, note tokens, and exact minima lengths.

pub mod divisione;
pub mod length;
pub mod token;

// Re-export commonly used types
pub use divisione::{Divisione, DivisioneFamily, DivisioneKind, MetricFeel, MAX_MINIMA_PER_BREVIS};
pub use length::{LengthAssignment, LengthAssignmentView, Rational};
pub use token::{tokens_from_json, FlagOrientation, MensuralType, NoteToken, Stem};
