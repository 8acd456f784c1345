//! Trecento Mensural Notation Engine
//!
//! Resolves the duration of every note and rest in a brevis-group of Italian
//! Trecento notation. The same written shape lasts a different number of
//! minimae depending on the divisione and on its neighbours; this crate
//! assigns exact lengths so that the group fills its brevis.

pub mod config;
pub mod engine;
pub mod errors;
pub mod models;

// Re-export commonly used types
pub use config::ResolverConfig;
pub use engine::{resolve_batch, resolve_brevis_lengths, BrevisLengthTranslator, Stage};
pub use errors::{ConfigError, MensuralError, Result};
pub use models::*;
