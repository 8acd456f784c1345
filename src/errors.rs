//! Error types for brevis-length translation
//!
//! Defines the error hierarchy for resolution failures: configuration errors
//! (bad divisione), unsupported notation, convergence failures, and malformed
//! token sequences that indicate a bug upstream of the engine.

use thiserror::Error;

/// Top-level engine error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MensuralError {
    /// Name or symbol does not match one of the six divisiones
    #[error("Invalid divisione: {0}")]
    InvalidDivisione(String),

    /// Notation the engine does not resolve (e.g. dragmas)
    #[error("Unsupported notation: {0}")]
    UnsupportedNotation(String),

    /// No assignment reaches the divisione's capacity, even after the doubling retry
    #[error(
        "Inconsistent divisione {symbol}: best assignment totals {resolved} of {capacity} minima{}",
        doubling_suffix(.doubled)
    )]
    InconsistentDivisione {
        symbol: String,
        resolved: f64,
        capacity: u32,
        doubled: bool,
    },

    /// Token sequence cannot be processed (empty, out-of-range index, broken invariants)
    #[error("Malformed token sequence: {0}")]
    MalformedTokenSequence(String),
}

fn doubling_suffix(doubled: &bool) -> &'static str {
    if *doubled {
        " (after doubling)"
    } else {
        ""
    }
}

/// Configuration loading errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(String),

    #[error("Invalid YAML config: {0}")]
    Yaml(String),

    #[error("Invalid JSON config: {0}")]
    Json(String),

    /// Parsed fine but a value is out of range
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, MensuralError>;
