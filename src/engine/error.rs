// src/engine/error.rs

use thiserror::Error;

/// Errors raised by the mastery and twin engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Input outside the domain of an engine function (bad subject key,
    /// malformed question bank, mastery outside 0..=100).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Every candidate drawn for a classroom code was already taken.
    #[error("classroom code space exhausted after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },
}
