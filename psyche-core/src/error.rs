//! Error types for the PSYCHE core library.

use thiserror::Error;

/// Top-level error type for all PSYCHE core operations.
#[derive(Error, Debug)]
pub enum PsycheError {
    /// The named emotion is not part of the registry's catalog.
    #[error("Unknown emotion: {0}")]
    UnknownEmotion(String),

    /// The named state is not declared in the decision machine.
    #[error("Unknown state: {0}")]
    UnknownState(String),

    /// A condition referenced a fact that is absent from the snapshot.
    #[error("Missing fact: {0}")]
    MissingFact(String),

    /// A condition node carried an unrecognised type tag.
    #[error("Invalid condition type: {0}")]
    InvalidConditionType(String),

    /// A condition node is missing a field its type requires.
    #[error("Malformed condition '{kind}': missing {field}")]
    MalformedCondition {
        /// The node's type tag.
        kind: String,
        /// The absent field.
        field: &'static str,
    },

    /// Two states in a machine description share a name.
    #[error("Duplicate state: {0}")]
    DuplicateState(String),

    /// A transition targets a state that is never declared.
    #[error("Dangling transition: {from} -> {to}")]
    DanglingTransition {
        /// State owning the edge.
        from: String,
        /// Undeclared target.
        to: String,
    },

    /// A machine description declares no states.
    #[error("Decision machine has no states")]
    EmptyMachine,

    /// An emotion catalog has no entries.
    #[error("Emotion catalog is empty")]
    EmptyCatalog,

    /// Two catalog entries share a name.
    #[error("Duplicate emotion: {0}")]
    DuplicateEmotion(String),

    /// A catalog intensity range has `min > max`.
    #[error("Invalid intensity range for {emotion}: [{min}, {max}]")]
    InvalidRange {
        /// Catalog entry with the bad range.
        emotion: String,
        /// Lower bound.
        min: i32,
        /// Upper bound.
        max: i32,
    },

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, PsycheError>;
