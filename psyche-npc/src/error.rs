//! Dialogue error types.

use psyche_core::PsycheError;
use psyche_llm::LlmError;
use thiserror::Error;

/// Errors that abort a dialogue turn.
#[derive(Debug, Error)]
pub enum DialogueError {
    /// A registry or machine operation failed.
    #[error(transparent)]
    Core(#[from] PsycheError),

    /// The oracle could not produce a reply.
    #[error("oracle unavailable: {0}")]
    OracleUnavailable(#[from] LlmError),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, DialogueError>;
