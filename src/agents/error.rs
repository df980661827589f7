//! Error types for the model-role agents.
//!
//! Expected fallibility is not represented here: a reply without a usable
//! code block is an absent artifact the workflow routes on, not an error.
//! These errors cover provider failures and replies that cannot be read
//! at all.

use thiserror::Error;

/// Errors that can occur during agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Error from the LLM provider.
    #[error("LLM error: {0}")]
    LlmError(String),

    /// Error parsing an LLM response.
    #[error("Failed to parse LLM response: {0}")]
    ResponseParseError(String),
}

impl From<crate::error::LlmError> for AgentError {
    fn from(err: crate::error::LlmError) -> Self {
        AgentError::LlmError(err.to_string())
    }
}

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
