//! Error types for codeloop operations.
//!
//! Defines error types for the subsystems that surface typed failures:
//! - Problem specification loading (the only error allowed to abort a session)
//! - LLM API interactions
//!
//! Sandbox failures are deliberately not represented here: the execution
//! client folds every failure mode into an `ExecutionResult` so the workflow
//! can route on it instead of aborting.

use thiserror::Error;

/// Errors that can occur while loading a problem specification.
#[derive(Debug, Error)]
pub enum ProblemError {
    #[error("Problem path '{0}' is not a directory")]
    NotADirectory(String),

    #[error("Problem file '{0}' not found")]
    MissingFile(String),

    #[error("Problem file '{file}' is {size} bytes, exceeding the {limit}-byte limit")]
    FieldTooLarge {
        file: String,
        size: usize,
        limit: usize,
    },

    #[error("Problem field '{0}' is empty")]
    EmptyField(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: OPENAI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },
}
