//! codeloop: self-correcting code synthesis against an execution sandbox.
//!
//! An LLM writes a test suite for a coding problem, a second pass reviews
//! it, a third writes the candidate solution, and an external sandbox runs
//! the candidate against both the problem's example tests and the AI
//! suite. Failures feed back into regeneration until the candidate passes
//! or the attempt caps are spent.

// Core modules
pub mod agents;
pub mod cli;
pub mod error;
pub mod execution;
pub mod llm;
pub mod problem;
pub mod prompts;
pub mod session;
pub mod utils;
pub mod workflow;

// Re-export commonly used error types
pub use error::{LlmError, ProblemError};
