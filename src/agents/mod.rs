//! LLM agents for solution synthesis, test synthesis, and test review.

pub mod error;
pub mod solution_synthesizer;
pub mod test_synthesizer;
pub mod test_validator;

pub use error::{AgentError, AgentResult};
pub use solution_synthesizer::{SolutionAttempt, SolutionSynthesizer, SolutionSynthesizerConfig};
pub use test_synthesizer::{TestSynthesizer, TestSynthesizerConfig};
pub use test_validator::{parse_verdict, TestValidator, TestValidatorConfig, Verdict};
