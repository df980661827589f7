//! Prompt construction for the three model roles.
//!
//! Prompts follow a fixed output protocol: generated code is wrapped
//! between literal marker lines so it can be extracted mechanically, and
//! the validator ends its reply with a fixed verdict line. The protocol
//! constants live here; the role-specific builders live in the submodules.

pub mod generation;
pub mod validation;

pub use generation::{
    build_regeneration_after_failure_prompt, build_regeneration_from_feedback_prompt,
    build_solution_generation_prompt, build_test_generation_prompt, GenerationPrompt,
};
pub use validation::{build_test_validation_prompt, build_test_validation_with_failure_prompt};

/// Marker opening a generated solution block.
pub const CODE_BLOCK_START: &str = "===code-start===";
/// Marker closing a generated solution block.
pub const CODE_BLOCK_END: &str = "===code-end===";
/// Marker opening a generated test block.
pub const TEST_BLOCK_START: &str = "===test-start===";
/// Marker closing a generated test block.
pub const TEST_BLOCK_END: &str = "===test-end===";
/// Verdict line that approves reviewed test code.
pub const VALIDATION_YES: &str = "Validation result: yes";
/// Verdict line that rejects reviewed test code.
pub const VALIDATION_NO: &str = "Validation result: no";
