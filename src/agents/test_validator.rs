//! Test Validator Agent: judges whether an AI test suite is trustworthy.
//!
//! The verdict comes from the final non-empty line of the model's reply,
//! which the prompt instructs it to end with a literal yes/no marker. An
//! ambiguous reply approves with a warning so a flaky judge cannot wedge
//! the workflow.

use std::sync::Arc;

use super::error::{AgentError, AgentResult};
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::problem::ProblemSpecification;
use crate::prompts::{
    build_test_validation_prompt, build_test_validation_with_failure_prompt, VALIDATION_NO,
    VALIDATION_YES,
};
use crate::session::ExecutionResult;

/// Outcome parsed from a validation reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The final line says the tests are valid.
    Approved,
    /// The final line says the tests are flawed.
    Rejected,
    /// No recognizable verdict line was found.
    Ambiguous,
}

/// Parse a validation reply by scanning for its final non-empty line.
pub fn parse_verdict(content: &str) -> Verdict {
    let last_line = content
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty());

    match last_line {
        Some(line) if line.contains(VALIDATION_YES) => Verdict::Approved,
        Some(line) if line.contains(VALIDATION_NO) => Verdict::Rejected,
        _ => Verdict::Ambiguous,
    }
}

/// Configuration for the test validator agent.
#[derive(Debug, Clone)]
pub struct TestValidatorConfig {
    /// Model identifier; empty means the provider's default.
    pub model: String,
    /// Temperature for LLM generation.
    pub temperature: f64,
    /// Maximum tokens for LLM response.
    pub max_tokens: u32,
}

impl Default for TestValidatorConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.1,
            max_tokens: 1500,
        }
    }
}

impl TestValidatorConfig {
    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the temperature for LLM generation.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Sets the maximum tokens for LLM response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Agent that reviews an AI test suite against the problem statement.
pub struct TestValidator {
    llm_client: Arc<dyn LlmProvider>,
    config: TestValidatorConfig,
}

impl std::fmt::Debug for TestValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestValidator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TestValidator {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "test_validator";

    /// Creates a new test validator agent.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: TestValidatorConfig) -> Self {
        Self { llm_client, config }
    }

    /// Creates a new test validator with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, TestValidatorConfig::default())
    }

    /// Review the test suite and return whether it should be trusted.
    ///
    /// When the tests already ran and failed, `prior_ai_failure` switches
    /// the prompt into its post-mortem form so the judge sees the combined
    /// source and the stderr it produced.
    pub async fn validate(
        &self,
        problem: &ProblemSpecification,
        test_code: &str,
        prior_ai_failure: Option<&ExecutionResult>,
    ) -> AgentResult<bool> {
        let prompt = match prior_ai_failure {
            Some(failure) => build_test_validation_with_failure_prompt(problem, failure),
            None => build_test_validation_prompt(problem, test_code),
        };

        let request = GenerationRequest::new(
            self.config.model.clone(),
            vec![Message::user(prompt)],
        )
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens);

        let response = self.llm_client.generate(request).await?;
        let content = response
            .first_content()
            .ok_or_else(|| AgentError::ResponseParseError("Empty LLM response".to_string()))?;

        match parse_verdict(content) {
            Verdict::Approved => Ok(true),
            Verdict::Rejected => Ok(false),
            Verdict::Ambiguous => {
                // Only an explicit "no" rejects.
                tracing::warn!(
                    agent = Self::AGENT_NAME,
                    "no verdict line in reply, approving"
                );
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{Choice, GenerationResponse, Usage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockLlmProvider {
        response: Mutex<String>,
    }

    impl MockLlmProvider {
        fn new(response: impl Into<String>) -> Self {
            Self {
                response: Mutex::new(response.into()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            let content = self.response.lock().expect("lock not poisoned").clone();
            Ok(GenerationResponse {
                id: "mock-id".to_string(),
                model: "mock-model".to_string(),
                choices: vec![Choice {
                    index: 0,
                    message: Message::assistant(content),
                    finish_reason: "stop".to_string(),
                }],
                usage: Usage {
                    prompt_tokens: 200,
                    completion_tokens: 300,
                    total_tokens: 500,
                },
            })
        }
    }

    fn sample_problem() -> ProblemSpecification {
        ProblemSpecification::new(
            "Return the sum of two integers.",
            "Input: a = 1, b = 2\nOutput: 3",
            "class Solution:\n    def add(self, a: int, b: int) -> int:",
            "assert Solution().add(1, 2) == 3",
        )
        .unwrap()
    }

    #[test]
    fn verdict_comes_from_the_final_non_empty_line() {
        let reply = "The asserts bind to the interface.\n\nValidation result: yes\n\n";
        assert_eq!(parse_verdict(reply), Verdict::Approved);

        let reply = "Validation result: yes\nOn reflection the edge case is wrong.\nValidation result: no";
        assert_eq!(parse_verdict(reply), Verdict::Rejected);
    }

    #[test]
    fn reply_without_a_verdict_line_is_ambiguous() {
        assert_eq!(parse_verdict("Looks plausible to me."), Verdict::Ambiguous);
        assert_eq!(parse_verdict(""), Verdict::Ambiguous);
        assert_eq!(parse_verdict("\n\n  \n"), Verdict::Ambiguous);
    }

    #[tokio::test]
    async fn explicit_no_rejects_the_tests() {
        let agent = TestValidator::with_defaults(Arc::new(MockLlmProvider::new(
            "The expected value in the second assert is wrong.\nValidation result: no",
        )));

        let verdict = agent
            .validate(&sample_problem(), "assert Solution().add(1, 2) == 4", None)
            .await
            .unwrap();
        assert!(!verdict);
    }

    #[tokio::test]
    async fn ambiguous_reply_approves() {
        let agent = TestValidator::with_defaults(Arc::new(MockLlmProvider::new(
            "I cannot commit to a verdict here.",
        )));

        let verdict = agent
            .validate(&sample_problem(), "assert Solution().add(1, 2) == 3", None)
            .await
            .unwrap();
        assert!(verdict);
    }

    #[tokio::test]
    async fn failure_mode_is_selected_by_the_prior_execution() {
        let agent = TestValidator::with_defaults(Arc::new(MockLlmProvider::new(
            "The QA block asserts 4 for add(1, 2).\nValidation result: no",
        )));
        let failure = ExecutionResult::completed(
            "# Your solution:\n...",
            "",
            "AssertionError",
            1,
        );

        let verdict = agent
            .validate(
                &sample_problem(),
                "assert Solution().add(1, 2) == 4",
                Some(&failure),
            )
            .await
            .unwrap();
        assert!(!verdict);
    }
}
