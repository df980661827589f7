//! Test Synthesizer Agent: writes the AI test suite for a problem.
//!
//! Given the four-field problem specification, this agent asks its model
//! for an assert-based test snippet wrapped in the test-marker protocol
//! and extracts the block. A reply without a usable block is an absent
//! artifact, not an error: the workflow routes on it and asks again.

use std::sync::Arc;

use super::error::{AgentError, AgentResult};
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::problem::ProblemSpecification;
use crate::prompts::{build_test_generation_prompt, TEST_BLOCK_END, TEST_BLOCK_START};
use crate::utils::extract_delimited;

/// Configuration for the test synthesizer agent.
#[derive(Debug, Clone)]
pub struct TestSynthesizerConfig {
    /// Model identifier; empty means the provider's default.
    pub model: String,
    /// Temperature for LLM generation.
    pub temperature: f64,
    /// Maximum tokens for LLM response.
    pub max_tokens: u32,
}

impl Default for TestSynthesizerConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.4,
            max_tokens: 2000,
        }
    }
}

impl TestSynthesizerConfig {
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

/// Agent that writes the AI test suite for a problem.
pub struct TestSynthesizer {
    llm_client: Arc<dyn LlmProvider>,
    config: TestSynthesizerConfig,
}

impl std::fmt::Debug for TestSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestSynthesizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TestSynthesizer {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "test_synthesizer";

    /// Creates a new test synthesizer agent.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: TestSynthesizerConfig) -> Self {
        Self { llm_client, config }
    }

    /// Creates a new test synthesizer with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, TestSynthesizerConfig::default())
    }

    /// Ask the model for a test suite and extract the delimited block.
    ///
    /// Returns `Ok(None)` when the reply carries no extractable test code.
    pub async fn synthesize(
        &self,
        problem: &ProblemSpecification,
    ) -> AgentResult<Option<String>> {
        let prompt = build_test_generation_prompt(problem);

        let request = GenerationRequest::new(
            self.config.model.clone(),
            vec![Message::system(prompt.system), Message::user(prompt.user)],
        )
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens);

        let response = self.llm_client.generate(request).await?;
        let content = response
            .first_content()
            .ok_or_else(|| AgentError::ResponseParseError("Empty LLM response".to_string()))?;

        let test_code = extract_delimited(content, TEST_BLOCK_START, TEST_BLOCK_END);
        if test_code.is_none() {
            tracing::warn!(
                agent = Self::AGENT_NAME,
                "reply carried no extractable test block"
            );
        }

        Ok(test_code)
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
            "Find the length of the longest substring without repeating characters.",
            "Input: s = \"abcabcbb\"\nOutput: 3",
            "class Solution:\n    def lengthOfLongestSubstring(self, s: str) -> int:",
            "assert Solution().lengthOfLongestSubstring(\"abcabcbb\") == 3",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn extracts_the_test_block_from_the_reply() {
        let reply = "Here are some tests.\n\n===test-start===\nassert Solution().lengthOfLongestSubstring(\"pwwkew\") == 3\n===test-end===\n\nDone.";
        let agent = TestSynthesizer::with_defaults(Arc::new(MockLlmProvider::new(reply)));

        let tests = agent.synthesize(&sample_problem()).await.unwrap().unwrap();
        assert!(tests.contains("pwwkew"));
        assert!(!tests.contains("==="));
    }

    #[tokio::test]
    async fn reply_without_markers_is_an_absent_artifact() {
        let agent = TestSynthesizer::with_defaults(Arc::new(MockLlmProvider::new(
            "I'd rather describe the tests in prose.",
        )));

        let tests = agent.synthesize(&sample_problem()).await.unwrap();
        assert!(tests.is_none());
    }

    #[test]
    fn config_builders_clamp_temperature() {
        let config = TestSynthesizerConfig::default()
            .with_temperature(9.0)
            .with_max_tokens(512)
            .with_model("gpt-4o");
        assert_eq!(config.temperature, 2.0);
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.model, "gpt-4o");
    }
}
