//! Solution Synthesizer Agent: writes and rewrites the candidate solution.
//!
//! The first request for a session is a fresh system/user pair; every
//! later request replays the full solution conversation and adds a single
//! feedback message describing the failing run or the human comment. The
//! returned attempt carries exactly the messages the caller must append
//! to the log, so history grows even when extraction fails.

use std::sync::Arc;

use super::error::{AgentError, AgentResult};
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::problem::ProblemSpecification;
use crate::prompts::{
    build_regeneration_after_failure_prompt, build_regeneration_from_feedback_prompt,
    build_solution_generation_prompt, CODE_BLOCK_END, CODE_BLOCK_START,
};
use crate::session::{ConversationLog, ExecutionResult};
use crate::utils::extract_delimited;

/// One round of solution synthesis.
#[derive(Debug, Clone)]
pub struct SolutionAttempt {
    /// The new exchange to append to the conversation log: the prompt
    /// messages sent this round plus the assistant's reply.
    pub messages: Vec<Message>,
    /// Extracted solution code, absent when the reply had no usable block.
    pub main_code: Option<String>,
}

/// Configuration for the solution synthesizer agent.
#[derive(Debug, Clone)]
pub struct SolutionSynthesizerConfig {
    /// Model identifier; empty means the provider's default.
    pub model: String,
    /// Temperature for LLM generation.
    pub temperature: f64,
    /// Maximum tokens for LLM response.
    pub max_tokens: u32,
}

impl Default for SolutionSynthesizerConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.2,
            max_tokens: 3000,
        }
    }
}

impl SolutionSynthesizerConfig {
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

/// Agent that writes the candidate solution for a problem.
pub struct SolutionSynthesizer {
    llm_client: Arc<dyn LlmProvider>,
    config: SolutionSynthesizerConfig,
}

impl std::fmt::Debug for SolutionSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolutionSynthesizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SolutionSynthesizer {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "solution_synthesizer";

    /// Creates a new solution synthesizer agent.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: SolutionSynthesizerConfig) -> Self {
        Self { llm_client, config }
    }

    /// Creates a new solution synthesizer with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, SolutionSynthesizerConfig::default())
    }

    /// Produce the next solution attempt.
    ///
    /// Regeneration requires both an execution result to react to and an
    /// existing conversation to extend; otherwise the round starts over
    /// with a fresh prompt pair. Regenerating the tests clears the stale
    /// result upstream, which is what resets this agent to a fresh start.
    pub async fn synthesize(
        &self,
        problem: &ProblemSpecification,
        conversation: &ConversationLog,
        prior_result: Option<&ExecutionResult>,
        human_feedback: Option<&str>,
    ) -> AgentResult<SolutionAttempt> {
        let prior = prior_result.filter(|_| !conversation.is_empty());

        let (request_messages, mut new_messages) = match prior {
            Some(last_run) => {
                let feedback = if last_run.has_error {
                    build_regeneration_after_failure_prompt(last_run, human_feedback)
                } else {
                    build_regeneration_from_feedback_prompt(human_feedback)
                };
                let feedback_message = Message::user(feedback);
                let mut request: Vec<Message> = conversation.entries().to_vec();
                request.push(feedback_message.clone());
                (request, vec![feedback_message])
            }
            None => {
                let prompt = build_solution_generation_prompt(problem);
                let fresh = vec![Message::system(prompt.system), Message::user(prompt.user)];
                (fresh.clone(), fresh)
            }
        };

        let request = GenerationRequest::new(self.config.model.clone(), request_messages)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let response = self.llm_client.generate(request).await?;
        let content = response
            .first_content()
            .ok_or_else(|| AgentError::ResponseParseError("Empty LLM response".to_string()))?
            .to_string();

        let main_code = extract_delimited(&content, CODE_BLOCK_START, CODE_BLOCK_END);
        if main_code.is_none() {
            tracing::warn!(
                agent = Self::AGENT_NAME,
                "reply carried no extractable code block"
            );
        }
        new_messages.push(Message::assistant(content));

        Ok(SolutionAttempt {
            messages: new_messages,
            main_code,
        })
    }
}
