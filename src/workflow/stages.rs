//! The five workflow stages.
//!
//! A stage is a pure step over the session: it reads a state snapshot and
//! returns a partial update for the runtime to merge. Stages never abort
//! the session. Agent and sandbox failures are folded into the update as
//! absent artifacts or failing results, and the routing table decides what
//! happens next.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agents::{SolutionSynthesizer, TestSynthesizer, TestValidator};
use crate::execution::{combine_sources, CodeExecutor};
use crate::session::{FieldUpdate, SessionState, StateUpdate, TestOrigin};

/// Label identifying a workflow stage, including the two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageLabel {
    /// Synthesize the AI test suite.
    GenerateTests,
    /// Review the AI test suite.
    ValidateTests,
    /// Synthesize the candidate solution.
    GenerateSolution,
    /// Run the candidate against the example tests.
    TestWithExamples,
    /// Run the candidate against the AI tests.
    TestWithAi,
    /// Terminal: the candidate passed both suites.
    Accepted,
    /// Terminal: an attempt cap was reached before convergence.
    GaveUp,
}

impl StageLabel {
    /// Whether the label names a terminal state rather than a runnable
    /// stage.
    pub fn is_terminal(self) -> bool {
        matches!(self, StageLabel::Accepted | StageLabel::GaveUp)
    }
}

impl std::fmt::Display for StageLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageLabel::GenerateTests => write!(f, "generate_tests"),
            StageLabel::ValidateTests => write!(f, "validate_tests"),
            StageLabel::GenerateSolution => write!(f, "generate_solution"),
            StageLabel::TestWithExamples => write!(f, "test_with_examples"),
            StageLabel::TestWithAi => write!(f, "test_with_ai"),
            StageLabel::Accepted => write!(f, "accepted"),
            StageLabel::GaveUp => write!(f, "gave_up"),
        }
    }
}

/// A runnable workflow stage.
#[async_trait]
pub trait SessionStage: Send + Sync {
    /// The label this stage runs under.
    fn label(&self) -> StageLabel;

    /// Run the stage against a snapshot of the session.
    async fn run(&self, state: &SessionState) -> StateUpdate;
}

/// Stage that asks the test synthesizer for a fresh AI suite.
pub struct GenerateTestsStage {
    synthesizer: TestSynthesizer,
}

impl GenerateTestsStage {
    pub fn new(synthesizer: TestSynthesizer) -> Self {
        Self { synthesizer }
    }
}

#[async_trait]
impl SessionStage for GenerateTestsStage {
    fn label(&self) -> StageLabel {
        StageLabel::GenerateTests
    }

    async fn run(&self, state: &SessionState) -> StateUpdate {
        let tests = match self.synthesizer.synthesize(&state.problem).await {
            Ok(tests) => tests,
            Err(error) => {
                tracing::warn!(stage = %self.label(), %error, "test synthesis failed");
                None
            }
        };

        StateUpdate {
            ai_test_code: FieldUpdate::from(tests),
            is_ai_test_code_good: FieldUpdate::Set(false),
            // The previous run, if any, exercised the old suite.
            last_execution_result: FieldUpdate::Clear,
            last_execution_origin: FieldUpdate::Clear,
            test_syntheses: FieldUpdate::Set(state.test_syntheses + 1),
            ..StateUpdate::default()
        }
    }
}

/// Stage that has the validator review the current AI suite.
pub struct ValidateTestsStage {
    validator: TestValidator,
}

impl ValidateTestsStage {
    pub fn new(validator: TestValidator) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl SessionStage for ValidateTestsStage {
    fn label(&self) -> StageLabel {
        StageLabel::ValidateTests
    }

    async fn run(&self, state: &SessionState) -> StateUpdate {
        let Some(test_code) = state.ai_test_code.as_deref() else {
            // Nothing to review; route back for another synthesis.
            return StateUpdate {
                is_ai_test_code_good: FieldUpdate::Set(false),
                ..StateUpdate::default()
            };
        };

        let verdict = match self
            .validator
            .validate(&state.problem, test_code, state.failing_ai_execution())
            .await
        {
            Ok(verdict) => verdict,
            Err(error) => {
                tracing::warn!(stage = %self.label(), %error, "review failed, keeping the suite");
                true
            }
        };

        StateUpdate {
            is_ai_test_code_good: FieldUpdate::Set(verdict),
            ..StateUpdate::default()
        }
    }
}

/// Stage that asks the solution synthesizer for the next candidate.
pub struct GenerateSolutionStage {
    synthesizer: SolutionSynthesizer,
}

impl GenerateSolutionStage {
    pub fn new(synthesizer: SolutionSynthesizer) -> Self {
        Self { synthesizer }
    }
}

#[async_trait]
impl SessionStage for GenerateSolutionStage {
    fn label(&self) -> StageLabel {
        StageLabel::GenerateSolution
    }

    async fn run(&self, state: &SessionState) -> StateUpdate {
        let attempt = match self
            .synthesizer
            .synthesize(
                &state.problem,
                &state.conversation,
                state.last_execution_result.as_ref(),
                state.human_feedback.as_deref(),
            )
            .await
        {
            Ok(attempt) => attempt,
            Err(error) => {
                tracing::warn!(stage = %self.label(), %error, "solution synthesis failed");
                // The feedback was never delivered, so it stays pending.
                return StateUpdate {
                    main_code: FieldUpdate::Clear,
                    is_main_code_good: FieldUpdate::Set(false),
                    solution_syntheses: FieldUpdate::Set(state.solution_syntheses + 1),
                    ..StateUpdate::default()
                };
            }
        };

        StateUpdate {
            main_code: FieldUpdate::from(attempt.main_code),
            is_main_code_good: FieldUpdate::Set(false),
            // The comment rode along in this round's prompt.
            human_feedback: FieldUpdate::Clear,
            solution_syntheses: FieldUpdate::Set(state.solution_syntheses + 1),
            conversation_append: attempt.messages,
            ..StateUpdate::default()
        }
    }
}

/// Stage that runs the candidate against the human-written example tests.
pub struct TestWithExamplesStage {
    executor: Arc<dyn CodeExecutor>,
}

impl TestWithExamplesStage {
    pub fn new(executor: Arc<dyn CodeExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl SessionStage for TestWithExamplesStage {
    fn label(&self) -> StageLabel {
        StageLabel::TestWithExamples
    }

    async fn run(&self, state: &SessionState) -> StateUpdate {
        let Some(main_code) = state.main_code.as_deref() else {
            return StateUpdate {
                is_main_code_good: FieldUpdate::Set(false),
                ..StateUpdate::default()
            };
        };

        let payload = combine_sources(main_code, &state.problem.example_test_code);
        let result = self.executor.execute(&payload).await;
        tracing::info!(
            stage = %self.label(),
            passed = !result.has_error,
            "example suite finished"
        );

        StateUpdate {
            is_main_code_good: FieldUpdate::Set(!result.has_error),
            last_execution_result: FieldUpdate::Set(result),
            last_execution_origin: FieldUpdate::Set(TestOrigin::Examples),
            ..StateUpdate::default()
        }
    }
}

/// Stage that runs the candidate against the AI-written tests.
pub struct TestWithAiStage {
    executor: Arc<dyn CodeExecutor>,
}

impl TestWithAiStage {
    pub fn new(executor: Arc<dyn CodeExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl SessionStage for TestWithAiStage {
    fn label(&self) -> StageLabel {
        StageLabel::TestWithAi
    }

    async fn run(&self, state: &SessionState) -> StateUpdate {
        let (Some(main_code), Some(ai_test_code)) =
            (state.main_code.as_deref(), state.ai_test_code.as_deref())
        else {
            return StateUpdate {
                is_main_code_good: FieldUpdate::Set(false),
                ..StateUpdate::default()
            };
        };

        let payload = combine_sources(main_code, ai_test_code);
        let result = self.executor.execute(&payload).await;
        tracing::info!(
            stage = %self.label(),
            passed = !result.has_error,
            "ai suite finished"
        );

        StateUpdate {
            is_main_code_good: FieldUpdate::Set(!result.has_error),
            last_execution_result: FieldUpdate::Set(result),
            last_execution_origin: FieldUpdate::Set(TestOrigin::Ai),
            ai_test_rounds: FieldUpdate::Set(state.ai_test_rounds + 1),
            ..StateUpdate::default()
        }
    }
}
