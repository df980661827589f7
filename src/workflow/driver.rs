//! Workflow driver: runs stages and merges their updates until a terminal
//! label is reached.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::routing::{AttemptLimits, RoutingPolicy};
use super::stages::{
    GenerateSolutionStage, GenerateTestsStage, SessionStage, StageLabel, TestWithAiStage,
    TestWithExamplesStage, ValidateTestsStage,
};
use crate::agents::{
    SolutionSynthesizer, SolutionSynthesizerConfig, TestSynthesizer, TestSynthesizerConfig,
    TestValidator, TestValidatorConfig,
};
use crate::execution::CodeExecutor;
use crate::llm::LlmProvider;
use crate::problem::ProblemSpecification;
use crate::session::SessionState;

/// Tunables for a workflow instance.
#[derive(Debug, Clone, Default)]
pub struct WorkflowConfig {
    /// Caps on the retry loops.
    pub limits: AttemptLimits,
    /// Configuration for the solution synthesizer.
    pub solution: SolutionSynthesizerConfig,
    /// Configuration for the test synthesizer.
    pub tests: TestSynthesizerConfig,
    /// Configuration for the test validator.
    pub validation: TestValidatorConfig,
}

impl WorkflowConfig {
    /// Sets the attempt limits.
    pub fn with_limits(mut self, limits: AttemptLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Points all three agent roles at one model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.solution.model = model.clone();
        self.tests.model = model.clone();
        self.validation.model = model;
        self
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowOutcome {
    /// The candidate passed the example suite and the AI suite.
    Accepted,
    /// An attempt cap was reached before convergence.
    GaveUp,
}

/// Final state of a driven session plus the route taken to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Session state after the last merge.
    pub state: SessionState,
    /// Terminal outcome.
    pub outcome: WorkflowOutcome,
    /// Stages that ran, in order. Terminal labels are not listed.
    pub path: Vec<StageLabel>,
}

/// The code-synthesis workflow: five stages and a routing table.
pub struct CodegenWorkflow {
    generate_tests: GenerateTestsStage,
    validate_tests: ValidateTestsStage,
    generate_solution: GenerateSolutionStage,
    test_with_examples: TestWithExamplesStage,
    test_with_ai: TestWithAiStage,
    routing: RoutingPolicy,
}

impl CodegenWorkflow {
    /// Builds a workflow where all three agent roles share one provider.
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        executor: Arc<dyn CodeExecutor>,
        config: WorkflowConfig,
    ) -> Self {
        Self::with_providers(llm.clone(), llm.clone(), llm, executor, config)
    }

    /// Builds a workflow with a distinct provider per agent role, so the
    /// solution, test-authoring, and validation models can differ.
    pub fn with_providers(
        solution_llm: Arc<dyn LlmProvider>,
        test_llm: Arc<dyn LlmProvider>,
        validation_llm: Arc<dyn LlmProvider>,
        executor: Arc<dyn CodeExecutor>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            generate_tests: GenerateTestsStage::new(TestSynthesizer::new(
                test_llm,
                config.tests,
            )),
            validate_tests: ValidateTestsStage::new(TestValidator::new(
                validation_llm,
                config.validation,
            )),
            generate_solution: GenerateSolutionStage::new(SolutionSynthesizer::new(
                solution_llm,
                config.solution,
            )),
            test_with_examples: TestWithExamplesStage::new(executor.clone()),
            test_with_ai: TestWithAiStage::new(executor),
            routing: RoutingPolicy::new(config.limits),
        }
    }

    /// The routing policy in effect.
    pub fn routing(&self) -> &RoutingPolicy {
        &self.routing
    }

    /// Run a fresh session over `problem` to a terminal label.
    pub async fn run_session(&self, problem: ProblemSpecification) -> WorkflowRun {
        self.resume_session(SessionState::new(problem), StageLabel::GenerateTests)
            .await
    }

    /// Drive an existing session starting at `from`.
    ///
    /// This is the re-entry point for persisted sessions: load the state,
    /// optionally set `human_feedback`, and resume at `GenerateSolution`
    /// to fold the comment into the next candidate.
    pub async fn resume_session(&self, mut state: SessionState, from: StageLabel) -> WorkflowRun {
        info!(session_id = %state.session_id, from = %from, "driving session");

        let mut label = from;
        let mut path = Vec::new();

        while let Some(stage) = self.stage(label) {
            path.push(label);
            let update = stage.run(&state).await;
            state.apply(update);

            let next = self.routing.next_stage(label, &state);
            info!(
                session_id = %state.session_id,
                from = %label,
                to = %next,
                "stage finished"
            );
            label = next;
        }

        let outcome = match label {
            StageLabel::Accepted => WorkflowOutcome::Accepted,
            _ => WorkflowOutcome::GaveUp,
        };
        info!(
            session_id = %state.session_id,
            outcome = ?outcome,
            stages = path.len(),
            "session finished"
        );

        WorkflowRun {
            state,
            outcome,
            path,
        }
    }

    fn stage(&self, label: StageLabel) -> Option<&dyn SessionStage> {
        match label {
            StageLabel::GenerateTests => Some(&self.generate_tests),
            StageLabel::ValidateTests => Some(&self.validate_tests),
            StageLabel::GenerateSolution => Some(&self.generate_solution),
            StageLabel::TestWithExamples => Some(&self.test_with_examples),
            StageLabel::TestWithAi => Some(&self.test_with_ai),
            StageLabel::Accepted | StageLabel::GaveUp => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{GenerationRequest, GenerationResponse};
    use crate::session::ExecutionResult;
    use async_trait::async_trait;

    struct UnreachableProvider;

    #[async_trait]
    impl LlmProvider for UnreachableProvider {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            panic!("provider must not be called");
        }
    }

    struct UnreachableExecutor;

    #[async_trait]
    impl CodeExecutor for UnreachableExecutor {
        async fn execute(&self, _code: &str) -> ExecutionResult {
            panic!("executor must not be called");
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
    fn with_model_points_every_role_at_one_model() {
        let config = WorkflowConfig::default().with_model("gpt-4o");
        assert_eq!(config.solution.model, "gpt-4o");
        assert_eq!(config.tests.model, "gpt-4o");
        assert_eq!(config.validation.model, "gpt-4o");
    }

    #[tokio::test]
    async fn resuming_at_a_terminal_label_runs_nothing() {
        let workflow = CodegenWorkflow::new(
            Arc::new(UnreachableProvider),
            Arc::new(UnreachableExecutor),
            WorkflowConfig::default(),
        );

        let run = workflow
            .resume_session(SessionState::new(sample_problem()), StageLabel::Accepted)
            .await;
        assert_eq!(run.outcome, WorkflowOutcome::Accepted);
        assert!(run.path.is_empty());

        let run = workflow
            .resume_session(SessionState::new(sample_problem()), StageLabel::GaveUp)
            .await;
        assert_eq!(run.outcome, WorkflowOutcome::GaveUp);
        assert!(run.path.is_empty());
    }
}
