//! Routing: which stage runs next.
//!
//! The table below is the whole control flow of the workflow. It is a pure
//! function of the stage that just ran and the merged state it produced,
//! so the external runtime can persist after any stage and re-derive the
//! next step from state alone.
//!
//! A failing AI-test run routes back to `ValidateTests`, not straight to
//! `GenerateSolution`: the AI suite itself may be the faulty side, and the
//! validator gets to see the failure before another solution is attempted.
//!
//! Every cycle in the stage graph passes through a synthesis stage, and
//! each synthesis stage counts its runs in the session, so capping those
//! counters bounds the whole workflow.

use serde::{Deserialize, Serialize};

use super::stages::StageLabel;
use crate::session::SessionState;

/// Caps on the workflow's three retry loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptLimits {
    /// How many AI test suites may be synthesized per session.
    pub max_test_syntheses: u32,
    /// How many candidate solutions may be synthesized per session.
    pub max_solution_syntheses: u32,
    /// How many times the AI suite may be executed per session.
    pub max_ai_test_rounds: u32,
}

impl Default for AttemptLimits {
    fn default() -> Self {
        Self {
            max_test_syntheses: 5,
            max_solution_syntheses: 8,
            max_ai_test_rounds: 4,
        }
    }
}

impl AttemptLimits {
    /// Sets the cap on AI test suite syntheses.
    pub fn with_max_test_syntheses(mut self, max: u32) -> Self {
        self.max_test_syntheses = max.max(1);
        self
    }

    /// Sets the cap on candidate solution syntheses.
    pub fn with_max_solution_syntheses(mut self, max: u32) -> Self {
        self.max_solution_syntheses = max.max(1);
        self
    }

    /// Sets the cap on AI suite executions.
    pub fn with_max_ai_test_rounds(mut self, max: u32) -> Self {
        self.max_ai_test_rounds = max.max(1);
        self
    }
}

/// The workflow's transition table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutingPolicy {
    limits: AttemptLimits,
}

impl RoutingPolicy {
    /// Creates a routing policy with the given attempt limits.
    pub fn new(limits: AttemptLimits) -> Self {
        Self { limits }
    }

    /// The attempt limits this policy enforces.
    pub fn limits(&self) -> AttemptLimits {
        self.limits
    }

    /// Decide what runs after `completed`, given the state it left behind.
    ///
    /// Terminal labels route to themselves.
    pub fn next_stage(&self, completed: StageLabel, state: &SessionState) -> StageLabel {
        match completed {
            StageLabel::GenerateTests => StageLabel::ValidateTests,
            StageLabel::ValidateTests => {
                if state.is_ai_test_code_good {
                    self.enter_generate_solution(state)
                } else {
                    self.enter_generate_tests(state)
                }
            }
            StageLabel::GenerateSolution => StageLabel::TestWithExamples,
            StageLabel::TestWithExamples => {
                if state.is_main_code_good {
                    StageLabel::TestWithAi
                } else {
                    self.enter_generate_solution(state)
                }
            }
            StageLabel::TestWithAi => {
                if state.is_main_code_good {
                    StageLabel::Accepted
                } else if state.ai_test_rounds >= self.limits.max_ai_test_rounds {
                    StageLabel::GaveUp
                } else {
                    StageLabel::ValidateTests
                }
            }
            terminal @ (StageLabel::Accepted | StageLabel::GaveUp) => terminal,
        }
    }

    /// Re-enter test synthesis, or give up if the cap is spent.
    fn enter_generate_tests(&self, state: &SessionState) -> StageLabel {
        if state.test_syntheses >= self.limits.max_test_syntheses {
            StageLabel::GaveUp
        } else {
            StageLabel::GenerateTests
        }
    }

    /// Enter solution synthesis, or give up if the cap is spent.
    fn enter_generate_solution(&self, state: &SessionState) -> StageLabel {
        if state.solution_syntheses >= self.limits.max_solution_syntheses {
            StageLabel::GaveUp
        } else {
            StageLabel::GenerateSolution
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemSpecification;
    use crate::session::{ExecutionResult, TestOrigin};

    fn sample_state() -> SessionState {
        let problem = ProblemSpecification::new(
            "Return the sum of two integers.",
            "Input: a = 1, b = 2\nOutput: 3",
            "class Solution:\n    def add(self, a: int, b: int) -> int:",
            "assert Solution().add(1, 2) == 3",
        )
        .unwrap();
        SessionState::new(problem)
    }

    fn policy() -> RoutingPolicy {
        RoutingPolicy::new(AttemptLimits::default())
    }

    #[test]
    fn nominal_path_runs_every_stage_once() {
        let mut state = sample_state();

        assert_eq!(
            policy().next_stage(StageLabel::GenerateTests, &state),
            StageLabel::ValidateTests
        );

        state.is_ai_test_code_good = true;
        state.test_syntheses = 1;
        assert_eq!(
            policy().next_stage(StageLabel::ValidateTests, &state),
            StageLabel::GenerateSolution
        );

        state.solution_syntheses = 1;
        assert_eq!(
            policy().next_stage(StageLabel::GenerateSolution, &state),
            StageLabel::TestWithExamples
        );

        state.is_main_code_good = true;
        assert_eq!(
            policy().next_stage(StageLabel::TestWithExamples, &state),
            StageLabel::TestWithAi
        );

        state.ai_test_rounds = 1;
        assert_eq!(
            policy().next_stage(StageLabel::TestWithAi, &state),
            StageLabel::Accepted
        );
    }

    #[test]
    fn rejected_suite_goes_back_to_synthesis() {
        let mut state = sample_state();
        state.is_ai_test_code_good = false;
        state.test_syntheses = 1;

        assert_eq!(
            policy().next_stage(StageLabel::ValidateTests, &state),
            StageLabel::GenerateTests
        );
    }

    #[test]
    fn failing_examples_regenerate_the_solution() {
        let mut state = sample_state();
        state.is_main_code_good = false;
        state.solution_syntheses = 1;

        assert_eq!(
            policy().next_stage(StageLabel::TestWithExamples, &state),
            StageLabel::GenerateSolution
        );
    }

    #[test]
    fn failing_ai_run_revalidates_the_suite_first() {
        let mut state = sample_state();
        state.is_main_code_good = false;
        state.ai_test_rounds = 1;
        state.last_execution_result = Some(ExecutionResult::completed("c", "", "boom", 1));
        state.last_execution_origin = Some(TestOrigin::Ai);

        assert_eq!(
            policy().next_stage(StageLabel::TestWithAi, &state),
            StageLabel::ValidateTests
        );
    }

    #[test]
    fn exhausted_test_synthesis_gives_up() {
        let mut state = sample_state();
        state.is_ai_test_code_good = false;
        state.test_syntheses = AttemptLimits::default().max_test_syntheses;

        assert_eq!(
            policy().next_stage(StageLabel::ValidateTests, &state),
            StageLabel::GaveUp
        );
    }

    #[test]
    fn exhausted_solution_synthesis_gives_up() {
        let mut state = sample_state();
        state.is_main_code_good = false;
        state.solution_syntheses = AttemptLimits::default().max_solution_syntheses;

        assert_eq!(
            policy().next_stage(StageLabel::TestWithExamples, &state),
            StageLabel::GaveUp
        );

        // The cap also guards entry through a passing validation.
        state.is_ai_test_code_good = true;
        assert_eq!(
            policy().next_stage(StageLabel::ValidateTests, &state),
            StageLabel::GaveUp
        );
    }

    #[test]
    fn exhausted_ai_rounds_give_up() {
        let mut state = sample_state();
        state.is_main_code_good = false;
        state.ai_test_rounds = AttemptLimits::default().max_ai_test_rounds;

        assert_eq!(
            policy().next_stage(StageLabel::TestWithAi, &state),
            StageLabel::GaveUp
        );
    }

    #[test]
    fn acceptance_ignores_spent_counters() {
        let mut state = sample_state();
        state.is_main_code_good = true;
        state.ai_test_rounds = 99;
        state.solution_syntheses = 99;

        assert_eq!(
            policy().next_stage(StageLabel::TestWithAi, &state),
            StageLabel::Accepted
        );
    }

    #[test]
    fn terminal_labels_route_to_themselves() {
        let state = sample_state();
        assert_eq!(
            policy().next_stage(StageLabel::Accepted, &state),
            StageLabel::Accepted
        );
        assert_eq!(
            policy().next_stage(StageLabel::GaveUp, &state),
            StageLabel::GaveUp
        );
    }

    #[test]
    fn limit_builders_floor_at_one() {
        let limits = AttemptLimits::default()
            .with_max_test_syntheses(0)
            .with_max_solution_syntheses(3)
            .with_max_ai_test_rounds(0);
        assert_eq!(limits.max_test_syntheses, 1);
        assert_eq!(limits.max_solution_syntheses, 3);
        assert_eq!(limits.max_ai_test_rounds, 1);
    }
}
