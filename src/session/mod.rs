//! Session state for the code-synthesis workflow.
//!
//! One session works one problem. All stages read the same `SessionState`
//! and communicate exclusively through `StateUpdate` values that the driver
//! merges back in, so the state record is the entire coordination surface
//! between the three model roles and the sandbox. Every type here is
//! serializable: an external runtime can persist a session after any stage
//! and resume it later.

mod log;
mod types;
mod update;

pub use log::ConversationLog;
pub use types::{ExecutionResult, TestOrigin};
pub use update::{FieldUpdate, StateUpdate};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::problem::ProblemSpecification;

/// Shared state of one code-synthesis session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Unique id the external runtime keys persistence on.
    pub session_id: Uuid,
    /// When the session started.
    pub created_at: DateTime<Utc>,
    /// The problem under work. Set once, never mutated.
    pub problem: ProblemSpecification,
    /// Latest candidate solution, absent until a generation succeeds.
    pub main_code: Option<String>,
    /// Latest model-written test suite, absent until a generation succeeds.
    pub ai_test_code: Option<String>,
    /// Did the candidate pass its most recent run?
    pub is_main_code_good: bool,
    /// Did the AI test suite pass review?
    pub is_ai_test_code_good: bool,
    /// Most recent sandbox result. Regenerating the AI tests clears it.
    pub last_execution_result: Option<ExecutionResult>,
    /// Which suite produced `last_execution_result`.
    pub last_execution_origin: Option<TestOrigin>,
    /// Append-only history of solution-generation exchanges.
    pub conversation: ConversationLog,
    /// Optional human comment consumed by the next solution generation.
    pub human_feedback: Option<String>,
    /// How many times the AI tests have been synthesized.
    pub test_syntheses: u32,
    /// How many times the solution has been synthesized.
    pub solution_syntheses: u32,
    /// How many times the AI suite has been executed.
    pub ai_test_rounds: u32,
}

impl SessionState {
    /// Start a fresh session over `problem`.
    pub fn new(problem: ProblemSpecification) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            created_at: Utc::now(),
            problem,
            main_code: None,
            ai_test_code: None,
            is_main_code_good: false,
            is_ai_test_code_good: false,
            last_execution_result: None,
            last_execution_origin: None,
            conversation: ConversationLog::new(),
            human_feedback: None,
            test_syntheses: 0,
            solution_syntheses: 0,
            ai_test_rounds: 0,
        }
    }

    /// Merge a stage's partial update into this state.
    ///
    /// Every field is last-write-wins except the conversation, which only
    /// ever grows.
    pub fn apply(&mut self, update: StateUpdate) {
        update.main_code.apply_to(&mut self.main_code);
        update.ai_test_code.apply_to(&mut self.ai_test_code);
        update
            .is_main_code_good
            .apply_or_default(&mut self.is_main_code_good);
        update
            .is_ai_test_code_good
            .apply_or_default(&mut self.is_ai_test_code_good);
        update
            .last_execution_result
            .apply_to(&mut self.last_execution_result);
        update
            .last_execution_origin
            .apply_to(&mut self.last_execution_origin);
        update.human_feedback.apply_to(&mut self.human_feedback);
        update.test_syntheses.apply_or_default(&mut self.test_syntheses);
        update
            .solution_syntheses
            .apply_or_default(&mut self.solution_syntheses);
        update.ai_test_rounds.apply_or_default(&mut self.ai_test_rounds);
        for message in update.conversation_append {
            self.conversation.append(message);
        }
    }

    /// The last execution, but only when it was a failing run of the AI
    /// suite. This is the trigger for re-reviewing the tests instead of
    /// regenerating the solution.
    pub fn failing_ai_execution(&self) -> Option<&ExecutionResult> {
        match (&self.last_execution_result, self.last_execution_origin) {
            (Some(result), Some(TestOrigin::Ai)) if result.has_error => Some(result),
            _ => None,
        }
    }
}
