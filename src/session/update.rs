//! Partial state updates and their merge policies.
//!
//! A stage never mutates session state directly: it returns a `StateUpdate`
//! describing only the fields it touched, and the driver merges that update
//! into the state. The merge policy is carried by the field types
//! themselves: every `FieldUpdate` slot is last-write-wins with an explicit
//! clear, while the conversation channel is append-only.

use serde::{Deserialize, Serialize};

use super::types::{ExecutionResult, TestOrigin};
use crate::llm::Message;

/// Last-write-wins update for a single state field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum FieldUpdate<T> {
    /// Leave the current value untouched.
    #[default]
    Keep,
    /// Replace the current value.
    Set(T),
    /// Reset the field: optional slots become absent, plain fields return
    /// to their default.
    Clear,
}

impl<T> FieldUpdate<T> {
    /// Merge into an optional slot.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            FieldUpdate::Keep => {}
            FieldUpdate::Set(value) => *slot = Some(value),
            FieldUpdate::Clear => *slot = None,
        }
    }

    /// Merge into a plain slot, where clearing restores the default.
    pub fn apply_or_default(self, slot: &mut T)
    where
        T: Default,
    {
        match self {
            FieldUpdate::Keep => {}
            FieldUpdate::Set(value) => *slot = value,
            FieldUpdate::Clear => *slot = T::default(),
        }
    }

    /// True when the update leaves the field untouched.
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldUpdate::Keep)
    }
}

/// Build a `Set` update from an optional artifact, mapping absence to
/// `Clear` so a failed generation erases the stale value.
impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldUpdate::Set(v),
            None => FieldUpdate::Clear,
        }
    }
}

/// Partial update produced by one stage run.
///
/// Every field defaults to keep; construction sites set only what the stage
/// actually touched and fill the rest with `..StateUpdate::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateUpdate {
    pub main_code: FieldUpdate<String>,
    pub ai_test_code: FieldUpdate<String>,
    pub is_main_code_good: FieldUpdate<bool>,
    pub is_ai_test_code_good: FieldUpdate<bool>,
    pub last_execution_result: FieldUpdate<ExecutionResult>,
    pub last_execution_origin: FieldUpdate<TestOrigin>,
    pub human_feedback: FieldUpdate<String>,
    pub test_syntheses: FieldUpdate<u32>,
    pub solution_syntheses: FieldUpdate<u32>,
    pub ai_test_rounds: FieldUpdate<u32>,
    /// Messages to append to the conversation log. Appends only; an update
    /// can never replace or drop history.
    pub conversation_append: Vec<Message>,
}
