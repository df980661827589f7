//! The self-correcting synthesis workflow.
//!
//! Stages run one at a time over a shared [`SessionState`](crate::session::SessionState):
//!
//! ```text
//! GenerateTests --> ValidateTests --valid--> GenerateSolution --> TestWithExamples
//!       ^              |   ^                        ^                |      |
//!       +---invalid----+   |                        +------fail------+      |pass
//!                          |                                                v
//!                          +-------------fail--------------------- TestWithAi
//!                                                                       |
//!                                                                       +--pass--> Accepted
//! ```
//!
//! A failing AI-test run re-enters at `ValidateTests`, since the AI suite
//! is as suspect as the solution. Retry loops are capped; a spent cap ends
//! the session at `GaveUp`.

mod driver;
mod routing;
mod stages;

pub use driver::{CodegenWorkflow, WorkflowConfig, WorkflowOutcome, WorkflowRun};
pub use routing::{AttemptLimits, RoutingPolicy};
pub use stages::{
    GenerateSolutionStage, GenerateTestsStage, SessionStage, StageLabel, TestWithAiStage,
    TestWithExamplesStage, ValidateTestsStage,
};
