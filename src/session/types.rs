//! Execution result types shared by the sandbox client and session state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one sandboxed execution of a combined source payload.
///
/// Execution never surfaces an error to the caller: a run that could not be
/// performed at all is folded into a result with `has_error` set, so the
/// workflow can route on it like any other failing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The exact source payload that was submitted.
    pub code: String,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error, or the folded transport/service failure.
    pub stderr: String,
    /// True when the run exited non-zero or never ran at all.
    pub has_error: bool,
}

impl ExecutionResult {
    /// Result for a run that completed inside the sandbox.
    pub fn completed(
        code: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        returncode: i64,
    ) -> Self {
        Self {
            code: code.into(),
            stdout: stdout.into(),
            stderr: stderr.into(),
            has_error: returncode != 0,
        }
    }

    /// Result for a run that never completed; `detail` says why.
    pub fn failed_to_run(code: impl Into<String>, detail: &str) -> Self {
        Self {
            code: code.into(),
            stdout: String::new(),
            stderr: format!("({})", detail),
            has_error: true,
        }
    }
}

/// Which test suite produced an execution result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestOrigin {
    /// Model-written tests.
    Ai,
    /// Known-good example tests shipped with the problem.
    Examples,
}

impl fmt::Display for TestOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestOrigin::Ai => write!(f, "ai"),
            TestOrigin::Examples => write!(f, "examples"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_derives_has_error_from_returncode() {
        let ok = ExecutionResult::completed("print(1)", "1\n", "", 0);
        assert!(!ok.has_error);

        let failed = ExecutionResult::completed("assert False", "", "AssertionError", 1);
        assert!(failed.has_error);
        assert_eq!(failed.stderr, "AssertionError");
    }

    #[test]
    fn failed_to_run_wraps_detail_and_flags_error() {
        let result = ExecutionResult::failed_to_run("print(1)", "connection refused");
        assert!(result.has_error);
        assert_eq!(result.stdout, "");
        assert_eq!(result.stderr, "(connection refused)");
        assert_eq!(result.code, "print(1)");
    }

    #[test]
    fn test_origin_serializes_as_snake_case_tag() {
        assert_eq!(serde_json::to_string(&TestOrigin::Ai).unwrap(), "\"ai\"");
        assert_eq!(
            serde_json::to_string(&TestOrigin::Examples).unwrap(),
            "\"examples\""
        );

        let parsed: TestOrigin = serde_json::from_str("\"examples\"").unwrap();
        assert_eq!(parsed, TestOrigin::Examples);
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(TestOrigin::Ai.to_string(), "ai");
        assert_eq!(TestOrigin::Examples.to_string(), "examples");
    }
}
