//! HTTP client for the code-execution sandbox.
//!
//! Generated code is untrusted and never runs in this process. It is posted
//! to an external sandbox service (`POST {base_url}/execute` with a JSON
//! `{"code": ...}` body) that runs it in isolation and reports stdout,
//! stderr and the exit code. The client never raises: any transport or
//! service failure is folded into an `ExecutionResult` with `has_error`
//! set, so the workflow routes on it like any other failing run.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::session::ExecutionResult;

/// Default sandbox service address.
pub const DEFAULT_SANDBOX_URL: &str = "http://127.0.0.1:8000";

/// Comment header placed above the candidate solution in a combined payload.
const SOLUTION_HEADER: &str = "# Your solution:";
/// Comment header placed above the test suite in a combined payload.
const TEST_HEADER: &str = "# QA test:";

/// Combine a candidate solution and a test suite into one executable
/// payload: solution first, tests second, each under its comment header,
/// both verbatim.
pub fn combine_sources(solution: &str, tests: &str) -> String {
    format!("{SOLUTION_HEADER}\n{solution}\n\n{TEST_HEADER}\n{tests}")
}

/// Trait for executors that run untrusted code.
///
/// Infallible by contract: a run that could not happen at all is still an
/// `ExecutionResult`, with the failure folded into `stderr`/`has_error`.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Execute `code` and report the outcome.
    async fn execute(&self, code: &str) -> ExecutionResult;
}

/// Request body for the sandbox service.
#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    code: &'a str,
}

/// Success body from the sandbox service.
#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    stdout: String,
    stderr: String,
    returncode: i64,
}

/// Error body from the sandbox service.
#[derive(Debug, Deserialize)]
struct ExecuteErrorResponse {
    detail: String,
}

/// Client for the HTTP execution sandbox.
pub struct SandboxClient {
    /// Base URL of the sandbox service.
    base_url: String,
    /// HTTP client for making requests.
    http_client: Client,
}

impl SandboxClient {
    /// Create a client for the sandbox at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Create a client from the `SANDBOX_URL` environment variable,
    /// falling back to [`DEFAULT_SANDBOX_URL`].
    pub fn from_env() -> Self {
        let base_url =
            env::var("SANDBOX_URL").unwrap_or_else(|_| DEFAULT_SANDBOX_URL.to_string());
        Self::new(base_url)
    }

    /// Get the sandbox base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CodeExecutor for SandboxClient {
    async fn execute(&self, code: &str) -> ExecutionResult {
        let url = format!("{}/execute", self.base_url);

        let response = match self
            .http_client
            .post(&url)
            .json(&ExecuteRequest { code })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "sandbox request failed to send");
                return ExecutionResult::failed_to_run(code, &e.to_string());
            }
        };

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            let detail = serde_json::from_str::<ExecuteErrorResponse>(&error_text)
                .map(|body| body.detail)
                .unwrap_or(error_text);
            let detail = if detail.is_empty() {
                format!("sandbox returned HTTP {}", status.as_u16())
            } else {
                detail
            };

            tracing::warn!(
                status = status.as_u16(),
                detail = %detail,
                "sandbox rejected execution"
            );
            return ExecutionResult::failed_to_run(code, &detail);
        }

        match response.json::<ExecuteResponse>().await {
            Ok(body) => {
                tracing::debug!(returncode = body.returncode, "sandbox run completed");
                ExecutionResult::completed(code, body.stdout, body.stderr, body.returncode)
            }
            Err(e) => {
                tracing::warn!(error = %e, "sandbox returned an unreadable success body");
                ExecutionResult::failed_to_run(code, &e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_sources_keeps_both_parts_verbatim() {
        let solution = "class Solution:\n    def f(self):\n        return 1";
        let tests = "assert Solution().f() == 1";
        let combined = combine_sources(solution, tests);

        assert!(combined.contains(solution));
        assert!(combined.contains(tests));
        assert!(combined.starts_with("# Your solution:\n"));
        assert!(combined.contains("# QA test:\n"));
        // Solution comes before the tests.
        let solution_at = combined.find(solution).unwrap();
        let tests_at = combined.find(tests).unwrap();
        assert!(solution_at < tests_at);
    }

    #[test]
    fn client_keeps_configured_base_url() {
        let client = SandboxClient::new("http://sandbox.internal:9000");
        assert_eq!(client.base_url(), "http://sandbox.internal:9000");
    }

    #[tokio::test]
    async fn unreachable_sandbox_folds_into_error_result() {
        // Use a port that's unlikely to have a server
        let client = SandboxClient::new("http://127.0.0.1:65535");
        let result = client.execute("print('hi')").await;

        assert!(result.has_error);
        assert_eq!(result.stdout, "");
        assert!(result.stderr.starts_with('('));
        assert!(result.stderr.ends_with(')'));
        assert_eq!(result.code, "print('hi')");
    }
}
