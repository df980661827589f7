//! Sandboxed execution layer for codeloop.
//!
//! Generated solutions and tests are combined into a single payload and
//! submitted to an external sandbox service over HTTP. The executor trait
//! is the seam tests mock; the client folds every failure into the result
//! so execution never aborts a session.
//!
//! # Example
//!
//! ```ignore
//! use codeloop::execution::{combine_sources, CodeExecutor, SandboxClient};
//!
//! let sandbox = SandboxClient::from_env();
//! let payload = combine_sources("def f():\n    return 1", "assert f() == 1");
//! let result = sandbox.execute(&payload).await;
//! assert!(!result.has_error);
//! ```

pub mod sandbox;

pub use sandbox::{combine_sources, CodeExecutor, SandboxClient, DEFAULT_SANDBOX_URL};
