//! Command-line interface for codeloop.
//!
//! Provides the `solve` command that drives the synthesis workflow and the
//! `check` command for inspecting problem directories.

mod commands;

pub use commands::{parse_cli, run, run_with_cli};
