//! Shared utility functions for codeloop.
//!
//! This module provides common utilities used across multiple modules,
//! currently the delimited code-block extraction from LLM responses.

pub mod code_extraction;

pub use code_extraction::extract_delimited;
