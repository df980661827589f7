//! Delimited code-block extraction from LLM responses.
//!
//! The generation prompts ask models to wrap emitted code between literal
//! marker lines (for example `===code-start===` / `===code-end===`) because
//! markdown fences alone are unreliable: models open fences without closing
//! them, nest fences inside explanations, or fence the wrong block. This
//! module pulls out the text between the first head marker and the first
//! tail marker after it, then removes any markdown fence lines that
//! survived inside the block.
//!
//! # Example
//!
//! ```
//! use codeloop::utils::code_extraction::extract_delimited;
//!
//! let reply = "Sure, here it is:\n===code-start===\nprint('hi')\n===code-end===\nDone.";
//! let code = extract_delimited(reply, "===code-start===", "===code-end===").unwrap();
//! assert_eq!(code.trim(), "print('hi')");
//! ```

use regex::Regex;

/// Extract the substring strictly between the first occurrence of `head`
/// and the first occurrence of `tail` after it.
///
/// Both markers are matched as literal text (regex metacharacters are
/// escaped) and the block may span any number of lines. Returns `None`
/// when either marker is missing or `tail` never appears after `head`.
/// Markdown fence lines inside the block are stripped, since models often
/// wrap a fenced block inside the requested markers.
pub fn extract_delimited(content: &str, head: &str, tail: &str) -> Option<String> {
    let pattern = format!("(?s){}(.*?){}", regex::escape(head), regex::escape(tail));
    let re = Regex::new(&pattern).ok()?;
    let block = re.captures(content)?.get(1)?.as_str();

    let fence = Regex::new(r"```.*").ok()?;
    Some(fence.replace_all(block, "").into_owned())
}
