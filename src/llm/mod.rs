//! LLM integration for codeloop.
//!
//! This module provides the provider trait the workflow's model roles are
//! injected behind and a client for OpenAI-compatible chat-completions
//! endpoints.
//!
//! ```ignore
//! use codeloop::llm::{ChatCompletionsClient, GenerationRequest, Message};
//!
//! let client = ChatCompletionsClient::from_env()?;
//! let request = GenerationRequest::new(
//!     "",
//!     vec![
//!         Message::system("You are an excellent Python programmer."),
//!         Message::user("Write a function that reverses a string."),
//!     ],
//! );
//! let response = client.generate(request).await?;
//! ```

pub mod client;

pub use client::{
    ChatCompletionsClient, Choice, GenerationRequest, GenerationResponse, LlmProvider, Message,
    Usage, DEFAULT_MODEL,
};
