//! Transport-only client for OpenAI-compatible chat completion endpoints.
//!
//! This crate owns request building, header assembly, payload shapes and error parsing for
//! `/chat/completions`. It contains no tool execution and no terminal coupling; callers
//! decide what to do with tool calls in a response.
//!
//! Requests are sent once. There is no retry or streaming in this layer.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use client::ChatApiClient;
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use payload::{
    ChatMessage, ChatRequest, ChatResponse, Choice, FunctionCall, ResponseMessage, ToolCall,
    ToolSpec, Usage,
};
pub use url::normalize_chat_url;
