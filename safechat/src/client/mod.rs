//! Completion client for an OpenAI-compatible chat endpoint.
//!
//! This module provides:
//! - Wire types for the request and response bodies
//! - The [`HttpTransport`] seam with a `reqwest` implementation
//! - [`CompletionClient`], which performs exactly one POST per call
//! - The [`Completer`] trait the pipeline depends on

mod completion;
mod transport;

pub use completion::{
    parse_completion, ChatMessage, ChatRequest, ChatResponse, Completer, CompletionClient, Role,
    Usage,
};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
