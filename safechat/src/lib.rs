//! # SafeChat
//!
//! A moderated single-turn chat pipeline.
//!
//! One line of user text is screened against a denylist, forwarded to an
//! OpenAI-compatible completion endpoint, and the reply is screened again
//! before display:
//!
//! - **Input gate**: text containing a banned term never leaves the process
//! - **Completion client**: one POST per run, explicit timeout, no retries
//! - **Output screen**: banned terms in the reply are replaced by `[REDACTED]`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use safechat::prelude::*;
//! use std::sync::Arc;
//!
//! let client = CompletionClient::with_reqwest(ClientConfig::default(), Credential::from_env())?;
//! let orchestrator = Orchestrator::new(Arc::new(Denylist::default()), Arc::new(client));
//!
//! match orchestrator.process("What is the capital of France?").await {
//!     PipelineResult::Completed(verdict) => println!("{}", verdict.text),
//!     PipelineResult::Blocked(reason) => eprintln!("{reason}"),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod client;
pub mod config;
pub mod errors;
pub mod events;
pub mod io;
pub mod moderation;
pub mod pipeline;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{Completer, CompletionClient, HttpTransport, ReqwestTransport};
    pub use crate::config::{ClientConfig, Credential};
    pub use crate::errors::{ApiError, SafechatError};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::io::{LineReader, StdinLineReader};
    pub use crate::moderation::{Denylist, ModerationVerdict, REDACTION_MARKER};
    pub use crate::pipeline::{FailureReason, Orchestrator, PipelineResult, PipelineState};
}
