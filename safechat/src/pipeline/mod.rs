//! Pipeline orchestration.
//!
//! A run is strictly linear: validate input, screen it, call the completer,
//! screen the reply, hand back a [`PipelineResult`]. Input that fails the
//! screen is blocked outright; a reply that fails it is redacted and shown.

mod orchestrator;
mod state;

pub use orchestrator::{FailureReason, Orchestrator, PipelineResult, INPUT_PROMPT};
pub use state::PipelineState;
