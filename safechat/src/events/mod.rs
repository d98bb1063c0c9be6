//! Event sinks for pipeline observability.
//!
//! The orchestrator reports every state transition and stage outcome through
//! an [`EventSink`]. The terminal front end renders status lines from them;
//! tests collect them.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Emitted on every state transition. Data: `{"state": ..}`.
pub const STATE_CHANGED: &str = "pipeline.state";
/// Emitted after the input gate. Data: `{"passed": bool}`.
pub const INPUT_CHECKED: &str = "moderation.input";
/// Emitted after output screening. Data: `{"is_safe": bool, "matched_terms": [..]}`.
pub const OUTPUT_CHECKED: &str = "moderation.output";
/// Emitted before the completion request.
pub const COMPLETION_STARTED: &str = "completion.started";
/// Emitted when the run stops early. Data: `{"reason": .., "message": ..}`.
pub const PIPELINE_FAILED: &str = "pipeline.failed";
/// Emitted when the run completes.
pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
