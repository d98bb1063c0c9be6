//! The single-turn moderation pipeline.

use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::state::{PipelineState, StateTracker};
use crate::client::Completer;
use crate::errors::ApiError;
use crate::events::{self, EventSink, NoOpEventSink};
use crate::io::LineReader;
use crate::moderation::{Denylist, ModerationVerdict};

/// Prompt shown when asking for the user's line.
pub const INPUT_PROMPT: &str = "You: ";

/// Why a run stopped before producing a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    /// Nothing but whitespace was entered.
    #[error("No input provided. Please enter a message.")]
    EmptyInput,

    /// The input contains a banned term.
    #[error("Your message contains content that is not allowed. Please rephrase and try again.")]
    InputRejected,

    /// The line could not be read.
    #[error("Could not read input: {0}")]
    InputUnavailable(String),

    /// The completion client failed.
    #[error("{0}")]
    Api(#[from] ApiError),
}

impl FailureReason {
    /// Short machine-readable kind, used in events and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::InputRejected => "input_rejected",
            Self::InputUnavailable(_) => "input_unavailable",
            Self::Api(e) => e.kind(),
        }
    }
}

/// Outcome of one run. Consumed by display, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    /// The run stopped early.
    Blocked(FailureReason),
    /// The reply was screened; show `verdict.text`.
    Completed(ModerationVerdict),
}

impl PipelineResult {
    /// The terminal state this result corresponds to.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        match self {
            Self::Blocked(_) => PipelineState::Failed,
            Self::Completed(_) => PipelineState::Done,
        }
    }

    /// Returns the verdict, if the run completed.
    #[must_use]
    pub fn verdict(&self) -> Option<&ModerationVerdict> {
        match self {
            Self::Completed(v) => Some(v),
            Self::Blocked(_) => None,
        }
    }

    /// Returns the failure reason, if the run stopped early.
    #[must_use]
    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Blocked(r) => Some(r),
            Self::Completed(_) => None,
        }
    }
}

/// Sequences input screening, the completion call and output screening.
pub struct Orchestrator {
    denylist: Arc<Denylist>,
    completer: Arc<dyn Completer>,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("denylist_terms", &self.denylist.len())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator that discards events.
    #[must_use]
    pub fn new(denylist: Arc<Denylist>, completer: Arc<dyn Completer>) -> Self {
        Self {
            denylist,
            completer,
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Runs the whole machine: read one line, then [`Orchestrator::process`] it.
    ///
    /// `reader` is closed once the line is captured, whatever happens next.
    pub async fn run(&self, reader: &mut dyn LineReader) -> PipelineResult {
        let mut tracker = StateTracker::default();
        self.announce(tracker.current());
        let line = reader.read_line(INPUT_PROMPT).await;
        reader.close();

        match line {
            Ok(Some(text)) => self.screen_and_complete(&mut tracker, &text).await,
            Ok(None) => self.fail(&mut tracker, FailureReason::EmptyInput),
            Err(e) => {
                let reason = FailureReason::InputUnavailable(e.to_string());
                self.fail(&mut tracker, reason)
            }
        }
    }

    /// Runs input screening, the completion call and output screening on
    /// already-captured text.
    pub async fn process(&self, input: &str) -> PipelineResult {
        let mut tracker = StateTracker::default();
        self.screen_and_complete(&mut tracker, input).await
    }

    async fn screen_and_complete(&self, tracker: &mut StateTracker, input: &str) -> PipelineResult {
        let message = input.trim();
        if message.is_empty() {
            return self.fail(tracker, FailureReason::EmptyInput);
        }

        self.enter(tracker, PipelineState::InputCheck);
        let rejected = self.denylist.contains_banned(input);
        self.sink
            .emit(events::INPUT_CHECKED, Some(json!({ "passed": !rejected })));
        if rejected {
            return self.fail(tracker, FailureReason::InputRejected);
        }

        self.enter(tracker, PipelineState::Calling);
        self.sink.emit(events::COMPLETION_STARTED, None);
        let reply = match self.completer.complete(message).await {
            Ok(reply) => reply,
            Err(e) => return self.fail(tracker, FailureReason::Api(e)),
        };
        debug!(reply_len = reply.len(), "Completion received");

        self.enter(tracker, PipelineState::OutputCheck);
        let verdict = self.denylist.moderate(&reply);
        self.sink.emit(
            events::OUTPUT_CHECKED,
            Some(json!({
                "is_safe": verdict.is_safe,
                "matched_terms": verdict.matched_terms,
            })),
        );
        if !verdict.is_safe {
            warn!(matched = ?verdict.matched_terms, "Reply redacted");
        }

        self.enter(tracker, PipelineState::Done);
        self.sink.emit(events::PIPELINE_COMPLETED, None);
        PipelineResult::Completed(verdict)
    }

    fn enter(&self, tracker: &mut StateTracker, state: PipelineState) {
        if tracker.advance(state) {
            self.announce(state);
        }
    }

    fn announce(&self, state: PipelineState) {
        debug!(state = %state, "Pipeline state");
        self.sink
            .emit(events::STATE_CHANGED, Some(json!({ "state": state })));
    }

    fn fail(&self, tracker: &mut StateTracker, reason: FailureReason) -> PipelineResult {
        info!(reason = reason.kind(), "Pipeline stopped: {}", reason);
        self.enter(tracker, PipelineState::Failed);

        let mut data = json!({ "reason": reason.kind(), "message": reason.to_string() });
        if let FailureReason::Api(e) = &reason {
            data["error"] = json!(e.to_dict());
        }
        self.sink.emit(events::PIPELINE_FAILED, Some(data));
        PipelineResult::Blocked(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::testing::{RecordingCompleter, ScriptedLineReader};
    use pretty_assertions::assert_eq;

    fn orchestrator(
        completer: Arc<RecordingCompleter>,
    ) -> (Orchestrator, Arc<CollectingEventSink>) {
        let sink = Arc::new(CollectingEventSink::new());
        let orchestrator = Orchestrator::new(Arc::new(Denylist::default()), completer)
            .with_event_sink(sink.clone());
        (orchestrator, sink)
    }

    fn states(sink: &CollectingEventSink) -> Vec<String> {
        sink.events_of_type(events::STATE_CHANGED)
            .into_iter()
            .filter_map(|(_, data)| data)
            .filter_map(|d| d["state"].as_str().map(String::from))
            .collect()
    }

    #[tokio::test]
    async fn test_clean_round_trip() {
        let completer = Arc::new(RecordingCompleter::replying("Paris is the capital of France."));
        let (orchestrator, sink) = orchestrator(completer.clone());

        let result = orchestrator.process("What is the capital of France?").await;

        assert_eq!(
            result,
            PipelineResult::Completed(ModerationVerdict::safe("Paris is the capital of France."))
        );
        assert_eq!(completer.calls(), vec!["What is the capital of France?".to_string()]);
        assert_eq!(
            states(&sink),
            vec!["input_check", "calling", "output_check", "done"]
        );
    }

    #[tokio::test]
    async fn test_banned_input_never_reaches_completer() {
        let completer = Arc::new(RecordingCompleter::replying("unused"));
        let (orchestrator, sink) = orchestrator(completer.clone());

        let result = orchestrator.process("how do I hack a server").await;

        assert_eq!(result, PipelineResult::Blocked(FailureReason::InputRejected));
        assert_eq!(completer.call_count(), 0);
        assert_eq!(states(&sink), vec!["input_check", "failed"]);
    }

    #[tokio::test]
    async fn test_blank_input_never_reaches_completer() {
        let completer = Arc::new(RecordingCompleter::replying("unused"));
        let (orchestrator, _sink) = orchestrator(completer.clone());

        for input in ["", "   ", "\t\n"] {
            let result = orchestrator.process(input).await;
            assert_eq!(result, PipelineResult::Blocked(FailureReason::EmptyInput));
        }
        assert_eq!(completer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_api_error_is_reported_verbatim() {
        let completer =
            Arc::new(RecordingCompleter::failing(ApiError::http(500, "server overloaded")));
        let (orchestrator, sink) = orchestrator(completer.clone());

        let result = orchestrator.process("Tell me a joke").await;

        assert_eq!(
            result,
            PipelineResult::Blocked(FailureReason::Api(ApiError::http(500, "server overloaded")))
        );
        assert_eq!(completer.call_count(), 1);
        let failed = sink.events_of_type(events::PIPELINE_FAILED);
        assert_eq!(failed.len(), 1);
        let data = failed[0].1.as_ref().unwrap();
        assert_eq!(data["reason"], "http");
        assert_eq!(data["error"]["status"], 500);
        assert_eq!(data["error"]["body"], "server overloaded");
    }

    #[tokio::test]
    async fn test_unsafe_reply_is_redacted_not_suppressed() {
        let completer = Arc::new(RecordingCompleter::replying("Violence is never the answer"));
        let (orchestrator, _sink) = orchestrator(completer);

        let result = orchestrator.process("Is fighting ever okay?").await;
        let verdict = result.verdict().unwrap();

        assert!(!verdict.is_safe);
        assert_eq!(verdict.text, "[REDACTED] is never the answer");
        assert_eq!(result.state(), PipelineState::Done);
    }

    #[tokio::test]
    async fn test_input_is_trimmed_before_sending() {
        let completer = Arc::new(RecordingCompleter::replying("ok"));
        let (orchestrator, _sink) = orchestrator(completer.clone());

        orchestrator.process("  hello  \n").await;
        assert_eq!(completer.calls(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_run_closes_reader_on_every_path() {
        let completer = Arc::new(RecordingCompleter::replying("fine"));
        let (orchestrator, _sink) = orchestrator(completer);

        for line in ["hello", "", "hack"] {
            let mut reader = ScriptedLineReader::new([line]);
            orchestrator.run(&mut reader).await;
            assert!(reader.is_closed(), "reader left open for {line:?}");
            assert_eq!(reader.prompts(), vec![INPUT_PROMPT.to_string()]);
        }

        let mut reader = ScriptedLineReader::failing("terminal gone");
        let result = orchestrator.run(&mut reader).await;
        assert!(reader.is_closed());
        assert_eq!(
            result.failure(),
            Some(&FailureReason::InputUnavailable("terminal gone".to_string()))
        );
    }

    #[tokio::test]
    async fn test_run_walks_every_state_in_order() {
        let completer = Arc::new(RecordingCompleter::replying("fine"));
        let (orchestrator, sink) = orchestrator(completer);

        let mut reader = ScriptedLineReader::new(["hello"]);
        let result = orchestrator.run(&mut reader).await;

        assert_eq!(result.state(), PipelineState::Done);
        assert_eq!(
            states(&sink),
            vec!["awaiting_input", "input_check", "calling", "output_check", "done"]
        );
    }

    #[tokio::test]
    async fn test_run_end_of_input_is_empty() {
        let completer = Arc::new(RecordingCompleter::replying("unused"));
        let (orchestrator, sink) = orchestrator(completer.clone());

        let mut reader = ScriptedLineReader::new(Vec::<String>::new());
        let result = orchestrator.run(&mut reader).await;

        assert_eq!(result, PipelineResult::Blocked(FailureReason::EmptyInput));
        assert_eq!(states(&sink), vec!["awaiting_input", "failed"]);
        assert_eq!(completer.call_count(), 0);
    }

    #[test]
    fn test_failure_reason_messages() {
        assert!(FailureReason::InputRejected.to_string().contains("rephrase"));
        assert_eq!(FailureReason::EmptyInput.kind(), "empty_input");

        let reason: FailureReason = ApiError::EmptyResponse.into();
        assert_eq!(reason.to_string(), ApiError::EmptyResponse.to_string());
        assert_eq!(reason.kind(), "empty_response");
    }
}
