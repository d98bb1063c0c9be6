//! Terminal rendering.

use std::io::{self, Write};

use safechat::events::{self, EventSink, LoggingEventSink};
use safechat::pipeline::{FailureReason, PipelineResult};

const RULE: &str = "----------------------------------------";

/// Prints a status line for each moderation stage and logs every event at
/// debug level.
#[derive(Debug)]
pub struct ConsoleEventSink {
    log: LoggingEventSink,
}

impl Default for ConsoleEventSink {
    fn default() -> Self {
        Self {
            log: LoggingEventSink::debug(),
        }
    }
}

impl ConsoleEventSink {
    fn status_line(event_type: &str, data: Option<&serde_json::Value>) -> Option<String> {
        let flag = |key: &str| data.and_then(|d| d[key].as_bool()).unwrap_or(false);
        match event_type {
            events::INPUT_CHECKED if flag("passed") => Some("[ok] Input passed moderation".into()),
            events::INPUT_CHECKED => Some("[blocked] Input failed moderation".into()),
            events::COMPLETION_STARTED => Some("[..] Waiting for the model...".into()),
            events::OUTPUT_CHECKED if flag("is_safe") => {
                Some("[ok] Response passed moderation".into())
            }
            events::OUTPUT_CHECKED => {
                Some("[redacted] Response contained flagged content and was redacted".into())
            }
            _ => None,
        }
    }
}

impl EventSink for ConsoleEventSink {
    fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        if let Some(line) = Self::status_line(event_type, data.as_ref()) {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{line}");
        }
        self.log.emit(event_type, data);
    }
}

/// Writes the startup banner.
pub fn banner(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, " SafeChat - moderated single-turn assistant")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Type one message and press Enter.")?;
    writeln!(out)
}

/// Writes the outcome of a run.
pub fn result(out: &mut impl Write, result: &PipelineResult) -> io::Result<()> {
    match result {
        PipelineResult::Completed(verdict) => {
            writeln!(out)?;
            writeln!(out, "{RULE}")?;
            writeln!(out, "{}", verdict.text)?;
            writeln!(out, "{RULE}")
        }
        PipelineResult::Blocked(FailureReason::EmptyInput) => {
            writeln!(out, "{}", FailureReason::EmptyInput)
        }
        PipelineResult::Blocked(FailureReason::Api(error)) => {
            writeln!(out, "Error: {error}")
        }
        PipelineResult::Blocked(reason) => writeln!(out, "{reason}"),
    }
}
