//! Fake transports, completers and line readers.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::client::{Completer, HttpRequest, HttpResponse, HttpTransport};
use crate::errors::ApiError;
use crate::io::LineReader;

/// An [`HttpTransport`] that records requests and returns a canned outcome.
#[derive(Debug)]
pub struct FakeTransport {
    outcome: Mutex<Result<HttpResponse, ApiError>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    /// Creates a transport that always answers with `response`.
    #[must_use]
    pub fn responding(response: HttpResponse) -> Self {
        Self {
            outcome: Mutex::new(Ok(response)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a transport that always fails with `error`.
    #[must_use]
    pub fn failing(error: ApiError) -> Self {
        Self {
            outcome: Mutex::new(Err(error)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns the recorded requests.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Returns the number of requests sent.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().push(request);
        self.outcome.lock().clone()
    }
}

/// A [`Completer`] that records every message it is asked to complete.
#[derive(Debug)]
pub struct RecordingCompleter {
    outcome: Mutex<Result<String, ApiError>>,
    calls: Mutex<Vec<String>>,
}

impl RecordingCompleter {
    /// Creates a completer that always replies with `reply`.
    #[must_use]
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            outcome: Mutex::new(Ok(reply.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a completer that always fails with `error`.
    #[must_use]
    pub fn failing(error: ApiError) -> Self {
        Self {
            outcome: Mutex::new(Err(error)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns the messages received, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Returns the number of times the completer was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Completer for RecordingCompleter {
    async fn complete(&self, user_message: &str) -> Result<String, ApiError> {
        self.calls.lock().push(user_message.to_string());
        self.outcome.lock().clone()
    }
}

/// A [`LineReader`] that replays scripted lines and tracks closing.
#[derive(Debug, Default)]
pub struct ScriptedLineReader {
    lines: VecDeque<String>,
    error: Option<String>,
    prompts: Vec<String>,
    closed: bool,
}

impl ScriptedLineReader {
    /// Creates a reader yielding `lines`, then end of input.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Creates a reader whose first read fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Prompts shown so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.clone()
    }

    /// Whether [`LineReader::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl LineReader for ScriptedLineReader {
    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        if self.closed {
            return Ok(None);
        }
        self.prompts.push(prompt.to_string());
        if let Some(message) = self.error.take() {
            return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, message));
        }
        Ok(self.lines.pop_front())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
