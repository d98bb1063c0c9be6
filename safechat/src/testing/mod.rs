//! Deterministic fakes for the pipeline's seams.
//!
//! Shared by the unit tests and the end-to-end runs in `pipeline::integration_tests`.

mod mocks;

pub use mocks::{FakeTransport, RecordingCompleter, ScriptedLineReader};
