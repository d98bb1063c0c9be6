//! Content screening against a fixed denylist.
//!
//! User input is blocked outright when [`Denylist::contains_banned`] fires;
//! model output is passed through [`Denylist::moderate`] and shown redacted.

mod denylist;

pub use denylist::{Denylist, ModerationVerdict, DEFAULT_TERMS, REDACTION_MARKER};
