//! Denylist matching and redaction.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::SafechatError;

/// Placeholder substituted for every matched term.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Terms screened when no custom list is supplied.
pub const DEFAULT_TERMS: &[&str] = &[
    "hack",
    "exploit",
    "malware",
    "violence",
    "kill",
    "murder",
    "bomb",
    "weapon",
    "terrorist",
    "drugs",
    "suicide",
    "rape",
];

/// Outcome of screening a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    /// False iff at least one term occurred in the original text.
    pub is_safe: bool,
    /// The input with every occurrence of every term redacted.
    pub text: String,
    /// Terms that matched, in denylist order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_terms: Vec<String>,
}

impl ModerationVerdict {
    /// Creates a verdict for text that matched nothing.
    #[must_use]
    pub fn safe(text: impl Into<String>) -> Self {
        Self {
            is_safe: true,
            text: text.into(),
            matched_terms: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Term {
    lowered: String,
    matcher: Regex,
}

/// An immutable, ordered set of case-insensitive banned terms.
///
/// Matching is plain substring matching after Unicode simple case folding.
/// There is no word-boundary logic, so "scrapbook" is caught by "rape".
/// [`Denylist::contains_banned`] and [`Denylist::moderate`] share the same
/// matchers and always agree on whether a text is safe.
#[derive(Debug, Clone)]
pub struct Denylist {
    terms: Vec<Term>,
}

impl Denylist {
    /// Builds a denylist from `terms`.
    ///
    /// Blank terms are ignored and duplicates (after case folding) keep their
    /// first position.
    pub fn new<I, S>(terms: I) -> Result<Self, SafechatError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled: Vec<Term> = Vec::new();
        for term in terms {
            let lowered = term.as_ref().trim().to_lowercase();
            if lowered.is_empty() || compiled.iter().any(|t| t.lowered == lowered) {
                continue;
            }
            let matcher = RegexBuilder::new(&regex::escape(&lowered))
                .case_insensitive(true)
                .build()
                .map_err(|e| SafechatError::InvalidTerm {
                    term: lowered.clone(),
                    reason: e.to_string(),
                })?;
            compiled.push(Term { lowered, matcher });
        }
        Ok(Self { terms: compiled })
    }

    /// Returns the configured terms, lower-cased.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.lowered.as_str())
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the list has no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns true if any term occurs in `text`, ignoring case.
    #[must_use]
    pub fn contains_banned(&self, text: &str) -> bool {
        self.terms.iter().any(|term| term.matcher.is_match(text))
    }

    /// Screens `text`, redacting every occurrence of every term.
    #[must_use]
    pub fn moderate(&self, text: &str) -> ModerationVerdict {
        let mut redacted = text.to_string();
        let mut matched_terms = Vec::new();

        for term in &self.terms {
            if !term.matcher.is_match(text) {
                continue;
            }
            matched_terms.push(term.lowered.clone());
            redacted = term
                .matcher
                .replace_all(&redacted, REDACTION_MARKER)
                .into_owned();
        }

        ModerationVerdict {
            is_safe: matched_terms.is_empty(),
            text: redacted,
            matched_terms,
        }
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self::new(DEFAULT_TERMS.iter().copied()).unwrap_or_else(|e| {
            error!(error = %e, "Default denylist failed to compile; screening disabled");
            Self { terms: Vec::new() }
        })
    }
}
