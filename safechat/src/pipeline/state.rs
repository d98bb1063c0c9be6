//! Pipeline state machine states.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// Where a run currently is.
///
/// Runs move strictly forward through
/// `AwaitingInput → InputCheck → Calling → OutputCheck → Done`;
/// `Failed` is reachable from any non-terminal state and absorbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Waiting for the user's line.
    AwaitingInput,
    /// Screening the raw input.
    InputCheck,
    /// Waiting on the completion endpoint.
    Calling,
    /// Screening the reply.
    OutputCheck,
    /// Result ready for display.
    Done,
    /// Stopped early; the reason travels with the result.
    Failed,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::AwaitingInput
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingInput => write!(f, "awaiting_input"),
            Self::InputCheck => write!(f, "input_check"),
            Self::Calling => write!(f, "calling"),
            Self::OutputCheck => write!(f, "output_check"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl PipelineState {
    /// Returns true if no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// The state that follows this one on the success path.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::AwaitingInput => Some(Self::InputCheck),
            Self::InputCheck => Some(Self::Calling),
            Self::Calling => Some(Self::OutputCheck),
            Self::OutputCheck => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Whether moving from `self` to `to` is a legal transition.
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Failed || self.next() == Some(to)
    }
}

/// Current state of one run. Only legal transitions are applied.
#[derive(Debug, Default)]
pub(crate) struct StateTracker {
    current: PipelineState,
}

impl StateTracker {
    pub(crate) fn current(&self) -> PipelineState {
        self.current
    }

    /// Moves to `to` if [`PipelineState::can_transition_to`] allows it.
    ///
    /// Returns false, leaving the state untouched, otherwise.
    pub(crate) fn advance(&mut self, to: PipelineState) -> bool {
        if !self.current.can_transition_to(to) {
            error!(from = %self.current, to = %to, "Illegal pipeline transition");
            return false;
        }
        self.current = to;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::AwaitingInput.to_string(), "awaiting_input");
        assert_eq!(PipelineState::OutputCheck.to_string(), "output_check");
        assert_eq!(PipelineState::Failed.to_string(), "failed");
    }

    #[test]
    fn test_success_path_is_linear() {
        let mut state = PipelineState::default();
        let mut visited = vec![state];
        while let Some(next) = state.next() {
            assert!(state.can_transition_to(next));
            state = next;
            visited.push(state);
        }

        assert_eq!(
            visited,
            vec![
                PipelineState::AwaitingInput,
                PipelineState::InputCheck,
                PipelineState::Calling,
                PipelineState::OutputCheck,
                PipelineState::Done,
            ]
        );
    }

    #[test]
    fn test_failed_reachable_and_absorbing() {
        assert!(PipelineState::AwaitingInput.can_transition_to(PipelineState::Failed));
        assert!(PipelineState::Calling.can_transition_to(PipelineState::Failed));
        assert!(!PipelineState::Failed.can_transition_to(PipelineState::Done));
        assert!(!PipelineState::Done.can_transition_to(PipelineState::Failed));
        assert!(!PipelineState::InputCheck.can_transition_to(PipelineState::OutputCheck));
    }

    #[test]
    fn test_tracker_rejects_illegal_transitions() {
        let mut tracker = StateTracker::default();

        assert!(!tracker.advance(PipelineState::Calling));
        assert_eq!(tracker.current(), PipelineState::AwaitingInput);

        assert!(tracker.advance(PipelineState::InputCheck));
        assert!(tracker.advance(PipelineState::Failed));
        assert!(!tracker.advance(PipelineState::Calling));
        assert_eq!(tracker.current(), PipelineState::Failed);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&PipelineState::InputCheck).unwrap();
        assert_eq!(json, "\"input_check\"");
    }
}
