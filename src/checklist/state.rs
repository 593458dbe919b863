//! Checklist state machine — tracks where the user is in an inspection pass.

use serde::{Deserialize, Serialize};

/// The states of the checklist conversation.
///
/// One pass runs AwaitingLocation → AwaitingClearance → (AwaitingComment →
/// AwaitingPhoto)? per entry, and ends at Completed, which is transient: the
/// orchestrator relays the report verdict and routes straight back to
/// AwaitingLocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    /// Waiting for the user to pick a location.
    AwaitingLocation,
    /// Waiting for "All clear" or "Leave a comment" on the current entry.
    AwaitingClearance,
    /// Waiting for the comment text on the current entry.
    AwaitingComment,
    /// Waiting for a photo upload (or a skip) on the current entry.
    AwaitingPhoto,
    /// The final entry was answered; the report pipeline runs now.
    Completed,
}

impl FlowState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: FlowState) -> bool {
        use FlowState::*;
        // A start command force-resets the flow from anywhere.
        if target == AwaitingLocation {
            return true;
        }
        matches!(
            (self, target),
            (AwaitingLocation, AwaitingClearance)
                | (AwaitingClearance, AwaitingComment)
                // Advancing to the next entry re-enters clearance.
                | (AwaitingClearance, AwaitingClearance)
                | (AwaitingClearance, Completed)
                | (AwaitingComment, AwaitingPhoto)
                | (AwaitingPhoto, AwaitingClearance)
                | (AwaitingPhoto, Completed)
        )
    }

    /// Whether this state ends the pass.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::AwaitingLocation
    }
}

impl std::fmt::Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AwaitingLocation => "awaiting_location",
            Self::AwaitingClearance => "awaiting_clearance",
            Self::AwaitingComment => "awaiting_comment",
            Self::AwaitingPhoto => "awaiting_photo",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use FlowState::*;
        let transitions = [
            (AwaitingLocation, AwaitingClearance),
            (AwaitingClearance, AwaitingComment),
            (AwaitingClearance, AwaitingClearance),
            (AwaitingClearance, Completed),
            (AwaitingComment, AwaitingPhoto),
            (AwaitingPhoto, AwaitingClearance),
            (AwaitingPhoto, Completed),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn start_resets_from_anywhere() {
        use FlowState::*;
        for state in [
            AwaitingLocation,
            AwaitingClearance,
            AwaitingComment,
            AwaitingPhoto,
            Completed,
        ] {
            assert!(state.can_transition_to(AwaitingLocation));
        }
    }

    #[test]
    fn invalid_transitions() {
        use FlowState::*;
        // Cannot skip the clearance question
        assert!(!AwaitingLocation.can_transition_to(AwaitingComment));
        assert!(!AwaitingLocation.can_transition_to(AwaitingPhoto));
        // Cannot go back mid-entry
        assert!(!AwaitingComment.can_transition_to(AwaitingClearance));
        assert!(!AwaitingPhoto.can_transition_to(AwaitingComment));
        // A comment never completes the pass directly
        assert!(!AwaitingComment.can_transition_to(Completed));
        // Completed only routes back to location selection
        assert!(!Completed.can_transition_to(AwaitingClearance));
    }

    #[test]
    fn is_terminal() {
        use FlowState::*;
        assert!(Completed.is_terminal());
        assert!(!AwaitingLocation.is_terminal());
        assert!(!AwaitingClearance.is_terminal());
        assert!(!AwaitingPhoto.is_terminal());
    }

    #[test]
    fn display_matches_serde() {
        use FlowState::*;
        for state in [
            AwaitingLocation,
            AwaitingClearance,
            AwaitingComment,
            AwaitingPhoto,
            Completed,
        ] {
            let display = format!("{state}");
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }
}
