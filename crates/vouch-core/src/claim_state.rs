use std::fmt;

use crate::error::CoreError;

/// Ledger-side status of a claim id.
///
/// A claim id the ledger has never seen has no state at all; the first
/// recorded state is `Issued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ClaimState {
    /// Recorded on the ledger and currently valid.
    Issued,
    /// Permanently revoked. Final state.
    Revoked,
}

impl ClaimState {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    /// Whether a claim in this state passes the ledger validity check.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Issued)
    }
}

impl fmt::Display for ClaimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issued => write!(f, "Issued"),
            Self::Revoked => write!(f, "Revoked"),
        }
    }
}

/// Events that move a claim through its ledger lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimEvent {
    /// The issuer records the claim.
    Issue,
    /// The issuer revokes the claim.
    Revoke,
}

/// Ledger claim transitions.
///
/// Valid transitions:
/// - (none) → Issued (Issue)
/// - Issued → Revoked (Revoke)
///
/// Revocation never reverses, and a claim id is recorded at most once.
pub struct ClaimStateMachine;

impl ClaimStateMachine {
    /// Apply `event` to `current` (`None` for an id the ledger has not seen).
    pub fn transition(
        current: Option<ClaimState>,
        event: ClaimEvent,
    ) -> Result<ClaimState, CoreError> {
        let new_state = match (current, event) {
            (None, ClaimEvent::Issue) => ClaimState::Issued,
            (Some(ClaimState::Issued), ClaimEvent::Revoke) => ClaimState::Revoked,
            (Some(from), event) => {
                return Err(CoreError::InvalidStateTransition {
                    from,
                    to: Self::target(event),
                });
            }
            (None, ClaimEvent::Revoke) => {
                return Err(CoreError::ValidationError(
                    "cannot revoke a claim that was never issued".into(),
                ));
            }
        };

        tracing::debug!(
            from = ?current,
            to = %new_state,
            event = ?event,
            "claim state transition"
        );

        Ok(new_state)
    }

    pub fn can_transition(current: Option<ClaimState>, event: ClaimEvent) -> bool {
        Self::transition(current, event).is_ok()
    }

    fn target(event: ClaimEvent) -> ClaimState {
        match event {
            ClaimEvent::Issue => ClaimState::Issued,
            ClaimEvent::Revoke => ClaimState::Revoked,
        }
    }
}
