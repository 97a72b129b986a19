//! Connection state machine

use crate::{Error, Result};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Stream open, nothing sent yet
    Initial,

    /// Authentication line sent, awaiting the status line
    Authenticating,

    /// Idle (ready for query)
    Idle,

    /// Query sent, awaiting the response line
    QueryInProgress,

    /// Closed
    Closed,
}

impl ConnectionState {
    /// Check if transition is valid
    pub fn can_transition_to(&self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        matches!(
            (self, next),
            (Initial, Authenticating)
                | (Authenticating, Idle)
                | (Idle, QueryInProgress)
                | (QueryInProgress, Idle)
                | (_, Closed)
        )
    }

    /// Transition to new state
    pub fn transition(&mut self, next: ConnectionState) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(Error::InvalidState {
                expected: format!("valid transition from {}", self),
                actual: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::Idle => write!(f, "idle"),
            Self::QueryInProgress => write!(f, "query_in_progress"),
            Self::Closed => write!(f, "closed"),
        }
    }
}
