//! Run-loop state.
//!
//! A component alternates between two states:
//!
//! ```text
//! Idle ──run() pops a message──▶ Processing
//!  ▲                                 │
//!  └────── handler returns ──────────┘
//! ```
//!
//! `run()` on an empty queue stays `Idle` and reports
//! [`ComponentBlocked`](crate::ComponentError::ComponentBlocked).

use serde::{Deserialize, Serialize};

/// Component execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Waiting for the next `run()` call.
    #[default]
    Idle,

    /// Dispatching a message.
    Processing,
}

impl Status {
    /// Returns `true` when no message is being dispatched.
    #[must_use]
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` while a message is being dispatched.
    #[must_use]
    pub fn is_processing(self) -> bool {
        matches!(self, Self::Processing)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Processing => write!(f, "processing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(Status::default(), Status::Idle);
        assert!(Status::Idle.is_idle());
        assert!(Status::Processing.is_processing());
        assert!(!Status::Processing.is_idle());
    }

    #[test]
    fn serde_snake_case() {
        let json = serde_json::to_string(&Status::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let back: Status = serde_json::from_str("\"idle\"").unwrap();
        assert_eq!(back, Status::Idle);
    }
}
