use serde::{Deserialize, Serialize};
use std::fmt;

/// Health of the link to the backend, as observed around each outbound call.
///
/// `Idle` only appears before the first call. After that the value cycles
/// `Connecting -> {Connected, Error} -> Connecting -> ...` with no terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    /// True while a request is on the wire.
    pub fn is_pending(self) -> bool {
        matches!(self, ConnectionState::Connecting)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "idle"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(ConnectionState::default(), ConnectionState::Idle);
    }

    #[test]
    fn test_display_and_serialization_agree() {
        for state in [
            ConnectionState::Idle,
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Error,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state));
        }
    }

    #[test]
    fn test_only_connecting_is_pending() {
        assert!(ConnectionState::Connecting.is_pending());
        assert!(!ConnectionState::Connected.is_pending());
        assert!(!ConnectionState::Error.is_pending());
        assert!(!ConnectionState::Idle.is_pending());
    }
}
