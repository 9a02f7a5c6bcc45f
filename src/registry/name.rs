/*!
 * Signal Names
 * The fixed set of milestones in the launch handshake
 */

use crate::core::errors::SignalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Milestone reported by the launcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalName {
    /// The environment's loader is available; carries the loader handle
    LoaderReady,
    /// The player has entered the world
    PlayerJoined,
    /// The client window has been closed
    GameClosed,
}

impl SignalName {
    pub const ALL: [SignalName; 3] = [
        SignalName::LoaderReady,
        SignalName::PlayerJoined,
        SignalName::GameClosed,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LoaderReady => "loader-ready",
            Self::PlayerJoined => "player-joined",
            Self::GameClosed => "game-closed",
        }
    }

    /// Whether completing this signal requires a payload
    pub const fn carries_payload(&self) -> bool {
        matches!(self, Self::LoaderReady)
    }
}

impl fmt::Display for SignalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalName {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| SignalError::UnknownSignal(s.to_string()))
    }
}
