//! Game layer on top of the spin engine: modes, scoring, history.
//!
//! Observes settled results only; nothing here feeds back into the engine.

pub mod score;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use score::{Award, HistoryEntry, ScoreKeeper};

/// How spins are scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// One point per spin
    #[default]
    Random,
    /// One point per spin; hosts typically pin a category filter
    Learning,
    /// Bonus for landing on a category not seen recently
    Challenge,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Random => "random",
            Self::Learning => "learning",
            Self::Challenge => "challenge",
        };
        f.write_str(name)
    }
}

/// Unknown game mode name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown game mode '{0}' (expected random, learning or challenge)")]
pub struct ParseGameModeError(pub String);

impl FromStr for GameMode {
    type Err = ParseGameModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "learning" => Ok(Self::Learning),
            "challenge" => Ok(Self::Challenge),
            _ => Err(ParseGameModeError(s.to_string())),
        }
    }
}
