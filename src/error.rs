use thiserror::Error;

use crate::domain::{EventId, PlayerId};
use crate::geom::Vec2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("player {player} is not in the snapshot")]
    PlayerNotFound { player: PlayerId },

    #[error("unknown event {0}")]
    UnknownEvent(EventId),

    #[error("unknown mode '{0}'")]
    UnknownMode(String),

    #[error("position {position} of player {player} is outside the tolerated pitch bounds")]
    OutOfBounds { player: PlayerId, position: Vec2 },

    #[error("invalid search config: {0}")]
    InvalidSearchConfig(String),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("invalid model params: {0}")]
    InvalidParams(String),
}
