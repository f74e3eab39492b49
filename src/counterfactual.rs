//! Generation of counterfactual snapshots: a baseline snapshot with exactly one player's state
//! altered or removed.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{EventSnapshot, PlayerId, PlayerState};
use crate::error::AnalysisError;
use crate::field::PitchBounds;
use crate::geom::Vec2;

/// A hypothetical change to one player's state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modification {
    /// Replaces the velocity, holding the position. A zero velocity asks "what if they had not moved?".
    Movement { velocity: Vec2 },

    /// Removes the player, measuring the space they occupy.
    Presence,

    /// Shifts the position by a relative offset, holding the velocity.
    Location { offset: Vec2 },

    /// Places the player at an absolute position with a new velocity.
    Relocation { position: Vec2, velocity: Vec2 },
}
impl Modification {
    pub fn stationary() -> Self {
        Modification::Movement { velocity: Vec2::ZERO }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            Modification::Movement { .. } => ModeKind::Movement,
            Modification::Presence => ModeKind::Presence,
            Modification::Location { .. } => ModeKind::Location,
            Modification::Relocation { .. } => ModeKind::Relocation,
        }
    }

    /// The modified state of `player`, or `None` if the player is removed.
    pub fn apply(&self, player: &PlayerState) -> Option<PlayerState> {
        let modified = match *self {
            Modification::Movement { velocity } => PlayerState {
                velocity,
                ..player.clone()
            },
            Modification::Presence => return None,
            Modification::Location { offset } => PlayerState {
                position: player.position + offset,
                ..player.clone()
            },
            Modification::Relocation { position, velocity } => PlayerState {
                position,
                velocity,
                ..player.clone()
            },
        };
        Some(modified)
    }
}

/// The name of a [`Modification`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Movement,
    Presence,
    Location,
    Relocation,
}

impl FromStr for ModeKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movement" => Ok(ModeKind::Movement),
            "presence" => Ok(ModeKind::Presence),
            "location" => Ok(ModeKind::Location),
            "relocation" | "movement+location" => Ok(ModeKind::Relocation),
            _ => Err(AnalysisError::UnknownMode(s.into())),
        }
    }
}

impl Display for ModeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModeKind::Movement => "movement",
            ModeKind::Presence => "presence",
            ModeKind::Location => "location",
            ModeKind::Relocation => "relocation",
        };
        write!(f, "{name}")
    }
}

/// Builds a new snapshot from `baseline` with `player` modified. The baseline is never touched.
pub fn generate(
    baseline: &EventSnapshot,
    player: PlayerId,
    modification: &Modification,
    bounds: &PitchBounds,
) -> Result<EventSnapshot, AnalysisError> {
    let index = baseline.position_of(player)?;
    match modification.apply(&baseline.players()[index]) {
        None => Ok(baseline.removing(index)),
        Some(modified) => {
            if !modified.position.is_finite() || !modified.velocity.is_finite() {
                return Err(AnalysisError::InvalidSnapshot(format!(
                    "modified state of player {player} must be finite"
                )));
            }
            if !bounds.contains(modified.position) {
                return Err(AnalysisError::OutOfBounds {
                    player,
                    position: modified.position,
                });
            }
            Ok(baseline.replacing(index, modified))
        }
    }
}
