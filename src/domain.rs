//! Core domain types: players, their kinematic state, and immutable event snapshots.

use std::fmt::{Display, Formatter};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};

use crate::error::AnalysisError;
use crate::field::PitchBounds;
use crate::geom::Vec2;

#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, StrumDisplay, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Side {
    Home,
    Away,
}
impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId {
    pub side: Side,
    pub number: u8,
}
impl PlayerId {
    pub fn new(side: Side, number: u8) -> Self {
        Self { side, number }
    }
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} #{}", self.side, self.number)
    }
}

/// Kinematic state of one player at the snapshot frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub goalkeeper: bool,
    pub position: Vec2,
    pub velocity: Vec2,
}
impl PlayerState {
    pub fn new(id: PlayerId, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            goalkeeper: false,
            position,
            velocity,
        }
    }

    pub fn with_goalkeeper(mut self, goalkeeper: bool) -> Self {
        self.goalkeeper = goalkeeper;
        self
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}

/// The full state of play at the frame of a recorded event.
///
/// A snapshot is never edited after construction. Counterfactual variants are built as new values
/// that share nothing mutable with their baseline, so any number of them may be evaluated
/// concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSnapshot {
    event_id: EventId,
    frame: u64,
    ball: Option<Vec2>,
    attacking: Side,
    players: Vec<PlayerState>,
}
impl EventSnapshot {
    pub fn new(
        event_id: EventId,
        frame: u64,
        ball: Option<Vec2>,
        attacking: Side,
        players: Vec<PlayerState>,
    ) -> Result<Self, AnalysisError> {
        if let Some(ball) = ball {
            if !ball.is_finite() {
                return Err(AnalysisError::InvalidSnapshot(format!(
                    "ball position {ball} must be finite"
                )));
            }
        }
        let mut seen = FxHashSet::default();
        for player in &players {
            if !player.position.is_finite() || !player.velocity.is_finite() {
                return Err(AnalysisError::InvalidSnapshot(format!(
                    "player {} must have a finite position and velocity",
                    player.id
                )));
            }
            if !seen.insert(player.id) {
                return Err(AnalysisError::InvalidSnapshot(format!(
                    "player {} appears more than once",
                    player.id
                )));
            }
        }
        Ok(Self {
            event_id,
            frame,
            ball,
            attacking,
            players,
        })
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn ball(&self) -> Option<Vec2> {
        self.ball
    }

    pub fn attacking(&self) -> Side {
        self.attacking
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn side(&self, side: Side) -> impl Iterator<Item = &PlayerState> {
        self.players.iter().filter(move |player| player.id.side == side)
    }

    /// Verifies that every player lies within the tolerated pitch bounds.
    pub fn validate_bounds(&self, bounds: &PitchBounds) -> Result<(), AnalysisError> {
        match self
            .players
            .iter()
            .find(|player| !bounds.contains(player.position))
        {
            None => Ok(()),
            Some(player) => Err(AnalysisError::OutOfBounds {
                player: player.id,
                position: player.position,
            }),
        }
    }

    pub(crate) fn position_of(&self, id: PlayerId) -> Result<usize, AnalysisError> {
        self.players
            .iter()
            .position(|player| player.id == id)
            .ok_or(AnalysisError::PlayerNotFound { player: id })
    }

    pub(crate) fn replacing(&self, index: usize, replacement: PlayerState) -> Self {
        let mut players = self.players.clone();
        players[index] = replacement;
        Self {
            players,
            ..self.clone_header()
        }
    }

    pub(crate) fn removing(&self, index: usize) -> Self {
        let mut players = self.players.clone();
        players.remove(index);
        Self {
            players,
            ..self.clone_header()
        }
    }

    fn clone_header(&self) -> Self {
        Self {
            event_id: self.event_id,
            frame: self.frame,
            ball: self.ball,
            attacking: self.attacking,
            players: vec![],
        }
    }

    /// An exact, order-sensitive encoding of the snapshot, used as a surface cache key.
    pub(crate) fn cache_key(&self) -> Vec<u64> {
        let mut key = Vec::with_capacity(5 + self.players.len() * 6);
        key.push(self.event_id.0);
        key.push(self.frame);
        key.push(self.attacking as u64);
        match self.ball {
            None => key.push(u64::MAX),
            Some(ball) => {
                key.push(ball.x.to_bits());
                key.push(ball.y.to_bits());
            }
        }
        for player in &self.players {
            key.push((player.id.side as u64) << 8 | player.id.number as u64);
            key.push(player.goalkeeper as u64);
            key.push(player.position.x.to_bits());
            key.push(player.position.y.to_bits());
            key.push(player.velocity.x.to_bits());
            key.push(player.velocity.y.to_bits());
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::field::FieldDimensions;

    fn snapshot() -> EventSnapshot {
        EventSnapshot::new(
            EventId(1),
            100,
            Some(Vec2::new(0.0, 0.0)),
            Side::Home,
            vec![
                PlayerState::new(PlayerId::new(Side::Home, 4), Vec2::new(-10.0, 0.0), Vec2::new(1.0, 0.0)),
                PlayerState::new(PlayerId::new(Side::Away, 19), Vec2::new(10.0, 5.0), Vec2::ZERO)
                    .with_goalkeeper(true),
            ],
        )
        .unwrap()
    }

    #[test]
    fn side_from_str() {
        assert_eq!(Side::Home, Side::from_str("home").unwrap());
        assert_eq!(Side::Away, Side::from_str("Away").unwrap());
        assert!(Side::from_str("neutral").is_err());
        assert_eq!("away", Side::Away.to_string());
        assert_eq!(Side::Away, Side::Home.opponent());
    }

    #[test]
    fn player_id_display() {
        assert_eq!("home #4", PlayerId::new(Side::Home, 4).to_string());
    }

    #[test]
    fn lookup() {
        let snapshot = snapshot();
        assert_eq!(2, snapshot.players().len());
        assert!(snapshot.player(PlayerId::new(Side::Away, 19)).unwrap().goalkeeper);
        assert!(snapshot.player(PlayerId::new(Side::Away, 4)).is_none());
        assert_eq!(1, snapshot.side(Side::Home).count());
        assert_eq!(
            Err(AnalysisError::PlayerNotFound {
                player: PlayerId::new(Side::Home, 9)
            }),
            snapshot.position_of(PlayerId::new(Side::Home, 9))
        );
    }

    #[test]
    fn rejects_duplicate_players() {
        let player = PlayerState::new(PlayerId::new(Side::Home, 4), Vec2::ZERO, Vec2::ZERO);
        let result = EventSnapshot::new(EventId(1), 0, None, Side::Home, vec![player.clone(), player]);
        assert_eq!(
            Err(AnalysisError::InvalidSnapshot("player home #4 appears more than once".into())),
            result
        );
    }

    #[test]
    fn rejects_non_finite_state() {
        let player = PlayerState::new(PlayerId::new(Side::Home, 4), Vec2::new(f64::NAN, 0.0), Vec2::ZERO);
        assert!(EventSnapshot::new(EventId(1), 0, None, Side::Home, vec![player]).is_err());
    }

    #[test]
    fn replacing_and_removing_leave_baseline_intact() {
        let baseline = snapshot();
        let moved = PlayerState::new(PlayerId::new(Side::Home, 4), Vec2::new(-5.0, 0.0), Vec2::ZERO);
        let replaced = baseline.replacing(0, moved.clone());
        assert_eq!(&moved, &replaced.players()[0]);
        assert_eq!(Vec2::new(-10.0, 0.0), baseline.players()[0].position);

        let removed = baseline.removing(0);
        assert_eq!(1, removed.players().len());
        assert_eq!(2, baseline.players().len());
        assert_eq!(baseline.frame(), removed.frame());
        assert_eq!(baseline.ball(), removed.ball());
    }

    #[test]
    fn cache_key_is_exact() {
        let baseline = snapshot();
        assert_eq!(baseline.cache_key(), baseline.clone().cache_key());
        let mut player = baseline.players()[0].clone();
        player.velocity.x += 1e-12;
        assert_ne!(baseline.cache_key(), baseline.replacing(0, player).cache_key());
    }

    #[test]
    fn bounds() {
        let bounds = PitchBounds::new(FieldDimensions::new(106.0, 68.0).unwrap(), 5.0);
        assert!(snapshot().validate_bounds(&bounds).is_ok());
        let far = PlayerState::new(PlayerId::new(Side::Home, 4), Vec2::new(60.0, 0.0), Vec2::ZERO);
        assert_eq!(
            Err(AnalysisError::OutOfBounds {
                player: PlayerId::new(Side::Home, 4),
                position: Vec2::new(60.0, 0.0)
            }),
            snapshot().replacing(0, far).validate_bounds(&bounds)
        );
    }
}
