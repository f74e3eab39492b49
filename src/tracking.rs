//! Read-only access to pre-loaded tracking data: one kinematic snapshot per event.

use std::path::Path;

use anyhow::Context;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::domain::{EventId, EventSnapshot, PlayerId, PlayerState, Side};
use crate::error::AnalysisError;
use crate::field::FieldDimensions;
use crate::geom::Vec2;

/// The accessor the analysis core consumes. Implementations are free to source data from anywhere,
/// as long as snapshots are complete at the event's frame.
pub trait TrackingSource {
    fn snapshot(&self, event_id: EventId) -> Result<EventSnapshot, AnalysisError>;

    fn field_dimensions(&self) -> FieldDimensions;

    fn goalkeeper_numbers(&self, side: Side) -> FxHashSet<u8>;
}

/// A player row at the event frame. Players off the pitch have no position; a missing velocity is
/// read as stationary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub side: Side,
    pub number: u8,
    pub position: Option<Vec2>,
    #[serde(default)]
    pub velocity: Option<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub frame: u64,
    pub attacking: Side,
    #[serde(default)]
    pub ball: Option<Vec2>,
    pub players: Vec<PlayerRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goalkeepers {
    #[serde(default)]
    pub home: Vec<u8>,
    #[serde(default)]
    pub away: Vec<u8>,
}

/// On-disk layout of a tracking file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingFile {
    #[serde(default)]
    pub field: FieldDimensions,
    #[serde(default)]
    pub goalkeepers: Goalkeepers,
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Clone)]
pub struct TrackingData {
    field: FieldDimensions,
    goalkeepers: Goalkeepers,
    events: FxHashMap<EventId, EventRecord>,
}
impl TrackingData {
    pub fn read_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let tracking_file: TrackingFile = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(tracking_file.into())
    }

    pub fn events(&self) -> impl Iterator<Item = EventId> + '_ {
        self.events.keys().copied()
    }
}

impl From<TrackingFile> for TrackingData {
    fn from(file: TrackingFile) -> Self {
        Self {
            field: file.field,
            goalkeepers: file.goalkeepers,
            events: file.events.into_iter().map(|event| (event.id, event)).collect(),
        }
    }
}

impl TrackingSource for TrackingData {
    fn snapshot(&self, event_id: EventId) -> Result<EventSnapshot, AnalysisError> {
        let record = self
            .events
            .get(&event_id)
            .ok_or(AnalysisError::UnknownEvent(event_id))?;
        let home_keepers = self.goalkeeper_numbers(Side::Home);
        let away_keepers = self.goalkeeper_numbers(Side::Away);
        let players = record
            .players
            .iter()
            .filter_map(|player| {
                let position = player.position?;
                let keepers = match player.side {
                    Side::Home => &home_keepers,
                    Side::Away => &away_keepers,
                };
                Some(
                    PlayerState::new(
                        PlayerId::new(player.side, player.number),
                        position,
                        player.velocity.unwrap_or_default(),
                    )
                    .with_goalkeeper(keepers.contains(&player.number)),
                )
            })
            .collect();
        EventSnapshot::new(record.id, record.frame, record.ball, record.attacking, players)
    }

    fn field_dimensions(&self) -> FieldDimensions {
        self.field
    }

    fn goalkeeper_numbers(&self, side: Side) -> FxHashSet<u8> {
        let numbers = match side {
            Side::Home => &self.goalkeepers.home,
            Side::Away => &self.goalkeepers.away,
        };
        numbers.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "field": { "length": 106.0, "width": 68.0 },
        "goalkeepers": { "home": [11], "away": [25] },
        "events": [
            {
                "id": 820,
                "frame": 53049,
                "attacking": "away",
                "ball": { "x": 10.0, "y": -5.0 },
                "players": [
                    { "side": "home", "number": 11, "position": { "x": -50.0, "y": 0.0 } },
                    { "side": "home", "number": 4, "position": { "x": -20.0, "y": 3.0 }, "velocity": { "x": -1.5, "y": 0.5 } },
                    { "side": "home", "number": 14, "position": null },
                    { "side": "away", "number": 19, "position": { "x": 15.0, "y": -20.0 }, "velocity": { "x": 2.0, "y": 1.0 } }
                ]
            }
        ]
    }"#;

    fn tracking() -> TrackingData {
        let file: TrackingFile = serde_json::from_str(SAMPLE).unwrap();
        file.into()
    }

    #[test]
    fn snapshot() {
        let tracking = tracking();
        let snapshot = tracking.snapshot(EventId(820)).unwrap();
        assert_eq!(53049, snapshot.frame());
        assert_eq!(Side::Away, snapshot.attacking());
        assert_eq!(Some(Vec2::new(10.0, -5.0)), snapshot.ball());
        assert_eq!(3, snapshot.players().len());

        let keeper = snapshot.player(PlayerId::new(Side::Home, 11)).unwrap();
        assert!(keeper.goalkeeper);
        assert_eq!(Vec2::ZERO, keeper.velocity);

        let defender = snapshot.player(PlayerId::new(Side::Home, 4)).unwrap();
        assert!(!defender.goalkeeper);
        assert_eq!(Vec2::new(-1.5, 0.5), defender.velocity);

        assert!(snapshot.player(PlayerId::new(Side::Home, 14)).is_none());
    }

    #[test]
    fn unknown_event() {
        assert_eq!(
            Err(AnalysisError::UnknownEvent(EventId(1))),
            tracking().snapshot(EventId(1))
        );
    }

    #[test]
    fn accessors() {
        let tracking = tracking();
        assert_eq!(FieldDimensions::new(106.0, 68.0).unwrap(), tracking.field_dimensions());
        assert!(tracking.goalkeeper_numbers(Side::Away).contains(&25));
        assert_eq!(vec![EventId(820)], tracking.events().collect::<Vec<_>>());
    }
}
