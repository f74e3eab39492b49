//! Testing helpers.

use std::sync::atomic::{AtomicUsize, Ordering};

use assert_float_eq::*;

use crate::control::ControlModel;
use crate::domain::{EventId, EventSnapshot, PlayerId, PlayerState, Side};
use crate::field::{FieldDimensions, FieldGrid};
use crate::geom::Vec2;

pub const HOME_4: PlayerId = PlayerId {
    side: Side::Home,
    number: 4,
};

pub const AWAY_19: PlayerId = PlayerId {
    side: Side::Away,
    number: 19,
};

pub fn player(id: PlayerId, position: (f64, f64), velocity: (f64, f64)) -> PlayerState {
    PlayerState::new(id, position.into(), velocity.into())
}

pub fn snapshot(attacking: Side, ball: Option<(f64, f64)>, players: Vec<PlayerState>) -> EventSnapshot {
    EventSnapshot::new(EventId(1), 0, ball.map(Vec2::from), attacking, players).unwrap()
}

/// A 100x60 m pitch in 2x2 m cells.
pub fn small_grid() -> FieldGrid {
    FieldGrid::new(FieldDimensions::new(100.0, 60.0).unwrap(), 50, 30).unwrap()
}

/// Two stationary players on an otherwise empty pitch: home #4 defends the left half and
/// away #19 attacks from the right.
pub fn duel() -> EventSnapshot {
    snapshot(
        Side::Away,
        None,
        vec![
            player(HOME_4, (-25.0, 0.0), (0.0, 0.0)),
            player(AWAY_19, (25.0, 0.0), (0.0, 0.0)),
        ],
    )
}

/// Wraps a model, counting pointwise evaluations.
#[derive(Debug, Default)]
pub struct CountingModel<M> {
    pub inner: M,
    calls: AtomicUsize,
}
impl<M> CountingModel<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<M: ControlModel> ControlModel for CountingModel<M> {
    fn attacking_control(&self, snapshot: &EventSnapshot, target: Vec2) -> f64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.attacking_control(snapshot, target)
    }
}

pub fn assert_slice_f64_absolute(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_absolute_eq!(expected, actual, epsilon);
        }
    }
}
