//! The public face of the crate: space created by a single player's positioning and movement.
//!
//! An [`Analysis`] is a session over one event. It holds the immutable baseline snapshot and
//! evaluates its surface at most once; every counterfactual is a throwaway snapshot, differenced
//! against the baseline and then dropped. An [`Analyst`] binds a tracking source and a control model
//! and opens sessions by event id.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::control::ControlModel;
use crate::counterfactual::{generate, Modification};
use crate::difference::{difference, Difference};
use crate::domain::{EventId, EventSnapshot, PlayerId};
use crate::error::AnalysisError;
use crate::evaluate::{evaluate, SurfaceCache};
use crate::field::{FieldGrid, PitchBounds};
use crate::optimizer::{optimize, OptimizationResult, SearchConfig};
use crate::surface::Surface;
use crate::tracking::TrackingSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Grid columns along the length of the pitch; rows follow from the aspect ratio.
    pub cells_x: usize,

    /// How far beyond the lines, in metres, a player may stand.
    pub bounds_tolerance: f64,
}
impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.cells_x == 0 {
            return Err(AnalysisError::InvalidGrid("at least one grid column must be specified".into()));
        }
        if !(self.bounds_tolerance.is_finite() && self.bounds_tolerance >= 0.0) {
            return Err(AnalysisError::InvalidGrid("bounds tolerance must be non-negative".into()));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cells_x: 50,
            bounds_tolerance: 5.0,
        }
    }
}

pub struct Analysis<'m, M: ControlModel + ?Sized> {
    model: &'m M,
    grid: FieldGrid,
    bounds: PitchBounds,
    baseline: EventSnapshot,
    baseline_surface: OnceLock<Surface>,
}
impl<'m, M: ControlModel + ?Sized> Analysis<'m, M> {
    pub fn new(
        model: &'m M,
        baseline: EventSnapshot,
        grid: FieldGrid,
        bounds_tolerance: f64,
    ) -> Result<Self, AnalysisError> {
        let bounds = PitchBounds::new(grid.dimensions(), bounds_tolerance);
        baseline.validate_bounds(&bounds)?;
        Ok(Self {
            model,
            grid,
            bounds,
            baseline,
            baseline_surface: OnceLock::new(),
        })
    }

    pub fn baseline(&self) -> &EventSnapshot {
        &self.baseline
    }

    pub fn grid(&self) -> &FieldGrid {
        &self.grid
    }

    pub fn bounds(&self) -> &PitchBounds {
        &self.bounds
    }

    /// The attacking team's control over the grid at the recorded moment.
    pub fn baseline_surface(&self) -> &Surface {
        self.baseline_surface
            .get_or_init(|| evaluate(self.model, &self.baseline, &self.grid))
    }

    pub fn counterfactual(
        &self,
        player: PlayerId,
        modification: &Modification,
    ) -> Result<EventSnapshot, AnalysisError> {
        generate(&self.baseline, player, modification, &self.bounds)
    }

    /// Space created for `player`'s team by `modification`, in m². Positive when the hypothetical
    /// state would give the team more control than it actually had.
    pub fn space_created(&self, player: PlayerId, modification: &Modification) -> Result<f64, AnalysisError> {
        Ok(self.difference(player, modification)?.space_created)
    }

    pub fn difference(&self, player: PlayerId, modification: &Modification) -> Result<Difference, AnalysisError> {
        let counterfactual = self.counterfactual(player, modification)?;
        let surface = evaluate(self.model, &counterfactual, &self.grid);
        Ok(self.difference_from(&surface, player))
    }

    /// Space the player occupies: the control their team would lose without them, as a
    /// non-negative figure for any model where removing a player cannot help their own team.
    pub fn space_occupied(&self, player: PlayerId) -> Result<f64, AnalysisError> {
        Ok(-self.space_created(player, &Modification::Presence)?)
    }

    pub fn optimize(&self, player: PlayerId, config: &SearchConfig) -> Result<OptimizationResult, AnalysisError> {
        optimize(self, player, config)
    }

    pub(crate) fn space_created_cached(
        &self,
        cache: &mut SurfaceCache,
        player: PlayerId,
        modification: &Modification,
    ) -> Result<f64, AnalysisError> {
        let counterfactual = self.counterfactual(player, modification)?;
        let surface = cache.evaluate(self.model, &counterfactual, &self.grid);
        Ok(self.difference_from(&surface, player).space_created)
    }

    /// Space created by each of a batch of counterfactuals of `player`, evaluated in parallel.
    pub(crate) fn space_created_all(
        &self,
        cache: &mut SurfaceCache,
        player: PlayerId,
        counterfactuals: &[EventSnapshot],
    ) -> Vec<f64> {
        cache
            .evaluate_all(self.model, counterfactuals, &self.grid)
            .iter()
            .map(|surface| self.difference_from(surface, player).space_created)
            .collect()
    }

    fn difference_from(&self, counterfactual: &Surface, player: PlayerId) -> Difference {
        difference(
            self.baseline_surface(),
            counterfactual,
            &self.grid,
            player.side,
            self.baseline.attacking(),
        )
    }
}

/// Opens analysis sessions over a tracking source and answers one-off questions by event id.
pub struct Analyst<'a, S: TrackingSource + ?Sized, M: ControlModel + ?Sized> {
    source: &'a S,
    model: &'a M,
    config: AnalysisConfig,
}
impl<'a, S: TrackingSource + ?Sized, M: ControlModel + ?Sized> Analyst<'a, S, M> {
    pub fn new(source: &'a S, model: &'a M, config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { source, model, config })
    }

    pub fn session(&self, event_id: EventId) -> Result<Analysis<'a, M>, AnalysisError> {
        let baseline = self.source.snapshot(event_id)?;
        let grid = FieldGrid::with_cells_x(self.source.field_dimensions(), self.config.cells_x)?;
        Analysis::new(self.model, baseline, grid, self.config.bounds_tolerance)
    }

    pub fn calculate_space_created(
        &self,
        event_id: EventId,
        player: PlayerId,
        modification: &Modification,
    ) -> Result<f64, AnalysisError> {
        self.session(event_id)?.space_created(player, modification)
    }

    pub fn pitch_control_difference(
        &self,
        event_id: EventId,
        player: PlayerId,
        modification: &Modification,
    ) -> Result<Difference, AnalysisError> {
        self.session(event_id)?.difference(player, modification)
    }

    pub fn optimize_positioning(
        &self,
        event_id: EventId,
        player: PlayerId,
        config: &SearchConfig,
    ) -> Result<OptimizationResult, AnalysisError> {
        self.session(event_id)?.optimize(player, config)
    }
}
