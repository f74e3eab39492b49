//! Search for the position and velocity that would have created the most space for a player.
//!
//! The search runs in two stages over a fixed trial budget:
//!
//! 1. **Location.** Cell centres of a coarse grid, optionally limited to a disc around the player's
//!    recorded position, are sampled without replacement and scored with the player moved there at
//!    their recorded velocity. Candidates are independent and are evaluated in parallel.
//! 2. **Velocity.** At the best location (or the recorded one, when location search is disabled), a
//!    [`Maximizer`](crate::opt::Maximizer) proposes velocity vectors within a disc of radius
//!    `max_velocity`, each scored with the player relocated to that spot at that velocity.
//!
//! Every trial is kept, in evaluation order, so that results are reproducible for a given seed.

use serde::{Deserialize, Serialize};
use tinyrand::{Rand, Seeded, StdRand};
use tracing::debug;

use crate::analysis::Analysis;
use crate::control::ControlModel;
use crate::counterfactual::Modification;
use crate::domain::{PlayerId, PlayerState};
use crate::error::AnalysisError;
use crate::evaluate::{CacheStats, SurfaceCache};
use crate::field::FieldGrid;
use crate::geom::Vec2;
use crate::opt::{maximize, Disc, Strategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Columns of the coarse location grid; 0 disables location search.
    pub grid_size: usize,

    /// Number of candidate locations to try; 0 disables location search.
    pub location_trials: usize,

    /// Number of candidate velocities to try.
    pub velocity_trials: usize,

    /// Upper bound on the speed of candidate velocities, in m/s.
    pub max_velocity: f64,

    /// If set, candidate locations lie within this distance of the recorded position, in metres.
    pub max_distance: Option<f64>,

    pub strategy: Strategy,
    pub seed: u64,
}
impl SearchConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.velocity_trials == 0 {
            return Err(AnalysisError::InvalidSearchConfig(
                "at least one velocity trial must be specified".into(),
            ));
        }
        if !(self.max_velocity.is_finite() && self.max_velocity > 0.0) {
            return Err(AnalysisError::InvalidSearchConfig(format!(
                "max velocity must be positive, got {}",
                self.max_velocity
            )));
        }
        if let Some(max_distance) = self.max_distance {
            if !(max_distance > 0.0) {
                return Err(AnalysisError::InvalidSearchConfig(format!(
                    "max distance must be positive, got {max_distance}"
                )));
            }
        }
        Ok(())
    }

    pub fn searches_location(&self) -> bool {
        self.grid_size > 0 && self.location_trials > 0
    }

    pub fn total_trials(&self) -> usize {
        let location_trials = if self.searches_location() { self.location_trials } else { 0 };
        location_trials + self.velocity_trials
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            location_trials: 100,
            velocity_trials: 25,
            max_velocity: 5.0,
            max_distance: None,
            strategy: Strategy::default(),
            seed: 0x5eed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Location,
    Velocity,
}

/// One evaluation of the objective: a candidate state for the player and the space it creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub stage: Stage,
    pub position: Vec2,
    pub velocity: Vec2,
    pub space_created: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// The player as recorded.
    pub baseline: PlayerState,

    /// The highest-scoring trial; the earliest one in case of a tie.
    pub best: Trial,

    /// All trials in evaluation order.
    pub history: Vec<Trial>,

    pub cache_stats: CacheStats,
}
impl OptimizationResult {
    /// The best candidate as a full player state.
    pub fn best_state(&self) -> PlayerState {
        PlayerState {
            position: self.best.position,
            velocity: self.best.velocity,
            ..self.baseline.clone()
        }
    }
}

pub fn optimize<M: ControlModel + ?Sized>(
    analysis: &Analysis<M>,
    player: PlayerId,
    config: &SearchConfig,
) -> Result<OptimizationResult, AnalysisError> {
    config.validate()?;
    let baseline = analysis
        .baseline()
        .player(player)
        .cloned()
        .ok_or(AnalysisError::PlayerNotFound { player })?;

    let mut cache = SurfaceCache::default();
    let mut history = Vec::with_capacity(config.total_trials());

    let mut anchor = baseline.position;
    if config.searches_location() {
        let candidates = sample_locations(analysis, &baseline, config)?;
        debug!("location stage: {} candidates for {player}", candidates.len());
        let counterfactuals = candidates
            .iter()
            .map(|&position| {
                analysis.counterfactual(
                    player,
                    &Modification::Location {
                        offset: position - baseline.position,
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let scores = analysis.space_created_all(&mut cache, player, &counterfactuals);
        for (counterfactual, space_created) in counterfactuals.iter().zip(scores) {
            let moved = counterfactual
                .player(player)
                .ok_or(AnalysisError::PlayerNotFound { player })?;
            history.push(Trial {
                stage: Stage::Location,
                position: moved.position,
                velocity: moved.velocity,
                space_created,
            });
        }
        if let Some(best) = best_trial(&history) {
            debug!("best location {} creates {:.1} m²", best.position, best.space_created);
            anchor = best.position;
        }
    }

    debug!("velocity stage: {} trials at {anchor} using {} search", config.velocity_trials, config.strategy);
    let domain = Disc::new(Vec2::ZERO, config.max_velocity);
    let mut maximizer = config.strategy.maximizer(domain, config.velocity_trials, config.seed);
    let observations = maximize(&mut *maximizer, config.velocity_trials, |velocity| {
        analysis.space_created_cached(
            &mut cache,
            player,
            &Modification::Relocation {
                position: anchor,
                velocity,
            },
        )
    })?;
    history.extend(observations.into_iter().map(|observation| Trial {
        stage: Stage::Velocity,
        position: anchor,
        velocity: observation.candidate,
        space_created: observation.score,
    }));

    let best = best_trial(&history)
        .cloned()
        .ok_or_else(|| AnalysisError::InvalidSearchConfig("no trials were evaluated".into()))?;
    let cache_stats = cache.stats();
    debug!(
        "optimal state for {player}: position {}, velocity {}, {:.1} m² over {} trials ({} cache hits)",
        best.position,
        best.velocity,
        best.space_created,
        history.len(),
        cache_stats.hits
    );
    Ok(OptimizationResult {
        baseline,
        best,
        history,
        cache_stats,
    })
}

/// The first trial with the highest score.
fn best_trial(history: &[Trial]) -> Option<&Trial> {
    history.iter().fold(None, |best: Option<&Trial>, trial| match best {
        Some(best) if best.space_created >= trial.space_created => Some(best),
        _ => Some(trial),
    })
}

/// Cell centres of the coarse location grid that lie within reach, sampled without replacement.
fn sample_locations<M: ControlModel + ?Sized>(
    analysis: &Analysis<M>,
    baseline: &PlayerState,
    config: &SearchConfig,
) -> Result<Vec<Vec2>, AnalysisError> {
    let dimensions = analysis.grid().dimensions();
    let rows = usize::max(1, dimensions.rows_for(config.grid_size));
    let coarse = FieldGrid::new(dimensions, config.grid_size, rows)?;
    let mut candidates: Vec<_> = coarse
        .centres()
        .filter(|centre| match config.max_distance {
            None => true,
            Some(max_distance) => centre.distance(baseline.position) <= max_distance,
        })
        .collect();

    if candidates.len() > config.location_trials {
        // partial Fisher-Yates
        let mut rand = StdRand::seed(config.seed ^ 0x10ca_7105);
        for index in 0..config.location_trials {
            let remaining = (candidates.len() - index) as u64;
            let pick = index + rand.next_lim_u64(remaining) as usize;
            candidates.swap(index, pick);
        }
        candidates.truncate(config.location_trials);
    }
    Ok(candidates)
}
