//! Pointwise pitch control: the probability that a team would control the ball if it were played to
//! a given location.
//!
//! The analysis core depends only on the [`ControlModel`] trait. Two models are provided:
//!
//! * [`SpearmanModel`] integrates each player's probability of intercepting the ball over time,
//!   following Spearman (2018), "Beyond Expected Goals".
//! * [`VoronoiModel`] awards each location to the team of the nearest player. Its control boundaries
//!   are known analytically, which makes it a useful stand-in for testing and quick previews.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::domain::{EventSnapshot, PlayerState};
use crate::error::AnalysisError;
use crate::geom::Vec2;

pub trait ControlModel: Sync {
    /// Probability in `[0, 1]` that the attacking team of `snapshot` controls the ball at `target`.
    fn attacking_control(&self, snapshot: &EventSnapshot, target: Vec2) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control {
    pub attacking: f64,
    pub defending: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpearmanParams {
    /// Maximum player acceleration, in m/s². Not used by the straight-line time to intercept.
    pub max_player_accel: f64,

    /// Maximum player speed, in m/s.
    pub max_player_speed: f64,

    /// Seconds before a player can react and change course.
    pub reaction_time: f64,

    /// Spread of the time-to-intercept sigmoid, in seconds.
    pub tti_sigma: f64,

    /// Ball control rate of attacking players, per second.
    pub lambda_att: f64,

    /// Defending players' control rate relative to attackers.
    pub kappa_def: f64,

    /// Goalkeepers' control rate relative to outfield defenders.
    pub lambda_gk_factor: f64,

    pub average_ball_speed: f64,
    pub int_dt: f64,
    pub max_int_time: f64,
    pub model_converge_tol: f64,
}
impl SpearmanParams {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let positive = [
            ("max_player_accel", self.max_player_accel),
            ("max_player_speed", self.max_player_speed),
            ("tti_sigma", self.tti_sigma),
            ("lambda_att", self.lambda_att),
            ("kappa_def", self.kappa_def),
            ("lambda_gk_factor", self.lambda_gk_factor),
            ("average_ball_speed", self.average_ball_speed),
            ("int_dt", self.int_dt),
            ("max_int_time", self.max_int_time),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnalysisError::InvalidParams(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.reaction_time.is_finite() && self.reaction_time >= 0.0) {
            return Err(AnalysisError::InvalidParams(format!(
                "reaction_time must be non-negative, got {}",
                self.reaction_time
            )));
        }
        if !(self.model_converge_tol.is_finite() && self.model_converge_tol >= 0.0 && self.model_converge_tol < 1.0) {
            return Err(AnalysisError::InvalidParams(format!(
                "model_converge_tol must lie in [0, 1), got {}",
                self.model_converge_tol
            )));
        }
        Ok(())
    }

    pub fn lambda_def(&self) -> f64 {
        self.lambda_att * self.kappa_def
    }

    pub fn lambda_gk(&self) -> f64 {
        self.lambda_def() * self.lambda_gk_factor
    }

    /// Time after which a team is all but certain to have controlled the ball.
    fn time_to_control(&self, lambda: f64) -> f64 {
        3.0 * 10f64.ln() * (3f64.sqrt() * self.tti_sigma / PI + 1.0 / lambda)
    }
}

impl Default for SpearmanParams {
    fn default() -> Self {
        Self {
            max_player_accel: 7.0,
            max_player_speed: 5.0,
            reaction_time: 0.7,
            tti_sigma: 0.45,
            lambda_att: 4.3,
            kappa_def: 1.0,
            lambda_gk_factor: 3.0,
            average_ball_speed: 15.0,
            int_dt: 0.04,
            max_int_time: 10.0,
            model_converge_tol: 0.01,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpearmanModel {
    params: SpearmanParams,
}
impl SpearmanModel {
    pub fn new(params: SpearmanParams) -> Result<Self, AnalysisError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &SpearmanParams {
        &self.params
    }

    /// Time for a player to reach `target`: they carry on along their velocity for the reaction
    /// time, then run straight to the target at maximum speed.
    fn time_to_intercept(&self, player: &PlayerState, target: Vec2) -> f64 {
        let reaction_position = player.position + player.velocity * self.params.reaction_time;
        self.params.reaction_time + target.distance(reaction_position) / self.params.max_player_speed
    }

    #[inline]
    fn intercept_probability(&self, time: f64, time_to_intercept: f64) -> f64 {
        1.0 / (1.0 + (-PI / 3f64.sqrt() / self.params.tti_sigma * (time - time_to_intercept)).exp())
    }

    pub fn control(&self, snapshot: &EventSnapshot, target: Vec2) -> Control {
        let params = &self.params;
        let attacking_side = snapshot.attacking();
        let ball_travel_time = snapshot
            .ball()
            .map(|ball| target.distance(ball) / params.average_ball_speed)
            .unwrap_or(0.0);

        let mut attackers = Vec::with_capacity(snapshot.players().len());
        let mut defenders = Vec::with_capacity(snapshot.players().len());
        for player in snapshot.players() {
            let time = self.time_to_intercept(player, target);
            if player.id.side == attacking_side {
                attackers.push((time, params.lambda_att));
            } else {
                let lambda = if player.goalkeeper {
                    params.lambda_gk()
                } else {
                    params.lambda_def()
                };
                defenders.push((time, lambda));
            }
        }
        if attackers.is_empty() {
            return Control {
                attacking: 0.0,
                defending: if defenders.is_empty() { 0.0 } else { 1.0 },
            };
        }
        if defenders.is_empty() {
            return Control {
                attacking: 1.0,
                defending: 0.0,
            };
        }

        let tau_min_att = attackers.iter().map(|&(time, _)| time).fold(f64::INFINITY, f64::min);
        let tau_min_def = defenders.iter().map(|&(time, _)| time).fold(f64::INFINITY, f64::min);
        let time_to_control_att = params.time_to_control(params.lambda_att);
        let time_to_control_def = params.time_to_control(params.lambda_def());

        if tau_min_att - f64::max(ball_travel_time, tau_min_def) >= time_to_control_def {
            return Control {
                attacking: 0.0,
                defending: 1.0,
            };
        }
        if tau_min_def - f64::max(ball_travel_time, tau_min_att) >= time_to_control_att {
            return Control {
                attacking: 1.0,
                defending: 0.0,
            };
        }

        // only players who could plausibly arrive in time contest the ball
        attackers.retain(|&(time, _)| time - tau_min_att < time_to_control_att);
        defenders.retain(|&(time, _)| time - tau_min_def < time_to_control_def);

        let mut attacker_control = vec![0.0; attackers.len()];
        let mut defender_control = vec![0.0; defenders.len()];
        let (mut attacking, mut defending) = (0.0, 0.0);
        let start_time = ball_travel_time - params.int_dt;
        let steps = ((params.max_int_time + params.int_dt) / params.int_dt).ceil() as usize;
        let mut step = 1;
        while 1.0 - (attacking + defending) > params.model_converge_tol && step < steps {
            let time = start_time + step as f64 * params.int_dt;
            let uncontrolled = f64::max(0.0, 1.0 - attacking - defending);

            let mut next_attacking = 0.0;
            for (control, &(time_to_intercept, lambda)) in attacker_control.iter_mut().zip(&attackers) {
                let rate = uncontrolled * self.intercept_probability(time, time_to_intercept) * lambda;
                *control += rate * params.int_dt;
                next_attacking += *control;
            }
            let mut next_defending = 0.0;
            for (control, &(time_to_intercept, lambda)) in defender_control.iter_mut().zip(&defenders) {
                let rate = uncontrolled * self.intercept_probability(time, time_to_intercept) * lambda;
                *control += rate * params.int_dt;
                next_defending += *control;
            }
            attacking = next_attacking;
            defending = next_defending;
            step += 1;
        }
        Control {
            attacking: attacking.clamp(0.0, 1.0),
            defending: defending.clamp(0.0, 1.0),
        }
    }
}

impl ControlModel for SpearmanModel {
    fn attacking_control(&self, snapshot: &EventSnapshot, target: Vec2) -> f64 {
        self.control(snapshot, target).attacking
    }
}

/// Nearest-player control. Each player is placed at `position + velocity * lookahead` before
/// distances are measured; ties split control evenly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoronoiModel {
    pub lookahead: f64,
}
impl VoronoiModel {
    pub fn with_lookahead(lookahead: f64) -> Self {
        Self { lookahead }
    }
}

impl ControlModel for VoronoiModel {
    fn attacking_control(&self, snapshot: &EventSnapshot, target: Vec2) -> f64 {
        let attacking_side = snapshot.attacking();
        let (mut nearest_attacker, mut nearest_defender) = (f64::INFINITY, f64::INFINITY);
        for player in snapshot.players() {
            let projected = player.position + player.velocity * self.lookahead;
            let distance = target.distance(projected);
            if player.id.side == attacking_side {
                nearest_attacker = f64::min(nearest_attacker, distance);
            } else {
                nearest_defender = f64::min(nearest_defender, distance);
            }
        }
        if nearest_attacker == f64::INFINITY {
            0.0
        } else if nearest_attacker < nearest_defender {
            1.0
        } else if nearest_attacker > nearest_defender {
            0.0
        } else {
            0.5
        }
    }
}
