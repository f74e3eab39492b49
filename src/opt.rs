//! Black-box maximisation over a disc in the plane.
//!
//! A [`Maximizer`] proposes the next candidate given the history of observations; the caller
//! evaluates it and appends the outcome. Strategies can therefore be swapped without touching the
//! objective.

use std::f64::consts::PI;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tinyrand::{Rand, Seeded, StdRand};

use crate::geom::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disc {
    pub centre: Vec2,
    pub radius: f64,
}
impl Disc {
    pub fn new(centre: Vec2, radius: f64) -> Self {
        Self { centre, radius }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.centre) <= self.radius
    }

    /// Uniform sample over the area of the disc.
    pub fn sample(&self, rand: &mut impl Rand) -> Vec2 {
        let radius = self.radius * random_f64(rand).sqrt();
        let angle = 2.0 * PI * random_f64(rand);
        self.centre + Vec2::from_polar(radius, angle)
    }

    /// The nearest point of the disc to `point`.
    pub fn project(&self, point: Vec2) -> Vec2 {
        let offset = point - self.centre;
        let distance = offset.norm();
        if distance <= self.radius {
            point
        } else {
            self.centre + offset * (self.radius / distance)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub candidate: Vec2,
    pub score: f64,
}

pub trait Maximizer {
    /// Proposes the next candidate to evaluate, given every observation made so far.
    fn propose(&mut self, history: &[Observation]) -> Vec2;
}

/// The first observation with the highest score.
pub fn best(history: &[Observation]) -> Option<&Observation> {
    history.iter().fold(None, |best: Option<&Observation>, observation| match best {
        Some(best) if best.score >= observation.score => Some(best),
        _ => Some(observation),
    })
}

/// Runs `trials` rounds of propose-evaluate against `objective`, returning the history in
/// evaluation order.
pub fn maximize<E>(
    maximizer: &mut dyn Maximizer,
    trials: usize,
    mut objective: impl FnMut(Vec2) -> Result<f64, E>,
) -> Result<Vec<Observation>, E> {
    let mut history = Vec::with_capacity(trials);
    for _ in 0..trials {
        let candidate = maximizer.propose(&history);
        let score = objective(candidate)?;
        history.push(Observation { candidate, score });
    }
    Ok(history)
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Strategy {
    /// Uniform random sampling.
    Random,

    /// Random exploration followed by kernel-surrogate-guided sampling.
    #[default]
    Surrogate,

    /// Successively refined grids around the best candidate.
    Hypergrid,
}
impl Strategy {
    /// A maximiser for this strategy, sized for a budget of `trials`.
    pub fn maximizer(&self, domain: Disc, trials: usize, seed: u64) -> Box<dyn Maximizer + Send> {
        match self {
            Strategy::Random => Box::new(RandomSearch::new(domain, seed)),
            Strategy::Surrogate => Box::new(SurrogateSearch::new(domain, seed, usize::max(5, trials / 3))),
            Strategy::Hypergrid => {
                let resolution = ((trials as f64).sqrt() as usize).clamp(3, 11);
                Box::new(HypergridSearch::new(domain, resolution))
            }
        }
    }
}

pub struct RandomSearch {
    domain: Disc,
    rand: StdRand,
}
impl RandomSearch {
    pub fn new(domain: Disc, seed: u64) -> Self {
        Self {
            domain,
            rand: StdRand::seed(seed),
        }
    }
}

impl Maximizer for RandomSearch {
    fn propose(&mut self, _: &[Observation]) -> Vec2 {
        self.domain.sample(&mut self.rand)
    }
}

/// Sequential model-based search. After `initial` random probes, each proposal maximises an
/// upper-confidence acquisition over a Nadaraya–Watson kernel regression of the history: the
/// predicted score plus a bonus that grows with the distance to previously observed points.
/// Candidates for the acquisition are drawn both uniformly and around the incumbent best.
pub struct SurrogateSearch {
    domain: Disc,
    rand: StdRand,
    initial: usize,
    candidates: usize,
    bandwidth: f64,
    exploration: f64,
}
impl SurrogateSearch {
    pub fn new(domain: Disc, seed: u64, initial: usize) -> Self {
        Self {
            domain,
            rand: StdRand::seed(seed),
            initial,
            candidates: 256,
            bandwidth: domain.radius * 0.25,
            exploration: 0.5,
        }
    }

    pub fn with_bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    fn acquisition(&self, candidate: Vec2, history: &[Observation], mean_score: f64, spread: f64) -> f64 {
        let inv_two_h_sq = 1.0 / (2.0 * self.bandwidth * self.bandwidth);
        let (mut weight_sum, mut weighted_score) = (0.0, 0.0);
        for observation in history {
            let weight = (-(candidate - observation.candidate).norm_squared() * inv_two_h_sq).exp();
            weight_sum += weight;
            weighted_score += weight * observation.score;
        }
        let predicted = if weight_sum > f64::EPSILON {
            weighted_score / weight_sum
        } else {
            mean_score
        };
        let uncertainty = 1.0 / (1.0 + weight_sum);
        predicted + self.exploration * spread * uncertainty
    }
}

impl Maximizer for SurrogateSearch {
    fn propose(&mut self, history: &[Observation]) -> Vec2 {
        let incumbent = match best(history) {
            Some(incumbent) if history.len() >= self.initial => incumbent.candidate,
            _ => return self.domain.sample(&mut self.rand),
        };

        let mean_score = history.iter().map(|observation| observation.score).sum::<f64>() / history.len() as f64;
        let (min_score, max_score) = history.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), observation| {
            (f64::min(min, observation.score), f64::max(max, observation.score))
        });
        let spread = max_score - min_score;

        let mut proposal = incumbent;
        let mut proposal_value = f64::NEG_INFINITY;
        for index in 0..self.candidates {
            let candidate = if index % 2 == 0 {
                self.domain.sample(&mut self.rand)
            } else {
                let perturbation = Vec2::new(
                    gaussian(&mut self.rand) * self.bandwidth,
                    gaussian(&mut self.rand) * self.bandwidth,
                );
                self.domain.project(incumbent + perturbation)
            };
            let value = self.acquisition(candidate, history, mean_score, spread);
            if value > proposal_value {
                proposal_value = value;
                proposal = candidate;
            }
        }
        proposal
    }
}

/// Sweeps a `resolution`×`resolution` grid over the current bounds, skipping points outside the
/// disc. Once a sweep is exhausted, the bounds contract to two grid steps around the best point
/// observed so far, never leaving the disc's bounding box.
pub struct HypergridSearch {
    domain: Disc,
    resolution: usize,
    hard_bounds: [RangeInclusive<f64>; 2],
    bounds: [RangeInclusive<f64>; 2],
    queue: Vec<Vec2>,
    sweeps: usize,
}
impl HypergridSearch {
    pub fn new(domain: Disc, resolution: usize) -> Self {
        assert!(resolution >= 3, "search resolution must be at least 3");
        let hard_bounds = [
            domain.centre.x - domain.radius..=domain.centre.x + domain.radius,
            domain.centre.y - domain.radius..=domain.centre.y + domain.radius,
        ];
        Self {
            domain,
            resolution,
            bounds: hard_bounds.clone(),
            hard_bounds,
            queue: vec![],
            sweeps: 0,
        }
    }

    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    fn refill(&mut self, history: &[Observation]) {
        if self.sweeps > 0 {
            if let Some(best) = best(history) {
                let optimal = [best.candidate.x, best.candidate.y];
                for (dimension, &value) in optimal.iter().enumerate() {
                    let hard_bound = &self.hard_bounds[dimension];
                    let bound = &mut self.bounds[dimension];
                    let new_range = 2.0 * (bound.end() - bound.start()) / (self.resolution - 1) as f64;
                    let new_start = f64::max(*hard_bound.start(), value - new_range / 2.0);
                    let new_end = f64::min(new_start + new_range, *hard_bound.end());
                    *bound = new_start..=new_end;
                }
            }
        }
        self.sweeps += 1;

        let inv_resolution = 1.0 / (self.resolution - 1) as f64;
        let [x_bound, y_bound] = &self.bounds;
        // reversed, so that popping yields row-major order
        for row in (0..self.resolution).rev() {
            let y = y_bound.start() + row as f64 * (y_bound.end() - y_bound.start()) * inv_resolution;
            for col in (0..self.resolution).rev() {
                let x = x_bound.start() + col as f64 * (x_bound.end() - x_bound.start()) * inv_resolution;
                let point = Vec2::new(x, y);
                if self.domain.contains(point) {
                    self.queue.push(point);
                }
            }
        }
    }
}

impl Maximizer for HypergridSearch {
    fn propose(&mut self, history: &[Observation]) -> Vec2 {
        if self.queue.is_empty() {
            self.refill(history);
        }
        // the centre is always feasible, even if the contracted grid misses the disc entirely
        self.queue.pop().unwrap_or(self.domain.centre)
    }
}

#[inline]
fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}

/// Standard normal variate, by the Box–Muller transform.
fn gaussian(rand: &mut impl Rand) -> f64 {
    let u1 = f64::max(random_f64(rand), f64::MIN_POSITIVE);
    let u2 = random_f64(rand);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
