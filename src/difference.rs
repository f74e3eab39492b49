//! Differencing of baseline and counterfactual surfaces into a signed "space created" figure.

use crate::domain::Side;
use crate::field::FieldGrid;
use crate::surface::Surface;

/// The change in one team's control between a baseline and a counterfactual.
#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    /// The team the difference is attributed to.
    pub side: Side,

    /// Area-weighted sum of `delta`, in m². Positive when the counterfactual gains control for `side`.
    pub space_created: f64,

    /// Per-cell change in `side`'s control probability, `counterfactual - baseline`.
    pub delta: Surface,

    cell_area: f64,
}
impl Difference {
    pub fn cell_area(&self) -> f64 {
        self.cell_area
    }

    /// Area over which `side` gains control, in m².
    pub fn gained(&self) -> f64 {
        self.delta.values().iter().filter(|&&delta| delta > 0.0).sum::<f64>() * self.cell_area
    }

    /// Area over which `side` loses control, in m², as a non-negative figure.
    pub fn conceded(&self) -> f64 {
        -self.delta.values().iter().filter(|&&delta| delta < 0.0).sum::<f64>() * self.cell_area
    }
}

/// Differences two surfaces of attacking-team probabilities from the perspective of `side`.
///
/// Both surfaces must come from snapshots with the same attacking team. For the defending team,
/// the change in control is the negated change in attacking control.
pub fn difference(
    baseline: &Surface,
    counterfactual: &Surface,
    grid: &FieldGrid,
    side: Side,
    attacking: Side,
) -> Difference {
    let sign = if side == attacking { 1.0 } else { -1.0 };
    let delta = counterfactual.zip_with(baseline, |counterfactual, baseline| {
        sign * (counterfactual - baseline)
    });
    let cell_area = grid.cell_area();
    Difference {
        side,
        space_created: delta.sum() * cell_area,
        delta,
        cell_area,
    }
}
