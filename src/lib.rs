//! Counterfactual pitch control. Quantifies the space a single player creates for their team by
//! comparing the team's control of the pitch at a recorded moment against the same moment with
//! that player moved, removed or set running at a different velocity. Also searches for the
//! position and velocity that would have created the most space.

#![allow(clippy::too_many_arguments)]

pub mod analysis;
pub mod control;
pub mod counterfactual;
pub mod difference;
pub mod domain;
pub mod error;
pub mod evaluate;
pub mod field;
pub mod geom;
pub mod opt;
pub mod optimizer;
pub mod print;
pub mod surface;
pub mod tracking;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
