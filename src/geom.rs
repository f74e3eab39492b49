//! Planar vectors. Positions, velocities and offsets are all [`Vec2`], measured in metres
//! (or metres per second) relative to the centre of the pitch.

use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}
impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_polar(radius: f64, angle: f64) -> Self {
        Self {
            x: radius * angle.cos(),
            y: radius * angle.sin(),
        }
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn distance(&self, other: Vec2) -> f64 {
        (*self - other).norm()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Self::Output {
        Vec2::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl Display for Vec2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;

    #[test]
    fn arithmetic() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -1.0);
        assert_eq!(Vec2::new(4.0, 1.0), a + b);
        assert_eq!(Vec2::new(-2.0, 3.0), a - b);
        assert_eq!(Vec2::new(2.0, 4.0), a * 2.0);
        assert_eq!(Vec2::new(-1.0, -2.0), -a);
    }

    #[test]
    fn norm_and_distance() {
        assert_float_absolute_eq!(5.0, Vec2::new(3.0, 4.0).norm());
        assert_float_absolute_eq!(25.0, Vec2::new(3.0, 4.0).norm_squared());
        assert_float_absolute_eq!(5.0, Vec2::new(1.0, 1.0).distance(Vec2::new(4.0, 5.0)));
    }

    #[test]
    fn from_polar() {
        let v = Vec2::from_polar(2.0, std::f64::consts::FRAC_PI_2);
        assert_float_absolute_eq!(0.0, v.x);
        assert_float_absolute_eq!(2.0, v.y);
    }

    #[test]
    fn display() {
        assert_eq!("(1.00, -2.50)", format!("{}", Vec2::new(1.0, -2.5)));
    }
}
