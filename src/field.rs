//! Pitch geometry: field dimensions, tolerated bounds, and the discretisation of the playing surface
//! into a grid of cells. Coordinates are centred on the middle of the pitch, so a 106x68 m pitch spans
//! `x ∈ [-53, 53]`, `y ∈ [-34, 34]`.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::geom::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldDimensions {
    pub length: f64,
    pub width: f64,
}
impl FieldDimensions {
    pub fn new(length: f64, width: f64) -> Result<Self, AnalysisError> {
        let dimensions = Self { length, width };
        dimensions.validate()?;
        Ok(dimensions)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.length.is_finite() && self.length > 0.0) || !(self.width.is_finite() && self.width > 0.0) {
            return Err(AnalysisError::InvalidGrid(format!(
                "field dimensions {}x{} must be positive",
                self.length, self.width
            )));
        }
        Ok(())
    }

    /// Rows of a grid with `cells_x` columns that keeps the field's aspect ratio, rounding down.
    pub fn rows_for(&self, cells_x: usize) -> usize {
        (cells_x as f64 * self.width / self.length) as usize
    }

    pub fn area(&self) -> f64 {
        self.length * self.width
    }
}

impl Default for FieldDimensions {
    fn default() -> Self {
        Self {
            length: 106.0,
            width: 68.0,
        }
    }
}

/// The field extended by a tolerance on every side, to absorb tracking noise near the lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchBounds {
    pub dimensions: FieldDimensions,
    pub tolerance: f64,
}
impl PitchBounds {
    pub fn new(dimensions: FieldDimensions, tolerance: f64) -> Self {
        Self {
            dimensions,
            tolerance,
        }
    }

    pub fn contains(&self, position: Vec2) -> bool {
        let half_length = self.dimensions.length / 2.0 + self.tolerance;
        let half_width = self.dimensions.width / 2.0 + self.tolerance;
        position.x.abs() <= half_length && position.y.abs() <= half_width
    }
}

/// A regular tiling of the field into `cells_x` by `cells_y` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid {
    dimensions: FieldDimensions,
    cells_x: usize,
    cells_y: usize,
    dx: f64,
    dy: f64,
}
impl FieldGrid {
    pub fn new(dimensions: FieldDimensions, cells_x: usize, cells_y: usize) -> Result<Self, AnalysisError> {
        dimensions.validate()?;
        if cells_x == 0 || cells_y == 0 {
            return Err(AnalysisError::InvalidGrid(format!(
                "cell counts {cells_x}x{cells_y} must be positive"
            )));
        }
        Ok(Self {
            dimensions,
            cells_x,
            cells_y,
            dx: dimensions.length / cells_x as f64,
            dy: dimensions.width / cells_y as f64,
        })
    }

    /// Derives the number of rows from the aspect ratio of the field, rounding down.
    pub fn with_cells_x(dimensions: FieldDimensions, cells_x: usize) -> Result<Self, AnalysisError> {
        dimensions.validate()?;
        Self::new(dimensions, cells_x, dimensions.rows_for(cells_x))
    }

    pub fn dimensions(&self) -> FieldDimensions {
        self.dimensions
    }

    pub fn cells_x(&self) -> usize {
        self.cells_x
    }

    pub fn cells_y(&self) -> usize {
        self.cells_y
    }

    pub fn len(&self) -> usize {
        self.cells_x * self.cells_y
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell_size(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    pub fn cell_area(&self) -> f64 {
        self.dx * self.dy
    }

    #[inline]
    pub fn x(&self, col: usize) -> f64 {
        col as f64 * self.dx - self.dimensions.length / 2.0 + self.dx / 2.0
    }

    #[inline]
    pub fn y(&self, row: usize) -> f64 {
        row as f64 * self.dy - self.dimensions.width / 2.0 + self.dy / 2.0
    }

    #[inline]
    pub fn centre(&self, row: usize, col: usize) -> Vec2 {
        Vec2::new(self.x(col), self.y(row))
    }

    /// Centre of the cell at a row-major flat `index`.
    #[inline]
    pub fn centre_at(&self, index: usize) -> Vec2 {
        self.centre(index / self.cells_x, index % self.cells_x)
    }

    /// All cell centres in row-major order.
    pub fn centres(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.len()).map(|index| self.centre_at(index))
    }

    /// The `(row, col)` of the cell containing `position`, if it lies on the field.
    pub fn cell_of(&self, position: Vec2) -> Option<(usize, usize)> {
        let col = ((position.x + self.dimensions.length / 2.0) / self.dx).floor();
        let row = ((position.y + self.dimensions.width / 2.0) / self.dy).floor();
        if col < 0.0 || row < 0.0 || col >= self.cells_x as f64 || row >= self.cells_y as f64 {
            return None;
        }
        Some((row as usize, col as usize))
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;

    #[test]
    fn derived_rows() {
        let grid = FieldGrid::with_cells_x(FieldDimensions::new(106.0, 68.0).unwrap(), 50).unwrap();
        assert_eq!(50, grid.cells_x());
        assert_eq!(32, grid.cells_y());
        assert_eq!(1600, grid.len());
        let (dx, dy) = grid.cell_size();
        assert_float_absolute_eq!(2.12, dx);
        assert_float_absolute_eq!(2.125, dy);
    }

    #[test]
    fn rows_round_down() {
        let dimensions = FieldDimensions::new(106.0, 68.0).unwrap();
        assert_eq!(12, dimensions.rows_for(20));
        assert_eq!(0, dimensions.rows_for(1));
        assert_eq!(12, FieldGrid::with_cells_x(dimensions, 20).unwrap().cells_y());
        assert!(FieldGrid::with_cells_x(dimensions, 1).is_err());
    }

    #[test]
    fn tiles_the_field() {
        let dimensions = FieldDimensions::new(106.0, 68.0).unwrap();
        let grid = FieldGrid::with_cells_x(dimensions, 50).unwrap();
        assert_float_relative_eq!(dimensions.area(), grid.cell_area() * grid.len() as f64, 1e-12);
        assert_float_absolute_eq!(-53.0 + 1.06, grid.x(0));
        assert_float_absolute_eq!(53.0 - 1.06, grid.x(49));
        assert_float_absolute_eq!(-34.0 + 1.0625, grid.y(0));
        assert_float_absolute_eq!(34.0 - 1.0625, grid.y(31));
    }

    #[test]
    fn centres_are_row_major() {
        let grid = FieldGrid::new(FieldDimensions::new(100.0, 60.0).unwrap(), 50, 30).unwrap();
        let centres: Vec<_> = grid.centres().collect();
        assert_eq!(1500, centres.len());
        assert_eq!(Vec2::new(-49.0, -29.0), centres[0]);
        assert_eq!(Vec2::new(-47.0, -29.0), centres[1]);
        assert_eq!(Vec2::new(-49.0, -27.0), centres[50]);
        assert_eq!(grid.centre(3, 7), grid.centre_at(3 * 50 + 7));
    }

    #[test]
    fn cell_of() {
        let grid = FieldGrid::new(FieldDimensions::new(100.0, 60.0).unwrap(), 50, 30).unwrap();
        assert_eq!(Some((0, 0)), grid.cell_of(Vec2::new(-50.0, -30.0)));
        assert_eq!(Some((15, 25)), grid.cell_of(Vec2::new(0.5, 0.5)));
        assert_eq!(None, grid.cell_of(Vec2::new(50.0, 0.0)));
        assert_eq!(None, grid.cell_of(Vec2::new(0.0, -30.1)));
    }

    #[test]
    fn rejects_empty_grids() {
        let dimensions = FieldDimensions::new(106.0, 68.0).unwrap();
        assert!(FieldGrid::new(dimensions, 0, 10).is_err());
        assert!(FieldGrid::with_cells_x(dimensions, 1).is_err());
        assert!(FieldDimensions::new(-1.0, 68.0).is_err());
    }

    #[test]
    fn bounds_tolerance() {
        let bounds = PitchBounds::new(FieldDimensions::new(106.0, 68.0).unwrap(), 2.0);
        assert!(bounds.contains(Vec2::new(54.9, -35.9)));
        assert!(!bounds.contains(Vec2::new(55.1, 0.0)));
        assert!(!bounds.contains(Vec2::new(0.0, 36.5)));
    }
}
