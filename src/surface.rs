//! Per-cell values over a [`FieldGrid`], stored row-major (row = y, column = x).

use std::ops::{Index, IndexMut};

use crate::domain::Side;
use crate::field::FieldGrid;

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    values: Vec<f64>,
    rows: usize,
    cols: usize,
}
impl Surface {
    pub fn allocate(grid: &FieldGrid) -> Self {
        let (rows, cols) = (grid.cells_y(), grid.cells_x());
        let (len, overflow) = rows.overflowing_mul(cols);
        assert!(!overflow, "allocation of a {rows}x{cols} surface failed due to overflow");
        Self {
            values: vec![0.0; len],
            rows,
            cols,
        }
    }

    pub fn from_values(grid: &FieldGrid, values: Vec<f64>) -> Self {
        assert_eq!(
            grid.len(),
            values.len(),
            "expected {} values for a {}x{} grid, got {}",
            grid.len(),
            grid.cells_y(),
            grid.cells_x(),
            values.len()
        );
        Self {
            values,
            rows: grid.cells_y(),
            cols: grid.cells_x(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn row_slice(&self, row: usize) -> &[f64] {
        debug_assert!(self.validate_row_index(row));
        let row_start = row * self.cols;
        &self.values[row_start..(row_start + self.cols)]
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Reorients a surface of attacking-team probabilities to the given `side`: unchanged for the
    /// attacking team, complemented for the defending team.
    pub fn for_side(&self, side: Side, attacking: Side) -> Surface {
        if side == attacking {
            self.clone()
        } else {
            self.map(|value| 1.0 - value)
        }
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Surface {
        Self {
            values: self.values.iter().map(|&value| f(value)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Combines two surfaces of equal shape cell by cell.
    pub fn zip_with(&self, other: &Surface, f: impl Fn(f64, f64) -> f64) -> Surface {
        assert!(
            self.rows == other.rows && self.cols == other.cols,
            "cannot combine a {}x{} surface with a {}x{} surface",
            self.rows,
            self.cols,
            other.rows,
            other.cols
        );
        Self {
            values: self
                .values
                .iter()
                .zip(other.values.iter())
                .map(|(&lhs, &rhs)| f(lhs, rhs))
                .collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    fn validate_row_index(&self, row: usize) -> bool {
        assert!(row < self.rows, "invalid row index {row} for a {}x{} surface", self.rows, self.cols);
        true
    }

    fn validate_col_index(&self, col: usize) -> bool {
        assert!(col < self.cols, "invalid column index {col} for a {}x{} surface", self.rows, self.cols);
        true
    }
}

impl Index<(usize, usize)> for Surface {
    type Output = f64;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        let (row, col) = index;
        debug_assert!(self.validate_row_index(row));
        debug_assert!(self.validate_col_index(col));
        &self.values[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Surface {
    #[inline]
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        let (row, col) = index;
        debug_assert!(self.validate_row_index(row));
        debug_assert!(self.validate_col_index(col));
        &mut self.values[row * self.cols + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDimensions;

    fn grid() -> FieldGrid {
        FieldGrid::new(FieldDimensions::new(40.0, 30.0).unwrap(), 4, 3).unwrap()
    }

    #[test]
    fn index() {
        let mut surface = Surface::allocate(&grid());
        assert_eq!(3, surface.rows());
        assert_eq!(4, surface.cols());
        for row in 0..surface.rows() {
            for col in 0..surface.cols() {
                assert_eq!(0.0, surface[(row, col)]);
                let new_val = (row * surface.cols() + col) as f64 * 10.0;
                surface[(row, col)] = new_val;
                assert_eq!(new_val, surface[(row, col)]);
            }
        }
        assert_eq!(&[40.0, 50.0, 60.0, 70.0], surface.row_slice(1));
    }

    #[test]
    #[should_panic = "invalid row index 3 for a 3x4 surface"]
    fn row_overflow_panics() {
        let surface = Surface::allocate(&grid());
        surface[(surface.rows(), 0)];
    }

    #[test]
    #[should_panic = "expected 12 values for a 3x4 grid, got 2"]
    fn from_values_wrong_len_panics() {
        Surface::from_values(&grid(), vec![0.0, 1.0]);
    }

    #[test]
    fn for_side() {
        let surface = Surface::from_values(&grid(), vec![0.25; 12]);
        assert_eq!(surface, surface.for_side(Side::Home, Side::Home));
        let flipped = surface.for_side(Side::Away, Side::Home);
        assert!(flipped.values().iter().all(|&value| value == 0.75));
    }

    #[test]
    fn zip_with() {
        let a = Surface::from_values(&grid(), (0..12).map(|i| i as f64).collect());
        let b = Surface::from_values(&grid(), vec![1.0; 12]);
        let diff = a.zip_with(&b, |lhs, rhs| lhs - rhs);
        assert_eq!(-1.0, diff[(0, 0)]);
        assert_eq!(10.0, diff[(2, 3)]);
        assert_eq!(54.0, diff.sum());
    }
}
