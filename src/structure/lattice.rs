/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Periodic cell described by three lattice vectors

use super::vector::Vector3D;
use serde::{Deserialize, Serialize};

/// Lattice vectors of a periodic cell, stored as rows (Å)
///
/// A fractional coordinate `f` maps to the Cartesian point
/// `f[0] * a + f[1] * b + f[2] * c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    rows: [[f64; 3]; 3],
}

impl Lattice {
    /// Create a lattice from its three row vectors
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Cubic cell with edge length `a`
    pub fn cubic(a: f64) -> Self {
        Self::from_rows([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    /// Row vectors of the lattice matrix
    pub fn rows(&self) -> &[[f64; 3]; 3] {
        &self.rows
    }

    /// Lattice vector `i` (0 = a, 1 = b, 2 = c)
    pub fn vector(&self, i: usize) -> Vector3D {
        Vector3D::from(self.rows[i])
    }

    /// Row-major flattening of the 3×3 matrix
    pub fn to_flat(&self) -> [f64; 9] {
        let mut flat = [0.0; 9];
        for (i, row) in self.rows.iter().enumerate() {
            flat[i * 3..i * 3 + 3].copy_from_slice(row);
        }
        flat
    }

    /// Multiply every lattice vector by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        let mut rows = self.rows;
        for row in rows.iter_mut() {
            for v in row.iter_mut() {
                *v *= factor;
            }
        }
        Self { rows }
    }

    /// Determinant of the lattice matrix (signed cell volume)
    pub fn determinant(&self) -> f64 {
        let a = self.vector(0);
        let b = self.vector(1);
        let c = self.vector(2);
        a.dot(&b.cross(&c))
    }

    /// Cell volume in Å³
    pub fn volume(&self) -> f64 {
        self.determinant().abs()
    }

    /// True when the lattice vectors are (numerically) linearly dependent
    pub fn is_singular(&self, tolerance: f64) -> bool {
        let det = self.determinant();
        !det.is_finite() || det.abs() <= tolerance
    }

    /// Lengths of the three lattice vectors
    pub fn lengths(&self) -> [f64; 3] {
        [
            self.vector(0).length(),
            self.vector(1).length(),
            self.vector(2).length(),
        ]
    }

    /// Perpendicular distance between opposite faces along each lattice direction
    ///
    /// A sphere of radius `h` fits between the faces spanned by the other two
    /// vectors, which is what bounds the reach of a periodic replication shell.
    pub fn perpendicular_heights(&self) -> [f64; 3] {
        let a = self.vector(0);
        let b = self.vector(1);
        let c = self.vector(2);
        let volume = self.volume();
        [
            volume / b.cross(&c).length(),
            volume / c.cross(&a).length(),
            volume / a.cross(&b).length(),
        ]
    }

    /// Smallest perpendicular height of the cell
    pub fn min_perpendicular_height(&self) -> f64 {
        let h = self.perpendicular_heights();
        h[0].min(h[1]).min(h[2])
    }

    /// Reciprocal vectors (without the 2π factor), the columns of the inverse matrix
    pub(crate) fn inverse_columns(&self) -> [Vector3D; 3] {
        let a = self.vector(0);
        let b = self.vector(1);
        let c = self.vector(2);
        let det = self.determinant();
        [
            b.cross(&c) * (1.0 / det),
            c.cross(&a) * (1.0 / det),
            a.cross(&b) * (1.0 / det),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cubic_lattice() {
        let lattice = Lattice::cubic(5.0);
        assert_relative_eq!(lattice.volume(), 125.0, epsilon = 1e-12);
        assert_eq!(lattice.lengths(), [5.0, 5.0, 5.0]);
        assert_relative_eq!(lattice.min_perpendicular_height(), 5.0, epsilon = 1e-12);
        assert!(!lattice.is_singular(1e-10));
    }

    #[test]
    fn test_hexagonal_heights() {
        let a = 3.0;
        let lattice = Lattice::from_rows([
            [a, 0.0, 0.0],
            [-0.5 * a, 0.5 * 3.0_f64.sqrt() * a, 0.0],
            [0.0, 0.0, 10.0],
        ]);
        let h = lattice.perpendicular_heights();
        assert_relative_eq!(h[0], 0.5 * 3.0_f64.sqrt() * a, epsilon = 1e-12);
        assert_relative_eq!(h[1], 0.5 * 3.0_f64.sqrt() * a, epsilon = 1e-12);
        assert_relative_eq!(h[2], 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_and_flat() {
        let lattice = Lattice::from_rows([[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(lattice.is_singular(1e-10));

        let flat = Lattice::cubic(2.0).scaled(1.5).to_flat();
        assert_eq!(flat, [3.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 3.0]);
    }
}
