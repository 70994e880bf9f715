/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Coordinate conversions between fractional and Cartesian frames

use super::lattice::Lattice;
use super::vector::Vector3D;

/// Represents the frame atomic positions are given in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// Multiples of the lattice vectors ("Direct")
    Fractional,
    /// Cartesian (x, y, z) in Å
    Cartesian,
}

/// Convert a fractional position to Cartesian
pub fn to_cartesian(lattice: &Lattice, fractional: &Vector3D) -> Vector3D {
    lattice.vector(0) * fractional.x
        + lattice.vector(1) * fractional.y
        + lattice.vector(2) * fractional.z
}

/// Convert a Cartesian position to fractional using the inverse lattice matrix
pub fn to_fractional(lattice: &Lattice, cartesian: &Vector3D) -> Vector3D {
    let inv = lattice.inverse_columns();
    Vector3D::new(
        cartesian.dot(&inv[0]),
        cartesian.dot(&inv[1]),
        cartesian.dot(&inv[2]),
    )
}

/// Wrap a single fractional component into [0, 1)
pub fn wrap_component(value: f64) -> f64 {
    let wrapped = value - value.floor();
    // -1e-17 wraps to exactly 1.0 in floating point
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Wrap a fractional position into the home cell [0, 1)³
pub fn wrap_fractional(fractional: &Vector3D) -> Vector3D {
    Vector3D::new(
        wrap_component(fractional.x),
        wrap_component(fractional.y),
        wrap_component(fractional.z),
    )
}

/// Pick the image shift in {0, -1, +1} giving the smallest |delta + shift|
fn nearest_image_component(delta: f64) -> f64 {
    let mut best = delta;
    for shift in [-1.0, 1.0] {
        let candidate = delta + shift;
        if candidate.abs() < best.abs() {
            best = candidate;
        }
    }
    best
}

/// Minimum-image displacement from `frac_a` to `frac_b`, in Cartesian Å
///
/// Each fractional axis is wrapped independently, which is exact only while
/// the distance of interest stays below half the smallest cell height.
pub fn minimum_image_delta(lattice: &Lattice, frac_a: &Vector3D, frac_b: &Vector3D) -> Vector3D {
    let delta = *frac_b - *frac_a;
    let wrapped = Vector3D::new(
        nearest_image_component(delta.x),
        nearest_image_component(delta.y),
        nearest_image_component(delta.z),
    );
    to_cartesian(lattice, &wrapped)
}

/// Cartesian translation of an integer cell shift
pub fn shift_vector(lattice: &Lattice, shift: [i32; 3]) -> Vector3D {
    to_cartesian(
        lattice,
        &Vector3D::new(shift[0] as f64, shift[1] as f64, shift[2] as f64),
    )
}
