/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Crystal structure module
//!
//! Lattice geometry, fractional/Cartesian conversions and the structure text
//! parser that turns a POSCAR-style description into a [`Structure`].

pub mod coordinates;
pub mod database;
pub mod errors;
pub mod lattice;
pub mod parser;
#[allow(clippy::module_inception)]
pub mod structure;
pub mod vector;

pub use coordinates::{
    minimum_image_delta, shift_vector, to_cartesian, to_fractional, wrap_fractional,
    CoordinateSystem,
};
pub use errors::{Result, StructureFormatError};
pub use lattice::Lattice;
pub use parser::{parse_structure, ParserConfig, StructureParser};
pub use structure::{Site, Structure};
pub use vector::Vector3D;
