/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Immutable snapshot of one periodic crystal cell

use super::coordinates::{minimum_image_delta, to_cartesian, wrap_fractional};
use super::database;
use super::errors::{Result, StructureFormatError};
use super::lattice::Lattice;
use super::vector::Vector3D;
use ndarray::Array2;
use std::fmt;

/// Determinant magnitude below which a lattice is treated as singular
pub const DEFAULT_SINGULAR_TOLERANCE: f64 = 1e-10;

/// One atom of the cell
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// Index into [`Structure::species`]
    species: usize,
    /// Fractional position, wrapped into [0, 1)³
    fractional: Vector3D,
    /// Cartesian position derived from the fractional one
    cartesian: Vector3D,
}

impl Site {
    /// Species index of this atom
    pub fn species(&self) -> usize {
        self.species
    }

    /// Fractional position in [0, 1)³
    pub fn fractional(&self) -> &Vector3D {
        &self.fractional
    }

    /// Cartesian position in Å
    pub fn cartesian(&self) -> &Vector3D {
        &self.cartesian
    }
}

/// A periodic crystal structure: lattice plus atoms in fractional coordinates
///
/// Species keep first-seen order and `element_counts` is aligned with them.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    title: String,
    lattice: Lattice,
    species: Vec<String>,
    element_counts: Vec<usize>,
    sites: Vec<Site>,
}

impl Structure {
    /// Build a structure from species symbols and per-atom fractional positions
    ///
    /// `atom_species[i]` indexes into `species`. Positions are wrapped into the
    /// home cell. Repeated symbols in `species` are merged so that each element
    /// appears once, in the order it was first seen.
    pub fn new(
        title: &str,
        lattice: Lattice,
        species: &[String],
        atom_species: &[usize],
        fractional: &[Vector3D],
    ) -> Result<Self> {
        if lattice.is_singular(DEFAULT_SINGULAR_TOLERANCE) {
            return Err(StructureFormatError::SingularLattice {
                line: 0,
                determinant: lattice.determinant(),
            });
        }
        if fractional.is_empty() {
            return Err(StructureFormatError::Empty { line: 0 });
        }
        if atom_species.len() != fractional.len() {
            return Err(StructureFormatError::FieldCount {
                line: 0,
                expected: fractional.len(),
                found: atom_species.len(),
            });
        }

        let mut unique: Vec<String> = Vec::new();
        let mut remap = Vec::with_capacity(species.len());
        for symbol in species {
            match unique.iter().position(|s| s == symbol) {
                Some(idx) => remap.push(idx),
                None => {
                    remap.push(unique.len());
                    unique.push(symbol.clone());
                }
            }
        }

        let mut element_counts = vec![0usize; unique.len()];
        let mut sites = Vec::with_capacity(fractional.len());
        for (i, (&raw_species, frac)) in atom_species.iter().zip(fractional).enumerate() {
            let species = *remap.get(raw_species).ok_or_else(|| {
                StructureFormatError::InvalidCount {
                    line: 0,
                    field: format!("species index {} of atom {}", raw_species, i),
                }
            })?;
            if !frac.is_finite() {
                return Err(StructureFormatError::NonFinite {
                    line: 0,
                    field: frac.to_string(),
                });
            }
            let wrapped = wrap_fractional(frac);
            element_counts[species] += 1;
            sites.push(Site {
                species,
                fractional: wrapped,
                cartesian: to_cartesian(&lattice, &wrapped),
            });
        }

        Ok(Self {
            title: title.to_string(),
            lattice,
            species: unique,
            element_counts,
            sites,
        })
    }

    /// Comment/title line of the source file
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Lattice of the cell
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Unique species symbols in first-seen order
    pub fn species(&self) -> &[String] {
        &self.species
    }

    /// Atom count per species, aligned with [`Structure::species`]
    pub fn element_counts(&self) -> &[usize] {
        &self.element_counts
    }

    /// Number of atoms of the given species index
    pub fn count(&self, species: usize) -> usize {
        self.element_counts.get(species).copied().unwrap_or(0)
    }

    /// All atoms, in file order
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Get a reference to an atom by index
    pub fn site(&self, index: usize) -> Option<&Site> {
        self.sites.get(index)
    }

    /// Number of atoms in the cell
    pub fn num_atoms(&self) -> usize {
        self.sites.len()
    }

    /// Cell volume in Å³
    pub fn volume(&self) -> f64 {
        self.lattice.volume()
    }

    /// Species index of every atom
    pub fn atom_types(&self) -> Vec<usize> {
        self.sites.iter().map(|s| s.species).collect()
    }

    /// Atomic number of every species, `None` for unrecognised symbols
    pub fn atomic_numbers(&self) -> Vec<Option<i32>> {
        self.species
            .iter()
            .map(|s| database::atomic_number_from_symbol(s))
            .collect()
    }

    /// Cartesian positions of every atom
    pub fn cartesian_positions(&self) -> Vec<Vector3D> {
        self.sites.iter().map(|s| s.cartesian).collect()
    }

    /// Fractional positions of every atom
    pub fn fractional_positions(&self) -> Vec<Vector3D> {
        self.sites.iter().map(|s| s.fractional).collect()
    }

    /// Minimum-image displacement from atom `i` to atom `j`
    pub fn displacement(&self, i: usize, j: usize) -> Option<Vector3D> {
        let a = self.sites.get(i)?;
        let b = self.sites.get(j)?;
        Some(minimum_image_delta(&self.lattice, &a.fractional, &b.fractional))
    }

    /// Minimum-image distance between atoms `i` and `j`
    pub fn distance(&self, i: usize, j: usize) -> Option<f64> {
        self.displacement(i, j).map(|d| d.length())
    }

    /// Pairwise minimum-image distance matrix
    pub fn distance_matrix(&self) -> Array2<f64> {
        let n = self.sites.len();
        let mut distances = Array2::<f64>::zeros((n, n));

        for i in 0..n {
            for j in (i + 1)..n {
                let d = minimum_image_delta(
                    &self.lattice,
                    &self.sites[i].fractional,
                    &self.sites[j].fractional,
                )
                .length();
                distances[[i, j]] = d;
                distances[[j, i]] = d;
            }
        }

        distances
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let composition: Vec<String> = self
            .species
            .iter()
            .zip(&self.element_counts)
            .map(|(s, n)| format!("{}{}", s, n))
            .collect();
        write!(
            f,
            "{} ({} atoms, {:.3} Å³)",
            composition.join(" "),
            self.num_atoms(),
            self.volume()
        )
    }
}
