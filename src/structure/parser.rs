/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Parser for the POSCAR-style structure text layout
//!
//! ```text
//! comment line
//! scale factor
//! a1 a2 a3
//! b1 b2 b3
//! c1 c2 c3
//! species symbols
//! atom counts per species
//! [Selective dynamics]
//! Direct | Cartesian
//! one coordinate row per atom
//! ```

use super::coordinates::{to_fractional, CoordinateSystem};
use super::errors::{Result, StructureFormatError};
use super::lattice::Lattice;
use super::structure::{Structure, DEFAULT_SINGULAR_TOLERANCE};
use super::vector::Vector3D;
use log::debug;

/// Structure parser configuration
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Determinant magnitude below which the lattice is rejected as singular
    pub singular_tolerance: f64,
    /// Whether a "Selective dynamics" line may precede the coordinate mode
    pub allow_selective_dynamics: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            singular_tolerance: DEFAULT_SINGULAR_TOLERANCE,
            allow_selective_dynamics: true,
        }
    }
}

/// Reads structure text into a [`Structure`]
#[derive(Debug, Default)]
pub struct StructureParser {
    config: ParserConfig,
}

/// Line cursor that tracks 1-based line numbers for error reporting
struct Lines<'a> {
    lines: Vec<&'a str>,
    next: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            next: 0,
        }
    }

    /// Line number of the line `next_line` would return
    fn line_number(&self) -> usize {
        self.next + 1
    }

    /// Number of lines not yet consumed
    fn remaining(&self) -> usize {
        self.lines.len().saturating_sub(self.next)
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.next).copied()
    }

    /// Next line that has content, or a `MissingLine` error naming `expected`
    fn next_line(&mut self, expected: &str) -> Result<(usize, &'a str)> {
        let line_number = self.line_number();
        match self.lines.get(self.next) {
            Some(line) if !line.trim().is_empty() => {
                self.next += 1;
                Ok((line_number, line))
            }
            _ => Err(StructureFormatError::MissingLine {
                line: line_number,
                expected: expected.to_string(),
            }),
        }
    }
}

fn parse_f64(field: &str, line: usize) -> Result<f64> {
    let value: f64 = field
        .parse()
        .map_err(|_| StructureFormatError::InvalidNumber {
            line,
            field: field.to_string(),
        })?;
    if !value.is_finite() {
        return Err(StructureFormatError::NonFinite {
            line,
            field: field.to_string(),
        });
    }
    Ok(value)
}

/// Parse the first three fields of a line as a vector; extra fields are ignored
fn parse_triple(text: &str, line: usize) -> Result<[f64; 3]> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(StructureFormatError::FieldCount {
            line,
            expected: 3,
            found: fields.len(),
        });
    }
    Ok([
        parse_f64(fields[0], line)?,
        parse_f64(fields[1], line)?,
        parse_f64(fields[2], line)?,
    ])
}

fn parse_coordinate_mode(text: &str, line: usize) -> Result<CoordinateSystem> {
    match text.trim_start().chars().next() {
        Some('d') | Some('D') => Ok(CoordinateSystem::Fractional),
        Some('c') | Some('C') | Some('k') | Some('K') => Ok(CoordinateSystem::Cartesian),
        _ => Err(StructureFormatError::InvalidCoordinateMode {
            line,
            found: text.trim().to_string(),
        }),
    }
}

impl StructureParser {
    /// Create a new parser with the given configuration
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse structure text
    ///
    /// Either the full structure is returned or an error naming the first
    /// offending line; nothing partial is produced.
    pub fn parse(&self, text: &str) -> Result<Structure> {
        let mut lines = Lines::new(text);

        // The comment line may be blank
        let title = lines.peek().map(str::trim).unwrap_or("").to_string();
        if lines.peek().is_none() {
            return Err(StructureFormatError::MissingLine {
                line: 1,
                expected: "comment line".to_string(),
            });
        }
        lines.next += 1;

        let (scale_line, scale_text) = lines.next_line("scale factor")?;
        let scale_field = scale_text.split_whitespace().next().unwrap_or_default();
        let scale = parse_f64(scale_field, scale_line)?;

        let mut rows = [[0.0; 3]; 3];
        let mut last_lattice_line = scale_line;
        for (i, row) in rows.iter_mut().enumerate() {
            let (line, text) = lines.next_line(&format!("lattice vector {}", i + 1))?;
            *row = parse_triple(text, line)?;
            last_lattice_line = line;
        }
        let unscaled = Lattice::from_rows(rows);

        // A negative scale factor is the requested cell volume
        let factor = if scale < 0.0 {
            let volume = unscaled.volume();
            if volume <= self.config.singular_tolerance {
                return Err(StructureFormatError::SingularLattice {
                    line: last_lattice_line,
                    determinant: unscaled.determinant(),
                });
            }
            (-scale / volume).cbrt()
        } else {
            scale
        };
        let lattice = unscaled.scaled(factor);
        if lattice.is_singular(self.config.singular_tolerance) {
            return Err(StructureFormatError::SingularLattice {
                line: last_lattice_line,
                determinant: lattice.determinant(),
            });
        }

        let (species_line, species_text) = lines.next_line("species symbols")?;
        let species: Vec<String> = species_text
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if let Some(bad) = species
            .iter()
            .find(|s| !s.starts_with(|c: char| c.is_alphabetic()))
        {
            return Err(StructureFormatError::MissingLine {
                line: species_line,
                expected: format!("species symbols (found '{}')", bad),
            });
        }

        let (count_line, count_text) = lines.next_line("atom counts")?;
        let counts = count_text
            .split_whitespace()
            .map(|field| {
                field
                    .parse::<usize>()
                    .map_err(|_| StructureFormatError::InvalidCount {
                        line: count_line,
                        field: field.to_string(),
                    })
            })
            .collect::<Result<Vec<usize>>>()?;
        if counts.len() != species.len() {
            return Err(StructureFormatError::SpeciesCountMismatch {
                line: count_line,
                species: species.len(),
                counts: counts.len(),
            });
        }
        let total = counts
            .iter()
            .try_fold(0usize, |acc, &c| acc.checked_add(c))
            .ok_or_else(|| StructureFormatError::InvalidCount {
                line: count_line,
                field: count_text.trim().to_string(),
            })?;
        if total == 0 {
            return Err(StructureFormatError::Empty { line: count_line });
        }

        let (mut mode_line, mut mode_text) = lines.next_line("coordinate mode")?;
        if self.config.allow_selective_dynamics
            && mode_text.trim_start().starts_with(['s', 'S'])
        {
            (mode_line, mode_text) = lines.next_line("coordinate mode")?;
        }
        let mode = parse_coordinate_mode(mode_text, mode_line)?;

        // The count line is untrusted; never reserve more rows than remain
        let capacity = total.min(lines.remaining());
        let mut atom_species = Vec::with_capacity(capacity);
        let mut fractional = Vec::with_capacity(capacity);
        for (species_idx, &count) in counts.iter().enumerate() {
            for _ in 0..count {
                let (line, text) = lines.next_line("atom coordinates")?;
                let raw = Vector3D::from(parse_triple(text, line)?);
                let frac = match mode {
                    CoordinateSystem::Fractional => raw,
                    CoordinateSystem::Cartesian => to_fractional(&lattice, &(raw * factor)),
                };
                if !frac.is_finite() {
                    return Err(StructureFormatError::NonFinite {
                        line,
                        field: text.trim().to_string(),
                    });
                }
                atom_species.push(species_idx);
                fractional.push(frac);
            }
        }

        debug!(
            "Parsed structure '{}': {} atoms, {} species, {:?} coordinates",
            title,
            total,
            species.len(),
            mode
        );

        Structure::new(&title, lattice, &species, &atom_species, &fractional)
    }
}

/// Parse structure text with the default configuration
pub fn parse_structure(text: &str) -> Result<Structure> {
    StructureParser::default().parse(text)
}
