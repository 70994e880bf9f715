/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Element symbol table
//!
//! Maps the species symbols found in structure files onto atomic numbers,
//! which is how per-element embedding tables are keyed.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Element symbols indexed by `Z - 1`
const ELEMENT_SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

static SYMBOL_TO_NUMBER: Lazy<HashMap<&'static str, i32>> = Lazy::new(|| {
    ELEMENT_SYMBOLS
        .iter()
        .enumerate()
        .map(|(i, symbol)| (*symbol, i as i32 + 1))
        .collect()
});

/// Provides element symbols for atomic numbers
pub fn element_symbol(atomic_number: i32) -> Option<&'static str> {
    if (1..=ELEMENT_SYMBOLS.len() as i32).contains(&atomic_number) {
        Some(ELEMENT_SYMBOLS[atomic_number as usize - 1])
    } else {
        None
    }
}

/// Returns the atomic number for an element symbol
///
/// Case-insensitive, so "Fe", "fe" and "FE" all resolve. VASP-style labels
/// with a suffix such as "Fe_pv" or "O/" resolve through their leading letters.
pub fn atomic_number_from_symbol(symbol: &str) -> Option<i32> {
    let letters: String = symbol
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }

    let mut chars = letters.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let rest: String = chars.map(|c| c.to_ascii_lowercase()).collect();
    let normalized = format!("{}{}", first, rest);

    SYMBOL_TO_NUMBER.get(normalized.as_str()).copied()
}
