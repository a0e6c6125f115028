use phf::{phf_map, phf_set};

/// Static properties of a chemical element needed for valence bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementInfo {
    pub symbol: &'static str,
    pub atomic_number: u8,
    valences: &'static [u8],
}

impl ElementInfo {
    /// Returns the smallest allowed valence that can accommodate `bonded` bond orders,
    /// adjusted for formal charge the way organic-subset SMILES atoms are treated.
    ///
    /// Returns `None` for elements without a default valence (metals) or when the
    /// bonded valence already exceeds every allowed state.
    pub fn default_valence(&self, bonded: u8, charge: i8) -> Option<u8> {
        self.valences
            .iter()
            .map(|&v| match self.atomic_number {
                // N+, O+ and S+ gain a bond; C+ and C- lose one
                7 | 8 | 15 | 16 => (v as i16 + charge as i16).max(0) as u8,
                _ => (v as i16 - (charge as i16).abs()).max(0) as u8,
            })
            .find(|&v| v >= bonded)
    }

    pub fn has_default_valence(&self) -> bool {
        !self.valences.is_empty()
    }
}

static ELEMENTS: phf::Map<&'static str, ElementInfo> = phf_map! {
    "H" => ElementInfo { symbol: "H", atomic_number: 1, valences: &[1] },
    "Li" => ElementInfo { symbol: "Li", atomic_number: 3, valences: &[] },
    "B" => ElementInfo { symbol: "B", atomic_number: 5, valences: &[3] },
    "C" => ElementInfo { symbol: "C", atomic_number: 6, valences: &[4] },
    "N" => ElementInfo { symbol: "N", atomic_number: 7, valences: &[3, 5] },
    "O" => ElementInfo { symbol: "O", atomic_number: 8, valences: &[2] },
    "F" => ElementInfo { symbol: "F", atomic_number: 9, valences: &[1] },
    "Na" => ElementInfo { symbol: "Na", atomic_number: 11, valences: &[] },
    "Mg" => ElementInfo { symbol: "Mg", atomic_number: 12, valences: &[] },
    "Al" => ElementInfo { symbol: "Al", atomic_number: 13, valences: &[] },
    "Si" => ElementInfo { symbol: "Si", atomic_number: 14, valences: &[4] },
    "P" => ElementInfo { symbol: "P", atomic_number: 15, valences: &[3, 5] },
    "S" => ElementInfo { symbol: "S", atomic_number: 16, valences: &[2, 4, 6] },
    "Cl" => ElementInfo { symbol: "Cl", atomic_number: 17, valences: &[1] },
    "K" => ElementInfo { symbol: "K", atomic_number: 19, valences: &[] },
    "Ca" => ElementInfo { symbol: "Ca", atomic_number: 20, valences: &[] },
    "Mn" => ElementInfo { symbol: "Mn", atomic_number: 25, valences: &[] },
    "Fe" => ElementInfo { symbol: "Fe", atomic_number: 26, valences: &[] },
    "Cu" => ElementInfo { symbol: "Cu", atomic_number: 29, valences: &[] },
    "Zn" => ElementInfo { symbol: "Zn", atomic_number: 30, valences: &[] },
    "Se" => ElementInfo { symbol: "Se", atomic_number: 34, valences: &[2, 4, 6] },
    "Br" => ElementInfo { symbol: "Br", atomic_number: 35, valences: &[1] },
    "I" => ElementInfo { symbol: "I", atomic_number: 53, valences: &[1] },
};

/// Elements the docking engine accepts in a rigid ligand written without a toolkit.
static DOCKING_ELEMENTS: phf::Set<&'static str> = phf_set! {
    "C", "N", "O", "H", "S", "P", "F", "Cl", "Br", "I",
};

/// Looks up an element by its properly cased symbol (`"Cl"`, not `"CL"`).
pub fn element(symbol: &str) -> Option<&'static ElementInfo> {
    ELEMENTS.get(symbol)
}

pub fn element_by_atomic_number(atomic_number: u8) -> Option<&'static ElementInfo> {
    ELEMENTS
        .values()
        .find(|info| info.atomic_number == atomic_number)
}

/// Normalizes a symbol of arbitrary case (`"CL"`, `"cl"`, `" c"`) to its canonical form.
pub fn normalize_symbol(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let rest: String = chars.map(|c| c.to_ascii_lowercase()).collect();
    let candidate = format!("{}{}", first, rest);
    ELEMENTS.get(candidate.as_str()).map(|info| info.symbol)
}

/// Clamps an element symbol to the set the docking engine accepts, mapping
/// anything unrecognized to carbon.
pub fn clamp_to_docking_element(symbol: &str) -> &'static str {
    match normalize_symbol(symbol) {
        Some(canonical) if DOCKING_ELEMENTS.contains(canonical) => canonical,
        _ => "C",
    }
}

/// Infers an element symbol from a fixed-column atom-name field (columns 13-16).
///
/// Two-letter elements are only recognized when they start in column 13 or are written
/// in mixed case, so that `" CA "` stays a carbon while `"CL1 "` becomes chlorine.
pub fn infer_element_from_atom_name(field: &str) -> &'static str {
    let left_aligned = field.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    let letters: String = field
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    let mut chars = letters.chars();
    let Some(first) = chars.next() else {
        return "C";
    };
    if let Some(second) = chars.next() {
        let mixed_case = first.is_ascii_uppercase() && second.is_ascii_lowercase();
        if mixed_case || (left_aligned && field.len() >= 4) {
            let pair = format!("{}{}", first.to_ascii_uppercase(), second.to_ascii_lowercase());
            if let Some(info) = ELEMENTS.get(pair.as_str()) {
                if matches!(info.symbol, "Cl" | "Br") || mixed_case {
                    return info.symbol;
                }
            }
        }
    }
    normalize_symbol(&first.to_string()).unwrap_or("C")
}
