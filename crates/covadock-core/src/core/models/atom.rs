use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

/// The record type an atom was read from.
///
/// Standard residue atoms are written as `ATOM` records, while ligands, waters and
/// other non-polymer groups are written as `HETATM` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordKind {
    /// A standard polymer atom (`ATOM`).
    #[default]
    Atom,
    /// A hetero atom (`HETATM`).
    Hetatm,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Atom => "ATOM",
            RecordKind::Hetatm => "HETATM",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRecordKindError(pub String);

impl fmt::Display for ParseRecordKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not an ATOM or HETATM record", self.0)
    }
}

impl std::error::Error for ParseRecordKindError {}

impl FromStr for RecordKind {
    type Err = ParseRecordKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ATOM" => Ok(RecordKind::Atom),
            "HETATM" => Ok(RecordKind::Hetatm),
            other => Err(ParseRecordKindError(other.to_string())),
        }
    }
}

/// A single atom parsed from a fixed-column structure file.
///
/// Records are immutable value snapshots: components that need a modified atom build a
/// new record instead of editing one in place. Coordinates are always finite; readers
/// reject or default malformed values before constructing a record.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    /// Whether the atom came from an `ATOM` or `HETATM` line.
    pub kind: RecordKind,
    /// The serial number from columns 7-11.
    pub serial: usize,
    /// The atom name (e.g. "CA", "SG"), trimmed.
    pub name: String,
    /// The three-letter residue name (e.g. "CYS", "LIG").
    pub residue_name: String,
    /// The chain identifier; a blank chain is stored as `' '`.
    pub chain_id: char,
    /// The residue sequence number.
    pub residue_number: isize,
    /// Cartesian coordinates in Ångström.
    pub position: Point3<f64>,
    /// The canonical element symbol (e.g. "C", "Cl").
    pub element: String,
}

impl AtomRecord {
    /// Creates a record with the given identity and position; residue fields default to a
    /// single ligand residue on chain `A`.
    pub fn new(serial: usize, name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            kind: RecordKind::Atom,
            serial,
            name: name.to_string(),
            residue_name: "LIG".to_string(),
            chain_id: 'A',
            residue_number: 1,
            position,
            element: element.to_string(),
        }
    }

    pub fn with_residue(mut self, residue_name: &str, chain_id: char, residue_number: isize) -> Self {
        self.residue_name = residue_name.to_string();
        self.chain_id = chain_id;
        self.residue_number = residue_number;
        self
    }

    pub fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element.eq_ignore_ascii_case("H") || self.element.eq_ignore_ascii_case("D")
    }

    pub fn is_water(&self) -> bool {
        matches!(self.residue_name.as_str(), "HOH" | "WAT" | "H2O" | "DOD")
    }
}
