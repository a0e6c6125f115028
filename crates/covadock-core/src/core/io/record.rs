//! Fixed-column `ATOM`/`HETATM` line parsing and formatting shared by the PDB and PDBQT
//! readers, writers and the text normalizer.

use crate::core::chem::element::{infer_element_from_atom_name, normalize_symbol};
use crate::core::models::atom::{AtomRecord, RecordKind};
use nalgebra::Point3;
use phf::phf_map;
use thiserror::Error;

/// A malformed atom line. Readers surface it with a line number; the normalizer
/// recovers from it locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Record is not an ATOM or HETATM line")]
    NotAnAtom,
    #[error("Line is too short for a coordinate record (must reach column 54)")]
    LineTooShort,
    #[error("Required field in columns {columns} is empty")]
    MissingField { columns: &'static str },
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: &'static str, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: &'static str, value: String },
}

static AUTODOCK_TYPE_ELEMENTS: phf::Map<&'static str, &'static str> = phf_map! {
    "C" => "C", "A" => "C",
    "N" => "N", "NA" => "N", "NS" => "N",
    "O" => "O", "OA" => "O", "OS" => "O",
    "S" => "S", "SA" => "S",
    "H" => "H", "HD" => "H", "HS" => "H",
    "P" => "P", "F" => "F", "I" => "I",
    "Cl" => "Cl", "CL" => "Cl",
    "Br" => "Br", "BR" => "Br",
    "Mg" => "Mg", "MG" => "Mg",
    "Ca" => "Ca", "CA" => "Ca",
    "Mn" => "Mn", "MN" => "Mn",
    "Fe" => "Fe", "FE" => "Fe",
    "Zn" => "Zn", "ZN" => "Zn",
};

static ELEMENT_AUTODOCK_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "C" => "C", "N" => "N", "O" => "OA", "S" => "SA", "H" => "H",
    "P" => "P", "F" => "F", "Cl" => "Cl", "Br" => "Br", "I" => "I",
    "Mg" => "Mg", "Ca" => "Ca", "Mn" => "Mn", "Fe" => "Fe", "Zn" => "Zn",
};

pub(crate) fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

/// Returns the record keyword of a line (columns 1-6, trimmed).
pub(crate) fn record_name(line: &str) -> &str {
    let end = line.len().min(6);
    line.get(..end).unwrap_or("").trim()
}

pub fn is_atom_line(line: &str) -> bool {
    line.starts_with("ATOM") || line.starts_with("HETATM")
}

/// Maps an AutoDock atom type (columns 78-79 of a PDBQT line) to its element.
pub fn element_for_autodock_type(ad_type: &str) -> Option<&'static str> {
    AUTODOCK_TYPE_ELEMENTS.get(ad_type.trim()).copied()
}

/// Maps an element to the AutoDock type written for atoms without perceived chemistry.
/// Elements AutoDock does not know become carbon.
pub fn autodock_type_for_element(element: &str) -> &'static str {
    normalize_symbol(element)
        .and_then(|symbol| ELEMENT_AUTODOCK_TYPES.get(symbol).copied())
        .unwrap_or("C")
}

fn parse_float(line: &str, start: usize, end: usize, columns: &'static str) -> Result<f64, FormatError> {
    let raw = slice_and_trim(line, start, end);
    if raw.is_empty() {
        return Err(FormatError::MissingField { columns });
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FormatError::InvalidFloat {
            columns,
            value: raw.to_string(),
        }),
    }
}

fn parse_int<T: std::str::FromStr + Default>(
    line: &str,
    start: usize,
    end: usize,
    columns: &'static str,
) -> Result<T, FormatError> {
    let raw = slice_and_trim(line, start, end);
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse::<T>().map_err(|_| FormatError::InvalidInt {
        columns,
        value: raw.to_string(),
    })
}

/// Whether the line carries PDBQT partial-charge and AutoDock-type columns.
pub fn has_pdbqt_columns(line: &str) -> bool {
    let charge = slice_and_trim(line, 70, 76);
    let ad_type = slice_and_trim(line, 77, 79);
    !charge.is_empty()
        && charge.parse::<f64>().is_ok_and(f64::is_finite)
        && element_for_autodock_type(ad_type).is_some()
}

/// Strictly parses an `ATOM`/`HETATM` line.
///
/// The element comes from the AutoDock type for PDBQT lines, from columns 77-78 for PDB
/// lines, and is otherwise inferred from the atom-name field.
pub fn parse_atom_line(line: &str) -> Result<AtomRecord, FormatError> {
    let kind: RecordKind = record_name(line)
        .parse()
        .map_err(|_| FormatError::NotAnAtom)?;
    if line.len() < 54 {
        return Err(FormatError::LineTooShort);
    }

    let serial: usize = parse_int(line, 6, 11, "7-11")?;
    let name_field = line.get(12..16).unwrap_or("");
    let name = name_field.trim();
    if name.is_empty() {
        return Err(FormatError::MissingField { columns: "13-16" });
    }
    let residue_name = slice_and_trim(line, 17, 20);
    let chain_id = line.get(21..22).and_then(|s| s.chars().next()).unwrap_or(' ');
    let residue_number: isize = parse_int(line, 22, 26, "23-26")?;
    let x = parse_float(line, 30, 38, "31-38")?;
    let y = parse_float(line, 38, 46, "39-46")?;
    let z = parse_float(line, 46, 54, "47-54")?;

    let element = if has_pdbqt_columns(line) {
        element_for_autodock_type(slice_and_trim(line, 77, 79))
    } else {
        normalize_symbol(slice_and_trim(line, 76, 78))
    }
    .unwrap_or_else(|| infer_element_from_atom_name(name_field));

    Ok(AtomRecord {
        kind,
        serial,
        name: name.to_string(),
        residue_name: residue_name.to_string(),
        chain_id,
        residue_number,
        position: Point3::new(x, y, z),
        element: element.to_string(),
    })
}

/// Best-effort parse of an atom line that failed strict parsing.
///
/// The element is inferred from the atom name; coordinates are taken from their fixed
/// columns where readable, else from the first three consecutive decimal tokens, and
/// default to 0.0 when neither source yields a finite value. Returns `None` only for
/// lines that are not atom records at all.
pub fn parse_atom_line_lenient(line: &str, fallback_serial: usize) -> Option<AtomRecord> {
    if !is_atom_line(line) {
        return None;
    }
    let kind = if line.starts_with("HETATM") {
        RecordKind::Hetatm
    } else {
        RecordKind::Atom
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let token_coords = tokens.windows(3).find_map(|w| {
        let parsed: Vec<f64> = w
            .iter()
            .filter(|t| t.contains('.'))
            .filter_map(|t| t.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .collect();
        (parsed.len() == 3).then(|| [parsed[0], parsed[1], parsed[2]])
    });

    let column = |start, end, columns, axis: usize| {
        parse_float(line, start, end, columns)
            .ok()
            .or_else(|| token_coords.map(|c| c[axis]))
            .unwrap_or(0.0)
    };
    let position = Point3::new(
        column(30, 38, "31-38", 0),
        column(38, 46, "39-46", 1),
        column(46, 54, "47-54", 2),
    );

    let name_field = line.get(12..16).unwrap_or("");
    let name = match name_field.trim() {
        "" => tokens.get(2).copied().unwrap_or("C"),
        trimmed => trimmed,
    };
    let residue_name = match slice_and_trim(line, 17, 20) {
        "" => "LIG",
        r => r,
    };
    let chain_id = line
        .get(21..22)
        .and_then(|s| s.chars().next())
        .filter(|c| !c.is_whitespace())
        .unwrap_or('A');

    Some(AtomRecord {
        kind,
        serial: slice_and_trim(line, 6, 11).parse().unwrap_or(fallback_serial),
        name: name.to_string(),
        residue_name: residue_name.to_string(),
        chain_id,
        residue_number: slice_and_trim(line, 22, 26).parse().unwrap_or(1),
        position,
        element: infer_element_from_atom_name(if name_field.trim().is_empty() { name } else { name_field })
            .to_string(),
    })
}

/// Pads an atom name into the four-character field, keeping one-letter elements out of
/// column 13.
pub fn format_atom_name(name: &str, element: &str) -> String {
    if name.len() >= 4 {
        name.chars().take(4).collect()
    } else if element.len() == 1 {
        format!(" {:<3}", name)
    } else {
        format!("{:<4}", name)
    }
}

fn format_coordinate_prefix(atom: &AtomRecord) -> String {
    format!(
        "{:<6}{:>5} {} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}",
        atom.kind.as_str(),
        atom.serial % 100_000,
        format_atom_name(&atom.name, &atom.element),
        truncate(&atom.residue_name, 3),
        atom.chain_id,
        atom.residue_number,
        atom.position.x,
        atom.position.y,
        atom.position.z,
        1.0,
        0.0,
    )
}

fn truncate(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

/// Formats a PDB `ATOM`/`HETATM` line with the element in columns 77-78.
pub fn format_pdb_line(atom: &AtomRecord) -> String {
    format!("{}          {:>2}", format_coordinate_prefix(atom), atom.element)
}

/// Formats a PDBQT line with a partial charge (columns 71-76) and AutoDock type (78-79).
pub fn format_pdbqt_line(atom: &AtomRecord, charge: f64, ad_type: &str) -> String {
    format!(
        "{}    {:>6.3} {:<2}",
        format_coordinate_prefix(atom),
        charge,
        ad_type
    )
}
