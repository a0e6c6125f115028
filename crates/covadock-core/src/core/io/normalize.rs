//! Repairs raw coordinate text into PDBQT the docking engine accepts.
//!
//! Normalization never fails. Atom lines go through a strict fixed-column parse, then a
//! lenient re-read, and are dropped only when neither yields a record. Everything that is
//! not an atom, terminator or (for ligands) torsion-tree record is removed.

use super::record::{
    autodock_type_for_element, format_pdbqt_line, has_pdbqt_columns, is_atom_line,
    parse_atom_line, parse_atom_line_lenient, record_name,
};
use crate::core::models::atom::{AtomRecord, RecordKind};
use nalgebra::Point3;
use tracing::debug;

/// Whether text describes a flexible ligand or a rigid receptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureRole {
    Ligand,
    Receptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TreeRecord {
    Root,
    EndRoot,
    Branch,
    EndBranch,
    Torsdof,
}

impl TreeRecord {
    fn from_line(line: &str) -> Option<Self> {
        match line.split_whitespace().next()? {
            "ROOT" => Some(Self::Root),
            "ENDROOT" => Some(Self::EndRoot),
            "BRANCH" => Some(Self::Branch),
            "ENDBRANCH" => Some(Self::EndBranch),
            "TORSDOF" => Some(Self::Torsdof),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Atom(String),
    Ter,
    Tree(TreeRecord, String),
}

/// Returns a sanitized copy of `text` for the given role.
///
/// Ligand output always holds exactly one `ROOT`..`ENDROOT` block and a `TORSDOF` line; a
/// well-formed input torsion tree is preserved, anything else is flattened into a rigid
/// root. A ligand with no recoverable atoms becomes a one-atom stub. Receptor output holds
/// atom and `TER` records only.
pub fn normalize(text: &str, role: StructureRole) -> String {
    let entries = collect_entries(text);
    let lines = match role {
        StructureRole::Receptor => receptor_lines(&entries),
        StructureRole::Ligand => ligand_lines(&entries),
    };

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Whether PDBQT text is ready to dock: at least one atom and no `COMPND` header.
pub fn validate(text: &str) -> bool {
    let mut has_atom = false;
    for line in text.lines() {
        if line.starts_with("COMPND") {
            return false;
        }
        has_atom |= is_atom_line(line);
    }
    has_atom
}

fn collect_entries(text: &str) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut atom_count = 0usize;

    for (line_num, raw) in text.lines().enumerate() {
        let line = raw.trim_end();
        if is_atom_line(line) {
            atom_count += 1;
            if let Some(repaired) = repair_atom_line(line, line_num + 1, atom_count) {
                entries.push(Entry::Atom(repaired));
            }
        } else if let Some(record) = TreeRecord::from_line(line) {
            entries.push(Entry::Tree(record, line.trim().to_string()));
        } else if record_name(line) == "TER" {
            entries.push(Entry::Ter);
        }
    }
    entries
}

fn repair_atom_line(line: &str, line_num: usize, fallback_serial: usize) -> Option<String> {
    match parse_atom_line(line) {
        Ok(_) if has_pdbqt_columns(line) => Some(line.to_string()),
        Ok(atom) => Some(canonical_line(&atom)),
        Err(err) => {
            debug!(line = line_num, error = %err, "Repairing malformed atom record");
            parse_atom_line_lenient(line, fallback_serial).map(|atom| canonical_line(&atom))
        }
    }
}

fn canonical_line(atom: &AtomRecord) -> String {
    format_pdbqt_line(atom, 0.0, autodock_type_for_element(&atom.element))
}

fn receptor_lines(entries: &[Entry]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for entry in entries {
        match entry {
            Entry::Atom(line) => lines.push(line.clone()),
            Entry::Ter if lines.last().is_some_and(|l| l != "TER") => {
                lines.push("TER".to_string())
            }
            _ => {}
        }
    }
    lines
}

fn ligand_lines(entries: &[Entry]) -> Vec<String> {
    let atoms: Vec<&String> = entries
        .iter()
        .filter_map(|e| match e {
            Entry::Atom(line) => Some(line),
            _ => None,
        })
        .collect();

    if atoms.is_empty() {
        debug!("Ligand text has no recoverable atoms; writing a one-atom stub");
        let stub = AtomRecord::new(1, "C1", "C", Point3::origin()).with_kind(RecordKind::Hetatm);
        return vec![
            "ROOT".to_string(),
            canonical_line(&stub),
            "ENDROOT".to_string(),
            "TORSDOF 0".to_string(),
        ];
    }

    if let Some(tree) = check_tree(entries) {
        let mut lines: Vec<String> = entries
            .iter()
            .filter_map(|e| match e {
                Entry::Atom(line) | Entry::Tree(_, line) => Some(line.clone()),
                Entry::Ter => None,
            })
            .collect();
        if !tree.has_torsdof {
            lines.push(format!("TORSDOF {}", tree.branches));
        }
        return lines;
    }

    debug!("Flattening missing or malformed torsion tree into a rigid root");
    let mut lines = Vec::with_capacity(atoms.len() + 3);
    lines.push("ROOT".to_string());
    lines.extend(atoms.into_iter().cloned());
    lines.push("ENDROOT".to_string());
    lines.push("TORSDOF 0".to_string());
    lines
}

struct TreeShape {
    branches: usize,
    has_torsdof: bool,
}

#[derive(PartialEq)]
enum Stage {
    BeforeRoot,
    InRoot,
    AfterRoot,
    Closed,
}

fn check_tree(entries: &[Entry]) -> Option<TreeShape> {
    let mut stage = Stage::BeforeRoot;
    let mut depth = 0usize;
    let mut branches = 0usize;
    let mut root_atoms = 0usize;

    for entry in entries {
        match entry {
            Entry::Ter => {}
            Entry::Atom(_) => match stage {
                Stage::InRoot => root_atoms += 1,
                Stage::AfterRoot if depth > 0 => {}
                _ => return None,
            },
            Entry::Tree(record, _) => match (record, &stage) {
                (TreeRecord::Root, Stage::BeforeRoot) => stage = Stage::InRoot,
                (TreeRecord::EndRoot, Stage::InRoot) => stage = Stage::AfterRoot,
                (TreeRecord::Branch, Stage::AfterRoot) => {
                    depth += 1;
                    branches += 1;
                }
                (TreeRecord::EndBranch, Stage::AfterRoot) if depth > 0 => depth -= 1,
                (TreeRecord::Torsdof, Stage::AfterRoot) if depth == 0 => stage = Stage::Closed,
                _ => return None,
            },
        }
    }

    let complete = matches!(stage, Stage::AfterRoot | Stage::Closed) && depth == 0;
    (complete && root_atoms > 0).then_some(TreeShape {
        branches,
        has_torsdof: stage == Stage::Closed,
    })
}
