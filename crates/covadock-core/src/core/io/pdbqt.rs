use super::record::{
    FormatError, autodock_type_for_element, format_pdbqt_line, is_atom_line, parse_atom_line,
    parse_atom_line_lenient, record_name,
};
use crate::core::chem::element::clamp_to_docking_element;
use crate::core::io::traits::StructureFile;
use crate::core::models::atom::AtomRecord;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbqtError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: FormatError },
}

/// Reader and writer for AutoDock PDBQT coordinate files.
///
/// Reading stops at the first `ENDMDL`, so multi-model engine output yields its first
/// pose. Writing produces a rigid receptor: atom lines only, no torsion tree.
pub struct PdbqtFile;

impl StructureFile for PdbqtFile {
    type Error = PdbqtError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<AtomRecord>, Self::Error> {
        let mut atoms = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            if record_name(&line) == "ENDMDL" {
                break;
            }
            if is_atom_line(&line) {
                let atom = parse_atom_line(&line).map_err(|kind| PdbqtError::Parse {
                    line: line_num + 1,
                    kind,
                })?;
                atoms.push(atom);
            }
        }
        Ok(atoms)
    }

    fn write_to(atoms: &[AtomRecord], writer: &mut impl Write) -> Result<(), Self::Error> {
        write_rigid_receptor(atoms, writer)?;
        Ok(())
    }
}

/// Writes atoms as a rigid receptor with zero partial charges.
pub fn write_rigid_receptor(atoms: &[AtomRecord], writer: &mut impl Write) -> io::Result<()> {
    for atom in atoms {
        writeln!(
            writer,
            "{}",
            format_pdbqt_line(atom, 0.0, autodock_type_for_element(&atom.element))
        )?;
    }
    Ok(())
}

/// Writes atoms as a rigid ligand: a single `ROOT` branch and zero torsional degrees of
/// freedom. Elements the docking engine cannot type are written as carbon, and every atom
/// carries a zero partial charge.
pub fn write_rigid_ligand(atoms: &[AtomRecord], writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "ROOT")?;
    for (idx, atom) in atoms.iter().enumerate() {
        let element = clamp_to_docking_element(&atom.element);
        let typed = AtomRecord {
            serial: idx + 1,
            element: element.to_string(),
            ..atom.clone()
        };
        writeln!(
            writer,
            "{}",
            format_pdbqt_line(&typed, 0.0, autodock_type_for_element(element))
        )?;
    }
    writeln!(writer, "ENDROOT")?;
    writeln!(writer, "TORSDOF 0")?;
    Ok(())
}

/// Reads every atom line of `text`, recovering from malformed lines instead of failing.
///
/// Lines that fail strict parsing are re-read leniently, so coordinates are always
/// finite and the result has one record per atom line, in order.
pub fn read_atoms_lenient(text: &str) -> Vec<AtomRecord> {
    text.lines()
        .filter(|line| is_atom_line(line))
        .enumerate()
        .filter_map(|(idx, line)| {
            parse_atom_line(line)
                .ok()
                .or_else(|| parse_atom_line_lenient(line, idx + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use std::io::{BufReader, Cursor};

    const DOCKED: &str = "\
MODEL 1
REMARK VINA RESULT:    -7.1      0.000      0.000
ROOT
ATOM      1  C1  LIG A   1       1.000   1.000   1.000  1.00  0.00     0.000 C
ATOM      2  O1  LIG A   1       2.000   1.000   1.000  1.00  0.00    -0.300 OA
ENDROOT
TORSDOF 0
ENDMDL
MODEL 2
ATOM      1  C1  LIG A   1       5.000   5.000   5.000  1.00  0.00     0.000 C
ENDMDL
";

    #[test]
    fn reader_returns_the_first_model() {
        let atoms = PdbqtFile::read_from(&mut BufReader::new(Cursor::new(DOCKED))).unwrap();
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[1].element, "O");
        assert_eq!(atoms[0].position, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn rigid_ligand_has_a_single_root_and_no_torsions() {
        let atoms = vec![
            AtomRecord::new(7, "C1", "C", Point3::new(0.0, 0.0, 0.0)),
            AtomRecord::new(8, "B1", "B", Point3::new(1.5, 0.0, 0.0)),
        ];
        let mut out = Vec::new();
        write_rigid_ligand(&atoms, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.first(), Some(&"ROOT"));
        assert_eq!(&lines[lines.len() - 2..], &["ENDROOT", "TORSDOF 0"]);
        let reread = read_atoms_lenient(&text);
        assert_eq!(reread.len(), 2);
        assert_eq!(reread[0].serial, 1);
        assert_eq!(reread[1].element, "C");
        assert_eq!(reread[1].position, Point3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn receptor_writer_types_oxygen_and_sulfur_as_acceptors() {
        let atoms = vec![
            AtomRecord::new(1, "O", "O", Point3::origin()).with_residue("CYS", 'A', 5),
            AtomRecord::new(2, "SG", "S", Point3::origin()).with_residue("CYS", 'A', 5),
        ];
        let mut out = Vec::new();
        PdbqtFile::write_to(&atoms, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("ROOT"));
        let types: Vec<&str> = text.lines().map(|l| l[77..].trim()).collect();
        assert_eq!(types, vec!["OA", "SA"]);
    }

    #[test]
    fn lenient_reader_keeps_one_record_per_atom_line() {
        let text = "ATOM      1  C1  LIG A   1       1.000   2.000   3.000\nATOM  broken\nREMARK\n";
        let atoms = read_atoms_lenient(text);
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[1].position, Point3::origin());
    }
}
