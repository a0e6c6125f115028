use super::record::{FormatError, format_pdb_line, is_atom_line, parse_atom_line, record_name};
use crate::core::io::traits::StructureFile;
use crate::core::models::atom::AtomRecord;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: FormatError },
}

/// Reader and writer for PDB coordinate files.
///
/// Only `ATOM`/`HETATM` records of the first model are read; everything else is skipped.
/// The writer emits `TER` between chains and a closing `END`.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<AtomRecord>, Self::Error> {
        let mut atoms = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            match record_name(&line) {
                "ENDMDL" | "END" => break,
                _ if is_atom_line(&line) => {
                    let atom = parse_atom_line(&line).map_err(|kind| PdbError::Parse {
                        line: line_num + 1,
                        kind,
                    })?;
                    atoms.push(atom);
                }
                _ => {}
            }
        }

        Ok(atoms)
    }

    fn write_to(atoms: &[AtomRecord], writer: &mut impl Write) -> Result<(), Self::Error> {
        let mut previous_chain: Option<char> = None;
        for atom in atoms {
            if previous_chain.is_some_and(|chain| chain != atom.chain_id) {
                writeln!(writer, "TER")?;
            }
            writeln!(writer, "{}", format_pdb_line(atom))?;
            previous_chain = Some(atom.chain_id);
        }
        if !atoms.is_empty() {
            writeln!(writer, "TER")?;
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}
