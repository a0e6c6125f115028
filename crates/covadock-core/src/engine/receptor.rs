use super::error::EngineError;
use super::toolkit::{ChemistryToolkit, ConversionOptions, ToolkitError};
use super::workspace::write_atomically;
use crate::core::io::normalize::{StructureRole, normalize, validate};
use crate::core::io::pdb::PdbFile;
use crate::core::io::pdbqt::read_atoms_lenient;
use crate::core::io::traits::StructureFile;
use crate::core::models::atom::{AtomRecord, RecordKind};
use crate::core::models::structure::Structure;
use std::path::Path;
use tracing::{debug, info, warn};

fn is_pdbqt(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdbqt"))
}

/// Reads a receptor as a chain/residue view. PDBQT input is read leniently.
pub fn read_structure(path: &Path) -> Result<Structure, EngineError> {
    if is_pdbqt(path) {
        let text = std::fs::read_to_string(path)?;
        Ok(Structure::from_atoms(read_atoms_lenient(&text)))
    } else {
        Ok(PdbFile::read_structure_from_path(path)?)
    }
}

/// Drops hydrogens and waters, and optionally all `HETATM` records.
pub fn clean_receptor(atoms: &[AtomRecord], remove_heteroatoms: bool) -> Vec<AtomRecord> {
    atoms
        .iter()
        .filter(|a| !a.is_hydrogen() && !a.is_water())
        .filter(|a| !(remove_heteroatoms && a.kind == RecordKind::Hetatm))
        .cloned()
        .collect()
}

/// Turns a protein structure into a rigid PDBQT receptor.
///
/// The primary converter is tried first, then the fallback; the first non-empty result
/// is normalized and written atomically.
pub struct ReceptorPreparer<'a> {
    converter: &'a dyn ChemistryToolkit,
    fallback: &'a dyn ChemistryToolkit,
    remove_heteroatoms: bool,
}

impl<'a> ReceptorPreparer<'a> {
    pub fn new(converter: &'a dyn ChemistryToolkit, fallback: &'a dyn ChemistryToolkit) -> Self {
        Self {
            converter,
            fallback,
            remove_heteroatoms: false,
        }
    }

    pub fn remove_heteroatoms(mut self, remove: bool) -> Self {
        self.remove_heteroatoms = remove;
        self
    }

    pub fn prepare(&self, input: &Path, output: &Path) -> Result<(), EngineError> {
        let failure_at = |tier: &str, reason: String| EngineError::ConversionFailure {
            molecule: input.display().to_string(),
            tier: tier.to_string(),
            reason,
        };
        let failure = |reason: String| failure_at("receptor", reason);

        let text = if is_pdbqt(input) {
            std::fs::read_to_string(input)?
        } else {
            let atoms = PdbFile::read_from_path(input)?;
            let cleaned = clean_receptor(&atoms, self.remove_heteroatoms);
            if cleaned.is_empty() {
                return Err(failure("no receptor atoms left after cleaning".to_string()));
            }
            let clean_path = output.with_extension("clean.pdb");
            PdbFile::write_to_path(&cleaned, &clean_path)?;
            self.convert(&clean_path, output)
                .map_err(|(toolkit, reason)| failure_at(toolkit, reason))?
        };

        let normalized = normalize(&text, StructureRole::Receptor);
        if !validate(&normalized) {
            return Err(failure("converted receptor contains no atoms".to_string()));
        }
        write_atomically(output, &normalized)?;
        Ok(())
    }

    /// Runs the converter, then the fallback. On failure, returns the name of the last
    /// toolkit tried with both toolkits' errors.
    fn convert(&self, clean_path: &Path, output: &Path) -> Result<String, (&'static str, String)> {
        let candidate = output.with_extension("converted.pdbqt");
        let options = ConversionOptions::rigid_receptor();
        let run = |toolkit: &dyn ChemistryToolkit| {
            let result = toolkit
                .convert(clean_path, &candidate, &options)
                .and_then(|()| std::fs::read_to_string(&candidate).map_err(ToolkitError::from));
            if let Err(e) = std::fs::remove_file(&candidate) {
                debug!(path = %candidate.display(), error = %e, "Could not remove converted receptor");
            }
            result
        };

        match run(self.converter) {
            Ok(text) => {
                info!(toolkit = self.converter.name(), "Prepared receptor");
                Ok(text)
            }
            Err(e) => {
                warn!(
                    toolkit = self.converter.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "Receptor conversion failed; trying fallback"
                );
                let text = run(self.fallback).map_err(|fallback_error| {
                    let reason = format!(
                        "{}: {e}; {}: {fallback_error}",
                        self.converter.name(),
                        self.fallback.name()
                    );
                    (self.fallback.name(), reason)
                })?;
                info!(toolkit = self.fallback.name(), "Prepared receptor");
                Ok(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::molecule::Molecule;
    use crate::engine::toolkit::{EmbedOptions, NativeToolkit};
    use nalgebra::Point3;
    use std::fs;
    use tempfile::tempdir;

    const PDB: &str = "\
HEADER    PROTEASE
ATOM      1  N   CYS A 145       0.000   0.000   0.000  1.00  0.00           N
ATOM      2  SG  CYS A 145       1.000   2.000   3.000  1.00  0.00           S
ATOM      3  HG  CYS A 145       1.500   2.000   3.000  1.00  0.00           H
HETATM    4  O   HOH A 301       9.000   9.000   9.000  1.00  0.00           O
HETATM    5 ZN    ZN A 302       5.000   5.000   5.000  1.00  0.00          ZN
END
";

    struct Failing(&'static str);

    impl ChemistryToolkit for Failing {
        fn name(&self) -> &'static str {
            self.0
        }
        fn embed(&self, _: &str, _: &EmbedOptions, _: &Path) -> Result<Molecule, ToolkitError> {
            Err(ToolkitError::Unsupported {
                toolkit: self.0,
                operation: "3D embedding",
            })
        }
        fn convert(&self, _: &Path, _: &Path, _: &ConversionOptions) -> Result<(), ToolkitError> {
            Err(ToolkitError::Failed {
                command: "obabel".into(),
                exit_code: Some(1),
                stderr: "boom".into(),
            })
        }
    }

    #[test]
    fn cleaning_drops_hydrogens_and_waters() {
        let atoms = vec![
            AtomRecord::new(1, "SG", "S", Point3::origin()).with_residue("CYS", 'A', 1),
            AtomRecord::new(2, "HG", "H", Point3::origin()).with_residue("CYS", 'A', 1),
            AtomRecord::new(3, "O", "O", Point3::origin())
                .with_residue("HOH", 'A', 2)
                .with_kind(RecordKind::Hetatm),
            AtomRecord::new(4, "ZN", "Zn", Point3::origin())
                .with_residue("ZN", 'A', 3)
                .with_kind(RecordKind::Hetatm),
        ];
        assert_eq!(clean_receptor(&atoms, false).len(), 2);
        assert_eq!(clean_receptor(&atoms, true).len(), 1);
    }

    #[test]
    fn falls_back_when_the_converter_fails() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("protein.pdb");
        let output = dir.path().join("receptor.pdbqt");
        fs::write(&input, PDB).unwrap();

        ReceptorPreparer::new(&Failing("failing"), &NativeToolkit)
            .prepare(&input, &output)
            .unwrap();
        let text = fs::read_to_string(&output).unwrap();
        let atom_lines = text.lines().filter(|l| l.starts_with("ATOM") || l.starts_with("HETATM")).count();
        assert_eq!(atom_lines, 3);
        assert!(!text.contains("ROOT"));
        assert!(!text.contains("HOH"));
    }

    #[test]
    fn both_converters_failing_is_a_conversion_failure() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("protein.pdb");
        fs::write(&input, PDB).unwrap();
        let err = ReceptorPreparer::new(&Failing("primary"), &Failing("backup"))
            .prepare(&input, &dir.path().join("receptor.pdbqt"))
            .unwrap_err();
        match err {
            EngineError::ConversionFailure { tier, reason, .. } => {
                assert_eq!(tier, "backup");
                assert!(reason.starts_with("primary: "));
                assert!(reason.contains("; backup: "));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("receptor.converted.pdbqt").exists());
    }

    #[test]
    fn pdbqt_input_is_normalized_without_conversion() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("given.pdbqt");
        let output = dir.path().join("receptor.pdbqt");
        fs::write(
            &input,
            "REMARK x\nROOT\nATOM      1  SG  CYS A 145       1.000   2.000   3.000  1.00  0.00     0.000 SA\nENDROOT\n",
        )
        .unwrap();
        ReceptorPreparer::new(&Failing("failing"), &Failing("failing"))
            .prepare(&input, &output)
            .unwrap();
        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().count(), 1);
        let structure = read_structure(&input).unwrap();
        assert!(structure.residue('A', 145).is_some());
    }
}
