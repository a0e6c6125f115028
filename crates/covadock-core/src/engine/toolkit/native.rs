use super::{ChemistryToolkit, ConversionOptions, EmbedOptions, ToolkitError, require_output};
use crate::core::io::normalize::StructureRole;
use crate::core::io::pdb::PdbFile;
use crate::core::io::pdbqt::{PdbqtFile, write_rigid_ligand, write_rigid_receptor};
use crate::core::io::traits::StructureFile;
use crate::core::models::molecule::Molecule;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// In-process conversion of PDB or PDBQT input to rigid PDBQT.
///
/// Without bond perception it cannot assign charges or torsion trees: ligands become a
/// single rigid root, receptors plain typed atoms.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeToolkit;

impl ChemistryToolkit for NativeToolkit {
    fn name(&self) -> &'static str {
        "native"
    }

    fn embed(
        &self,
        _smiles: &str,
        _options: &EmbedOptions,
        _workdir: &Path,
    ) -> Result<Molecule, ToolkitError> {
        Err(ToolkitError::Unsupported {
            toolkit: self.name(),
            operation: "3D embedding",
        })
    }

    fn convert(
        &self,
        input: &Path,
        output: &Path,
        options: &ConversionOptions,
    ) -> Result<(), ToolkitError> {
        if options.charges.is_some() {
            return Err(ToolkitError::Unsupported {
                toolkit: self.name(),
                operation: "partial charge assignment",
            });
        }

        let is_pdbqt = input
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdbqt"));
        let atoms = if is_pdbqt {
            PdbqtFile::read_from_path(input)?
        } else {
            PdbFile::read_from_path(input)?
        };
        if atoms.is_empty() {
            return Err(ToolkitError::EmptyOutput {
                path: output.to_string_lossy().to_string(),
            });
        }

        let mut writer = BufWriter::new(File::create(output)?);
        match options.role {
            StructureRole::Ligand => write_rigid_ligand(&atoms, &mut writer)?,
            StructureRole::Receptor => write_rigid_receptor(&atoms, &mut writer)?,
        }
        writer.flush()?;
        require_output(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const RECEPTOR: &str = "\
ATOM      1  N   CYS A  10       0.000   0.000   0.000  1.00  0.00           N
ATOM      2  SG  CYS A  10       1.000   2.000   3.000  1.00  0.00           S
END
";

    #[test]
    fn converts_pdb_to_rigid_receptor() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("rec.pdb");
        let output = dir.path().join("rec.pdbqt");
        fs::write(&input, RECEPTOR).unwrap();

        NativeToolkit
            .convert(&input, &output, &ConversionOptions::rigid_receptor())
            .unwrap();
        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(!text.contains("ROOT"));
        assert!(text.lines().nth(1).unwrap().ends_with("SA"));
    }

    #[test]
    fn ligand_conversion_writes_a_rigid_root() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("lig.pdb");
        let output = dir.path().join("lig.pdbqt");
        fs::write(&input, RECEPTOR).unwrap();

        NativeToolkit
            .convert(&input, &output, &ConversionOptions::ligand())
            .unwrap();
        let text = fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("ROOT\n"));
        assert!(text.ends_with("TORSDOF 0\n"));
    }

    #[test]
    fn charges_and_embedding_are_unsupported() {
        let dir = tempdir().unwrap();
        let result = NativeToolkit.convert(
            &dir.path().join("in.pdb"),
            &dir.path().join("out.pdbqt"),
            &ConversionOptions::ligand_with_charges(),
        );
        assert!(matches!(result, Err(ToolkitError::Unsupported { .. })));
        assert!(matches!(
            NativeToolkit.embed("CCO", &EmbedOptions::default(), dir.path()),
            Err(ToolkitError::Unsupported { .. })
        ));
    }
}
