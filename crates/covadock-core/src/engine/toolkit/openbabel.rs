use super::{
    ChemistryToolkit, ConversionOptions, EmbedOptions, ToolkitError, require_output,
};
use crate::core::io::normalize::StructureRole;
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::StructureFile;
use crate::core::models::atom::AtomRecord;
use crate::core::models::molecule::Molecule;
use crate::engine::process::{ExternalProcess, Invocation, ProcessOutput};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The Open Babel command-line converter (`obabel`).
pub struct OpenBabel<'a> {
    executable: PathBuf,
    process: &'a dyn ExternalProcess,
}

impl<'a> OpenBabel<'a> {
    pub fn new(executable: impl Into<PathBuf>, process: &'a dyn ExternalProcess) -> Self {
        Self {
            executable: executable.into(),
            process,
        }
    }

    /// Probes `obabel -V` and returns the reported version line.
    pub fn check_available(&self) -> Result<String, ToolkitError> {
        let invocation = Invocation::new(&self.executable).arg("-V");
        let output = self.execute(&invocation)?;
        Ok(output.stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    fn execute(&self, invocation: &Invocation) -> Result<ProcessOutput, ToolkitError> {
        let command = invocation.display();
        debug!(%command, "Running Open Babel");
        let output = self
            .process
            .run(invocation)
            .map_err(|source| ToolkitError::Launch {
                command: command.clone(),
                source,
            })?;
        if !output.success() {
            return Err(ToolkitError::Failed {
                command,
                exit_code: output.status,
                stderr: output.stderr_excerpt(5),
            });
        }
        Ok(output)
    }
}

/// Moves hydrogens behind the heavy atoms, keeping relative order within each group.
fn heavy_atoms_first(atoms: Vec<AtomRecord>) -> Vec<AtomRecord> {
    let (heavy, hydrogens): (Vec<_>, Vec<_>) = atoms.into_iter().partition(|a| !a.is_hydrogen());
    heavy.into_iter().chain(hydrogens).collect()
}

impl ChemistryToolkit for OpenBabel<'_> {
    fn name(&self) -> &'static str {
        "Open Babel"
    }

    fn embed(
        &self,
        smiles: &str,
        options: &EmbedOptions,
        workdir: &Path,
    ) -> Result<Molecule, ToolkitError> {
        let output = workdir.join("embedded.pdb");
        let invocation = Invocation::new(&self.executable)
            .arg(format!("-:{smiles}"))
            .args(["-h", "--gen3d", "--minimize", "--ff"])
            .arg(&options.forcefield)
            .arg("--steps")
            .arg(options.steps.to_string())
            .args(["-opdb", "-O"])
            .arg(&output)
            .current_dir(workdir);
        self.execute(&invocation)?;
        require_output(&output)?;

        let atoms = heavy_atoms_first(PdbFile::read_from_path(&output)?);
        if atoms.is_empty() {
            return Err(ToolkitError::EmptyOutput {
                path: output.to_string_lossy().to_string(),
            });
        }
        Ok(Molecule::new(smiles, atoms))
    }

    fn convert(
        &self,
        input: &Path,
        output: &Path,
        options: &ConversionOptions,
    ) -> Result<(), ToolkitError> {
        let mut invocation = Invocation::new(&self.executable)
            .arg(input)
            .args(["-opdbqt", "-O"])
            .arg(output);
        invocation = match options.role {
            StructureRole::Receptor => invocation.arg("-xr"),
            StructureRole::Ligand => invocation.arg("-xn"),
        };
        if let Some(model) = options.charges {
            invocation = invocation.arg("--partialcharge").arg(model.as_str());
        }
        self.execute(&invocation)?;
        require_output(output)
    }
}
