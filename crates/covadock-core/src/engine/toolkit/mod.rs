//! # Chemistry Toolkit Capability
//!
//! The pipeline never perceives bonds, assigns charges or generates 3D coordinates itself.
//! It delegates those tasks to a [`ChemistryToolkit`], injected by the caller.
//!
//! ## Contract
//!
//! - [`ChemistryToolkit::embed`] turns a SMILES string into a relaxed 3D [`Molecule`]
//!   whose first atoms are the SMILES heavy atoms in SMILES order, followed by any added
//!   hydrogens. Warhead atom indices from the in-process SMILES parser address the
//!   embedded molecule through this ordering.
//! - [`ChemistryToolkit::convert`] writes a docking-ready PDBQT file for a ligand or a rigid
//!   receptor, optionally assigning partial charges.
//!
//! ## Implementations
//!
//! - [`OpenBabel`] - Drives the `obabel` command line through an
//!   [`ExternalProcess`](super::process::ExternalProcess)
//! - [`NativeToolkit`] - In-process conversion without charges; cannot embed

mod native;
mod openbabel;

pub use native::NativeToolkit;
pub use openbabel::OpenBabel;

use crate::core::io::normalize::StructureRole;
use crate::core::io::pdb::PdbError;
use crate::core::io::pdbqt::PdbqtError;
use crate::core::models::molecule::Molecule;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("{toolkit} does not support {operation}")]
    Unsupported {
        toolkit: &'static str,
        operation: &'static str,
    },
    #[error("Failed to start '{command}': {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },
    #[error("'{command}' failed (exit code {exit_code:?}): {stderr}")]
    Failed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("Toolkit produced no output at '{path}'")]
    EmptyOutput { path: String },
    #[error("Failed to read toolkit output: {0}")]
    Pdb(#[from] PdbError),
    #[error("Failed to read toolkit output: {0}")]
    Pdbqt(#[from] PdbqtError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Force-field relaxation settings for 3D embedding.
///
/// There is no seed: `obabel --gen3d` runs a stochastic conformer search and accepts none,
/// so repeated embeddings of one SMILES may differ in geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedOptions {
    pub forcefield: String,
    pub steps: u32,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            forcefield: "MMFF94".to_string(),
            steps: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargeModel {
    Gasteiger,
}

impl ChargeModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeModel::Gasteiger => "gasteiger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionOptions {
    pub role: StructureRole,
    pub charges: Option<ChargeModel>,
}

impl ConversionOptions {
    pub fn ligand_with_charges() -> Self {
        Self {
            role: StructureRole::Ligand,
            charges: Some(ChargeModel::Gasteiger),
        }
    }

    pub fn ligand() -> Self {
        Self {
            role: StructureRole::Ligand,
            charges: None,
        }
    }

    pub fn rigid_receptor() -> Self {
        Self {
            role: StructureRole::Receptor,
            charges: None,
        }
    }
}

pub trait ChemistryToolkit: Send + Sync {
    fn name(&self) -> &'static str;

    /// Generates hydrogens and relaxed 3D coordinates for `smiles`, using `workdir` for
    /// any intermediate files.
    fn embed(
        &self,
        smiles: &str,
        options: &EmbedOptions,
        workdir: &Path,
    ) -> Result<Molecule, ToolkitError>;

    /// Converts the structure at `input` to PDBQT at `output`.
    fn convert(
        &self,
        input: &Path,
        output: &Path,
        options: &ConversionOptions,
    ) -> Result<(), ToolkitError>;
}

/// Fails with [`ToolkitError::EmptyOutput`] unless `path` is a non-empty file.
pub(crate) fn require_output(path: &Path) -> Result<(), ToolkitError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(ToolkitError::EmptyOutput {
            path: path.to_string_lossy().to_string(),
        }),
    }
}
