use thiserror::Error;

use super::config::{ConfigError, ResidueSpecifier};
use super::state::DockingStage;
use super::toolkit::ToolkitError;
use crate::core::chem::smiles::SmilesError;
use crate::core::io::pdb::PdbError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to convert '{molecule}' ({tier}): {reason}")]
    ConversionFailure {
        molecule: String,
        tier: String,
        reason: String,
    },

    #[error(
        "Docking engine failed (exit code {}): {reason}\n  command: {command}\n  receptor: {receptor}\n  ligand: {ligand}",
        describe_exit(.exit_code)
    )]
    DockingEngineFailure {
        command: String,
        receptor: String,
        ligand: String,
        exit_code: Option<i32>,
        reason: String,
    },

    #[error("Target residue {spec} not found in receptor")]
    MissingTargetResidue { spec: ResidueSpecifier },

    #[error("Docking engine output contained no poses")]
    NoPoses,

    #[error("Illegal pipeline transition from {from:?} to {to:?}")]
    InvalidTransition { from: DockingStage, to: DockingStage },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Chemistry toolkit error: {0}")]
    Toolkit(#[from] ToolkitError),

    #[error("Failed to read receptor structure: {0}")]
    Structure(#[from] PdbError),

    #[error("Invalid SMILES: {0}")]
    Smiles(#[from] SmilesError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}
