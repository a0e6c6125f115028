use super::error::EngineError;
use super::toolkit::{ChemistryToolkit, ConversionOptions, ToolkitError};
use super::workspace::write_atomically;
use crate::core::io::normalize::{StructureRole, normalize};
use crate::core::io::pdb::PdbFile;
use crate::core::io::pdbqt::{read_atoms_lenient, write_rigid_ligand};
use crate::core::io::traits::StructureFile;
use crate::core::models::molecule::Molecule;
use crate::core::utils::geometry::distance;
use nalgebra::Point3;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Coordinates closer than this, in Å, are treated as the same atom.
const CORRELATION_TOLERANCE: f64 = 0.01;

/// Which fallback produced the prepared ligand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LigandTier {
    /// Toolkit conversion with Gasteiger partial charges.
    ChargedConversion,
    /// Toolkit conversion without explicit charges.
    PlainConversion,
    /// Rigid ligand written directly from atom coordinates.
    DirectWriter,
}

impl LigandTier {
    pub const ALL: [LigandTier; 3] = [
        LigandTier::ChargedConversion,
        LigandTier::PlainConversion,
        LigandTier::DirectWriter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LigandTier::ChargedConversion => "charged-conversion",
            LigandTier::PlainConversion => "plain-conversion",
            LigandTier::DirectWriter => "direct-writer",
        }
    }
}

impl fmt::Display for LigandTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps each molecule atom to the ordinal of its atom record in the prepared ligand.
///
/// Atoms the conversion dropped (merged non-polar hydrogens) or moved are unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomCorrelation {
    map: Vec<Option<usize>>,
}

impl AtomCorrelation {
    pub fn from_map(map: Vec<Option<usize>>) -> Self {
        Self { map }
    }

    /// Matches each molecule atom to the nearest unused prepared atom within tolerance.
    fn by_coordinates(molecule: &Molecule, prepared_text: &str) -> Self {
        let prepared = read_atoms_lenient(prepared_text);
        let mut used = vec![false; prepared.len()];
        let map = molecule
            .atoms()
            .iter()
            .map(|atom| {
                let (ordinal, _) = prepared
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !used[*i])
                    .map(|(i, p)| (i, distance(&atom.position, &p.position)))
                    .filter(|(_, d)| *d < CORRELATION_TOLERANCE)
                    .min_by(|a, b| a.1.total_cmp(&b.1))?;
                used[ordinal] = true;
                Some(ordinal)
            })
            .collect();
        Self { map }
    }

    /// The prepared-ligand ordinal of molecule atom `idx`.
    pub fn get(&self, idx: usize) -> Option<usize> {
        self.map.get(idx).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn mapped_count(&self) -> usize {
        self.map.iter().filter(|m| m.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLigand {
    pub path: PathBuf,
    pub tier: LigandTier,
    pub correlation: AtomCorrelation,
}

/// Turns an embedded molecule into a docking-ready PDBQT ligand.
pub struct LigandPreparer<'a> {
    toolkit: &'a dyn ChemistryToolkit,
}

impl<'a> LigandPreparer<'a> {
    pub fn new(toolkit: &'a dyn ChemistryToolkit) -> Self {
        Self { toolkit }
    }

    /// Writes `output` using the first tier that yields a non-empty file.
    ///
    /// The intermediate PDB is written beside `output`; the final file is normalized and
    /// written atomically.
    pub fn prepare(&self, molecule: &Molecule, output: &Path) -> Result<PreparedLigand, EngineError> {
        if molecule.is_empty() {
            return Err(EngineError::ConversionFailure {
                molecule: molecule.name.clone(),
                tier: "input".to_string(),
                reason: "molecule has no atoms".to_string(),
            });
        }

        let input = output.with_extension("input.pdb");
        PdbFile::write_to_path(molecule.atoms(), &input)?;

        let mut failures = Vec::new();
        for tier in LigandTier::ALL {
            let text = match self.attempt(tier, molecule, &input, output) {
                Ok(text) => text,
                Err(reason) => {
                    warn!(
                        tier = %tier,
                        toolkit = self.toolkit.name(),
                        %reason,
                        "Ligand preparation tier failed; falling back"
                    );
                    failures.push((tier, reason));
                    continue;
                }
            };

            let normalized = normalize(&text, StructureRole::Ligand);
            write_atomically(output, &normalized)?;
            let correlation = AtomCorrelation::by_coordinates(molecule, &normalized);
            info!(
                ligand = %molecule.name,
                tier = %tier,
                mapped_atoms = correlation.mapped_count(),
                total_atoms = correlation.len(),
                "Prepared ligand"
            );
            return Ok(PreparedLigand {
                path: output.to_path_buf(),
                tier,
                correlation,
            });
        }

        Err(exhausted(&molecule.name, &failures))
    }

    /// Produces the PDBQT text for one tier, or the reason it failed.
    fn attempt(
        &self,
        tier: LigandTier,
        molecule: &Molecule,
        input: &Path,
        output: &Path,
    ) -> Result<String, String> {
        let options = match tier {
            LigandTier::ChargedConversion => ConversionOptions::ligand_with_charges(),
            LigandTier::PlainConversion => ConversionOptions::ligand(),
            LigandTier::DirectWriter => {
                let non_finite = |p: &Point3<f64>| p.coords.iter().any(|c| !c.is_finite());
                if let Some(atom) = molecule.atoms().iter().find(|a| non_finite(&a.position)) {
                    return Err(format!("atom {} has non-finite coordinates", atom.name));
                }
                let mut buffer = Vec::new();
                write_rigid_ligand(molecule.atoms(), &mut buffer).map_err(|e| e.to_string())?;
                return String::from_utf8(buffer).map_err(|e| e.to_string());
            }
        };

        let candidate = output.with_extension(format!("{}.pdbqt", tier.as_str()));
        let result = self
            .toolkit
            .convert(input, &candidate, &options)
            .and_then(|()| std::fs::read_to_string(&candidate).map_err(ToolkitError::from));
        if let Err(e) = std::fs::remove_file(&candidate) {
            debug!(path = %candidate.display(), error = %e, "Could not remove tier output");
        }

        match result {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) => Err("conversion produced an empty file".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// The error for a ligand no tier could prepare. `tier` names the last tier tried; the
/// reason lists every tier's failure in order.
fn exhausted(molecule: &str, failures: &[(LigandTier, String)]) -> EngineError {
    let tier = failures
        .last()
        .map_or(LigandTier::DirectWriter, |(tier, _)| *tier);
    let reason = failures
        .iter()
        .map(|(tier, reason)| format!("{tier}: {reason}"))
        .collect::<Vec<_>>()
        .join("; ");
    EngineError::ConversionFailure {
        molecule: molecule.to_string(),
        tier: tier.as_str().to_string(),
        reason,
    }
}
