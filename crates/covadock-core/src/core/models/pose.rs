use crate::core::io::pdbqt::read_atoms_lenient;
use crate::core::models::atom::AtomRecord;
use crate::core::scoring::covalent::{CovalentAssessment, CovalentPrediction};
use nalgebra::Point3;

/// One docked placement of the ligand, as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    /// Engine-assigned mode index, 1-based and unique within a result set.
    pub mode: u32,
    /// Binding affinity in kcal/mol (more negative binds tighter). `None` when the engine
    /// reported coordinates for this mode but no score.
    pub affinity: Option<f64>,
    pub rmsd_lower_bound: Option<f64>,
    pub rmsd_upper_bound: Option<f64>,
    /// The raw `MODEL`..`ENDMDL` block, including both marker lines.
    pub coordinates: String,
    pub distance_to_target: Option<f64>,
    pub covalent_score: Option<f64>,
    pub covalent_prediction: Option<CovalentPrediction>,
    pub assessment: Option<CovalentAssessment>,
}

impl Pose {
    pub fn new(mode: u32, coordinates: String) -> Self {
        Self {
            mode,
            affinity: None,
            rmsd_lower_bound: None,
            rmsd_upper_bound: None,
            coordinates,
            distance_to_target: None,
            covalent_score: None,
            covalent_prediction: None,
            assessment: None,
        }
    }

    /// Atom records of the block in file order. Unreadable coordinates default to 0.0.
    pub fn atoms(&self) -> Vec<AtomRecord> {
        read_atoms_lenient(&self.coordinates)
    }

    pub fn atom_positions(&self) -> Vec<Point3<f64>> {
        self.atoms().into_iter().map(|a| a.position).collect()
    }

    pub fn is_scored(&self) -> bool {
        self.covalent_score.is_some()
    }
}
