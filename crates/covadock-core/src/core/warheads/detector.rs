use super::catalogue::{WarheadCatalogue, WarheadKind};
use crate::core::chem::graph::MolecularGraph;
use crate::core::chem::matcher::find_matches;
use crate::core::chem::smiles::{SmilesError, parse_smiles};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// All occurrences of one catalogue pattern in a molecule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarheadMatch {
    pub name: String,
    pub kind: Option<WarheadKind>,
    /// One tuple per occurrence, in pattern-atom order. Tuples are unique.
    pub atom_indices: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarheadReport {
    pub has_warhead: bool,
    /// Matches in catalogue order; patterns without an occurrence are omitted.
    pub matches: Vec<WarheadMatch>,
}

impl WarheadReport {
    /// Every molecule atom index taking part in any match.
    pub fn reactive_atoms(&self) -> BTreeSet<usize> {
        self.matches
            .iter()
            .flat_map(|m| m.atom_indices.iter().flatten().copied())
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.name.as_str()).collect()
    }
}

pub struct WarheadDetector<'a> {
    catalogue: &'a WarheadCatalogue,
}

impl WarheadDetector<'static> {
    /// A detector over the built-in catalogue.
    pub fn new() -> Self {
        Self {
            catalogue: WarheadCatalogue::global(),
        }
    }
}

impl Default for WarheadDetector<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> WarheadDetector<'a> {
    pub fn with_catalogue(catalogue: &'a WarheadCatalogue) -> Self {
        Self { catalogue }
    }

    /// Tests every catalogue pattern against the molecule independently.
    pub fn detect(&self, graph: &MolecularGraph) -> WarheadReport {
        let matches: Vec<WarheadMatch> = self
            .catalogue
            .patterns()
            .iter()
            .filter_map(|entry| {
                let atom_indices = find_matches(&entry.pattern, graph);
                if atom_indices.is_empty() {
                    return None;
                }
                debug!(warhead = %entry.name, occurrences = atom_indices.len(), "Warhead matched");
                Some(WarheadMatch {
                    name: entry.name.clone(),
                    kind: entry.kind,
                    atom_indices,
                })
            })
            .collect();

        WarheadReport {
            has_warhead: !matches.is_empty(),
            matches,
        }
    }

    pub fn detect_smiles(&self, smiles: &str) -> Result<WarheadReport, SmilesError> {
        let graph = parse_smiles(smiles)?;
        Ok(self.detect(&graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::warheads::catalogue::CatalogueEntry;

    #[test]
    fn acrylamide_is_detected_with_its_atoms() {
        let report = WarheadDetector::new().detect_smiles("C=CC(=O)N").unwrap();
        assert!(report.has_warhead);
        assert_eq!(report.matches[0].kind, Some(WarheadKind::Acrylamide));
        assert_eq!(report.matches[0].atom_indices, vec![vec![0, 1, 2, 3, 4]]);
        assert!(report.reactive_atoms().contains(&0));
    }

    #[test]
    fn saturated_alcohol_has_no_warhead() {
        let report = WarheadDetector::new().detect_smiles("CCO").unwrap();
        assert!(!report.has_warhead);
        assert!(report.matches.is_empty());
        assert!(report.reactive_atoms().is_empty());
    }

    #[test]
    fn overlapping_families_are_all_reported_in_catalogue_order() {
        let report = WarheadDetector::new().detect_smiles("C=CC(=O)C").unwrap();
        assert_eq!(report.names(), vec!["michael_acceptor", "vinyl_ketone"]);
    }

    #[test]
    fn chloroacetamide_and_nitrile_are_detected() {
        let detector = WarheadDetector::new();
        let report = detector.detect_smiles("ClCC(=O)NC").unwrap();
        assert_eq!(report.names(), vec!["chloroacetamide"]);
        let report = detector.detect_smiles("CC#N").unwrap();
        assert_eq!(report.names(), vec!["nitrile"]);
    }

    #[test]
    fn invalid_smiles_is_an_error() {
        assert!(WarheadDetector::new().detect_smiles("C1CC").is_err());
    }

    #[test]
    fn custom_catalogue_replaces_the_builtin_one() {
        let catalogue = WarheadCatalogue::from_entries([CatalogueEntry {
            name: "alcohol".into(),
            smarts: "[OX2H1]".into(),
        }]);
        let report = WarheadDetector::with_catalogue(&catalogue)
            .detect_smiles("CCO")
            .unwrap();
        assert_eq!(report.names(), vec!["alcohol"]);
        assert_eq!(report.matches[0].atom_indices, vec![vec![2]]);
    }
}
