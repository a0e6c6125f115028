use crate::core::chem::smiles::SmilesError;
use crate::core::warheads::catalogue::WarheadCatalogue;
use crate::core::warheads::detector::{WarheadDetector, WarheadReport};
use tracing::instrument;

/// Detects warheads in `smiles` against the built-in catalogue.
#[instrument(skip_all, name = "warhead_detection", fields(smiles = %smiles))]
pub fn detect(smiles: &str) -> Result<WarheadReport, SmilesError> {
    WarheadDetector::new().detect_smiles(smiles)
}

/// Like [`detect`], against a caller-supplied catalogue.
pub fn detect_with(smiles: &str, catalogue: &WarheadCatalogue) -> Result<WarheadReport, SmilesError> {
    WarheadDetector::with_catalogue(catalogue).detect_smiles(smiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::warheads::catalogue::CatalogueEntry;

    #[test]
    fn detects_an_anilide_acrylamide() {
        let report = detect("C=CC(=O)Nc1ccccc1").unwrap();
        assert!(report.has_warhead);
        assert!(report.names().contains(&"acrylamide"));
        assert_eq!(report.matches[0].atom_indices, vec![vec![0, 1, 2, 3, 4]]);
    }

    #[test]
    fn caller_catalogue_is_used_instead_of_the_builtin_one() {
        let catalogue = WarheadCatalogue::from_entries([CatalogueEntry {
            name: "alcohol".into(),
            smarts: "[OX2H1]".into(),
        }]);
        assert_eq!(detect_with("CCO", &catalogue).unwrap().names(), vec!["alcohol"]);
        assert!(!detect_with("C=CC(=O)N", &catalogue).unwrap().has_warhead);
        assert!(detect("CCO").unwrap().matches.is_empty());
    }
}
