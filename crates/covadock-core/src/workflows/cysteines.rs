use crate::core::models::structure::Structure;
use crate::core::scoring::disulfide::{CysteineAnalysis, DisulfideAnalyzer};
use crate::engine::error::EngineError;
use crate::engine::receptor::read_structure;
use std::path::Path;
use tracing::{info, instrument};

/// Lists the cysteines of `structure` and the pairs close enough to form a disulfide.
#[instrument(skip_all, name = "cysteine_analysis")]
pub fn analyze(structure: &Structure) -> CysteineAnalysis {
    let analysis = DisulfideAnalyzer.analyze(structure);
    info!(
        cysteines = analysis.cysteines.len(),
        chains = analysis.chain_groups.len(),
        potential_disulfides = analysis.potential_disulfide_bonds.len(),
        "Cysteine analysis complete"
    );
    analysis
}

/// Reads a PDB or PDBQT receptor and analyzes it.
pub fn analyze_path(path: &Path) -> Result<CysteineAnalysis, EngineError> {
    Ok(analyze(&read_structure(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_and_pairs_cysteines_from_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("protein.pdb");
        fs::write(
            &path,
            "\
ATOM      1  SG  CYS A  22       0.000   0.000   0.000  1.00  0.00           S
ATOM      2  SG  CYS A  96       2.050   0.000   0.000  1.00  0.00           S
ATOM      3  SG  CYS B   5      20.000   0.000   0.000  1.00  0.00           S
ATOM      4  CA  CYS B   9      30.000   0.000   0.000  1.00  0.00           C
END
",
        )
        .unwrap();

        let analysis = analyze_path(&path).unwrap();
        assert_eq!(analysis.cysteines.len(), 4);
        assert_eq!(analysis.chain_groups[&'A'], vec![22, 96]);
        assert_eq!(analysis.chain_groups[&'B'], vec![5, 9]);
        assert_eq!(analysis.potential_disulfide_bonds.len(), 1);
        assert_eq!(analysis.potential_disulfide_bonds[0].first, ('A', 22));
        assert!((analysis.potential_disulfide_bonds[0].distance - 2.05).abs() < 1e-9);
    }
}
