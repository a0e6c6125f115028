use crate::core::models::structure::Structure;
use crate::core::utils::geometry::distance;
use nalgebra::Point3;
use serde::Serialize;
use std::collections::BTreeMap;

/// Largest SG-SG distance, in Å, still flagged as a potential disulfide bond (inclusive).
pub const DISULFIDE_CUTOFF: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CysteineSite {
    pub chain_id: char,
    pub residue_number: isize,
    /// `None` when the residue has no `SG` atom; such sites are never paired.
    #[serde(skip)]
    pub sulfur: Option<Point3<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CysteinePair {
    pub first: (char, isize),
    pub second: (char, isize),
    pub distance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CysteineAnalysis {
    pub cysteines: Vec<CysteineSite>,
    pub chain_groups: BTreeMap<char, Vec<isize>>,
    /// Pairs within [`DISULFIDE_CUTOFF`], closest first.
    pub potential_disulfide_bonds: Vec<CysteinePair>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisulfideAnalyzer;

impl DisulfideAnalyzer {
    pub fn analyze(&self, structure: &Structure) -> CysteineAnalysis {
        let cysteines: Vec<CysteineSite> = structure
            .residues()
            .filter(|residue| residue.name == "CYS")
            .map(|residue| CysteineSite {
                chain_id: residue.chain_id,
                residue_number: residue.residue_number,
                sulfur: structure.find_atom(residue, "SG").map(|atom| atom.position),
            })
            .collect();

        let mut chain_groups: BTreeMap<char, Vec<isize>> = BTreeMap::new();
        for site in &cysteines {
            chain_groups
                .entry(site.chain_id)
                .or_default()
                .push(site.residue_number);
        }

        let with_sulfur: Vec<(&CysteineSite, Point3<f64>)> = cysteines
            .iter()
            .filter_map(|site| site.sulfur.map(|sg| (site, sg)))
            .collect();

        let mut pairs = Vec::new();
        for (i, (a, sg_a)) in with_sulfur.iter().enumerate() {
            for (b, sg_b) in &with_sulfur[i + 1..] {
                let d = distance(sg_a, sg_b);
                if d <= DISULFIDE_CUTOFF {
                    pairs.push(CysteinePair {
                        first: (a.chain_id, a.residue_number),
                        second: (b.chain_id, b.residue_number),
                        distance: d,
                    });
                }
            }
        }
        pairs.sort_by(|x, y| x.distance.total_cmp(&y.distance));

        CysteineAnalysis {
            cysteines,
            chain_groups,
            potential_disulfide_bonds: pairs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::AtomRecord;

    fn cys(serial: usize, chain: char, num: isize, sg: Option<Point3<f64>>) -> Vec<AtomRecord> {
        let mut atoms = vec![
            AtomRecord::new(serial, "CA", "C", Point3::new(100.0, 100.0, num as f64))
                .with_residue("CYS", chain, num),
        ];
        if let Some(position) = sg {
            atoms.push(AtomRecord::new(serial + 1, "SG", "S", position).with_residue("CYS", chain, num));
        }
        atoms
    }

    fn analyze(atoms: Vec<Vec<AtomRecord>>) -> CysteineAnalysis {
        let structure = Structure::from_atoms(atoms.into_iter().flatten().collect());
        DisulfideAnalyzer.analyze(&structure)
    }

    #[test]
    fn cutoff_is_inclusive() {
        let analysis = analyze(vec![
            cys(1, 'A', 10, Some(Point3::new(0.0, 0.0, 0.0))),
            cys(3, 'A', 20, Some(Point3::new(3.0, 0.0, 0.0))),
            cys(5, 'B', 30, Some(Point3::new(-3.01, 0.0, 0.0))),
        ]);
        assert_eq!(analysis.potential_disulfide_bonds.len(), 1);
        let pair = &analysis.potential_disulfide_bonds[0];
        assert_eq!(pair.first, ('A', 10));
        assert_eq!(pair.second, ('A', 20));
        assert!((pair.distance - 3.0).abs() < 1e-12);
    }

    #[test]
    fn pairs_are_sorted_by_distance() {
        let analysis = analyze(vec![
            cys(1, 'A', 1, Some(Point3::new(0.0, 0.0, 0.0))),
            cys(3, 'A', 2, Some(Point3::new(2.9, 0.0, 0.0))),
            cys(5, 'A', 3, Some(Point3::new(0.0, 2.0, 0.0))),
        ]);
        let distances: Vec<f64> = analysis
            .potential_disulfide_bonds
            .iter()
            .map(|p| p.distance)
            .collect();
        assert_eq!(distances.len(), 2);
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(analysis.potential_disulfide_bonds[0].second, ('A', 3));
    }

    #[test]
    fn cysteines_without_sulfur_are_listed_but_not_paired() {
        let analysis = analyze(vec![
            cys(1, 'B', 7, None),
            cys(2, 'A', 4, Some(Point3::origin())),
            cys(4, 'B', 9, Some(Point3::new(0.5, 0.0, 0.0))),
        ]);
        assert_eq!(analysis.cysteines.len(), 3);
        assert_eq!(analysis.cysteines[0].sulfur, None);
        assert_eq!(analysis.chain_groups[&'A'], vec![4]);
        assert_eq!(analysis.chain_groups[&'B'], vec![7, 9]);
        assert_eq!(analysis.potential_disulfide_bonds.len(), 1);
    }
}
