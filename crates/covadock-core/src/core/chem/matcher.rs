use super::graph::MolecularGraph;
use super::smarts::SmartsPattern;
use std::collections::HashSet;

/// Upper bound on the number of unique matches reported for one pattern.
pub const MAX_MATCHES: usize = 1000;

/// Finds all unique embeddings of `pattern` in `graph`.
///
/// Each match lists target atom indices in pattern-atom order. Matches that cover the
/// same set of target atoms are reported once (the first mapping found wins), so a
/// symmetric pattern such as an epoxide yields one match per ring rather than one per
/// automorphism.
pub fn find_matches(pattern: &SmartsPattern, graph: &MolecularGraph) -> Vec<Vec<usize>> {
    if pattern.atom_count() == 0 || pattern.atom_count() > graph.atom_count() {
        return Vec::new();
    }

    let order = search_order(pattern);
    let mut state = MatchState {
        pattern,
        graph,
        order: &order,
        mapping: vec![None; pattern.atom_count()],
        used: vec![false; graph.atom_count()],
        seen: HashSet::new(),
        results: Vec::new(),
    };
    state.extend(0);
    state.results
}

/// Returns `true` if the pattern occurs at least once.
pub fn has_match(pattern: &SmartsPattern, graph: &MolecularGraph) -> bool {
    !find_matches(pattern, graph).is_empty()
}

// Pattern atoms ordered so that every atom after the first of its component has an
// already-placed neighbor, which keeps candidate sets small.
fn search_order(pattern: &SmartsPattern) -> Vec<usize> {
    let n = pattern.atom_count();
    let mut order = Vec::with_capacity(n);
    let mut placed = vec![false; n];
    for root in 0..n {
        if placed[root] {
            continue;
        }
        let mut stack = vec![root];
        while let Some(atom) = stack.pop() {
            if placed[atom] {
                continue;
            }
            placed[atom] = true;
            order.push(atom);
            for &(next, _) in pattern.neighbors(atom).iter().rev() {
                if !placed[next] {
                    stack.push(next);
                }
            }
        }
    }
    order
}

struct MatchState<'a> {
    pattern: &'a SmartsPattern,
    graph: &'a MolecularGraph,
    order: &'a [usize],
    mapping: Vec<Option<usize>>,
    used: Vec<bool>,
    seen: HashSet<Vec<usize>>,
    results: Vec<Vec<usize>>,
}

impl MatchState<'_> {
    fn extend(&mut self, depth: usize) {
        if self.results.len() >= MAX_MATCHES {
            return;
        }
        if depth == self.order.len() {
            self.record();
            return;
        }

        let p = self.order[depth];
        for candidate in self.candidates(p) {
            if self.feasible(p, candidate) {
                self.mapping[p] = Some(candidate);
                self.used[candidate] = true;
                self.extend(depth + 1);
                self.mapping[p] = None;
                self.used[candidate] = false;
            }
        }
    }

    fn candidates(&self, p: usize) -> Vec<usize> {
        let anchor = self
            .pattern
            .neighbors(p)
            .iter()
            .find_map(|&(q, _)| self.mapping[q]);
        match anchor {
            Some(t) => self.graph.neighbors(t).iter().map(|&(n, _)| n).collect(),
            None => (0..self.graph.atom_count()).collect(),
        }
    }

    fn feasible(&self, p: usize, t: usize) -> bool {
        if self.used[t] || !self.pattern.atoms()[p].matches(self.graph, t) {
            return false;
        }
        self.pattern.neighbors(p).iter().all(|&(q, bond_idx)| {
            match self.mapping[q] {
                Some(tq) => self.pattern.bonds()[bond_idx].expr.matches(self.graph, t, tq),
                None => true,
            }
        })
    }

    fn record(&mut self) {
        let mapped: Vec<usize> = self.mapping.iter().flatten().copied().collect();
        let mut key = mapped.clone();
        key.sort_unstable();
        if self.seen.insert(key) {
            self.results.push(mapped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::smiles::parse_smiles;

    fn matches(smarts: &str, smiles: &str) -> Vec<Vec<usize>> {
        let pattern = SmartsPattern::parse(smarts).unwrap();
        let graph = parse_smiles(smiles).unwrap();
        find_matches(&pattern, &graph)
    }

    #[test]
    fn acrylamide_pattern_maps_every_atom_of_acrylamide() {
        assert_eq!(
            matches("[CX3]=[CX3]C(=O)N", "C=CC(=O)N"),
            vec![vec![0, 1, 2, 3, 4]]
        );
    }

    #[test]
    fn ethanol_has_no_acrylamide() {
        assert!(matches("[CX3]=[CX3]C(=O)N", "CCO").is_empty());
    }

    #[test]
    fn symmetric_epoxide_is_reported_once() {
        let found = matches("C1OC1", "CC1OC1");
        assert_eq!(found.len(), 1);
        let mut atoms = found[0].clone();
        atoms.sort_unstable();
        assert_eq!(atoms, vec![1, 2, 3]);
    }

    #[test]
    fn repeated_groups_yield_separate_matches() {
        let found = matches("C#N", "N#CCC#N");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn bond_order_must_agree() {
        assert!(matches("C=O", "CCO").is_empty());
        assert_eq!(matches("C=O", "CC=O").len(), 1);
    }

    #[test]
    fn implicit_pattern_bond_does_not_match_double_bond() {
        assert!(matches("CC", "C=C").is_empty());
    }

    #[test]
    fn alpha_halo_ketone_requires_hydrogen_bearing_alpha_carbon() {
        let pattern = "[CX4;H1,H2][CX3](=O)[F,Cl,Br,I]";
        assert_eq!(matches(pattern, "CCC(=O)Cl").len(), 1);
        assert!(matches(pattern, "CC(C)(C)C(=O)Cl").is_empty());
    }

    #[test]
    fn has_match_reports_presence_of_pattern() {
        let pattern = SmartsPattern::parse("S").unwrap();
        assert!(!has_match(&pattern, &parse_smiles("CCO").unwrap()));
        assert!(has_match(&pattern, &parse_smiles("CSC").unwrap()));
    }
}
