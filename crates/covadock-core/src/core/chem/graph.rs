use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Bond order in half-units, so that aromatic bonds count 1.5.
    pub fn half_units(self) -> u8 {
        match self {
            BondOrder::Single => 2,
            BondOrder::Double => 4,
            BondOrder::Triple => 6,
            BondOrder::Aromatic => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphAtom {
    pub element: &'static str,
    pub atomic_number: u8,
    pub aromatic: bool,
    pub charge: i8,
    /// Implicit plus bracket-declared hydrogens (hydrogens that are not graph nodes).
    pub hydrogens: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphBond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
}

/// An immutable heavy-atom connectivity graph, as produced by the SMILES reader.
///
/// Atom indices follow the order in which atoms appear in the source string, which is
/// the order the 3D embedding contract preserves for heavy atoms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MolecularGraph {
    atoms: Vec<GraphAtom>,
    bonds: Vec<GraphBond>,
    adjacency: Vec<Vec<(usize, usize)>>,
    ring_bonds: HashSet<usize>,
}

impl MolecularGraph {
    pub fn new(atoms: Vec<GraphAtom>, bonds: Vec<GraphBond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (idx, bond) in bonds.iter().enumerate() {
            adjacency[bond.a].push((bond.b, idx));
            adjacency[bond.b].push((bond.a, idx));
        }
        let mut graph = Self {
            atoms,
            bonds,
            adjacency,
            ring_bonds: HashSet::new(),
        };
        graph.ring_bonds = (0..graph.bonds.len())
            .filter(|&idx| graph.is_cyclic_bond(idx))
            .collect();
        graph
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn atoms(&self) -> &[GraphAtom] {
        &self.atoms
    }

    pub fn atom(&self, idx: usize) -> &GraphAtom {
        &self.atoms[idx]
    }

    pub fn bonds(&self) -> &[GraphBond] {
        &self.bonds
    }

    /// Neighbor atom indices of `idx`, paired with the connecting bond index.
    pub fn neighbors(&self, idx: usize) -> &[(usize, usize)] {
        &self.adjacency[idx]
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&GraphBond> {
        self.adjacency[a]
            .iter()
            .find(|(n, _)| *n == b)
            .map(|(_, bond_idx)| &self.bonds[*bond_idx])
    }

    pub fn degree(&self, idx: usize) -> usize {
        self.adjacency[idx].len()
    }

    /// Hydrogens on the atom, whether implicit or present as explicit graph nodes.
    pub fn total_hydrogens(&self, idx: usize) -> usize {
        let explicit = self.adjacency[idx]
            .iter()
            .filter(|(n, _)| self.atoms[*n].atomic_number == 1)
            .count();
        self.atoms[idx].hydrogens as usize + explicit
    }

    /// Total connections including hydrogens (SMARTS `X`).
    pub fn connectivity(&self, idx: usize) -> usize {
        self.degree(idx) + self.atoms[idx].hydrogens as usize
    }

    /// Sum of bond orders including hydrogens (SMARTS `v`).
    pub fn valence(&self, idx: usize) -> usize {
        let half: usize = self.adjacency[idx]
            .iter()
            .map(|(_, b)| self.bonds[*b].order.half_units() as usize)
            .sum();
        half / 2 + self.atoms[idx].hydrogens as usize
    }

    pub fn is_ring_bond(&self, bond_idx: usize) -> bool {
        self.ring_bonds.contains(&bond_idx)
    }

    pub fn is_ring_atom(&self, idx: usize) -> bool {
        self.adjacency[idx]
            .iter()
            .any(|(_, b)| self.ring_bonds.contains(b))
    }

    // A bond is cyclic when its endpoints stay connected without it.
    fn is_cyclic_bond(&self, bond_idx: usize) -> bool {
        let GraphBond { a, b, .. } = self.bonds[bond_idx];
        let mut seen = vec![false; self.atoms.len()];
        let mut queue = VecDeque::from([a]);
        seen[a] = true;
        while let Some(current) = queue.pop_front() {
            for &(next, via) in &self.adjacency[current] {
                if via == bond_idx || seen[next] {
                    continue;
                }
                if next == b {
                    return true;
                }
                seen[next] = true;
                queue.push_back(next);
            }
        }
        false
    }
}
