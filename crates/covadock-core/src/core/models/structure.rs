use super::atom::AtomRecord;
use std::collections::HashMap;

/// A residue within a [`Structure`], identified by chain and sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub chain_id: char,
    pub residue_number: isize,
    pub name: String,
    atom_indices: Vec<usize>,
}

impl Residue {
    pub fn atom_indices(&self) -> &[usize] {
        &self.atom_indices
    }
}

/// A read-only chain/residue/atom view over a list of parsed atom records.
///
/// Residues are formed from consecutive atoms sharing a chain id and residue number,
/// in file order. A residue that reappears later in the file (split by other records)
/// is merged into its first occurrence.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    atoms: Vec<AtomRecord>,
    residues: Vec<Residue>,
    index: HashMap<(char, isize), usize>,
}

impl Structure {
    pub fn from_atoms(atoms: Vec<AtomRecord>) -> Self {
        let mut residues: Vec<Residue> = Vec::new();
        let mut index: HashMap<(char, isize), usize> = HashMap::new();

        for (atom_idx, atom) in atoms.iter().enumerate() {
            let key = (atom.chain_id, atom.residue_number);
            let residue_idx = *index.entry(key).or_insert_with(|| {
                residues.push(Residue {
                    chain_id: atom.chain_id,
                    residue_number: atom.residue_number,
                    name: atom.residue_name.clone(),
                    atom_indices: Vec::new(),
                });
                residues.len() - 1
            });
            residues[residue_idx].atom_indices.push(atom_idx);
        }

        Self {
            atoms,
            residues,
            index,
        }
    }

    pub fn atoms(&self) -> &[AtomRecord] {
        &self.atoms
    }

    pub fn residues(&self) -> impl Iterator<Item = &Residue> {
        self.residues.iter()
    }

    pub fn residue(&self, chain_id: char, residue_number: isize) -> Option<&Residue> {
        self.index
            .get(&(chain_id, residue_number))
            .map(|&idx| &self.residues[idx])
    }

    pub fn residue_atoms<'a>(&'a self, residue: &'a Residue) -> impl Iterator<Item = &'a AtomRecord> {
        residue.atom_indices.iter().map(move |&idx| &self.atoms[idx])
    }

    /// Finds an atom of `residue` by name (case-sensitive, trimmed names).
    pub fn find_atom<'a>(&'a self, residue: &'a Residue, name: &str) -> Option<&'a AtomRecord> {
        self.residue_atoms(residue).find(|atom| atom.name == name)
    }

    /// Chain identifiers in order of first appearance.
    pub fn chain_ids(&self) -> Vec<char> {
        let mut chains = Vec::new();
        for residue in &self.residues {
            if !chains.contains(&residue.chain_id) {
                chains.push(residue.chain_id);
            }
        }
        chains
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn atom(serial: usize, name: &str, res: &str, chain: char, num: isize) -> AtomRecord {
        AtomRecord::new(serial, name, &name[..1], Point3::new(serial as f64, 0.0, 0.0))
            .with_residue(res, chain, num)
    }

    fn sample() -> Structure {
        Structure::from_atoms(vec![
            atom(1, "N", "CYS", 'A', 10),
            atom(2, "CA", "CYS", 'A', 10),
            atom(3, "SG", "CYS", 'A', 10),
            atom(4, "N", "GLY", 'A', 11),
            atom(5, "N", "CYS", 'B', 10),
        ])
    }

    #[test]
    fn groups_atoms_into_residues_per_chain() {
        let structure = sample();
        assert_eq!(structure.residues().count(), 3);
        let cys = structure.residue('A', 10).unwrap();
        assert_eq!(cys.name, "CYS");
        assert_eq!(cys.atom_indices(), &[0, 1, 2]);
        assert!(structure.residue('B', 10).is_some());
        assert!(structure.residue('C', 10).is_none());
    }

    #[test]
    fn finds_named_atoms_within_a_residue() {
        let structure = sample();
        let cys = structure.residue('A', 10).unwrap();
        let sg = structure.find_atom(cys, "SG").unwrap();
        assert_eq!(sg.serial, 3);
        assert!(structure.find_atom(cys, "CB").is_none());
    }

    #[test]
    fn chain_ids_follow_file_order() {
        assert_eq!(sample().chain_ids(), vec!['A', 'B']);
        assert!(Structure::default().is_empty());
    }
}
