use super::atom::AtomRecord;
use nalgebra::Point3;

/// A small molecule as an ordered list of atoms.
///
/// Bond perception belongs to the chemistry toolkit; the pipeline only relies on atom
/// order, elements and coordinates. For molecules embedded from SMILES, the heavy atoms
/// come first in SMILES order and added hydrogens follow, so heavy-atom index `i` of the
/// SMILES graph is atom `i` here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Molecule {
    pub name: String,
    atoms: Vec<AtomRecord>,
}

impl Molecule {
    pub fn new(name: impl Into<String>, atoms: Vec<AtomRecord>) -> Self {
        Self {
            name: name.into(),
            atoms,
        }
    }

    pub fn atoms(&self) -> &[AtomRecord] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| !a.is_hydrogen()).count()
    }

    pub fn position(&self, idx: usize) -> Option<Point3<f64>> {
        self.atoms.get(idx).map(|a| a.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_heavy_atoms_and_exposes_positions() {
        let molecule = Molecule::new(
            "methanol",
            vec![
                AtomRecord::new(1, "C1", "C", Point3::new(0.0, 0.0, 0.0)),
                AtomRecord::new(2, "O1", "O", Point3::new(1.4, 0.0, 0.0)),
                AtomRecord::new(3, "H1", "H", Point3::new(-0.5, 0.9, 0.0)),
            ],
        );
        assert_eq!(molecule.len(), 3);
        assert_eq!(molecule.heavy_atom_count(), 2);
        assert_eq!(molecule.position(1), Some(Point3::new(1.4, 0.0, 0.0)));
        assert_eq!(molecule.position(7), None);
        assert!(!molecule.is_empty());
    }
}
