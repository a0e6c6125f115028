use super::config::{ConfigError, DockingBox, ResidueSpecifier};
use super::error::EngineError;
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use serde::Serialize;
use tracing::warn;

/// The resolved nucleophile a covalent ligand is docked against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSite {
    #[serde(serialize_with = "serialize_spec")]
    pub spec: ResidueSpecifier,
    pub residue_name: String,
    /// The atom actually used; differs from the requested name after a fallback.
    pub atom_name: String,
    #[serde(serialize_with = "serialize_point")]
    pub position: Point3<f64>,
}

impl TargetSite {
    /// A cube of edge `edge` centred on the target atom.
    pub fn docking_box(&self, edge: f64) -> Result<DockingBox, ConfigError> {
        DockingBox::around(self.position, edge)
    }
}

fn serialize_spec<S: serde::Serializer>(spec: &ResidueSpecifier, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(spec)
}

fn serialize_point<S: serde::Serializer>(p: &Point3<f64>, s: S) -> Result<S::Ok, S::Error> {
    [p.x, p.y, p.z].serialize(s)
}

/// Resolves `spec` to a coordinate: atom `atom_name`, else `CA`, else the residue's first atom.
pub fn locate_target(
    structure: &Structure,
    spec: ResidueSpecifier,
    atom_name: &str,
) -> Result<TargetSite, EngineError> {
    let residue = structure
        .residue(spec.chain_id, spec.residue_number)
        .ok_or(EngineError::MissingTargetResidue { spec })?;

    let atom = structure
        .find_atom(residue, atom_name)
        .or_else(|| {
            let ca = structure.find_atom(residue, "CA");
            if ca.is_some() {
                warn!(target = %spec, requested = atom_name, "Target atom missing; using CA");
            }
            ca
        })
        .or_else(|| {
            let first = structure.residue_atoms(residue).next();
            if let Some(first) = first {
                warn!(
                    target = %spec,
                    requested = atom_name,
                    using = %first.name,
                    "Target atom and CA missing; using the first atom"
                );
            }
            first
        })
        .ok_or(EngineError::MissingTargetResidue { spec })?;

    Ok(TargetSite {
        spec,
        residue_name: residue.name.clone(),
        atom_name: atom.name.clone(),
        position: atom.position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::AtomRecord;

    fn structure() -> Structure {
        Structure::from_atoms(vec![
            AtomRecord::new(1, "N", "N", Point3::new(0.0, 0.0, 0.0)).with_residue("CYS", 'A', 145),
            AtomRecord::new(2, "CA", "C", Point3::new(1.0, 0.0, 0.0)).with_residue("CYS", 'A', 145),
            AtomRecord::new(3, "SG", "S", Point3::new(2.0, 3.0, 4.0)).with_residue("CYS", 'A', 145),
            AtomRecord::new(4, "N", "N", Point3::new(5.0, 0.0, 0.0)).with_residue("SER", 'A', 146),
            AtomRecord::new(5, "CA", "C", Point3::new(6.0, 0.0, 0.0)).with_residue("SER", 'A', 146),
            AtomRecord::new(6, "O", "O", Point3::new(9.0, 9.0, 9.0)).with_residue("HOH", 'B', 1),
        ])
    }

    #[test]
    fn resolves_the_requested_atom() {
        let site = locate_target(&structure(), ResidueSpecifier::new('A', 145), "SG").unwrap();
        assert_eq!(site.atom_name, "SG");
        assert_eq!(site.residue_name, "CYS");
        assert_eq!(site.position, Point3::new(2.0, 3.0, 4.0));

        let docking_box = site.docking_box(15.0).unwrap();
        assert_eq!(docking_box.center(), site.position);
        assert_eq!(docking_box.size().x, 15.0);
    }

    #[test]
    fn falls_back_to_ca_then_first_atom() {
        let s = structure();
        let ca = locate_target(&s, ResidueSpecifier::new('A', 146), "SG").unwrap();
        assert_eq!(ca.atom_name, "CA");
        let first = locate_target(&s, ResidueSpecifier::new('B', 1), "SG").unwrap();
        assert_eq!(first.atom_name, "O");
    }

    #[test]
    fn missing_residue_is_reported() {
        let spec = ResidueSpecifier::new('C', 1);
        assert!(matches!(
            locate_target(&structure(), spec, "SG"),
            Err(EngineError::MissingTargetResidue { spec: s }) if s == spec
        ));
    }
}
