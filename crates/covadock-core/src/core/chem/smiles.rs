use super::element::{self, ElementInfo};
use super::graph::{BondOrder, GraphAtom, GraphBond, MolecularGraph};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SmilesError {
    #[error("SMILES string is empty")]
    Empty,
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("Unknown element '{symbol}' at position {position}")]
    UnknownElement { symbol: String, position: usize },
    #[error("Unterminated bracket atom starting at position {position}")]
    UnterminatedBracket { position: usize },
    #[error("Ring closure {label} was never closed")]
    UnclosedRing { label: u16 },
    #[error("Unbalanced branch parentheses")]
    UnbalancedBranch,
    #[error("Bond or ring closure at position {position} has no preceding atom")]
    DanglingBond { position: usize },
}

/// Parses a SMILES string into a heavy-atom [`MolecularGraph`].
///
/// Supports the organic subset, bracket atoms with isotope/chirality/H-count/charge,
/// branches, ring closures (including `%nn`), aromatic lower-case atoms, and
/// disconnected fragments. Stereo markers are accepted and ignored. Implicit hydrogens
/// of organic-subset atoms are derived from the element's default valence.
pub fn parse_smiles(smiles: &str) -> Result<MolecularGraph, SmilesError> {
    let trimmed = smiles.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::Empty);
    }
    let mut reader = SmilesReader::new(trimmed);
    reader.read()?;
    reader.finish()
}

struct PendingAtom {
    atom: GraphAtom,
    bracketed: bool,
}

struct SmilesReader<'a> {
    input: &'a [u8],
    pos: usize,
    atoms: Vec<PendingAtom>,
    bonds: Vec<GraphBond>,
    ring_openings: BTreeMap<u16, (usize, Option<BondOrder>)>,
    branches: Vec<usize>,
    previous: Option<usize>,
    pending_bond: Option<BondOrder>,
}

impl<'a> SmilesReader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            ring_openings: BTreeMap::new(),
            branches: Vec::new(),
            previous: None,
            pending_bond: None,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn read(&mut self) -> Result<(), SmilesError> {
        while let Some(ch) = self.peek() {
            match ch {
                b'(' => {
                    self.bump();
                    let anchor = self
                        .previous
                        .ok_or(SmilesError::DanglingBond { position: self.pos })?;
                    self.branches.push(anchor);
                }
                b')' => {
                    self.bump();
                    self.previous = Some(self.branches.pop().ok_or(SmilesError::UnbalancedBranch)?);
                    self.pending_bond = None;
                }
                b'-' => self.set_bond(BondOrder::Single),
                b'=' => self.set_bond(BondOrder::Double),
                b'#' => self.set_bond(BondOrder::Triple),
                b':' => self.set_bond(BondOrder::Aromatic),
                b'/' | b'\\' => {
                    self.bump();
                }
                b'.' => {
                    self.bump();
                    self.previous = None;
                    self.pending_bond = None;
                }
                b'%' => {
                    let start = self.pos;
                    self.bump();
                    let tens = self.bump().filter(u8::is_ascii_digit);
                    let ones = self.bump().filter(u8::is_ascii_digit);
                    match (tens, ones) {
                        (Some(t), Some(o)) => {
                            self.ring_bond((t - b'0') as u16 * 10 + (o - b'0') as u16, start)?
                        }
                        _ => {
                            return Err(SmilesError::UnexpectedCharacter {
                                character: '%',
                                position: start,
                            });
                        }
                    }
                }
                b'0'..=b'9' => {
                    let start = self.pos;
                    self.bump();
                    self.ring_bond((ch - b'0') as u16, start)?;
                }
                b'[' => self.bracket_atom()?,
                _ if ch.is_ascii_alphabetic() || ch == b'*' => self.organic_atom()?,
                _ => {
                    return Err(SmilesError::UnexpectedCharacter {
                        character: ch as char,
                        position: self.pos,
                    });
                }
            }
        }
        Ok(())
    }

    fn set_bond(&mut self, order: BondOrder) {
        self.bump();
        self.pending_bond = Some(order);
    }

    fn organic_atom(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Ok(());
        };
        let aromatic = ch.is_ascii_lowercase();
        let symbol = match (ch, self.peek()) {
            (b'C', Some(b'l')) => {
                self.bump();
                "Cl"
            }
            (b'B', Some(b'r')) => {
                self.bump();
                "Br"
            }
            (b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I', _) => {
                std::str::from_utf8(&self.input[start..start + 1]).unwrap_or("C")
            }
            (b'b', _) => "B",
            (b'c', _) => "C",
            (b'n', _) => "N",
            (b'o', _) => "O",
            (b'p', _) => "P",
            (b's', _) => "S",
            _ => {
                return Err(SmilesError::UnknownElement {
                    symbol: (ch as char).to_string(),
                    position: start,
                });
            }
        };
        let info = lookup(symbol, start)?;
        self.push_atom(info, aromatic, 0, 0, false);
        Ok(())
    }

    fn bracket_atom(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        self.bump();
        let close = self.input[self.pos..]
            .iter()
            .position(|&c| c == b']')
            .map(|offset| self.pos + offset)
            .ok_or(SmilesError::UnterminatedBracket { position: start })?;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }

        let first = self
            .bump()
            .ok_or(SmilesError::UnterminatedBracket { position: start })?;
        let aromatic = first.is_ascii_lowercase();
        let upper = first.to_ascii_uppercase() as char;
        let mut symbol = upper.to_string();
        if let Some(next) = self.peek().filter(|c| c.is_ascii_lowercase()) {
            let pair = format!("{}{}", upper, next as char);
            if element::element(&pair).is_some() {
                self.bump();
                symbol = pair;
            }
        }
        let info = lookup(&symbol, start)?;

        while self.peek() == Some(b'@') {
            self.bump();
        }

        let mut hydrogens = 0u8;
        if self.peek() == Some(b'H') {
            self.bump();
            hydrogens = self.read_count().unwrap_or(1);
        }

        let mut charge = 0i8;
        while let Some(sign @ (b'+' | b'-')) = self.peek() {
            self.bump();
            let magnitude = self.read_count().unwrap_or(1) as i8;
            charge += if sign == b'+' { magnitude } else { -magnitude };
        }

        // Atom classes (`:n`) and anything else up to the bracket are ignored.
        self.pos = close + 1;
        self.push_atom(info, aromatic, charge, hydrogens, true);
        Ok(())
    }

    fn read_count(&mut self) -> Option<u8> {
        let mut value: Option<u8> = None;
        while let Some(d) = self.peek().filter(u8::is_ascii_digit) {
            self.bump();
            value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d - b'0'));
        }
        value
    }

    fn push_atom(
        &mut self,
        info: &'static ElementInfo,
        aromatic: bool,
        charge: i8,
        hydrogens: u8,
        bracketed: bool,
    ) {
        let idx = self.atoms.len();
        self.atoms.push(PendingAtom {
            atom: GraphAtom {
                element: info.symbol,
                atomic_number: info.atomic_number,
                aromatic,
                charge,
                hydrogens,
            },
            bracketed,
        });
        if let Some(prev) = self.previous {
            let order = self.pending_bond.take().unwrap_or_else(|| {
                if self.atoms[prev].atom.aromatic && aromatic {
                    BondOrder::Aromatic
                } else {
                    BondOrder::Single
                }
            });
            self.bonds.push(GraphBond {
                a: prev,
                b: idx,
                order,
            });
        }
        self.pending_bond = None;
        self.previous = Some(idx);
    }

    fn ring_bond(&mut self, label: u16, position: usize) -> Result<(), SmilesError> {
        let current = self.previous.ok_or(SmilesError::DanglingBond { position })?;
        match self.ring_openings.remove(&label) {
            Some((opening, declared)) => {
                let both_aromatic =
                    self.atoms[opening].atom.aromatic && self.atoms[current].atom.aromatic;
                let order = self
                    .pending_bond
                    .take()
                    .or(declared)
                    .unwrap_or(if both_aromatic {
                        BondOrder::Aromatic
                    } else {
                        BondOrder::Single
                    });
                self.bonds.push(GraphBond {
                    a: opening,
                    b: current,
                    order,
                });
            }
            None => {
                let declared = self.pending_bond.take();
                self.ring_openings.insert(label, (current, declared));
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<MolecularGraph, SmilesError> {
        if let Some((&label, _)) = self.ring_openings.iter().next() {
            return Err(SmilesError::UnclosedRing { label });
        }
        if !self.branches.is_empty() {
            return Err(SmilesError::UnbalancedBranch);
        }

        let mut bonded = vec![0usize; self.atoms.len()];
        for bond in &self.bonds {
            bonded[bond.a] += bond.order.half_units() as usize;
            bonded[bond.b] += bond.order.half_units() as usize;
        }

        let atoms = self
            .atoms
            .into_iter()
            .enumerate()
            .map(|(idx, pending)| {
                let mut atom = pending.atom;
                if !pending.bracketed {
                    atom.hydrogens = implicit_hydrogens(&atom, bonded[idx]);
                }
                atom
            })
            .collect();

        Ok(MolecularGraph::new(atoms, self.bonds))
    }
}

fn lookup(symbol: &str, position: usize) -> Result<&'static ElementInfo, SmilesError> {
    element::element(symbol).ok_or_else(|| SmilesError::UnknownElement {
        symbol: symbol.to_string(),
        position,
    })
}

/// Atoms bonded beyond every default valence get no implicit hydrogens.
fn implicit_hydrogens(atom: &GraphAtom, bonded_half_units: usize) -> u8 {
    let Some(info) = element::element(atom.element) else {
        return 0;
    };
    let Ok(bonded) = u8::try_from(bonded_half_units / 2) else {
        return 0;
    };
    info.default_valence(bonded, atom.charge)
        .map(|valence| valence - bonded)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heavily_branched_atom_does_not_overflow_bond_counts() {
        let graph = parse_smiles(&format!("C{}", "(C)".repeat(130))).unwrap();
        assert_eq!(graph.atom_count(), 131);
        assert_eq!(graph.degree(0), 130);
        assert_eq!(graph.atoms()[0].hydrogens, 0);
        assert_eq!(graph.atoms()[1].hydrogens, 3);
        assert_eq!(graph.valence(0), 130);
    }

    #[test]
    fn parses_acrylamide_with_implicit_hydrogens() {
        let graph = parse_smiles("C=CC(=O)N").unwrap();
        assert_eq!(graph.atom_count(), 5);
        let hydrogens: Vec<u8> = graph.atoms().iter().map(|a| a.hydrogens).collect();
        assert_eq!(hydrogens, vec![2, 1, 0, 0, 2]);
        assert_eq!(graph.bond_between(0, 1).unwrap().order, BondOrder::Double);
        assert_eq!(graph.bond_between(2, 3).unwrap().order, BondOrder::Double);
        assert_eq!(graph.bond_between(2, 4).unwrap().order, BondOrder::Single);
    }

    #[test]
    fn ring_closure_creates_ring_bonds() {
        let graph = parse_smiles("C1OC1").unwrap();
        assert_eq!(graph.bonds().len(), 3);
        assert!((0..3).all(|i| graph.is_ring_atom(i)));
    }

    #[test]
    fn aromatic_ring_gets_one_hydrogen_per_carbon() {
        let graph = parse_smiles("c1ccccc1").unwrap();
        assert!(graph.atoms().iter().all(|a| a.aromatic && a.hydrogens == 1));
        assert_eq!(graph.bond_between(0, 5).unwrap().order, BondOrder::Aromatic);
    }

    #[test]
    fn chlorine_and_bromine_are_two_letter_atoms() {
        let graph = parse_smiles("ClCC(=O)NBr").unwrap();
        assert_eq!(graph.atom(0).element, "Cl");
        assert_eq!(graph.atom(5).element, "Br");
        assert_eq!(graph.atom(1).hydrogens, 2);
    }

    #[test]
    fn bracket_atoms_keep_declared_hydrogens_and_charge() {
        let graph = parse_smiles("C[NH3+]").unwrap();
        let nitrogen = graph.atom(1);
        assert_eq!(nitrogen.hydrogens, 3);
        assert_eq!(nitrogen.charge, 1);
    }

    #[test]
    fn branches_attach_to_the_branch_point() {
        let graph = parse_smiles("CC(C)(C)O").unwrap();
        assert_eq!(graph.degree(1), 4);
        assert_eq!(graph.atom(1).hydrogens, 0);
    }

    #[test]
    fn triple_bond_nitrile_leaves_no_hydrogen_on_nitrogen() {
        let graph = parse_smiles("CC#N").unwrap();
        assert_eq!(graph.atom(2).hydrogens, 0);
        assert_eq!(graph.connectivity(1), 2);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_smiles("  "), Err(SmilesError::Empty));
        assert_eq!(parse_smiles("C1CC"), Err(SmilesError::UnclosedRing { label: 1 }));
        assert_eq!(parse_smiles("CC(C"), Err(SmilesError::UnbalancedBranch));
        assert!(matches!(
            parse_smiles("C[C"),
            Err(SmilesError::UnterminatedBracket { .. })
        ));
        assert!(matches!(
            parse_smiles("CQ"),
            Err(SmilesError::UnknownElement { .. })
        ));
    }

    #[test]
    fn dot_separates_fragments() {
        let graph = parse_smiles("CC.O").unwrap();
        assert_eq!(graph.bonds().len(), 1);
        assert_eq!(graph.atom(2).hydrogens, 2);
    }
}
