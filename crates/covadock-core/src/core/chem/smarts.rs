use super::element;
use super::graph::{BondOrder, MolecularGraph};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SmartsError {
    #[error("SMARTS pattern is empty")]
    Empty,
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("Unknown element '{symbol}' at position {position}")]
    UnknownElement { symbol: String, position: usize },
    #[error("Unterminated bracket expression starting at position {position}")]
    UnterminatedBracket { position: usize },
    #[error("Empty atom expression at position {position}")]
    EmptyExpression { position: usize },
    #[error("Ring closure {label} was never closed")]
    UnclosedRing { label: u16 },
    #[error("Unbalanced branch parentheses")]
    UnbalancedBranch,
    #[error("Bond at position {position} has no preceding atom")]
    DanglingBond { position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomPrimitive {
    Any,
    Element { atomic_number: u8, aromatic: bool },
    AtomicNumber(u8),
    Aromatic,
    Aliphatic,
    Degree(u8),
    TotalHydrogens(u8),
    Connectivity(u8),
    Valence(u8),
    Charge(i8),
    InRing(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomExpr {
    Primitive(AtomPrimitive),
    Not(Box<AtomExpr>),
    And(Box<AtomExpr>, Box<AtomExpr>),
    Or(Box<AtomExpr>, Box<AtomExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondExpr {
    /// No bond symbol written: single or aromatic.
    Implicit,
    Single,
    Double,
    Triple,
    Aromatic,
    Any,
    Ring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternBond {
    pub a: usize,
    pub b: usize,
    pub expr: BondExpr,
}

/// A compiled substructure query.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartsPattern {
    source: String,
    atoms: Vec<AtomExpr>,
    bonds: Vec<PatternBond>,
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl SmartsPattern {
    pub fn parse(smarts: &str) -> Result<Self, SmartsError> {
        let trimmed = smarts.trim();
        if trimmed.is_empty() {
            return Err(SmartsError::Empty);
        }
        let mut parser = SmartsParser::new(trimmed);
        parser.parse()?;
        parser.finish(trimmed)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn atoms(&self) -> &[AtomExpr] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[PatternBond] {
        &self.bonds
    }

    pub fn neighbors(&self, idx: usize) -> &[(usize, usize)] {
        &self.adjacency[idx]
    }
}

impl AtomExpr {
    pub fn matches(&self, graph: &MolecularGraph, idx: usize) -> bool {
        match self {
            AtomExpr::Primitive(p) => p.matches(graph, idx),
            AtomExpr::Not(inner) => !inner.matches(graph, idx),
            AtomExpr::And(l, r) => l.matches(graph, idx) && r.matches(graph, idx),
            AtomExpr::Or(l, r) => l.matches(graph, idx) || r.matches(graph, idx),
        }
    }
}

impl AtomPrimitive {
    fn matches(&self, graph: &MolecularGraph, idx: usize) -> bool {
        let atom = graph.atom(idx);
        match *self {
            AtomPrimitive::Any => true,
            AtomPrimitive::Element {
                atomic_number,
                aromatic,
            } => atom.atomic_number == atomic_number && atom.aromatic == aromatic,
            AtomPrimitive::AtomicNumber(n) => atom.atomic_number == n,
            AtomPrimitive::Aromatic => atom.aromatic,
            AtomPrimitive::Aliphatic => !atom.aromatic,
            AtomPrimitive::Degree(d) => graph.degree(idx) == d as usize,
            AtomPrimitive::TotalHydrogens(h) => graph.total_hydrogens(idx) == h as usize,
            AtomPrimitive::Connectivity(x) => graph.connectivity(idx) == x as usize,
            AtomPrimitive::Valence(v) => graph.valence(idx) == v as usize,
            AtomPrimitive::Charge(c) => atom.charge == c,
            AtomPrimitive::InRing(expected) => graph.is_ring_atom(idx) == expected,
        }
    }
}

impl BondExpr {
    pub fn matches(self, graph: &MolecularGraph, a: usize, b: usize) -> bool {
        let Some(bond) = graph.bond_between(a, b) else {
            return false;
        };
        match self {
            BondExpr::Implicit => matches!(bond.order, BondOrder::Single | BondOrder::Aromatic),
            BondExpr::Single => bond.order == BondOrder::Single,
            BondExpr::Double => bond.order == BondOrder::Double,
            BondExpr::Triple => bond.order == BondOrder::Triple,
            BondExpr::Aromatic => bond.order == BondOrder::Aromatic,
            BondExpr::Any => true,
            BondExpr::Ring => graph
                .neighbors(a)
                .iter()
                .find(|(n, _)| *n == b)
                .is_some_and(|(_, bond_idx)| graph.is_ring_bond(*bond_idx)),
        }
    }
}

struct SmartsParser<'a> {
    input: &'a [u8],
    pos: usize,
    atoms: Vec<AtomExpr>,
    bonds: Vec<PatternBond>,
    ring_openings: BTreeMap<u16, (usize, Option<BondExpr>)>,
    branches: Vec<usize>,
    previous: Option<usize>,
    pending_bond: Option<BondExpr>,
}

impl<'a> SmartsParser<'a> {
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

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn unexpected(&self, ch: u8) -> SmartsError {
        SmartsError::UnexpectedCharacter {
            character: ch as char,
            position: self.pos,
        }
    }

    fn parse(&mut self) -> Result<(), SmartsError> {
        while let Some(ch) = self.peek() {
            match ch {
                b'(' => {
                    let anchor = self
                        .previous
                        .ok_or(SmartsError::DanglingBond { position: self.pos })?;
                    self.bump();
                    self.branches.push(anchor);
                }
                b')' => {
                    self.bump();
                    self.previous = Some(self.branches.pop().ok_or(SmartsError::UnbalancedBranch)?);
                    self.pending_bond = None;
                }
                b'-' | b'=' | b'#' | b':' | b'~' | b'@' => {
                    self.bump();
                    self.pending_bond = Some(match ch {
                        b'-' => BondExpr::Single,
                        b'=' => BondExpr::Double,
                        b'#' => BondExpr::Triple,
                        b':' => BondExpr::Aromatic,
                        b'~' => BondExpr::Any,
                        _ => BondExpr::Ring,
                    });
                }
                b'.' => {
                    self.bump();
                    self.previous = None;
                    self.pending_bond = None;
                }
                b'0'..=b'9' => {
                    let position = self.pos;
                    self.bump();
                    self.ring_bond((ch - b'0') as u16, position)?;
                }
                b'%' => {
                    let position = self.pos;
                    self.bump();
                    match (self.bump(), self.bump()) {
                        (Some(t @ b'0'..=b'9'), Some(o @ b'0'..=b'9')) => {
                            self.ring_bond((t - b'0') as u16 * 10 + (o - b'0') as u16, position)?
                        }
                        _ => {
                            return Err(SmartsError::UnexpectedCharacter {
                                character: '%',
                                position,
                            });
                        }
                    }
                }
                b'[' => {
                    let expr = self.bracket()?;
                    self.push_atom(expr);
                }
                b'*' => {
                    self.bump();
                    self.push_atom(AtomExpr::Primitive(AtomPrimitive::Any));
                }
                _ if ch.is_ascii_alphabetic() => {
                    let expr = self.organic_atom()?;
                    self.push_atom(expr);
                }
                _ => return Err(self.unexpected(ch)),
            }
        }
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let position = self.pos;
        let ch = self.bump().ok_or(SmartsError::EmptyExpression { position })?;
        let symbol = match (ch, self.peek()) {
            (b'C', Some(b'l')) => {
                self.bump();
                "Cl"
            }
            (b'B', Some(b'r')) => {
                self.bump();
                "Br"
            }
            (b'B', _) => "B",
            (b'C' | b'c', _) => "C",
            (b'N' | b'n', _) => "N",
            (b'O' | b'o', _) => "O",
            (b'P' | b'p', _) => "P",
            (b'S' | b's', _) => "S",
            (b'F', _) => "F",
            (b'I', _) => "I",
            (b'a', _) => return Ok(AtomExpr::Primitive(AtomPrimitive::Aromatic)),
            (b'A', _) => return Ok(AtomExpr::Primitive(AtomPrimitive::Aliphatic)),
            _ => {
                return Err(SmartsError::UnknownElement {
                    symbol: (ch as char).to_string(),
                    position,
                });
            }
        };
        element_primitive(symbol, ch.is_ascii_lowercase(), position)
    }

    fn bracket(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        self.bump();
        let expr = self.low_and(start)?;
        match self.bump() {
            Some(b']') => Ok(expr),
            _ => Err(SmartsError::UnterminatedBracket { position: start }),
        }
    }

    // Precedence, lowest first: `;`, `,`, `&` or juxtaposition, `!`.
    fn low_and(&mut self, start: usize) -> Result<AtomExpr, SmartsError> {
        let mut expr = self.or(start)?;
        while self.peek() == Some(b';') {
            self.bump();
            let rhs = self.or(start)?;
            expr = AtomExpr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn or(&mut self, start: usize) -> Result<AtomExpr, SmartsError> {
        let mut expr = self.high_and(start)?;
        while self.peek() == Some(b',') {
            self.bump();
            let rhs = self.high_and(start)?;
            expr = AtomExpr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn high_and(&mut self, start: usize) -> Result<AtomExpr, SmartsError> {
        let mut expr = self.unary(start)?;
        loop {
            match self.peek() {
                Some(b'&') => {
                    self.bump();
                }
                Some(b']' | b',' | b';') | None => break,
                Some(_) => {}
            }
            let rhs = self.unary(start)?;
            expr = AtomExpr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn unary(&mut self, start: usize) -> Result<AtomExpr, SmartsError> {
        if self.peek() == Some(b'!') {
            self.bump();
            let inner = self.unary(start)?;
            return Ok(AtomExpr::Not(Box::new(inner)));
        }
        self.primitive(start).map(AtomExpr::Primitive)
    }

    fn primitive(&mut self, start: usize) -> Result<AtomPrimitive, SmartsError> {
        let position = self.pos;
        let ch = self
            .peek()
            .ok_or(SmartsError::UnterminatedBracket { position: start })?;
        let primitive = match ch {
            b'*' => {
                self.bump();
                AtomPrimitive::Any
            }
            b'#' => {
                self.bump();
                let n = self
                    .read_number()
                    .ok_or(SmartsError::EmptyExpression { position })?;
                AtomPrimitive::AtomicNumber(n as u8)
            }
            b'D' => {
                self.bump();
                AtomPrimitive::Degree(self.read_number().unwrap_or(1) as u8)
            }
            b'X' => {
                self.bump();
                AtomPrimitive::Connectivity(self.read_number().unwrap_or(1) as u8)
            }
            b'H' => {
                self.bump();
                AtomPrimitive::TotalHydrogens(self.read_number().unwrap_or(1) as u8)
            }
            b'v' => {
                self.bump();
                AtomPrimitive::Valence(self.read_number().unwrap_or(1) as u8)
            }
            b'R' => {
                self.bump();
                AtomPrimitive::InRing(self.read_number() != Some(0))
            }
            b'+' | b'-' => {
                self.bump();
                let magnitude = match self.read_number() {
                    Some(n) => n as i8,
                    None => {
                        let mut count = 1i8;
                        while self.peek() == Some(ch) {
                            self.bump();
                            count += 1;
                        }
                        count
                    }
                };
                AtomPrimitive::Charge(if ch == b'+' { magnitude } else { -magnitude })
            }
            b'a' if !self.peek_at(1).is_some_and(|c| c.is_ascii_lowercase()) => {
                self.bump();
                AtomPrimitive::Aromatic
            }
            b'A' if !self.peek_at(1).is_some_and(|c| c.is_ascii_lowercase()) => {
                self.bump();
                AtomPrimitive::Aliphatic
            }
            b']' | b',' | b';' | b'&' => {
                return Err(SmartsError::EmptyExpression { position });
            }
            _ if ch.is_ascii_uppercase() => {
                self.bump();
                let mut symbol = (ch as char).to_string();
                if let Some(next) = self.peek().filter(|c| c.is_ascii_lowercase()) {
                    let pair = format!("{}{}", ch as char, next as char);
                    if element::element(&pair).is_some() {
                        self.bump();
                        symbol = pair;
                    }
                }
                return match element_primitive(&symbol, false, position)? {
                    AtomExpr::Primitive(p) => Ok(p),
                    _ => Err(SmartsError::EmptyExpression { position }),
                };
            }
            b'c' | b'n' | b'o' | b's' | b'p' => {
                self.bump();
                let symbol = (ch.to_ascii_uppercase() as char).to_string();
                return match element_primitive(&symbol, true, position)? {
                    AtomExpr::Primitive(p) => Ok(p),
                    _ => Err(SmartsError::EmptyExpression { position }),
                };
            }
            _ => return Err(self.unexpected(ch)),
        };
        Ok(primitive)
    }

    fn read_number(&mut self) -> Option<u32> {
        let mut value: Option<u32> = None;
        while let Some(d) = self.peek().filter(u8::is_ascii_digit) {
            self.bump();
            value = Some(value.unwrap_or(0) * 10 + (d - b'0') as u32);
        }
        value
    }

    fn push_atom(&mut self, expr: AtomExpr) {
        let idx = self.atoms.len();
        self.atoms.push(expr);
        if let Some(prev) = self.previous {
            let expr = self.pending_bond.take().unwrap_or(BondExpr::Implicit);
            self.bonds.push(PatternBond { a: prev, b: idx, expr });
        }
        self.pending_bond = None;
        self.previous = Some(idx);
    }

    fn ring_bond(&mut self, label: u16, position: usize) -> Result<(), SmartsError> {
        let current = self.previous.ok_or(SmartsError::DanglingBond { position })?;
        match self.ring_openings.remove(&label) {
            Some((opening, declared)) => {
                let expr = self
                    .pending_bond
                    .take()
                    .or(declared)
                    .unwrap_or(BondExpr::Implicit);
                self.bonds.push(PatternBond {
                    a: opening,
                    b: current,
                    expr,
                });
            }
            None => {
                let declared = self.pending_bond.take();
                self.ring_openings.insert(label, (current, declared));
            }
        }
        Ok(())
    }

    fn finish(self, source: &str) -> Result<SmartsPattern, SmartsError> {
        if let Some((&label, _)) = self.ring_openings.iter().next() {
            return Err(SmartsError::UnclosedRing { label });
        }
        if !self.branches.is_empty() {
            return Err(SmartsError::UnbalancedBranch);
        }
        let mut adjacency = vec![Vec::new(); self.atoms.len()];
        for (idx, bond) in self.bonds.iter().enumerate() {
            adjacency[bond.a].push((bond.b, idx));
            adjacency[bond.b].push((bond.a, idx));
        }
        Ok(SmartsPattern {
            source: source.to_string(),
            atoms: self.atoms,
            bonds: self.bonds,
            adjacency,
        })
    }
}

fn element_primitive(symbol: &str, aromatic: bool, position: usize) -> Result<AtomExpr, SmartsError> {
    let info = element::element(symbol).ok_or_else(|| SmartsError::UnknownElement {
        symbol: symbol.to_string(),
        position,
    })?;
    Ok(AtomExpr::Primitive(AtomPrimitive::Element {
        atomic_number: info.atomic_number,
        aromatic,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::smiles::parse_smiles;

    #[test]
    fn parses_bracket_connectivity_and_bonds() {
        let pattern = SmartsPattern::parse("[CX3]=[CX3]C(=O)N").unwrap();
        assert_eq!(pattern.atom_count(), 5);
        assert_eq!(pattern.bonds().len(), 4);
        assert_eq!(pattern.bonds()[0].expr, BondExpr::Double);
        assert_eq!(pattern.bonds()[1].expr, BondExpr::Implicit);
        assert_eq!(pattern.source(), "[CX3]=[CX3]C(=O)N");
    }

    #[test]
    fn low_precedence_and_binds_looser_than_or() {
        let pattern = SmartsPattern::parse("[CX4;H1,H2]").unwrap();
        match &pattern.atoms()[0] {
            AtomExpr::And(_, rhs) => assert!(matches!(**rhs, AtomExpr::Or(_, _))),
            other => panic!("unexpected expression: {:?}", other),
        }
    }

    #[test]
    fn halogen_list_matches_each_halogen() {
        let pattern = SmartsPattern::parse("[F,Cl,Br,I]").unwrap();
        let graph = parse_smiles("FCCl").unwrap();
        assert!(pattern.atoms()[0].matches(&graph, 0));
        assert!(!pattern.atoms()[0].matches(&graph, 1));
        assert!(pattern.atoms()[0].matches(&graph, 2));
    }

    #[test]
    fn hydrogen_count_and_negation_primitives() {
        let graph = parse_smiles("CC(=O)C").unwrap();
        let methyl = SmartsPattern::parse("[CH3]").unwrap();
        let not_methyl = SmartsPattern::parse("[C;!H3]").unwrap();
        assert!(methyl.atoms()[0].matches(&graph, 0));
        assert!(!methyl.atoms()[0].matches(&graph, 1));
        assert!(not_methyl.atoms()[0].matches(&graph, 1));
    }

    #[test]
    fn atomic_number_primitive_ignores_aromaticity() {
        let graph = parse_smiles("c1ccccc1C").unwrap();
        let any_carbon = SmartsPattern::parse("[#6]").unwrap();
        let aliphatic = SmartsPattern::parse("C").unwrap();
        assert!(any_carbon.atoms()[0].matches(&graph, 0));
        assert!(!aliphatic.atoms()[0].matches(&graph, 0));
        assert!(aliphatic.atoms()[0].matches(&graph, 6));
    }

    #[test]
    fn ring_closure_in_pattern_adds_bond() {
        let pattern = SmartsPattern::parse("C1OC1").unwrap();
        assert_eq!(pattern.bonds().len(), 3);
    }

    #[test]
    fn rejects_invalid_patterns() {
        assert_eq!(SmartsPattern::parse(""), Err(SmartsError::Empty));
        assert!(matches!(
            SmartsPattern::parse("[CX3"),
            Err(SmartsError::UnterminatedBracket { .. })
        ));
        assert!(matches!(
            SmartsPattern::parse("[Qq]"),
            Err(SmartsError::UnknownElement { .. })
        ));
        assert!(matches!(
            SmartsPattern::parse("C1CC"),
            Err(SmartsError::UnclosedRing { label: 1 })
        ));
        assert!(matches!(
            SmartsPattern::parse("[C,]"),
            Err(SmartsError::EmptyExpression { .. })
        ));
    }
}
