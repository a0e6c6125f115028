//! # Core Module
//!
//! Stateless building blocks of the covalent-docking pipeline.
//!
//! ## Overview
//!
//! Nothing in this module spawns processes or touches a working directory. It defines the
//! value types that flow between pipeline stages, the file formats exchanged with the
//! docking engine and chemistry toolkit, and the pure chemistry and scoring logic.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atom records, molecules, receptor structures and poses
//! - **Substructure Chemistry** ([`chem`]) - SMILES and SMARTS parsing with a backtracking matcher
//! - **File I/O** ([`io`]) - PDB/PDBQT readers and writers, text normalization, pose parsing, reports
//! - **Reactive Groups** ([`warheads`]) - The electrophile catalogue and detector
//! - **Scoring** ([`scoring`]) - Covalent-binding plausibility and disulfide geometry
//! - **Utilities** ([`utils`]) - Distance helpers

pub mod chem;
pub mod io;
pub mod models;
pub mod scoring;
pub mod utils;
pub mod warheads;
