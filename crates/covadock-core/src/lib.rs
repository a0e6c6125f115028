//! # covadock
//!
//! A covalent-docking pipeline: prepares a protein receptor and a small-molecule ligand,
//! docks the ligand with AutoDock Vina, and judges whether each docked pose could form a
//! covalent bond with a target cysteine.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three layers throughout, so each can be tested on its own.
//!
//! - **[`core`]: The Foundation.** Stateless value models (`AtomRecord`, `Molecule`,
//!   `Structure`, `Pose`), the in-process SMILES/SMARTS matcher, structure-text readers,
//!   writers and the normalizer, the warhead catalogue, and the pure scoring functions.
//!
//! - **[`engine`]: The Logic Core.** The per-request lifecycle, configuration builders,
//!   ligand and receptor preparation with their fallback chains, and the adapters that run
//!   external programs through the injected `ExternalProcess` and `ChemistryToolkit`
//!   capabilities.
//!
//! - **[`workflows`]: The Public API.** Complete procedures (docking one ligand, detecting
//!   warheads, analyzing cysteines) built from the two layers below.

pub mod core;
pub mod engine;
pub mod workflows;
