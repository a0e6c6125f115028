//! # Workflows Module
//!
//! The public entry points of the library. Each workflow ties the [`crate::core`] models
//! and the [`crate::engine`] adapters together into one complete procedure.
//!
//! ## Overview
//!
//! A workflow takes plain inputs (SMILES text, file paths, a parsed structure) plus the
//! injected capabilities it needs, and returns an owned result. Nothing is retained
//! between calls apart from the read-only built-in warhead catalogue, so workflows can
//! run concurrently from any number of threads.
//!
//! ## Key Components
//!
//! - **Docking** ([`dock`]) - Receptor and ligand preparation, the docking run, pose
//!   parsing and covalent scoring of one ligand against one receptor
//! - **Warhead Detection** ([`warheads`]) - Reactive-group matching on a SMILES string
//! - **Cysteine Analysis** ([`cysteines`]) - Cysteine inventory and potential disulfide
//!   bonds of a receptor

pub mod cysteines;
pub mod dock;
pub mod warheads;
