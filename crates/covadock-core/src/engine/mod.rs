//! # Engine Module
//!
//! The stateful side of a docking request: preparing inputs, driving external programs and
//! tracking where a request is in its lifecycle.
//!
//! ## Overview
//!
//! Nothing in this layer performs chemistry itself. Structure conversion and 3D embedding
//! go through an injected [`toolkit::ChemistryToolkit`]; the docking engine runs through an
//! injected [`process::ExternalProcess`]. Every request writes its intermediate files into
//! its own [`workspace::RequestWorkspace`], so concurrent requests never collide.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Docking box, per-run engine parameters and
//!   pipeline-wide settings, all built through validating builders
//! - **Lifecycle** ([`state`]) - The forward-only stage machine of one request
//! - **Progress Monitoring** ([`progress`]) - Phase events for front ends
//! - **Error Handling** ([`error`]) - The engine error taxonomy
//! - **Preparation** ([`ligand`], [`receptor`], [`target`]) - Docking-ready PDBQT inputs
//!   and the resolved covalent target
//! - **External Programs** ([`process`], [`toolkit`], [`vina`]) - Program invocation and
//!   the adapters built on it

pub mod config;
pub mod error;
pub mod ligand;
pub mod process;
pub mod progress;
pub mod receptor;
pub mod state;
pub mod target;
pub mod toolkit;
pub mod vina;
pub mod workspace;
