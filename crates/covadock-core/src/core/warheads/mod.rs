//! # Warhead Detection
//!
//! Reactive electrophile ("warhead") recognition for covalent ligands.
//!
//! ## Overview
//!
//! The [`catalogue`] holds named SMARTS patterns for the electrophile families a cysteine
//! can attack. The built-in catalogue is compiled once per process on first use and is
//! read-only afterwards, so detectors on any thread share it. The [`detector`] runs every
//! pattern independently against a SMILES-derived molecular graph.

pub mod catalogue;
pub mod detector;
