//! # Core Models Module
//!
//! Value types shared by every stage of the docking pipeline.
//!
//! ## Overview
//!
//! All models are immutable snapshots once constructed: readers produce them, later
//! stages derive new values from them, and nothing is shared across docking requests.
//!
//! ## Key Components
//!
//! - [`atom`] - A single fixed-column atom record with element and coordinates
//! - [`molecule`] - An ordered atom list for a small molecule
//! - [`structure`] - Chain/residue grouping and residue lookup over a receptor
//! - [`pose`] - One docked ligand placement with its scores

pub mod atom;
pub mod molecule;
pub mod pose;
pub mod structure;
