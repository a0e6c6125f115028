//! Reading, repairing and writing the coordinate formats the pipeline exchanges with
//! external tools.
//!
//! PDB and PDBQT share one fixed-column record layer ([`record`]); the format readers
//! are strict and report the failing line, while the [`normalize`]r recovers locally. The
//! [`poses`] parser reconciles engine stdout with its multi-model output file, and
//! [`report`] writes per-pose CSV tables.

pub mod normalize;
pub mod pdb;
pub mod pdbqt;
pub mod poses;
pub mod record;
pub mod report;
pub mod traits;
