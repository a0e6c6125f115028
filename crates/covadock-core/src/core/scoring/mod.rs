//! Pose scoring against a target nucleophile and cysteine geometry analysis.
//!
//! - [`covalent`] - Distance and affinity terms, the selectable scoring policies, and the
//!   categorical assessment of a docked pose
//! - [`disulfide`] - Pairwise SG-SG distances and potential disulfide bonds

pub mod covalent;
pub mod disulfide;
