//! In-process substructure capability.
//!
//! Reads SMILES into an immutable heavy-atom graph and matches SMARTS queries against
//! it. Only the subset of SMARTS needed for reactive-group catalogues is supported:
//! element, aromaticity, atomic-number, degree, connectivity, hydrogen-count, valence,
//! charge and ring primitives combined with `!`, `&`, `,` and `;`, plus the usual bond
//! symbols, branches and ring closures. Recursive SMARTS is not supported.

pub mod element;
pub mod graph;
pub mod matcher;
pub mod smarts;
pub mod smiles;
