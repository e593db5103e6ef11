//! # Core Module
//!
//! Data models and utilities that everything else in the crate is built on.
//!
//! - **Motif algebra** ([`models::selector`], [`models::motif`]) - chain/residue
//!   range selectors and the motif strings that interleave them with designed
//!   segment lengths
//! - **Structures** ([`models::atom`], [`models::structure`]) - flat atom arrays
//!   with chain, residue, atom-name and motif based selection
//! - **File I/O** ([`io`]) - PDB and mmCIF reading and writing
//! - **Utilities** ([`utils`]) - residue naming tables and coordinate geometry

pub mod io;
pub mod models;
pub mod utils;
