//! # proteinbee Core Library
//!
//! Motif bookkeeping and structural comparison for protein design pipelines:
//! describing which residues of a native protein are kept as a motif, where
//! those residues land in a designed protein, and how closely the designed
//! structure reproduces them.
//!
//! ## Architecture
//!
//! The library follows a three-layer layout.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Selector`, `Motif`,
//!   `Atom`, `Structure`), structure file I/O and geometry helpers.
//!
//! - **[`engine`]: The Logic Core.** Superposition strategies and
//!   `StructureAlignment`, which extracts a motif from a structure and measures
//!   its deviation from another motif after optimal superposition.
//!
//! - **[`workflows`]: The Public API.** Batch procedures built on the engine,
//!   such as comparing many motif pairs in parallel.

pub mod core;
pub mod engine;
pub mod workflows;
