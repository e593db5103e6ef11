//! # Workflows Module
//!
//! High-level entry points that combine the engine and core layers into
//! complete procedures.
//!
//! - **Motif comparison** ([`compare`]) - evaluates many reference/mobile motif
//!   pairs in parallel and collects one RMSD outcome per pair, keeping
//!   individual failures as values so one bad pair never aborts a batch.

pub mod compare;
