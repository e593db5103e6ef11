//! # Engine Module
//!
//! Comparison logic layered on top of the core models.
//!
//! - [`alignment`] - [`alignment::StructureAlignment`], which caches the motif
//!   sub-structure of a structure and measures its RMSD against another
//! - [`superposition`] - the pluggable [`superposition::Superimposer`] strategy
//!   and its Kabsch implementation
//! - [`error`] - [`error::AlignmentError`]
//! - [`progress`] - callback-based progress reporting for long-running workflows

pub mod alignment;
pub mod error;
pub mod progress;
pub mod superposition;
