//! # Core Models Module
//!
//! Value types describing motifs and the structures they are applied to.
//!
//! ## Key Components
//!
//! - [`selector`] - a single-chain inclusive residue range such as `A786-790`
//! - [`motif`] - an ordered, delimited sequence of selectors and segment lengths
//! - [`atom`] - one atom with its residue and chain annotation
//! - [`structure`] - an ordered atom array with selection operations
//!
//! ## Usage
//!
//! ```ignore
//! use proteinbee::core::models::{motif::Motif, structure::Structure};
//!
//! let motif = Motif::parse("A24-42/4/B64-82")?;
//! let native = Structure::from_path("native.pdb")?;
//! let motif_atoms = native.select_using_motif(&motif);
//!
//! // Where the same residues sit in a single-chain design.
//! let designed = motif.get_motif_wrt_designed_structure('A')?;
//! assert_eq!(designed.to_string(), "A1-19/4/A24-42");
//! ```

pub mod atom;
pub mod motif;
pub mod selector;
pub mod structure;
