//! Reading and writing of protein structure files.
//!
//! Two text formats are supported: fixed-column PDB and the `_atom_site`
//! category of mmCIF. Both implement the [`traits::StructureFile`] trait;
//! [`format`] dispatches on [`format::StructureFormat`] so callers can work
//! with paths or in-memory blobs without naming a concrete format.

pub(crate) mod altloc;
pub mod cif;
pub mod format;
pub mod pdb;
pub mod traits;
