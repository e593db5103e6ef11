use super::cif::{CifError, CifFile};
use super::pdb::{PdbError, PdbFile};
use super::traits::StructureFile;
use crate::core::models::structure::Structure;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const BINARY_CIF: &str = "bcif";

/// Structure file formats understood by [`read_structure`] and [`write_structure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureFormat {
    Pdb,
    Cif,
}

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("Unsupported structure format: {0}")]
    UnsupportedFormat(String),
    #[error("Cannot infer a structure format from the file name: {}", .0.display())]
    UnknownExtension(PathBuf),
    #[error("PDB error: {0}")]
    Pdb(#[from] PdbError),
    #[error("mmCIF error: {0}")]
    Cif(#[from] CifError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StructureFormat {
    /// Infers the format from the file extension (case-insensitive).
    ///
    /// Binary CIF files are recognized but rejected with
    /// [`StructureError::UnsupportedFormat`].
    pub fn from_path(path: &Path) -> Result<Self, StructureError> {
        let unknown = || StructureError::UnknownExtension(path.to_path_buf());
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(unknown)?;
        match extension.parse::<Self>() {
            Err(StructureError::UnsupportedFormat(name)) if name != BINARY_CIF => Err(unknown()),
            result => result,
        }
    }

    /// The canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdb => "pdb",
            Self::Cif => "cif",
        }
    }
}

impl FromStr for StructureFormat {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdb" | "ent" => Ok(Self::Pdb),
            "cif" | "mmcif" | "pdbx" => Ok(Self::Cif),
            other => Err(StructureError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

pub fn read_structure(reader: &mut impl BufRead, format: StructureFormat) -> Result<Structure, StructureError> {
    let structure = match format {
        StructureFormat::Pdb => PdbFile::read_from(reader)?.0,
        StructureFormat::Cif => CifFile::read_from(reader)?.0,
    };
    Ok(structure)
}

pub fn write_structure(
    structure: &Structure,
    writer: &mut impl Write,
    format: StructureFormat,
) -> Result<(), StructureError> {
    match format {
        StructureFormat::Pdb => PdbFile::write_structure_to(structure, writer)?,
        StructureFormat::Cif => CifFile::write_structure_to(structure, writer)?,
    }
    writer.flush()?;
    Ok(())
}
