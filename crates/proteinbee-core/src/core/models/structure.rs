use super::atom::Atom;
use super::motif::Motif;
use super::selector::Selector;
use crate::core::io::format::{self, StructureError, StructureFormat};
use crate::core::utils::identifiers::{UNKNOWN_RESIDUE_CODE, one_letter_code};
use itertools::Itertools;
use nalgebra::Point3;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;
use tracing::debug;

/// An ordered array of atoms with chain/residue-based selection.
///
/// Every selection returns a new `Structure` holding copies of the matching
/// atoms in their original order, except [`Structure::select_using_motif`],
/// which concatenates one selection per selector in motif order so that two
/// motif structures correspond atom-for-atom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    atoms: Vec<Atom>,
}

impl Structure {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    /// Parses a structure from an in-memory file of the given format.
    ///
    /// # Errors
    ///
    /// Returns the format-specific parse error wrapped in [`StructureError`].
    pub fn from_blob(blob: &[u8], structure_format: StructureFormat) -> Result<Self, StructureError> {
        let mut reader = Cursor::new(blob);
        format::read_structure(&mut reader, structure_format)
    }

    /// Reads a structure from disk, choosing the format from the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, StructureError> {
        let path = path.as_ref();
        let structure_format = StructureFormat::from_path(path)?;
        debug!("Reading {:?} structure from {}", structure_format, path.display());
        let mut reader = BufReader::new(File::open(path)?);
        format::read_structure(&mut reader, structure_format)
    }

    /// Writes the structure to disk, choosing the format from the file extension.
    pub fn save_structure<P: AsRef<Path>>(&self, path: P) -> Result<(), StructureError> {
        let path = path.as_ref();
        let structure_format = StructureFormat::from_path(path)?;
        debug!(
            "Writing {} atoms as {:?} to {}",
            self.atoms.len(),
            structure_format,
            path.display()
        );
        let mut writer = BufWriter::new(File::create(path)?);
        format::write_structure(self, &mut writer, structure_format)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    pub fn get_number_of_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    fn filter(&self, predicate: impl Fn(&Atom) -> bool) -> Structure {
        self.atoms.iter().filter(|atom| predicate(atom)).cloned().collect()
    }

    /// Keeps the atoms belonging to any of the given chains.
    pub fn select_using_chains<I, S>(&self, chains: I) -> Structure
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let chains: HashSet<String> = chains
            .into_iter()
            .map(|chain| chain.as_ref().to_string())
            .collect();
        self.filter(|atom| chains.contains(&atom.chain_id))
    }

    /// Keeps the atoms whose residue number lies in `low..=high`.
    pub fn select_using_residue_range(&self, low: isize, high: isize) -> Structure {
        self.filter(|atom| (low..=high).contains(&atom.residue_id))
    }

    /// Keeps the atoms whose name is one of `atom_types` (e.g. `["N", "CA", "C"]`).
    pub fn select_using_atom_types<I, S>(&self, atom_types: I) -> Structure
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let atom_types: HashSet<String> = atom_types
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        self.filter(|atom| atom_types.contains(&atom.name))
    }

    /// Keeps the atoms on the selector's chain within its residue range.
    pub fn select_using_selector(&self, selector: &Selector) -> Structure {
        self.filter(|atom| matches_selector(atom, selector))
    }

    /// Concatenates [`Structure::select_using_selector`] over the motif's
    /// selectors, in motif order. A selector that occurs twice contributes its
    /// atoms twice.
    pub fn select_using_motif(&self, motif: &Motif) -> Structure {
        let atoms: Vec<Atom> = motif
            .selector_iter()
            .flat_map(|selector| {
                self.atoms
                    .iter()
                    .filter(move |atom| matches_selector(atom, selector))
            })
            .cloned()
            .collect();
        debug!("Motif {} selected {} atoms", motif, atoms.len());
        Structure::new(atoms)
    }

    /// Distinct chain IDs in order of first appearance.
    pub fn chain_iter(&self) -> impl Iterator<Item = &str> {
        self.atoms.iter().map(|atom| atom.chain_id.as_str()).unique()
    }

    fn residue_starts(&self) -> impl Iterator<Item = &Atom> {
        self.atoms
            .iter()
            .dedup_by(|a, b| a.residue_key() == b.residue_key())
    }

    /// Residue numbers, one per residue, in structure order.
    pub fn residue_id_iter(&self) -> impl Iterator<Item = isize> + '_ {
        self.residue_starts().map(|atom| atom.residue_id)
    }

    /// One-letter amino-acid codes, one per residue, in structure order.
    /// Residues without a standard code are reported as `X`.
    pub fn aa_iter(&self) -> impl Iterator<Item = char> + '_ {
        self.residue_starts()
            .map(|atom| one_letter_code(&atom.residue_name).unwrap_or(UNKNOWN_RESIDUE_CODE))
    }

    pub fn sequence(&self) -> String {
        self.aa_iter().collect()
    }

    /// Atom coordinates in structure order.
    pub fn coordinates(&self) -> Vec<Point3<f64>> {
        self.atoms.iter().map(|atom| atom.position).collect()
    }
}

fn matches_selector(atom: &Atom, selector: &Selector) -> bool {
    atom.chain_id.chars().eq(std::iter::once(selector.chain())) && selector.contains(atom.residue_id)
}

impl FromIterator<Atom> for Structure {
    fn from_iter<T: IntoIterator<Item = Atom>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
