use nalgebra::Point3;

/// A single atom of a structure, carrying the residue and chain annotation it
/// was read with.
///
/// Atoms are stored flat in a [`Structure`](super::structure::Structure); the
/// residue a given atom belongs to is identified by its
/// `(chain_id, residue_id, insertion_code)` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom serial number from the source file.
    pub serial: usize,
    /// The name of the atom (e.g., "CA", "N", "O").
    pub name: String,
    /// The alternate location indicator, if any.
    pub alt_loc: Option<char>,
    /// The three-letter name of the parent residue (e.g., "ALA").
    pub residue_name: String,
    /// The chain identifier.
    pub chain_id: String,
    /// The residue sequence number.
    pub residue_id: isize,
    /// The residue insertion code, if any.
    pub insertion_code: Option<char>,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    pub occupancy: f64,
    pub b_factor: f64,
    /// The element symbol (e.g., "C", "SE").
    pub element: String,
    /// Whether the atom came from a HETATM record.
    pub hetero: bool,
}

impl Atom {
    /// Creates a new `Atom` with default values for the optional annotations.
    ///
    /// The element is guessed from the first letter of the atom name; occupancy
    /// defaults to 1.0 and the B-factor to 0.0.
    pub fn new(
        name: &str,
        residue_name: &str,
        chain_id: &str,
        residue_id: isize,
        position: Point3<f64>,
    ) -> Self {
        Self {
            serial: 0,
            name: name.to_string(),
            alt_loc: None,
            residue_name: residue_name.to_string(),
            chain_id: chain_id.to_string(),
            residue_id,
            insertion_code: None,
            position,
            occupancy: 1.0,
            b_factor: 0.0,
            element: guess_element(name),
            hetero: false,
        }
    }

    /// Key identifying the residue this atom belongs to.
    pub fn residue_key(&self) -> (&str, isize, Option<char>) {
        (&self.chain_id, self.residue_id, self.insertion_code)
    }
}

fn guess_element(atom_name: &str) -> String {
    atom_name
        .trim()
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}
