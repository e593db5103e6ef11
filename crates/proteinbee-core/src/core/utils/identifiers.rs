use phf::{Map, Set, phf_map, phf_set};

/// Placeholder letter for residues without a standard one-letter code.
pub const UNKNOWN_RESIDUE_CODE: char = 'X';

/// Heavy backbone atoms shared by every amino acid.
pub const BACKBONE_ATOM_TYPES: [&str; 4] = ["N", "CA", "C", "O"];

static BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "H", "HN", "CA", "HA", "C", "O", "OXT", "H1", "H2", "H3",
    "HA2", "HA3", "OT1", "OT2",
};

static RESIDUE_ONE_LETTER_CODES: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
    "GLN" => 'Q', "GLU" => 'E', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
    "SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',
    // Non-canonical names mapped onto their parent amino acid
    "SEC" => 'U', "PYL" => 'O', "MSE" => 'M', "ASX" => 'B', "GLX" => 'Z',
    "HSD" => 'H', "HSE" => 'H', "HSP" => 'H', "HIE" => 'H', "HID" => 'H', "HIP" => 'H',
    "CYX" => 'C', "CYM" => 'C', "ASH" => 'D', "GLH" => 'E', "LYN" => 'K',
};

/// One-letter amino-acid code for a three-letter residue name, if it is a
/// known amino acid.
pub fn one_letter_code(residue_name: &str) -> Option<char> {
    RESIDUE_ONE_LETTER_CODES
        .get(residue_name.trim().to_ascii_uppercase().as_str())
        .copied()
}

pub fn is_amino_acid(residue_name: &str) -> bool {
    one_letter_code(residue_name).is_some()
}

pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

pub fn is_heavy_atom(atom_name: &str) -> bool {
    let first_char = atom_name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase());
    !matches!(first_char, Some('H') | Some('D'))
}
