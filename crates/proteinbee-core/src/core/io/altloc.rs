use crate::core::models::atom::Atom;
use std::collections::HashMap;

/// Keeps, per residue, only the atoms of the first alternate location seen.
///
/// Atoms without an alternate-location indicator always pass.
#[derive(Debug, Default)]
pub(crate) struct AltLocFilter {
    first_seen: HashMap<(String, isize, Option<char>), char>,
    skipped: usize,
}

impl AltLocFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, atom: &Atom) -> bool {
        let Some(alt_loc) = atom.alt_loc else {
            return true;
        };
        let key = (atom.chain_id.clone(), atom.residue_id, atom.insertion_code);
        let first = *self.first_seen.entry(key).or_insert(alt_loc);
        if first == alt_loc {
            true
        } else {
            self.skipped += 1;
            false
        }
    }

    /// Number of atoms rejected so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
