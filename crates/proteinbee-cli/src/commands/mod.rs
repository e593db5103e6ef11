pub mod batch;
pub mod design;
pub mod inspect;
pub mod rmsd;
pub mod select;

use crate::error::{CliError, Result};
use proteinbee::core::models::motif::Motif;
use proteinbee::core::models::structure::Structure;
use std::path::Path;
use tracing::info;

pub(crate) fn parse_motif(motif: &str, delimiter: char) -> Result<Motif> {
    Motif::from_string(motif, delimiter).map_err(|source| CliError::Motif {
        motif: motif.to_string(),
        source,
    })
}

pub(crate) fn load_structure(path: &Path) -> Result<Structure> {
    info!("Loading structure from {:?}", path);
    Structure::from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_motif_wraps_errors_with_input() {
        match parse_motif("A5-1", '/') {
            Err(CliError::Motif { motif, .. }) => assert_eq!(motif, "A5-1"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(parse_motif("A1-2,3", ',').unwrap().len(), 2);
    }

    #[test]
    fn load_structure_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write(dir.path(), "broken.pdb", "HEADER    NOTHING\n");
        match load_structure(&path) {
            Err(CliError::FileParsing { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
