use super::{load_structure, parse_motif};
use crate::cli::SelectArgs;
use crate::error::{CliError, Result};
use proteinbee::core::models::motif::DEFAULT_DELIMITER;
use proteinbee::core::models::structure::Structure;
use tracing::{info, warn};

pub fn run(args: SelectArgs) -> Result<()> {
    let selection = select(&args)?;
    println!("sequence: {}", selection.sequence());
    println!("atoms:    {}", selection.get_number_of_atoms());
    if let Some(output) = &args.output {
        println!("written:  {}", output.display());
    }
    Ok(())
}

fn select(args: &SelectArgs) -> Result<Structure> {
    let motif = parse_motif(&args.motif, DEFAULT_DELIMITER)?;
    let structure = load_structure(&args.input)?;

    let mut selection = structure.select_using_motif(&motif);
    if !args.atom_types.is_empty() {
        selection = selection.select_using_atom_types(&args.atom_types);
    }
    info!(
        "Selected {} of {} atoms with motif {}.",
        selection.get_number_of_atoms(),
        structure.get_number_of_atoms(),
        motif
    );
    if selection.is_empty() {
        warn!("Motif {} matched no atoms in {:?}.", motif, args.input);
    }

    if let Some(output) = &args.output {
        selection
            .save_structure(output)
            .map_err(|source| CliError::FileWriting {
                path: output.clone(),
                source,
            })?;
    }
    Ok(selection)
}
