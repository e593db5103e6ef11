use super::{load_structure, parse_motif};
use crate::cli::RmsdArgs;
use crate::error::{CliError, Result};
use proteinbee::core::models::motif::{DEFAULT_DELIMITER, Motif};
use proteinbee::core::models::structure::Structure;
use proteinbee::engine::alignment::StructureAlignment;
use tracing::info;

pub fn run(args: RmsdArgs) -> Result<()> {
    let rmsd = compute(&args)?;
    println!("{:.4}", rmsd);
    Ok(())
}

fn alignment(structure: Structure, motif: Motif, atom_types: &[String]) -> StructureAlignment {
    if atom_types.is_empty() {
        StructureAlignment::new(structure, motif)
    } else {
        StructureAlignment::with_atom_types(structure, motif, atom_types)
    }
}

fn compute(args: &RmsdArgs) -> Result<f64> {
    let reference_motif = parse_motif(&args.reference_motif, DEFAULT_DELIMITER)?;
    let mobile_motif = match &args.mobile_motif {
        Some(motif) => parse_motif(motif, DEFAULT_DELIMITER)?,
        None => reference_motif
            .get_motif_wrt_designed_structure(args.designed_chain)
            .map_err(|source| CliError::Motif {
                motif: args.reference_motif.clone(),
                source,
            })?,
    };
    info!("Comparing reference motif {} with mobile motif {}.", reference_motif, mobile_motif);

    let reference = alignment(load_structure(&args.reference)?, reference_motif, &args.atom_types);
    let mobile = alignment(load_structure(&args.mobile)?, mobile_motif, &args.atom_types);
    Ok(mobile.get_motif_deviation(&reference)?)
}
