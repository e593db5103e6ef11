use super::load_structure;
use crate::cli::BatchArgs;
use crate::config::{ComparisonConfig, PartialBatchConfig};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use proteinbee::core::models::structure::Structure;
use proteinbee::engine::progress::ProgressReporter;
use proteinbee::workflows::compare::{self, ComparisonOutcome, MotifComparison};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// One row of the CSV report.
#[derive(Debug, Serialize)]
struct ReportRecord<'a> {
    name: &'a str,
    reference: String,
    reference_motif: String,
    mobile: String,
    mobile_motif: String,
    reference_atoms: usize,
    mobile_atoms: usize,
    rmsd: Option<f64>,
    error: Option<String>,
}

pub fn run(args: BatchArgs) -> Result<()> {
    let base_dir = args
        .config
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let configs = PartialBatchConfig::from_file(&args.config)?.resolve(&base_dir)?;
    let comparisons = build_comparisons(&configs)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let outcomes = compare::run(&comparisons, &reporter);

    let failed = outcomes.iter().filter(|o| o.rmsd.is_err()).count();
    match &args.output {
        Some(path) => {
            write_report(&configs, &outcomes, File::create(path)?)?;
            println!(
                "Wrote {} comparisons ({} failed) to {}",
                outcomes.len(),
                failed,
                path.display()
            );
        }
        None => write_report(&configs, &outcomes, io::stdout().lock())?,
    }
    Ok(())
}

/// Loads every distinct structure once and pairs it with its motifs.
fn build_comparisons(configs: &[ComparisonConfig]) -> Result<Vec<MotifComparison>> {
    let mut cache: HashMap<PathBuf, Arc<Structure>> = HashMap::new();
    let mut load = |path: &Path| -> Result<Arc<Structure>> {
        if let Some(structure) = cache.get(path) {
            return Ok(Arc::clone(structure));
        }
        let structure = Arc::new(load_structure(path)?);
        cache.insert(path.to_path_buf(), Arc::clone(&structure));
        Ok(structure)
    };

    let comparisons = configs
        .iter()
        .map(|config| -> Result<MotifComparison> {
            let comparison = MotifComparison::new(
                config.name.clone(),
                load(&config.reference)?,
                config.reference_motif.clone(),
                load(&config.mobile)?,
                config.mobile_motif.clone(),
            );
            Ok(match &config.atom_types {
                Some(atom_types) => comparison.with_atom_types(atom_types.iter().cloned()),
                None => comparison,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    info!(
        "Prepared {} comparisons over {} distinct structures.",
        comparisons.len(),
        cache.len()
    );
    Ok(comparisons)
}

fn write_report(configs: &[ComparisonConfig], outcomes: &[ComparisonOutcome], writer: impl Write) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (config, outcome) in configs.iter().zip(outcomes) {
        csv_writer.serialize(ReportRecord {
            name: &outcome.name,
            reference: config.reference.display().to_string(),
            reference_motif: config.reference_motif.to_string(),
            mobile: config.mobile.display().to_string(),
            mobile_motif: config.mobile_motif.to_string(),
            reference_atoms: outcome.reference_atoms,
            mobile_atoms: outcome.mobile_atoms,
            rmsd: outcome.rmsd.as_ref().ok().copied(),
            error: outcome.rmsd.as_ref().err().map(ToString::to_string),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
