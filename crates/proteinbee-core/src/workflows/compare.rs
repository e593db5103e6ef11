use crate::core::models::motif::Motif;
use crate::core::models::structure::Structure;
use crate::engine::alignment::StructureAlignment;
use crate::engine::error::AlignmentError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::superposition::{KabschSuperimposer, Superimposer};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// One reference/mobile motif pair to compare.
///
/// Structures are shared, so many comparisons against the same native
/// structure do not copy it.
#[derive(Debug, Clone)]
pub struct MotifComparison {
    pub name: String,
    pub reference: Arc<Structure>,
    pub reference_motif: Motif,
    pub mobile: Arc<Structure>,
    pub mobile_motif: Motif,
    /// Atom names to keep in both motif selections; all atoms when `None`.
    pub atom_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonOutcome {
    pub name: String,
    pub reference_atoms: usize,
    pub mobile_atoms: usize,
    pub rmsd: Result<f64, AlignmentError>,
}

impl MotifComparison {
    pub fn new(
        name: impl Into<String>,
        reference: Arc<Structure>,
        reference_motif: Motif,
        mobile: Arc<Structure>,
        mobile_motif: Motif,
    ) -> Self {
        Self {
            name: name.into(),
            reference,
            reference_motif,
            mobile,
            mobile_motif,
            atom_types: None,
        }
    }

    pub fn with_atom_types<I, S>(mut self, atom_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.atom_types = Some(atom_types.into_iter().map(Into::into).collect());
        self
    }

    fn alignment(&self, structure: &Arc<Structure>, motif: &Motif) -> StructureAlignment {
        match &self.atom_types {
            Some(atom_types) => StructureAlignment::with_atom_types(Arc::clone(structure), motif.clone(), atom_types),
            None => StructureAlignment::new(Arc::clone(structure), motif.clone()),
        }
    }

    pub fn evaluate(&self) -> ComparisonOutcome {
        self.evaluate_with(&KabschSuperimposer)
    }

    pub fn evaluate_with(&self, superimposer: &impl Superimposer) -> ComparisonOutcome {
        let reference = self.alignment(&self.reference, &self.reference_motif);
        let mobile = self.alignment(&self.mobile, &self.mobile_motif);
        ComparisonOutcome {
            name: self.name.clone(),
            reference_atoms: reference.get_motif_structure().get_number_of_atoms(),
            mobile_atoms: mobile.get_motif_structure().get_number_of_atoms(),
            rmsd: mobile.get_motif_deviation_with(superimposer, &reference),
        }
    }
}

/// Evaluates every comparison in parallel with Kabsch superposition.
///
/// Outcomes are returned in input order.
pub fn run(comparisons: &[MotifComparison], reporter: &ProgressReporter) -> Vec<ComparisonOutcome> {
    run_with(comparisons, &KabschSuperimposer, reporter)
}

#[instrument(skip_all, name = "motif_comparison_workflow", fields(total = comparisons.len()))]
pub fn run_with(
    comparisons: &[MotifComparison],
    superimposer: &impl Superimposer,
    reporter: &ProgressReporter,
) -> Vec<ComparisonOutcome> {
    reporter.report(Progress::BatchStart {
        total: comparisons.len() as u64,
    });
    info!("Comparing {} motif pairs.", comparisons.len());

    let outcomes: Vec<ComparisonOutcome> = comparisons
        .par_iter()
        .map(|comparison| {
            let outcome = comparison.evaluate_with(superimposer);
            if let Err(e) = &outcome.rmsd {
                warn!(name = %outcome.name, "Comparison failed: {}", e);
            }
            reporter.report(Progress::ComparisonFinished {
                name: outcome.name.clone(),
                rmsd: outcome.rmsd.as_ref().ok().copied(),
            });
            outcome
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.rmsd.is_err()).count();
    info!(
        "Finished {} comparisons ({} failed).",
        outcomes.len(),
        failed
    );
    reporter.report(Progress::BatchFinish);
    outcomes
}
