use super::error::AlignmentError;
use super::superposition::{KabschSuperimposer, Superimposer, check_point_sets};
use crate::core::models::motif::Motif;
use crate::core::models::structure::Structure;
use crate::core::utils::geometry;
use nalgebra::Point3;
use std::sync::Arc;
use tracing::{debug, trace};

/// A structure paired with a motif, with the motif's atoms selected up front.
///
/// The motif sub-structure is derived once at construction, so repeated
/// deviation queries against different references only pay for the
/// superposition. The alignment is immutable and can be shared across threads.
///
/// Two alignments are comparable when their motif sub-structures contain the
/// same number of atoms, e.g. a native motif such as `A24-42/4/B64-82` against
/// the matching designed motif `A1-19/4/A24-42`.
#[derive(Debug, Clone)]
pub struct StructureAlignment {
    structure: Arc<Structure>,
    motif: Motif,
    motif_structure: Structure,
}

impl StructureAlignment {
    pub fn new(structure: impl Into<Arc<Structure>>, motif: Motif) -> Self {
        let structure = structure.into();
        let motif_structure = structure.select_using_motif(&motif);
        Self {
            structure,
            motif,
            motif_structure,
        }
    }

    /// Like [`StructureAlignment::new`], but keeps only the motif atoms whose
    /// name is one of `atom_types` (e.g. the backbone `["N", "CA", "C", "O"]`).
    pub fn with_atom_types<I, S>(structure: impl Into<Arc<Structure>>, motif: Motif, atom_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let structure = structure.into();
        let motif_structure = structure
            .select_using_motif(&motif)
            .select_using_atom_types(atom_types);
        Self {
            structure,
            motif,
            motif_structure,
        }
    }

    pub fn structure(&self) -> &Arc<Structure> {
        &self.structure
    }

    pub fn motif(&self) -> &Motif {
        &self.motif
    }

    pub fn get_motif_structure(&self) -> &Structure {
        &self.motif_structure
    }

    /// RMSD between this alignment's motif atoms and those of `reference`,
    /// after optimally superimposing this motif onto the reference one.
    ///
    /// # Errors
    ///
    /// Returns [`AlignmentError::AtomCountMismatch`] if the two motif
    /// sub-structures differ in size, and [`AlignmentError::EmptySelection`] if
    /// both are empty.
    pub fn get_motif_deviation(&self, reference: &StructureAlignment) -> Result<f64, AlignmentError> {
        self.get_motif_deviation_with(&KabschSuperimposer, reference)
    }

    /// [`StructureAlignment::get_motif_deviation`] with a caller-chosen
    /// superposition strategy.
    pub fn get_motif_deviation_with(
        &self,
        superimposer: &impl Superimposer,
        reference: &StructureAlignment,
    ) -> Result<f64, AlignmentError> {
        let reference_atoms = reference.motif_structure.get_number_of_atoms();
        let mobile_atoms = self.motif_structure.get_number_of_atoms();
        if reference_atoms != mobile_atoms {
            return Err(AlignmentError::AtomCountMismatch {
                reference: reference_atoms,
                mobile: mobile_atoms,
            });
        }

        let rmsd = Self::root_mean_square_deviation_with(
            superimposer,
            &reference.motif_structure.coordinates(),
            &self.motif_structure.coordinates(),
        )?;
        debug!(
            "Deviation of motif {} from reference motif {} over {} atoms: {:.4}",
            self.motif, reference.motif, mobile_atoms, rmsd
        );
        Ok(rmsd)
    }

    /// Superimposes `mobile` onto `reference` and returns the RMSD between the
    /// reference points and the transformed mobile points.
    ///
    /// # Errors
    ///
    /// Returns [`AlignmentError::CoordinateCountMismatch`] for sets of different
    /// length and [`AlignmentError::EmptySelection`] for empty ones.
    pub fn root_mean_square_deviation(
        reference: &[Point3<f64>],
        mobile: &[Point3<f64>],
    ) -> Result<f64, AlignmentError> {
        Self::root_mean_square_deviation_with(&KabschSuperimposer, reference, mobile)
    }

    pub fn root_mean_square_deviation_with(
        superimposer: &impl Superimposer,
        reference: &[Point3<f64>],
        mobile: &[Point3<f64>],
    ) -> Result<f64, AlignmentError> {
        check_point_sets(reference, mobile)?;
        let fit = superimposer.superimpose(reference, mobile)?;
        trace!("Superposition translation: {:?}", fit.translation);
        geometry::calculate_rmsd(reference, &fit.transformed).ok_or(
            AlignmentError::CoordinateCountMismatch {
                reference: reference.len(),
                mobile: fit.transformed.len(),
            },
        )
    }
}
