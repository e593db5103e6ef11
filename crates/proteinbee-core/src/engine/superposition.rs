use super::error::AlignmentError;
use crate::core::utils::geometry::{self, Superposition};
use nalgebra::Point3;

/// A rigid-body fitting strategy.
///
/// Implementations receive two point sets of equal, non-zero length and return
/// the transformation that best maps `mobile` onto `reference`.
pub trait Superimposer: Send + Sync {
    fn superimpose(
        &self,
        reference: &[Point3<f64>],
        mobile: &[Point3<f64>],
    ) -> Result<Superposition, AlignmentError>;
}

/// Least-squares superposition with the Kabsch algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct KabschSuperimposer;

impl Superimposer for KabschSuperimposer {
    fn superimpose(
        &self,
        reference: &[Point3<f64>],
        mobile: &[Point3<f64>],
    ) -> Result<Superposition, AlignmentError> {
        check_point_sets(reference, mobile)?;
        geometry::kabsch_superimpose(reference, mobile).ok_or_else(|| {
            AlignmentError::Superposition(
                "singular value decomposition of the covariance matrix failed".to_string(),
            )
        })
    }
}

impl<F> Superimposer for F
where
    F: Fn(&[Point3<f64>], &[Point3<f64>]) -> Result<Superposition, AlignmentError> + Send + Sync,
{
    fn superimpose(
        &self,
        reference: &[Point3<f64>],
        mobile: &[Point3<f64>],
    ) -> Result<Superposition, AlignmentError> {
        self(reference, mobile)
    }
}

pub(crate) fn check_point_sets(
    reference: &[Point3<f64>],
    mobile: &[Point3<f64>],
) -> Result<(), AlignmentError> {
    if reference.len() != mobile.len() {
        return Err(AlignmentError::CoordinateCountMismatch {
            reference: reference.len(),
            mobile: mobile.len(),
        });
    }
    if reference.is_empty() {
        return Err(AlignmentError::EmptySelection);
    }
    Ok(())
}
