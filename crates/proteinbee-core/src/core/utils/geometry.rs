use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

/// Optimal rigid-body fit of a mobile point set onto a reference point set.
#[derive(Debug, Clone, PartialEq)]
pub struct Superposition {
    /// Proper rotation applied to the mobile points.
    pub rotation: Rotation3<f64>,
    /// Translation applied after the rotation.
    pub translation: Vector3<f64>,
    /// The mobile points after the transformation, in input order.
    pub transformed: Vec<Point3<f64>>,
}

impl Superposition {
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.rotation * point + self.translation
    }
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<f64>, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Superimposes `mobile` onto `reference` with the Kabsch algorithm.
///
/// Both sets are centered, the optimal rotation is taken from the SVD of their
/// covariance matrix, and reflections are excluded by flipping the axis of the
/// smallest singular value when needed.
///
/// Returns `None` when the sets differ in length or are empty.
pub fn kabsch_superimpose(
    reference: &[Point3<f64>],
    mobile: &[Point3<f64>],
) -> Option<Superposition> {
    if reference.len() != mobile.len() {
        return None;
    }
    let reference_center = centroid(reference)?;
    let mobile_center = centroid(mobile)?;

    let mut covariance = Matrix3::<f64>::zeros();
    for (r, m) in reference.iter().zip(mobile) {
        covariance += (m - mobile_center) * (r - reference_center).transpose();
    }

    let svd = covariance.svd(true, true);
    let u = svd.u?;
    let v = svd.v_t?.transpose();

    let mut correction = Matrix3::<f64>::identity();
    if (v * u.transpose()).determinant() < 0.0 {
        correction[(2, 2)] = -1.0;
    }
    let rotation = Rotation3::from_matrix_unchecked(v * correction * u.transpose());
    let translation = reference_center.coords - rotation * mobile_center.coords;

    let transformed = mobile.iter().map(|p| rotation * p + translation).collect();
    Some(Superposition {
        rotation,
        translation,
        transformed,
    })
}

/// Root-mean-square distance between corresponding points, without fitting.
pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}
