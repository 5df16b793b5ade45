//! Small vector helpers shared by the geometry modules.

use nalgebra::{Matrix3, Vector3};
use std::f64::consts::{FRAC_PI_2, PI};

/// Angle in radians between two vectors, in `[0, pi]`.
///
/// Accurate for nearly parallel and nearly anti-parallel vectors, where the
/// arc cosine of the dot product loses most of its precision. Returns zero
/// if either vector is zero.
pub fn angular_separation(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let (Some(ua), Some(ub)) = (a.try_normalize(0.0), b.try_normalize(0.0)) else {
        return 0.0;
    };

    let dot = ua.dot(&ub);
    if dot > 0.0 {
        2.0 * ((ua - ub).norm() / 2.0).asin()
    } else if dot < 0.0 {
        PI - 2.0 * ((ua + ub).norm() / 2.0).asin()
    } else {
        FRAC_PI_2
    }
}

/// Whether `m` is a rotation matrix: every column has norm within `ntol` of
/// one, and the determinant is within `dtol` of one.
pub fn is_rotation(m: &Matrix3<f64>, ntol: f64, dtol: f64) -> bool {
    let norms_ok = m
        .column_iter()
        .all(|column| (column.norm() - 1.0).abs() <= ntol);

    // The determinant of a matrix with unit columns is +1 only when the
    // columns are orthogonal and right-handed.
    norms_ok && (m.determinant() - 1.0).abs() <= dtol
}

/// Two unit vectors completing the unit vector `u` to a right-handed
/// orthonormal basis.
pub(crate) fn perpendicular_basis(u: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let abs = u.abs();
    let seed = if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::x()
    } else if abs.y <= abs.z {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let e1 = u.cross(&seed).normalize();
    let e2 = u.cross(&e1);
    (e1, e2)
}
