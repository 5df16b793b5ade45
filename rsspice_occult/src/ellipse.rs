//! Ellipses in three-dimensional space.

use nalgebra::Vector3;

/// An ellipse, stored as a center and orthogonal semi-major and semi-minor
/// vectors.
///
/// The points of the ellipse are `center + cos(t) * semi_major + sin(t) * semi_minor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    center: Vector3<f64>,
    semi_major: Vector3<f64>,
    semi_minor: Vector3<f64>,
}

impl Ellipse {
    /// The ellipse `center + cos(t) * v1 + sin(t) * v2`, where the generating
    /// vectors `v1` and `v2` need not be orthogonal.
    ///
    /// If the generating vectors are linearly dependent the ellipse is
    /// degenerate, and the semi-minor axis is zero.
    pub fn from_generating_vectors(
        center: Vector3<f64>,
        v1: Vector3<f64>,
        v2: Vector3<f64>,
    ) -> Self {
        let scale = v1.norm().max(v2.norm());
        if scale == 0.0 {
            return Self {
                center,
                semi_major: Vector3::zeros(),
                semi_minor: Vector3::zeros(),
            };
        }

        let u1 = v1 / scale;
        let u2 = v2 / scale;

        // |P(t)|^2 peaks where tan(2t) = 2 u1.u2 / (u1.u1 - u2.u2); the
        // minimum is a quarter turn away.
        let t = 0.5 * (2.0 * u1.dot(&u2)).atan2(u1.norm_squared() - u2.norm_squared());
        let (sin, cos) = t.sin_cos();
        let mut semi_major = (u1 * cos + u2 * sin) * scale;
        let mut semi_minor = (u2 * cos - u1 * sin) * scale;

        if semi_minor.norm() > semi_major.norm() {
            std::mem::swap(&mut semi_major, &mut semi_minor);
        }

        Self {
            center,
            semi_major,
            semi_minor,
        }
    }

    pub fn center(&self) -> &Vector3<f64> {
        &self.center
    }

    pub fn semi_major(&self) -> &Vector3<f64> {
        &self.semi_major
    }

    pub fn semi_minor(&self) -> &Vector3<f64> {
        &self.semi_minor
    }

    /// Point of the ellipse at parameter `t`.
    pub fn point_at(&self, t: f64) -> Vector3<f64> {
        let (sin, cos) = t.sin_cos();
        self.center + self.semi_major * cos + self.semi_minor * sin
    }
}
