//! Triaxial ellipsoids, and the point and ray queries against them.

use crate::ellipse::Ellipse;
use crate::vector::{is_rotation, perpendicular_basis};
use crate::{Error, Result};
use nalgebra::{Matrix3, Vector3};
use std::cmp::Ordering;

/// Tolerance on column norms and on the determinant, when deciding whether a
/// semi-axis matrix with normalized columns is a rotation.
const ROTATION_TOLERANCE: f64 = 1.0e-6;

/// Enough bisection steps to reach adjacent floating-point values from any
/// starting bracket.
const MAX_BISECTIONS: usize = 1100;

/// A triaxial ellipsoid: the image of the unit ball under
/// `u -> center + orientation * diag(radii) * u`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsoid {
    center: Vector3<f64>,
    /// Proper rotation whose columns are the principal axis directions.
    orientation: Matrix3<f64>,
    radii: Vector3<f64>,
}

/// Nearest point on an ellipsoid's surface to some other point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearPoint {
    pub point: Vector3<f64>,
    /// Distance from the surface, negative when the point is inside the
    /// ellipsoid.
    pub altitude: f64,
}

impl Ellipsoid {
    /// Ellipsoid with the given center, and with semi-axis vectors given by
    /// the columns of `semi_axes`.
    ///
    /// Every column must have positive length ([`Error::BADAXISLENGTH`]) and
    /// the columns must be orthogonal and right-handed
    /// ([`Error::NOTAROTATION`]).
    pub fn new(center: Vector3<f64>, semi_axes: &Matrix3<f64>) -> Result<Self> {
        let mut radii = Vector3::zeros();
        let mut directions = Matrix3::zeros();
        for (i, column) in semi_axes.column_iter().enumerate() {
            let length = column.norm();
            if !(length > 0.0) {
                return Err(Error::BADAXISLENGTH(format!(
                    "Semi-axis {} has length {length}; semi-axis lengths must be positive.",
                    i + 1
                )));
            }
            radii[i] = length;
            directions.set_column(i, &(column / length));
        }

        if !is_rotation(&directions, ROTATION_TOLERANCE, ROTATION_TOLERANCE) {
            return Err(Error::NOTAROTATION(format!(
                "Semi-axis matrix with unit columns has determinant {}; \
                 the columns must form a right-handed orthonormal frame.",
                directions.determinant()
            )));
        }

        // Snap to the nearest exact rotation, so the inverse is the transpose.
        let svd = directions.svd(true, true);
        let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
            return Err(Error::NOTAROTATION(
                "Semi-axis matrix could not be decomposed.".to_owned(),
            ));
        };

        Ok(Self {
            center,
            orientation: u * v_t,
            radii,
        })
    }

    /// Ellipsoid with semi-axes of length `a`, `b`, `c` along the x, y and z
    /// axes.
    pub fn from_radii(center: Vector3<f64>, a: f64, b: f64, c: f64) -> Result<Self> {
        if !(a > 0.0 && b > 0.0 && c > 0.0) {
            return Err(Error::BADAXISLENGTH(format!(
                "Semi-axis lengths are {a}, {b}, {c}; all must be positive."
            )));
        }
        Ok(Self {
            center,
            orientation: Matrix3::identity(),
            radii: Vector3::new(a, b, c),
        })
    }

    /// Ellipsoid `center + map * u` for `|u| <= 1`. The map must be
    /// nonsingular.
    pub(crate) fn from_linear_map(center: Vector3<f64>, map: &Matrix3<f64>) -> Result<Self> {
        let svd = map.svd(true, false);
        let Some(mut orientation) = svd.u else {
            return Err(Error::DEGENERATECASE(
                "Semi-axis map could not be decomposed.".to_owned(),
            ));
        };
        let radii = svd.singular_values;
        if !radii.iter().all(|&r| r > 0.0) {
            return Err(Error::BADAXISLENGTH(format!(
                "Transformed semi-axis lengths are {}, {}, {}; all must be positive.",
                radii[0], radii[1], radii[2]
            )));
        }
        if orientation.determinant() < 0.0 {
            let flipped = -orientation.column(2);
            orientation.set_column(2, &flipped);
        }
        Ok(Self {
            center,
            orientation,
            radii,
        })
    }

    pub fn center(&self) -> &Vector3<f64> {
        &self.center
    }

    /// Unit principal axis directions, as the columns of a rotation matrix.
    pub fn orientation(&self) -> &Matrix3<f64> {
        &self.orientation
    }

    /// Semi-axis lengths, in the order of the orientation's columns.
    pub fn radii(&self) -> &Vector3<f64> {
        &self.radii
    }

    /// Semi-axis vectors as matrix columns.
    pub fn semi_axes(&self) -> Matrix3<f64> {
        self.orientation * Matrix3::from_diagonal(&self.radii)
    }

    pub fn max_radius(&self) -> f64 {
        self.radii.max()
    }

    pub fn min_radius(&self) -> f64 {
        self.radii.min()
    }

    /// The same ellipsoid with its center moved by `offset`.
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            center: self.center + offset,
            ..self.clone()
        }
    }

    /// Coordinates of `p` in the frame where this ellipsoid is the unit
    /// sphere centered at the origin.
    pub fn to_unit_frame(&self, p: &Vector3<f64>) -> Vector3<f64> {
        (self.orientation.transpose() * (p - self.center)).component_div(&self.radii)
    }

    /// Inverse of [`Self::to_unit_frame`].
    pub fn from_unit_frame(&self, u: &Vector3<f64>) -> Vector3<f64> {
        self.center + self.orientation * u.component_mul(&self.radii)
    }

    /// Value of the ellipsoid's quadratic form at `p`: less than one inside,
    /// one on the surface, greater than one outside.
    pub fn level(&self, p: &Vector3<f64>) -> f64 {
        self.to_unit_frame(p).norm_squared()
    }

    /// Whether `p` is inside or on the surface.
    pub fn contains(&self, p: &Vector3<f64>) -> bool {
        self.level(p) <= 1.0
    }

    /// This ellipsoid as it appears in the unit-sphere frame of `frame`.
    pub(crate) fn in_unit_frame_of(&self, frame: &Ellipsoid) -> Result<Ellipsoid> {
        let center = frame.to_unit_frame(&self.center);
        let map = Matrix3::from_diagonal(&frame.radii.map(|r| 1.0 / r))
            * frame.orientation.transpose()
            * self.semi_axes();
        Ellipsoid::from_linear_map(center, &map)
    }

    /// Arbitrary but fixed total order on ellipsoids, used to make choices
    /// that must not depend on the order of arguments.
    pub(crate) fn canonical_cmp(&self, other: &Self) -> Ordering {
        let key = |e: &Self| {
            e.center
                .iter()
                .chain(e.orientation.iter())
                .chain(e.radii.iter())
                .copied()
                .collect::<Vec<f64>>()
        };
        key(self)
            .iter()
            .zip(key(other).iter())
            .map(|(a, b)| a.total_cmp(b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Outward unit normal of the level surface through `p`. For a surface
    /// point this is the surface normal.
    pub fn surface_normal(&self, p: &Vector3<f64>) -> Result<Vector3<f64>> {
        let gradient = self.orientation * self.to_unit_frame(p).component_div(&self.radii);
        gradient.try_normalize(0.0).ok_or_else(|| {
            Error::ZEROVECTOR("The normal is undefined at the center of the ellipsoid.".to_owned())
        })
    }

    /// The limb as seen from `viewpoint`: the surface points whose tangent
    /// planes contain the viewpoint.
    ///
    /// The viewpoint must be outside the ellipsoid ([`Error::INVALIDPOINT`]).
    pub fn limb(&self, viewpoint: &Vector3<f64>) -> Result<Ellipse> {
        let w = self.to_unit_frame(viewpoint);
        let level = w.norm_squared();
        if !(level > 1.0) {
            return Err(Error::INVALIDPOINT(format!(
                "Viewing point has level {level} relative to the ellipsoid; \
                 it must be outside the ellipsoid."
            )));
        }

        // For the unit sphere, the limb is the circle of tangency, in the
        // plane normal to w at distance 1/|w| from the center.
        let (e1, e2) = perpendicular_basis(&(w / level.sqrt()));
        let radius = (1.0 - 1.0 / level).sqrt();
        let center = self.from_unit_frame(&(w / level));
        let v1 = self.orientation * (e1 * radius).component_mul(&self.radii);
        let v2 = self.orientation * (e2 * radius).component_mul(&self.radii);
        Ok(Ellipse::from_generating_vectors(center, v1, v2))
    }

    /// First point where the ray from `vertex` along `direction` meets the
    /// surface, or `None` if it misses. A ray starting inside the ellipsoid
    /// returns its exit point.
    pub fn surface_intercept(
        &self,
        vertex: &Vector3<f64>,
        direction: &Vector3<f64>,
    ) -> Result<Option<Vector3<f64>>> {
        if *direction == Vector3::zeros() {
            return Err(Error::ZEROVECTOR(
                "Ray direction is the zero vector.".to_owned(),
            ));
        }

        let p = self.to_unit_frame(vertex);
        let q = (self.orientation.transpose() * direction).component_div(&self.radii);
        let q = q.normalize();

        let along = p.dot(&q);
        let miss_squared = (p - q * along).norm_squared();
        if miss_squared > 1.0 {
            return Ok(None);
        }
        let half_chord = (1.0 - miss_squared).sqrt();

        let s = if p.norm_squared() > 1.0 {
            // Outside: the near intersection must lie ahead of the vertex.
            let s = -along - half_chord;
            if s < 0.0 {
                return Ok(None);
            }
            s
        } else {
            -along + half_chord
        };

        Ok(Some(self.from_unit_frame(&(p + q * s))))
    }

    /// Nearest surface point to `point`, which may be inside or outside.
    ///
    /// Fails with [`Error::BADAXISLENGTH`] if the ratio of the longest to the
    /// shortest semi-axis is so large that its square overflows, and with
    /// [`Error::INPUTSTOOLARGE`] if the point's scaled coordinates would
    /// overflow.
    pub fn nearest_point(&self, point: &Vector3<f64>) -> Result<NearPoint> {
        let largest = self.max_radius();
        let ratio = largest / self.min_radius();
        if !(ratio <= f64::MAX.sqrt()) {
            return Err(Error::BADAXISLENGTH(format!(
                "Ratio of longest to shortest semi-axis is {ratio}; its square would overflow."
            )));
        }

        let local = self.orientation.transpose() * (point - self.center);
        let limit = f64::MAX / (ratio * ratio);
        if !local.iter().all(|c| c.abs() / largest <= limit) {
            return Err(Error::INPUTSTOOLARGE(format!(
                "Point components relative to the ellipsoid are ({}, {}, {}); \
                 scaled values would overflow.",
                local.x, local.y, local.z
            )));
        }

        // Solve in the first octant with the axes sorted longest first, then
        // restore the order and signs.
        let mut order = [0usize, 1, 2];
        order.sort_by(|&i, &j| self.radii[j].total_cmp(&self.radii[i]));
        let e = order.map(|i| self.radii[i]);
        let y = order.map(|i| local[i].abs());
        let x = closest_in_octant(e, y);

        let mut nearest = Vector3::zeros();
        for (k, &i) in order.iter().enumerate() {
            nearest[i] = x[k].copysign(local[i]);
        }

        let distance = (local - nearest).norm();
        let inside = local.component_div(&self.radii).norm_squared() < 1.0;

        Ok(NearPoint {
            point: self.center + self.orientation * nearest,
            altitude: if inside { -distance } else { distance },
        })
    }
}

fn robust_length(v: &[f64]) -> f64 {
    let max = v.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    if max == 0.0 {
        0.0
    } else {
        max * v.iter().map(|c| (c / max).powi(2)).sum::<f64>().sqrt()
    }
}

/// Root of `sum (r_i z_i / (s + r_i))^2 = 1` by bisection, for the last
/// weight normalized to one. `g` is the value of `sum z_i^2 - 1`.
fn bisect_root(r: &[f64], z: &[f64], g: f64) -> f64 {
    let n: Vec<f64> = r.iter().zip(z).map(|(r, z)| r * z).collect();
    let mut s0 = z[z.len() - 1] - 1.0;
    let mut s1 = if g < 0.0 { 0.0 } else { robust_length(&n) - 1.0 };
    let mut s = 0.0;
    for _ in 0..MAX_BISECTIONS {
        s = 0.5 * (s0 + s1);
        if s == s0 || s == s1 {
            break;
        }
        let g: f64 = n
            .iter()
            .zip(r)
            .map(|(n, r)| (n / (s + r)).powi(2))
            .sum::<f64>()
            - 1.0;
        if g > 0.0 {
            s0 = s;
        } else if g < 0.0 {
            s1 = s;
        } else {
            break;
        }
    }
    s
}

/// Nearest point to `(y0, y1)` on the ellipse with semi-axes `e0 >= e1`,
/// with `y0, y1 >= 0`.
fn closest_in_quadrant(e0: f64, e1: f64, y0: f64, y1: f64) -> (f64, f64) {
    if y1 > 0.0 {
        if y0 > 0.0 {
            let z = [y0 / e0, y1 / e1];
            let g = z[0] * z[0] + z[1] * z[1] - 1.0;
            if g == 0.0 {
                return (y0, y1);
            }
            let r0 = (e0 / e1).powi(2);
            let s = bisect_root(&[r0, 1.0], &z, g);
            (r0 * y0 / (s + r0), y1 / (s + 1.0))
        } else {
            (0.0, e1)
        }
    } else {
        let numer = e0 * y0;
        let denom = e0 * e0 - e1 * e1;
        if numer < denom {
            let xde = numer / denom;
            (e0 * xde, e1 * (1.0 - xde * xde).sqrt())
        } else {
            (e0, 0.0)
        }
    }
}

/// Nearest point to `y` on the ellipsoid with semi-axes `e[0] >= e[1] >= e[2]`,
/// with every component of `y` non-negative.
fn closest_in_octant(e: [f64; 3], y: [f64; 3]) -> [f64; 3] {
    if y[2] > 0.0 {
        if y[1] > 0.0 {
            if y[0] > 0.0 {
                let z = [y[0] / e[0], y[1] / e[1], y[2] / e[2]];
                let g = z.iter().map(|z| z * z).sum::<f64>() - 1.0;
                if g == 0.0 {
                    return y;
                }
                let r = [(e[0] / e[2]).powi(2), (e[1] / e[2]).powi(2), 1.0];
                let s = bisect_root(&r, &z, g);
                [
                    r[0] * y[0] / (s + r[0]),
                    r[1] * y[1] / (s + r[1]),
                    y[2] / (s + 1.0),
                ]
            } else {
                let (x1, x2) = closest_in_quadrant(e[1], e[2], y[1], y[2]);
                [0.0, x1, x2]
            }
        } else if y[0] > 0.0 {
            let (x0, x2) = closest_in_quadrant(e[0], e[2], y[0], y[2]);
            [x0, 0.0, x2]
        } else {
            [0.0, 0.0, e[2]]
        }
    } else {
        // The nearest point may still leave the z = 0 plane when y is deep
        // inside the ellipsoid.
        let denom = [e[0] * e[0] - e[2] * e[2], e[1] * e[1] - e[2] * e[2]];
        let numer = [e[0] * y[0], e[1] * y[1]];
        if numer[0] < denom[0] && numer[1] < denom[1] {
            let xde = [numer[0] / denom[0], numer[1] / denom[1]];
            let discr = 1.0 - xde[0] * xde[0] - xde[1] * xde[1];
            if discr > 0.0 {
                return [e[0] * xde[0], e[1] * xde[1], e[2] * discr.sqrt()];
            }
        }
        let (x0, x1) = closest_in_quadrant(e[0], e[1], y[0], y[1]);
        [x0, x1, 0.0]
    }
}
