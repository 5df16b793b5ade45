//! Angular separation between a ray and the points of an ellipse.

use crate::ellipse::Ellipse;
use crate::vector::angular_separation;
use crate::{Error, Result};
use nalgebra::Vector3;
use std::f64::consts::TAU;
use std::str::FromStr;

/// Number of evenly spaced ellipse points sampled before refinement.
const SAMPLES: usize = 512;

/// Number of the best sampled local extrema that get refined.
const REFINED_CANDIDATES: usize = 4;

const GOLDEN_STEPS: usize = 100;

/// Which extreme separation to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    /// Largest magnitude.
    Max,
}

impl FromStr for Extremum {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MIN" => Ok(Extremum::Min),
            "MAX" => Ok(Extremum::Max),
            _ => Err(Error::NOTSUPPORTED(format!(
                "Extremum specifier {s:?} is not supported; expected MIN or MAX."
            ))),
        }
    }
}

/// Extreme angular separation between a ray and an ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimbSeparation {
    /// Angle in radians. Negative when the ray passes through the plane
    /// region bounded by the ellipse.
    pub angle: f64,
    /// Point of the ellipse where the extreme occurs.
    pub point: Vector3<f64>,
}

/// Minimum or maximum angular separation between the ray from `vertex`
/// along `direction`, and the points of `ellipse`.
///
/// Errors:
/// * [`Error::ZEROVECTOR`] if `direction` is zero.
/// * [`Error::INVALIDAXISLENGTH`] if either semi-axis of the ellipse has zero
///   length.
/// * [`Error::DEGENERATECASE`] if the vertex lies in the plane of the
///   ellipse.
pub fn ray_ellipse_separation(
    ellipse: &Ellipse,
    vertex: &Vector3<f64>,
    direction: &Vector3<f64>,
    extremum: Extremum,
) -> Result<LimbSeparation> {
    Ok(SeparationProfile::new(ellipse, vertex, direction)?.extreme(extremum))
}

/// Separation as a function of the ellipse parameter, sampled once so that
/// both extremes can be found from the same samples.
pub(crate) struct SeparationProfile<'a> {
    ellipse: &'a Ellipse,
    /// Ellipse center relative to the vertex.
    offset: Vector3<f64>,
    direction: Vector3<f64>,
    penetrates: bool,
    samples: Vec<f64>,
}

impl<'a> SeparationProfile<'a> {
    pub(crate) fn new(
        ellipse: &'a Ellipse,
        vertex: &Vector3<f64>,
        direction: &Vector3<f64>,
    ) -> Result<Self> {
        if *direction == Vector3::zeros() {
            return Err(Error::ZEROVECTOR(
                "Ray direction is the zero vector.".to_owned(),
            ));
        }

        let major = ellipse.semi_major();
        let minor = ellipse.semi_minor();
        if major.norm() == 0.0 || minor.norm() == 0.0 {
            return Err(Error::INVALIDAXISLENGTH(format!(
                "Ellipse semi-axis lengths are {} and {}; both must be non-zero.",
                major.norm(),
                minor.norm()
            )));
        }

        let offset = ellipse.center() - vertex;
        let normal = major.cross(minor);
        let height = normal.dot(&offset);
        if height == 0.0 {
            return Err(Error::DEGENERATECASE(
                "Ray vertex lies in the plane of the ellipse.".to_owned(),
            ));
        }

        let rate = normal.dot(direction);
        let penetrates = rate != 0.0 && height / rate > 0.0 && {
            // Where the ray crosses the plane, relative to the ellipse center.
            let hit = direction * (height / rate) - offset;
            let a = hit.dot(major) / major.norm_squared();
            let b = hit.dot(minor) / minor.norm_squared();
            a * a + b * b < 1.0
        };

        let mut profile = Self {
            ellipse,
            offset,
            direction: *direction,
            penetrates,
            samples: Vec::with_capacity(SAMPLES),
        };
        profile.samples = (0..SAMPLES)
            .map(|k| profile.angle_at(k as f64 * TAU / SAMPLES as f64))
            .collect();
        Ok(profile)
    }

    /// Whether the ray passes through the plane region bounded by the
    /// ellipse.
    pub(crate) fn penetrates(&self) -> bool {
        self.penetrates
    }

    fn angle_at(&self, t: f64) -> f64 {
        let (sin, cos) = t.sin_cos();
        let to_point =
            self.offset + self.ellipse.semi_major() * cos + self.ellipse.semi_minor() * sin;
        angular_separation(&self.direction, &to_point)
    }

    pub(crate) fn extreme(&self, extremum: Extremum) -> LimbSeparation {
        // Minimize sign * angle in both cases.
        let sign = match extremum {
            Extremum::Min => 1.0,
            Extremum::Max => -1.0,
        };
        let n = self.samples.len();
        let step = TAU / n as f64;
        let value = |k: usize| sign * self.samples[k % n];

        let mut candidates: Vec<usize> = (0..n)
            .filter(|&k| value(k) <= value(k + n - 1) && value(k) <= value(k + 1))
            .collect();
        candidates.sort_by(|&i, &j| value(i).total_cmp(&value(j)));

        let objective = |t: f64| sign * self.angle_at(t);
        let (t, _) = candidates
            .iter()
            .take(REFINED_CANDIDATES)
            .map(|&k| {
                let t = k as f64 * step;
                golden_section(&objective, t - step, t + step, (t, value(k)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((0.0, value(0)));

        let angle = self.angle_at(t);
        LimbSeparation {
            angle: if self.penetrates { -angle } else { angle },
            point: self.ellipse.point_at(t),
        }
    }
}

/// Golden-section search for the minimum of `f` on `[a, b]`. Returns the
/// best of the search result and `best`, as `(x, f(x))`.
fn golden_section(
    f: &impl Fn(f64) -> f64,
    mut a: f64,
    mut b: f64,
    mut best: (f64, f64),
) -> (f64, f64) {
    let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
    let mut x1 = b - ratio * (b - a);
    let mut x2 = a + ratio * (b - a);
    let mut f1 = f(x1);
    let mut f2 = f(x2);
    for _ in 0..GOLDEN_STEPS {
        if f1 <= f2 {
            b = x2;
            x2 = x1;
            f2 = f1;
            x1 = b - ratio * (b - a);
            f1 = f(x1);
        } else {
            a = x1;
            x1 = x2;
            f1 = f2;
            x2 = a + ratio * (b - a);
            f2 = f(x2);
        }
        if b - a <= f64::EPSILON * (a.abs() + b.abs()) {
            break;
        }
    }
    for candidate in [(x1, f1), (x2, f2)] {
        if candidate.1 < best.1 {
            best = candidate;
        }
    }
    best
}
