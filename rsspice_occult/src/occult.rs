//! Occultation state of two ellipsoidal targets seen from a viewing point.

use crate::ellipsoid::Ellipsoid;
use crate::separation::{Extremum, SeparationProfile};
use crate::vector::angular_separation;
use crate::{Error, Result};
use nalgebra::{Matrix3, Vector3};
use std::cmp::Ordering;
use std::f64::consts::PI;
use std::fmt;
use std::ops::Neg;
use tracing::debug;

/// How the apparent disks of two targets relate, as seen from a viewing
/// point.
///
/// The integer codes follow the SPICE convention: positive when the first
/// target is in front, with magnitude 1 for partial, 2 for annular and 3 for
/// total occultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occultation {
    /// The second target completely hides the first.
    TotalOfFirst,
    /// The second target is in front, and its disk lies inside the first's.
    AnnularOfFirst,
    /// The second target partially hides the first.
    PartialOfFirst,
    /// The disks do not overlap.
    NoOccultation,
    /// The first target partially hides the second.
    PartialOfSecond,
    /// The first target is in front, and its disk lies inside the second's.
    AnnularOfSecond,
    /// The first target completely hides the second.
    TotalOfSecond,
}

impl Occultation {
    /// Integer occultation code, in `-3..=3`.
    pub fn code(self) -> i32 {
        match self {
            Occultation::TotalOfFirst => -3,
            Occultation::AnnularOfFirst => -2,
            Occultation::PartialOfFirst => -1,
            Occultation::NoOccultation => 0,
            Occultation::PartialOfSecond => 1,
            Occultation::AnnularOfSecond => 2,
            Occultation::TotalOfSecond => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -3 => Some(Occultation::TotalOfFirst),
            -2 => Some(Occultation::AnnularOfFirst),
            -1 => Some(Occultation::PartialOfFirst),
            0 => Some(Occultation::NoOccultation),
            1 => Some(Occultation::PartialOfSecond),
            2 => Some(Occultation::AnnularOfSecond),
            3 => Some(Occultation::TotalOfSecond),
            _ => None,
        }
    }
}

/// Swaps the roles of the two targets.
impl Neg for Occultation {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Occultation::TotalOfFirst => Occultation::TotalOfSecond,
            Occultation::AnnularOfFirst => Occultation::AnnularOfSecond,
            Occultation::PartialOfFirst => Occultation::PartialOfSecond,
            Occultation::NoOccultation => Occultation::NoOccultation,
            Occultation::PartialOfSecond => Occultation::PartialOfFirst,
            Occultation::AnnularOfSecond => Occultation::AnnularOfFirst,
            Occultation::TotalOfSecond => Occultation::TotalOfFirst,
        }
    }
}

impl fmt::Display for Occultation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Occultation::TotalOfFirst => "total occultation of first target by second",
            Occultation::AnnularOfFirst => "annular occultation of first target by second",
            Occultation::PartialOfFirst => "partial occultation of first target by second",
            Occultation::NoOccultation => "no occultation",
            Occultation::PartialOfSecond => "partial occultation of second target by first",
            Occultation::AnnularOfSecond => "annular occultation of second target by first",
            Occultation::TotalOfSecond => "total occultation of second target by first",
        })
    }
}

/// Overlap of the front and back disks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlap {
    Apart,
    Partial,
    /// Front disk inside the back disk.
    Annular,
    /// Back disk inside the front disk.
    Total,
}

impl Overlap {
    fn occultation(self, first_in_front: bool) -> Occultation {
        match (self, first_in_front) {
            (Overlap::Apart, _) => Occultation::NoOccultation,
            (Overlap::Partial, true) => Occultation::PartialOfSecond,
            (Overlap::Annular, true) => Occultation::AnnularOfSecond,
            (Overlap::Total, true) => Occultation::TotalOfSecond,
            (Overlap::Partial, false) => Occultation::PartialOfFirst,
            (Overlap::Annular, false) => Occultation::AnnularOfFirst,
            (Overlap::Total, false) => Occultation::TotalOfFirst,
        }
    }
}

/// Half-angles of the cones from the viewing point that are inscribed in,
/// and circumscribed about, a target.
#[derive(Debug, Clone, Copy)]
struct BoundingCones {
    inner: f64,
    outer: f64,
}

impl BoundingCones {
    /// For a target whose center is given relative to the viewing point.
    fn new(target: &Ellipsoid) -> Self {
        let distance = target.center().norm();
        let inner = (target.min_radius() / distance).min(1.0).asin();
        let outer = if target.max_radius() < distance {
            (target.max_radius() / distance).asin()
        } else {
            PI
        };
        Self { inner, outer }
    }
}

/// Occultation state of two targets given by center and semi-axis matrix,
/// as seen from `viewpoint`.
///
/// The columns of each semi-axis matrix are the semi-axis vectors of the
/// target. See [`occultation`] for the errors.
pub fn classify(
    viewpoint: &Vector3<f64>,
    center1: &Vector3<f64>,
    semi_axes1: &Matrix3<f64>,
    center2: &Vector3<f64>,
    semi_axes2: &Matrix3<f64>,
) -> Result<Occultation> {
    let first = Ellipsoid::new(*center1, semi_axes1)?;
    let second = Ellipsoid::new(*center2, semi_axes2)?;
    occultation(viewpoint, &first, &second)
}

/// Occultation state of two targets as seen from `viewpoint`.
///
/// Fails with [`Error::NOTDISJOINT`] if the viewing point is inside or on
/// either target, or if the targets intersect. Disks that only touch do not
/// overlap.
pub fn occultation(
    viewpoint: &Vector3<f64>,
    first: &Ellipsoid,
    second: &Ellipsoid,
) -> Result<Occultation> {
    for (name, target) in [("first", first), ("second", second)] {
        if target.contains(viewpoint) {
            return Err(Error::NOTDISJOINT(format!(
                "Viewing point is inside the {name} target ellipsoid."
            )));
        }
    }

    // Work relative to the viewing point, so that large common offsets do
    // not swamp the geometry.
    let first = first.translated(&-viewpoint);
    let second = second.translated(&-viewpoint);

    let cones = [BoundingCones::new(&first), BoundingCones::new(&second)];
    let separation = angular_separation(first.center(), second.center());

    // The target with the wider outer cone is mapped to the unit sphere.
    let sphere_is_first = match cones[0].outer.total_cmp(&cones[1].outer) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => first.canonical_cmp(&second).is_le(),
    };
    let (sphere, other) = if sphere_is_first {
        (&first, &second)
    } else {
        (&second, &first)
    };
    let image = other.in_unit_frame_of(sphere)?;
    let eye = sphere.to_unit_frame(&Vector3::zeros());

    let near = image.nearest_point(&Vector3::zeros())?;
    if near.altitude <= 1.0 {
        return Err(Error::NOTDISJOINT(
            "The target ellipsoids intersect.".to_owned(),
        ));
    }

    if separation >= cones[0].outer + cones[1].outer {
        debug!(separation, "outer cones are disjoint");
        return Ok(Occultation::NoOccultation);
    }

    // The plane normal to the nearest-point direction, halfway between the
    // unit sphere and the image, separates the targets. Whichever side the
    // viewer is on holds the front target.
    let normal = near.point / near.altitude;
    let sphere_in_front = normal.dot(&eye) < 0.5 * (1.0 + near.altitude);
    let first_in_front = sphere_in_front == sphere_is_first;

    let (front, back) = if first_in_front {
        (cones[0], cones[1])
    } else {
        (cones[1], cones[0])
    };

    let overlap = if separation + back.outer <= front.inner {
        debug!("back target inside front inner cone");
        Overlap::Total
    } else if separation + front.outer <= back.inner {
        debug!("front target inside back inner cone");
        Overlap::Annular
    } else {
        // The limb is undefined when the viewpoint is on the image's surface
        // to within rounding, which the level test above can miss.
        let limbs = limb_overlap(&eye, &image).map_err(|err| {
            debug!(%err, "limb comparison failed");
            Error::NOTDISJOINT(
                "Viewing point is on the surface of a target ellipsoid.".to_owned(),
            )
        })?;
        match (limbs, sphere_in_front) {
            (LimbOverlap::Apart, _) => Overlap::Apart,
            (LimbOverlap::Partial, _) => Overlap::Partial,
            (LimbOverlap::SphereWithin, true) | (LimbOverlap::ImageWithin, false) => {
                Overlap::Annular
            }
            (LimbOverlap::SphereWithin, false) | (LimbOverlap::ImageWithin, true) => {
                Overlap::Total
            }
        }
    };

    debug!(?overlap, first_in_front, "classified");
    Ok(overlap.occultation(first_in_front))
}

/// Overlap of the unit sphere's disk and another target's disk, in the
/// unit-sphere frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LimbOverlap {
    Apart,
    Partial,
    SphereWithin,
    ImageWithin,
}

/// Compares the image's limb with the unit sphere's disk, seen from `eye` in
/// the unit-sphere frame.
fn limb_overlap(eye: &Vector3<f64>, image: &Ellipsoid) -> Result<LimbOverlap> {
    let radius = (1.0 / eye.norm()).asin();
    let limb = image.limb(eye)?;
    let profile = SeparationProfile::new(&limb, eye, &-eye)?;
    let nearest = profile.extreme(Extremum::Min).angle.abs();
    let farthest = profile.extreme(Extremum::Max).angle.abs();

    debug!(
        radius,
        nearest,
        farthest,
        penetrates = profile.penetrates(),
        "limb separation from sphere center"
    );

    Ok(LimbOverlap::from_separations(
        radius,
        nearest,
        farthest,
        profile.penetrates(),
    ))
}

impl LimbOverlap {
    /// Decides the overlap from the least and greatest angular separation of
    /// the image's limb from the sphere's center, and whether the ray to that
    /// center crosses the image disk. A limb point on the edge of the
    /// sphere's disk counts as inside it, but a limb that only reaches the
    /// edge does not overlap.
    fn from_separations(radius: f64, nearest: f64, farthest: f64, penetrates: bool) -> Self {
        // Every limb point inside the sphere's disk puts the whole image disk
        // inside it. Otherwise, with no limb point inside, the disks are
        // nested exactly when the ray to the sphere's center crosses the
        // image disk.
        if farthest <= radius {
            LimbOverlap::ImageWithin
        } else if nearest < radius {
            LimbOverlap::Partial
        } else if penetrates {
            LimbOverlap::SphereWithin
        } else {
            LimbOverlap::Apart
        }
    }
}
