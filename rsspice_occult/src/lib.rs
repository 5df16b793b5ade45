//! Occultation geometry for ellipsoidal bodies.
//!
//! The central operation is [`classify`] (or [`occultation`] for prebuilt
//! [`Ellipsoid`]s), which reports how the apparent disks of two ellipsoids
//! relate as seen from a viewing point:
//!
//! ```
//! use nalgebra::{Matrix3, Vector3};
//! use rsspice_occult::{Occultation, classify};
//!
//! # fn main() -> rsspice_occult::Result<()> {
//! let viewpoint = Vector3::new(10.0, 0.0, 0.0);
//! let small = Matrix3::identity();
//! let large = Matrix3::identity() * 3.0;
//!
//! // A unit sphere behind a sphere of radius 3.
//! let front = Vector3::new(5.0, 0.0, 0.0);
//! let state = classify(&viewpoint, &Vector3::zeros(), &small, &front, &large)?;
//! assert_eq!(state, Occultation::TotalOfFirst);
//! assert_eq!(state.code(), -3);
//! # Ok(())
//! # }
//! ```
//!
//! Ellipsoids are given by a center and a matrix whose columns are the
//! semi-axis vectors. The columns must have positive length and must form a
//! right-handed orthogonal frame.
//!
//! The supporting geometry is exposed too: limbs ([`Ellipsoid::limb`]),
//! nearest points ([`Ellipsoid::nearest_point`]), ray intercepts
//! ([`Ellipsoid::surface_intercept`]), and the angular separation between a
//! ray and an ellipse ([`ray_ellipse_separation`]). [`search`] finds the
//! occultation windows of targets in linear motion.
//!
//! Vectors and matrices are [`nalgebra`] types. Errors are reported through
//! [`Error`], whose variants are named after the SPICE short error messages.

mod ellipse;
mod ellipsoid;
mod errors;
mod occult;
mod separation;
mod sweep;
mod vector;

pub use ellipse::Ellipse;
pub use ellipsoid::{Ellipsoid, NearPoint};
pub use errors::{Error, Result};
pub use occult::{Occultation, classify, occultation};
pub use separation::{Extremum, LimbSeparation, ray_ellipse_separation};
pub use sweep::{MovingEllipsoid, OccultationWindow, search};
pub use vector::{angular_separation, is_rotation};
