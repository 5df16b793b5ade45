use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::Vector3;
use rsspice_occult::{Ellipsoid, angular_separation};

/// Deterministic uniform numbers for the random cases.
struct Lcg(u64);

impl Lcg {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let unit = (self.0 >> 11) as f64 / (1u64 << 53) as f64;
        lo + (hi - lo) * unit
    }

    fn radii(&mut self) -> (f64, f64, f64) {
        (
            10f64.powf(self.uniform(-1.0, 1.0)),
            10f64.powf(self.uniform(-1.0, 1.0)),
            10f64.powf(self.uniform(-1.0, 1.0)),
        )
    }
}

/// Checks that `near` is on the surface and that its outward normal, signed
/// by the altitude, points at `p`.
fn check_near_point(e: &Ellipsoid, p: &Vector3<f64>) {
    let near = e.nearest_point(p).unwrap();
    assert_abs_diff_eq!(e.level(&near.point), 1.0, epsilon = 1e-10);

    let offset = p - near.point;
    assert_relative_eq!(near.altitude.abs(), offset.norm(), max_relative = 1e-12);

    if near.altitude.abs() > 1e-6 * e.max_radius() {
        let normal = e.surface_normal(&near.point).unwrap();
        let toward = offset * near.altitude.signum();
        assert!(
            angular_separation(&normal, &toward) < 1e-9,
            "normal not parallel to offset for point {p:?}"
        );
    }
}

#[test]
fn random_exterior_points() {
    let mut rng = Lcg(1);
    for _ in 0..2000 {
        let (a, b, c) = rng.radii();
        let e = Ellipsoid::from_radii(Vector3::zeros(), a, b, c).unwrap();
        let mut p = Vector3::new(
            10f64.powf(rng.uniform(-3.0, 100.0)),
            10f64.powf(rng.uniform(-3.0, 100.0)),
            10f64.powf(rng.uniform(-3.0, 100.0)),
        );
        if e.level(&p) < 1.0 {
            let surface = e.surface_intercept(&Vector3::zeros(), &p).unwrap().unwrap();
            p = surface * 1.001;
        }

        check_near_point(&e, &p);
        assert!(e.nearest_point(&p).unwrap().altitude > 0.0);
    }
}

#[test]
fn random_interior_points() {
    let mut rng = Lcg(2);
    for _ in 0..2000 {
        let (a, b, c) = rng.radii();
        let e = Ellipsoid::from_radii(Vector3::zeros(), a, b, c).unwrap();
        let mut p = Vector3::new(
            rng.uniform(-1.0, 1.0),
            rng.uniform(-1.0, 1.0),
            rng.uniform(-1.0, 1.0),
        );
        if e.level(&p) >= 1.0 {
            let surface = e.surface_intercept(&Vector3::zeros(), &p).unwrap().unwrap();
            p = surface * rng.uniform(0.0, 0.999999);
        }

        check_near_point(&e, &p);
        assert!(e.nearest_point(&p).unwrap().altitude <= 0.0);
    }
}

#[test]
fn rotated_and_translated() {
    let mut rng = Lcg(3);
    for _ in 0..200 {
        let (a, b, c) = rng.radii();
        let rotation = nalgebra::Rotation3::from_euler_angles(
            rng.uniform(-3.0, 3.0),
            rng.uniform(-1.5, 1.5),
            rng.uniform(-3.0, 3.0),
        )
        .into_inner();
        let center = Vector3::new(
            rng.uniform(-5.0, 5.0),
            rng.uniform(-5.0, 5.0),
            rng.uniform(-5.0, 5.0),
        );
        let axes = rotation * nalgebra::Matrix3::from_diagonal(&Vector3::new(a, b, c));
        let e = Ellipsoid::new(center, &axes).unwrap();
        let p = center
            + Vector3::new(
                rng.uniform(-20.0, 20.0),
                rng.uniform(-20.0, 20.0),
                rng.uniform(-20.0, 20.0),
            );
        check_near_point(&e, &p);
    }
}

#[test]
fn center_of_ellipsoid() {
    for (a, b, c) in [(1.0, 1.0, 1.0), (2.0, 2.0, 1.0), (3.0, 2.0, 1.0)] {
        let e = Ellipsoid::from_radii(Vector3::zeros(), a, b, c).unwrap();
        let near = e.nearest_point(&Vector3::zeros()).unwrap();
        assert_abs_diff_eq!(near.altitude, -1.0, epsilon = 1e-15);
    }
}

#[test]
fn bad_axis_lengths() {
    let zero = Vector3::zeros();
    for (a, b, c) in [
        (0.0, 1.0, 1.0),
        (1.0, 0.0, 1.0),
        (1.0, 1.0, 0.0),
        (-1.0, 1.0, 1.0),
        (1.0, -1.0, 1.0),
        (1.0, 1.0, -1.0),
    ] {
        let err = Ellipsoid::from_radii(zero, a, b, c).unwrap_err();
        assert_eq!(err.short(), "SPICE(BADAXISLENGTH)");
    }

    // The square of the axis ratio overflows.
    let p = Vector3::new(10.0, 10.0, 10.0);
    for (a, b, c) in [(1e-6, 1e150, 1.0), (1.0, 1e-6, 1e150), (1e150, 1.0, 1e-6)] {
        let e = Ellipsoid::from_radii(zero, a, b, c).unwrap();
        assert_eq!(e.nearest_point(&p).unwrap_err().short(), "SPICE(BADAXISLENGTH)");
    }
}

#[test]
fn inputs_too_large() {
    let zero = Vector3::zeros();
    let (a, b, c) = (1e-6, 1e75, 1.0);
    let big = b * b * b;

    let e = Ellipsoid::from_radii(zero, a, b, c).unwrap();
    let err = e.nearest_point(&Vector3::new(a, big, c)).unwrap_err();
    assert_eq!(err.short(), "SPICE(INPUTSTOOLARGE)");

    let e = Ellipsoid::from_radii(zero, c, a, b).unwrap();
    let err = e.nearest_point(&Vector3::new(c, a, big)).unwrap_err();
    assert_eq!(err.short(), "SPICE(INPUTSTOOLARGE)");

    let e = Ellipsoid::from_radii(zero, b, c, a).unwrap();
    let err = e.nearest_point(&Vector3::new(big, c, a)).unwrap_err();
    assert_eq!(err.short(), "SPICE(INPUTSTOOLARGE)");
}
