use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::Vector3;
use rsspice_occult::{Ellipse, Ellipsoid, Extremum, ray_ellipse_separation};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_6};

fn limb(a: f64, b: f64, c: f64, vertex: &Vector3<f64>) -> Ellipse {
    Ellipsoid::from_radii(Vector3::zeros(), a, b, c)
        .unwrap()
        .limb(vertex)
        .unwrap()
}

#[test]
fn sphere_ray_misses_limb() {
    let vertex = Vector3::new(2.0, 0.0, 0.0);
    let limb = limb(1.0, 1.0, 1.0, &vertex);
    let dir = Vector3::new(-1.0, 0.0, 3.0_f64.sqrt());

    let min = ray_ellipse_separation(&limb, &vertex, &dir, Extremum::Min).unwrap();
    assert_abs_diff_eq!(min.angle, FRAC_PI_6, epsilon = 1e-14);
    assert_abs_diff_eq!(min.point, Vector3::new(0.5, 0.0, 3.0_f64.sqrt() / 2.0), epsilon = 1e-7);

    let max = ray_ellipse_separation(&limb, &vertex, &dir, Extremum::Max).unwrap();
    assert_abs_diff_eq!(max.angle, FRAC_PI_2, epsilon = 1e-14);
    assert_abs_diff_eq!(max.point, Vector3::new(0.5, 0.0, -3.0_f64.sqrt() / 2.0), epsilon = 1e-7);
}

#[test]
fn sphere_ray_through_center() {
    let vertex = Vector3::new(2.0, 0.0, 0.0);
    let limb = limb(1.0, 1.0, 1.0, &vertex);
    let dir = Vector3::new(-1.0, 0.0, 0.0);

    for extremum in [Extremum::Min, Extremum::Max] {
        let sep = ray_ellipse_separation(&limb, &vertex, &dir, extremum).unwrap();
        assert_abs_diff_eq!(sep.angle, -FRAC_PI_6, epsilon = 1e-14);
        assert_abs_diff_eq!(sep.point.x, 0.5, epsilon = 1e-14);
        assert_abs_diff_eq!(
            (sep.point.y.powi(2) + sep.point.z.powi(2)).sqrt(),
            3.0_f64.sqrt() / 2.0,
            epsilon = 1e-14
        );
    }
}

#[test]
fn sphere_ray_slightly_tilted() {
    let vertex = Vector3::new(2.0, 0.0, 0.0);
    let limb = limb(1.0, 1.0, 1.0, &vertex);
    let dir = Vector3::new(-1.0, 0.0, 1e-6);

    let min = ray_ellipse_separation(&limb, &vertex, &dir, Extremum::Min).unwrap();
    assert_abs_diff_eq!(min.angle, -(FRAC_PI_6 - 1e-6_f64.atan()), epsilon = 1e-14);
    assert_abs_diff_eq!(min.point, Vector3::new(0.5, 0.0, 3.0_f64.sqrt() / 2.0), epsilon = 1e-4);

    let max = ray_ellipse_separation(&limb, &vertex, &dir, Extremum::Max).unwrap();
    assert_abs_diff_eq!(max.angle, -(FRAC_PI_6 + 1e-6_f64.atan()), epsilon = 1e-14);
    assert_abs_diff_eq!(max.point, Vector3::new(0.5, 0.0, -3.0_f64.sqrt() / 2.0), epsilon = 1e-4);
}

#[test]
fn wide_ellipsoid() {
    let vertex = Vector3::new(2.0, 0.0, 0.0);
    let limb = limb(1.0, 1e3, 1.0, &vertex);
    let wide = (1e3 * 3.0_f64.sqrt() / 2.0 / 1.5).atan();

    let dir = Vector3::new(-1.0, 0.0, 3.0_f64.sqrt());
    let min = ray_ellipse_separation(&limb, &vertex, &dir, Extremum::Min).unwrap();
    assert_abs_diff_eq!(min.angle, FRAC_PI_6, epsilon = 1e-10);

    let dir = Vector3::new(-1.0, 0.0, 0.0);
    let min = ray_ellipse_separation(&limb, &vertex, &dir, Extremum::Min).unwrap();
    assert_abs_diff_eq!(min.angle, -FRAC_PI_6, epsilon = 1e-10);

    let max = ray_ellipse_separation(&limb, &vertex, &dir, Extremum::Max).unwrap();
    assert_abs_diff_eq!(max.angle, -wide, epsilon = 1e-10);
}

#[test]
fn flat_ellipsoid() {
    let vertex = Vector3::new(2.0, 0.0, 0.0);
    let limb = limb(1.0, 1e3, 1e-5, &vertex);
    let dir = Vector3::new(-1.0, 0.0, 1e-4);

    let max = ray_ellipse_separation(&limb, &vertex, &dir, Extremum::Max).unwrap();
    let expected = (1e3 * 3.0_f64.sqrt() / 2.0 / 1.5).atan();
    assert_abs_diff_eq!(max.angle, expected, epsilon = 1e-10);
    assert_relative_eq!(max.point.x, 0.5, max_relative = 1e-4);
    assert_relative_eq!(max.point.y.abs(), 1e3 * 3.0_f64.sqrt() / 2.0, max_relative = 1e-4);
    assert_abs_diff_eq!(max.point.z, 0.0, epsilon = 1e-4);
}

#[test]
fn errors() {
    let vertex = Vector3::new(2.0, 0.0, 0.0);
    let sphere_limb = limb(1.0, 1.0, 1.0, &vertex);

    let err = ray_ellipse_separation(&sphere_limb, &vertex, &Vector3::zeros(), Extremum::Min)
        .unwrap_err();
    assert_eq!(err.short(), "SPICE(ZEROVECTOR)");

    let dir = Vector3::new(-1.0, 0.0, 0.0);
    let segment = Ellipse::from_generating_vectors(
        Vector3::new(0.5, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::zeros(),
    );
    let err = ray_ellipse_separation(&segment, &vertex, &dir, Extremum::Min).unwrap_err();
    assert_eq!(err.short(), "SPICE(INVALIDAXISLENGTH)");

    let edge_on = Ellipse::from_generating_vectors(
        Vector3::new(0.5, 0.0, 0.0),
        Vector3::new(0.0, 2.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
    );
    let err = ray_ellipse_separation(&edge_on, &vertex, &dir, Extremum::Max).unwrap_err();
    assert_eq!(err.short(), "SPICE(DEGENERATECASE)");

    let err = "MX".parse::<Extremum>().unwrap_err();
    assert_eq!(err.short(), "SPICE(NOTSUPPORTED)");
}
