//! # Geometry and orientation
//!
//! Quaternion rotation, heading extraction and point distances.
//!
//! Quaternions follow the Hamilton convention with components `(w, x, y, z)`, stored in nalgebra's
//! `Quaternion` as `(w, i, j, k)`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Quaternion, Vector2, Vector3};

use util::maths::map_pi_to_2pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The robot's forward axis in its body frame.
const FORWARD: [f64; 3] = [1.0, 0.0, 0.0];

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// The Hamilton product `a * b`.
///
/// Written out term by term rather than using nalgebra's operator so that the summation order,
/// and therefore the rounding, is fixed.
pub fn hamilton_product(a: &Quaternion<f64>, b: &Quaternion<f64>) -> Quaternion<f64> {
    let (aw, ax, ay, az) = (a.w, a.i, a.j, a.k);
    let (bw, bx, by, bz) = (b.w, b.i, b.j, b.k);

    Quaternion::new(
        aw * bw - ax * bx - ay * by - az * bz,
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
    )
}

/// Rotate the vector `v` by the quaternion `q`.
///
/// Computes the sandwich product `q * (0, v) * conj(q)` and returns its vector part. `q` is
/// assumed to be normalised, no re-normalisation is performed.
pub fn rotate_vector_by_quaternion(q: &Quaternion<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    let pure = Quaternion::from_imag(*v);

    hamilton_product(&hamilton_product(q, &pure), &q.conjugate()).imag()
}

/// Get the heading (yaw) encoded by the orientation quaternion `q`.
///
/// The forward axis is rotated by `q` and the angle of the result in the XY plane is taken. The
/// result is in the range (0, 2pi]: a heading along +X is reported as 2pi, not 0.
pub fn heading_from_quaternion(q: &Quaternion<f64>) -> f64 {
    let v = rotate_vector_by_quaternion(q, &Vector3::from(FORWARD));

    map_pi_to_2pi(v.y.atan2(v.x))
}

/// Euclidean distance between two points in the plane.
pub fn distance(p1: &Vector2<f64>, p2: &Vector2<f64>) -> f64 {
    (p1 - p2).norm()
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::UnitQuaternion;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    fn yaw_quat(yaw: f64) -> Quaternion<f64> {
        Quaternion::new((0.5 * yaw).cos(), 0.0, 0.0, (0.5 * yaw).sin())
    }

    #[test]
    fn test_hamilton_product() {
        let a = Quaternion::new(0.3, -0.1, 0.7, 0.2);
        let b = Quaternion::new(-0.5, 0.4, 0.1, -0.9);

        // Matches nalgebra's product up to rounding
        let ours = hamilton_product(&a, &b);
        let theirs = a * b;
        assert!((ours.coords - theirs.coords).norm() < 1e-12);

        // Not commutative
        let rev = hamilton_product(&b, &a);
        assert!((ours.coords - rev.coords).norm() > 1e-3);

        // i * j = k
        let i = Quaternion::new(0.0, 1.0, 0.0, 0.0);
        let j = Quaternion::new(0.0, 0.0, 1.0, 0.0);
        assert_eq!(hamilton_product(&i, &j), Quaternion::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(hamilton_product(&j, &i), Quaternion::new(0.0, 0.0, 0.0, -1.0));
    }

    #[test]
    fn test_rotate_vector() {
        // Quarter turn about Z takes X onto Y
        let v = rotate_vector_by_quaternion(&yaw_quat(FRAC_PI_2), &Vector3::x());
        assert!((v - Vector3::y()).norm() < 1e-12);

        // Agrees with nalgebra for a general rotation
        let uq = UnitQuaternion::from_euler_angles(0.3, -0.4, 1.2);
        let p = Vector3::new(0.5, -2.0, 1.0);
        let v = rotate_vector_by_quaternion(uq.quaternion(), &p);
        assert!((v - uq.transform_vector(&p)).norm() < 1e-12);
    }

    #[test]
    fn test_heading_pure_yaw() {
        let mut yaw = -3.0;
        while yaw < 3.0 {
            let h = heading_from_quaternion(&yaw_quat(yaw));

            let expected = if yaw <= 0.0 { yaw + TAU } else { yaw };
            assert!((h - expected).abs() < 1e-9, "yaw {} gave heading {}", yaw, h);
            assert!(h > 0.0 && h <= TAU);

            yaw += 0.05;
        }
    }

    #[test]
    fn test_heading_wrap_convention() {
        // Identity faces along +X, reported as 2pi
        assert_eq!(heading_from_quaternion(&Quaternion::identity()), TAU);

        // A half turn is reported as pi
        let h = heading_from_quaternion(&yaw_quat(PI));
        assert!((h - PI).abs() < 1e-9);
    }

    #[test]
    fn test_distance() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(4.0, -2.0);

        assert_eq!(distance(&a, &b), 5.0);
        assert_eq!(distance(&a, &b), distance(&b, &a));
        assert_eq!(distance(&a, &a), 0.0);
    }
}
