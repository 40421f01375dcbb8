//! # Velocity controller
//!
//! Converts the bearing to the carrot into differential drive rate demands. The turn rate follows
//! a smooth saturating law in the bearing, the forward speed is held constant.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use crate::loc::Pose;
use comms_if::eqpt::DiffDriveDems;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the bearing to `target_m`: the angle from the robot's heading to the direction of the
/// target, positive to the left, in the range (-pi, pi].
pub fn bearing(pose: &Pose, target_m: &Vector2<f64>) -> f64 {
    let angle_rad = (target_m[1] - pose.y()).atan2(target_m[0] - pose.x());

    wrap_pi(angle_rad - pose.heading_rad)
}

/// Turn rate scaling for the given bearing.
///
/// Zero when the target is dead ahead and tends to one as the bearing approaches pi.
pub fn coefficient(bearing_rad: f64) -> f64 {
    1.0 - (-2.0 * bearing_rad.powi(2)).exp()
}

/// Compute the rate demands which steer the robot from `pose` towards `carrot_m`.
pub fn compute_command(
    pose: &Pose,
    carrot_m: &Vector2<f64>,
    max_ang_speed_rads: f64,
    max_lin_speed_ms: f64
) -> DiffDriveDems {
    demands_for_bearing(bearing(pose, carrot_m), max_ang_speed_rads, max_lin_speed_ms)
}

/// Rate demands for a given bearing.
pub fn demands_for_bearing(
    bearing_rad: f64,
    max_ang_speed_rads: f64,
    max_lin_speed_ms: f64
) -> DiffDriveDems {
    DiffDriveDems {
        target_angular_speed: bearing_rad.signum() * coefficient(bearing_rad) * max_ang_speed_rads,
        target_linear_speed: max_lin_speed_ms
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn test_bearing_in_range() {
        let targets = [
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(-1.0, 0.0),
            Vector2::new(-1.0, -1e-9),
            Vector2::new(0.3, -2.0)
        ];

        let mut heading = 0.01;
        while heading <= TAU {
            let pose = Pose::new(0.0, 0.0, heading);
            for t in targets.iter() {
                let b = bearing(&pose, t);
                assert!(b > -PI && b <= PI, "bearing {} out of range", b);
            }
            heading += 0.01;
        }

        // Exactly behind is reported as +pi
        let b = bearing(&Pose::new(0.0, 0.0, TAU), &Vector2::new(-1.0, 0.0));
        assert_eq!(b, PI);
    }

    #[test]
    fn test_bearing_sign() {
        let pose = Pose::new(0.0, 0.0, TAU);

        // Target to the left is positive
        assert!((bearing(&pose, &Vector2::new(0.0, 1.0)) - FRAC_PI_2).abs() < 1e-12);
        assert!((bearing(&pose, &Vector2::new(0.0, -1.0)) + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_coefficient() {
        assert_eq!(coefficient(0.0), 0.0);
        assert!((coefficient(PI) - 1.0).abs() < 1e-8);
        assert_eq!(coefficient(0.4), coefficient(-0.4));

        // Monotonic in the bearing magnitude
        let mut prev = 0.0;
        let mut b = 0.05;
        while b <= PI {
            let c = coefficient(b);
            assert!(c > prev);
            prev = c;
            b += 0.05;
        }
    }

    #[test]
    fn test_straight_ahead() {
        let pose = Pose::new(0.0, 0.0, TAU);
        let dems = compute_command(&pose, &Vector2::new(1.0, 0.0), 3.0, 1.0);

        assert!(dems.target_angular_speed.abs() < 1e-12);
        assert_eq!(dems.target_linear_speed, 1.0);
    }

    #[test]
    fn test_target_behind() {
        let pose = Pose::new(0.0, 0.0, TAU);
        let dems = compute_command(&pose, &Vector2::new(-1.0, 0.0), 3.0, 1.0);

        assert!((dems.target_angular_speed.abs() - 3.0).abs() < 1e-6);
        assert_eq!(dems.target_linear_speed, 1.0);

        let dems = demands_for_bearing(-3.0, 3.0, 0.5);
        assert!(dems.target_angular_speed < -2.9);
        assert_eq!(dems.target_linear_speed, 0.5);
    }
}
