//! # Localisation module
//!
//! Provides the robot's planar pose as used by trajectory control.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::LocData;
use nalgebra::{Quaternion, Vector2};
use serde::Serialize;

use crate::geom::heading_from_quaternion;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose of the robot in the world frame.
///
/// The heading is extracted once, when the pose is built from a localisation sample, and is
/// always in the range (0, 2pi].
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Pose {
    /// The position in the world frame, Z is ignored
    pub position_m: Vector2<f64>,

    /// Angle of the robot's forward axis to the world +X axis
    pub heading_rad: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// Create a new pose from a position and a heading already in the (0, 2pi] convention.
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad
        }
    }

    /// Build the pose from a position and a (normalised) orientation quaternion.
    pub fn from_position_attitude(x_m: f64, y_m: f64, attitude_q: &Quaternion<f64>) -> Self {
        Self::new(x_m, y_m, heading_from_quaternion(attitude_q))
    }

    /// Return the X coordinate in meters.
    pub fn x(&self) -> f64 {
        self.position_m[0]
    }

    /// Return the Y coordinate in meters.
    pub fn y(&self) -> f64 {
        self.position_m[1]
    }
}

impl From<&LocData> for Pose {
    fn from(data: &LocData) -> Self {
        let o = &data.pose.orientation;

        Self::from_position_attitude(
            data.pose.position.x,
            data.pose.position.y,
            &Quaternion::new(o.w, o.x, o.y, o.z)
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, TAU};

    #[test]
    fn test_from_loc_data() {
        let pose = Pose::from(&LocData::from_planar(1.0, -3.0, FRAC_PI_2));

        assert_eq!(pose.x(), 1.0);
        assert_eq!(pose.y(), -3.0);
        assert!((pose.heading_rad - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_zero_yaw_is_2pi() {
        let pose = Pose::from(&LocData::from_planar(0.0, 0.0, 0.0));
        assert_eq!(pose.heading_rad, TAU);
    }
}
