//! # Differential drive demands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Rate demands for the differential drive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct DiffDriveDems {
    /// The demanded turn rate in radians/second.
    ///
    /// Follows the right hand rule about the robot's Z+ (upwards) axis, so that a positive rate
    /// turns the robot to the left.
    pub target_angular_speed: f64,

    /// The demanded forward speed in meters/second.
    pub target_linear_speed: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DiffDriveDems {
    /// Demands which bring the robot to rest.
    pub fn stop() -> Self {
        Self::default()
    }

    /// Returns `true` if these demands bring the robot to rest.
    pub fn is_stop(&self) -> bool {
        self.target_angular_speed == 0.0 && self.target_linear_speed == 0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wire_names() {
        let dems = DiffDriveDems {
            target_angular_speed: 0.5,
            target_linear_speed: 1.0,
        };

        assert_eq!(
            serde_json::to_string(&dems).unwrap(),
            r#"{"TargetAngularSpeed":0.5,"TargetLinearSpeed":1.0}"#
        );
        assert!(!dems.is_stop());
        assert!(DiffDriveDems::stop().is_stop());
    }
}
