//! # Localisation data
//!
//! One localisation record, as returned by the robot's localisation resource and as stored (as an
//! array) in recorded path files:
//!
//! ```json
//! {
//!     "Pose": {
//!         "Orientation": {"W": 1.0, "X": 0.0, "Y": 0.0, "Z": 0.0},
//!         "Position": {"X": 0.0, "Y": 0.0, "Z": 0.0}
//!     },
//!     "Status": 4,
//!     "Timestamp": 1234
//! }
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single localisation record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LocData {
    /// The pose of the robot in the world frame
    pub pose: PoseData,

    /// Localisation status flags, not interpreted by the follower
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,

    /// Timestamp of the record in the robot's own clock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Position and orientation of the robot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PoseData {
    pub orientation: OrientationData,
    pub position: PositionData,
}

/// Orientation as a unit quaternion.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct OrientationData {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Position in metres in the world frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PositionData {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LocData {
    /// Build a record for a robot at `(x, y)` rotated by `yaw_rad` about the world Z axis.
    pub fn from_planar(x: f64, y: f64, yaw_rad: f64) -> Self {
        let half = 0.5 * yaw_rad;

        Self {
            pose: PoseData {
                orientation: OrientationData {
                    w: half.cos(),
                    x: 0.0,
                    y: 0.0,
                    z: half.sin(),
                },
                position: PositionData { x, y, z: 0.0 },
            },
            status: None,
            timestamp: None,
        }
    }
}
