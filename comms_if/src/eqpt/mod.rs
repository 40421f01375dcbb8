//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged between the robot client and
//! the robot (or simulation) server.
//!
//! Field names follow the robot's own JSON resources (`Pose`, `Position`, `TargetAngularSpeed`,
//! ...) so the same structures can read recorded path files.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod drive;
pub mod loc;
pub mod robot;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use drive::DiffDriveDems;
pub use loc::{LocData, OrientationData, PoseData, PositionData};
pub use robot::{RobotRequest, RobotResponse};
