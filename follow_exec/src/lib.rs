//! # Follower library.
//!
//! This library contains everything needed to follow a recorded path with the carrot-point
//! algorithm, and allows the executables (and other crates in the workspace) to use it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Follow loop - drives the robot along a path until the goal is reached
pub mod follower;

/// Geometry - quaternion rotation, heading extraction and distances
pub mod geom;

/// Localisation module - provides the robot's pose as used by trajectory control
pub mod loc;

/// Executable parameters
pub mod params;

/// Recorded paths and the sources they are loaded from
pub mod path;

/// Robot client - requests poses from and sends demands to the robot server
pub mod robot_client;

/// Interfaces between trajectory control and the robot
pub mod robot_if;

/// Simulated robot and its server
pub mod sim;

/// Trajectory control module - keeps the robot on the given path
pub mod traj_ctrl;
