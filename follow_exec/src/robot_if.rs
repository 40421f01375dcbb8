//! # Robot interface
//!
//! The interfaces through which trajectory control talks to the robot. The pose source and the
//! velocity command receiver are usually the same object (the [`crate::robot_client::RobotClient`]
//! or the [`crate::sim::SimRobot`]), but the follow loop only depends on these traits.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::DiffDriveDems;

use crate::loc::Pose;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of robot poses.
pub trait PoseProvider {
    /// Sample the current pose of the robot.
    ///
    /// Fails with [`RobotIfError::Connectivity`] if the pose source cannot be reached.
    fn get_pose(&mut self) -> Result<Pose, RobotIfError>;
}

/// A receiver of differential drive rate commands.
pub trait CommandSink {
    /// Command the robot to turn at `angular_rads` and drive forward at `linear_ms`.
    ///
    /// Fails with [`RobotIfError::RejectedCommand`] if the receiver acknowledges the command with
    /// anything other than success, or [`RobotIfError::Connectivity`] if it cannot be reached.
    fn set_velocity(&mut self, angular_rads: f64, linear_ms: f64) -> Result<(), RobotIfError>;

    /// Command the robot to stop.
    fn stop(&mut self) -> Result<(), RobotIfError> {
        let dems = DiffDriveDems::stop();
        self.set_velocity(dems.target_angular_speed, dems.target_linear_speed)
    }
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised by the robot interface.
///
/// Both kinds are transient from the point of view of the follow loop: the tick is abandoned and
/// the loop carries on.
#[derive(Debug, thiserror::Error)]
pub enum RobotIfError {
    #[error("Could not reach the robot: {0}")]
    Connectivity(String),

    #[error("The robot rejected the command: {0}")]
    RejectedCommand(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T: PoseProvider + ?Sized> PoseProvider for &mut T {
    fn get_pose(&mut self) -> Result<Pose, RobotIfError> {
        (**self).get_pose()
    }
}

impl<T: CommandSink + ?Sized> CommandSink for &mut T {
    fn set_velocity(&mut self, angular_rads: f64, linear_ms: f64) -> Result<(), RobotIfError> {
        (**self).set_velocity(angular_rads, linear_ms)
    }
}
