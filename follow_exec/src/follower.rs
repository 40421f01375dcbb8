//! # Path follower
//!
//! The follow loop: sample the pose, process trajectory control, send the demands to the robot and
//! sleep for the tick period, until the goal is reached.
//!
//! Failures talking to the robot never end the loop. A failed pose sample skips the tick, and
//! after `pose_loss_stop_ticks` consecutive failures the robot is commanded to stop until a pose
//! is received again. Rejected or undelivered commands are logged and not retried.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::{fmt, thread, time::Duration};

// Internal
use crate::{
    path::Path,
    robot_if::{CommandSink, PoseProvider, RobotIfError},
    traj_ctrl::{InitData, Params, TrajCtrl, TrajCtrlError}
};
use comms_if::eqpt::DiffDriveDems;
use util::{
    archive::Archived,
    module::State,
    session::Session,
    time::{duration_to_seconds, seconds_to_std}
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives a robot along a path.
pub struct Follower<R> {
    traj_ctrl: TrajCtrl,

    /// The robot, supplying poses and receiving demands
    robot: R,

    /// Sleep between ticks, or `None` to run ticks back to back
    tick_period: Option<Duration>,

    /// Time at which the first tick started
    start_time: Option<DateTime<Utc>>,

    /// Time taken to reach the goal
    elapsed_s: Option<f64>,

    num_ticks: u64,
    num_skipped_ticks: u64,
    num_rejected_cmds: u64,
    num_safe_stops: u64,

    /// Number of consecutive ticks without a usable pose
    consec_pose_failures: u32,

    /// If true a safe stop has been issued for the current pose outage
    safe_stopped: bool
}

/// Summary of a run, saved into the session once the goal is reached.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunSummary {
    pub num_ticks: u64,
    pub num_skipped_ticks: u64,
    pub num_rejected_cmds: u64,
    pub num_safe_stops: u64,

    /// Seconds from the first tick to reaching the goal, `None` if the goal wasn't reached
    pub elapsed_s: Option<f64>,

    pub final_cursor: usize,
    pub goal_reached: bool
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FollowError {
    #[error("Could not initialise trajectory control: {0}")]
    TrajCtrlInitError(TrajCtrlError)
}

/// What happened during a single tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Demands were computed and sent (successfully or not)
    Commanded,

    /// No usable pose was available, the tick was skipped
    PoseUnavailable,

    /// The goal was reached on this tick and the stop command sent
    GoalReached,

    /// The goal had already been reached, nothing was done
    AtGoal
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<R> Follower<R>
where
    R: PoseProvider + CommandSink
{
    /// Create a new follower for the given path.
    ///
    /// If a session is given trajectory control status reports are archived into it.
    pub fn new(
        params: Params,
        path: Path,
        robot: R,
        session: Option<&Session>
    ) -> Result<Self, FollowError> {
        let tick_period = Some(seconds_to_std(params.tick_period_s));

        let traj_ctrl = TrajCtrl::init(InitData { params, path }, session)
            .map_err(FollowError::TrajCtrlInitError)?;

        Ok(Self {
            traj_ctrl,
            robot,
            tick_period,
            start_time: None,
            elapsed_s: None,
            num_ticks: 0,
            num_skipped_ticks: 0,
            num_rejected_cmds: 0,
            num_safe_stops: 0,
            consec_pose_failures: 0,
            safe_stopped: false
        })
    }

    /// Run ticks back to back instead of sleeping between them.
    ///
    /// Only useful when the robot's clock is not the wall clock, such as a fixed step simulator.
    pub fn without_sleep(mut self) -> Self {
        self.tick_period = None;
        self
    }

    /// Follow the path until the goal is reached, returning the run summary.
    pub fn run(&mut self) -> RunSummary {
        info!("Starting to follow the path");

        loop {
            match self.step() {
                TickOutcome::GoalReached | TickOutcome::AtGoal => break,
                TickOutcome::Commanded | TickOutcome::PoseUnavailable => ()
            }
        }

        self.summary()
    }

    /// Execute a single tick of the follow loop.
    ///
    /// The first call commands the robot to stop before anything else so that following starts
    /// from rest.
    pub fn step(&mut self) -> TickOutcome {
        if self.traj_ctrl.is_at_goal() {
            return TickOutcome::AtGoal
        }

        if self.start_time.is_none() {
            self.start_time = Some(Utc::now());

            if let Err(e) = self.robot.stop() {
                warn!("Could not stop the robot before starting: {}", e);
            }
        }

        self.num_ticks += 1;

        let outcome = match self.robot.get_pose() {
            Ok(pose) => match self.traj_ctrl.proc(&pose) {
                Ok((dems, report)) => {
                    debug!("Tick {}: {:?}", self.num_ticks, report);

                    if let Err(e) = self.traj_ctrl.write() {
                        warn!("Could not archive the TrajCtrl status: {}", e);
                    }

                    self.pose_restored();

                    match dems {
                        Some(d) if report.stop_issued => {
                            self.send(d);
                            self.goal_reached();
                            TickOutcome::GoalReached
                        },
                        Some(d) => {
                            self.send(d);
                            TickOutcome::Commanded
                        },
                        None => TickOutcome::AtGoal
                    }
                },
                Err(e) => self.pose_failure(e)
            },
            Err(e) => self.pose_failure(e)
        };

        // No sleep once the goal is reached, there is nothing left to wait for
        if outcome != TickOutcome::GoalReached {
            if let Some(d) = self.tick_period {
                thread::sleep(d);
            }
        }

        outcome
    }

    /// Get the summary of the run so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            num_ticks: self.num_ticks,
            num_skipped_ticks: self.num_skipped_ticks,
            num_rejected_cmds: self.num_rejected_cmds,
            num_safe_stops: self.num_safe_stops,
            elapsed_s: self.elapsed_s,
            final_cursor: self.traj_ctrl.cursor(),
            goal_reached: self.traj_ctrl.is_at_goal()
        }
    }

    pub fn traj_ctrl(&self) -> &TrajCtrl {
        &self.traj_ctrl
    }

    pub fn robot(&self) -> &R {
        &self.robot
    }

    /// Consume the follower, returning the robot.
    pub fn into_robot(self) -> R {
        self.robot
    }

    /// Send demands to the robot, logging any failure.
    fn send(&mut self, dems: DiffDriveDems) {
        match self.robot.set_velocity(dems.target_angular_speed, dems.target_linear_speed) {
            Ok(()) => (),
            Err(e @ RobotIfError::RejectedCommand(_)) => {
                self.num_rejected_cmds += 1;
                warn!("Demands {:?} not accepted: {}", dems, e);
            },
            Err(e) => warn!("Demands {:?} not sent: {}", dems, e)
        }
    }

    fn pose_failure<E: fmt::Display>(&mut self, e: E) -> TickOutcome {
        self.num_skipped_ticks += 1;
        self.consec_pose_failures = self.consec_pose_failures.saturating_add(1);

        warn!(
            "No pose available ({} consecutive): {}",
            self.consec_pose_failures, e
        );

        let limit = self.traj_ctrl.params().pose_loss_stop_ticks;
        if self.consec_pose_failures >= limit && !self.safe_stopped {
            error!("Pose lost for {} ticks, stopping the robot", self.consec_pose_failures);

            if let Err(e) = self.robot.stop() {
                warn!("Could not stop the robot: {}", e);
            }

            self.safe_stopped = true;
            self.num_safe_stops += 1;
        }

        TickOutcome::PoseUnavailable
    }

    fn pose_restored(&mut self) {
        if self.safe_stopped {
            info!("Pose restored after {} ticks, resuming", self.consec_pose_failures);
        }

        self.consec_pose_failures = 0;
        self.safe_stopped = false;
    }

    fn goal_reached(&mut self) {
        self.elapsed_s = self.start_time
            .and_then(|t| duration_to_seconds(Utc::now() - t));

        match self.elapsed_s {
            Some(s) => info!("Path following complete in {:.3} s", s),
            None => info!("Path following complete")
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::loc::Pose;
    use nalgebra::Vector2;
    use std::{collections::VecDeque, f64::consts::TAU};

    /// A robot which replays a fixed sequence of poses and records the demands it is sent.
    struct ScriptedRobot {
        poses: VecDeque<Result<Pose, RobotIfError>>,
        reject_all: bool,
        sent: Vec<(f64, f64)>
    }

    impl ScriptedRobot {
        fn new(poses: Vec<Result<Pose, RobotIfError>>) -> Self {
            Self {
                poses: poses.into(),
                reject_all: false,
                sent: vec![]
            }
        }
    }

    impl PoseProvider for ScriptedRobot {
        fn get_pose(&mut self) -> Result<Pose, RobotIfError> {
            self.poses
                .pop_front()
                .unwrap_or_else(|| Err(RobotIfError::Connectivity("script ended".into())))
        }
    }

    impl CommandSink for ScriptedRobot {
        fn set_velocity(&mut self, angular_rads: f64, linear_ms: f64) -> Result<(), RobotIfError> {
            self.sent.push((angular_rads, linear_ms));

            match self.reject_all {
                true => Err(RobotIfError::RejectedCommand("test".into())),
                false => Ok(())
            }
        }
    }

    fn path() -> Path {
        Path::from_points(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(2.0, 0.0)
        ]).unwrap()
    }

    fn lost() -> Result<Pose, RobotIfError> {
        Err(RobotIfError::Connectivity("lost".into()))
    }

    fn follower(robot: ScriptedRobot, params: Params) -> Follower<ScriptedRobot> {
        Follower::new(params, path(), robot, None).unwrap().without_sleep()
    }

    #[test]
    fn test_initial_stop_and_goal() {
        let robot = ScriptedRobot::new(vec![
            Ok(Pose::new(0.0, 0.0, TAU)),
            Ok(Pose::new(1.0, 0.0, TAU)),
            Ok(Pose::new(1.9, 0.0, TAU))
        ]);
        let mut f = follower(robot, Params::default());

        let summary = f.run();

        let sent = &f.robot().sent;
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[0], (0.0, 0.0));
        assert_eq!(sent[1].1, 1.0);
        assert_eq!(sent[2].1, 1.0);
        assert_eq!(sent[3], (0.0, 0.0));

        assert!(summary.goal_reached);
        assert_eq!(summary.num_ticks, 3);
        assert_eq!(summary.num_skipped_ticks, 0);
        assert_eq!(summary.final_cursor, 2);
        assert!(summary.elapsed_s.is_some());

        // Nothing more is sent once at the goal
        assert_eq!(f.step(), TickOutcome::AtGoal);
        assert_eq!(f.robot().sent.len(), 4);
    }

    #[test]
    fn test_pose_loss_safe_stop() {
        let params = Params {
            pose_loss_stop_ticks: 2,
            ..Default::default()
        };
        let robot = ScriptedRobot::new(vec![
            Ok(Pose::new(0.0, 0.0, TAU)),
            lost(),
            lost(),
            lost(),
            lost(),
            Ok(Pose::new(0.5, 0.0, TAU)),
            lost(),
            Ok(Pose::new(2.0, 0.0, TAU))
        ]);
        let mut f = follower(robot, params);

        let outcomes: Vec<TickOutcome> = (0..8).map(|_| f.step()).collect();
        assert_eq!(outcomes[1], TickOutcome::PoseUnavailable);
        assert_eq!(outcomes[5], TickOutcome::Commanded);
        assert_eq!(outcomes[7], TickOutcome::GoalReached);

        // initial stop, demand, one safe stop, demand, goal stop
        let sent = &f.robot().sent;
        assert_eq!(sent.len(), 5);
        assert_eq!(sent[2], (0.0, 0.0));
        assert_eq!(sent[4], (0.0, 0.0));

        let summary = f.summary();
        assert_eq!(summary.num_safe_stops, 1);
        assert_eq!(summary.num_skipped_ticks, 5);
        assert!(summary.goal_reached);
    }

    #[test]
    fn test_non_finite_pose_skipped() {
        let robot = ScriptedRobot::new(vec![
            Ok(Pose::new(f64::NAN, 0.0, TAU)),
            Ok(Pose::new(0.0, 0.0, TAU))
        ]);
        let mut f = follower(robot, Params::default());

        assert_eq!(f.step(), TickOutcome::PoseUnavailable);
        assert_eq!(f.step(), TickOutcome::Commanded);
        assert_eq!(f.summary().num_skipped_ticks, 1);
    }

    #[test]
    fn test_rejected_commands_continue() {
        let mut robot = ScriptedRobot::new(vec![
            Ok(Pose::new(0.0, 0.0, TAU)),
            Ok(Pose::new(1.0, 0.0, TAU)),
            Ok(Pose::new(2.0, 0.0, TAU))
        ]);
        robot.reject_all = true;
        let mut f = follower(robot, Params::default());

        let summary = f.run();

        // The initial stop is not counted, the goal stop is
        assert_eq!(summary.num_rejected_cmds, 3);
        assert!(summary.goal_reached);
    }
}
