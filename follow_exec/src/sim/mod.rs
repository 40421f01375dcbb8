//! # Simulation
//!
//! A kinematic differential drive robot for testing and development without the real robot:
//!
//! ```text
//! x   += v cos(yaw) dt
//! y   += v sin(yaw) dt
//! yaw += w dt
//! ```
//!
//! Time advances by a fixed step each time the pose is sampled, which makes runs deterministic,
//! or with the wall clock, which is what the [`server::SimServer`] uses. The simulated robot can
//! be told to reject demands above configured limits, in the same way the real robot refuses
//! out-of-range demands.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod server;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::Deserialize;
use std::{collections::BTreeSet, time::Instant};

use comms_if::eqpt::{DiffDriveDems, LocData};
use util::maths::wrap_pi;

use crate::{
    loc::Pose,
    robot_if::{CommandSink, PoseProvider, RobotIfError}
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated robot.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SimParams {
    /// Starting position
    pub start_x_m: f64,
    pub start_y_m: f64,

    /// Starting yaw, anticlockwise from the world +X axis
    pub start_heading_rad: f64,

    /// If set turn rate demands with a larger magnitude are rejected
    #[serde(default)]
    pub max_ang_speed_rads: Option<f64>,

    /// If set forward speed demands with a larger magnitude are rejected
    #[serde(default)]
    pub max_lin_speed_ms: Option<f64>,

    /// If set the simulation advances by this step on every pose sample rather than following the
    /// wall clock
    #[serde(default)]
    pub fixed_step_s: Option<f64>
}

/// A simulated differential drive robot.
pub struct SimRobot {
    x_m: f64,
    y_m: f64,
    yaw_rad: f64,

    /// Demands currently being executed
    dems: DiffDriveDems,

    clock: SimClock,

    /// Instant the state was last advanced to, only used with the wall clock
    last_update: Option<Instant>,

    max_ang_speed_rads: Option<f64>,
    max_lin_speed_ms: Option<f64>,

    /// Number of pose samples taken so far
    num_samples: u64,

    /// Indices of pose samples which will fail
    pose_dropouts: BTreeSet<u64>,

    /// Number of demands received, accepted or not
    num_dems: u64
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// How simulation time advances.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SimClock {
    /// Advance by a fixed step on every pose sample
    Fixed { step_s: f64 },

    /// Follow the wall clock
    RealTime
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimRobot {
    /// Create a robot at rest at the given pose.
    pub fn new(x_m: f64, y_m: f64, yaw_rad: f64, clock: SimClock) -> Self {
        Self {
            x_m,
            y_m,
            yaw_rad: wrap_pi(yaw_rad),
            dems: DiffDriveDems::stop(),
            clock,
            last_update: None,
            max_ang_speed_rads: None,
            max_lin_speed_ms: None,
            num_samples: 0,
            pose_dropouts: BTreeSet::new(),
            num_dems: 0
        }
    }

    /// Create a robot from its parameters.
    pub fn from_params(params: &SimParams) -> Self {
        let clock = match params.fixed_step_s {
            Some(step_s) => SimClock::Fixed { step_s },
            None => SimClock::RealTime
        };

        Self::new(params.start_x_m, params.start_y_m, params.start_heading_rad, clock)
            .with_limits(params.max_ang_speed_rads, params.max_lin_speed_ms)
    }

    /// Reject demands with magnitudes above these limits.
    pub fn with_limits(mut self, max_ang_speed_rads: Option<f64>, max_lin_speed_ms: Option<f64>) -> Self {
        self.max_ang_speed_rads = max_ang_speed_rads;
        self.max_lin_speed_ms = max_lin_speed_ms;
        self
    }

    /// Make the pose samples with these (zero based) indices fail.
    ///
    /// The robot keeps moving during a dropout, only the sample is lost.
    pub fn with_pose_dropouts<I: IntoIterator<Item = u64>>(mut self, samples: I) -> Self {
        self.pose_dropouts.extend(samples);
        self
    }

    /// Advance the simulation and return the resulting localisation record.
    pub fn sample(&mut self) -> LocData {
        let dt_s = match self.clock {
            SimClock::Fixed { step_s } => step_s,
            SimClock::RealTime => self.wall_clock_dt()
        };
        self.advance(dt_s);

        LocData::from_planar(self.x_m, self.y_m, self.yaw_rad)
    }

    /// Set new demands.
    ///
    /// Demands which are not finite or exceed the limits are rejected, the robot then carries on
    /// with its previous demands.
    pub fn command(&mut self, dems: DiffDriveDems) -> Result<(), String> {
        self.num_dems += 1;

        check_limit("angular", dems.target_angular_speed, self.max_ang_speed_rads)?;
        check_limit("linear", dems.target_linear_speed, self.max_lin_speed_ms)?;

        // With the wall clock the old demands apply up until now
        if self.clock == SimClock::RealTime {
            let dt_s = self.wall_clock_dt();
            self.advance(dt_s);
        }

        self.dems = dems;

        Ok(())
    }

    /// The true position of the robot.
    pub fn position_m(&self) -> (f64, f64) {
        (self.x_m, self.y_m)
    }

    /// The true yaw of the robot, in (-pi, pi].
    pub fn yaw_rad(&self) -> f64 {
        self.yaw_rad
    }

    /// The demands currently being executed.
    pub fn dems(&self) -> DiffDriveDems {
        self.dems
    }

    /// Number of demands received, including rejected ones.
    pub fn num_dems(&self) -> u64 {
        self.num_dems
    }

    fn advance(&mut self, dt_s: f64) {
        let v = self.dems.target_linear_speed;
        let w = self.dems.target_angular_speed;

        self.x_m += v * self.yaw_rad.cos() * dt_s;
        self.y_m += v * self.yaw_rad.sin() * dt_s;
        self.yaw_rad = wrap_pi(self.yaw_rad + w * dt_s);

        trace!("Sim state: ({:.3}, {:.3}, {:.3})", self.x_m, self.y_m, self.yaw_rad);
    }

    /// Seconds since the last wall clock update, zero on the first call.
    fn wall_clock_dt(&mut self) -> f64 {
        let now = Instant::now();
        let dt_s = self.last_update
            .map(|t| (now - t).as_secs_f64())
            .unwrap_or(0.0);
        self.last_update = Some(now);

        dt_s
    }
}

impl PoseProvider for SimRobot {
    fn get_pose(&mut self) -> Result<Pose, RobotIfError> {
        let index = self.num_samples;
        self.num_samples += 1;

        let data = self.sample();

        match self.pose_dropouts.contains(&index) {
            true => Err(RobotIfError::Connectivity(format!("simulated dropout of sample {}", index))),
            false => Ok(Pose::from(&data))
        }
    }
}

impl CommandSink for SimRobot {
    fn set_velocity(&mut self, angular_rads: f64, linear_ms: f64) -> Result<(), RobotIfError> {
        self.command(DiffDriveDems {
            target_angular_speed: angular_rads,
            target_linear_speed: linear_ms
        }).map_err(RobotIfError::RejectedCommand)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn check_limit(name: &str, value: f64, limit: Option<f64>) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{} speed {} is not finite", name, value))
    }

    match limit {
        Some(l) if value.abs() > l => Err(format!("{} speed {} exceeds limit {}", name, value, l)),
        _ => Ok(())
    }
}
