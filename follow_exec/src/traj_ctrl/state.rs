//! Trajectory control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::Serialize;

// Internal
use super::*;
use crate::{loc::Pose, path::Path};
use comms_if::eqpt::DiffDriveDems;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Archive of the status reports, relative to the session's archive root.
const REPORT_ARCHIVE: &str = "traj_ctrl.csv";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory control: follows a single path with the carrot-point algorithm.
pub struct TrajCtrl {
    params: Params,

    /// The path being followed
    path: Path,

    /// Executing mode
    mode: TrajCtrlMode,

    /// Search cursor, the index of the most recent carrot
    cursor: usize,

    /// Number of processing cycles performed
    num_cycles: u64,

    report: StatusReport,
    arch_report: Archiver
}

/// Data required to initialise trajectory control.
pub struct InitData {
    pub params: Params,
    pub path: Path
}

/// The status report containing the monitoring quantities of the last cycle.
///
/// Flat so it can be archived as a CSV row.
#[derive(Default, Copy, Clone, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Cycle counter, starting at 1 for the first processed pose
    pub cycle: u64,

    pub look_ahead_x_m: f64,
    pub look_ahead_y_m: f64,

    pub carrot_x_m: f64,
    pub carrot_y_m: f64,

    /// Index of the carrot, which is also the search cursor after this cycle
    pub carrot_index: usize,

    /// Bearing from the robot's heading to the carrot
    pub bearing_rad: f64,

    /// Distance from the robot to the final path point
    pub goal_distance_m: f64,

    /// The demands issued this cycle, zero if none were issued
    pub ang_dem_rads: f64,
    pub lin_dem_ms: f64,

    /// If true the goal was reached on this cycle
    pub at_goal: bool,

    /// If true the stop command was issued on this cycle
    pub stop_issued: bool
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur in trajectory control.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("Invalid trajectory control parameters: {0}")]
    InvalidParams(ParamsError),

    #[error("Could not create the status archive: {0}")]
    ArchiveInitError(ArchiveError),

    #[error("The pose contains a non-finite value: {0:?}")]
    NonFinitePose(Pose)
}

/// The possible modes of execution of TrajCtrl.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TrajCtrlMode {
    /// Steering towards the carrot each cycle
    Running,

    /// The goal has been reached and the stop command issued. Terminal.
    AtGoal
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for TrajCtrl {
    type InitData = InitData;
    type InitError = TrajCtrlError;

    type InputData = Pose;
    type OutputData = Option<DiffDriveDems>;
    type StatusReport = StatusReport;
    type ProcError = TrajCtrlError;

    /// Initialise the TrajCtrl module.
    ///
    /// The parameters are validated and, if a carrot spacing is set, the path is thinned. Status
    /// reports are archived only if a session is given.
    fn init(init_data: Self::InitData, session: Option<&Session>) -> Result<Self, Self::InitError> {
        let InitData { params, path } = init_data;

        params.validate().map_err(TrajCtrlError::InvalidParams)?;

        let path = match params.carrot_spacing_m {
            Some(s) => path.thinned(s),
            None => path
        };

        info!(
            "Following path of {} points, {:.2} m long",
            path.get_num_points(), path.length()
        );

        let arch_report = match session {
            Some(s) => Archiver::from_path(s, REPORT_ARCHIVE)
                .map_err(TrajCtrlError::ArchiveInitError)?,
            None => Archiver::default()
        };

        Ok(Self {
            params,
            path,
            mode: TrajCtrlMode::Running,
            cursor: 0,
            num_cycles: 0,
            report: StatusReport::default(),
            arch_report
        })
    }

    /// Process trajectory control for a new pose.
    ///
    /// Processing involves:
    ///  1. Selecting the carrot (advancing the search cursor)
    ///  1. In `Running` mode, either computing the demands to steer towards the carrot or, if the
    ///     goal has been reached, issuing the stop command and moving to `AtGoal`.
    ///
    /// In `AtGoal` mode no demands are output.
    fn proc(
        &mut self,
        pose: &Self::InputData
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {

        if !(pose.x().is_finite() && pose.y().is_finite() && pose.heading_rad.is_finite()) {
            return Err(TrajCtrlError::NonFinitePose(*pose))
        }

        self.num_cycles += 1;

        let sel = select_carrot(
            pose,
            &self.path,
            self.cursor,
            self.params.look_ahead_distance_m,
            self.params.search_window,
            self.params.goal_threshold_m
        );
        self.cursor = sel.carrot_index;

        self.report = StatusReport {
            cycle: self.num_cycles,
            look_ahead_x_m: sel.look_ahead_m[0],
            look_ahead_y_m: sel.look_ahead_m[1],
            carrot_x_m: sel.carrot_m[0],
            carrot_y_m: sel.carrot_m[1],
            carrot_index: sel.carrot_index,
            bearing_rad: bearing(pose, &sel.carrot_m),
            goal_distance_m: sel.goal_distance_m,
            at_goal: sel.at_goal,
            ..Default::default()
        };

        let output = match self.mode {
            TrajCtrlMode::Running if sel.at_goal => {
                info!(
                    "Goal reached at cycle {} ({:.3} m from the final point)",
                    self.num_cycles, sel.goal_distance_m
                );
                self.mode = TrajCtrlMode::AtGoal;
                self.report.stop_issued = true;

                Some(DiffDriveDems::stop())
            },
            TrajCtrlMode::Running => Some(demands_for_bearing(
                self.report.bearing_rad,
                self.params.max_ang_speed_rads,
                self.params.max_lin_speed_ms
            )),
            TrajCtrlMode::AtGoal => None
        };

        if let Some(dems) = output {
            self.report.ang_dem_rads = dems.target_angular_speed;
            self.report.lin_dem_ms = dems.target_linear_speed;
        }

        trace!("TrajCtrl report: {:?}", self.report);

        Ok((output, self.report))
    }
}

impl Archived for TrajCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

impl TrajCtrl {
    /// Get the current execution mode.
    pub fn mode(&self) -> TrajCtrlMode {
        self.mode
    }

    /// Returns `true` once the goal has been reached.
    pub fn is_at_goal(&self) -> bool {
        self.mode == TrajCtrlMode::AtGoal
    }

    /// Get the current search cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Get the path being followed, after any thinning.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}
