//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory control.
///
/// Any parameter missing from the file takes its default value.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Params {

    /// Distance ahead of the robot at which the look-ahead point is projected.
    pub look_ahead_distance_m: f64,

    /// Maximum number of path points ahead of the search cursor that are scanned for the carrot
    /// on each cycle.
    pub search_window: usize,

    /// Distance to the final path point under which the goal is considered reached.
    pub goal_threshold_m: f64,

    /// Maximum turn rate demand. The demand approaches this as the bearing to the carrot
    /// approaches pi.
    pub max_ang_speed_rads: f64,

    /// Forward speed demand, constant while following.
    pub max_lin_speed_ms: f64,

    /// Sleep between the end of one cycle and the start of the next.
    pub tick_period_s: f64,

    /// Number of consecutive failed pose samples after which the robot is commanded to stop.
    pub pose_loss_stop_ticks: u32,

    /// If set the path is thinned so that consecutive points are at least this far apart before
    /// following begins.
    pub carrot_spacing_m: Option<f64>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamsError {
    #[error("Parameter {0} must be finite and greater than zero, found {1}")]
    NotPositive(&'static str, f64),

    #[error("The search window must contain at least one point")]
    EmptySearchWindow,

    #[error("At least one failed pose sample must be allowed before stopping")]
    ZeroPoseLossStopTicks
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the parameters can be used to follow a path.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let positive = [
            ("look_ahead_distance_m", self.look_ahead_distance_m),
            ("goal_threshold_m", self.goal_threshold_m),
            ("max_ang_speed_rads", self.max_ang_speed_rads),
            ("max_lin_speed_ms", self.max_lin_speed_ms),
            ("tick_period_s", self.tick_period_s)
        ];

        for (name, value) in positive.iter() {
            check_positive(name, *value)?;
        }

        if let Some(s) = self.carrot_spacing_m {
            check_positive("carrot_spacing_m", s)?;
        }

        if self.search_window == 0 {
            return Err(ParamsError::EmptySearchWindow)
        }

        if self.pose_loss_stop_ticks == 0 {
            return Err(ParamsError::ZeroPoseLossStopTicks)
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            look_ahead_distance_m: 0.7,
            search_window: 400,
            goal_threshold_m: 0.5,
            max_ang_speed_rads: 3.0,
            max_lin_speed_ms: 1.0,
            tick_period_s: 0.01,
            pose_loss_stop_ticks: 10,
            carrot_spacing_m: None
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_positive(name: &'static str, value: f64) -> Result<(), ParamsError> {
    // NaN fails the comparison
    if value.is_finite() && value > 0.0 {
        Ok(())
    }
    else {
        Err(ParamsError::NotPositive(name, value))
    }
}
