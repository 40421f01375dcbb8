//! Main follower executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Load the path to follow
//!     - Connect to the robot, or create a simulated one
//!     - Main loop, until the goal is reached:
//!         - Pose acquisition
//!         - Trajectory control processing
//!         - Sending demands to the robot
//!     - Save the run summary

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::WrapErr};
use log::info;
use std::path::PathBuf;
use structopt::StructOpt;

// Internal
use comms_if::net::zmq;
use follow_lib::{
    follower::{Follower, RunSummary},
    params::FollowExecParams,
    path::{JsonFilePathSource, Path, PathSource},
    robot_client::RobotClient,
    robot_if::{CommandSink, PoseProvider},
    sim::{server::SimServerParams, SimRobot},
    traj_ctrl::Params
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the run summary file within the session directory.
const RUN_SUMMARY_FILE: &str = "run_summary.json";

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Follow a recorded path with the carrot-point algorithm.
#[derive(Debug, StructOpt)]
#[structopt(name = "follow_exec")]
struct Opts {
    /// The path file to follow, relative to the `path_dir` parameter unless absolute.
    path_file: String,

    /// Follow the path with a simulated robot instead of connecting to the robot server.
    #[structopt(long)]
    sim: bool,

    /// Log at trace level rather than info.
    #[structopt(short, long)]
    verbose: bool
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "follow_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = match opts.verbose {
        true => LevelFilter::Trace,
        false => LevelFilter::Info
    };
    logger_init(level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Carrot Path Follower\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: FollowExecParams = util::params::load("follow_exec.toml")
        .wrap_err("Could not load exec params")?;
    let traj_ctrl_params: Params = util::params::load("traj_ctrl.toml")
        .wrap_err("Could not load TrajCtrl params")?;
    traj_ctrl_params.validate()
        .wrap_err("Invalid TrajCtrl params")?;

    info!("Parameters loaded");

    // ---- LOAD PATH ----

    let mut path_dir = PathBuf::from(&exec_params.path_dir);
    if path_dir.is_relative() {
        path_dir = host::get_sw_root()
            .wrap_err("Could not resolve the path directory")?
            .join(path_dir);
    }

    let path = JsonFilePathSource::new(path_dir)
        .load_path(&opts.path_file)
        .wrap_err_with(|| format!("Could not load the path {:?}", opts.path_file))?;

    info!(
        "Loaded path {:?}: {} points, {:.2} m long\n",
        opts.path_file, path.get_num_points(), path.length()
    );

    // ---- FOLLOW ----

    let summary = match opts.sim {
        true => {
            let sim_params: SimServerParams = util::params::load("sim_server.toml")
                .wrap_err("Could not load simulation params")?;
            let fixed_step = sim_params.sim.fixed_step_s.is_some();

            info!("Following with a simulated robot");

            follow(
                traj_ctrl_params,
                path,
                SimRobot::from_params(&sim_params.sim),
                &session,
                !fixed_step
            )?
        },
        false => {
            let zmq_ctx = zmq::Context::new();
            let client = RobotClient::new(&zmq_ctx, &exec_params)
                .wrap_err("Failed to initialise the RobotClient")?;

            info!("RobotClient connected to {}", exec_params.robot_endpoint);

            follow(traj_ctrl_params, path, client, &session, true)?
        }
    };

    // ---- SHUTDOWN ----

    info!("Run summary: {:#?}", summary);
    session.save(RUN_SUMMARY_FILE, summary);

    info!("End of execution");
    session.exit();

    Ok(())
}

/// Follow the path with the given robot until the goal is reached.
fn follow<R>(
    params: Params,
    path: Path,
    robot: R,
    session: &Session,
    sleep: bool
) -> Result<RunSummary, Report>
where
    R: PoseProvider + CommandSink
{
    let mut follower = Follower::new(params, path, robot, Some(session))
        .wrap_err("Failed to initialise the follower")?;

    if !sleep {
        follower = follower.without_sleep();
    }

    Ok(follower.run())
}
