//! # Simulation Server Executable
//!
//! Serves a kinematic simulation of the robot over the robot request/reply protocol, so that the
//! follower executable can be run without the robot.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{Result, eyre::WrapErr};
use log::info;

// Internal
use comms_if::net::zmq;
use follow_lib::sim::{server::{SimServer, SimServerParams}, SimRobot};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "sim_server",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Info, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Simulation Server\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: SimServerParams = util::params::load("sim_server.toml")
        .wrap_err("Could not load params")?;

    info!("Parameters loaded");

    // ---- SERVER INITIALISATION ----

    let robot = SimRobot::from_params(&params.sim);

    let ctx = zmq::Context::new();
    let mut server = SimServer::new(&ctx, &params.endpoint, robot)
        .wrap_err("Failed to initialise server")?;

    info!("Server bound to {}", params.endpoint);

    // ---- MAIN LOOP ----

    server.run().wrap_err("Simulation server failed")
}
