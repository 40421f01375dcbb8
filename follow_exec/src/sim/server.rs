//! # Simulation Server
//!
//! Serves a [`SimRobot`] over the robot request/reply protocol, so that the follower executable
//! can be run against the simulation exactly as it would be against the robot.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, MonitoredSocket, SocketOptions, MonitoredSocketError},
    eqpt::{RobotRequest, RobotResponse}
};
use log::{debug, info, warn};
use serde::Deserialize;

use super::{SimParams, SimRobot};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of receive failures in a row, other than timeouts, after which the socket is considered
/// broken.
const MAX_CONSEC_RECV_ERRORS: u32 = 10;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the simulation server executable.
#[derive(Deserialize, Debug, Clone)]
pub struct SimServerParams {
    /// Endpoint the server binds to
    pub endpoint: String,

    /// The simulated robot
    pub sim: SimParams
}

/// Serves a simulated robot to a single client.
pub struct SimServer {
    /// REP socket which accepts requests from the client
    socket: MonitoredSocket,

    robot: SimRobot,

    /// Receive failures since the last request was read
    consec_recv_errors: u32
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the [`SimServer`]
#[derive(thiserror::Error, Debug)]
pub enum SimServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not read requests, last error: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the response: {0}")]
    SerializationError(serde_json::Error)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimServer {

    /// Create a new instance of the simulation server.
    ///
    /// This function will not wait for a connection from the client before returning.
    pub fn new(
        ctx: &zmq::Context,
        endpoint: &str,
        robot: SimRobot
    ) -> Result<Self, SimServerError> {

        let socket = MonitoredSocket::new(
            ctx,
            SocketOptions::server(200, 10),
            endpoint
        )?;

        Ok(Self { socket, robot, consec_recv_errors: 0 })
    }

    /// Serve requests forever.
    pub fn run(&mut self) -> Result<(), SimServerError> {
        info!("Serving the simulation");

        loop {
            self.serve_one()?;
        }
    }

    /// Wait for a single request and respond to it.
    ///
    /// Returns `false` if no request was served. A reply which cannot be sent is logged and
    /// dropped, the client times out the request. Only a socket which keeps failing to receive
    /// is an error.
    pub fn serve_one(&mut self) -> Result<bool, SimServerError> {
        let msg = match self.socket.recv_msg(0) {
            Ok(m) => m,
            Err(zmq::Error::EAGAIN) => return Ok(false),
            Err(e) => {
                self.consec_recv_errors += 1;
                warn!(
                    "Could not read from the request socket ({} in a row): {}",
                    self.consec_recv_errors, e
                );

                return match self.consec_recv_errors >= MAX_CONSEC_RECV_ERRORS {
                    true => Err(SimServerError::RecvError(e)),
                    false => Ok(false)
                }
            }
        };
        self.consec_recv_errors = 0;

        let response = self.handle(msg.as_str().unwrap_or(""));

        let resp_str = serde_json::to_string(&response)
            .map_err(SimServerError::SerializationError)?;

        if let Err(e) = self.socket.send(&resp_str, 0) {
            warn!("Could not send {:?} to the client: {}", response, e);
            return Ok(false)
        }

        Ok(true)
    }

    /// Get the simulated robot.
    pub fn robot(&self) -> &SimRobot {
        &self.robot
    }

    /// Produce the response to a serialized request.
    fn handle(&mut self, req_str: &str) -> RobotResponse {
        let request: RobotRequest = match serde_json::from_str(req_str) {
            Ok(r) => r,
            Err(e) => {
                warn!("Could not deserialize request: {}", e);
                return RobotResponse::InvalidRequest
            }
        };

        match request {
            RobotRequest::GetLocalisation => RobotResponse::Localisation(self.robot.sample()),
            RobotRequest::SetDifferentialDrive(dems) => match self.robot.command(dems) {
                Ok(()) => RobotResponse::DemsOk,
                Err(reason) => {
                    debug!("Rejected {:?}: {}", dems, reason);
                    RobotResponse::DemsRejected(reason)
                }
            }
        }
    }
}

impl From<MonitoredSocketError> for SimServerError {
    fn from(e: MonitoredSocketError) -> Self {
        SimServerError::SocketError(e)
    }
}
