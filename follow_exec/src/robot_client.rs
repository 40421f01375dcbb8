//! # Robot Client
//!
//! This module provides the networking abstraction used to talk to the robot (or the simulation
//! server). Each pose sample and each set of demands is a single request/reply exchange over a
//! ZMQ REQ socket.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, MonitoredSocket, SocketOptions, MonitoredSocketError},
    eqpt::{DiffDriveDems, RobotRequest, RobotResponse}
};
use log::trace;

use crate::{
    loc::Pose,
    params::FollowExecParams,
    robot_if::{CommandSink, PoseProvider, RobotIfError}
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct RobotClient {
    socket: MonitoredSocket
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum RobotClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RobotClient {
    /// Create a new instance of the robot client.
    ///
    /// Blocks until the server is connected or the connect timeout expires.
    pub fn new(ctx: &zmq::Context, params: &FollowExecParams) -> Result<Self, RobotClientError> {
        let socket = MonitoredSocket::new(
            ctx,
            SocketOptions::client(params.connect_timeout_ms, params.request_timeout_ms),
            &params.robot_endpoint
        ).map_err(RobotClientError::SocketError)?;

        Ok(Self { socket })
    }

    /// Returns `true` if the client is connected to the server.
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Send a request to the server and wait for its response.
    fn request(&mut self, request: &RobotRequest) -> Result<RobotResponse, RobotIfError> {
        if !self.is_connected() {
            return Err(RobotIfError::Connectivity("not connected to the server".into()))
        }

        let req_str = serde_json::to_string(request)
            .map_err(|e| RobotIfError::Connectivity(format!("cannot serialize request: {}", e)))?;

        self.socket.send(&req_str, 0)
            .map_err(|e| RobotIfError::Connectivity(format!("send failed: {}", e)))?;

        let msg = self.socket.recv_msg(0)
            .map_err(|e| RobotIfError::Connectivity(format!("receive failed: {}", e)))?;

        let response = serde_json::from_str(msg.as_str().unwrap_or(""))
            .map_err(|e| RobotIfError::Connectivity(format!("invalid response: {}", e)))?;

        trace!("{:?} -> {:?}", request, response);

        Ok(response)
    }
}

impl PoseProvider for RobotClient {
    fn get_pose(&mut self) -> Result<Pose, RobotIfError> {
        match self.request(&RobotRequest::GetLocalisation)? {
            RobotResponse::Localisation(data) => Ok(Pose::from(&data)),
            r => Err(RobotIfError::Connectivity(
                format!("unexpected response to a localisation request: {:?}", r)
            ))
        }
    }
}

impl CommandSink for RobotClient {
    fn set_velocity(&mut self, angular_rads: f64, linear_ms: f64) -> Result<(), RobotIfError> {
        let dems = DiffDriveDems {
            target_angular_speed: angular_rads,
            target_linear_speed: linear_ms
        };

        match self.request(&RobotRequest::SetDifferentialDrive(dems))? {
            RobotResponse::DemsOk => Ok(()),
            RobotResponse::DemsRejected(reason) => Err(RobotIfError::RejectedCommand(reason)),
            r => Err(RobotIfError::RejectedCommand(format!("unexpected response: {:?}", r)))
        }
    }
}
