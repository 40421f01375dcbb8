//! # Robot request/response protocol
//!
//! The robot client sends a [`RobotRequest`] over a REQ socket and the server answers every
//! request with exactly one [`RobotResponse`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{DiffDriveDems, LocData};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Requests sent from the robot client to the server.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum RobotRequest {
    /// Request the latest localisation record.
    GetLocalisation,

    /// Set new differential drive demands.
    SetDifferentialDrive(DiffDriveDems),
}

/// Responses sent from the server to the robot client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum RobotResponse {
    /// The latest localisation record, sent in response to `GetLocalisation`.
    Localisation(LocData),

    /// The demands were accepted and will be executed.
    DemsOk,

    /// The demands were rejected, with the reason given by the server.
    DemsRejected(String),

    /// The request could not be understood by the server.
    InvalidRequest,
}
