//! # Follower Executable Parameters
//!
//! This module provides parameters for the follower executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct FollowExecParams {

    /// Network endpoint of the robot (or simulation) server
    pub robot_endpoint: String,

    /// Directory that relative path file names are resolved against. Relative directories are
    /// themselves resolved against the software root.
    pub path_dir: String,

    /// Maximum time to wait for the first connection to the server
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: i32,

    /// Maximum time to wait for each request to be sent and its response received
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: i32
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_connect_timeout_ms() -> i32 {
    1000
}

fn default_request_timeout_ms() -> i32 {
    100
}
