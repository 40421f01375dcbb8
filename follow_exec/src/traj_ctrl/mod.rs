//! # Trajectory control module
//!
//! Trajectory control is responsible for keeping the robot on the recorded path. It does this with
//! the carrot-point pursuit algorithm:
//!
//! 1. A look-ahead point is projected a fixed distance in front of the robot along its heading.
//! 2. The path point closest to the look-ahead point is found, searching only a bounded window of
//!    points ahead of the search cursor. This point is the carrot, and its index becomes the new
//!    cursor, so the robot can never be sent back along the path.
//! 3. A turn rate demand is calculated from the bearing to the carrot, saturating smoothly at the
//!    maximum rate as the bearing approaches pi. The forward speed is constant.
//!
//! Once the search window reaches the end of the path and the robot is within the goal threshold
//! of the final point a single stop command is issued and the module stops demanding motion.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod carrot;
pub mod controllers;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use carrot::*;
pub use controllers::*;
pub use params::{Params, ParamsError};
pub use state::*;
