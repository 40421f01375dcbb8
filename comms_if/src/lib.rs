//! # Communications interface crate.
//!
//! Provides the messages exchanged with the robot (or its simulator) and the network abstraction
//! they are carried over.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions for robot equipment (localisation and differential drive)
pub mod eqpt;

/// Network module
pub mod net;
