//! # Carrot selection
//!
//! Each cycle a look-ahead point is projected in front of the robot, and the path point closest to
//! it (within a bounded window ahead of the search cursor) becomes the carrot the robot steers
//! towards.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use std::f64::consts::FRAC_PI_2;

use crate::{geom::distance, loc::Pose, path::Path};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The result of one carrot selection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CarrotSelection {
    /// The look-ahead point the search was made against
    pub look_ahead_m: Vector2<f64>,

    /// The selected carrot point
    pub carrot_m: Vector2<f64>,

    /// Index of the carrot in the path, which is also the new search cursor
    pub carrot_index: usize,

    /// Distance from the robot to the final point of the path
    pub goal_distance_m: f64,

    /// True if the goal has been reached and no further motion should be commanded
    pub at_goal: bool
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Project the look-ahead point `distance_m` in front of the robot.
///
/// The heading is taken relative to the world +Y axis (hence the quarter turn), giving a point
/// along the robot's forward axis.
pub fn look_ahead_point(pose: &Pose, distance_m: f64) -> Vector2<f64> {
    let angle_rad = pose.heading_rad - FRAC_PI_2;

    Vector2::new(
        pose.x() - distance_m * angle_rad.sin(),
        pose.y() + distance_m * angle_rad.cos()
    )
}

/// Select the carrot point for the current cycle.
///
/// Points with indices in `[cursor, min(cursor + search_window, N - 1)]` are scanned for the one
/// closest to the look-ahead point. The scan starts from the point at the cursor and only
/// replaces it with a strictly closer point, so ties resolve to the lowest index and the
/// returned index is never less than `cursor`.
///
/// The goal is reached once the window covers the end of the path and the robot (not the
/// look-ahead point) is within `goal_threshold_m` of the final point. A carrot is still selected
/// in that case.
pub fn select_carrot(
    pose: &Pose,
    path: &Path,
    cursor: usize,
    look_ahead_distance_m: f64,
    search_window: usize,
    goal_threshold_m: f64
) -> CarrotSelection {
    let points = path.points();
    let final_index = path.last_index();

    // A cursor past the end can only come from a different path, keep it inside this one
    let cursor = cursor.min(final_index);
    let window_end = cursor.saturating_add(search_window);
    let last_index = window_end.min(final_index);

    let look_ahead_m = look_ahead_point(pose, look_ahead_distance_m);

    let goal_distance_m = distance(&pose.position_m, path.last());
    let at_goal = window_end >= final_index && goal_distance_m < goal_threshold_m;

    let mut carrot_index = cursor;
    let mut min_dist_m = distance(&points[cursor], &look_ahead_m);

    for (offset, point) in points[cursor..=last_index].iter().enumerate() {
        let dist_m = distance(point, &look_ahead_m);

        if dist_m < min_dist_m {
            carrot_index = cursor + offset;
            min_dist_m = dist_m;
        }
    }

    CarrotSelection {
        look_ahead_m,
        carrot_m: points[carrot_index],
        carrot_index,
        goal_distance_m,
        at_goal
    }
}
