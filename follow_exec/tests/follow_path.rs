//! Follows complete paths with the in-process simulated robot.

use nalgebra::Vector2;
use std::f64::consts::FRAC_PI_2;

use follow_lib::{
    follower::{Follower, RunSummary, TickOutcome},
    geom::distance,
    loc::Pose,
    path::Path,
    robot_if::{CommandSink, PoseProvider, RobotIfError},
    sim::{SimClock, SimRobot},
    traj_ctrl::Params
};

/// Simulation step, equal to the default tick period.
const STEP_S: f64 = 0.01;

/// Upper bound on ticks for any of these runs, well above what they need.
const MAX_TICKS: usize = 20_000;

// ------------------------------------------------------------------------------------------------
// HELPERS
// ------------------------------------------------------------------------------------------------

fn straight_path() -> Path {
    Path::from_points((0..=100).map(|i| Vector2::new(0.1 * i as f64, 0.0)).collect()).unwrap()
}

/// A quarter circle of radius 3 turning left, followed by a straight 3 m leg.
fn turning_path() -> Path {
    let mut points: Vec<Vector2<f64>> = (0..=94)
        .map(|i| {
            let a = FRAC_PI_2 * i as f64 / 94.0;
            Vector2::new(3.0 * a.sin(), 3.0 - 3.0 * a.cos())
        })
        .collect();
    points.extend((1..=30).map(|i| Vector2::new(3.0, 3.0 + 0.1 * i as f64)));

    Path::from_points(points).unwrap()
}

fn sim_at_origin() -> SimRobot {
    SimRobot::new(0.0, 0.0, 0.0, SimClock::Fixed { step_s: STEP_S })
}

/// Step the follower until the goal is reached, checking the robot never strays far from the path.
fn run_to_goal<R>(follower: &mut Follower<R>, max_deviation_m: f64) -> RunSummary
where
    R: PoseProvider + CommandSink + HasPosition
{
    let points = follower.traj_ctrl().path().points().to_vec();

    for _ in 0..MAX_TICKS {
        let outcome = follower.step();

        let p = follower.robot().position();
        let deviation_m = points
            .iter()
            .map(|q| distance(q, &p))
            .fold(f64::INFINITY, f64::min);
        assert!(
            deviation_m < max_deviation_m,
            "Robot at {:?} is {} m from the path", p, deviation_m
        );

        if outcome == TickOutcome::GoalReached {
            return follower.summary()
        }
    }

    panic!("Goal not reached within {} ticks", MAX_TICKS)
}

trait HasPosition {
    fn position(&self) -> Vector2<f64>;
}

impl HasPosition for SimRobot {
    fn position(&self) -> Vector2<f64> {
        let (x, y) = self.position_m();
        Vector2::new(x, y)
    }
}

/// Wraps a simulated robot, refusing every third set of demands without passing them on.
struct Refusing {
    sim: SimRobot,
    count: u64
}

impl PoseProvider for Refusing {
    fn get_pose(&mut self) -> Result<Pose, RobotIfError> {
        self.sim.get_pose()
    }
}

impl CommandSink for Refusing {
    fn set_velocity(&mut self, angular_rads: f64, linear_ms: f64) -> Result<(), RobotIfError> {
        self.count += 1;

        match self.count % 3 {
            0 => Err(RobotIfError::RejectedCommand("busy".into())),
            _ => self.sim.set_velocity(angular_rads, linear_ms)
        }
    }
}

impl HasPosition for Refusing {
    fn position(&self) -> Vector2<f64> {
        self.sim.position()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[test]
fn test_straight_path() {
    let mut follower = Follower::new(Params::default(), straight_path(), sim_at_origin(), None)
        .unwrap()
        .without_sleep();

    let summary = run_to_goal(&mut follower, 0.1);

    assert!(summary.goal_reached);
    assert_eq!(summary.num_skipped_ticks, 0);
    assert_eq!(summary.final_cursor, 100);

    // Stopped within the goal threshold of the end
    let sim = follower.robot();
    assert!(sim.dems().is_stop());
    assert!(distance(&sim.position(), &Vector2::new(10.0, 0.0)) < 0.5);

    // About 9.5 m at 1 m/s
    assert!(summary.num_ticks > 900 && summary.num_ticks < 1000);
}

#[test]
fn test_turning_path() {
    let mut follower = Follower::new(Params::default(), turning_path(), sim_at_origin(), None)
        .unwrap()
        .without_sleep();

    let summary = run_to_goal(&mut follower, 0.5);

    assert!(summary.goal_reached);
    assert!(distance(&follower.robot().position(), &Vector2::new(3.0, 6.0)) < 0.5);

    // Facing roughly up the final leg
    let yaw = follower.robot().yaw_rad();
    assert!((yaw - FRAC_PI_2).abs() < 0.5, "final yaw {}", yaw);
}

#[test]
fn test_pose_dropouts() {
    let params = Params {
        pose_loss_stop_ticks: 10,
        ..Default::default()
    };
    let sim = sim_at_origin().with_pose_dropouts(200..216);

    let mut follower = Follower::new(params, straight_path(), sim, None)
        .unwrap()
        .without_sleep();

    let summary = run_to_goal(&mut follower, 0.1);

    assert!(summary.goal_reached);
    assert_eq!(summary.num_skipped_ticks, 16);
    assert_eq!(summary.num_safe_stops, 1);
}

#[test]
fn test_short_dropouts_do_not_stop() {
    let sim = sim_at_origin().with_pose_dropouts(vec![100, 101, 102, 300, 500, 501]);

    let mut follower = Follower::new(Params::default(), straight_path(), sim, None)
        .unwrap()
        .without_sleep();

    let summary = run_to_goal(&mut follower, 0.1);

    assert!(summary.goal_reached);
    assert_eq!(summary.num_skipped_ticks, 6);
    assert_eq!(summary.num_safe_stops, 0);
}

#[test]
fn test_rejected_commands() {
    let robot = Refusing {
        sim: sim_at_origin(),
        count: 0
    };

    let mut follower = Follower::new(Params::default(), turning_path(), robot, None)
        .unwrap()
        .without_sleep();

    let summary = run_to_goal(&mut follower, 0.5);

    assert!(summary.goal_reached);
    assert!(summary.num_rejected_cmds > 100);
}

#[test]
fn test_start_at_goal() {
    let sim = SimRobot::new(10.0, 0.0, 0.0, SimClock::Fixed { step_s: STEP_S });
    let mut follower = Follower::new(Params::default(), straight_path(), sim, None)
        .unwrap()
        .without_sleep();

    assert_eq!(follower.step(), TickOutcome::GoalReached);
    assert_eq!(follower.step(), TickOutcome::AtGoal);

    let summary = follower.summary();
    assert!(summary.goal_reached);
    assert_eq!(summary.num_ticks, 1);

    // The initial stop and the goal stop, nothing else
    let sim = follower.into_robot();
    assert_eq!(sim.num_dems(), 2);
    assert!(sim.dems().is_stop());
    assert_eq!(sim.position_m(), (10.0, 0.0));
}
