//! Motion plan requests as handed over by the planning host
//!
//! Only the fields the planner manager and context selection look at are
//! modelled; the planning library reads the rest through the host.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::Point3;

/// Result codes reported back to the planning host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Planning succeeded
    Success,
    /// Unspecified failure
    Failure,
    /// The planner could not find a solution
    PlanningFailed,
    /// The request is malformed
    InvalidMotionPlan,
    /// The request names an unknown joint group
    InvalidGroupName,
    /// Goal constraints are malformed or unsatisfiable
    InvalidGoalConstraints,
    /// The start state is invalid
    InvalidRobotState,
    /// Path constraints are malformed
    InvalidPathConstraints,
    /// Planning ran out of time
    Timeout,
}

impl ErrorCode {
    /// Numeric value used on the wire by the planning host
    pub fn value(self) -> i32 {
        match self {
            ErrorCode::Success => 1,
            ErrorCode::Failure => 99999,
            ErrorCode::PlanningFailed => -1,
            ErrorCode::InvalidMotionPlan => -2,
            ErrorCode::Timeout => -6,
            ErrorCode::InvalidGroupName => -15,
            ErrorCode::InvalidGoalConstraints => -16,
            ErrorCode::InvalidRobotState => -17,
            ErrorCode::InvalidPathConstraints => -19,
        }
    }

    /// Whether the code signals success
    pub fn is_success(self) -> bool {
        self == ErrorCode::Success
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            ErrorCode::Success => "success",
            ErrorCode::Failure => "failure",
            ErrorCode::PlanningFailed => "planning failed",
            ErrorCode::InvalidMotionPlan => "invalid motion plan",
            ErrorCode::InvalidGroupName => "invalid group name",
            ErrorCode::InvalidGoalConstraints => "invalid goal constraints",
            ErrorCode::InvalidRobotState => "invalid robot state",
            ErrorCode::InvalidPathConstraints => "invalid path constraints",
            ErrorCode::Timeout => "timed out",
        };
        write!(f, "{} ({})", text, self.value())
    }
}

impl std::error::Error for ErrorCode {}

/// Axis-aligned box the planner may sample end-effector positions in
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceParameters {
    /// Frame the corners are expressed in
    pub frame_id: String,
    /// Lower corner
    pub min_corner: Point3<f64>,
    /// Upper corner
    pub max_corner: Point3<f64>,
}

impl Default for WorkspaceParameters {
    fn default() -> Self {
        WorkspaceParameters {
            frame_id: String::new(),
            min_corner: Point3::new(-1.0, -1.0, -1.0),
            max_corner: Point3::new(1.0, 1.0, 1.0),
        }
    }
}

impl WorkspaceParameters {
    /// Box between two corners
    pub fn new(frame_id: impl Into<String>, min_corner: Point3<f64>, max_corner: Point3<f64>) -> Self {
        WorkspaceParameters {
            frame_id: frame_id.into(),
            min_corner,
            max_corner,
        }
    }

    /// Every coordinate is finite and the lower corner does not exceed the upper
    pub fn is_valid(&self) -> bool {
        self.min_corner.coords.iter().chain(self.max_corner.coords.iter()).all(|c| c.is_finite())
            && self
                .min_corner
                .coords
                .iter()
                .zip(self.max_corner.coords.iter())
                .all(|(lo, hi)| lo <= hi)
    }

    /// Whether `point` lies inside the box (boundary included)
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|i| self.min_corner[i] <= point[i] && point[i] <= self.max_corner[i])
    }

    /// Box extent along each axis
    pub fn extent(&self) -> nalgebra::Vector3<f64> {
        self.max_corner - self.min_corner
    }
}

/// Joint positions of the start state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotState {
    /// Position per joint name
    pub joint_positions: BTreeMap<String, f64>,
}

/// Bound on one joint's position
#[derive(Debug, Clone, PartialEq)]
pub struct JointConstraint {
    /// Joint name
    pub joint_name: String,
    /// Target position
    pub position: f64,
    /// Allowed deviation above the target
    pub tolerance_above: f64,
    /// Allowed deviation below the target
    pub tolerance_below: f64,
    /// Relative importance
    pub weight: f64,
}

/// Target region for a link origin
#[derive(Debug, Clone, PartialEq)]
pub struct PositionConstraint {
    /// Constrained link
    pub link_name: String,
    /// Target position
    pub target: Point3<f64>,
    /// Radius of the allowed region around the target
    pub tolerance: f64,
    /// Relative importance
    pub weight: f64,
}

/// A set of constraints that must hold together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    /// Optional label
    pub name: String,
    /// Joint constraints
    pub joint_constraints: Vec<JointConstraint>,
    /// Position constraints
    pub position_constraints: Vec<PositionConstraint>,
}

impl Constraints {
    /// True when no constraint is set
    pub fn is_empty(&self) -> bool {
        self.joint_constraints.is_empty() && self.position_constraints.is_empty()
    }
}

/// A request for a motion plan
#[derive(Debug, Clone, PartialEq)]
pub struct MotionPlanRequest {
    /// Joint group to plan for
    pub group_name: String,
    /// Planner configuration to use; empty selects the group default
    pub planner_id: String,
    /// Start state
    pub start_state: RobotState,
    /// Alternative goals; reaching any one of them solves the request
    pub goal_constraints: Vec<Constraints>,
    /// Constraints on every state along the path
    pub path_constraints: Option<Constraints>,
    /// Constraints on the order of states along the trajectory
    pub trajectory_constraints: Vec<Constraints>,
    /// Sampling bounds
    pub workspace_parameters: WorkspaceParameters,
    /// Number of planning attempts
    pub num_planning_attempts: u32,
    /// Time budget in seconds
    pub allowed_planning_time: f64,
}

impl MotionPlanRequest {
    /// Request for `group_name` with default settings
    pub fn new(group_name: impl Into<String>) -> Self {
        MotionPlanRequest {
            group_name: group_name.into(),
            planner_id: String::new(),
            start_state: RobotState::default(),
            goal_constraints: Vec::new(),
            path_constraints: None,
            trajectory_constraints: Vec::new(),
            workspace_parameters: WorkspaceParameters::default(),
            num_planning_attempts: 1,
            allowed_planning_time: 5.0,
        }
    }

    /// Select a planner configuration
    pub fn with_planner_id(mut self, planner_id: impl Into<String>) -> Self {
        self.planner_id = planner_id.into();
        self
    }
}
