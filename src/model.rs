//! Robot model access
//!
//! The planner manager only needs the names of a robot's joint groups. The
//! kinematic model itself belongs to the host.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::PlannerManagerError;

/// A named subset of the robot's joints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointModelGroup {
    /// Group name, e.g. `manipulator`
    pub name: String,
    /// Joints in the group
    #[serde(default)]
    pub joints: Vec<String>,
}

impl JointModelGroup {
    /// Create a group from its name and joints
    pub fn new(name: impl Into<String>, joints: &[&str]) -> Self {
        JointModelGroup {
            name: name.into(),
            joints: joints.iter().map(|j| j.to_string()).collect(),
        }
    }
}

/// Provider of the robot's joint groups
#[cfg_attr(test, mockall::automock)]
pub trait RobotModel: Send + Sync {
    /// Name of the robot
    fn name(&self) -> String;

    /// All joint groups, in model order
    fn joint_model_groups(&self) -> Vec<JointModelGroup>;

    /// Names of all joint groups, in model order
    fn joint_model_group_names(&self) -> Vec<String> {
        self.joint_model_groups().into_iter().map(|g| g.name).collect()
    }

    /// Whether the model defines a group called `name`
    fn has_joint_model_group(&self, name: &str) -> bool {
        self.joint_model_groups().iter().any(|g| g.name == name)
    }
}

/// Robot model read from a YAML description
///
/// ```yaml
/// name: ur5
/// groups:
///   - name: manipulator
///     joints: [shoulder_pan_joint, shoulder_lift_joint, elbow_joint]
///   - name: endeffector
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotDescription {
    /// Robot name
    pub name: String,
    /// Joint groups
    #[serde(default)]
    pub groups: Vec<JointModelGroup>,
}

impl RobotDescription {
    /// Create a description from group names only
    pub fn with_groups(name: impl Into<String>, groups: &[&str]) -> Self {
        RobotDescription {
            name: name.into(),
            groups: groups.iter().map(|g| JointModelGroup::new(*g, &[])).collect(),
        }
    }

    /// Parse a YAML description
    pub fn from_yaml(text: &str) -> Result<Self, PlannerManagerError> {
        let description: RobotDescription = serde_yaml::from_str(text)?;
        description.validate()?;
        Ok(description)
    }

    /// Load a YAML description from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PlannerManagerError> {
        let path = path.as_ref();
        std::fs::read_to_string(path)
            .map_err(PlannerManagerError::from)
            .and_then(|text| Self::from_yaml(&text))
            .map_err(|e| e.in_file(path))
    }

    fn validate(&self) -> Result<(), PlannerManagerError> {
        for (i, group) in self.groups.iter().enumerate() {
            if group.name.is_empty() {
                return Err(PlannerManagerError::ConfigError(format!(
                    "joint group #{} of robot '{}' has no name",
                    i, self.name
                )));
            }
            if self.groups[..i].iter().any(|g| g.name == group.name) {
                return Err(PlannerManagerError::ConfigError(format!(
                    "joint group '{}' is defined twice for robot '{}'",
                    group.name, self.name
                )));
            }
        }
        Ok(())
    }
}

impl RobotModel for RobotDescription {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn joint_model_groups(&self) -> Vec<JointModelGroup> {
        self.groups.clone()
    }
}
