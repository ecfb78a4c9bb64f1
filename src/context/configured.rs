// src/context/configured.rs
// Context manager that selects a planner configuration for each request.

use std::sync::Arc;

use super::{PlanningContext, PlanningContextManager, PlanningScene};
use crate::config::{PlannerConfigurationMap, PlannerConfigurationSettings};
use crate::model::RobotModel;
use crate::request::{ErrorCode, MotionPlanRequest};

/// Planning context carrying the configuration chosen for a request
#[derive(Debug, Clone, PartialEq)]
pub struct ConfiguredPlanningContext {
    config: PlannerConfigurationSettings,
    scene_name: String,
    request: MotionPlanRequest,
    simplify_solutions: bool,
}

impl ConfiguredPlanningContext {
    /// Selected configuration
    pub fn configuration(&self) -> &PlannerConfigurationSettings {
        &self.config
    }

    /// Planner type of the selected configuration, if set
    pub fn planner_type(&self) -> Option<&str> {
        self.config.planner_type()
    }

    /// Scene the context plans in
    pub fn scene_name(&self) -> &str {
        &self.scene_name
    }

    /// Request the context was built for
    pub fn request(&self) -> &MotionPlanRequest {
        &self.request
    }

    /// Time budget per attempt in seconds
    pub fn planning_time(&self) -> f64 {
        self.request.allowed_planning_time
    }

    /// Number of attempts, at least one
    pub fn planning_attempts(&self) -> u32 {
        self.request.num_planning_attempts.max(1)
    }
}

impl PlanningContext for ConfiguredPlanningContext {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn group_name(&self) -> &str {
        &self.config.group
    }

    fn simplify_solutions(&self) -> bool {
        self.simplify_solutions
    }

    fn set_simplify_solutions(&mut self, flag: bool) {
        self.simplify_solutions = flag;
    }
}

/// Context manager that picks a configuration by group and planner id
pub struct ConfigurationContextManager {
    robot_model: Arc<dyn RobotModel>,
    planner_configs: PlannerConfigurationMap,
}

impl ConfigurationContextManager {
    /// Manager for `robot_model` with no configurations yet
    pub fn new(robot_model: Arc<dyn RobotModel>) -> Self {
        ConfigurationContextManager {
            robot_model,
            planner_configs: PlannerConfigurationMap::new(),
        }
    }

    /// Choose the configuration for `request`.
    ///
    /// A planner id that already reads `<group>[...]` is tried verbatim, any
    /// other id is qualified with the group first. An unknown planner id falls
    /// back to the group's default configuration.
    pub fn select_configuration(
        &self,
        request: &MotionPlanRequest,
    ) -> Result<&PlannerConfigurationSettings, ErrorCode> {
        let group = request.group_name.as_str();
        let planner_id = request.planner_id.as_str();

        if !planner_id.is_empty() {
            let verbatim = planner_id
                .strip_prefix(group)
                .is_some_and(|rest| rest.starts_with('['))
                .then(|| self.planner_configs.get(planner_id))
                .flatten();
            let found = verbatim.or_else(|| {
                self.planner_configs
                    .get(&PlannerConfigurationSettings::qualified_name(group, planner_id))
            });
            match found {
                Some(config) => return Ok(config),
                None => log::error!(
                    "Cannot find planning configuration for group '{}' using planner '{}'. Will use defaults instead.",
                    group,
                    planner_id
                ),
            }
        }

        self.planner_configs.get(group).ok_or_else(|| {
            log::error!("Cannot find planning configuration for group '{}'", group);
            ErrorCode::InvalidGroupName
        })
    }
}

impl PlanningContextManager for ConfigurationContextManager {
    fn set_planner_configurations(&mut self, pconfig: PlannerConfigurationMap) {
        self.planner_configs = pconfig;
    }

    fn planner_configurations(&self) -> &PlannerConfigurationMap {
        &self.planner_configs
    }

    fn get_planning_context(
        &self,
        scene: &dyn PlanningScene,
        request: &MotionPlanRequest,
    ) -> Result<Box<dyn PlanningContext>, ErrorCode> {
        if request.group_name.is_empty() {
            log::error!("No group specified to plan for");
            return Err(ErrorCode::InvalidGroupName);
        }
        if !self.robot_model.has_joint_model_group(&request.group_name) {
            log::error!(
                "Robot '{}' has no joint group '{}'",
                self.robot_model.name(),
                request.group_name
            );
            return Err(ErrorCode::InvalidGroupName);
        }
        if !request.workspace_parameters.is_valid() {
            log::error!(
                "Invalid workspace bounds {:?} .. {:?}",
                request.workspace_parameters.min_corner,
                request.workspace_parameters.max_corner
            );
            return Err(ErrorCode::InvalidMotionPlan);
        }

        let config = self.select_configuration(request)?;
        log::debug!(
            "Planning for group '{}' with configuration '{}' in scene '{}'",
            request.group_name,
            config.name,
            scene.name()
        );

        Ok(Box::new(ConfiguredPlanningContext {
            config: config.clone(),
            scene_name: scene.name().to_string(),
            request: request.clone(),
            simplify_solutions: true,
        }))
    }
}
