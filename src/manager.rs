//! OMPL planner manager
//!
//! Implements the host's planner plugin contract on top of a
//! [`PlanningContextManager`]: loads per-group planner configurations from
//! the parameter store, hands them to the context manager, and applies the
//! solution simplification policy to every context it returns.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::PlannerManagerError;
use crate::config::{self, PlannerConfigurationMap};
use crate::context::{PlanningContext, PlanningContextManager, PlanningScene};
use crate::model::RobotModel;
use crate::params::{NamespacedParams, ParameterStore};
use crate::request::{ErrorCode, MotionPlanRequest};

/// Plugin contract between a motion planning host and a planner library
pub trait PlannerManager {
    /// Prepare the planner for `robot_model`, reading parameters under
    /// `namespace` (the manager's default namespace when empty)
    fn initialize(&mut self, robot_model: Arc<dyn RobotModel>, namespace: &str) -> Result<(), PlannerManagerError>;

    /// Short name of the planner library
    fn description(&self) -> &str;

    /// Names of the configurations requests can select
    fn planning_algorithms(&self) -> Vec<String>;

    /// Whether the planner can handle `request`
    fn can_service_request(&self, request: &MotionPlanRequest) -> bool;

    /// Build a planning context for `request`
    fn get_planning_context(
        &self,
        scene: &dyn PlanningScene,
        request: &MotionPlanRequest,
    ) -> Result<Box<dyn PlanningContext>, ErrorCode>;

    /// Replace the planner configurations
    fn set_planner_configurations(&mut self, pconfig: PlannerConfigurationMap);

    /// Current planner configurations
    fn planner_configurations(&self) -> &PlannerConfigurationMap;

    /// Log a status line
    fn print_status(&self);
}

/// Policy flags of the planner manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerSettings {
    /// Shorten and smooth solutions before returning them
    pub simplify_solutions: bool,
    /// Parameter namespace used when `initialize` gets an empty one
    pub default_namespace: String,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        ManagerSettings {
            simplify_solutions: true,
            default_namespace: "~".to_string(),
        }
    }
}

/// Everything the host hands the planner manager
pub struct PlannerManagerContext {
    /// Parameter store holding the planner configurations
    pub parameters: Arc<dyn ParameterStore>,
    /// Context manager that owns the configurations and builds contexts
    pub context_manager: Box<dyn PlanningContextManager>,
    /// Policy flags
    pub settings: ManagerSettings,
}

impl PlannerManagerContext {
    /// Context with default settings
    pub fn new(parameters: Arc<dyn ParameterStore>, context_manager: Box<dyn PlanningContextManager>) -> Self {
        PlannerManagerContext {
            parameters,
            context_manager,
            settings: ManagerSettings::default(),
        }
    }

    /// Replace the settings
    pub fn with_settings(mut self, settings: ManagerSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Planner manager for the OMPL planning library
pub struct OmplPlannerManager {
    parameters: Arc<dyn ParameterStore>,
    context_manager: Box<dyn PlanningContextManager>,
    settings: ManagerSettings,
    robot_model: Option<Arc<dyn RobotModel>>,
    params: Option<NamespacedParams>,
}

impl OmplPlannerManager {
    /// Create an uninitialized manager
    pub fn new(context: PlannerManagerContext) -> Self {
        log::info!("Loading OMPL planner manager");
        OmplPlannerManager {
            parameters: context.parameters,
            context_manager: context.context_manager,
            settings: context.settings,
            robot_model: None,
            params: None,
        }
    }

    /// Whether `initialize` has run
    pub fn is_initialized(&self) -> bool {
        self.robot_model.is_some()
    }

    /// Namespace parameters are read from, once initialized
    pub fn namespace(&self) -> Option<&str> {
        self.params.as_ref().map(NamespacedParams::namespace)
    }

    /// Re-read the planner configurations from the parameter store
    pub fn load_planner_configurations(&mut self) -> Result<(), PlannerManagerError> {
        let (Some(model), Some(params)) = (self.robot_model.as_ref(), self.params.as_ref()) else {
            return Err(PlannerManagerError::NotInitialized);
        };
        let pconfig = config::load_planner_configurations(model.as_ref(), params);
        self.set_planner_configurations(pconfig);
        Ok(())
    }

    /// Whether contexts are told to simplify solutions
    pub fn simplify_solutions(&self) -> bool {
        self.settings.simplify_solutions
    }

    /// Set the simplification policy applied to contexts handed out from now on
    pub fn set_simplify_solutions(&mut self, flag: bool) {
        self.settings.simplify_solutions = flag;
    }

    fn configure_context(&self, context: &mut dyn PlanningContext) {
        context.set_simplify_solutions(self.settings.simplify_solutions);
    }
}

impl PlannerManager for OmplPlannerManager {
    fn initialize(&mut self, robot_model: Arc<dyn RobotModel>, namespace: &str) -> Result<(), PlannerManagerError> {
        log::info!("Initializing OMPL interface");

        let namespace = if namespace.is_empty() {
            self.settings.default_namespace.as_str()
        } else {
            namespace
        };
        self.params = Some(NamespacedParams::new(self.parameters.clone(), namespace));
        self.robot_model = Some(robot_model);

        self.load_planner_configurations()
    }

    fn description(&self) -> &str {
        "OMPL"
    }

    fn planning_algorithms(&self) -> Vec<String> {
        self.planner_configurations().keys().cloned().collect()
    }

    fn can_service_request(&self, request: &MotionPlanRequest) -> bool {
        request.trajectory_constraints.is_empty()
    }

    fn get_planning_context(
        &self,
        scene: &dyn PlanningScene,
        request: &MotionPlanRequest,
    ) -> Result<Box<dyn PlanningContext>, ErrorCode> {
        let mut context = self.context_manager.get_planning_context(scene, request)?;
        self.configure_context(context.as_mut());
        Ok(context)
    }

    fn set_planner_configurations(&mut self, pconfig: PlannerConfigurationMap) {
        let pconfig = match self.robot_model.as_ref() {
            Some(model) => config::with_default_group_configurations(pconfig, model.as_ref()),
            None => pconfig,
        };
        self.context_manager.set_planner_configurations(pconfig);
    }

    fn planner_configurations(&self) -> &PlannerConfigurationMap {
        self.context_manager.planner_configurations()
    }

    fn print_status(&self) {
        log::info!("OMPL ROS interface is running.");
    }
}

impl fmt::Debug for OmplPlannerManager {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OmplPlannerManager")
            .field("settings", &self.settings)
            .field("namespace", &self.namespace())
            .field("configurations", &self.planner_configurations().len())
            .finish()
    }
}
