//! Planning contexts and the manager that hands them out
//!
//! The planning library builds one context per query. The planner manager
//! never looks inside a context; it only passes configurations in, requests
//! through, and sets the solution simplification policy on what comes back.

mod configured;

pub use configured::{ConfigurationContextManager, ConfiguredPlanningContext};

use crate::config::PlannerConfigurationMap;
use crate::request::{ErrorCode, MotionPlanRequest};

/// Snapshot of the world a query is planned in
pub trait PlanningScene: Send + Sync {
    /// Scene name
    fn name(&self) -> &str;
}

/// A planning scene known only by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedPlanningScene {
    name: String,
}

impl NamedPlanningScene {
    /// Scene called `name`
    pub fn new(name: impl Into<String>) -> Self {
        NamedPlanningScene { name: name.into() }
    }
}

impl PlanningScene for NamedPlanningScene {
    fn name(&self) -> &str {
        &self.name
    }
}

/// State needed to run one planning query
pub trait PlanningContext: Send {
    /// Context name, normally the selected configuration name
    fn name(&self) -> &str;

    /// Joint group being planned for
    fn group_name(&self) -> &str;

    /// Whether found solutions are shortened and smoothed before returning
    fn simplify_solutions(&self) -> bool;

    /// Set the solution simplification policy
    fn set_simplify_solutions(&mut self, flag: bool);
}

/// Owner of the planner configurations; builds planning contexts for requests
pub trait PlanningContextManager: Send + Sync {
    /// Replace the configuration map
    fn set_planner_configurations(&mut self, pconfig: PlannerConfigurationMap);

    /// Current configuration map
    fn planner_configurations(&self) -> &PlannerConfigurationMap;

    /// Build a context for `request`
    fn get_planning_context(
        &self,
        scene: &dyn PlanningScene,
        request: &MotionPlanRequest,
    ) -> Result<Box<dyn PlanningContext>, ErrorCode>;
}
