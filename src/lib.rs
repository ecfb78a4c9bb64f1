//! OMPL planner manager
//!
//! Adapter that exposes the OMPL sampling-based planning library to a motion
//! planning host. It reads per-group planner configurations from a parameter
//! store, hands them to a planning context manager, and forwards planning
//! requests to it while applying the solution simplification policy.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod config;
pub mod context;
pub mod manager;
pub mod model;
pub mod params;
pub mod request;

#[cfg(test)]
mod test_log;

// Re-export commonly used items for easier access
pub use config::{PlannerConfigurationMap, PlannerConfigurationSettings};
pub use context::{ConfigurationContextManager, PlanningContext, PlanningContextManager, PlanningScene};
pub use manager::{ManagerSettings, OmplPlannerManager, PlannerManager, PlannerManagerContext};
pub use model::{JointModelGroup, RobotDescription, RobotModel};
pub use params::{NamespacedParams, ParamValue, ParameterStore, YamlParameterStore};
pub use request::{ErrorCode, MotionPlanRequest};

/// Planner manager error types
#[derive(Debug)]
pub enum PlannerManagerError {
    /// The manager was used before `initialize`
    NotInitialized,
    /// Configuration could not be understood
    ConfigError(String),
    /// Configuration file could not be parsed
    ParseError(serde_yaml::Error),
    /// Configuration file could not be read
    IoError(std::io::Error),
}

impl PlannerManagerError {
    /// Prefix the error with the file it came from
    pub fn in_file(self, path: &std::path::Path) -> Self {
        PlannerManagerError::ConfigError(format!("{}: {}", path.display(), self))
    }
}

impl std::fmt::Display for PlannerManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PlannerManagerError::NotInitialized => write!(f, "Planner manager not initialized"),
            PlannerManagerError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            PlannerManagerError::ParseError(err) => write!(f, "Parse error: {}", err),
            PlannerManagerError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for PlannerManagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlannerManagerError::ParseError(err) => Some(err),
            PlannerManagerError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for PlannerManagerError {
    fn from(err: serde_yaml::Error) -> Self {
        PlannerManagerError::ParseError(err)
    }
}

impl From<std::io::Error> for PlannerManagerError {
    fn from(err: std::io::Error) -> Self {
        PlannerManagerError::IoError(err)
    }
}
