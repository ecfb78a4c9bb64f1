// src/main.rs
// Loads a robot description and an OMPL planning parameter file, runs the
// planner manager over them and prints the resulting planner configurations.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use ompl_planner_manager::{
    ConfigurationContextManager, ManagerSettings, OmplPlannerManager, PlannerManager, PlannerManagerContext,
    RobotDescription, RobotModel, YamlParameterStore,
};

/// Print the OMPL planner configurations a robot's parameter file defines
#[derive(Parser, Debug)]
#[command(name = "ompl-planner-manager")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Robot description listing the joint groups
    #[arg(value_name = "ROBOT_YAML")]
    robot: PathBuf,

    /// Planner parameters, e.g. ompl_planning.yaml
    #[arg(value_name = "PLANNING_YAML")]
    params: PathBuf,

    /// Parameter namespace the configurations live under (default: document root)
    #[arg(value_name = "NAMESPACE")]
    namespace: Option<String>,

    /// Do not ask planning contexts to simplify solutions
    #[arg(long)]
    no_simplify: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let robot: Arc<dyn RobotModel> = Arc::new(RobotDescription::from_path(&cli.robot)?);
    info!(
        "Robot '{}' with {} joint groups",
        robot.name(),
        robot.joint_model_group_names().len()
    );

    let parameters = Arc::new(YamlParameterStore::from_path(&cli.params)?);
    let context_manager = Box::new(ConfigurationContextManager::new(robot.clone()));
    let settings = ManagerSettings {
        simplify_solutions: !cli.no_simplify,
        ..ManagerSettings::default()
    };
    let context = PlannerManagerContext::new(parameters, context_manager).with_settings(settings);

    let mut manager = OmplPlannerManager::new(context);
    manager.initialize(robot, cli.namespace.as_deref().unwrap_or(""))?;
    manager.print_status();

    info!(
        "{} planning algorithms: {}",
        manager.description(),
        manager.planning_algorithms().join(", ")
    );
    print!("{}", serde_yaml::to_string(manager.planner_configurations())?);
    Ok(())
}
