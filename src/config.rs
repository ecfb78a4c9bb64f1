//! Planner configurations
//!
//! A planner configuration is a named set of string parameters for one joint
//! group. For every group the loader produces:
//! - `<group>`: the group-level parameters, when any are set, and
//! - `<group>[<config>]`: one entry per name listed in
//!   `<group>/planner_configs`, inheriting the group-level parameters and
//!   overriding them with the members of `planner_configs/<config>`.
//!
//! ```yaml
//! planner_configs:
//!   RRTConnect:
//!     type: geometric::RRTConnect
//! manipulator:
//!   planner_configs: [RRTConnect]
//!   longest_valid_segment_fraction: 0.05
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::RobotModel;
use crate::params::{NamespacedParams, ParamValue};

/// Parameters that can be set per group and are inherited by all of the
/// group's configurations
pub const KNOWN_GROUP_PARAMS: [&str; 2] = ["projection_evaluator", "longest_valid_segment_fraction"];

/// Key listing a group's configuration names
pub const PLANNER_CONFIGS_KEY: &str = "planner_configs";

/// Log target used for the per-configuration parameter dump
pub const PARAMETERS_LOG_TARGET: &str = "parameters";

/// Named planner parameters for one joint group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfigurationSettings {
    /// Configuration name, `<group>` or `<group>[<config>]`
    pub name: String,
    /// Joint group the configuration applies to
    pub group: String,
    /// Planner parameters
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

/// Configurations keyed by name
pub type PlannerConfigurationMap = BTreeMap<String, PlannerConfigurationSettings>;

impl PlannerConfigurationSettings {
    /// Parameter-free default configuration of a group
    pub fn group_default(group: &str) -> Self {
        PlannerConfigurationSettings {
            name: group.to_string(),
            group: group.to_string(),
            config: BTreeMap::new(),
        }
    }

    /// Name of a specific configuration of `group`
    pub fn qualified_name(group: &str, config: &str) -> String {
        format!("{}[{}]", group, config)
    }

    /// Whether this is the group's own configuration rather than a named one
    pub fn is_group_default(&self) -> bool {
        self.name == self.group
    }

    /// Configuration name without the `<group>[...]` wrapper
    pub fn config_name(&self) -> &str {
        self.name
            .strip_prefix(self.group.as_str())
            .and_then(|rest| rest.strip_prefix('['))
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(&self.name)
    }

    /// Planner type, e.g. `geometric::RRTConnect`
    pub fn planner_type(&self) -> Option<&str> {
        self.config.get("type").map(String::as_str)
    }
}

/// Read the planner configurations of every joint group of `model`.
///
/// Malformed entries are logged and skipped.
pub fn load_planner_configurations(
    model: &dyn RobotModel,
    params: &NamespacedParams,
) -> PlannerConfigurationMap {
    let mut pconfig = PlannerConfigurationMap::new();

    for group in model.joint_model_group_names() {
        let group_params = read_group_params(&group, params);

        if !group_params.is_empty() {
            pconfig.insert(
                group.clone(),
                PlannerConfigurationSettings {
                    name: group.clone(),
                    group: group.clone(),
                    config: group_params.clone(),
                },
            );
        }

        let Some(config_names) = params.get(&format!("{}/{}", group, PLANNER_CONFIGS_KEY)) else {
            continue;
        };
        let Some(config_names) = config_names.as_list() else {
            log::error!(
                "The planner_configs argument of a group configuration should be an array of strings (for group '{}')",
                group
            );
            continue;
        };

        for config_name in config_names {
            let Some(config_name) = config_name.as_str() else {
                log::error!(
                    "Planner configuration names must be of type string (for group '{}')",
                    group
                );
                continue;
            };
            if let Some(settings) = read_named_config(&group, config_name, &group_params, params) {
                pconfig.insert(settings.name.clone(), settings);
            }
        }
    }

    log_configurations(&pconfig);
    pconfig
}

/// Add an empty default configuration for every group of `model` that has no
/// entry under its own name.
pub fn with_default_group_configurations(
    mut pconfig: PlannerConfigurationMap,
    model: &dyn RobotModel,
) -> PlannerConfigurationMap {
    for group in model.joint_model_groups() {
        pconfig
            .entry(group.name.clone())
            .or_insert_with(|| PlannerConfigurationSettings::group_default(&group.name));
    }
    pconfig
}

fn read_group_params(group: &str, params: &NamespacedParams) -> BTreeMap<String, String> {
    let mut group_params = BTreeMap::new();
    for param in KNOWN_GROUP_PARAMS {
        let key = format!("{}/{}", group, param);
        let Some(value) = params.get(&key) else {
            continue;
        };
        match value.to_config_string() {
            Some(text) if !text.is_empty() => {
                group_params.insert(param.to_string(), text);
            }
            Some(_) => {}
            None => log::debug!("Ignoring {} value of '{}'", value.type_name(), params.resolve(&key)),
        }
    }
    group_params
}

fn read_named_config(
    group: &str,
    config_name: &str,
    group_params: &BTreeMap<String, String>,
    params: &NamespacedParams,
) -> Option<PlannerConfigurationSettings> {
    let Some(value) = params.get(&format!("{}/{}", PLANNER_CONFIGS_KEY, config_name)) else {
        log::error!(
            "Could not find the planner configuration '{}' on the param server",
            config_name
        );
        return None;
    };
    let ParamValue::Struct(members) = value else {
        log::error!(
            "A planning configuration should be of type XmlRpc Struct type (for configuration '{}')",
            config_name
        );
        return None;
    };

    let mut config = group_params.clone();
    for (key, member) in &members {
        if let Some(text) = member.to_config_string() {
            config.insert(key.clone(), text);
        }
    }

    Some(PlannerConfigurationSettings {
        name: PlannerConfigurationSettings::qualified_name(group, config_name),
        group: group.to_string(),
        config,
    })
}

fn log_configurations(pconfig: &PlannerConfigurationMap) {
    for (name, settings) in pconfig {
        log::debug!(target: PARAMETERS_LOG_TARGET, "Parameters for configuration '{}'", name);
        for (key, value) in &settings.config {
            log::debug!(target: PARAMETERS_LOG_TARGET, " - {} = {}", key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JointModelGroup, MockRobotModel};
    use crate::params::{MockParameterStore, YamlParameterStore};
    use crate::test_log::{capture, logged};
    use log::Level;
    use rstest::rstest;
    use std::sync::Arc;

    fn model(groups: &[&str]) -> MockRobotModel {
        let groups: Vec<JointModelGroup> = groups.iter().map(|g| JointModelGroup::new(*g, &[])).collect();
        let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
        let mut model = MockRobotModel::new();
        model.expect_joint_model_groups().return_const(groups);
        model.expect_joint_model_group_names().return_const(names);
        model
    }

    fn yaml(text: &str) -> NamespacedParams {
        NamespacedParams::new(Arc::new(YamlParameterStore::from_str(text).unwrap()), "")
    }

    #[test]
    fn group_without_parameters_yields_nothing_until_defaults_are_added() {
        let model = model(&["arm"]);
        let params = yaml("other: 1\n");

        let pconfig = load_planner_configurations(&model, &params);
        assert!(pconfig.is_empty());

        let pconfig = with_default_group_configurations(pconfig, &model);
        assert_eq!(pconfig.len(), 1);
        assert_eq!(pconfig["arm"], PlannerConfigurationSettings::group_default("arm"));
    }

    #[test]
    fn group_params_create_group_entry() {
        let model = model(&["arm"]);
        let params = yaml("arm:\n  projection_evaluator: link(tool0)\n  longest_valid_segment_fraction: 0.01\n  ignored: 3\n");

        let pconfig = load_planner_configurations(&model, &params);

        let arm = &pconfig["arm"];
        assert!(arm.is_group_default());
        assert_eq!(arm.config.len(), 2);
        assert_eq!(arm.config["projection_evaluator"], "link(tool0)");
        assert_eq!(arm.config["longest_valid_segment_fraction"], "0.01");
    }

    #[test]
    fn empty_string_group_param_is_skipped() {
        let model = model(&["arm"]);
        let params = yaml("arm:\n  projection_evaluator: ''\n");

        assert!(load_planner_configurations(&model, &params).is_empty());
    }

    #[test]
    fn named_config_overrides_group_defaults() {
        let model = model(&["arm"]);
        let params = yaml(
            r#"
planner_configs:
  RRT:
    type: geometric::RRT
    longest_valid_segment_fraction: 0.2
    goal_bias: 0.05
    nested: {a: 1}
arm:
  planner_configs: [RRT]
  longest_valid_segment_fraction: 0.01
  projection_evaluator: joints(j1,j2)
"#,
        );

        let pconfig = load_planner_configurations(&model, &params);
        assert_eq!(pconfig.len(), 2);

        let rrt = &pconfig["arm[RRT]"];
        assert_eq!(rrt.group, "arm");
        assert_eq!(rrt.config_name(), "RRT");
        assert_eq!(rrt.planner_type(), Some("geometric::RRT"));
        assert_eq!(rrt.config["longest_valid_segment_fraction"], "0.2");
        assert_eq!(rrt.config["projection_evaluator"], "joints(j1,j2)");
        assert_eq!(rrt.config["goal_bias"], "0.05");
        assert!(!rrt.config.contains_key("nested"));

        assert_eq!(pconfig["arm"].config["longest_valid_segment_fraction"], "0.01");
    }

    #[rstest]
    #[case::not_a_list(
        "arm:\n  planner_configs: RRT\n",
        "The planner_configs argument of a group configuration should be an array of strings (for group 'arm')"
    )]
    #[case::missing_config(
        "arm:\n  planner_configs: [RRT]\n",
        "Could not find the planner configuration 'RRT' on the param server"
    )]
    #[case::config_not_a_struct(
        "planner_configs:\n  RRT: 5\narm:\n  planner_configs: [RRT]\n",
        "A planning configuration should be of type XmlRpc Struct type (for configuration 'RRT')"
    )]
    #[case::name_not_a_string(
        "planner_configs:\n  RRT: {type: geometric::RRT}\narm:\n  planner_configs: [7]\n",
        "Planner configuration names must be of type string (for group 'arm')"
    )]
    fn malformed_configs_are_logged_and_skipped(#[case] text: &str, #[case] message: &str) {
        let model = model(&["arm"]);
        let params = yaml(text);

        let (pconfig, records) = capture(|| load_planner_configurations(&model, &params));

        assert!(pconfig.is_empty());
        assert!(
            logged(&records, Level::Error, "ompl_planner_manager::config", message),
            "{:?}",
            records
        );
        assert_eq!(records.iter().filter(|r| r.level == Level::Error).count(), 1);
    }

    #[test]
    fn dumps_parameters_at_debug_level() {
        let model = model(&["arm"]);
        let params = yaml("planner_configs:\n  RRT: {type: geometric::RRT}\narm:\n  planner_configs: [RRT]\n");

        let (_, records) = capture(|| load_planner_configurations(&model, &params));

        assert!(logged(&records, Level::Debug, PARAMETERS_LOG_TARGET, "Parameters for configuration 'arm[RRT]'"));
        assert!(logged(&records, Level::Debug, PARAMETERS_LOG_TARGET, " - type = geometric::RRT"));
        assert!(records.iter().all(|r| r.level != Level::Error));
    }

    #[test]
    fn bad_entries_do_not_stop_good_ones() {
        let model = model(&["arm", "gripper"]);
        let params = yaml(
            r#"
planner_configs:
  EST: {type: geometric::EST}
arm:
  planner_configs: [7, Missing, EST]
gripper:
  planner_configs: not-a-list
  projection_evaluator: link(finger)
"#,
        );

        let pconfig = load_planner_configurations(&model, &params);
        let names: Vec<&str> = pconfig.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["arm[EST]", "gripper"]);
    }

    #[test]
    fn typed_values_are_stringified() {
        let model = model(&["arm"]);
        let params = yaml(
            "planner_configs:\n  PRM:\n    max_nearest_neighbors: 10\n    delay_collision_checking: false\n    range: 1.0\narm:\n  planner_configs: [PRM]\n",
        );

        let prm = &load_planner_configurations(&model, &params)["arm[PRM]"];
        assert_eq!(prm.config["max_nearest_neighbors"], "10");
        assert_eq!(prm.config["delay_collision_checking"], "0");
        assert_eq!(prm.config["range"], "1");
    }

    #[test]
    fn reads_relative_to_namespace() {
        let model = model(&["arm"]);
        let mut store = MockParameterStore::new();
        store.expect_get().returning(|key| match key {
            "move_group/arm/projection_evaluator" => Some(ParamValue::from("link(tool0)")),
            _ => None,
        });
        let params = NamespacedParams::new(Arc::new(store), "move_group");

        let pconfig = load_planner_configurations(&model, &params);
        assert_eq!(pconfig["arm"].config["projection_evaluator"], "link(tool0)");
    }

    #[test]
    fn defaults_keep_existing_entries() {
        let model = model(&["arm", "gripper"]);
        let mut pconfig = PlannerConfigurationMap::new();
        let mut arm = PlannerConfigurationSettings::group_default("arm");
        arm.config.insert("projection_evaluator".into(), "link(tool0)".into());
        pconfig.insert("arm".into(), arm.clone());

        let pconfig = with_default_group_configurations(pconfig, &model);
        assert_eq!(pconfig["arm"], arm);
        assert_eq!(pconfig["gripper"], PlannerConfigurationSettings::group_default("gripper"));
    }

    #[rstest]
    #[case("arm[RRT]", "arm", "RRT")]
    #[case("arm", "arm", "arm")]
    #[case("custom", "arm", "custom")]
    fn config_name_strips_group(#[case] name: &str, #[case] group: &str, #[case] expected: &str) {
        let settings = PlannerConfigurationSettings {
            name: name.into(),
            group: group.into(),
            config: BTreeMap::new(),
        };
        assert_eq!(settings.config_name(), expected);
    }
}
