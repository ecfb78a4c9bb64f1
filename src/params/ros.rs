// src/params/ros.rs
// Parameter store backed by the parameters declared on a ROS 2 node.

use r2r::{Node, ParameterValue};

use super::{ParamValue, ParameterStore, YamlParameterStore};

/// Snapshot of a ROS 2 node's parameters.
///
/// ROS 2 parameter names are flat and dot-separated
/// (`manipulator.planner_configs`); they are stored under the equivalent
/// `/`-separated key, so a prefix such as `planner_configs/RRTConnect`
/// comes back as a struct of every parameter below it.
#[derive(Debug, Clone, Default)]
pub struct RosParameterStore {
    tree: YamlParameterStore,
}

impl RosParameterStore {
    /// Copy the current parameters of `node`
    pub fn from_node(node: &Node) -> Self {
        let params = match node.params.lock() {
            Ok(params) => params,
            Err(poisoned) => poisoned.into_inner(),
        };

        let declared: Vec<(&String, ParamValue)> = params
            .iter()
            .filter_map(|(name, param)| Some((name, convert(&param.value)?)))
            .collect();
        log::info!(
            "Read {} parameters from ROS 2 node '{}'",
            declared.len(),
            node.name().unwrap_or_default()
        );
        let tree = YamlParameterStore::from_flat_parameters(declared);

        RosParameterStore { tree }
    }
}

impl ParameterStore for RosParameterStore {
    fn get(&self, key: &str) -> Option<ParamValue> {
        self.tree.get(key)
    }
}

fn convert(value: &ParameterValue) -> Option<ParamValue> {
    match value {
        ParameterValue::NotSet => None,
        ParameterValue::Bool(b) => Some(ParamValue::Bool(*b)),
        ParameterValue::Integer(i) => Some(ParamValue::Int(*i)),
        ParameterValue::Double(d) => Some(ParamValue::Double(*d)),
        ParameterValue::String(s) => Some(ParamValue::String(s.clone())),
        ParameterValue::BoolArray(items) => Some(ParamValue::list(items.iter().copied())),
        ParameterValue::ByteArray(items) => Some(ParamValue::list(items.iter().map(|b| i64::from(*b)))),
        ParameterValue::IntegerArray(items) => Some(ParamValue::list(items.iter().copied())),
        ParameterValue::DoubleArray(items) => Some(ParamValue::list(items.iter().copied())),
        ParameterValue::StringArray(items) => Some(ParamValue::list(items.iter().cloned())),
    }
}
