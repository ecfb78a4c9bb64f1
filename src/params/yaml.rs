// src/params/yaml.rs
// Parameter store loaded from a YAML document such as `ompl_planning.yaml`.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde_yaml::Value;

use super::{ParamValue, ParameterStore};
use crate::PlannerManagerError;

/// In-memory parameter tree built from YAML.
///
/// The document root must be a mapping. Nested mappings become
/// [`ParamValue::Struct`] and are addressed with `/`-separated keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YamlParameterStore {
    root: BTreeMap<String, ParamValue>,
}

impl YamlParameterStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document
    pub fn from_str(text: &str) -> Result<Self, PlannerManagerError> {
        let value: Value = serde_yaml::from_str(text)?;
        Self::from_value(value)
    }

    /// Parse a YAML document from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PlannerManagerError> {
        let value: Value = serde_yaml::from_reader(reader)?;
        Self::from_value(value)
    }

    /// Load a YAML file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PlannerManagerError> {
        let path = path.as_ref();
        log::debug!("Loading parameters from {}", path.display());
        std::fs::File::open(path)
            .map_err(PlannerManagerError::from)
            .and_then(Self::from_reader)
            .map_err(|e| e.in_file(path))
    }

    /// Build a store from an already parsed document.
    ///
    /// An empty document yields an empty store.
    pub fn from_value(value: Value) -> Result<Self, PlannerManagerError> {
        match convert(value) {
            None => Ok(Self::new()),
            Some(ParamValue::Struct(root)) => Ok(YamlParameterStore { root }),
            Some(other) => Err(PlannerManagerError::ConfigError(format!(
                "parameter document root must be a mapping, found {}",
                other.type_name()
            ))),
        }
    }

    /// Build a store from flat, dot-separated parameter names such as the
    /// ones a ROS 2 node declares (`manipulator.planner_configs`).
    ///
    /// Names are applied in sorted order, so when both `a` and `a.b` are
    /// declared the struct holding `a.b` wins regardless of input order.
    pub fn from_flat_parameters<I, K>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, ParamValue)>,
        K: AsRef<str>,
    {
        let sorted: BTreeMap<String, ParamValue> = params
            .into_iter()
            .map(|(name, value)| (name.as_ref().replace('.', "/"), value))
            .collect();

        let mut store = Self::new();
        for (key, value) in sorted {
            store.set(&key, value);
        }
        store
    }

    /// Store `value` under `key`, creating intermediate structs.
    ///
    /// A scalar on the way to `key` is replaced by a struct, and a struct
    /// already at `key` is replaced by `value`. Both drop data and are
    /// logged as warnings.
    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) {
        let mut segments: Vec<&str> = super::split_key(key).collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut node = &mut self.root;
        let mut path = String::new();
        for segment in segments {
            path = super::join_key(&path, segment);
            let entry = node
                .entry(segment.to_string())
                .or_insert_with(|| ParamValue::Struct(BTreeMap::new()));
            if !matches!(entry, ParamValue::Struct(_)) {
                log::warn!("Parameter '{}' = {} is dropped to hold '{}'", path, entry, key);
                *entry = ParamValue::Struct(BTreeMap::new());
            }
            node = match entry {
                ParamValue::Struct(members) => members,
                _ => unreachable!("entry was just made a struct"),
            };
        }

        let value = value.into();
        if let Some(ParamValue::Struct(members)) = node.get(last) {
            if !matches!(value, ParamValue::Struct(_)) {
                log::warn!(
                    "Parameter '{}' replaces {} parameters below it",
                    super::join_key(&path, last),
                    members.len()
                );
            }
        }
        node.insert(last.to_string(), value);
    }

    /// Top-level keys of the document
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }
}

impl ParameterStore for YamlParameterStore {
    fn get(&self, key: &str) -> Option<ParamValue> {
        let mut segments = super::split_key(key);
        let first = segments.next()?;
        let mut value = self.root.get(first)?;
        for segment in segments {
            value = value.as_struct()?.get(segment)?;
        }
        Some(value.clone())
    }
}

fn convert(value: Value) -> Option<ParamValue> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(ParamValue::Bool(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(ParamValue::Int(i)),
            None => n.as_f64().map(ParamValue::Double),
        },
        Value::String(s) => Some(ParamValue::String(s)),
        Value::Sequence(items) => Some(ParamValue::List(
            items.into_iter().filter_map(convert).collect(),
        )),
        Value::Mapping(mapping) => {
            let members = mapping
                .into_iter()
                .filter_map(|(key, value)| Some((key_to_string(key)?, convert(value)?)))
                .collect();
            Some(ParamValue::Struct(members))
        }
        Value::Tagged(tagged) => convert(tagged.value),
    }
}

fn key_to_string(key: Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => key_to_string(tagged.value),
        other => {
            log::warn!("Ignoring parameter with non-scalar key {:?}", other);
            None
        }
    }
}
