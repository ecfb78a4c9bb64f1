//! Parameter store access for the planner manager
//!
//! Planner settings live in an external key-value store (a YAML file, or a
//! ROS 2 node's parameters). Values are read once at the boundary into
//! [`ParamValue`] and the rest of the crate only ever sees that tagged type.

mod yaml;
#[cfg(feature = "ros2")]
mod ros;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub use yaml::YamlParameterStore;
#[cfg(feature = "ros2")]
pub use ros::RosParameterStore;

/// Separator between the segments of a parameter key
pub const KEY_SEPARATOR: char = '/';

/// A single value read from the parameter store
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Text value
    String(String),
    /// Floating point value
    Double(f64),
    /// Integer value
    Int(i64),
    /// Boolean value
    Bool(bool),
    /// Ordered list of values
    List(Vec<ParamValue>),
    /// Named members, sorted by key
    Struct(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// Render a scalar the way planner configurations store it.
    ///
    /// Doubles use the shortest decimal that round-trips (`1.0` becomes `"1"`),
    /// booleans become `"1"` / `"0"`. Lists and structs have no string form.
    pub fn to_config_string(&self) -> Option<String> {
        match self {
            ParamValue::String(s) => Some(s.clone()),
            ParamValue::Double(d) => Some(d.to_string()),
            ParamValue::Int(i) => Some(i.to_string()),
            ParamValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            ParamValue::List(_) | ParamValue::Struct(_) => None,
        }
    }

    /// Name of the variant, for log messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::String(_) => "string",
            ParamValue::Double(_) => "double",
            ParamValue::Int(_) => "int",
            ParamValue::Bool(_) => "bool",
            ParamValue::List(_) => "list",
            ParamValue::Struct(_) => "struct",
        }
    }

    /// List of the given items
    pub fn list<T: Into<ParamValue>>(items: impl IntoIterator<Item = T>) -> Self {
        ParamValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Borrow the text of a `String` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the items of a `List` value
    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the members of a `Struct` value
    pub fn as_struct(&self) -> Option<&BTreeMap<String, ParamValue>> {
        match self {
            ParamValue::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Follow a `/`-separated path through nested structs.
    ///
    /// Empty segments are ignored, so an empty path returns `self`.
    pub fn lookup(&self, path: &str) -> Option<&ParamValue> {
        split_key(path).try_fold(self, |value, segment| value.as_struct()?.get(segment))
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_config_string() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "<{}>", self.type_name()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Double(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Read access to a key-value parameter store.
///
/// Keys are `/`-separated paths. A key that names a subtree returns it as a
/// [`ParamValue::Struct`].
#[cfg_attr(test, mockall::automock)]
pub trait ParameterStore: Send + Sync {
    /// Fetch the value stored under `key`
    fn get(&self, key: &str) -> Option<ParamValue>;

    /// Whether anything is stored under `key`
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl<S: ParameterStore + ?Sized> ParameterStore for Arc<S> {
    fn get(&self, key: &str) -> Option<ParamValue> {
        (**self).get(key)
    }

    fn has(&self, key: &str) -> bool {
        (**self).has(key)
    }
}

/// Split a key into its non-empty segments
pub(crate) fn split_key(key: &str) -> impl Iterator<Item = &str> {
    key.split(KEY_SEPARATOR).filter(|segment| !segment.is_empty())
}

/// Join two keys with a single separator
pub fn join_key(prefix: &str, key: &str) -> String {
    let prefix = prefix.trim_end_matches(KEY_SEPARATOR);
    let key = key.trim_start_matches(KEY_SEPARATOR);
    match (prefix.is_empty(), key.is_empty()) {
        (true, _) => key.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{}{}{}", prefix, KEY_SEPARATOR, key),
    }
}

/// A parameter store viewed from a namespace.
///
/// Relative keys resolve under the namespace. The empty namespace and the
/// private namespace `~` both resolve to the store root.
#[derive(Clone)]
pub struct NamespacedParams {
    store: Arc<dyn ParameterStore>,
    namespace: String,
}

impl NamespacedParams {
    /// Create a view of `store` rooted at `namespace`
    pub fn new(store: Arc<dyn ParameterStore>, namespace: &str) -> Self {
        let namespace = match namespace.trim_matches(KEY_SEPARATOR) {
            "~" => String::new(),
            ns => ns.trim_start_matches('~').trim_start_matches(KEY_SEPARATOR).to_string(),
        };
        NamespacedParams { store, namespace }
    }

    /// Namespace prefix applied to every key
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Full store key for a relative key
    pub fn resolve(&self, key: &str) -> String {
        join_key(&self.namespace, key)
    }

    /// Fetch a value relative to the namespace
    pub fn get(&self, key: &str) -> Option<ParamValue> {
        self.store.get(&self.resolve(key))
    }

    /// Whether a value exists relative to the namespace
    pub fn has(&self, key: &str) -> bool {
        self.store.has(&self.resolve(key))
    }
}

impl fmt::Debug for NamespacedParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NamespacedParams")
            .field("namespace", &self.namespace)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use rstest::rstest;

    #[rstest]
    #[case(ParamValue::from("KPIECE"), Some("KPIECE"))]
    #[case(ParamValue::Double(0.005), Some("0.005"))]
    #[case(ParamValue::Double(1.0), Some("1"))]
    #[case(ParamValue::Double(-2.5), Some("-2.5"))]
    #[case(ParamValue::Int(42), Some("42"))]
    #[case(ParamValue::Bool(true), Some("1"))]
    #[case(ParamValue::Bool(false), Some("0"))]
    #[case(ParamValue::List(vec![ParamValue::Int(1)]), None)]
    #[case(ParamValue::Struct(BTreeMap::new()), None)]
    fn stringifies_scalars_only(#[case] value: ParamValue, #[case] expected: Option<&str>) {
        assert_eq!(value.to_config_string().as_deref(), expected);
    }

    #[test]
    fn list_converts_items() {
        let bytes: &[u8] = &[7, 255];
        assert_eq!(
            ParamValue::list(bytes.iter().map(|b| i64::from(*b))),
            ParamValue::List(vec![ParamValue::Int(7), ParamValue::Int(255)])
        );
        assert_eq!(ParamValue::list(Vec::<bool>::new()).as_list(), Some(&[][..]));
    }

    #[test]
    fn lookup_walks_nested_structs() {
        let mut inner = BTreeMap::new();
        inner.insert("range".to_string(), ParamValue::Double(0.5));
        let mut outer = BTreeMap::new();
        outer.insert("RRT".to_string(), ParamValue::Struct(inner));
        let root = ParamValue::Struct(outer);

        assert_eq!(root.lookup("RRT/range"), Some(&ParamValue::Double(0.5)));
        assert_eq!(root.lookup("/RRT//range/"), Some(&ParamValue::Double(0.5)));
        assert_eq!(root.lookup(""), Some(&root));
        assert_eq!(root.lookup("RRT/range/deeper"), None);
        assert_eq!(root.lookup("EST"), None);
    }

    #[rstest]
    #[case("", "arm/planner_configs", "arm/planner_configs")]
    #[case("ompl", "arm", "ompl/arm")]
    #[case("ompl/", "/arm", "ompl/arm")]
    #[case("ompl", "", "ompl")]
    fn joins_keys(#[case] prefix: &str, #[case] key: &str, #[case] expected: &str) {
        assert_eq!(join_key(prefix, key), expected);
    }

    #[rstest]
    #[case("", "arm/type", "arm/type")]
    #[case("~", "arm/type", "arm/type")]
    #[case("/move_group/", "arm/type", "move_group/arm/type")]
    #[case("~/planning", "arm/type", "planning/arm/type")]
    fn namespaced_view_resolves_relative_keys(
        #[case] namespace: &str,
        #[case] key: &str,
        #[case] resolved: &str,
    ) {
        let mut store = MockParameterStore::new();
        store
            .expect_get()
            .with(eq(resolved.to_string()))
            .returning(|_| Some(ParamValue::Int(7)));

        let params = NamespacedParams::new(Arc::new(store), namespace);
        assert_eq!(params.resolve(key), resolved);
        assert_eq!(params.get(key), Some(ParamValue::Int(7)));
    }

    #[test]
    fn namespaced_has_asks_store_with_full_key() {
        let mut store = MockParameterStore::new();
        store
            .expect_has()
            .returning(|key| key == "move_group/present");

        let params = NamespacedParams::new(Arc::new(store), "move_group");
        assert!(params.has("present"));
        assert!(!params.has("absent"));
    }
}
