//! Activity property bags.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Well-known activity property names.
///
/// This is a closed enumeration: the engine itself only ever reads and
/// writes these; domain-specific properties are free-form strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltInProperty {
    AgentRole,
    AgentName,
    StateMachineName,
    StateMachineVersion,
    Description,
    Breakpoint,
}

impl BuiltInProperty {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AgentRole => "Agent Role",
            Self::AgentName => "Agent Name",
            Self::StateMachineName => "StateMachineName",
            Self::StateMachineVersion => "StateMachineVersion",
            Self::Description => "Description",
            Self::Breakpoint => "Breakpoint",
        }
    }
}

/// String-keyed bag of JSON values attached to an activity.
///
/// Keys iterate in lexical order. Truthiness follows the platform
/// convention: boolean `true`, or the strings `"true"`/`"TRUE"`.
///
/// # Example
///
/// ```rust
/// use workstate::activity::{BuiltInProperty, PropertyBag};
///
/// let mut properties = PropertyBag::new();
/// properties.insert("ShowTime", true);
/// properties.set_built_in(BuiltInProperty::AgentRole, "operator");
///
/// assert!(properties.is_truthy("ShowTime"));
/// assert_eq!(
///     properties.built_in_string(BuiltInProperty::AgentRole),
///     Some("operator".to_string())
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyBag {
    entries: BTreeMap<String, Value>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// String rendering of a property value; non-string values are
    /// rendered through their JSON representation.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.entries.get(name).map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.entries.get(name)? {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.parse().ok(),
            _ => None,
        }
    }

    pub fn is_truthy(&self, name: &str) -> bool {
        match self.entries.get(name) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => text.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn get_built_in(&self, property: BuiltInProperty) -> Option<&Value> {
        self.get(property.name())
    }

    pub fn built_in_string(&self, property: BuiltInProperty) -> Option<String> {
        self.get_string(property.name())
    }

    pub fn set_built_in(&mut self, property: BuiltInProperty, value: impl Into<Value>) {
        self.insert(property.name(), value);
    }

    pub fn remove_built_in(&mut self, property: BuiltInProperty) -> Option<Value> {
        self.remove(property.name())
    }

    /// Resolve a possibly property-referencing value: `${name}` reads the
    /// named property (absent property resolves to `None`), anything else
    /// is returned verbatim.
    pub fn resolve_reference(&self, raw: &str) -> Option<String> {
        match raw.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
            Some(property) => self.get_string(property),
            None => Some(raw.to_string()),
        }
    }

    /// Property names starting with the given prefix, with their values.
    pub fn matching_names(&self, prefix: &str) -> BTreeMap<String, Value> {
        let matches: BTreeMap<String, Value> = self
            .entries
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        if matches.is_empty() {
            tracing::debug!(prefix, "no properties matched prefix");
        }

        matches
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_accepts_bool_and_true_strings() {
        let mut properties = PropertyBag::new();
        properties.insert("a", true);
        properties.insert("b", "true");
        properties.insert("c", "TRUE");
        properties.insert("d", "yes");
        properties.insert("e", false);

        assert!(properties.is_truthy("a"));
        assert!(properties.is_truthy("b"));
        assert!(properties.is_truthy("c"));
        assert!(!properties.is_truthy("d"));
        assert!(!properties.is_truthy("e"));
        assert!(!properties.is_truthy("missing"));
    }

    #[test]
    fn get_string_renders_non_string_values() {
        let mut properties = PropertyBag::new();
        properties.insert("text", "hello");
        properties.insert("count", 3);

        assert_eq!(properties.get_string("text"), Some("hello".to_string()));
        assert_eq!(properties.get_string("count"), Some("3".to_string()));
        assert_eq!(properties.get_string("missing"), None);
    }

    #[test]
    fn get_i64_parses_numbers_and_numeric_strings() {
        let mut properties = PropertyBag::new();
        properties.insert("version", 2);
        properties.insert("stringly", "7");
        properties.insert("junk", "seven");

        assert_eq!(properties.get_i64("version"), Some(2));
        assert_eq!(properties.get_i64("stringly"), Some(7));
        assert_eq!(properties.get_i64("junk"), None);
    }

    #[test]
    fn resolve_reference_interpolates_tokens() {
        let mut properties = PropertyBag::new();
        properties.insert("Role", "admin");

        assert_eq!(
            properties.resolve_reference("${Role}"),
            Some("admin".to_string())
        );
        assert_eq!(properties.resolve_reference("${Missing}"), None);
        assert_eq!(
            properties.resolve_reference("literal"),
            Some("literal".to_string())
        );
    }

    #[test]
    fn matching_names_filters_by_prefix() {
        let mut properties = PropertyBag::new();
        properties.insert("Schema", "Report");
        properties.insert("SchemaVersion", 1);
        properties.insert("Other", "x");

        let matches = properties.matching_names("Schema");
        assert_eq!(matches.len(), 2);
        assert!(matches.contains_key("Schema"));
        assert!(matches.contains_key("SchemaVersion"));
    }

    #[test]
    fn built_in_names_are_stable() {
        assert_eq!(BuiltInProperty::AgentRole.name(), "Agent Role");
        assert_eq!(BuiltInProperty::StateMachineName.name(), "StateMachineName");
    }

    #[test]
    fn bag_roundtrips_through_serde() {
        let mut properties = PropertyBag::new();
        properties.insert("Description", "review shipment");
        properties.insert("Breakpoint", false);

        let json = serde_json::to_string(&properties).unwrap();
        let back: PropertyBag = serde_json::from_str(&json).unwrap();
        assert_eq!(properties, back);
    }
}
