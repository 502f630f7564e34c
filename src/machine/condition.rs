//! Enablement conditions for transitions.
//!
//! A transition that is structurally present can still be contextually
//! inapplicable (a feature toggle, a custom gating rule). Conditions are
//! declarative data in the machine description; expression predicates are
//! supplied by the host at machine-load time so the core carries no
//! scripting engine.

use crate::activity::PropertyBag;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A host-registered predicate backing a named `Condition::Expression`.
pub type ExpressionFn = Arc<dyn Fn(&PropertyBag) -> bool + Send + Sync>;

/// Registry of named expression predicates, populated when a machine
/// description is loaded and consulted on every enablement check.
#[derive(Clone, Default)]
pub struct ScriptRegistry {
    expressions: HashMap<String, ExpressionFn>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate under the given expression name, replacing any
    /// previous registration.
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&PropertyBag) -> bool + Send + Sync + 'static,
    {
        self.expressions.insert(name.into(), Arc::new(predicate));
    }

    pub fn get(&self, name: &str) -> Option<&ExpressionFn> {
        self.expressions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.expressions.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptRegistry")
            .field("expressions", &self.expressions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Declarative enablement predicate evaluated against an activity's
/// property bag.
///
/// # Example
///
/// ```rust
/// use workstate::machine::{Condition, ScriptRegistry};
/// use workstate::activity::PropertyBag;
///
/// let mut properties = PropertyBag::new();
/// properties.insert("ShowTime", true);
///
/// let condition = Condition::PropertyFlag {
///     property: "ShowTime".to_string(),
/// };
///
/// assert!(condition.evaluate(&properties, &ScriptRegistry::new()));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// The named activity property must be truthy.
    PropertyFlag { property: String },

    /// Delegates to a predicate registered under `name` at machine-load
    /// time. An unregistered expression evaluates to disabled.
    Expression { name: String },
}

impl Condition {
    /// Evaluate the condition against an activity's properties.
    pub fn evaluate(&self, properties: &PropertyBag, scripts: &ScriptRegistry) -> bool {
        match self {
            Condition::PropertyFlag { property } => properties.is_truthy(property),
            Condition::Expression { name } => match scripts.get(name) {
                Some(predicate) => predicate(properties),
                None => {
                    tracing::warn!(
                        expression = %name,
                        "condition references an unregistered expression, treating as disabled"
                    );
                    false
                }
            },
        }
    }
}
