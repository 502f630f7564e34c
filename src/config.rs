//! Engine settings.
//!
//! The only configuration the core consumes is the mapping from activity
//! kind to default machine name. Values not overridden through the
//! environment use the platform defaults.

use crate::description::MachineType;
use serde::Deserialize;

/// Default machine names per activity kind.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_elementary")]
    pub elementary_default: String,

    #[serde(default = "default_composite")]
    pub composite_default: String,

    #[serde(default = "default_predefined")]
    pub predefined_default: String,
}

fn default_elementary() -> String {
    "Default".to_string()
}

fn default_composite() -> String {
    "CompositeActivity".to_string()
}

fn default_predefined() -> String {
    "PredefinedStep".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            elementary_default: default_elementary(),
            composite_default: default_composite(),
            predefined_default: default_predefined(),
        }
    }
}

impl Settings {
    /// Load settings, letting environment variables take precedence over
    /// the defaults.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(name) = std::env::var("WORKSTATE_ELEMENTARY_DEFAULT") {
            settings.elementary_default = name;
        }
        if let Ok(name) = std::env::var("WORKSTATE_COMPOSITE_DEFAULT") {
            settings.composite_default = name;
        }
        if let Ok(name) = std::env::var("WORKSTATE_PREDEFINED_DEFAULT") {
            settings.predefined_default = name;
        }
        settings
    }

    /// The configured default machine name for an activity kind.
    pub fn default_machine_name(&self, machine_type: MachineType) -> &str {
        match machine_type {
            MachineType::Elementary => &self.elementary_default,
            MachineType::Composite => &self.composite_default,
            MachineType::Predefined => &self.predefined_default,
        }
    }
}
