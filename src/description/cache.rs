//! Shared cache of loaded machine descriptions.

use crate::machine::{Error, Result, StateMachine};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Cache of machines keyed by (name, version).
///
/// Loading parses and validates a description once and publishes it as a
/// shared immutable `Arc<StateMachine>`; every activity of that
/// type/version queries the same instance. An incoherent description is
/// cached but logged: disabled rather than rejected, with queries against
/// it failing as `InvalidData` until a corrected version is loaded.
/// Editing happens on unpublished draft copies, never on cached
/// instances.
#[derive(Debug, Default)]
pub struct MachineCache {
    entries: RwLock<HashMap<(String, i32), Arc<StateMachine>>>,
}

impl MachineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache pre-populated with the standard platform machines at
    /// version 0.
    pub fn with_presets() -> Self {
        let cache = Self::new();
        cache.put(super::presets::default_machine());
        cache.put(super::presets::composite_machine());
        cache.put(super::presets::predefined_machine());
        cache
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Fetch the shared instance for (name, version).
    pub fn get(&self, name: &str, version: i32) -> Result<Arc<StateMachine>> {
        self.entries
            .read()
            .get(&(name.to_string(), version))
            .cloned()
            .ok_or_else(|| Error::not_found("state machine", format!("{name} v{version}")))
    }

    /// Publish an already-built machine under its own name and version
    /// (version defaults to 0 when unset).
    pub fn put(&self, machine: StateMachine) -> Arc<StateMachine> {
        let key = (machine.name().to_string(), machine.version().unwrap_or(0));
        let shared = Arc::new(machine);
        self.entries.write().insert(key, shared.clone());
        shared
    }

    /// Parse a serialized description, validate it, stamp its identity
    /// and publish it.
    ///
    /// Unparseable data is `InvalidData`. A parsed but incoherent machine
    /// is published anyway with a warning; callers are expected to check
    /// coherence (queries against it fail until it is fixed).
    pub fn load(&self, name: &str, version: i32, data: &str) -> Result<Arc<StateMachine>> {
        let mut machine: StateMachine = serde_json::from_str(data).map_err(|parse_err| {
            tracing::error!(name, version, %parse_err, "could not parse state machine description");
            Error::InvalidData(format!(
                "Could not parse state machine '{name}' v{version}: {parse_err}"
            ))
        })?;

        if !machine.validate() {
            tracing::warn!(name, version, "loaded state machine is not coherent");
        }
        machine.set_name(name);
        machine.set_version(version);

        Ok(self.put(machine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description() -> String {
        let mut machine = StateMachine::new("Signoff", None);
        machine.create_state("Pending");
        machine.create_state("Active");
        machine.create_transition("Start", 0, 1);
        machine.set_initial_state_code(0);
        serde_json::to_string(&machine).unwrap()
    }

    #[test]
    fn load_validates_and_stamps_identity() {
        let cache = MachineCache::new();
        let loaded = cache.load("Signoff", 2, &description()).unwrap();

        assert!(loaded.is_coherent());
        assert_eq!(loaded.name(), "Signoff");
        assert_eq!(loaded.version(), Some(2));
    }

    #[test]
    fn get_returns_the_shared_instance() {
        let cache = MachineCache::new();
        let loaded = cache.load("Signoff", 0, &description()).unwrap();
        let fetched = cache.get("Signoff", 0).unwrap();

        assert!(Arc::ptr_eq(&loaded, &fetched));
    }

    #[test]
    fn get_unknown_machine_is_not_found() {
        let cache = MachineCache::new();
        let err = cache.get("Missing", 3).unwrap_err();

        assert!(matches!(err, Error::ObjectNotFound { .. }));
        assert!(err.to_string().contains("Missing v3"));
    }

    #[test]
    fn load_rejects_unparseable_data() {
        let cache = MachineCache::new();
        let err = cache.load("Broken", 0, "not json").unwrap_err();

        assert!(matches!(err, Error::InvalidData(_)));
        assert!(cache.is_empty());
    }

    #[test]
    fn incoherent_description_is_cached_but_flagged() {
        let mut machine = StateMachine::new("Dangling", None);
        machine.create_state("Only");
        machine.create_transition("Ghost", 0, 99);
        machine.set_initial_state_code(0);
        let data = serde_json::to_string(&machine).unwrap();

        let cache = MachineCache::new();
        let loaded = cache.load("Dangling", 0, &data).unwrap();

        assert!(!loaded.is_coherent());
        assert!(cache.get("Dangling", 0).is_ok());
    }

    #[test]
    fn versions_are_cached_independently() {
        let cache = MachineCache::new();
        cache.load("Signoff", 0, &description()).unwrap();
        cache.load("Signoff", 1, &description()).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get("Signoff", 0).is_ok());
        assert!(cache.get("Signoff", 1).is_ok());
    }

    #[test]
    fn preset_cache_serves_the_standard_machines() {
        let cache = MachineCache::with_presets();

        for name in ["Default", "CompositeActivity", "PredefinedStep"] {
            let machine = cache.get(name, 0).unwrap();
            assert!(machine.is_coherent(), "{name} must be coherent");
        }
    }
}
