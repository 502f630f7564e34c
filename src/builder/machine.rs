//! Builder for authoring state machine descriptions.

use super::error::BuildError;
use crate::machine::{State, StateMachine, Transition};

/// Fluent builder over the machine's factory methods, producing a
/// validated description.
///
/// States and transitions are referred to by name while building; ids
/// are assigned by the machine's factories. `build()` resolves the
/// initial state and validates the finished graph.
///
/// # Example
///
/// ```rust
/// use workstate::builder::StateMachineBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let machine = StateMachineBuilder::new("Signoff")
///     .version(0)
///     .state("Pending")
///     .state("Active")
///     .finished_state("Complete")
///     .initial("Pending")
///     .transition("Start", "Pending", "Active")?
///     .transition("Finish", "Active", "Complete")?
///     .build()?;
///
/// assert!(machine.is_coherent());
/// assert_eq!(machine.states().len(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StateMachineBuilder {
    machine: StateMachine,
    initial: Option<String>,
}

impl StateMachineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            machine: StateMachine::new(name, None),
            initial: None,
        }
    }

    pub fn version(mut self, version: i32) -> Self {
        self.machine.set_version(version);
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.machine.set_namespace(namespace);
        self
    }

    /// Add a state.
    pub fn state(mut self, name: impl Into<String>) -> Self {
        self.machine.create_state(name);
        self
    }

    /// Add a terminal state.
    pub fn finished_state(mut self, name: impl Into<String>) -> Self {
        let id = self.machine.create_state(name);
        if let Some(state) = self.machine.state_mut(id) {
            state.set_finished(true);
        }
        self
    }

    /// Name the initial state (required; resolved at build time).
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Add a transition between two named states.
    pub fn transition(
        self,
        name: impl Into<String>,
        origin: &str,
        target: &str,
    ) -> Result<Self, BuildError> {
        self.transition_with(name, origin, target, |_| {})
    }

    /// Add a transition and configure it (condition, role, reservation,
    /// outcome, script) before it is frozen into the description.
    pub fn transition_with(
        mut self,
        name: impl Into<String>,
        origin: &str,
        target: &str,
        configure: impl FnOnce(&mut Transition),
    ) -> Result<Self, BuildError> {
        let origin_id = self
            .machine
            .state_by_name(origin)
            .map(State::id)
            .ok_or_else(|| BuildError::UnknownState(origin.to_string()))?;
        let target_id = self
            .machine
            .state_by_name(target)
            .map(State::id)
            .ok_or_else(|| BuildError::UnknownState(target.to_string()))?;

        let id = self.machine.create_transition(name, origin_id, target_id);
        if let Some(transition) = self.machine.transition_mut(id) {
            configure(transition);
        }
        Ok(self)
    }

    /// Configure the transition auto-fired when activity logic fails in
    /// the named state. Both must already be defined.
    pub fn error_transition(
        mut self,
        state: &str,
        transition: &str,
    ) -> Result<Self, BuildError> {
        let state_id = self
            .machine
            .state_by_name(state)
            .map(State::id)
            .ok_or_else(|| BuildError::UnknownState(state.to_string()))?;
        let transition_id = self
            .machine
            .transition_id(transition)
            .ok_or_else(|| BuildError::UnknownTransition(transition.to_string()))?;

        if let Some(state) = self.machine.state_mut(state_id) {
            state.set_error_transition_id(Some(transition_id));
        }
        Ok(self)
    }

    /// Resolve the initial state and validate the finished graph.
    pub fn build(mut self) -> Result<StateMachine, BuildError> {
        if self.machine.states().is_empty() {
            return Err(BuildError::NoStates);
        }

        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let initial_id = self
            .machine
            .state_by_name(&initial)
            .map(State::id)
            .ok_or(BuildError::UnknownState(initial))?;
        self.machine.set_initial_state_code(initial_id);

        if !self.machine.validate() {
            return Err(BuildError::Incoherent(self.machine.name().to_string()));
        }
        Ok(self.machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{Condition, Reservation};

    #[test]
    fn builder_requires_states() {
        let result = StateMachineBuilder::new("Empty").initial("Nowhere").build();
        assert_eq!(result.unwrap_err(), BuildError::NoStates);
    }

    #[test]
    fn builder_requires_initial_state() {
        let result = StateMachineBuilder::new("NoEntry").state("Waiting").build();
        assert_eq!(result.unwrap_err(), BuildError::MissingInitialState);
    }

    #[test]
    fn builder_rejects_unknown_initial_state() {
        let result = StateMachineBuilder::new("Typo")
            .state("Waiting")
            .initial("Wating")
            .build();
        assert_eq!(
            result.unwrap_err(),
            BuildError::UnknownState("Wating".to_string())
        );
    }

    #[test]
    fn builder_rejects_unknown_transition_endpoint() {
        let result = StateMachineBuilder::new("Dangling")
            .state("Waiting")
            .initial("Waiting")
            .transition("Start", "Waiting", "Started");

        assert!(matches!(result, Err(BuildError::UnknownState(name)) if name == "Started"));
    }

    #[test]
    fn fluent_api_builds_validated_machine() {
        let machine = StateMachineBuilder::new("Signoff")
            .version(1)
            .state("Pending")
            .state("Active")
            .finished_state("Complete")
            .initial("Pending")
            .transition("Start", "Pending", "Active")
            .unwrap()
            .transition("Finish", "Active", "Complete")
            .unwrap()
            .build()
            .unwrap();

        assert!(machine.is_coherent());
        assert_eq!(machine.version(), Some(1));
        assert_eq!(machine.initial_state().unwrap().name(), "Pending");
        assert!(machine.state_by_name("Complete").unwrap().is_finished());
    }

    #[test]
    fn transition_with_configures_the_edge() {
        let machine = StateMachineBuilder::new("Gated")
            .state("Waiting")
            .state("Started")
            .initial("Waiting")
            .transition_with("Start", "Waiting", "Started", |transition| {
                transition.set_performing_role("operator");
                transition.set_reservation(Reservation::Set);
                transition.set_enabled_when(Condition::PropertyFlag {
                    property: "ShowTime".to_string(),
                });
            })
            .unwrap()
            .build()
            .unwrap();

        let start = machine.transition_by_name("Start").unwrap();
        assert_eq!(start.reservation(), Reservation::Set);
        assert!(start.enabled_when().is_some());
    }

    #[test]
    fn error_transition_requires_existing_names() {
        let builder = StateMachineBuilder::new("Errors")
            .state("Waiting")
            .state("Started")
            .initial("Waiting")
            .transition("Start", "Waiting", "Started")
            .unwrap();

        let result = builder.error_transition("Waiting", "Rollback");
        assert_eq!(
            result.unwrap_err(),
            BuildError::UnknownTransition("Rollback".to_string())
        );
    }

    #[test]
    fn error_transition_is_recorded_on_the_state() {
        let machine = StateMachineBuilder::new("Errors")
            .state("Waiting")
            .state("Started")
            .initial("Waiting")
            .transition("Start", "Waiting", "Started")
            .unwrap()
            .transition("Reset", "Started", "Waiting")
            .unwrap()
            .error_transition("Started", "Reset")
            .unwrap()
            .build()
            .unwrap();

        let reset = machine.transition_id("Reset").unwrap();
        assert_eq!(machine.error_transition_for_state(1), Some(reset));
    }
}
