//! The state machine description object.

use super::condition::ScriptRegistry;
use super::error::{Error, Result};
use super::state::State;
use super::transition::Transition;
use super::{StateId, TransitionId};
use crate::activity::{Activity, PropertyBag};
use crate::security::{AgentPath, CheckResult, SecurityPolicy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Lookup tables rebuilt by [`StateMachine::validate`].
///
/// The index is recomputed as a whole and swapped in only when the graph
/// is coherent, so query methods never observe a half-built table.
#[derive(Clone, Debug, Default)]
struct MachineIndex {
    state_slots: HashMap<StateId, usize>,
    transition_slots: HashMap<TransitionId, usize>,
    /// Outgoing transitions per state, keyed by transition id so listing
    /// order is ascending id order.
    outgoing: HashMap<StateId, BTreeMap<TransitionId, usize>>,
    initial_slot: usize,
}

/// An immutable-after-validation directed graph of [`State`] nodes and
/// [`Transition`] edges, identified by integer codes and versioned by
/// (name, version).
///
/// A machine is a shared description consulted by many activity
/// instances; it never owns or mutates an [`Activity`]. The two query
/// operations are intentionally asymmetric: [`possible_transitions`]
/// filters permissively (a forbidden or disabled option is dropped, never
/// an error) while [`traverse`] validates strictly (a stale origin state
/// or a denied role check fails loudly).
///
/// [`possible_transitions`]: StateMachine::possible_transitions
/// [`traverse`]: StateMachine::traverse
///
/// # Example
///
/// ```rust
/// use workstate::builder::StateMachineBuilder;
/// use workstate::security::{AgentPath, RolePolicy};
/// use workstate::Activity;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let machine = StateMachineBuilder::new("Signoff")
///     .state("Pending")
///     .state("Active")
///     .finished_state("Complete")
///     .initial("Pending")
///     .transition("Start", "Pending", "Active")?
///     .transition("Finish", "Active", "Complete")?
///     .build()?;
///
/// let activity = Activity::new("Review", "workflow/Review");
/// let agent = AgentPath::new("alice");
///
/// let possible = machine.possible_transitions(&activity, &agent, &RolePolicy)?;
/// assert_eq!(possible.len(), 1);
/// assert_eq!(possible[0].name(), "Start");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateMachine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<i32>,
    /// Identity of the description item this machine was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item: Option<Uuid>,

    #[serde(default)]
    initial_state_code: StateId,
    #[serde(default)]
    states: Vec<State>,
    #[serde(default)]
    transitions: Vec<Transition>,

    /// Present only while the machine is coherent; dropped on any
    /// structural edit.
    #[serde(skip)]
    index: Option<MachineIndex>,

    #[serde(skip)]
    next_state_id: Option<StateId>,
    #[serde(skip)]
    next_transition_id: Option<TransitionId>,

    /// Expression predicates registered by the host at load time.
    #[serde(skip)]
    scripts: ScriptRegistry,
}

impl StateMachine {
    pub fn new(name: impl Into<String>, version: Option<i32>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            version,
            item: None,
            initial_state_code: 0,
            states: Vec::new(),
            transitions: Vec::new(),
            index: None,
            next_state_id: None,
            next_transition_id: None,
            scripts: ScriptRegistry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = Some(namespace.into());
    }

    pub fn version(&self) -> Option<i32> {
        self.version
    }

    pub fn set_version(&mut self, version: i32) {
        self.version = Some(version);
    }

    pub fn item(&self) -> Option<Uuid> {
        self.item
    }

    pub fn set_item(&mut self, item: Uuid) {
        self.item = Some(item);
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn initial_state_code(&self) -> StateId {
        self.initial_state_code
    }

    /// Point the machine at a new initial state. The machine must be
    /// re-validated before further queries.
    pub fn set_initial_state_code(&mut self, code: StateId) {
        self.initial_state_code = code;
        self.index = None;
    }

    pub fn is_coherent(&self) -> bool {
        self.index.is_some()
    }

    /// Expression predicates available to enablement conditions.
    pub fn scripts(&self) -> &ScriptRegistry {
        &self.scripts
    }

    /// Register a predicate backing a `Condition::Expression` of this
    /// machine. Expressions are resolved at load time, before the machine
    /// is published for querying.
    pub fn register_expression<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&PropertyBag) -> bool + Send + Sync + 'static,
    {
        self.scripts.register(name, predicate);
    }

    /// Computes the next state id. After deserialization the counter is
    /// seeded from the maximum existing id, so ids stay unique even when
    /// the loaded machine's ids were not contiguous.
    fn next_state_id(&mut self) -> StateId {
        let next = self.next_state_id.unwrap_or_else(|| {
            self.states
                .iter()
                .map(State::id)
                .max()
                .map_or(0, |max| max + 1)
        });
        self.next_state_id = Some(next + 1);
        next
    }

    fn next_transition_id(&mut self) -> TransitionId {
        let next = self.next_transition_id.unwrap_or_else(|| {
            self.transitions
                .iter()
                .map(Transition::id)
                .max()
                .map_or(0, |max| max + 1)
        });
        self.next_transition_id = Some(next + 1);
        next
    }

    /// Factory method to create a new state with the next unused id. It
    /// does not check whether the name is already taken.
    pub fn create_state(&mut self, name: impl Into<String>) -> StateId {
        let id = self.next_state_id();
        let name = name.into();
        tracing::debug!(state = %name, id, "created state");
        self.states.push(State::new(id, name));
        self.index = None;
        id
    }

    /// Factory method to create a new transition with the next unused id.
    pub fn create_transition(
        &mut self,
        name: impl Into<String>,
        origin_state_id: StateId,
        target_state_id: StateId,
    ) -> TransitionId {
        let id = self.next_transition_id();
        let name = name.into();
        tracing::debug!(transition = %name, id, origin_state_id, target_state_id, "created transition");
        self.transitions
            .push(Transition::new(id, name, origin_state_id, target_state_id));
        self.index = None;
        id
    }

    /// Replace the state list and re-validate. Returns coherence.
    pub fn set_states(&mut self, states: Vec<State>) -> bool {
        self.states = states;
        self.next_state_id = None;
        self.validate()
    }

    /// Replace the transition list and re-validate. Returns coherence.
    pub fn set_transitions(&mut self, transitions: Vec<Transition>) -> bool {
        self.transitions = transitions;
        self.next_transition_id = None;
        self.validate()
    }

    /// Mutable access for description authoring. The machine must be
    /// re-validated before further queries.
    pub fn state_mut(&mut self, id: StateId) -> Option<&mut State> {
        self.index = None;
        self.states.iter_mut().find(|state| state.id() == id)
    }

    /// Mutable access for description authoring. The machine must be
    /// re-validated before further queries.
    pub fn transition_mut(&mut self, id: TransitionId) -> Option<&mut Transition> {
        self.index = None;
        self.transitions
            .iter_mut()
            .find(|transition| transition.id() == id)
    }

    /// Rebuild the id index from the current state/transition lists,
    /// resolving the initial state and every transition's endpoints.
    ///
    /// Returns (and records) whether the machine is coherent. Callers
    /// must check this before using the machine to drive execution. Not
    /// safe against concurrent structural edits; safe for concurrent
    /// read-only queries once published.
    pub fn validate(&mut self) -> bool {
        tracing::debug!(name = %self.name, "validating state machine");

        let mut index = MachineIndex::default();
        let mut coherent = true;

        for (slot, state) in self.states.iter().enumerate() {
            if index.state_slots.insert(state.id(), slot).is_some() {
                tracing::warn!(name = %self.name, state = state.id(), "duplicate state id");
                coherent = false;
            }
        }

        match index.state_slots.get(&self.initial_state_code) {
            Some(&slot) => index.initial_slot = slot,
            None => coherent = false,
        }

        for (slot, transition) in self.transitions.iter().enumerate() {
            if index
                .transition_slots
                .insert(transition.id(), slot)
                .is_some()
            {
                tracing::warn!(
                    name = %self.name,
                    transition = transition.id(),
                    "duplicate transition id"
                );
                coherent = false;
            }

            if transition.resolve_states(&index.state_slots) {
                index
                    .outgoing
                    .entry(transition.origin_state_id())
                    .or_default()
                    .insert(transition.id(), slot);
            } else {
                tracing::warn!(
                    name = %self.name,
                    transition = %transition.name(),
                    "transition references an unknown state"
                );
                coherent = false;
            }
        }

        self.index = coherent.then_some(index);
        coherent
    }

    fn coherent_index(&self) -> Result<&MachineIndex> {
        self.index
            .as_ref()
            .ok_or_else(|| Error::incoherent(&self.name))
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        match &self.index {
            Some(index) => index.state_slots.get(&id).map(|&slot| &self.states[slot]),
            None => self.states.iter().find(|state| state.id() == id),
        }
    }

    pub fn state_by_name(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|state| state.name() == name)
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        match &self.index {
            Some(index) => index
                .transition_slots
                .get(&id)
                .map(|&slot| &self.transitions[slot]),
            None => self
                .transitions
                .iter()
                .find(|transition| transition.id() == id),
        }
    }

    pub fn transition_by_name(&self, name: &str) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|transition| transition.name() == name)
    }

    pub fn transition_id(&self, name: &str) -> Option<TransitionId> {
        self.transition_by_name(name).map(Transition::id)
    }

    /// Transition id for a name that must exist.
    pub fn valid_transition_id(&self, name: &str) -> Result<TransitionId> {
        self.transition_id(name).ok_or_else(|| {
            Error::InvalidData(format!(
                "Transition name '{name}' was not found in StateMachine '{}'",
                self.name
            ))
        })
    }

    /// The resolved initial state; requires a coherent machine.
    pub fn initial_state(&self) -> Option<&State> {
        self.index
            .as_ref()
            .map(|index| &self.states[index.initial_slot])
    }

    /// Outgoing transitions of a state in ascending transition-id order.
    /// Empty when the state has none or the machine is not coherent.
    pub fn outgoing(&self, state_id: StateId) -> Vec<&Transition> {
        match &self.index {
            Some(index) => index
                .outgoing
                .get(&state_id)
                .map(|transitions| {
                    transitions
                        .values()
                        .map(|&slot| &self.transitions[slot])
                        .collect()
                })
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// The transition auto-fired when activity logic fails in the given
    /// state, if error handling is configured for it.
    pub fn error_transition_for_state(&self, state_id: StateId) -> Option<TransitionId> {
        self.state(state_id).and_then(State::error_transition_id)
    }

    /// List the transitions the agent may legally perform on the activity
    /// from its current state.
    ///
    /// Filtering is permissive: a disabled transition is skipped with a
    /// trace log, a denied one with a debug log. Only structural problems
    /// (incoherent machine, unknown state code) are errors, so listing
    /// options never fails merely because one option is forbidden.
    pub fn possible_transitions(
        &self,
        activity: &Activity,
        agent: &AgentPath,
        policy: &dyn SecurityPolicy,
    ) -> Result<Vec<&Transition>> {
        let index = self.coherent_index()?;

        let code = activity.state_code(self);
        let current = self
            .state(code)
            .ok_or_else(|| Error::not_found("state", code))?;

        let mut possible = Vec::new();

        if let Some(outgoing) = index.outgoing.get(&current.id()) {
            for &slot in outgoing.values() {
                let transition = &self.transitions[slot];

                if !transition.is_enabled(activity, &self.scripts) {
                    tracing::trace!(
                        transition = %transition.name(),
                        activity = %activity.name(),
                        "transition disabled"
                    );
                    continue;
                }

                match transition.check_performing_role(activity, agent, policy) {
                    CheckResult::Allowed => possible.push(transition),
                    CheckResult::Denied { reason } => {
                        tracing::debug!(
                            transition = %transition.name(),
                            agent = %agent.name(),
                            %reason,
                            "transition not possible"
                        );
                    }
                }
            }
        }

        Ok(possible)
    }

    /// Compute the state the activity moves to by firing `transition`.
    ///
    /// This is the authoritative check: the transition's origin must
    /// match the activity's current resolved state (otherwise
    /// [`Error::InvalidTransition`], a stale read between listing and
    /// firing), and the performing-role check must pass (otherwise
    /// [`Error::AccessDenied`], even if the same transition appeared in
    /// an earlier listing). The activity itself is not mutated; the
    /// caller commits the new state under its own transaction.
    pub fn traverse(
        &self,
        activity: &Activity,
        transition: &Transition,
        agent: &AgentPath,
        policy: &dyn SecurityPolicy,
    ) -> Result<&State> {
        self.coherent_index()?;

        let code = activity.state_code(self);
        let current = self
            .state(code)
            .ok_or_else(|| Error::not_found("state", code))?;

        if transition.origin_state_id() != current.id() {
            return Err(Error::InvalidTransition {
                transition: transition.name().to_string(),
                state: current.name().to_string(),
            });
        }

        if let CheckResult::Denied { reason } =
            transition.check_performing_role(activity, agent, policy)
        {
            return Err(Error::AccessDenied {
                agent: agent.name().to_string(),
                transition: transition.name().to_string(),
                reason,
            });
        }

        self.state(transition.target_state_id())
            .ok_or_else(|| Error::incoherent(&self.name))
    }
}
