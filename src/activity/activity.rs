//! Workflow activities: the unit of work a state machine governs.

use super::properties::{BuiltInProperty, PropertyBag};
use crate::description::MachineCache;
use crate::event::TransitionEvent;
use crate::job::Job;
use crate::machine::{
    Error, Reservation, Result, StateId, StateMachine, TransitionId,
};
use crate::security::{AgentPath, SecurityPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A single step in an item's workflow, bound to a state machine
/// description, holding a current state code and a property bag.
///
/// The machine never mutates an activity; [`Activity::request`] is the
/// commit step that writes the state computed by `traverse` back, applies
/// the transition's reservation and stamps the state date.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Activity {
    name: String,
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_name: Option<String>,

    /// Unset until first queried, then resolved to the machine's initial
    /// state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<StateId>,

    #[serde(default)]
    active: bool,

    state_date: DateTime<Utc>,

    #[serde(default)]
    properties: PropertyBag,
}

impl Activity {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            type_name: None,
            state: None,
            active: false,
            state_date: Utc::now(),
            properties: PropertyBag::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn set_type_name(&mut self, type_name: impl Into<String>) {
        self.type_name = Some(type_name.into());
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn state_date(&self) -> DateTime<Utc> {
        self.state_date
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyBag {
        &mut self.properties
    }

    /// The raw stored state code, if one has been committed yet.
    pub fn state(&self) -> Option<StateId> {
        self.state
    }

    pub fn set_state(&mut self, state: StateId) {
        self.state = Some(state);
    }

    /// Current state code, defaulting to the machine's initial state for
    /// an activity that has never transitioned.
    pub fn state_code(&self, machine: &StateMachine) -> StateId {
        self.state.unwrap_or_else(|| machine.initial_state_code())
    }

    pub fn state_name<'m>(&self, machine: &'m StateMachine) -> Result<&'m str> {
        let code = self.state_code(machine);
        machine
            .state(code)
            .map(|state| state.name())
            .ok_or_else(|| Error::not_found("state", code))
    }

    pub fn is_finished(&self, machine: &StateMachine) -> Result<bool> {
        let code = self.state_code(machine);
        machine
            .state(code)
            .map(|state| state.is_finished())
            .ok_or_else(|| Error::not_found("state", code))
    }

    /// Error transition configured for the current state, if any.
    pub fn error_transition_id(&self, machine: &StateMachine) -> Option<TransitionId> {
        machine.error_transition_for_state(self.state_code(machine))
    }

    /// Resolve the machine governing this activity from its properties
    /// (machine name and version, with the platform defaults).
    pub fn machine(&self, cache: &MachineCache) -> Result<Arc<StateMachine>> {
        let name = self
            .properties
            .built_in_string(BuiltInProperty::StateMachineName)
            .unwrap_or_else(|| "Default".to_string());
        let version = self
            .properties
            .get_i64(BuiltInProperty::StateMachineVersion.name())
            .unwrap_or(0) as i32;
        cache.get(&name, version)
    }

    /// Build the job offers for an agent from the currently legal
    /// transitions. Inactive activities yield jobs only when explicitly
    /// requested.
    pub fn calculate_jobs(
        &self,
        machine: &StateMachine,
        item: Uuid,
        agent: &AgentPath,
        policy: &dyn SecurityPolicy,
        include_inactive: bool,
    ) -> Result<Vec<Job>> {
        if !self.active && !include_inactive {
            return Ok(Vec::new());
        }

        let jobs = machine
            .possible_transitions(self, agent, policy)?
            .into_iter()
            .map(|transition| Job::new(self, item, transition, agent))
            .collect();
        Ok(jobs)
    }

    /// Fire a transition and commit the result on this activity.
    ///
    /// Looks up the transition, enforces its outcome requirement, asks
    /// the machine to [`traverse`](StateMachine::traverse) (which
    /// performs the strict origin and role checks), and only then writes
    /// the new state, applies the reservation and stamps the state date.
    /// The returned event is for the caller's event log; on error the
    /// activity is left untouched.
    pub fn request(
        &mut self,
        machine: &StateMachine,
        agent: &AgentPath,
        transition_id: TransitionId,
        outcome_data: Option<&str>,
        policy: &dyn SecurityPolicy,
    ) -> Result<TransitionEvent> {
        tracing::trace!(
            activity = %self.name,
            path = %self.path,
            transition_id,
            agent = %agent.name(),
            "transition requested"
        );

        let transition = machine
            .transition(transition_id)
            .ok_or_else(|| Error::not_found("transition", transition_id))?;

        if transition.has_outcome()
            && transition.outcome_required()
            && outcome_data.map_or(true, |data| data.trim().is_empty())
        {
            return Err(Error::InvalidData(
                "Transition requires outcome data, but none was given".to_string(),
            ));
        }

        let origin_state_id = self.state_code(machine);
        let target_state_id = machine.traverse(self, transition, agent, policy)?.id();

        self.set_state(target_state_id);
        match transition.reservation() {
            Reservation::Set => self
                .properties
                .set_built_in(BuiltInProperty::AgentName, agent.name()),
            Reservation::Clear => {
                self.properties.remove_built_in(BuiltInProperty::AgentName);
            }
            Reservation::Preserve => {}
        }
        self.state_date = Utc::now();

        Ok(TransitionEvent {
            agent: agent.name().to_string(),
            step_name: self.name.clone(),
            step_path: self.path.clone(),
            transition_id,
            origin_state_id,
            target_state_id,
            timestamp: self.state_date,
        })
    }
}
