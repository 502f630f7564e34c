//! Transition edges of a machine graph.

use super::condition::{Condition, ScriptRegistry};
use super::{StateId, TransitionId};
use crate::activity::{Activity, BuiltInProperty, PropertyBag};
use crate::security::{AgentPath, CheckResult, SecurityPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What firing a transition does to the activity's agent reservation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reservation {
    /// Reserve the activity for the requesting agent.
    Set,
    /// Release any reservation.
    Clear,
    /// Leave the current reservation untouched.
    #[default]
    Preserve,
}

/// Schema-bound payload requirement attached to a transition.
///
/// The schema name may be a `${property}` reference resolved against the
/// activity's property bag at query time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSpec {
    pub schema_name: String,
    pub schema_version: i32,
    #[serde(default)]
    pub required: bool,
}

/// Script executed by the enactment layer when the transition fires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptSpec {
    pub name: String,
    pub version: i32,
}

/// A named edge between two states of a machine.
///
/// A transition's lifecycle is Created (deserialized or factory-built) →
/// Resolved (its origin/target ids checked during the owning machine's
/// `validate()`) → Usable (machine coherent). Transitions are never
/// destroyed independently; they are versioned with their owning machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    id: TransitionId,
    name: String,
    origin_state_id: StateId,
    target_state_id: StateId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    enabled_when: Option<Condition>,

    /// Role an agent must hold to perform this transition. May be a
    /// `${property}` reference; when absent the activity's built-in
    /// agent-role property applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    performing_role: Option<String>,

    #[serde(default)]
    reservation: Reservation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    outcome: Option<OutcomeSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    script: Option<ScriptSpec>,
}

impl Transition {
    pub fn new(
        id: TransitionId,
        name: impl Into<String>,
        origin_state_id: StateId,
        target_state_id: StateId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            origin_state_id,
            target_state_id,
            enabled_when: None,
            performing_role: None,
            reservation: Reservation::default(),
            outcome: None,
            script: None,
        }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin_state_id(&self) -> StateId {
        self.origin_state_id
    }

    pub fn target_state_id(&self) -> StateId {
        self.target_state_id
    }

    pub fn reservation(&self) -> Reservation {
        self.reservation
    }

    pub fn set_reservation(&mut self, reservation: Reservation) {
        self.reservation = reservation;
    }

    pub fn enabled_when(&self) -> Option<&Condition> {
        self.enabled_when.as_ref()
    }

    pub fn set_enabled_when(&mut self, condition: Condition) {
        self.enabled_when = Some(condition);
    }

    pub fn set_performing_role(&mut self, role: impl Into<String>) {
        self.performing_role = Some(role.into());
    }

    pub fn outcome(&self) -> Option<&OutcomeSpec> {
        self.outcome.as_ref()
    }

    pub fn set_outcome(&mut self, outcome: OutcomeSpec) {
        self.outcome = Some(outcome);
    }

    pub fn script(&self) -> Option<&ScriptSpec> {
        self.script.as_ref()
    }

    pub fn set_script(&mut self, script: ScriptSpec) {
        self.script = Some(script);
    }

    /// Check that both endpoint ids resolve to live states. A `false`
    /// return is propagated as incoherence of the owning machine.
    pub fn resolve_states(&self, state_slots: &HashMap<StateId, usize>) -> bool {
        state_slots.contains_key(&self.origin_state_id)
            && state_slots.contains_key(&self.target_state_id)
    }

    /// Whether the transition is applicable in the activity's current
    /// context. A transition with no condition is always enabled.
    pub fn is_enabled(&self, activity: &Activity, scripts: &ScriptRegistry) -> bool {
        match &self.enabled_when {
            Some(condition) => condition.evaluate(activity.properties(), scripts),
            None => true,
        }
    }

    /// Resolve the role an agent must hold to perform this transition.
    ///
    /// A `${property}` reference is looked up in the activity properties;
    /// an unresolvable reference yields no requirement. Transitions
    /// without their own role requirement fall back to the activity's
    /// built-in agent-role property.
    pub fn performing_role(&self, properties: &PropertyBag) -> Option<String> {
        match &self.performing_role {
            Some(raw) => properties.resolve_reference(raw),
            None => properties.built_in_string(BuiltInProperty::AgentRole),
        }
    }

    /// Ask the security policy whether the agent may perform this
    /// transition on the activity.
    ///
    /// Callers decide what a denial means: the listing query excludes the
    /// transition, while `traverse` raises a hard error.
    pub fn check_performing_role(
        &self,
        activity: &Activity,
        agent: &AgentPath,
        policy: &dyn SecurityPolicy,
    ) -> CheckResult {
        let role = self.performing_role(activity.properties());
        policy.check(agent, role.as_deref(), activity, self)
    }

    /// Whether firing this transition involves a schema-bound payload.
    pub fn has_outcome(&self) -> bool {
        self.outcome.is_some()
    }

    /// Whether the payload is mandatory (firing without data is invalid).
    pub fn outcome_required(&self) -> bool {
        self.outcome.as_ref().is_some_and(|outcome| outcome.required)
    }

    /// Resolve the outcome schema reference against the activity
    /// properties, interpolating a `${property}` schema name.
    pub fn resolved_schema(&self, properties: &PropertyBag) -> Option<(String, i32)> {
        let outcome = self.outcome.as_ref()?;
        let name = properties.resolve_reference(&outcome.schema_name)?;
        Some((name, outcome.schema_version))
    }
}
