//! Pending-work records offered to agents.

use crate::activity::{Activity, BuiltInProperty, PropertyBag};
use crate::machine::{StateMachine, Transition, TransitionId};
use crate::security::AgentPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted offer of one permitted transition on one activity for one
/// agent.
///
/// Jobs snapshot the activity properties at creation time so an agent's
/// work list stays meaningful even while the activity moves on; the
/// transition itself is re-resolved against the owning machine when the
/// job is taken up.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Job {
    item: Uuid,
    step_name: String,
    step_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    step_type: Option<String>,
    transition_id: TransitionId,
    transition_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent_role: Option<String>,
    act_props: PropertyBag,
    creation_date: DateTime<Utc>,
}

impl Job {
    /// Create a job during workflow enactment.
    pub fn new(activity: &Activity, item: Uuid, transition: &Transition, agent: &AgentPath) -> Self {
        Self {
            item,
            step_name: activity.name().to_string(),
            step_path: activity.path().to_string(),
            step_type: activity.type_name().map(str::to_string),
            transition_id: transition.id(),
            transition_name: transition.name().to_string(),
            agent_name: Some(agent.name().to_string()),
            agent_role: transition.performing_role(activity.properties()),
            act_props: activity.properties().clone(),
            creation_date: Utc::now(),
        }
    }

    pub fn item(&self) -> Uuid {
        self.item
    }

    pub fn step_name(&self) -> &str {
        &self.step_name
    }

    pub fn step_path(&self) -> &str {
        &self.step_path
    }

    pub fn step_type(&self) -> Option<&str> {
        self.step_type.as_deref()
    }

    pub fn transition_id(&self) -> TransitionId {
        self.transition_id
    }

    pub fn transition_name(&self) -> &str {
        &self.transition_name
    }

    pub fn agent_name(&self) -> Option<&str> {
        self.agent_name.as_deref()
    }

    pub fn agent_role(&self) -> Option<&str> {
        self.agent_role.as_deref()
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.act_props
    }

    pub fn creation_date(&self) -> DateTime<Utc> {
        self.creation_date
    }

    /// Re-resolve the offered transition against the governing machine.
    pub fn transition<'m>(&self, machine: &'m StateMachine) -> Option<&'m Transition> {
        machine.transition(self.transition_id)
    }

    /// Whether taking this job up requires a validated payload.
    pub fn outcome_required(&self, machine: &StateMachine) -> bool {
        self.transition(machine)
            .is_some_and(Transition::outcome_required)
    }

    /// Outcome schema reference resolved against the snapshotted
    /// activity properties.
    pub fn schema(&self, machine: &StateMachine) -> Option<(String, i32)> {
        self.transition(machine)?.resolved_schema(&self.act_props)
    }

    pub fn description(&self) -> String {
        self.act_props
            .built_in_string(BuiltInProperty::Description)
            .unwrap_or_else(|| "No Description".to_string())
    }
}

/// Jobs are equal when they offer the same transition on the same step
/// of the same item, regardless of when they were created.
impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.item == other.item
            && self.step_path == other.step_path
            && self.transition_name == other.transition_name
    }
}

impl Eq for Job {}
