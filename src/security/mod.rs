//! Agent identity and permission checking.
//!
//! The engine never decides permissions itself; it asks a
//! [`SecurityPolicy`] and acts on the returned [`CheckResult`]. A denial
//! is an expected, frequent outcome: the listing query filters on it,
//! and only the authoritative traversal turns it into a hard error.

use crate::activity::Activity;
use crate::machine::Transition;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated actor (human or service) capable of requesting
/// transitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentPath {
    uuid: Uuid,
    name: String,
    #[serde(default)]
    roles: Vec<String>,
}

impl AgentPath {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_roles<I, R>(name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let mut agent = Self::new(name);
        agent.roles = roles.into_iter().map(Into::into).collect();
        agent
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn add_role(&mut self, role: impl Into<String>) {
        self.roles.push(role.into());
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|held| held == role)
    }
}

/// Outcome of a permission check.
#[derive(Clone, Debug, PartialEq)]
pub enum CheckResult {
    Allowed,
    Denied { reason: String },
}

impl CheckResult {
    pub fn denied(reason: impl Into<String>) -> Self {
        CheckResult::Denied {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, CheckResult::Allowed)
    }
}

/// Decides whether an agent may perform a transition on an activity.
///
/// Implementations may consult external role stores or permission
/// matrices; calls are synchronous and should be quick, since they run
/// inside both listing and traversal.
pub trait SecurityPolicy: Send + Sync {
    fn check(
        &self,
        agent: &AgentPath,
        required_role: Option<&str>,
        activity: &Activity,
        transition: &Transition,
    ) -> CheckResult;
}

/// Default policy: a transition with no resolved role requirement is open
/// to any agent; otherwise the agent must hold the named role.
#[derive(Clone, Copy, Debug, Default)]
pub struct RolePolicy;

impl SecurityPolicy for RolePolicy {
    fn check(
        &self,
        agent: &AgentPath,
        required_role: Option<&str>,
        _activity: &Activity,
        _transition: &Transition,
    ) -> CheckResult {
        match required_role {
            None => CheckResult::Allowed,
            Some(role) if agent.has_role(role) => CheckResult::Allowed,
            Some(role) => CheckResult::denied(format!(
                "agent '{}' does not hold role '{role}'",
                agent.name()
            )),
        }
    }
}
