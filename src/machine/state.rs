//! State nodes of a machine graph.

use super::{StateId, TransitionId};
use serde::{Deserialize, Serialize};

/// A named node in a state machine graph.
///
/// States carry no transition-admission logic of their own; the owning
/// [`StateMachine`](super::StateMachine) resolves outgoing transitions
/// through the index it rebuilds on `validate()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    id: StateId,
    name: String,

    /// Terminal marker: the workflow layer advances to the next vertex
    /// once an activity reaches a finished state.
    #[serde(default)]
    finished: bool,

    /// Transition auto-fired when activity logic fails and error handling
    /// is enabled for the workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_transition_id: Option<TransitionId>,
}

impl State {
    pub fn new(id: StateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            finished: false,
            error_transition_id: None,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn set_finished(&mut self, finished: bool) {
        self.finished = finished;
    }

    pub fn error_transition_id(&self) -> Option<TransitionId> {
        self.error_transition_id
    }

    pub fn set_error_transition_id(&mut self, transition_id: Option<TransitionId>) {
        self.error_transition_id = transition_id;
    }
}
