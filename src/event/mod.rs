//! Transition event records.
//!
//! Every committed transition produces a [`TransitionEvent`]; an
//! [`EventLog`] is the append-only record the enclosing transaction layer
//! persists alongside the activity. The log is immutable (`record`
//! returns a new log), so a failed transaction can simply drop its copy.

use crate::machine::{StateId, TransitionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of one committed transition on one workflow step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub agent: String,
    pub step_name: String,
    pub step_path: String,
    pub transition_id: TransitionId,
    pub origin_state_id: StateId,
    pub target_state_id: StateId,
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of committed transitions.
///
/// # Example
///
/// ```rust
/// use workstate::event::{EventLog, TransitionEvent};
/// use chrono::Utc;
///
/// let log = EventLog::new();
/// let log = log.record(TransitionEvent {
///     agent: "alice".to_string(),
///     step_name: "Review".to_string(),
///     step_path: "workflow/Review".to_string(),
///     transition_id: 0,
///     origin_state_id: 0,
///     target_state_id: 1,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(log.state_path(), vec![0, 1]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<TransitionEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning a new log; the original is unchanged.
    pub fn record(&self, event: TransitionEvent) -> Self {
        let mut events = self.events.clone();
        events.push(event);
        Self { events }
    }

    pub fn events(&self) -> &[TransitionEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&TransitionEvent> {
        self.events.last()
    }

    /// The state codes traversed: the first event's origin followed by
    /// every event's target.
    pub fn state_path(&self) -> Vec<StateId> {
        let mut path = Vec::new();
        if let Some(first) = self.events.first() {
            path.push(first.origin_state_id);
        }
        for event in &self.events {
            path.push(event.target_state_id);
        }
        path
    }

    /// Elapsed time between the first and last event, `None` for an
    /// empty log.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.events.first()?, self.events.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }
}
