//! The standard machines shipped with the platform.
//!
//! These are the descriptions the default-machine settings point at;
//! [`MachineCache::with_presets`](super::MachineCache::with_presets)
//! publishes all three at version 0.

use crate::builder::StateMachineBuilder;
use crate::machine::{Condition, OutcomeSpec, Reservation, StateMachine};

/// The "Default" elementary lifecycle:
/// Waiting → Started → Finished, with suspension gated behind the
/// `ShowTime` activity flag and a `Done` shortcut for one-shot steps.
pub fn default_machine() -> StateMachine {
    StateMachineBuilder::new("Default")
        .version(0)
        .state("Waiting")
        .state("Started")
        .state("Suspended")
        .finished_state("Finished")
        .initial("Waiting")
        .transition_with("Done", "Waiting", "Finished", |transition| {
            transition.set_outcome(OutcomeSpec {
                schema_name: "${SchemaType}".to_string(),
                schema_version: 0,
                required: false,
            });
        })
        .expect("Default machine states are defined")
        .transition_with("Start", "Waiting", "Started", |transition| {
            transition.set_reservation(Reservation::Set);
        })
        .expect("Default machine states are defined")
        .transition_with("Complete", "Started", "Finished", |transition| {
            transition.set_reservation(Reservation::Clear);
            transition.set_outcome(OutcomeSpec {
                schema_name: "${SchemaType}".to_string(),
                schema_version: 0,
                required: false,
            });
        })
        .expect("Default machine states are defined")
        .transition_with("Suspend", "Started", "Suspended", |transition| {
            transition.set_enabled_when(Condition::PropertyFlag {
                property: "ShowTime".to_string(),
            });
        })
        .expect("Default machine states are defined")
        .transition("Resume", "Suspended", "Started")
        .expect("Default machine states are defined")
        .build()
        .expect("Default machine is coherent")
}

/// The "CompositeActivity" lifecycle: like the elementary one but with
/// an `Abort` exit from the running state instead of suspension.
pub fn composite_machine() -> StateMachine {
    StateMachineBuilder::new("CompositeActivity")
        .version(0)
        .state("Waiting")
        .state("Started")
        .finished_state("Finished")
        .finished_state("Aborted")
        .initial("Waiting")
        .transition_with("Start", "Waiting", "Started", |transition| {
            transition.set_reservation(Reservation::Set);
        })
        .expect("CompositeActivity machine states are defined")
        .transition_with("Complete", "Started", "Finished", |transition| {
            transition.set_reservation(Reservation::Clear);
        })
        .expect("CompositeActivity machine states are defined")
        .transition_with("Abort", "Started", "Aborted", |transition| {
            transition.set_reservation(Reservation::Clear);
        })
        .expect("CompositeActivity machine states are defined")
        .build()
        .expect("CompositeActivity machine is coherent")
}

/// The "PredefinedStep" lifecycle: a single always-available state with
/// an instantaneous `Done` self-transition carrying a mandatory payload.
pub fn predefined_machine() -> StateMachine {
    StateMachineBuilder::new("PredefinedStep")
        .version(0)
        .finished_state("Available")
        .initial("Available")
        .transition_with("Done", "Available", "Available", |transition| {
            transition.set_outcome(OutcomeSpec {
                schema_name: "${SchemaType}".to_string(),
                schema_version: 0,
                required: true,
            });
        })
        .expect("PredefinedStep machine states are defined")
        .build()
        .expect("PredefinedStep machine is coherent")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Activity;
    use crate::security::{AgentPath, RolePolicy};

    #[test]
    fn presets_are_coherent() {
        assert!(default_machine().is_coherent());
        assert!(composite_machine().is_coherent());
        assert!(predefined_machine().is_coherent());
    }

    #[test]
    fn default_machine_starts_in_waiting() {
        let machine = default_machine();
        assert_eq!(machine.initial_state().unwrap().name(), "Waiting");
        assert!(machine.state_by_name("Finished").unwrap().is_finished());
    }

    #[test]
    fn waiting_offers_done_and_start() {
        let machine = default_machine();
        let activity = Activity::new("Step", "workflow/Step");
        let agent = AgentPath::new("alice");

        let names: Vec<&str> = machine
            .possible_transitions(&activity, &agent, &RolePolicy)
            .unwrap()
            .iter()
            .map(|transition| transition.name())
            .collect();

        assert_eq!(names, vec!["Done", "Start"]);
    }

    #[test]
    fn suspend_is_hidden_without_show_time() {
        let machine = default_machine();
        let agent = AgentPath::new("alice");

        let mut activity = Activity::new("Step", "workflow/Step");
        activity.set_state(machine.state_by_name("Started").unwrap().id());

        let names: Vec<&str> = machine
            .possible_transitions(&activity, &agent, &RolePolicy)
            .unwrap()
            .iter()
            .map(|transition| transition.name())
            .collect();
        assert_eq!(names, vec!["Complete"]);

        activity.properties_mut().insert("ShowTime", true);
        let names: Vec<&str> = machine
            .possible_transitions(&activity, &agent, &RolePolicy)
            .unwrap()
            .iter()
            .map(|transition| transition.name())
            .collect();
        assert_eq!(names, vec!["Complete", "Suspend"]);
    }

    #[test]
    fn predefined_done_loops_and_requires_outcome() {
        let machine = predefined_machine();
        let done = machine.transition_by_name("Done").unwrap();

        assert_eq!(done.origin_state_id(), done.target_state_id());
        assert!(done.outcome_required());
    }
}
