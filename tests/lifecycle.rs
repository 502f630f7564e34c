//! Integration scenarios: listing, firing, job refresh and the standard
//! machines end to end.

use uuid::Uuid;
use workstate::activity::BuiltInProperty;
use workstate::builder::StateMachineBuilder;
use workstate::machine::Error;
use workstate::security::{AgentPath, RolePolicy};
use workstate::{Activity, EventLog, JobList, MachineCache, StateMachine};

/// Pending(0) --Start--> Active(1) --Finish--> Complete(2)
fn signoff_machine() -> StateMachine {
    StateMachineBuilder::new("Signoff")
        .version(0)
        .state("Pending")
        .state("Active")
        .finished_state("Complete")
        .initial("Pending")
        .transition("Start", "Pending", "Active")
        .unwrap()
        .transition("Finish", "Active", "Complete")
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn pending_activity_only_offers_start() {
    let machine = signoff_machine();
    let activity = Activity::new("Review", "workflow/Review");
    let agent = AgentPath::new("alice");

    let names: Vec<&str> = machine
        .possible_transitions(&activity, &agent, &RolePolicy)
        .unwrap()
        .iter()
        .map(|transition| transition.name())
        .collect();

    assert_eq!(names, vec!["Start"]);
}

#[test]
fn firing_finish_from_pending_is_invalid() {
    let machine = signoff_machine();
    let activity = Activity::new("Review", "workflow/Review");
    let agent = AgentPath::new("alice");
    let finish = machine.transition_by_name("Finish").unwrap();

    let err = machine
        .traverse(&activity, finish, &agent, &RolePolicy)
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Transition Finish not valid from state Pending"
    );
}

#[test]
fn listing_then_firing_race_is_detected() {
    let machine = signoff_machine();
    let mut activity = Activity::new("Review", "workflow/Review");
    let alice = AgentPath::new("alice");
    let bob = AgentPath::new("bob");

    // Bob lists his options while the activity is Pending.
    let bobs_options = machine
        .possible_transitions(&activity, &bob, &RolePolicy)
        .unwrap();
    let stale_start = bobs_options[0].id();

    // Alice fires Start first.
    let start = machine.transition_id("Start").unwrap();
    activity
        .request(&machine, &alice, start, None, &RolePolicy)
        .unwrap();

    // Bob's stale listing must not go through.
    let err = activity
        .request(&machine, &bob, stale_start, None, &RolePolicy)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
    assert_eq!(activity.state_name(&machine).unwrap(), "Active");
}

#[test]
fn denied_agent_fails_traverse_even_after_listing() {
    let machine = StateMachineBuilder::new("Restricted")
        .state("Pending")
        .state("Active")
        .initial("Pending")
        .transition_with("Start", "Pending", "Active", |transition| {
            transition.set_performing_role("operator");
        })
        .unwrap()
        .build()
        .unwrap();

    let activity = Activity::new("Review", "workflow/Review");
    let mut operator = AgentPath::with_roles("olga", ["operator"]);
    let start = machine.transition_by_name("Start").unwrap();

    // Listed while the agent still held the role...
    assert_eq!(
        machine
            .possible_transitions(&activity, &operator, &RolePolicy)
            .unwrap()
            .len(),
        1
    );

    // ...but the authoritative check runs against the agent as it is now.
    operator = AgentPath::new("olga");
    let err = machine
        .traverse(&activity, start, &operator, &RolePolicy)
        .unwrap_err();
    assert!(matches!(err, Error::AccessDenied { .. }));
}

#[test]
fn default_machine_runs_a_full_lifecycle() {
    let cache = MachineCache::with_presets();
    let mut activity = Activity::new("Review", "workflow/Review");
    activity
        .properties_mut()
        .set_built_in(BuiltInProperty::StateMachineName, "Default");

    let machine = activity.machine(&cache).unwrap();
    let agent = AgentPath::new("alice");
    let mut log = EventLog::new();

    assert_eq!(activity.state_name(&machine).unwrap(), "Waiting");

    let start = machine.transition_id("Start").unwrap();
    let event = activity
        .request(&machine, &agent, start, None, &RolePolicy)
        .unwrap();
    log = log.record(event);

    // Start reserves the activity for the requesting agent.
    assert_eq!(activity.state_name(&machine).unwrap(), "Started");
    assert_eq!(
        activity
            .properties()
            .built_in_string(BuiltInProperty::AgentName),
        Some("alice".to_string())
    );

    let complete = machine.transition_id("Complete").unwrap();
    let event = activity
        .request(&machine, &agent, complete, Some("<Report/>"), &RolePolicy)
        .unwrap();
    log = log.record(event);

    assert!(activity.is_finished(&machine).unwrap());
    // Complete releases the reservation again.
    assert_eq!(
        activity
            .properties()
            .built_in_string(BuiltInProperty::AgentName),
        None
    );

    let finished = machine.state_by_name("Finished").unwrap().id();
    let waiting = machine.state_by_name("Waiting").unwrap().id();
    let started = machine.state_by_name("Started").unwrap().id();
    assert_eq!(log.state_path(), vec![waiting, started, finished]);
}

#[test]
fn job_lists_are_refreshed_on_state_change() {
    let cache = MachineCache::with_presets();
    let mut activity = Activity::new("Review", "workflow/Review");
    activity.set_active(true);

    let machine = activity.machine(&cache).unwrap();
    let agent = AgentPath::new("alice");
    let item = Uuid::new_v4();
    let mut list = JobList::new(agent.uuid());

    // Offer the Waiting-state transitions.
    for job in activity
        .calculate_jobs(&machine, item, &agent, &RolePolicy, false)
        .unwrap()
    {
        list.add_job(job);
    }
    assert_eq!(list.len(), 2); // Done and Start

    // The activity moves on; stale offers are replaced.
    let start = machine.transition_id("Start").unwrap();
    activity
        .request(&machine, &agent, start, None, &RolePolicy)
        .unwrap();

    list.remove_jobs_for_step(item, activity.path());
    assert!(list.is_empty());

    for job in activity
        .calculate_jobs(&machine, item, &agent, &RolePolicy, false)
        .unwrap()
    {
        list.add_job(job);
    }

    let offered: Vec<&str> = list
        .iter()
        .map(|(_, job)| job.transition_name())
        .collect();
    assert_eq!(offered, vec!["Complete"]);
}

#[test]
fn expression_conditions_gate_listing_through_the_registry() {
    let mut machine = signoff_machine();
    let start = machine.transition_id("Start").unwrap();
    machine
        .transition_mut(start)
        .unwrap()
        .set_enabled_when(workstate::Condition::Expression {
            name: "reviewer_assigned".to_string(),
        });
    machine.register_expression("reviewer_assigned", |properties| {
        properties.get("Reviewer").is_some()
    });
    machine.validate();

    let agent = AgentPath::new("alice");
    let mut activity = Activity::new("Review", "workflow/Review");

    assert!(machine
        .possible_transitions(&activity, &agent, &RolePolicy)
        .unwrap()
        .is_empty());

    activity.properties_mut().insert("Reviewer", "ines");
    assert_eq!(
        machine
            .possible_transitions(&activity, &agent, &RolePolicy)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn cached_descriptions_behave_like_their_source() {
    let machine = signoff_machine();
    let data = serde_json::to_string(&machine).unwrap();

    let cache = MachineCache::new();
    let loaded = cache.load("Signoff", 4, &data).unwrap();

    let activity = Activity::new("Review", "workflow/Review");
    let agent = AgentPath::new("alice");

    let names: Vec<String> = loaded
        .possible_transitions(&activity, &agent, &RolePolicy)
        .unwrap()
        .iter()
        .map(|transition| transition.name().to_string())
        .collect();

    assert_eq!(names, vec!["Start".to_string()]);
    assert_eq!(loaded.version(), Some(4));
}

#[test]
fn default_machine_names_resolve_through_settings() {
    use workstate::{MachineType, Settings};

    let cache = MachineCache::with_presets();
    let settings = Settings::default();

    for kind in [
        MachineType::Elementary,
        MachineType::Composite,
        MachineType::Predefined,
    ] {
        let name = settings.default_machine_name(kind);
        assert!(cache.get(name, 0).is_ok(), "preset for {kind} must exist");
    }

    assert!("Quantum".parse::<MachineType>().is_err());
}
