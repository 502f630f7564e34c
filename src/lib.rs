//! Workstate: a description-driven workflow state machine engine
//!
//! Workstate governs how an activity (a workflow step bound to an item)
//! moves between states: which transitions exist, who may trigger them,
//! what payload a transition demands, and how agents' job lists are kept
//! in step. Machines are data, not types: versioned description objects
//! loaded once per (name, version) and shared read-only by every
//! activity of that kind.
//!
//! # Core Concepts
//!
//! - **StateMachine**: an immutable-after-validation graph of states and
//!   transitions identified by integer codes
//! - **Permissive listing, strict firing**: `possible_transitions`
//!   silently filters what an agent cannot do; `traverse` fails loudly
//!   when preconditions no longer hold
//! - **Jobs**: persisted offers of permitted transitions, one list per
//!   agent
//!
//! # Example
//!
//! ```rust
//! use workstate::builder::StateMachineBuilder;
//! use workstate::security::{AgentPath, RolePolicy};
//! use workstate::Activity;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let machine = StateMachineBuilder::new("Signoff")
//!     .state("Pending")
//!     .state("Active")
//!     .finished_state("Complete")
//!     .initial("Pending")
//!     .transition("Start", "Pending", "Active")?
//!     .transition("Finish", "Active", "Complete")?
//!     .build()?;
//!
//! let mut activity = Activity::new("Review", "workflow/Review");
//! let agent = AgentPath::new("alice");
//!
//! let possible = machine.possible_transitions(&activity, &agent, &RolePolicy)?;
//! assert_eq!(possible.len(), 1);
//! assert_eq!(possible[0].name(), "Start");
//!
//! let start = possible[0].id();
//! activity.request(&machine, &agent, start, None, &RolePolicy)?;
//! assert_eq!(activity.state_name(&machine)?, "Active");
//! # Ok(())
//! # }
//! ```

pub mod activity;
pub mod builder;
pub mod config;
pub mod description;
pub mod event;
pub mod job;
pub mod machine;
pub mod security;

// Re-export commonly used types
pub use activity::{Activity, PropertyBag};
pub use config::Settings;
pub use description::{MachineCache, MachineType};
pub use event::{EventLog, TransitionEvent};
pub use job::{Job, JobList};
pub use machine::{
    Condition, Error, Result, State, StateId, StateMachine, Transition, TransitionId,
};
pub use security::{AgentPath, CheckResult, RolePolicy, SecurityPolicy};
