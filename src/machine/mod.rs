//! The state machine core: machine descriptions, states, transitions,
//! enablement conditions and the query/traversal contract.
//!
//! A [`StateMachine`] is a versioned description object shared read-only
//! by many activities. After any structural change it must be
//! re-validated, which rebuilds an internal id index and records whether
//! the graph is coherent (every transition endpoint and the initial
//! state resolve to live states).

mod condition;
mod error;
#[allow(clippy::module_inception)]
mod machine;
mod state;
mod transition;

pub use condition::{Condition, ExpressionFn, ScriptRegistry};
pub use error::{Error, Result};
pub use machine::StateMachine;
pub use state::State;
pub use transition::{OutcomeSpec, Reservation, ScriptSpec, Transition};

/// Integer code identifying a [`State`] within its machine.
pub type StateId = i32;

/// Integer code identifying a [`Transition`] within its machine.
pub type TransitionId = i32;
