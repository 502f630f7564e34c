//! Build errors for machine authoring.

use thiserror::Error;

/// Errors that can occur when building a state machine description.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(name) before .build()")]
    MissingInitialState,

    #[error("No states defined. Add at least one state")]
    NoStates,

    #[error("State '{0}' is not defined")]
    UnknownState(String),

    #[error("Transition '{0}' is not defined")]
    UnknownTransition(String),

    #[error("State machine '{0}' failed validation after construction")]
    Incoherent(String),
}
