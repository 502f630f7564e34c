//! Error taxonomy for state machine queries and traversal.

use thiserror::Error;

/// Errors raised by state machine lookups, queries and traversal.
///
/// The permissive listing query (`possible_transitions`) only fails for
/// structural problems (`ObjectNotFound`, `InvalidData`); a forbidden or
/// disabled transition is silently excluded instead. The authoritative
/// `traverse` call additionally raises `InvalidTransition` and
/// `AccessDenied` so a stale listing cannot slip through.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// A requested state, transition or machine does not exist.
    #[error("{kind} '{name}' not found")]
    ObjectNotFound { kind: &'static str, name: String },

    /// Malformed machine definition or malformed activity state.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Traversal attempted with a transition whose origin does not match
    /// the activity's current state.
    #[error("Transition {transition} not valid from state {state}")]
    InvalidTransition { transition: String, state: String },

    /// The performing-role check rejected the agent.
    #[error("agent '{agent}' may not perform transition '{transition}': {reason}")]
    AccessDenied {
        agent: String,
        transition: String,
        reason: String,
    },
}

impl Error {
    pub(crate) fn not_found(kind: &'static str, name: impl ToString) -> Self {
        Error::ObjectNotFound {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn incoherent(machine_name: &str) -> Self {
        Error::InvalidData(format!("state machine '{machine_name}' is not coherent"))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
