//! Builder API for authoring machine descriptions.
//!
//! Descriptions are normally loaded from serialized data; the builder is
//! the programmatic path used by authoring tools and tests, working on
//! names and deferring id assignment to the machine's factories.

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
