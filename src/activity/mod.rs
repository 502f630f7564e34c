//! Activities and their property bags.
//!
//! An [`Activity`] owns its current state code and properties; the state
//! machine governing it is a shared description resolved through the
//! description cache. All state mutation goes through
//! [`Activity::request`], the commit step around the machine's advisory
//! `traverse`.

#[allow(clippy::module_inception)]
mod activity;
mod properties;

pub use activity::Activity;
pub use properties::{BuiltInProperty, PropertyBag};
