//! Jobs: persisted offers of permitted transitions.
//!
//! A [`Job`] wraps one activity plus one allowed transition for one
//! agent; a [`JobList`] is the per-agent work list kept in step with the
//! activities' states. The state machine supplies the set of legal
//! transitions from which jobs are built (see
//! [`Activity::calculate_jobs`](crate::activity::Activity::calculate_jobs)).

#[allow(clippy::module_inception)]
mod job;
mod list;

pub use job::Job;
pub use list::JobList;
