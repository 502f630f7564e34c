//! Per-agent job lists.

use super::job::Job;
use crate::machine::TransitionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// The persistent list of pending jobs offered to one agent.
///
/// Job ids are assigned monotonically within the list and never reused,
/// so consumers can treat an id as a stable handle until the job is
/// removed by a refresh.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobList {
    agent: Uuid,
    jobs: BTreeMap<u32, Job>,
}

impl JobList {
    pub fn new(agent: Uuid) -> Self {
        Self {
            agent,
            jobs: BTreeMap::new(),
        }
    }

    pub fn agent(&self) -> Uuid {
        self.agent
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Job)> {
        self.jobs.iter().map(|(&id, job)| (id, job))
    }

    /// Append a job under the next id and return that id.
    pub fn add_job(&mut self, job: Job) -> u32 {
        let id = self
            .jobs
            .keys()
            .next_back()
            .map_or(0, |&last| last + 1);
        self.jobs.insert(id, job);
        id
    }

    /// Ids of the jobs matching the given item, and optionally a step
    /// path and transition.
    pub fn keys_for_step(
        &self,
        item: Uuid,
        step_path: Option<&str>,
        transition_id: Option<TransitionId>,
    ) -> Vec<u32> {
        tracing::debug!(%item, ?step_path, "collecting job keys for step");

        let mut keys = Vec::new();
        for (&id, job) in &self.jobs {
            if job.item() != item {
                continue;
            }

            let step_matches = match step_path {
                None => true,
                Some(path) => job.step_path() == path,
            };
            if !step_matches {
                continue;
            }

            let transition_matches = match transition_id {
                None => true,
                Some(wanted) => job.transition_id() == wanted,
            };
            if transition_matches {
                tracing::trace!(id, transition = %job.transition_name(), "matched job");
                keys.push(id);
            }
        }
        keys
    }

    /// Drop the stale offers for a step, returning how many were removed.
    /// Called before fresh jobs are added when an activity changes state.
    pub fn remove_jobs_for_step(&mut self, item: Uuid, step_path: &str) -> usize {
        let stale = self.keys_for_step(item, Some(step_path), None);
        for id in &stale {
            self.jobs.remove(id);
        }
        stale.len()
    }
}
