/*!
 * In-memory job store.
 *
 * The outer map lock is held only to find, insert or remove a slot; each
 * job sits behind its own mutex, so a mutation on one job never waits for
 * another job.
 */

use chrono::{DateTime, Duration, Utc};
use log::debug;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::JobError;
use super::models::TranslationJob;

type JobSlot = Arc<Mutex<TranslationJob>>;

/// Process-scoped registry of job records
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<String, JobSlot>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, job_id: &str) -> Result<JobSlot, JobError> {
        self.jobs
            .read()
            .get(job_id)
            .cloned()
            .ok_or_else(|| JobError::JobNotFound(job_id.to_string()))
    }

    /// Insert a new job; an existing id is rejected
    pub fn create(&self, job: TranslationJob) -> Result<(), JobError> {
        let mut jobs = self.jobs.write();
        if jobs.contains_key(&job.job_id) {
            return Err(JobError::InvalidSubmission(format!(
                "Job {} already exists",
                job.job_id
            )));
        }
        debug!("Created job {}", job.job_id);
        jobs.insert(job.job_id.clone(), Arc::new(Mutex::new(job)));
        Ok(())
    }

    /// Snapshot of a job
    pub fn get(&self, job_id: &str) -> Result<TranslationJob, JobError> {
        let slot = self.slot(job_id)?;
        let job = slot.lock().clone();
        Ok(job)
    }

    /// Whether a job exists
    pub fn contains(&self, job_id: &str) -> bool {
        self.jobs.read().contains_key(job_id)
    }

    /// Atomic read-modify-write of one job.
    ///
    /// The closure runs while the job's lock is held. A job deleted before
    /// the lock is taken is reported as `JobNotFound`.
    pub fn mutate<F, R>(&self, job_id: &str, f: F) -> Result<R, JobError>
    where
        F: FnOnce(&mut TranslationJob) -> R,
    {
        let slot = self.slot(job_id)?;
        let mut job = slot.lock();
        // Deleted between slot lookup and lock acquisition
        if !self.is_current(job_id, &slot) {
            return Err(JobError::JobNotFound(job_id.to_string()));
        }
        Ok(f(&mut job))
    }

    fn is_current(&self, job_id: &str, slot: &JobSlot) -> bool {
        self.jobs
            .read()
            .get(job_id)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// Remove a job, returning its last state
    pub fn delete(&self, job_id: &str) -> Result<TranslationJob, JobError> {
        let slot = self
            .jobs
            .write()
            .remove(job_id)
            .ok_or_else(|| JobError::JobNotFound(job_id.to_string()))?;
        debug!("Deleted job {}", job_id);
        let job = slot.lock().clone();
        Ok(job)
    }

    /// Ids of every stored job
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.jobs.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }

    /// Remove jobs created more than `ttl` before `now`
    pub fn remove_expired(&self, ttl: Duration, now: DateTime<Utc>) -> Vec<String> {
        // Job locks are never taken while the map lock is held
        let slots: Vec<(String, JobSlot)> = self
            .jobs
            .read()
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect();
        let expired: Vec<String> = slots
            .into_iter()
            .filter(|(_, slot)| now - slot.lock().created_at > ttl)
            .map(|(id, _)| id)
            .collect();

        let mut jobs = self.jobs.write();
        for id in &expired {
            jobs.remove(id);
        }
        drop(jobs);
        if !expired.is_empty() {
            debug!("Removed {} expired job(s)", expired.len());
        }
        expired
    }
}
