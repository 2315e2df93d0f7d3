// Job Service - Intake and lifecycle use cases for service jobs

pub mod intake;
pub mod transition;

pub use intake::CreateJobRequest;
pub use transition::TransitionJobRequest;

use crate::application::constants::MECHANIC_JOBS_LIMIT;
use crate::application::ledger;
use crate::domain::{Job, JobId, JobStatusEntry, MechanicId};
use crate::error::{AppError, Result};
use crate::port::job_repository::MAX_PAGE_LIMIT;
use crate::port::{
    IdProvider, JobNumberSource, JobQuery, JobRepository, Page, TimeProvider,
    TransactionalJobRepository,
};
use std::sync::Arc;

/// Job Service
pub struct JobService {
    tx_job_repo: Arc<dyn TransactionalJobRepository>,
    job_repo: Arc<dyn JobRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    job_numbers: Arc<dyn JobNumberSource>,
}

impl JobService {
    pub fn new(
        tx_job_repo: Arc<dyn TransactionalJobRepository>,
        job_repo: Arc<dyn JobRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        job_numbers: Arc<dyn JobNumberSource>,
    ) -> Self {
        Self {
            tx_job_repo,
            job_repo,
            id_provider,
            time_provider,
            job_numbers,
        }
    }

    /// Create a job in REQUESTED with its initial ledger entry
    pub async fn create_job(&self, req: CreateJobRequest) -> Result<Job> {
        intake::execute(
            self.tx_job_repo.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            self.job_numbers.as_ref(),
            req,
        )
        .await
    }

    /// Move a job to a new status
    ///
    /// # Errors
    /// - `AppError::NotFound` if the job does not exist
    /// - `AppError::Domain(InvalidStateTransition)` if the move is not allowed
    /// - `AppError::Conflict` if a concurrent transition won the race
    pub async fn transition(&self, req: TransitionJobRequest) -> Result<Job> {
        transition::execute(self.tx_job_repo.as_ref(), self.time_provider.as_ref(), req)
            .await
            .map(|(job, _)| job)
    }

    pub async fn get_job(&self, id: &JobId) -> Result<Job> {
        self.job_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))
    }

    /// Ledger of a job, most recent first
    pub async fn history(&self, id: &JobId) -> Result<Vec<JobStatusEntry>> {
        // Distinguish "no such job" from an empty ledger
        self.get_job(id).await?;
        ledger::collect(self.job_repo.history_stream(id)).await
    }

    /// A fleet's jobs, newest request first
    pub async fn list_jobs(&self, mut query: JobQuery) -> Result<Page<Job>> {
        if query.fleet_id.trim().is_empty() {
            return Err(AppError::Validation("fleet_id cannot be empty".to_string()));
        }
        query.page = query.page.max(1);
        query.limit = query.limit.clamp(1, MAX_PAGE_LIMIT);
        self.job_repo.list_by_fleet(&query).await
    }

    /// The latest jobs dispatched to a mechanic, newest request first
    pub async fn list_jobs_for_mechanic(&self, mechanic_id: &MechanicId) -> Result<Vec<Job>> {
        if mechanic_id.trim().is_empty() {
            return Err(AppError::Validation("mechanic_id cannot be empty".to_string()));
        }
        self.job_repo
            .list_by_mechanic(mechanic_id, MECHANIC_JOBS_LIMIT)
            .await
    }
}
