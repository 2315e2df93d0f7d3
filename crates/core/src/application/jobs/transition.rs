// Job Status Transition Use Case

use crate::application::unit_of_work::rollback_quietly;
use crate::application::{ledger, validation};
use crate::domain::{Actor, Job, JobId, JobStatus, JobStatusEntry, MechanicId};
use crate::error::{AppError, Result};
use crate::port::{JobRepositoryTransaction, TimeProvider, TransactionalJobRepository};
use tracing::{info, warn};

/// Transition request
#[derive(Debug, Clone)]
pub struct TransitionJobRequest {
    pub job_id: JobId,
    pub target: JobStatus,
    pub actor: Actor,
    pub reason: Option<String>,
    /// Mechanic to dispatch; only meaningful with `target == ASSIGNED`
    pub mechanic_id: Option<MechanicId>,
}

impl TransitionJobRequest {
    pub fn new(job_id: impl Into<JobId>, target: JobStatus, actor: Actor) -> Self {
        Self {
            job_id: job_id.into(),
            target,
            actor,
            reason: None,
            mechanic_id: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_mechanic(mut self, mechanic_id: impl Into<MechanicId>) -> Self {
        self.mechanic_id = Some(mechanic_id.into());
        self
    }
}

/// Execute transition use case
///
/// Reads the job, validates the move against the adjacency table, then writes
/// the job with a compare-and-swap on the status it read and appends the
/// ledger entry, all in one transaction. Any failure rolls both back.
pub async fn execute(
    job_repo: &dyn TransactionalJobRepository,
    time_provider: &dyn TimeProvider,
    req: TransitionJobRequest,
) -> Result<(Job, JobStatusEntry)> {
    let mut tx = job_repo.begin_transaction().await?;

    match apply(tx.as_mut(), time_provider, &req).await {
        Ok((job, entry)) => {
            tx.commit().await?;
            info!(
                job_id = %job.id,
                job_number = %job.job_number,
                from = ?entry.from_status,
                to = %entry.to_status,
                actor_kind = %entry.actor_kind,
                "Job status changed"
            );
            Ok((job, entry))
        }
        Err(e) => {
            rollback_quietly(tx).await;
            warn!(
                job_id = %req.job_id,
                to = %req.target,
                actor_kind = %req.actor.kind,
                error = %e,
                "Job transition rejected"
            );
            Err(e)
        }
    }
}

async fn apply(
    tx: &mut dyn JobRepositoryTransaction,
    time_provider: &dyn TimeProvider,
    req: &TransitionJobRequest,
) -> Result<(Job, JobStatusEntry)> {
    let mechanic_id = match req.mechanic_id.clone() {
        Some(id) if req.target != JobStatus::Assigned => {
            return Err(AppError::Validation(format!(
                "mechanic_id {} can only accompany ASSIGNED",
                id
            )));
        }
        Some(id) => Some(validation::required_id("mechanic_id", id)?),
        None => None,
    };
    let reason = validation::optional_text("reason", req.reason.clone())?;

    let mut job = tx
        .find_job(&req.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", req.job_id)))?;

    let from = job.status;
    let stamped_at = job.transition(req.target, time_provider.now_millis(), reason.clone())?;
    if let Some(mechanic_id) = mechanic_id {
        job.assign_mechanic(mechanic_id);
    }

    tx.update_job_if_status(&job, from).await?;
    let entry = ledger::record(
        tx,
        &job.id,
        Some(from),
        req.target,
        &req.actor,
        reason,
        stamped_at,
    )
    .await?;

    Ok((job, entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewStatusEntry;
    use crate::port::time_provider::mocks::FixedTimeProvider;
    use crate::port::Transaction;
    use async_trait::async_trait;

    /// Holds no jobs, and its rollback always fails
    struct EmptyStore;

    struct FailingRollbackTx;

    #[async_trait]
    impl TransactionalJobRepository for EmptyStore {
        async fn begin_transaction(&self) -> Result<Box<dyn JobRepositoryTransaction>> {
            Ok(Box::new(FailingRollbackTx))
        }
    }

    #[async_trait]
    impl Transaction for FailingRollbackTx {
        async fn commit(self: Box<Self>) -> Result<()> {
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<()> {
            Err(AppError::Database("database is locked".to_string()))
        }
    }

    #[async_trait]
    impl JobRepositoryTransaction for FailingRollbackTx {
        async fn find_job(&mut self, _id: &JobId) -> Result<Option<Job>> {
            Ok(None)
        }

        async fn insert_job(&mut self, _job: &Job) -> Result<()> {
            Ok(())
        }

        async fn update_job_if_status(&mut self, _job: &Job, _expected: JobStatus) -> Result<()> {
            Ok(())
        }

        async fn append_history(
            &mut self,
            entry: NewStatusEntry<JobStatus>,
        ) -> Result<JobStatusEntry> {
            Ok(entry.into_entry(1))
        }
    }

    #[tokio::test]
    async fn test_failed_rollback_keeps_original_error() {
        let err = execute(
            &EmptyStore,
            &FixedTimeProvider::new(1000),
            TransitionJobRequest::new("job-1", JobStatus::Assigned, Actor::system()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_mechanic_with_other_target_rejected() {
        let err = execute(
            &EmptyStore,
            &FixedTimeProvider::new(1000),
            TransitionJobRequest::new("job-1", JobStatus::Cancelled, Actor::system())
                .with_mechanic("M1"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)), "{err:?}");
    }
}
