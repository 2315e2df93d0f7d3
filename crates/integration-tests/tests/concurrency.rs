//! Optimistic concurrency on status writes, against an on-disk WAL database.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{parts_store, roadside, seattle_request, Harness, TempDb};
use fleetsure_core::application::jobs::transition;
use fleetsure_core::application::runner_tasks::advance;
use fleetsure_core::application::{
    AdvanceRunnerTaskRequest, CreateRunnerTaskRequest, TransitionJobRequest,
};
use fleetsure_core::domain::{
    Actor, Job, JobId, JobStatus, JobStatusEntry, NewStatusEntry, RunnerTask, RunnerTaskId,
    RunnerTaskStatus, RunnerTaskStatusEntry,
};
use fleetsure_core::error::{AppError, Result};
use fleetsure_core::port::time_provider::mocks::FixedTimeProvider;
use fleetsure_core::port::{
    JobRepositoryTransaction, RunnerTaskTransaction, SequentialJobNumberSource, Transaction,
    TransactionalJobRepository, TransactionalRunnerTaskRepository,
};
use fleetsure_infra_sqlite::{SqliteJobRepository, SqliteRunnerTaskRepository};
use sqlx::SqlitePool;

async fn file_harness(db: &TempDb) -> Harness {
    Harness::with_numbers(&db.url(), Arc::new(SequentialJobNumberSource::new())).await
}

async fn advance_to(h: &Harness, job: &Job, path: &[JobStatus]) {
    for status in path {
        h.jobs
            .transition(TransitionJobRequest::new(job.id.clone(), *status, Actor::system()))
            .await
            .unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_transitions_one_winner_one_ledger_entry() {
    let db = TempDb::new();
    let h = Arc::new(file_harness(&db).await);

    for _ in 0..10 {
        let job = h.jobs.create_job(seattle_request()).await.unwrap();
        // From COMPLETED, PAID and CANCELLED exclude each other in any order
        advance_to(
            &h,
            &job,
            &[
                JobStatus::Assigned,
                JobStatus::Accepted,
                JobStatus::EnRoute,
                JobStatus::OnSite,
                JobStatus::Completed,
            ],
        )
        .await;
        let ledger_before = h.jobs.history(&job.id).await.unwrap().len();

        let racers = [
            (JobStatus::Paid, Actor::user("billing")),
            (JobStatus::Cancelled, Actor::user("fleet-admin")),
        ]
        .map(|(target, actor)| {
            let h = h.clone();
            let id = job.id.clone();
            tokio::spawn(async move {
                h.jobs
                    .transition(TransitionJobRequest::new(id, target, actor))
                    .await
            })
        });

        let mut winners = Vec::new();
        for racer in racers {
            match racer.await.unwrap() {
                Ok(job) => winners.push(job),
                Err(e) => assert!(
                    matches!(e, AppError::Conflict(_)) || e.is_invalid_transition(),
                    "loser must see Conflict or InvalidTransition, got {e:?}"
                ),
            }
        }

        assert_eq!(winners.len(), 1);
        let history = h.jobs.history(&job.id).await.unwrap();
        assert_eq!(history.len(), ledger_before + 1);
        assert_eq!(history[0].to_status, winners[0].status);
        assert_eq!(h.jobs.get_job(&job.id).await.unwrap().status, winners[0].status);
    }
}

// ---------------------------------------------------------------------------
// Deterministic lost race: a competing writer commits between our read and our
// compare-and-swap.
// ---------------------------------------------------------------------------

struct InterferingRepository {
    inner: SqliteJobRepository,
    pool: SqlitePool,
}

#[async_trait]
impl TransactionalJobRepository for InterferingRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn JobRepositoryTransaction>> {
        Ok(Box::new(InterferingTransaction {
            inner: self.inner.begin_transaction().await?,
            pool: self.pool.clone(),
        }))
    }
}

struct InterferingTransaction {
    inner: Box<dyn JobRepositoryTransaction>,
    pool: SqlitePool,
}

#[async_trait]
impl Transaction for InterferingTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.inner.rollback().await
    }
}

#[async_trait]
impl JobRepositoryTransaction for InterferingTransaction {
    async fn find_job(&mut self, id: &JobId) -> Result<Option<Job>> {
        let found = self.inner.find_job(id).await?;

        // Someone else assigns the job on another connection
        sqlx::query("UPDATE jobs SET status = 'ASSIGNED', assigned_at = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(found)
    }

    async fn insert_job(&mut self, job: &Job) -> Result<()> {
        self.inner.insert_job(job).await
    }

    async fn update_job_if_status(&mut self, job: &Job, expected: JobStatus) -> Result<()> {
        self.inner.update_job_if_status(job, expected).await
    }

    async fn append_history(
        &mut self,
        entry: NewStatusEntry<JobStatus>,
    ) -> Result<JobStatusEntry> {
        self.inner.append_history(entry).await
    }
}

#[tokio::test]
async fn test_lost_race_is_conflict_and_rolls_back() {
    let db = TempDb::new();
    let h = file_harness(&db).await;
    let job = h.jobs.create_job(seattle_request()).await.unwrap();

    let interfering = InterferingRepository {
        inner: SqliteJobRepository::new(h.pool.clone()),
        pool: h.pool.clone(),
    };
    let clock = FixedTimeProvider::new(common::JUNE_2026 + 1_000);

    let err = transition::execute(
        &interfering,
        &clock,
        TransitionJobRequest::new(job.id.clone(), JobStatus::Cancelled, Actor::user("U1")),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "{err:?}");

    // The competing write stands, our ledger entry does not exist
    let stored = h.jobs.get_job(&job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Assigned);
    assert_eq!(stored.cancelled_at, None);
    assert_eq!(h.jobs.history(&job.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sequential_transitions_on_file_db() {
    let db = TempDb::new();
    let h = file_harness(&db).await;
    let job = h.jobs.create_job(seattle_request()).await.unwrap();

    advance_to(&h, &job, &[JobStatus::Assigned, JobStatus::Accepted]).await;

    // Reopen: state survives a new pool
    h.pool.close().await;
    let reopened = file_harness(&db).await;
    let stored = reopened.jobs.get_job(&job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Accepted);
    assert_eq!(reopened.jobs.history(&job.id).await.unwrap().len(), 3);
}

// ---------------------------------------------------------------------------
// Runner tasks: same guarantees as jobs
// ---------------------------------------------------------------------------

async fn task_for(h: &Harness, runner_id: &str) -> RunnerTask {
    let job = h.jobs.create_job(seattle_request()).await.unwrap();
    h.tasks
        .create_task(CreateRunnerTaskRequest {
            job_id: job.id,
            pickup: parts_store(),
            delivery: roadside(),
            runner_id: Some(runner_id.to_string()),
            notes: None,
        })
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_task_advances_one_winner_one_ledger_entry() {
    let db = TempDb::new();
    let h = Arc::new(file_harness(&db).await);

    for _ in 0..10 {
        let task = task_for(&h, "R1").await;
        // From IN_TRANSIT, DELIVERED and CANCELLED are both terminal
        for status in [
            RunnerTaskStatus::Accepted,
            RunnerTaskStatus::PickingUp,
            RunnerTaskStatus::PickedUp,
            RunnerTaskStatus::InTransit,
        ] {
            h.tasks
                .advance(AdvanceRunnerTaskRequest::new(
                    task.id.clone(),
                    status,
                    Actor::user("R1"),
                ))
                .await
                .unwrap();
        }
        let ledger_before = h.tasks.history(&task.id).await.unwrap().len();

        let racers = [
            (RunnerTaskStatus::Delivered, Actor::user("R1")),
            (RunnerTaskStatus::Cancelled, Actor::user("dispatcher-7")),
        ]
        .map(|(target, actor)| {
            let h = h.clone();
            let id = task.id.clone();
            tokio::spawn(async move {
                h.tasks
                    .advance(AdvanceRunnerTaskRequest::new(id, target, actor))
                    .await
            })
        });

        let mut winners = Vec::new();
        for racer in racers {
            match racer.await.unwrap() {
                Ok(task) => winners.push(task),
                Err(e) => assert!(
                    matches!(e, AppError::Conflict(_)) || e.is_invalid_transition(),
                    "loser must see Conflict or InvalidTransition, got {e:?}"
                ),
            }
        }

        assert_eq!(winners.len(), 1);
        let history = h.tasks.history(&task.id).await.unwrap();
        assert_eq!(history.len(), ledger_before + 1);
        assert_eq!(history[0].to_status, winners[0].status);
    }
}

struct InterferingTaskRepository {
    inner: SqliteRunnerTaskRepository,
    pool: SqlitePool,
}

#[async_trait]
impl TransactionalRunnerTaskRepository for InterferingTaskRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn RunnerTaskTransaction>> {
        Ok(Box::new(InterferingTaskTransaction {
            inner: self.inner.begin_transaction().await?,
            pool: self.pool.clone(),
        }))
    }
}

struct InterferingTaskTransaction {
    inner: Box<dyn RunnerTaskTransaction>,
    pool: SqlitePool,
}

#[async_trait]
impl Transaction for InterferingTaskTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.inner.rollback().await
    }
}

#[async_trait]
impl RunnerTaskTransaction for InterferingTaskTransaction {
    async fn find_task(&mut self, id: &RunnerTaskId) -> Result<Option<RunnerTask>> {
        let found = self.inner.find_task(id).await?;

        // Dispatch cancels the delivery on another connection
        sqlx::query(
            "UPDATE runner_tasks SET status = 'CANCELLED', cancelled_at = 1 WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(found)
    }

    async fn insert_task(&mut self, task: &RunnerTask) -> Result<()> {
        self.inner.insert_task(task).await
    }

    async fn update_task_if_status(
        &mut self,
        task: &RunnerTask,
        expected: RunnerTaskStatus,
    ) -> Result<()> {
        self.inner.update_task_if_status(task, expected).await
    }

    async fn append_history(
        &mut self,
        entry: NewStatusEntry<RunnerTaskStatus>,
    ) -> Result<RunnerTaskStatusEntry> {
        self.inner.append_history(entry).await
    }
}

#[tokio::test]
async fn test_lost_task_race_is_conflict_and_rolls_back() {
    let db = TempDb::new();
    let h = file_harness(&db).await;
    let task = task_for(&h, "R1").await;

    let interfering = InterferingTaskRepository {
        inner: SqliteRunnerTaskRepository::new(h.pool.clone()),
        pool: h.pool.clone(),
    };
    let clock = FixedTimeProvider::new(common::JUNE_2026 + 1_000);

    let err = advance::execute(
        &interfering,
        &clock,
        AdvanceRunnerTaskRequest::new(
            task.id.clone(),
            RunnerTaskStatus::Accepted,
            Actor::user("R1"),
        ),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "{err:?}");

    // The competing cancel stands, the accept left no trace
    let stored = h.tasks.get_task(&task.id).await.unwrap();
    assert_eq!(stored.status, RunnerTaskStatus::Cancelled);
    assert_eq!(stored.accepted_at, None);
    assert_eq!(h.tasks.history(&task.id).await.unwrap().len(), 1);
}
