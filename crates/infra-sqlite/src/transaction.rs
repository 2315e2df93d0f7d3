// SQLite Transaction Implementation
//
// Status writes are compare-and-swap: `UPDATE ... WHERE id = ? AND status = ?`.
// Zero affected rows means the record vanished or someone else moved it first.

use crate::error::{is_foreign_key_violation, is_unique_violation, map_sqlx_error, map_write_error};
use crate::history::{self, Ledger};
use crate::job_repository::JobRow;
use crate::runner_task_repository::RunnerTaskRow;
use async_trait::async_trait;
use fleetsure_core::domain::{
    Job, JobId, JobStatus, JobStatusEntry, NewStatusEntry, RunnerTask, RunnerTaskId,
    RunnerTaskStatus, RunnerTaskStatusEntry, StatusMachine,
};
use fleetsure_core::error::{AppError, Result};
use fleetsure_core::port::{JobRepositoryTransaction, RunnerTaskTransaction, Transaction};
use sqlx::{Sqlite, SqliteConnection, Transaction as SqlxTransaction};
use tracing::debug;

/// Explain why a guarded update touched nothing
async fn cas_miss<S: StatusMachine>(
    conn: &mut SqliteConnection,
    table: &str,
    what: &str,
    id: &str,
    expected: S,
) -> AppError {
    let sql = format!("SELECT status FROM {} WHERE id = ?", table);
    let current: std::result::Result<Option<String>, sqlx::Error> =
        sqlx::query_scalar(&sql).bind(id).fetch_optional(&mut *conn).await;

    match current {
        Ok(None) => AppError::NotFound(format!("{} {} not found", what, id)),
        Ok(Some(current)) => {
            debug!(
                id,
                expected = expected.as_str(),
                current = %current,
                "Status changed underneath"
            );
            AppError::Conflict(format!(
                "{} {} is {} (expected {})",
                what, id, current, expected
            ))
        }
        Err(e) => map_write_error(e, &format!("{} {}", what, id)),
    }
}

pub struct SqliteJobTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteJobTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteJobTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_write_error(e, "Transaction"))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl JobRepositoryTransaction for SqliteJobTransaction {
    async fn find_job(&mut self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn insert_job(&mut self, job: &Job) -> Result<()> {
        let job_number = job.job_number.to_string();

        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, job_number, fleet_id, vehicle_id, mechanic_id,
                location_latitude, location_longitude, location_address,
                location_city, location_state, location_notes,
                issue_type, issue_description, urgency, job_type,
                status, requested_at, assigned_at, accepted_at, en_route_at,
                arrived_at, completed_at, paid_at, cancelled_at, cancel_reason
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job_number)
        .bind(&job.fleet_id)
        .bind(&job.vehicle_id)
        .bind(&job.mechanic_id)
        .bind(job.location.latitude)
        .bind(job.location.longitude)
        .bind(&job.location.address)
        .bind(&job.location.city)
        .bind(&job.location.state)
        .bind(&job.location.notes)
        .bind(&job.issue_type)
        .bind(&job.issue_description)
        .bind(job.urgency.to_string())
        .bind(job.job_type.to_string())
        .bind(job.status.as_str())
        .bind(job.requested_at)
        .bind(job.assigned_at)
        .bind(job.accepted_at)
        .bind(job.en_route_at)
        .bind(job.arrived_at)
        .bind(job.completed_at)
        .bind(job.paid_at)
        .bind(job.cancelled_at)
        .bind(&job.cancel_reason)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) && e.to_string().contains("job_number") {
                AppError::DuplicateJobNumber(job_number.clone())
            } else {
                map_sqlx_error(e)
            }
        })?;

        Ok(())
    }

    async fn update_job_if_status(&mut self, job: &Job, expected: JobStatus) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, mechanic_id = ?,
                assigned_at = ?, accepted_at = ?, en_route_at = ?, arrived_at = ?,
                completed_at = ?, paid_at = ?, cancelled_at = ?, cancel_reason = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(job.status.as_str())
        .bind(&job.mechanic_id)
        .bind(job.assigned_at)
        .bind(job.accepted_at)
        .bind(job.en_route_at)
        .bind(job.arrived_at)
        .bind(job.completed_at)
        .bind(job.paid_at)
        .bind(job.cancelled_at)
        .bind(&job.cancel_reason)
        .bind(&job.id)
        .bind(expected.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, &format!("Job {}", job.id)))?;

        if result.rows_affected() == 0 {
            return Err(cas_miss(&mut self.tx, "jobs", "Job", &job.id, expected).await);
        }
        Ok(())
    }

    async fn append_history(
        &mut self,
        entry: NewStatusEntry<JobStatus>,
    ) -> Result<JobStatusEntry> {
        history::append(&mut self.tx, Ledger::Job, entry).await
    }
}

pub struct SqliteRunnerTaskTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteRunnerTaskTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteRunnerTaskTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_write_error(e, "Transaction"))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl RunnerTaskTransaction for SqliteRunnerTaskTransaction {
    async fn find_task(&mut self, id: &RunnerTaskId) -> Result<Option<RunnerTask>> {
        let row = sqlx::query_as::<_, RunnerTaskRow>("SELECT * FROM runner_tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        row.map(RunnerTaskRow::into_task).transpose()
    }

    async fn insert_task(&mut self, task: &RunnerTask) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO runner_tasks (
                id, job_id, runner_id,
                pickup_latitude, pickup_longitude, pickup_address,
                delivery_latitude, delivery_longitude, delivery_address,
                notes, status, created_at, accepted_at, pickup_arrived_at,
                picked_up_at, delivery_started_at, delivered_at, cancelled_at, cancel_reason
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task.id)
        .bind(&task.job_id)
        .bind(&task.runner_id)
        .bind(task.pickup.latitude)
        .bind(task.pickup.longitude)
        .bind(&task.pickup.address)
        .bind(task.delivery.latitude)
        .bind(task.delivery.longitude)
        .bind(&task.delivery.address)
        .bind(&task.notes)
        .bind(task.status.as_str())
        .bind(task.created_at)
        .bind(task.accepted_at)
        .bind(task.pickup_arrived_at)
        .bind(task.picked_up_at)
        .bind(task.delivery_started_at)
        .bind(task.delivered_at)
        .bind(task.cancelled_at)
        .bind(&task.cancel_reason)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound(format!("Job {} not found", task.job_id))
            } else {
                map_sqlx_error(e)
            }
        })?;

        Ok(())
    }

    async fn update_task_if_status(
        &mut self,
        task: &RunnerTask,
        expected: RunnerTaskStatus,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE runner_tasks
            SET status = ?, runner_id = ?,
                accepted_at = ?, pickup_arrived_at = ?, picked_up_at = ?,
                delivery_started_at = ?, delivered_at = ?, cancelled_at = ?, cancel_reason = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(task.status.as_str())
        .bind(&task.runner_id)
        .bind(task.accepted_at)
        .bind(task.pickup_arrived_at)
        .bind(task.picked_up_at)
        .bind(task.delivery_started_at)
        .bind(task.delivered_at)
        .bind(task.cancelled_at)
        .bind(&task.cancel_reason)
        .bind(&task.id)
        .bind(expected.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, &format!("Runner task {}", task.id)))?;

        if result.rows_affected() == 0 {
            return Err(
                cas_miss(&mut self.tx, "runner_tasks", "Runner task", &task.id, expected).await,
            );
        }
        Ok(())
    }

    async fn append_history(
        &mut self,
        entry: NewStatusEntry<RunnerTaskStatus>,
    ) -> Result<RunnerTaskStatusEntry> {
        history::append(&mut self.tx, Ledger::RunnerTask, entry).await
    }
}
