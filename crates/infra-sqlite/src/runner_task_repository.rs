// SQLite RunnerTaskRepository Implementation

use crate::error::{corrupt, map_sqlx_error};
use crate::history::{self, Ledger};
use crate::transaction::SqliteRunnerTaskTransaction;
use async_trait::async_trait;
use fleetsure_core::domain::{
    RunnerId, RunnerTask, RunnerTaskId, RunnerTaskStatusEntry, TaskLocation,
};
use fleetsure_core::error::Result;
use fleetsure_core::port::{
    RunnerTaskRepository, RunnerTaskTransaction, TransactionalRunnerTaskRepository,
};
use futures::stream::BoxStream;
use sqlx::SqlitePool;

pub struct SqliteRunnerTaskRepository {
    pool: SqlitePool,
}

impl SqliteRunnerTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunnerTaskRepository for SqliteRunnerTaskRepository {
    async fn find_by_id(&self, id: &RunnerTaskId) -> Result<Option<RunnerTask>> {
        let row = sqlx::query_as::<_, RunnerTaskRow>("SELECT * FROM runner_tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(RunnerTaskRow::into_task).transpose()
    }

    async fn list_by_runner(&self, runner_id: &RunnerId) -> Result<Vec<RunnerTask>> {
        let rows = sqlx::query_as::<_, RunnerTaskRow>(
            "SELECT * FROM runner_tasks WHERE runner_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(runner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(RunnerTaskRow::into_task).collect()
    }

    fn history_stream<'a>(
        &'a self,
        task_id: &'a str,
    ) -> BoxStream<'a, Result<RunnerTaskStatusEntry>> {
        history::stream(&self.pool, Ledger::RunnerTask, task_id)
    }
}

#[async_trait]
impl TransactionalRunnerTaskRepository for SqliteRunnerTaskRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn RunnerTaskTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteRunnerTaskTransaction::new(tx)))
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RunnerTaskRow {
    id: String,
    job_id: String,
    runner_id: Option<String>,

    pickup_latitude: f64,
    pickup_longitude: f64,
    pickup_address: String,
    delivery_latitude: f64,
    delivery_longitude: f64,
    delivery_address: String,
    notes: Option<String>,

    status: String,

    created_at: i64,
    accepted_at: Option<i64>,
    pickup_arrived_at: Option<i64>,
    picked_up_at: Option<i64>,
    delivery_started_at: Option<i64>,
    delivered_at: Option<i64>,
    cancelled_at: Option<i64>,
    cancel_reason: Option<String>,
}

impl RunnerTaskRow {
    pub(crate) fn into_task(self) -> Result<RunnerTask> {
        Ok(RunnerTask {
            status: self.status.parse().map_err(|e| corrupt("status", e))?,
            id: self.id,
            job_id: self.job_id,
            runner_id: self.runner_id,
            pickup: TaskLocation {
                latitude: self.pickup_latitude,
                longitude: self.pickup_longitude,
                address: self.pickup_address,
            },
            delivery: TaskLocation {
                latitude: self.delivery_latitude,
                longitude: self.delivery_longitude,
                address: self.delivery_address,
            },
            notes: self.notes,
            created_at: self.created_at,
            accepted_at: self.accepted_at,
            pickup_arrived_at: self.pickup_arrived_at,
            picked_up_at: self.picked_up_at,
            delivery_started_at: self.delivery_started_at,
            delivered_at: self.delivered_at,
            cancelled_at: self.cancelled_at,
            cancel_reason: self.cancel_reason,
        })
    }
}
