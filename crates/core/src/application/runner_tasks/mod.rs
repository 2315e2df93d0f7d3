// Runner Task Service - parts-delivery lifecycle use cases

pub mod advance;
pub mod create;

pub use advance::AdvanceRunnerTaskRequest;
pub use create::CreateRunnerTaskRequest;

use crate::application::ledger;
use crate::domain::{RunnerId, RunnerTask, RunnerTaskId, RunnerTaskStatusEntry};
use crate::error::{AppError, Result};
use crate::port::{
    IdProvider, RunnerTaskRepository, TimeProvider, TransactionalRunnerTaskRepository,
};
use std::sync::Arc;

pub struct RunnerTaskService {
    tx_task_repo: Arc<dyn TransactionalRunnerTaskRepository>,
    task_repo: Arc<dyn RunnerTaskRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl RunnerTaskService {
    pub fn new(
        tx_task_repo: Arc<dyn TransactionalRunnerTaskRepository>,
        task_repo: Arc<dyn RunnerTaskRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            tx_task_repo,
            task_repo,
            id_provider,
            time_provider,
        }
    }

    /// Create a PENDING task with its initial ledger entry
    pub async fn create_task(&self, req: CreateRunnerTaskRequest) -> Result<RunnerTask> {
        create::execute(
            self.tx_task_repo.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await
    }

    /// Move a task strictly forward (or cancel it)
    ///
    /// # Errors
    /// - `AppError::NotFound` if the task does not exist
    /// - `AppError::Domain(InvalidStateTransition)` for backward or skipping moves
    /// - `AppError::Conflict` if a concurrent update won the race
    pub async fn advance(&self, req: AdvanceRunnerTaskRequest) -> Result<RunnerTask> {
        advance::execute(self.tx_task_repo.as_ref(), self.time_provider.as_ref(), req)
            .await
            .map(|(task, _)| task)
    }

    pub async fn get_task(&self, id: &RunnerTaskId) -> Result<RunnerTask> {
        self.task_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Runner task {} not found", id)))
    }

    pub async fn history(&self, id: &RunnerTaskId) -> Result<Vec<RunnerTaskStatusEntry>> {
        self.get_task(id).await?;
        ledger::collect(self.task_repo.history_stream(id)).await
    }

    pub async fn list_tasks_for_runner(&self, runner_id: &RunnerId) -> Result<Vec<RunnerTask>> {
        if runner_id.trim().is_empty() {
            return Err(AppError::Validation("runner_id cannot be empty".to_string()));
        }
        self.task_repo.list_by_runner(runner_id).await
    }
}
