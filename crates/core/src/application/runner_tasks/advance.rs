// Advance Runner Task Use Case

use crate::application::unit_of_work::rollback_quietly;
use crate::application::{ledger, validation};
use crate::domain::{Actor, RunnerTask, RunnerTaskId, RunnerTaskStatus, RunnerTaskStatusEntry};
use crate::error::{AppError, Result};
use crate::port::{RunnerTaskTransaction, TimeProvider, TransactionalRunnerTaskRepository};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct AdvanceRunnerTaskRequest {
    pub task_id: RunnerTaskId,
    pub target: RunnerTaskStatus,
    pub actor: Actor,
    pub reason: Option<String>,
}

impl AdvanceRunnerTaskRequest {
    pub fn new(task_id: impl Into<RunnerTaskId>, target: RunnerTaskStatus, actor: Actor) -> Self {
        Self {
            task_id: task_id.into(),
            target,
            actor,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Execute advance use case (same read / CAS / ledger shape as job transitions)
pub async fn execute(
    task_repo: &dyn TransactionalRunnerTaskRepository,
    time_provider: &dyn TimeProvider,
    req: AdvanceRunnerTaskRequest,
) -> Result<(RunnerTask, RunnerTaskStatusEntry)> {
    let mut tx = task_repo.begin_transaction().await?;

    match apply(tx.as_mut(), time_provider, &req).await {
        Ok((task, entry)) => {
            tx.commit().await?;
            info!(
                task_id = %task.id,
                from = ?entry.from_status,
                to = %entry.to_status,
                actor_kind = %entry.actor_kind,
                "Runner task status changed"
            );
            Ok((task, entry))
        }
        Err(e) => {
            rollback_quietly(tx).await;
            warn!(
                task_id = %req.task_id,
                to = %req.target,
                error = %e,
                "Runner task transition rejected"
            );
            Err(e)
        }
    }
}

async fn apply(
    tx: &mut dyn RunnerTaskTransaction,
    time_provider: &dyn TimeProvider,
    req: &AdvanceRunnerTaskRequest,
) -> Result<(RunnerTask, RunnerTaskStatusEntry)> {
    let reason = validation::optional_text("reason", req.reason.clone())?;

    let mut task = tx
        .find_task(&req.task_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Runner task {} not found", req.task_id)))?;

    let from = task.status;
    let stamped_at = task.advance(
        req.target,
        time_provider.now_millis(),
        &req.actor,
        reason.clone(),
    )?;

    tx.update_task_if_status(&task, from).await?;
    let entry = ledger::record_task(
        tx,
        &task.id,
        Some(from),
        req.target,
        &req.actor,
        reason,
        stamped_at,
    )
    .await?;

    Ok((task, entry))
}
