// Create Runner Task Use Case
//
// Entry point for parts-fulfillment logic that dispatches a delivery.

use crate::application::constants::MAX_TEXT_FIELD_LEN;
use crate::application::unit_of_work::rollback_quietly;
use crate::application::{ledger, validation};
use crate::domain::{Actor, RunnerTask, RunnerTaskStatus, TaskLocation};
use crate::error::Result;
use crate::port::{
    IdProvider, RunnerTaskTransaction, TimeProvider, TransactionalRunnerTaskRepository,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRunnerTaskRequest {
    pub job_id: String,
    pub pickup: TaskLocation,
    pub delivery: TaskLocation,
    /// Pre-assigned runner, if dispatch already picked one
    #[serde(default)]
    pub runner_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn validate_location(field: &str, location: TaskLocation) -> Result<TaskLocation> {
    validation::coordinates(location.latitude, location.longitude)?;
    Ok(TaskLocation {
        latitude: location.latitude,
        longitude: location.longitude,
        address: validation::required(
            &format!("{}.address", field),
            location.address,
            MAX_TEXT_FIELD_LEN,
        )?,
    })
}

pub async fn execute(
    task_repo: &dyn TransactionalRunnerTaskRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: CreateRunnerTaskRequest,
) -> Result<RunnerTask> {
    let job_id = validation::required_id("job_id", req.job_id)?;
    let pickup = validate_location("pickup", req.pickup)?;
    let delivery = validate_location("delivery", req.delivery)?;
    let runner_id = match req.runner_id {
        Some(id) => Some(validation::required_id("runner_id", id)?),
        None => None,
    };
    let notes = validation::optional_text("notes", req.notes)?;

    let mut task = RunnerTask::new(
        id_provider.generate_id(),
        job_id,
        time_provider.now_millis(),
        pickup,
        delivery,
    );
    task.runner_id = runner_id;
    task.notes = notes;

    let mut tx = task_repo.begin_transaction().await?;
    match insert_with_ledger(tx.as_mut(), &task).await {
        Ok(()) => {
            tx.commit().await?;
            info!(task_id = %task.id, job_id = %task.job_id, "Runner task created");
            Ok(task)
        }
        Err(e) => {
            rollback_quietly(tx).await;
            Err(e)
        }
    }
}

async fn insert_with_ledger(tx: &mut dyn RunnerTaskTransaction, task: &RunnerTask) -> Result<()> {
    tx.insert_task(task).await?;
    ledger::record_task(
        tx,
        &task.id,
        None,
        RunnerTaskStatus::Pending,
        &Actor::system(),
        None,
        task.created_at,
    )
    .await?;
    Ok(())
}
