// Status Ledger - append-only audit trail of status changes
//
// Appends always happen inside the caller's transaction, next to the status
// write they describe. Reads drain the repository's lazy history stream.

use crate::domain::{
    Actor, JobStatus, JobStatusEntry, NewStatusEntry, RunnerTaskStatus, RunnerTaskStatusEntry,
    StatusHistoryEntry, StatusMachine,
};
use crate::error::Result;
use crate::port::{JobRepositoryTransaction, RunnerTaskTransaction};
use futures::stream::{BoxStream, TryStreamExt};
use tracing::debug;

/// Append one job ledger entry
pub async fn record(
    tx: &mut dyn JobRepositoryTransaction,
    job_id: &str,
    from: Option<JobStatus>,
    to: JobStatus,
    actor: &Actor,
    reason: Option<String>,
    at_millis: i64,
) -> Result<JobStatusEntry> {
    let entry = NewStatusEntry {
        parent_id: job_id.to_string(),
        from_status: from,
        to_status: to,
        actor: actor.clone(),
        reason,
        created_at: at_millis,
    };
    let saved = tx.append_history(entry).await?;
    debug!(job_id = %job_id, entry_id = saved.id, to = %to, "Ledger entry appended");
    Ok(saved)
}

/// Append one runner task ledger entry
pub async fn record_task(
    tx: &mut dyn RunnerTaskTransaction,
    task_id: &str,
    from: Option<RunnerTaskStatus>,
    to: RunnerTaskStatus,
    actor: &Actor,
    reason: Option<String>,
    at_millis: i64,
) -> Result<RunnerTaskStatusEntry> {
    let entry = NewStatusEntry {
        parent_id: task_id.to_string(),
        from_status: from,
        to_status: to,
        actor: actor.clone(),
        reason,
        created_at: at_millis,
    };
    let saved = tx.append_history(entry).await?;
    debug!(task_id = %task_id, entry_id = saved.id, to = %to, "Ledger entry appended");
    Ok(saved)
}

/// Drain a history stream, preserving its most-recent-first order
pub async fn collect<S: StatusMachine>(
    stream: BoxStream<'_, Result<StatusHistoryEntry<S>>>,
) -> Result<Vec<StatusHistoryEntry<S>>> {
    stream.try_collect().await
}
