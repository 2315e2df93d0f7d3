// Runner Task Repository Port (read side)

use crate::domain::{RunnerId, RunnerTask, RunnerTaskId, RunnerTaskStatusEntry};
use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

#[async_trait]
pub trait RunnerTaskRepository: Send + Sync {
    async fn find_by_id(&self, id: &RunnerTaskId) -> Result<Option<RunnerTask>>;

    /// Tasks held by a runner, newest first
    async fn list_by_runner(&self, runner_id: &RunnerId) -> Result<Vec<RunnerTask>>;

    /// Ledger of a task, most recent first (lazy, restartable)
    fn history_stream<'a>(
        &'a self,
        task_id: &'a str,
    ) -> BoxStream<'a, Result<RunnerTaskStatusEntry>>;
}
