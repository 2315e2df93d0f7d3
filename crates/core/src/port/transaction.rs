// Transaction port for atomic operations
//
// A status change is two writes (row update + ledger append); both go through
// one of these transactions so they commit or roll back together.

use crate::domain::{
    Job, JobId, JobStatus, JobStatusEntry, NewStatusEntry, RunnerTask, RunnerTaskId,
    RunnerTaskStatus, RunnerTaskStatusEntry,
};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional job operations
#[async_trait]
pub trait TransactionalJobRepository: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn JobRepositoryTransaction>>;
}

/// Job operations within a transaction
#[async_trait]
pub trait JobRepositoryTransaction: Transaction {
    /// Read a job (within transaction)
    async fn find_job(&mut self, id: &JobId) -> Result<Option<Job>>;

    /// Insert job (within transaction)
    ///
    /// # Errors
    /// - `AppError::DuplicateJobNumber` if the job number is already taken
    async fn insert_job(&mut self, job: &Job) -> Result<()>;

    /// Persist `job` only if the stored status still equals `expected`
    ///
    /// # Errors
    /// - `AppError::Conflict` if another writer changed the status first
    /// - `AppError::NotFound` if the job does not exist
    async fn update_job_if_status(&mut self, job: &Job, expected: JobStatus) -> Result<()>;

    /// Append one ledger entry (within transaction)
    async fn append_history(&mut self, entry: NewStatusEntry<JobStatus>)
        -> Result<JobStatusEntry>;
}

/// Transactional runner task operations
#[async_trait]
pub trait TransactionalRunnerTaskRepository: Send + Sync {
    async fn begin_transaction(&self) -> Result<Box<dyn RunnerTaskTransaction>>;
}

/// Runner task operations within a transaction
#[async_trait]
pub trait RunnerTaskTransaction: Transaction {
    async fn find_task(&mut self, id: &RunnerTaskId) -> Result<Option<RunnerTask>>;

    /// # Errors
    /// - `AppError::NotFound` if the parent job does not exist
    async fn insert_task(&mut self, task: &RunnerTask) -> Result<()>;

    /// Compare-and-swap on status, like [`JobRepositoryTransaction::update_job_if_status`]
    async fn update_task_if_status(
        &mut self,
        task: &RunnerTask,
        expected: RunnerTaskStatus,
    ) -> Result<()>;

    async fn append_history(
        &mut self,
        entry: NewStatusEntry<RunnerTaskStatus>,
    ) -> Result<RunnerTaskStatusEntry>;
}
