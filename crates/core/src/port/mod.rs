// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod job_number;
pub mod job_repository;
pub mod runner_task_repository;
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use id_provider::IdProvider;
pub use job_number::{JobNumberSource, RandomJobNumberSource, SequentialJobNumberSource};
pub use job_repository::{JobQuery, JobRepository, Page, PageMeta};
pub use runner_task_repository::RunnerTaskRepository;
pub use time_provider::TimeProvider;
pub use transaction::{
    JobRepositoryTransaction, RunnerTaskTransaction, Transaction, TransactionalJobRepository,
    TransactionalRunnerTaskRepository,
};
