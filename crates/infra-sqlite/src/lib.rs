// FleetSure Infrastructure - SQLite Adapter
// Implements: JobRepository, RunnerTaskRepository and their transactional ports

mod connection;
mod error;
mod history;
mod job_repository;
mod migration;
mod runner_task_repository;
mod transaction;

#[cfg(test)]
mod test_support;

pub use connection::create_pool;
pub use job_repository::SqliteJobRepository;
pub use migration::run_migrations;
pub use runner_task_repository::SqliteRunnerTaskRepository;
pub use transaction::{SqliteJobTransaction, SqliteRunnerTaskTransaction};
