// Application Layer - Use Cases and Business Logic

pub mod constants;
pub mod jobs;
pub mod ledger;
pub mod runner_tasks;
mod unit_of_work;
pub mod validation;

// Re-exports
pub use jobs::{CreateJobRequest, JobService, TransitionJobRequest};
pub use runner_tasks::{AdvanceRunnerTaskRequest, CreateRunnerTaskRequest, RunnerTaskService};
