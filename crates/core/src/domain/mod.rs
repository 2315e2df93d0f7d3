// Domain Layer - Pure business logic and entities

pub mod actor;
pub mod error;
pub mod history;
pub mod job;
pub mod job_number;
pub mod runner_task;
pub mod status;

// Re-exports
pub use actor::{Actor, ActorKind, UserId};
pub use error::DomainError;
pub use history::{JobStatusEntry, NewStatusEntry, RunnerTaskStatusEntry, StatusHistoryEntry};
pub use job::{
    FleetId, Job, JobDetails, JobId, JobLocation, JobType, MechanicId, Urgency, VehicleId,
};
pub use job_number::JobNumber;
pub use runner_task::{RunnerId, RunnerTask, RunnerTaskId, TaskLocation};
pub use status::{ensure_transition, JobStatus, RunnerTaskStatus, StatusMachine};
