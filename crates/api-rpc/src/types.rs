//! RPC Request/Response Types
//!
//! Method parameters and results. Status and actor-kind fields use the
//! SCREAMING_SNAKE_CASE wire names; unknown values fail at parse time.

use fleetsure_core::application::{
    AdvanceRunnerTaskRequest, CreateJobRequest, CreateRunnerTaskRequest, TransitionJobRequest,
};
use fleetsure_core::domain::{
    Actor, ActorKind, DomainError, Job, JobStatus, JobStatusEntry, RunnerTask, RunnerTaskStatus,
    RunnerTaskStatusEntry,
};
use fleetsure_core::port::job_repository::DEFAULT_PAGE_LIMIT;
use fleetsure_core::port::JobQuery;
use serde::{Deserialize, Serialize};

/// Who is calling, as sent over the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorParams {
    pub actor_kind: ActorKind,
    #[serde(default)]
    pub actor_id: Option<String>,
}

impl ActorParams {
    pub fn into_actor(self) -> Result<Actor, DomainError> {
        Actor::from_parts(self.actor_kind, self.actor_id)
    }
}

/// job.create.v1
pub type JobCreateRequest = CreateJobRequest;

/// job.transition.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTransitionRequest {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(flatten)]
    pub actor: ActorParams,
    #[serde(default)]
    pub reason: Option<String>,
    /// Only with `status = ASSIGNED`
    #[serde(default)]
    pub mechanic_id: Option<String>,
}

impl JobTransitionRequest {
    pub fn into_request(self) -> Result<TransitionJobRequest, DomainError> {
        let mut req = TransitionJobRequest::new(self.job_id, self.status, self.actor.into_actor()?);
        req.reason = self.reason;
        req.mechanic_id = self.mechanic_id;
        Ok(req)
    }
}

/// job.get.v1 / job.history.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobIdRequest {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHistoryResponse {
    pub job_id: String,
    pub entries: Vec<JobStatusEntry>,
}

/// job.list.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListRequest {
    pub fleet_id: String,
    #[serde(default)]
    pub statuses: Vec<JobStatus>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl From<JobListRequest> for JobQuery {
    fn from(req: JobListRequest) -> Self {
        JobQuery {
            fleet_id: req.fleet_id,
            statuses: req.statuses,
            page: req.page.unwrap_or(1),
            limit: req.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        }
    }
}

/// job.list_for_mechanic.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MechanicJobsRequest {
    pub mechanic_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MechanicJobsResponse {
    pub mechanic_id: String,
    pub jobs: Vec<Job>,
}

/// runner.task.create.v1
pub type TaskCreateRequest = CreateRunnerTaskRequest;

/// runner.task.advance.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAdvanceRequest {
    pub task_id: String,
    pub status: RunnerTaskStatus,
    #[serde(flatten)]
    pub actor: ActorParams,
    #[serde(default)]
    pub reason: Option<String>,
}

impl TaskAdvanceRequest {
    pub fn into_request(self) -> Result<AdvanceRunnerTaskRequest, DomainError> {
        let mut req =
            AdvanceRunnerTaskRequest::new(self.task_id, self.status, self.actor.into_actor()?);
        req.reason = self.reason;
        Ok(req)
    }
}

/// runner.task.get.v1 / runner.task.history.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskIdRequest {
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskHistoryResponse {
    pub task_id: String,
    pub entries: Vec<RunnerTaskStatusEntry>,
}

/// runner.task.list.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListRequest {
    pub runner_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub runner_id: String,
    pub tasks: Vec<RunnerTask>,
}

/// Result of job.create.v1, job.transition.v1 and job.get.v1
pub type JobResponse = Job;
