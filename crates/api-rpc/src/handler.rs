//! RPC Method Handlers
//!
//! Thin adapters from wire types onto the job and runner-task services.

use crate::error::to_rpc_error;
use crate::types::{
    JobCreateRequest, JobHistoryResponse, JobIdRequest, JobListRequest, JobResponse,
    JobTransitionRequest, MechanicJobsRequest, MechanicJobsResponse, TaskAdvanceRequest,
    TaskCreateRequest, TaskHistoryResponse, TaskIdRequest, TaskListRequest, TaskListResponse,
};
use fleetsure_core::application::{JobService, RunnerTaskService};
use fleetsure_core::domain::{Job, RunnerTask};
use fleetsure_core::error::AppError;
use fleetsure_core::port::Page;
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// RPC Handler with injected services
pub struct RpcHandler {
    jobs: Arc<JobService>,
    tasks: Arc<RunnerTaskService>,
}

impl RpcHandler {
    pub fn new(jobs: Arc<JobService>, tasks: Arc<RunnerTaskService>) -> Self {
        Self { jobs, tasks }
    }

    /// job.create.v1
    pub async fn create_job(&self, params: JobCreateRequest) -> RpcResult<JobResponse> {
        self.jobs.create_job(params).await.map_err(to_rpc_error)
    }

    /// job.transition.v1
    pub async fn transition_job(&self, params: JobTransitionRequest) -> RpcResult<JobResponse> {
        let req = params
            .into_request()
            .map_err(|e| to_rpc_error(AppError::Domain(e)))?;
        self.jobs.transition(req).await.map_err(to_rpc_error)
    }

    /// job.get.v1
    pub async fn get_job(&self, params: JobIdRequest) -> RpcResult<JobResponse> {
        self.jobs.get_job(&params.job_id).await.map_err(to_rpc_error)
    }

    /// job.history.v1
    pub async fn job_history(&self, params: JobIdRequest) -> RpcResult<JobHistoryResponse> {
        let entries = self
            .jobs
            .history(&params.job_id)
            .await
            .map_err(to_rpc_error)?;
        Ok(JobHistoryResponse {
            job_id: params.job_id,
            entries,
        })
    }

    /// job.list.v1
    pub async fn list_jobs(&self, params: JobListRequest) -> RpcResult<Page<Job>> {
        self.jobs
            .list_jobs(params.into())
            .await
            .map_err(to_rpc_error)
    }

    /// job.list_for_mechanic.v1
    pub async fn list_jobs_for_mechanic(
        &self,
        params: MechanicJobsRequest,
    ) -> RpcResult<MechanicJobsResponse> {
        let jobs = self
            .jobs
            .list_jobs_for_mechanic(&params.mechanic_id)
            .await
            .map_err(to_rpc_error)?;
        Ok(MechanicJobsResponse {
            mechanic_id: params.mechanic_id,
            jobs,
        })
    }

    /// runner.task.create.v1
    pub async fn create_task(&self, params: TaskCreateRequest) -> RpcResult<RunnerTask> {
        self.tasks.create_task(params).await.map_err(to_rpc_error)
    }

    /// runner.task.advance.v1
    pub async fn advance_task(&self, params: TaskAdvanceRequest) -> RpcResult<RunnerTask> {
        let req = params
            .into_request()
            .map_err(|e| to_rpc_error(AppError::Domain(e)))?;
        self.tasks.advance(req).await.map_err(to_rpc_error)
    }

    /// runner.task.get.v1
    pub async fn get_task(&self, params: TaskIdRequest) -> RpcResult<RunnerTask> {
        self.tasks
            .get_task(&params.task_id)
            .await
            .map_err(to_rpc_error)
    }

    /// runner.task.history.v1
    pub async fn task_history(&self, params: TaskIdRequest) -> RpcResult<TaskHistoryResponse> {
        let entries = self
            .tasks
            .history(&params.task_id)
            .await
            .map_err(to_rpc_error)?;
        Ok(TaskHistoryResponse {
            task_id: params.task_id,
            entries,
        })
    }

    /// runner.task.list.v1
    pub async fn list_tasks(&self, params: TaskListRequest) -> RpcResult<TaskListResponse> {
        let tasks = self
            .tasks
            .list_tasks_for_runner(&params.runner_id)
            .await
            .map_err(to_rpc_error)?;
        Ok(TaskListResponse {
            runner_id: params.runner_id,
            tasks,
        })
    }
}
