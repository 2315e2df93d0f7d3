//! JSON-RPC Server
//!
//! Serves the lifecycle API over HTTP on a configurable TCP address.

use crate::handler::RpcHandler;
use crate::types::{
    JobCreateRequest, JobIdRequest, JobListRequest, JobTransitionRequest, MechanicJobsRequest,
    TaskAdvanceRequest, TaskCreateRequest, TaskIdRequest, TaskListRequest,
};
use fleetsure_core::application::{JobService, RunnerTaskService};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9630;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind RPC server on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Failed to register RPC method: {0}")]
    Register(String),
}

fn register_err(e: impl std::fmt::Display) -> ServerError {
    ServerError::Register(e.to_string())
}

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 picks a free port
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        jobs: Arc<JobService>,
        tasks: Arc<RunnerTaskService>,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(jobs, tasks)),
        }
    }

    fn build_module(&self) -> Result<RpcModule<()>, ServerError> {
        let mut module = RpcModule::new(());
        // Jobs
        let handler = self.handler.clone();
        module
            .register_async_method("job.create.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobCreateRequest = params.parse()?;
                    handler.create_job(req).await
                }
            })
            .map_err(register_err)?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.transition.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobTransitionRequest = params.parse()?;
                    handler.transition_job(req).await
                }
            })
            .map_err(register_err)?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.get.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobIdRequest = params.parse()?;
                    handler.get_job(req).await
                }
            })
            .map_err(register_err)?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.history.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobIdRequest = params.parse()?;
                    handler.job_history(req).await
                }
            })
            .map_err(register_err)?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.list.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobListRequest = params.parse()?;
                    handler.list_jobs(req).await
                }
            })
            .map_err(register_err)?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.list_for_mechanic.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: MechanicJobsRequest = params.parse()?;
                    handler.list_jobs_for_mechanic(req).await
                }
            })
            .map_err(register_err)?;

        // Runner tasks
        let handler = self.handler.clone();
        module
            .register_async_method("runner.task.create.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: TaskCreateRequest = params.parse()?;
                    handler.create_task(req).await
                }
            })
            .map_err(register_err)?;

        let handler = self.handler.clone();
        module
            .register_async_method("runner.task.advance.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: TaskAdvanceRequest = params.parse()?;
                    handler.advance_task(req).await
                }
            })
            .map_err(register_err)?;

        let handler = self.handler.clone();
        module
            .register_async_method("runner.task.get.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: TaskIdRequest = params.parse()?;
                    handler.get_task(req).await
                }
            })
            .map_err(register_err)?;

        let handler = self.handler.clone();
        module
            .register_async_method("runner.task.history.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: TaskIdRequest = params.parse()?;
                    handler.task_history(req).await
                }
            })
            .map_err(register_err)?;

        let handler = self.handler.clone();
        module
            .register_async_method("runner.task.list.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: TaskListRequest = params.parse()?;
                    handler.list_tasks(req).await
                }
            })
            .map_err(register_err)?;

        Ok(module)
    }

    /// Bind and start serving. Returns the bound address and a handle whose
    /// `stop()` shuts the server down.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let module = self.build_module()?;

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = server.local_addr().map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

        info!(
            addr = %local_addr,
            methods = module.method_names().count(),
            "JSON-RPC server started"
        );

        Ok((local_addr, server.start(module)))
    }
}
