//! FleetSure Lifecycle Engine - Server Entry Point

mod config;
mod logging;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use config::{DaemonConfig, JobNumberMode};
use fleetsure_api_rpc::{RpcServer, RpcServerConfig};
use fleetsure_core::application::jobs::intake::year_of;
use fleetsure_core::application::{JobService, RunnerTaskService};
use fleetsure_core::port::id_provider::UuidProvider;
use fleetsure_core::port::time_provider::SystemTimeProvider;
use fleetsure_core::port::{
    JobNumberSource, JobRepository, RandomJobNumberSource, SequentialJobNumberSource,
    TimeProvider,
};
use fleetsure_infra_sqlite::{
    create_pool, run_migrations, SqliteJobRepository, SqliteRunnerTaskRepository,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let config = DaemonConfig::from_env()?;
    let _log_guard = logging::init(&config)?;

    info!("FleetSure lifecycle engine v{} starting...", VERSION);

    // 2. Database
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create {}", parent.display()))?;
    }
    let db_url = config.db_path.to_string_lossy().into_owned();
    info!(db_path = %db_url, "Initializing database...");

    let pool = create_pool(&db_url)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 3. Dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let job_repo = Arc::new(SqliteJobRepository::new(pool.clone()));
    let task_repo = Arc::new(SqliteRunnerTaskRepository::new(pool.clone()));

    let job_numbers: Arc<dyn JobNumberSource> = match config.job_numbers {
        JobNumberMode::Sequential => {
            let year = year_of(time_provider.now_millis())?;
            let last_used = job_repo.max_job_sequence(year).await?;
            let source = SequentialJobNumberSource::new();
            source.seed(year, last_used)?;
            info!(year, last_used, "Sequential job numbers seeded");
            Arc::new(source)
        }
        JobNumberMode::Random => Arc::new(RandomJobNumberSource),
    };

    let jobs = Arc::new(JobService::new(
        job_repo.clone(),
        job_repo,
        id_provider.clone(),
        time_provider.clone(),
        job_numbers,
    ));
    let tasks = Arc::new(RunnerTaskService::new(
        task_repo.clone(),
        task_repo,
        id_provider,
        time_provider,
    ));

    // 4. JSON-RPC server
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let (addr, rpc_handle) = RpcServer::new(rpc_config, jobs, tasks)
        .start()
        .await
        .context("RPC server start failed")?;

    info!(%addr, "System ready. Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    pool.close().await;

    info!("Shutdown complete.");
    Ok(())
}
