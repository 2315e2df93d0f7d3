//! Shared wiring for the integration tests
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use fleetsure_core::application::{CreateJobRequest, JobService, RunnerTaskService};
use fleetsure_core::domain::{JobLocation, JobType, TaskLocation, Urgency};
use fleetsure_core::port::id_provider::UuidProvider;
use fleetsure_core::port::job_number::mocks::ScriptedJobNumberSource;
use fleetsure_core::port::time_provider::mocks::FixedTimeProvider;
use fleetsure_core::port::{JobNumberSource, RandomJobNumberSource, SequentialJobNumberSource};
use fleetsure_infra_sqlite::{
    create_pool, run_migrations, SqliteJobRepository, SqliteRunnerTaskRepository,
};
use sqlx::SqlitePool;

/// 2026-06-01T00:00:00Z
pub const JUNE_2026: i64 = 1_780_272_000_000;

pub struct Harness {
    pub pool: SqlitePool,
    pub clock: Arc<FixedTimeProvider>,
    pub jobs: JobService,
    pub tasks: RunnerTaskService,
}

impl Harness {
    pub async fn in_memory() -> Self {
        Self::with_numbers(":memory:", Arc::new(SequentialJobNumberSource::new())).await
    }

    pub async fn with_numbers(db_url: &str, numbers: Arc<dyn JobNumberSource>) -> Self {
        let pool = create_pool(db_url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        Self::on_pool(pool, numbers)
    }

    pub fn on_pool(pool: SqlitePool, numbers: Arc<dyn JobNumberSource>) -> Self {
        let clock = Arc::new(FixedTimeProvider::new(JUNE_2026));
        let job_repo = Arc::new(SqliteJobRepository::new(pool.clone()));
        let task_repo = Arc::new(SqliteRunnerTaskRepository::new(pool.clone()));

        let jobs = JobService::new(
            job_repo.clone(),
            job_repo,
            Arc::new(UuidProvider),
            clock.clone(),
            numbers,
        );
        let tasks = RunnerTaskService::new(
            task_repo.clone(),
            task_repo,
            Arc::new(UuidProvider),
            clock.clone(),
        );

        Self {
            pool,
            clock,
            jobs,
            tasks,
        }
    }

    pub async fn scripted(suffixes: impl IntoIterator<Item = u32>) -> Self {
        Self::with_numbers(":memory:", Arc::new(ScriptedJobNumberSource::new(suffixes))).await
    }

    pub async fn random() -> Self {
        Self::with_numbers(":memory:", Arc::new(RandomJobNumberSource)).await
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// The Seattle breakdown used throughout the tests
pub fn seattle_request() -> CreateJobRequest {
    CreateJobRequest {
        fleet_id: "F1".to_string(),
        vehicle_id: "V1".to_string(),
        location: JobLocation {
            latitude: 47.6062,
            longitude: -122.3321,
            address: "I-5 N mile 165".to_string(),
            city: "Seattle".to_string(),
            state: "WA".to_string(),
            notes: None,
        },
        issue_type: "engine".to_string(),
        issue_description: "overheating".to_string(),
        urgency: Urgency::Priority,
        job_type: JobType::Roadside,
    }
}

pub fn parts_store() -> TaskLocation {
    TaskLocation {
        latitude: 47.5951,
        longitude: -122.3316,
        address: "NAPA Auto Parts, 4th Ave S".to_string(),
    }
}

pub fn roadside() -> TaskLocation {
    TaskLocation {
        latitude: 47.6062,
        longitude: -122.3321,
        address: "I-5 N mile 165".to_string(),
    }
}

/// On-disk database in the temp dir, removed (with its WAL files) on drop
pub struct TempDb {
    pub path: PathBuf,
}

impl TempDb {
    pub fn new() -> Self {
        let path =
            std::env::temp_dir().join(format!("fleetsure-test-{}.db", uuid::Uuid::new_v4()));
        Self { path }
    }

    pub fn url(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
