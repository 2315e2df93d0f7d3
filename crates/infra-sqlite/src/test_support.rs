// Fixtures shared by the adapter tests

use crate::{create_pool, run_migrations};
use fleetsure_core::domain::{Job, JobDetails, JobLocation, JobNumber, JobType, Urgency};
use sqlx::SqlitePool;

pub(crate) async fn setup_test_db() -> SqlitePool {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

pub(crate) fn job(id: &str, fleet_id: &str, year: i32, sequence: u32, requested_at: i64) -> Job {
    Job::new(
        id,
        JobNumber::new(year, sequence).unwrap(),
        requested_at,
        JobDetails {
            fleet_id: fleet_id.to_string(),
            vehicle_id: "V1".to_string(),
            location: JobLocation {
                latitude: 47.6062,
                longitude: -122.3321,
                address: "I-5 N mile 165".to_string(),
                city: "Seattle".to_string(),
                state: "WA".to_string(),
                notes: Some("right shoulder".to_string()),
            },
            issue_type: "engine".to_string(),
            issue_description: "overheating".to_string(),
            urgency: Urgency::Priority,
            job_type: JobType::Roadside,
        },
    )
}
