// Job Request Intake Use Case

use crate::application::constants::{
    MAX_ISSUE_DESCRIPTION_LEN, MAX_JOB_NUMBER_ATTEMPTS, MAX_SHORT_FIELD_LEN, MAX_TEXT_FIELD_LEN,
};
use crate::application::unit_of_work::rollback_quietly;
use crate::application::{ledger, validation};
use crate::domain::{
    Actor, Job, JobDetails, JobLocation, JobNumber, JobStatus, JobType, Urgency,
};
use crate::error::{AppError, Result};
use crate::port::{
    IdProvider, JobNumberSource, JobRepositoryTransaction, TimeProvider,
    TransactionalJobRepository,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Create-job request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub fleet_id: String,
    pub vehicle_id: String,
    pub location: JobLocation,
    pub issue_type: String,
    pub issue_description: String,
    pub urgency: Urgency,
    #[serde(default)]
    pub job_type: JobType,
}

/// Validate and normalize a create-job request
pub fn validate_request(req: CreateJobRequest) -> Result<JobDetails> {
    let fleet_id = validation::required_id("fleet_id", req.fleet_id)?;
    let vehicle_id = validation::required_id("vehicle_id", req.vehicle_id)?;

    let location = req.location;
    validation::coordinates(location.latitude, location.longitude)?;
    let location = JobLocation {
        latitude: location.latitude,
        longitude: location.longitude,
        address: validation::required("location.address", location.address, MAX_TEXT_FIELD_LEN)?,
        city: validation::required("location.city", location.city, MAX_SHORT_FIELD_LEN)?,
        state: validation::required("location.state", location.state, MAX_SHORT_FIELD_LEN)?,
        notes: validation::optional_text("location.notes", location.notes)?,
    };

    let issue_type = validation::required("issue_type", req.issue_type, MAX_SHORT_FIELD_LEN)?;
    let issue_description = req.issue_description.trim().to_string();
    if issue_description.chars().count() > MAX_ISSUE_DESCRIPTION_LEN {
        return Err(AppError::Validation(format!(
            "issue_description too long (max {} chars)",
            MAX_ISSUE_DESCRIPTION_LEN
        )));
    }

    Ok(JobDetails {
        fleet_id,
        vehicle_id,
        location,
        issue_type,
        issue_description,
        urgency: req.urgency,
        job_type: req.job_type,
    })
}

/// Calendar year (UTC) of an epoch-ms timestamp
pub fn year_of(millis: i64) -> Result<i32> {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.year())
        .ok_or_else(|| AppError::Internal(format!("timestamp {} out of range", millis)))
}

/// Execute create-job use case
///
/// The job row and its initial ledger entry are written in one transaction.
/// A job-number collision rolls back and retries with a fresh number, up to
/// `MAX_JOB_NUMBER_ATTEMPTS` times.
///
/// # Arguments
///
/// * `job_repo` - Transactional job repository
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `numbers` - Job number suffix allocator
/// * `req` - Create-job request
pub async fn execute(
    job_repo: &dyn TransactionalJobRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    numbers: &dyn JobNumberSource,
    req: CreateJobRequest,
) -> Result<Job> {
    let details = validate_request(req)?;

    let requested_at = time_provider.now_millis();
    let year = year_of(requested_at)?;
    let job_id = id_provider.generate_id();

    let mut last_collision = String::new();
    for attempt in 1..=MAX_JOB_NUMBER_ATTEMPTS {
        let job_number = JobNumber::new(year, numbers.next_suffix(year)?)?;
        let job = Job::new(job_id.clone(), job_number, requested_at, details.clone());

        let mut tx = job_repo.begin_transaction().await?;
        match insert_with_ledger(tx.as_mut(), &job).await {
            Ok(()) => {
                tx.commit().await?;
                info!(
                    job_id = %job.id,
                    job_number = %job.job_number,
                    fleet_id = %job.fleet_id,
                    urgency = %job.urgency,
                    "Job requested"
                );
                return Ok(job);
            }
            Err(AppError::DuplicateJobNumber(number)) => {
                rollback_quietly(tx).await;
                warn!(attempt, job_number = %number, "Job number already taken, retrying");
                last_collision = number;
            }
            Err(e) => {
                rollback_quietly(tx).await;
                return Err(e);
            }
        }
    }

    Err(AppError::DuplicateJobNumber(format!(
        "{} (gave up after {} attempts)",
        last_collision, MAX_JOB_NUMBER_ATTEMPTS
    )))
}

async fn insert_with_ledger(tx: &mut dyn JobRepositoryTransaction, job: &Job) -> Result<()> {
    tx.insert_job(job).await?;
    ledger::record(
        tx,
        &job.id,
        None,
        JobStatus::Requested,
        &Actor::system(),
        None,
        job.requested_at,
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateJobRequest {
        CreateJobRequest {
            fleet_id: "F1".to_string(),
            vehicle_id: "V1".to_string(),
            location: JobLocation {
                latitude: 47.6062,
                longitude: -122.3321,
                address: "I-5 N mile 165".to_string(),
                city: "Seattle".to_string(),
                state: "WA".to_string(),
                notes: Some("   ".to_string()),
            },
            issue_type: "engine".to_string(),
            issue_description: "overheating".to_string(),
            urgency: Urgency::Priority,
            job_type: JobType::Roadside,
        }
    }

    #[test]
    fn test_validate_valid_request() {
        let details = validate_request(request()).unwrap();
        assert_eq!(details.fleet_id, "F1");
        assert_eq!(details.location.notes, None);
        assert_eq!(details.urgency, Urgency::Priority);
    }

    #[test]
    fn test_validate_empty_fleet() {
        let mut req = request();
        req.fleet_id = " ".to_string();
        let err = validate_request(req).unwrap_err();
        assert!(err.to_string().contains("fleet_id cannot be empty"));
    }

    #[test]
    fn test_validate_latitude_out_of_range() {
        let mut req = request();
        req.location.latitude = 123.0;
        assert!(validate_request(req)
            .unwrap_err()
            .to_string()
            .contains("latitude"));
    }

    #[test]
    fn test_validate_description_too_long() {
        let mut req = request();
        req.issue_description = "x".repeat(MAX_ISSUE_DESCRIPTION_LEN + 1);
        assert!(validate_request(req)
            .unwrap_err()
            .to_string()
            .contains("too long"));
    }

    #[test]
    fn test_job_type_defaults_to_roadside() {
        let json = serde_json::json!({
            "fleet_id": "F1",
            "vehicle_id": "V1",
            "location": {
                "latitude": 47.6, "longitude": -122.3,
                "address": "x", "city": "Seattle", "state": "WA"
            },
            "issue_type": "tires",
            "issue_description": "",
            "urgency": "STANDARD"
        });
        let req: CreateJobRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.job_type, JobType::Roadside);
    }

    #[test]
    fn test_unknown_urgency_rejected_at_parse() {
        let json = serde_json::json!({
            "fleet_id": "F1", "vehicle_id": "V1",
            "location": {"latitude": 0.0, "longitude": 0.0, "address": "x", "city": "y", "state": "z"},
            "issue_type": "tires", "issue_description": "", "urgency": "URGENT"
        });
        assert!(serde_json::from_value::<CreateJobRequest>(json).is_err());
    }

    #[test]
    fn test_year_of() {
        // 2026-10-17T00:00:00Z
        assert_eq!(year_of(1_792_195_200_000).unwrap(), 2026);
    }
}
