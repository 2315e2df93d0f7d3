// Job Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::job_number::JobNumber;
use crate::domain::status::{ensure_transition, JobStatus};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Job ID (UUID v4)
pub type JobId = String;

pub type FleetId = String;
pub type VehicleId = String;
pub type MechanicId = String;

/// Urgency of a service request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Standard,
    Priority,
    Emergency,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Standard => write!(f, "STANDARD"),
            Urgency::Priority => write!(f, "PRIORITY"),
            Urgency::Emergency => write!(f, "EMERGENCY"),
        }
    }
}

impl FromStr for Urgency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "STANDARD" => Ok(Urgency::Standard),
            "PRIORITY" => Ok(Urgency::Priority),
            "EMERGENCY" => Ok(Urgency::Emergency),
            other => Err(DomainError::ValidationError(format!(
                "unknown urgency: {}",
                other
            ))),
        }
    }
}

/// Kind of service visit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    #[default]
    Roadside,
    Scheduled,
    Preventive,
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobType::Roadside => write!(f, "ROADSIDE"),
            JobType::Scheduled => write!(f, "SCHEDULED"),
            JobType::Preventive => write!(f, "PREVENTIVE"),
        }
    }
}

impl FromStr for JobType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ROADSIDE" => Ok(JobType::Roadside),
            "SCHEDULED" => Ok(JobType::Scheduled),
            "PREVENTIVE" => Ok(JobType::Preventive),
            other => Err(DomainError::ValidationError(format!(
                "unknown job type: {}",
                other
            ))),
        }
    }
}

/// Where the vehicle is waiting for service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Job Entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    // Identity
    pub id: JobId,
    pub job_number: JobNumber,

    // Ownership
    pub fleet_id: FleetId,
    pub vehicle_id: VehicleId,
    pub mechanic_id: Option<MechanicId>,

    // Request details
    pub location: JobLocation,
    pub issue_type: String,
    pub issue_description: String,
    pub urgency: Urgency,
    pub job_type: JobType,

    pub status: JobStatus,

    // Lifecycle timestamps (epoch ms)
    pub requested_at: i64,
    pub assigned_at: Option<i64>,
    pub accepted_at: Option<i64>,
    pub en_route_at: Option<i64>,
    pub arrived_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub paid_at: Option<i64>,
    pub cancelled_at: Option<i64>,
    pub cancel_reason: Option<String>,
}

/// Fields of a job that are chosen by the requesting fleet
#[derive(Debug, Clone, PartialEq)]
pub struct JobDetails {
    pub fleet_id: FleetId,
    pub vehicle_id: VehicleId,
    pub location: JobLocation,
    pub issue_type: String,
    pub issue_description: String,
    pub urgency: Urgency,
    pub job_type: JobType,
}

impl Job {
    /// Create a new job in REQUESTED
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `job_number` - Allocated human-readable number
    /// * `requested_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `details` - Fleet-supplied request details
    pub fn new(
        id: impl Into<JobId>,
        job_number: JobNumber,
        requested_at: i64,
        details: JobDetails,
    ) -> Self {
        Self {
            id: id.into(),
            job_number,
            fleet_id: details.fleet_id,
            vehicle_id: details.vehicle_id,
            mechanic_id: None,
            location: details.location,
            issue_type: details.issue_type,
            issue_description: details.issue_description,
            urgency: details.urgency,
            job_type: details.job_type,
            status: JobStatus::Requested,
            requested_at,
            assigned_at: None,
            accepted_at: None,
            en_route_at: None,
            arrived_at: None,
            completed_at: None,
            paid_at: None,
            cancelled_at: None,
            cancel_reason: None,
        }
    }

    /// Timestamp at which `status` was reached, if it was
    pub fn timestamp_for(&self, status: JobStatus) -> Option<i64> {
        match status {
            JobStatus::Requested => Some(self.requested_at),
            JobStatus::Assigned => self.assigned_at,
            JobStatus::Accepted => self.accepted_at,
            JobStatus::EnRoute => self.en_route_at,
            JobStatus::OnSite => self.arrived_at,
            JobStatus::Completed => self.completed_at,
            JobStatus::Paid => self.paid_at,
            JobStatus::Cancelled => self.cancelled_at,
        }
    }

    fn timestamp_slot(&mut self, status: JobStatus) -> Option<&mut Option<i64>> {
        match status {
            JobStatus::Requested => None,
            JobStatus::Assigned => Some(&mut self.assigned_at),
            JobStatus::Accepted => Some(&mut self.accepted_at),
            JobStatus::EnRoute => Some(&mut self.en_route_at),
            JobStatus::OnSite => Some(&mut self.arrived_at),
            JobStatus::Completed => Some(&mut self.completed_at),
            JobStatus::Paid => Some(&mut self.paid_at),
            JobStatus::Cancelled => Some(&mut self.cancelled_at),
        }
    }

    /// Latest lifecycle timestamp stamped so far
    pub fn last_transition_at(&self) -> i64 {
        JobStatus::ALL
            .into_iter()
            .filter_map(|status| self.timestamp_for(status))
            .max()
            .unwrap_or(self.requested_at)
    }

    /// Apply a validated transition with an explicit timestamp.
    ///
    /// The stamped time never goes below the latest timestamp already set, so
    /// lifecycle timestamps stay non-decreasing even if the clock steps back.
    /// Returns the time actually stamped.
    pub fn transition(
        &mut self,
        to: JobStatus,
        now_millis: i64,
        reason: Option<String>,
    ) -> Result<i64> {
        ensure_transition(self.status, to)?;

        let stamped_at = now_millis.max(self.last_transition_at());
        if let Some(slot) = self.timestamp_slot(to) {
            *slot = Some(stamped_at);
        }
        if to == JobStatus::Cancelled {
            self.cancel_reason = reason;
        }
        self.status = to;
        Ok(stamped_at)
    }

    /// Record which mechanic the job is dispatched to
    pub fn assign_mechanic(&mut self, mechanic_id: impl Into<MechanicId>) {
        self.mechanic_id = Some(mechanic_id.into());
    }
}
