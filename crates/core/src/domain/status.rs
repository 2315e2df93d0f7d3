// Status machines for jobs and runner tasks

use crate::domain::error::{DomainError, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// A closed set of statuses with an explicit adjacency table.
///
/// The adjacency table is the only source of truth for which transitions are
/// legal; every mutation goes through [`ensure_transition`] before touching
/// any field.
pub trait StatusMachine:
    Copy
    + Eq
    + Debug
    + Display
    + FromStr<Err = DomainError>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Status a freshly created record starts in
    fn initial() -> Self;

    /// Statuses directly reachable from `self`
    fn successors(&self) -> &'static [Self];

    /// Canonical SCREAMING_SNAKE_CASE name (wire and storage form)
    fn as_str(&self) -> &'static str;

    fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }

    fn can_transition_to(&self, to: Self) -> bool {
        self.successors().contains(&to)
    }
}

/// Reject `from -> to` unless it is in the adjacency table
pub fn ensure_transition<S: StatusMachine>(from: S, to: S) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(DomainError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Job Status
///
/// REQUESTED -> ASSIGNED -> ACCEPTED -> EN_ROUTE -> ON_SITE -> COMPLETED -> PAID,
/// with CANCELLED reachable from every non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Requested,
    Assigned,
    Accepted,
    EnRoute,
    OnSite,
    Completed,
    Paid,
    Cancelled,
}

impl JobStatus {
    pub const ALL: [JobStatus; 8] = [
        JobStatus::Requested,
        JobStatus::Assigned,
        JobStatus::Accepted,
        JobStatus::EnRoute,
        JobStatus::OnSite,
        JobStatus::Completed,
        JobStatus::Paid,
        JobStatus::Cancelled,
    ];
}

impl StatusMachine for JobStatus {
    fn initial() -> Self {
        JobStatus::Requested
    }

    fn successors(&self) -> &'static [Self] {
        use JobStatus::*;
        match self {
            Requested => &[Assigned, Cancelled],
            Assigned => &[Accepted, Cancelled],
            Accepted => &[EnRoute, Cancelled],
            EnRoute => &[OnSite, Cancelled],
            OnSite => &[Completed, Cancelled],
            Completed => &[Paid, Cancelled],
            Paid | Cancelled => &[],
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Requested => "REQUESTED",
            JobStatus::Assigned => "ASSIGNED",
            JobStatus::Accepted => "ACCEPTED",
            JobStatus::EnRoute => "EN_ROUTE",
            JobStatus::OnSite => "ON_SITE",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Paid => "PAID",
            JobStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::UnknownStatus(s.to_string()))
    }
}

/// Runner Task Status
///
/// PENDING -> ACCEPTED -> PICKING_UP -> PICKED_UP -> IN_TRANSIT -> DELIVERED,
/// strictly forward. CANCELLED is reachable from every non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunnerTaskStatus {
    Pending,
    Accepted,
    PickingUp,
    PickedUp,
    InTransit,
    Delivered,
    Cancelled,
}

impl RunnerTaskStatus {
    pub const ALL: [RunnerTaskStatus; 7] = [
        RunnerTaskStatus::Pending,
        RunnerTaskStatus::Accepted,
        RunnerTaskStatus::PickingUp,
        RunnerTaskStatus::PickedUp,
        RunnerTaskStatus::InTransit,
        RunnerTaskStatus::Delivered,
        RunnerTaskStatus::Cancelled,
    ];
}

impl StatusMachine for RunnerTaskStatus {
    fn initial() -> Self {
        RunnerTaskStatus::Pending
    }

    fn successors(&self) -> &'static [Self] {
        use RunnerTaskStatus::*;
        match self {
            Pending => &[Accepted, Cancelled],
            Accepted => &[PickingUp, Cancelled],
            PickingUp => &[PickedUp, Cancelled],
            PickedUp => &[InTransit, Cancelled],
            InTransit => &[Delivered, Cancelled],
            Delivered | Cancelled => &[],
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            RunnerTaskStatus::Pending => "PENDING",
            RunnerTaskStatus::Accepted => "ACCEPTED",
            RunnerTaskStatus::PickingUp => "PICKING_UP",
            RunnerTaskStatus::PickedUp => "PICKED_UP",
            RunnerTaskStatus::InTransit => "IN_TRANSIT",
            RunnerTaskStatus::Delivered => "DELIVERED",
            RunnerTaskStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for RunnerTaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunnerTaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        RunnerTaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::UnknownStatus(s.to_string()))
    }
}
