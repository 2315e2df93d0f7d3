// Runner Task Domain Model (parts delivery)

use crate::domain::actor::{Actor, UserId};
use crate::domain::error::{DomainError, Result};
use crate::domain::job::JobId;
use crate::domain::status::{ensure_transition, RunnerTaskStatus};
use serde::{Deserialize, Serialize};

pub type RunnerTaskId = String;
pub type RunnerId = UserId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

/// Runner Task Entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerTask {
    pub id: RunnerTaskId,
    pub job_id: JobId,
    pub runner_id: Option<RunnerId>,

    pub pickup: TaskLocation,
    pub delivery: TaskLocation,
    pub notes: Option<String>,

    pub status: RunnerTaskStatus,

    // Lifecycle timestamps (epoch ms)
    pub created_at: i64,
    pub accepted_at: Option<i64>,
    pub pickup_arrived_at: Option<i64>,
    pub picked_up_at: Option<i64>,
    pub delivery_started_at: Option<i64>,
    pub delivered_at: Option<i64>,
    pub cancelled_at: Option<i64>,
    pub cancel_reason: Option<String>,
}

impl RunnerTask {
    /// Create a new task in PENDING with injected ID and timestamp
    pub fn new(
        id: impl Into<RunnerTaskId>,
        job_id: impl Into<JobId>,
        created_at: i64,
        pickup: TaskLocation,
        delivery: TaskLocation,
    ) -> Self {
        Self {
            id: id.into(),
            job_id: job_id.into(),
            runner_id: None,
            pickup,
            delivery,
            notes: None,
            status: RunnerTaskStatus::Pending,
            created_at,
            accepted_at: None,
            pickup_arrived_at: None,
            picked_up_at: None,
            delivery_started_at: None,
            delivered_at: None,
            cancelled_at: None,
            cancel_reason: None,
        }
    }

    pub fn timestamp_for(&self, status: RunnerTaskStatus) -> Option<i64> {
        match status {
            RunnerTaskStatus::Pending => Some(self.created_at),
            RunnerTaskStatus::Accepted => self.accepted_at,
            RunnerTaskStatus::PickingUp => self.pickup_arrived_at,
            RunnerTaskStatus::PickedUp => self.picked_up_at,
            RunnerTaskStatus::InTransit => self.delivery_started_at,
            RunnerTaskStatus::Delivered => self.delivered_at,
            RunnerTaskStatus::Cancelled => self.cancelled_at,
        }
    }

    fn timestamp_slot(&mut self, status: RunnerTaskStatus) -> Option<&mut Option<i64>> {
        match status {
            RunnerTaskStatus::Pending => None,
            RunnerTaskStatus::Accepted => Some(&mut self.accepted_at),
            RunnerTaskStatus::PickingUp => Some(&mut self.pickup_arrived_at),
            RunnerTaskStatus::PickedUp => Some(&mut self.picked_up_at),
            RunnerTaskStatus::InTransit => Some(&mut self.delivery_started_at),
            RunnerTaskStatus::Delivered => Some(&mut self.delivered_at),
            RunnerTaskStatus::Cancelled => Some(&mut self.cancelled_at),
        }
    }

    pub fn last_transition_at(&self) -> i64 {
        RunnerTaskStatus::ALL
            .into_iter()
            .filter_map(|status| self.timestamp_for(status))
            .max()
            .unwrap_or(self.created_at)
    }

    /// Move the task one step forward (or cancel it).
    ///
    /// Accepting claims the task for the accepting user when nobody holds it
    /// yet; a task already claimed by someone else cannot be accepted.
    pub fn advance(
        &mut self,
        to: RunnerTaskStatus,
        now_millis: i64,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<i64> {
        ensure_transition(self.status, to)?;

        if to == RunnerTaskStatus::Accepted {
            match (self.runner_id.as_deref(), actor.user_id()) {
                (Some(held), Some(by)) if held != by => {
                    return Err(DomainError::ValidationError(format!(
                        "task {} is assigned to another runner",
                        self.id
                    )));
                }
                (None, Some(by)) => self.runner_id = Some(by.to_string()),
                _ => {}
            }
        }

        let stamped_at = now_millis.max(self.last_transition_at());
        if let Some(slot) = self.timestamp_slot(to) {
            *slot = Some(stamped_at);
        }
        if to == RunnerTaskStatus::Cancelled {
            self.cancel_reason = reason;
        }
        self.status = to;
        Ok(stamped_at)
    }
}
