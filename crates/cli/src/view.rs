//! Table rows and terminal formatting for server responses

use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use serde::Deserialize;
use tabled::Tabled;

// Subsets of the server's JSON; unknown fields are ignored

#[derive(Debug, Deserialize)]
pub struct Job {
    pub id: String,
    pub job_number: String,
    pub fleet_id: String,
    pub vehicle_id: String,
    pub mechanic_id: Option<String>,
    pub issue_type: String,
    pub urgency: String,
    pub status: String,
    pub requested_at: i64,
    pub cancel_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobPage {
    pub data: Vec<Job>,
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize)]
pub struct RunnerTask {
    pub id: String,
    pub job_id: String,
    pub runner_id: Option<String>,
    pub pickup: TaskLocation,
    pub delivery: TaskLocation,
    pub status: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct TaskLocation {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryEntry {
    pub from_status: Option<String>,
    pub to_status: String,
    pub actor_kind: String,
    pub actor_id: Option<String>,
    pub reason: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct JobHistory {
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TaskHistory {
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MechanicJobs {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<RunnerTask>,
}

#[derive(Tabled)]
pub struct JobRow {
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Fleet")]
    fleet: String,
    #[tabled(rename = "Vehicle")]
    vehicle: String,
    #[tabled(rename = "Issue")]
    issue: String,
    #[tabled(rename = "Urgency")]
    urgency: String,
    #[tabled(rename = "Mechanic")]
    mechanic: String,
    #[tabled(rename = "Requested")]
    requested: String,
}

impl From<&Job> for JobRow {
    fn from(job: &Job) -> Self {
        Self {
            number: job.job_number.clone(),
            id: job.id.clone(),
            status: job.status.clone(),
            fleet: job.fleet_id.clone(),
            vehicle: job.vehicle_id.clone(),
            issue: job.issue_type.clone(),
            urgency: job.urgency.clone(),
            mechanic: or_dash(&job.mechanic_id),
            requested: timestamp(job.requested_at),
        }
    }
}

#[derive(Tabled)]
pub struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Job")]
    job: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Runner")]
    runner: String,
    #[tabled(rename = "Pickup")]
    pickup: String,
    #[tabled(rename = "Delivery")]
    delivery: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&RunnerTask> for TaskRow {
    fn from(task: &RunnerTask) -> Self {
        Self {
            id: task.id.clone(),
            job: task.job_id.clone(),
            status: task.status.clone(),
            runner: or_dash(&task.runner_id),
            pickup: task.pickup.address.clone(),
            delivery: task.delivery.address.clone(),
            created: timestamp(task.created_at),
        }
    }
}

#[derive(Tabled)]
pub struct HistoryRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Actor")]
    actor: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        let actor = match &entry.actor_id {
            Some(id) => format!("{} {}", entry.actor_kind, id),
            None => entry.actor_kind.clone(),
        };
        Self {
            when: timestamp(entry.created_at),
            from: or_dash(&entry.from_status),
            to: entry.to_status.clone(),
            actor,
            reason: or_dash(&entry.reason),
        }
    }
}

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

/// Epoch millis as local time
pub fn timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}

pub fn status(status: &str) -> ColoredString {
    match status {
        "PAID" | "DELIVERED" => status.green().bold(),
        "CANCELLED" => status.red().bold(),
        "REQUESTED" | "PENDING" => status.yellow(),
        _ => status.cyan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_row_formats_actor() {
        let entry = HistoryEntry {
            from_status: None,
            to_status: "REQUESTED".to_string(),
            actor_kind: "USER".to_string(),
            actor_id: Some("dispatcher-1".to_string()),
            reason: None,
            created_at: 0,
        };
        let row = HistoryRow::from(&entry);
        assert_eq!(row.actor, "USER dispatcher-1");
        assert_eq!(row.from, "-");
    }

    #[test]
    fn test_timestamp_out_of_range_falls_back_to_raw() {
        assert_eq!(timestamp(i64::MAX), i64::MAX.to_string());
    }
}
