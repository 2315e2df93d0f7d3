// Job Repository Port (read side)

use crate::domain::{FleetId, Job, JobId, JobNumber, JobStatus, JobStatusEntry};
use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Fleet-scoped job listing filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    pub fleet_id: FleetId,
    /// Empty means every status
    pub statuses: Vec<JobStatus>,
    /// 1-based
    pub page: u32,
    pub limit: u32,
}

impl JobQuery {
    pub fn for_fleet(fleet_id: impl Into<FleetId>) -> Self {
        Self {
            fleet_id: fleet_id.into(),
            statuses: Vec::new(),
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, page: u32, limit: u32, total: i64) -> Self {
        let limit_i = i64::from(limit.max(1));
        Self {
            data,
            meta: PageMeta {
                page,
                limit,
                total,
                total_pages: (total + limit_i - 1) / limit_i,
            },
        }
    }
}

/// Repository interface for Job reads
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>>;

    /// Find job by its human-readable number
    async fn find_by_job_number(&self, number: &JobNumber) -> Result<Option<Job>>;

    /// One page of a fleet's jobs, most recently requested first, plus the total
    async fn list_by_fleet(&self, query: &JobQuery) -> Result<Page<Job>>;

    /// Up to `limit` jobs dispatched to a mechanic, most recently requested first
    async fn list_by_mechanic(&self, mechanic_id: &str, limit: u32) -> Result<Vec<Job>>;

    /// Ledger of a job, most recent first.
    ///
    /// The stream is lazy and finite; calling again restarts from the newest
    /// entry without side effects.
    fn history_stream<'a>(&'a self, job_id: &'a str) -> BoxStream<'a, Result<JobStatusEntry>>;

    /// Highest suffix used for `year`, 0 if none
    async fn max_job_sequence(&self, year: i32) -> Result<u32>;
}
