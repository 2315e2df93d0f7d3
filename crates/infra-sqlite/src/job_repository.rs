// SQLite JobRepository Implementation

use crate::error::{corrupt, map_sqlx_error};
use crate::history::{self, Ledger};
use crate::transaction::SqliteJobTransaction;
use async_trait::async_trait;
use fleetsure_core::domain::{Job, JobId, JobLocation, JobNumber, JobStatusEntry, StatusMachine};
use fleetsure_core::error::Result;
use fleetsure_core::port::{
    JobQuery, JobRepository, JobRepositoryTransaction, Page, TransactionalJobRepository,
};
use futures::stream::BoxStream;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub struct SqliteJobRepository {
    pool: SqlitePool,
}

impl SqliteJobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Shared WHERE clause of the page and count queries
fn push_fleet_filter<'q>(qb: &mut QueryBuilder<'q, Sqlite>, query: &'q JobQuery) {
    qb.push(" WHERE fleet_id = ").push_bind(&query.fleet_id);

    if !query.statuses.is_empty() {
        qb.push(" AND status IN (");
        let mut statuses = qb.separated(", ");
        for status in &query.statuses {
            statuses.push_bind(status.as_str());
        }
        statuses.push_unseparated(")");
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn find_by_job_number(&self, number: &JobNumber) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE job_number = ?")
            .bind(number.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn list_by_fleet(&self, query: &JobQuery) -> Result<Page<Job>> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM jobs");
        push_fleet_filter(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM jobs");
        push_fleet_filter(&mut select, query);
        select
            .push(" ORDER BY requested_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.offset()).unwrap_or(i64::MAX));

        let rows = select
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let jobs = rows
            .into_iter()
            .map(JobRow::into_job)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(jobs, query.page, query.limit, total))
    }

    async fn list_by_mechanic(&self, mechanic_id: &str, limit: u32) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(
            "SELECT * FROM jobs WHERE mechanic_id = ? ORDER BY requested_at DESC, id DESC LIMIT ?",
        )
        .bind(mechanic_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(JobRow::into_job).collect()
    }

    fn history_stream<'a>(&'a self, job_id: &'a str) -> BoxStream<'a, Result<JobStatusEntry>> {
        history::stream(&self.pool, Ledger::Job, job_id)
    }

    async fn max_job_sequence(&self, year: i32) -> Result<u32> {
        let prefix = JobNumber::year_prefix(year);

        let max: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(CAST(substr(job_number, ?) AS INTEGER)) FROM jobs WHERE job_number LIKE ?",
        )
        .bind(prefix.len() as i64 + 1)
        .bind(format!("{}%", prefix))
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match max {
            None => Ok(0),
            Some(n) => u32::try_from(n).map_err(|e| corrupt("job_number", e)),
        }
    }
}

#[async_trait]
impl TransactionalJobRepository for SqliteJobRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn JobRepositoryTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteJobTransaction::new(tx)))
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct JobRow {
    id: String,
    job_number: String,
    fleet_id: String,
    vehicle_id: String,
    mechanic_id: Option<String>,

    location_latitude: f64,
    location_longitude: f64,
    location_address: String,
    location_city: String,
    location_state: String,
    location_notes: Option<String>,

    issue_type: String,
    issue_description: String,
    urgency: String,
    job_type: String,

    status: String,

    requested_at: i64,
    assigned_at: Option<i64>,
    accepted_at: Option<i64>,
    en_route_at: Option<i64>,
    arrived_at: Option<i64>,
    completed_at: Option<i64>,
    paid_at: Option<i64>,
    cancelled_at: Option<i64>,
    cancel_reason: Option<String>,
}

impl JobRow {
    pub(crate) fn into_job(self) -> Result<Job> {
        Ok(Job {
            job_number: self
                .job_number
                .parse()
                .map_err(|e| corrupt("job_number", e))?,
            urgency: self.urgency.parse().map_err(|e| corrupt("urgency", e))?,
            job_type: self.job_type.parse().map_err(|e| corrupt("job_type", e))?,
            status: self.status.parse().map_err(|e| corrupt("status", e))?,
            id: self.id,
            fleet_id: self.fleet_id,
            vehicle_id: self.vehicle_id,
            mechanic_id: self.mechanic_id,
            location: JobLocation {
                latitude: self.location_latitude,
                longitude: self.location_longitude,
                address: self.location_address,
                city: self.location_city,
                state: self.location_state,
                notes: self.location_notes,
            },
            issue_type: self.issue_type,
            issue_description: self.issue_description,
            requested_at: self.requested_at,
            assigned_at: self.assigned_at,
            accepted_at: self.accepted_at,
            en_route_at: self.en_route_at,
            arrived_at: self.arrived_at,
            completed_at: self.completed_at,
            paid_at: self.paid_at,
            cancelled_at: self.cancelled_at,
            cancel_reason: self.cancel_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{job, setup_test_db};
    use fleetsure_core::domain::{Actor, JobStatus, NewStatusEntry};
    use fleetsure_core::error::AppError;
    use futures::TryStreamExt;

    async fn insert(repo: &SqliteJobRepository, job: &Job) {
        let mut tx = repo.begin_transaction().await.unwrap();
        tx.insert_job(job).await.unwrap();
        tx.append_history(NewStatusEntry::initial(job.id.clone(), job.requested_at))
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = SqliteJobRepository::new(setup_test_db().await);
        let job = job("job-1", "F1", 2026, 1, 1000);
        insert(&repo, &job).await;

        let found = repo.find_by_id(&job.id).await.unwrap();
        assert_eq!(found, Some(job.clone()));

        let by_number = repo.find_by_job_number(&job.job_number).await.unwrap();
        assert_eq!(by_number.map(|j| j.id), Some(job.id));

        assert!(repo.find_by_id(&"missing".to_string()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_job_number() {
        let repo = SqliteJobRepository::new(setup_test_db().await);
        insert(&repo, &job("job-1", "F1", 2026, 7, 1000)).await;

        let mut tx = repo.begin_transaction().await.unwrap();
        let err = tx
            .insert_job(&job("job-2", "F1", 2026, 7, 2000))
            .await
            .unwrap_err();
        tx.rollback().await.unwrap();

        match err {
            AppError::DuplicateJobNumber(number) => assert_eq!(number, "FS-2026-00007"),
            other => panic!("expected DuplicateJobNumber, got {other:?}"),
        }
        assert!(repo.find_by_id(&"job-2".to_string()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_fleet_pages_and_filters() {
        let repo = SqliteJobRepository::new(setup_test_db().await);
        for i in 0..5 {
            insert(&repo, &job(&format!("job-{i}"), "F1", 2026, i + 1, 1000 + i64::from(i))).await;
        }
        insert(&repo, &job("other", "F2", 2026, 99, 5000)).await;

        // Cancel one
        let mut tx = repo.begin_transaction().await.unwrap();
        let mut cancelled = tx.find_job(&"job-2".to_string()).await.unwrap().unwrap();
        cancelled.transition(JobStatus::Cancelled, 9000, None).unwrap();
        tx.update_job_if_status(&cancelled, JobStatus::Requested)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut query = JobQuery::for_fleet("F1");
        query.limit = 2;
        let page = repo.list_by_fleet(&query).await.unwrap();
        assert_eq!(page.meta.total, 5);
        assert_eq!(page.meta.total_pages, 3);
        let ids: Vec<_> = page.data.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["job-4", "job-3"]);

        query.page = 3;
        let last = repo.list_by_fleet(&query).await.unwrap();
        assert_eq!(last.data.len(), 1);
        assert_eq!(last.data[0].id, "job-0");

        let mut only_cancelled = JobQuery::for_fleet("F1");
        only_cancelled.statuses = vec![JobStatus::Cancelled];
        let page = repo.list_by_fleet(&only_cancelled).await.unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.data[0].id, "job-2");
    }

    #[tokio::test]
    async fn test_list_by_mechanic_newest_first_and_limited() {
        let repo = SqliteJobRepository::new(setup_test_db().await);
        for i in 0..4u32 {
            let mut assigned = job(&format!("m-{i}"), "F1", 2026, i + 1, 1000 + i64::from(i));
            assigned.assign_mechanic("M1");
            insert(&repo, &assigned).await;
        }
        let mut elsewhere = job("other", "F2", 2026, 50, 9000);
        elsewhere.assign_mechanic("M2");
        insert(&repo, &elsewhere).await;
        insert(&repo, &job("unassigned", "F1", 2026, 60, 9500)).await;

        let jobs = repo.list_by_mechanic("M1", 3).await.unwrap();
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["m-3", "m-2", "m-1"]);

        assert!(repo.list_by_mechanic("M9", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_max_job_sequence_is_per_year() {
        let repo = SqliteJobRepository::new(setup_test_db().await);
        assert_eq!(repo.max_job_sequence(2026).await.unwrap(), 0);

        insert(&repo, &job("a", "F1", 2026, 17, 1000)).await;
        insert(&repo, &job("b", "F1", 2026, 4, 1000)).await;
        insert(&repo, &job("c", "F1", 2025, 90_000, 1000)).await;

        assert_eq!(repo.max_job_sequence(2026).await.unwrap(), 17);
        assert_eq!(repo.max_job_sequence(2025).await.unwrap(), 90_000);
        assert_eq!(repo.max_job_sequence(2024).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_history_stream_newest_first_and_restartable() {
        let repo = SqliteJobRepository::new(setup_test_db().await);
        let mut job = job("job-1", "F1", 2026, 1, 1000);
        insert(&repo, &job).await;

        // Two entries with the same timestamp: insertion order decides
        let mut tx = repo.begin_transaction().await.unwrap();
        for to in [JobStatus::Assigned, JobStatus::Accepted] {
            let from = job.status;
            job.transition(to, 2000, None).unwrap();
            tx.update_job_if_status(&job, from).await.unwrap();
            tx.append_history(NewStatusEntry::transition(
                job.id.clone(),
                from,
                to,
                Actor::user("dispatcher-1"),
                None,
                2000,
            ))
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();

        let first: Vec<_> = repo.history_stream(&job.id).try_collect().await.unwrap();
        let statuses: Vec<_> = first.iter().map(|e| e.to_status).collect();
        assert_eq!(
            statuses,
            vec![JobStatus::Accepted, JobStatus::Assigned, JobStatus::Requested]
        );
        assert_eq!(first[2].from_status, None);
        assert_eq!(first[0].actor_id.as_deref(), Some("dispatcher-1"));

        let again: Vec<_> = repo.history_stream(&job.id).try_collect().await.unwrap();
        assert_eq!(first, again);
    }

    #[tokio::test]
    async fn test_corrupt_status_is_reported() {
        let pool = setup_test_db().await;
        let repo = SqliteJobRepository::new(pool.clone());
        insert(&repo, &job("job-1", "F1", 2026, 1, 1000)).await;

        sqlx::query("UPDATE jobs SET status = 'TELEPORTED' WHERE id = 'job-1'")
            .execute(&pool)
            .await
            .unwrap();

        let err = repo.find_by_id(&"job-1".to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
