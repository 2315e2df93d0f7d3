// Status ledger storage shared by jobs and runner tasks

use crate::error::{corrupt, map_sqlx_error};
use fleetsure_core::domain::{NewStatusEntry, StatusHistoryEntry, StatusMachine};
use fleetsure_core::error::Result;
use futures::stream::{BoxStream, StreamExt};
use sqlx::{SqliteConnection, SqlitePool};

/// Which ledger table an entry belongs to
#[derive(Debug, Clone, Copy)]
pub(crate) enum Ledger {
    Job,
    RunnerTask,
}

impl Ledger {
    fn insert_sql(self) -> &'static str {
        match self {
            Ledger::Job => {
                "INSERT INTO job_status_history \
                 (job_id, from_status, to_status, actor_id, actor_kind, reason, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)"
            }
            Ledger::RunnerTask => {
                "INSERT INTO runner_task_status_history \
                 (task_id, from_status, to_status, actor_id, actor_kind, reason, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)"
            }
        }
    }

    // Ties on created_at are broken by insertion order
    fn select_sql(self) -> &'static str {
        match self {
            Ledger::Job => {
                "SELECT id, job_id AS parent_id, from_status, to_status, actor_id, actor_kind, reason, created_at \
                 FROM job_status_history WHERE job_id = ? \
                 ORDER BY created_at DESC, id DESC"
            }
            Ledger::RunnerTask => {
                "SELECT id, task_id AS parent_id, from_status, to_status, actor_id, actor_kind, reason, created_at \
                 FROM runner_task_status_history WHERE task_id = ? \
                 ORDER BY created_at DESC, id DESC"
            }
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    parent_id: String,
    from_status: Option<String>,
    to_status: String,
    actor_id: Option<String>,
    actor_kind: String,
    reason: Option<String>,
    created_at: i64,
}

impl HistoryRow {
    fn into_entry<S: StatusMachine>(self) -> Result<StatusHistoryEntry<S>> {
        let from_status = self
            .from_status
            .map(|s| s.parse::<S>().map_err(|e| corrupt("from_status", e)))
            .transpose()?;

        Ok(StatusHistoryEntry {
            id: self.id,
            parent_id: self.parent_id,
            from_status,
            to_status: self
                .to_status
                .parse()
                .map_err(|e| corrupt("to_status", e))?,
            actor_id: self.actor_id,
            actor_kind: self
                .actor_kind
                .parse()
                .map_err(|e| corrupt("actor_kind", e))?,
            reason: self.reason,
            created_at: self.created_at,
        })
    }
}

/// Append one entry; the surrogate id comes from the AUTOINCREMENT rowid
pub(crate) async fn append<S: StatusMachine>(
    conn: &mut SqliteConnection,
    ledger: Ledger,
    entry: NewStatusEntry<S>,
) -> Result<StatusHistoryEntry<S>> {
    let result = sqlx::query(ledger.insert_sql())
        .bind(&entry.parent_id)
        .bind(entry.from_status.map(|s| s.as_str()))
        .bind(entry.to_status.as_str())
        .bind(entry.actor.id.as_deref())
        .bind(entry.actor.kind.to_string())
        .bind(&entry.reason)
        .bind(entry.created_at)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

    Ok(entry.into_entry(result.last_insert_rowid()))
}

/// Lazily stream a ledger, newest first
pub(crate) fn stream<'a, S: StatusMachine + 'a>(
    pool: &'a SqlitePool,
    ledger: Ledger,
    parent_id: &'a str,
) -> BoxStream<'a, Result<StatusHistoryEntry<S>>> {
    sqlx::query_as::<_, HistoryRow>(ledger.select_sql())
        .bind(parent_id)
        .fetch(pool)
        .map(|row| row.map_err(map_sqlx_error).and_then(HistoryRow::into_entry))
        .boxed()
}
