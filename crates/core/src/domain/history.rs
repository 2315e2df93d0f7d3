// Status history ledger entries

use crate::domain::actor::{Actor, ActorKind, UserId};
use crate::domain::status::StatusMachine;
use serde::{Deserialize, Serialize};

/// One immutable audit record of a status change.
///
/// `from_status` is `None` only on the entry written when the record was
/// created. Entries are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "S: StatusMachine")]
pub struct StatusHistoryEntry<S: StatusMachine> {
    pub id: i64,
    pub parent_id: String,
    pub from_status: Option<S>,
    pub to_status: S,
    pub actor_id: Option<UserId>,
    pub actor_kind: ActorKind,
    pub reason: Option<String>,
    pub created_at: i64,
}

/// Ledger entry that has not been appended yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatusEntry<S: StatusMachine> {
    pub parent_id: String,
    pub from_status: Option<S>,
    pub to_status: S,
    pub actor: Actor,
    pub reason: Option<String>,
    pub created_at: i64,
}

impl<S: StatusMachine> NewStatusEntry<S> {
    /// Entry seeding the ledger of a freshly created record
    pub fn initial(parent_id: impl Into<String>, created_at: i64) -> Self {
        Self {
            parent_id: parent_id.into(),
            from_status: None,
            to_status: S::initial(),
            actor: Actor::system(),
            reason: None,
            created_at,
        }
    }

    pub fn transition(
        parent_id: impl Into<String>,
        from: S,
        to: S,
        actor: Actor,
        reason: Option<String>,
        created_at: i64,
    ) -> Self {
        Self {
            parent_id: parent_id.into(),
            from_status: Some(from),
            to_status: to,
            actor,
            reason,
            created_at,
        }
    }

    /// Materialize with the surrogate id assigned by storage
    pub fn into_entry(self, id: i64) -> StatusHistoryEntry<S> {
        StatusHistoryEntry {
            id,
            parent_id: self.parent_id,
            from_status: self.from_status,
            to_status: self.to_status,
            actor_id: self.actor.id,
            actor_kind: self.actor.kind,
            reason: self.reason,
            created_at: self.created_at,
        }
    }
}

pub type JobStatusEntry = StatusHistoryEntry<crate::domain::JobStatus>;
pub type RunnerTaskStatusEntry = StatusHistoryEntry<crate::domain::RunnerTaskStatus>;
