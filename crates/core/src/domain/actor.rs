// Acting identity behind a status change

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User ID (opaque, issued by the identity layer)
pub type UserId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorKind {
    System,
    User,
}

impl std::fmt::Display for ActorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorKind::System => write!(f, "SYSTEM"),
            ActorKind::User => write!(f, "USER"),
        }
    }
}

impl FromStr for ActorKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SYSTEM" => Ok(ActorKind::System),
            "USER" => Ok(ActorKind::User),
            other => Err(DomainError::ValidationError(format!(
                "unknown actor kind: {}",
                other
            ))),
        }
    }
}

/// Who is making a transition and in what capacity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub kind: ActorKind,
    pub id: Option<UserId>,
}

impl Actor {
    pub fn system() -> Self {
        Self {
            kind: ActorKind::System,
            id: None,
        }
    }

    pub fn user(id: impl Into<UserId>) -> Self {
        Self {
            kind: ActorKind::User,
            id: Some(id.into()),
        }
    }

    /// Build an actor from the loose pair carried by API requests.
    ///
    /// A USER actor must name the user; a SYSTEM actor may carry an id for
    /// attribution (e.g. a named integration).
    pub fn from_parts(kind: ActorKind, id: Option<UserId>) -> Result<Self> {
        let id = id.filter(|s| !s.trim().is_empty());
        if kind == ActorKind::User && id.is_none() {
            return Err(DomainError::ValidationError(
                "USER actor requires an actor id".to_string(),
            ));
        }
        Ok(Self { kind, id })
    }

    pub fn user_id(&self) -> Option<&str> {
        match self.kind {
            ActorKind::User => self.id.as_deref(),
            ActorKind::System => None,
        }
    }
}
