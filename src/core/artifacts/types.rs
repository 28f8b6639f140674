//! Artifact type definitions

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// Identifier of a registered artifact
pub type ArtifactId = Uuid;

/// Lifecycle state of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactState {
    /// Registered, tool still running
    Pending,
    /// File complete on disk
    Ready,
    /// Transmission has started
    Served,
    /// File and registry entry are gone
    Deleted,
}

/// An ephemeral file produced for one request
#[derive(Debug, Clone)]
pub struct Artifact {
    pub id: ArtifactId,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    /// Request id of the owning request
    pub owner: String,
    /// Content format (file extension)
    pub format: String,
    pub state: ArtifactState,
    pub served_at: Option<DateTime<Utc>>,
}

impl Artifact {
    pub fn new(owner: &str, path: PathBuf, format: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            path,
            created_at: Utc::now(),
            owner: owner.to_string(),
            format: format.to_string(),
            state: ArtifactState::Pending,
            served_at: None,
        }
    }

    /// Served less than `max_age` ago, so the sweep must leave it alone
    pub fn is_recently_served(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        self.state == ArtifactState::Served
            && self.served_at.is_some_and(|at| now - at < max_age)
    }
}
