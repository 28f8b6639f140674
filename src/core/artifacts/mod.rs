//! Ephemeral artifact lifecycle
//!
//! Synthesized audio and recognition output are written to disk by external
//! tools. Each file is registered here, streamed to the caller at most once,
//! and deleted after transmission. A periodic sweep removes anything left
//! behind by crashes or dropped requests.

mod types;

pub use types::{Artifact, ArtifactId, ArtifactState};

use crate::config::ArtifactConfig;
use crate::utils::error::{GatewayError, Result};
use async_stream::try_stream;
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use dashmap::DashMap;
use futures::Stream;
use futures::stream::BoxStream;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const CHUNK_SIZE: usize = 64 * 1024;

/// A served artifact ready to be written as a response body
pub struct ServedArtifact {
    pub id: ArtifactId,
    pub format: String,
    /// File size in bytes
    pub size: u64,
    /// File contents; deletion is scheduled once this is finished or dropped
    pub stream: BoxStream<'static, std::io::Result<Bytes>>,
}

/// Registry and cleanup of ephemeral files
#[derive(Clone)]
pub struct ArtifactManager {
    inner: Arc<Inner>,
}

struct Inner {
    registry: DashMap<ArtifactId, Artifact>,
    /// Directories covered by the sweep
    watched: Vec<PathBuf>,
    config: ArtifactConfig,
}

impl ArtifactManager {
    pub fn new(config: ArtifactConfig, watched: Vec<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: DashMap::new(),
                watched,
                config,
            }),
        }
    }

    pub fn config(&self) -> &ArtifactConfig {
        &self.inner.config
    }

    pub fn watched_dirs(&self) -> &[PathBuf] {
        &self.inner.watched
    }

    /// Record a pending artifact before the producing tool runs
    pub fn register(&self, owner: &str, path: PathBuf, format: &str) -> ArtifactId {
        let artifact = Artifact::new(owner, path, format);
        let id = artifact.id;
        debug!(artifact_id = %id, owner = owner, path = ?artifact.path, "Registered artifact");
        self.inner.registry.insert(id, artifact);
        id
    }

    /// The producing tool finished and the file is complete
    pub fn mark_ready(&self, id: ArtifactId) -> Result<()> {
        let mut entry = self
            .inner
            .registry
            .get_mut(&id)
            .ok_or_else(|| GatewayError::internal(format!("Unknown artifact {}", id)))?;
        entry.state = ArtifactState::Ready;
        Ok(())
    }

    /// Current state; anything no longer registered counts as deleted
    pub fn state(&self, id: ArtifactId) -> ArtifactState {
        self.inner
            .registry
            .get(&id)
            .map_or(ArtifactState::Deleted, |a| a.state)
    }

    pub fn get(&self, id: ArtifactId) -> Option<Artifact> {
        self.inner.registry.get(&id).map(|a| a.clone())
    }

    /// Number of live registry entries
    pub fn len(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.registry.is_empty()
    }

    /// Drop an artifact that will never be served
    pub async fn discard(&self, id: ArtifactId) {
        debug!(artifact_id = %id, "Discarding artifact");
        self.delete(id).await;
    }

    /// Remove the file and the registry entry. Failures are only logged.
    pub async fn delete(&self, id: ArtifactId) {
        if let Some((_, artifact)) = self.inner.registry.remove(&id) {
            remove_file_logged(&artifact.path).await;
            debug!(artifact_id = %id, "Deleted artifact");
        }
    }

    fn delete_detached(&self, id: ArtifactId) {
        if let Some((_, artifact)) = self.inner.registry.remove(&id) {
            remove_file_detached(artifact.path);
        }
    }

    /// Delete after the configured grace delay
    pub fn schedule_delete(&self, id: ArtifactId) {
        let grace = self.inner.config.grace();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let manager = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(grace).await;
                    manager.delete(id).await;
                });
            }
            Err(_) => self.delete_detached(id),
        }
    }

    /// Mark served and open the file as a streaming body
    pub async fn open_served(&self, id: ArtifactId) -> Result<ServedArtifact> {
        let (path, format) = {
            let mut entry = self
                .inner
                .registry
                .get_mut(&id)
                .ok_or_else(|| GatewayError::internal(format!("Unknown artifact {}", id)))?;
            entry.state = ArtifactState::Served;
            entry.served_at = Some(Utc::now());
            (entry.path.clone(), entry.format.clone())
        };

        let opened = async {
            let file = tokio::fs::File::open(&path).await?;
            let size = file.metadata().await?.len();
            std::io::Result::Ok((file, size))
        }
        .await;

        let (file, size) = match opened {
            Ok(opened) => opened,
            Err(e) => {
                self.delete(id).await;
                return Err(e.into());
            }
        };

        let guard = ServeGuard {
            manager: self.clone(),
            id,
        };

        Ok(ServedArtifact {
            id,
            format,
            size,
            stream: Box::pin(file_stream(file, guard)),
        })
    }

    /// Delete everything in `dir` older than `max_age`, sparing recently served artifacts
    pub async fn sweep(&self, dir: &Path, max_age: Duration) -> usize {
        let now = Utc::now();
        let chrono_max_age = to_chrono(max_age);

        let protected: HashSet<PathBuf> = self
            .inner
            .registry
            .iter()
            .filter(|a| a.is_recently_served(now, chrono_max_age))
            .map(|a| a.path.clone())
            .collect();

        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(e) => {
                warn!(dir = ?dir, "Failed to read directory for sweep: {}", e);
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = ?dir, "Failed to read directory entry: {}", e);
                    break;
                }
            };

            let path = entry.path();
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| SystemTime::now().duration_since(modified).ok())
                .unwrap_or_default();
            if age < max_age || protected.contains(&path) {
                continue;
            }

            if remove_file_logged(&path).await {
                removed += 1;
            }
            self.inner.registry.retain(|_, a| a.path != path);
        }

        removed
    }

    /// Forget registry entries older than `max_age`, deleting their files
    pub async fn prune(&self, max_age: Duration) -> usize {
        let now = Utc::now();
        let chrono_max_age = to_chrono(max_age);

        let stale: Vec<ArtifactId> = self
            .inner
            .registry
            .iter()
            .filter(|a| now - a.created_at >= chrono_max_age)
            .filter(|a| !a.is_recently_served(now, chrono_max_age))
            .map(|a| a.id)
            .collect();

        for id in &stale {
            self.delete(*id).await;
        }
        stale.len()
    }

    /// One full sweep over every watched directory plus the registry
    pub async fn sweep_all(&self) -> usize {
        let max_age = self.inner.config.max_age();
        let mut removed = 0;
        for dir in &self.inner.watched {
            removed += self.sweep(dir, max_age).await;
        }
        removed += self.prune(max_age).await;
        removed
    }

    /// Run the sweep on a fixed interval; the first pass runs immediately
    pub fn start_sweeper(&self) -> JoinHandle<()> {
        let manager = self.clone();
        let period = self.inner.config.sweep_interval();
        info!(
            "Starting artifact sweeper (interval {:?}, max age {:?})",
            period,
            self.inner.config.max_age()
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let removed = manager.sweep_all().await;
                if removed > 0 {
                    info!("Artifact sweep removed {} stale files", removed);
                } else {
                    debug!("Artifact sweep found nothing to remove");
                }
            }
        })
    }
}

/// Schedules deletion of a served artifact when dropped
struct ServeGuard {
    manager: ArtifactManager,
    id: ArtifactId,
}

impl Drop for ServeGuard {
    fn drop(&mut self) {
        self.manager.schedule_delete(self.id);
    }
}

fn file_stream(
    file: tokio::fs::File,
    guard: ServeGuard,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
    try_stream! {
        let _guard = guard;
        let mut file = file;
        loop {
            let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
            let n = file.read_buf(&mut buf).await?;
            if n == 0 {
                break;
            }
            yield buf.freeze();
        }
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::weeks(52 * 100))
}

/// Remove a file from synchronous code. Inside a runtime the removal runs on
/// a spawned task; without one it happens inline.
fn remove_file_detached(path: PathBuf) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                remove_file_logged(&path).await;
            });
        }
        Err(_) => {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = ?path, "Failed to delete file: {}", e);
                }
            }
        }
    }
}

/// Remove a scratch file. Returns whether something was removed.
pub async fn remove_file_logged(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!(path = ?path, "Failed to delete file: {}", e);
            false
        }
    }
}

/// A request-scoped file (an upload) that is removed when dropped
#[derive(Debug)]
pub struct ScratchFile {
    path: Option<PathBuf>,
}

impl ScratchFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Delete now instead of at drop
    pub async fn remove(mut self) {
        if let Some(path) = self.path.take() {
            remove_file_logged(&path).await;
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            remove_file_detached(path);
        }
    }
}
