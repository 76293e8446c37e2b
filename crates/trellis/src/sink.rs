//! Notification sink implementations.
//!
//! The engine emits unblock notifications through the
//! [`NotificationSink`] trait and relies on the sink to enforce the
//! dedupe-key uniqueness constraint. Two implementations live here:
//!
//! - [`MemorySink`] for tests and dry runs, with an injectable failure
//!   mode to exercise the cascade's partial-failure path.
//! - [`JsonlSink`], which appends records to a JSON Lines log and
//!   pre-loads existing keys at open, so retries stay idempotent across
//!   process restarts.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use trellis_engine::cascade::{EmitOutcome, Notification, NotificationSink};
use trellis_engine::domain::UserId;
use trellis_engine::error::Error as EngineError;

/// One line of the notification log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// The notification as emitted by the cascade.
    #[serde(flatten)]
    pub notification: Notification,

    /// When the sink recorded it.
    pub emitted_at: DateTime<Utc>,
}

// ============================================================================
// In-memory sink
// ============================================================================

#[derive(Default)]
struct MemoryInner {
    seen: HashSet<String>,
    delivered: Vec<Notification>,
    failing: HashSet<UserId>,
}

/// In-process sink holding delivered notifications in memory.
#[derive(Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every emission addressed to `owner` fail. For exercising the
    /// cascade's collect-and-continue error handling.
    pub async fn fail_for(&self, owner: UserId) {
        self.inner.lock().await.failing.insert(owner);
    }

    /// Notifications recorded so far, in emission order.
    pub async fn delivered(&self) -> Vec<Notification> {
        self.inner.lock().await.delivered.clone()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn emit(&self, notification: &Notification) -> trellis_engine::error::Result<EmitOutcome> {
        let mut inner = self.inner.lock().await;
        if inner.failing.contains(&notification.owner) {
            return Err(EngineError::Sink {
                node: notification.node.clone(),
                owner: notification.owner.clone(),
                message: "sink configured to fail for this owner".to_string(),
            });
        }
        if !inner.seen.insert(notification.dedupe_key.clone()) {
            return Ok(EmitOutcome::Deduplicated);
        }
        inner.delivered.push(notification.clone());
        Ok(EmitOutcome::Created)
    }
}

// ============================================================================
// JSONL sink
// ============================================================================

/// Sink appending to a JSONL notification log.
pub struct JsonlSink {
    path: PathBuf,
    seen: Mutex<HashSet<String>>,
}

impl JsonlSink {
    /// Open a sink over the given log file, loading the dedupe keys of
    /// every record already present. The file is created on first emit if
    /// it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut seen = HashSet::new();
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                for (i, line) in contents.lines().enumerate() {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<NotificationRecord>(trimmed) {
                        Ok(record) => {
                            seen.insert(record.notification.dedupe_key);
                        }
                        Err(err) => {
                            warn!(path = %path.display(), line = i + 1, error = %err,
                                "skipping malformed notification record");
                        }
                    }
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "notification log does not exist yet");
            }
            Err(err) => return Err(err.into()),
        }

        Ok(Self {
            path,
            seen: Mutex::new(seen),
        })
    }

    /// The log file this sink appends to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl NotificationSink for JsonlSink {
    async fn emit(&self, notification: &Notification) -> trellis_engine::error::Result<EmitOutcome> {
        let mut seen = self.seen.lock().await;
        if seen.contains(&notification.dedupe_key) {
            return Ok(EmitOutcome::Deduplicated);
        }

        let record = NotificationRecord {
            notification: notification.clone(),
            emitted_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&record).map_err(|err| EngineError::Sink {
            node: notification.node.clone(),
            owner: notification.owner.clone(),
            message: err.to_string(),
        })?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        seen.insert(notification.dedupe_key.clone());
        Ok(EmitOutcome::Created)
    }
}
