// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Local cache for discovery snapshots
//!
//! Fetching every group/version and the OpenAPI document takes a while on
//! large clusters, so the last snapshot of each context is kept on disk and
//! reused until it expires or `--refresh` is passed.
//!
//! Cache location: ~/.k8scatalog/cache/clusters/<context>.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;

use super::discovery::ServerSnapshot;
use crate::config;

/// Get current UNIX timestamp in seconds
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Check if a cached entry is still fresh based on creation time and TTL
fn is_cache_fresh(created_at: u64, ttl: Duration) -> bool {
    let now = current_timestamp();
    now.saturating_sub(created_at) < ttl.as_secs()
}

/// Atomically write content to a file using tempfile + rename
///
/// Other processes see either the old or the new snapshot, never a partial one.
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use tempfile::NamedTempFile;

    // Create temp file in same directory as target
    let temp_file = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))
        .context("Failed to create temp file")?;

    std::fs::write(temp_file.path(), content)
        .with_context(|| format!("Failed to write temp file {:?}", temp_file.path()))?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file to {:?}", path))?;

    Ok(())
}

/// Sanitize a context name for use as a filename
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Snapshot plus cache metadata
#[derive(Debug, Serialize, Deserialize)]
struct CachedSnapshot {
    snapshot: ServerSnapshot,
    created_at: u64,
}

/// Per-context discovery snapshot cache
pub struct SnapshotCache {
    base_dir: PathBuf,
    ttl: Duration,
}

impl SnapshotCache {
    /// Cache under ~/.k8scatalog/cache/
    pub fn new(ttl: Duration) -> Result<Self> {
        Ok(Self::with_base_dir(config::base_dir()?.join("cache"), ttl))
    }

    pub fn with_base_dir(base_dir: PathBuf, ttl: Duration) -> Self {
        Self { base_dir, ttl }
    }

    fn clusters_dir(&self) -> PathBuf {
        self.base_dir.join("clusters")
    }

    fn snapshot_path(&self, context: &str) -> PathBuf {
        self.clusters_dir()
            .join(format!("{}.json", sanitize_filename(context)))
    }

    /// Load a fresh snapshot for the context.
    /// Missing, expired and unreadable entries all count as a miss.
    pub fn load(&self, context: &str) -> Option<ServerSnapshot> {
        let path = self.snapshot_path(context);
        let content = std::fs::read(&path).ok()?;

        let cached: CachedSnapshot = match serde_json::from_slice(&content) {
            Ok(cached) => cached,
            Err(e) => {
                debug!(context = %context, error = %e, "Ignoring unreadable snapshot cache");
                return None;
            }
        };

        if !is_cache_fresh(cached.created_at, self.ttl) {
            debug!(context = %context, "Snapshot cache expired");
            return None;
        }

        debug!(
            context = %context,
            group_versions = cached.snapshot.announcements.len(),
            "Loaded snapshot from cache"
        );
        Some(cached.snapshot)
    }

    pub fn save(&self, context: &str, snapshot: &ServerSnapshot) -> Result<()> {
        std::fs::create_dir_all(self.clusters_dir())
            .context("Failed to create clusters cache directory")?;

        let cached = CachedSnapshot {
            snapshot: snapshot.clone(),
            created_at: current_timestamp(),
        };
        let content = serde_json::to_vec(&cached).context("Failed to serialize snapshot")?;
        atomic_write(&self.snapshot_path(context), &content)
    }

    /// Remove the context's snapshot, if any
    pub fn clear(&self, context: &str) -> Result<()> {
        let path = self.snapshot_path(context);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {:?}", path))?;
        }
        Ok(())
    }
}
