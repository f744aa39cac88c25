//! Two-tier persistence policy.
//!
//! The coordinator owns one local tier and, optionally, one remote tier and
//! enforces the precedence rules between them:
//!
//! - **Load**: local first for an instant restore, then remote; a remote
//!   snapshot overrides the local one only when the call succeeds and the
//!   snapshot is non-empty.
//! - **Save**: local first, unconditionally. The remote write happens only
//!   after a successful local write, is best-effort, and is never retried.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Local load fails | Logged; treated as nothing saved locally |
//! | Remote load fails or empty | Local snapshot (if any) stands |
//! | Local save fails | Remote save skipped, error returned |
//! | Remote save fails | Logged in the report; local save stands |

use refsched_core::FormSnapshot;

use crate::tier::{StorageTier, TierResult};

/// Outcome of the remote leg of a save fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSaveStatus {
    /// Remote accepted the snapshot.
    Saved,
    /// Remote rejected or never answered; the snapshot is safe locally.
    Failed(String),
    /// No remote tier configured, or the local save failed first.
    Skipped,
}

/// What happened during one save fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub local_ok: bool,
    pub remote: RemoteSaveStatus,
}

/// Where a loaded snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Local,
    Remote,
}

/// Two-tier persistence front end.
pub struct StoreCoordinator {
    local: Box<dyn StorageTier>,
    remote: Option<Box<dyn StorageTier>>,
}

impl StoreCoordinator {
    /// Coordinator over a local tier only.
    #[must_use]
    pub fn local_only(local: Box<dyn StorageTier>) -> Self {
        Self {
            local,
            remote: None,
        }
    }

    /// Coordinator over a local tier and a remote tier.
    #[must_use]
    pub fn with_remote(local: Box<dyn StorageTier>, remote: Box<dyn StorageTier>) -> Self {
        Self {
            local,
            remote: Some(remote),
        }
    }

    /// Whether a remote tier is configured.
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Load from the local tier alone.
    ///
    /// A local failure is demoted to "nothing saved": the client must come up
    /// with defaults rather than refuse to start.
    #[must_use]
    pub fn load_local(&self) -> Option<FormSnapshot> {
        match self.local.load() {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(tier = self.local.name(), error = %e, "local load failed, starting from defaults");
                None
            }
        }
    }

    /// Load from the remote tier, if one is configured.
    ///
    /// Empty remote snapshots are already reported as `None` by the tier;
    /// errors propagate so the caller can decide whether to surface them.
    pub fn load_remote(&self) -> TierResult<Option<FormSnapshot>> {
        match &self.remote {
            Some(remote) => remote.load(),
            None => Ok(None),
        }
    }

    /// Resolve one snapshot across both tiers, remote winning when present.
    #[must_use]
    pub fn load(&self) -> Option<(FormSnapshot, LoadSource)> {
        let local = self.load_local();
        match self.load_remote() {
            Ok(Some(snapshot)) => {
                if snapshot.is_empty() {
                    // Defensive: tiers report empty as None, but never let an
                    // empty snapshot clobber local data.
                    return local.map(|s| (s, LoadSource::Local));
                }
                Some((snapshot, LoadSource::Remote))
            }
            Ok(None) => local.map(|s| (s, LoadSource::Local)),
            Err(e) => {
                tracing::warn!(error = %e, "remote load failed, keeping local snapshot");
                local.map(|s| (s, LoadSource::Local))
            }
        }
    }

    /// Fan one snapshot out to both tiers.
    ///
    /// Local first; the remote leg runs only after a successful local write
    /// and its failure is recorded, not raised.
    pub fn save(&self, snapshot: &FormSnapshot) -> TierResult<SaveReport> {
        if let Err(e) = self.local.store(snapshot) {
            tracing::error!(tier = self.local.name(), error = %e, "local save failed");
            return Err(e);
        }

        let remote = match &self.remote {
            Some(remote) => match remote.store(snapshot) {
                Ok(()) => RemoteSaveStatus::Saved,
                Err(e) => {
                    tracing::warn!(tier = remote.name(), error = %e, "remote save failed, not retrying");
                    RemoteSaveStatus::Failed(e.to_string())
                }
            },
            None => RemoteSaveStatus::Skipped,
        };

        Ok(SaveReport {
            local_ok: true,
            remote,
        })
    }
}
