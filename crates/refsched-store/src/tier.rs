//! Pluggable persistence tiers.
//!
//! A tier stores and recalls one whole [`FormSnapshot`]. The coordinator
//! composes two of them (local file, remote service) with fixed precedence
//! rules; this module defines the trait they share and the in-memory tier
//! used by tests.
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: tier failures never panic; operations return
//!    `Result` and the caller decides what survives.
//! 2. **Whole snapshots only**: a tier never merges; `store` replaces
//!    whatever it held before.
//! 3. **Absence is not failure**: a tier with nothing saved yet returns
//!    `Ok(None)` from `load`.

use std::fmt;
use std::sync::RwLock;

use refsched_core::FormSnapshot;

/// Errors that can occur during tier operations.
#[derive(Debug)]
pub enum TierError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Snapshot encode/decode failure.
    Serialization(String),
    /// Transport or protocol failure talking to the remote service.
    Http(String),
    /// Tier cannot be used right now (e.g. no writable state directory).
    Unavailable(String),
}

impl fmt::Display for TierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierError::Io(e) => write!(f, "I/O error: {e}"),
            TierError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            TierError::Http(msg) => write!(f, "http error: {msg}"),
            TierError::Unavailable(msg) => write!(f, "tier unavailable: {msg}"),
        }
    }
}

impl std::error::Error for TierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TierError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TierError {
    fn from(e: std::io::Error) -> Self {
        TierError::Io(e)
    }
}

/// Result type for tier operations.
pub type TierResult<T> = Result<T, TierError>;

/// A snapshot store with whole-value semantics.
///
/// Implementations must be thread-safe; the client calls tiers from worker
/// threads while the model stays on the main loop.
pub trait StorageTier: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Recall the stored snapshot, `Ok(None)` if nothing was ever stored.
    fn load(&self) -> TierResult<Option<FormSnapshot>>;

    /// Replace the stored snapshot.
    fn store(&self, snapshot: &FormSnapshot) -> TierResult<()>;

    /// Check if the tier is available and functional.
    fn is_available(&self) -> bool {
        true
    }
}

/// In-memory tier for testing and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTier {
    slot: RwLock<Option<FormSnapshot>>,
}

impl MemoryTier {
    /// Create an empty memory tier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory tier pre-populated with a snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: FormSnapshot) -> Self {
        Self {
            slot: RwLock::new(Some(snapshot)),
        }
    }
}

impl StorageTier for MemoryTier {
    fn name(&self) -> &str {
        "MemoryTier"
    }

    fn load(&self) -> TierResult<Option<FormSnapshot>> {
        let guard = self
            .slot
            .read()
            .map_err(|_| TierError::Unavailable("lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn store(&self, snapshot: &FormSnapshot) -> TierResult<()> {
        let mut guard = self
            .slot
            .write()
            .map_err(|_| TierError::Unavailable("lock poisoned".into()))?;
        *guard = Some(snapshot.clone());
        Ok(())
    }
}

impl fmt::Debug for MemoryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occupied = self.slot.read().map(|g| g.is_some()).unwrap_or(false);
        f.debug_struct("MemoryTier")
            .field("occupied", &occupied)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_tier_starts_empty() {
        let tier = MemoryTier::new();
        assert!(tier.load().unwrap().is_none());
        assert!(tier.is_available());
    }

    #[test]
    fn store_replaces_whole_snapshot() {
        let tier = MemoryTier::new();
        let mut first = FormSnapshot::new();
        first.set("numTanks", 12.0);
        first.set("journeyDays", 10.0);
        tier.store(&first).unwrap();

        let mut second = FormSnapshot::new();
        second.set("numTanks", 4.0);
        tier.store(&second).unwrap();

        let loaded = tier.load().unwrap().unwrap();
        assert_eq!(loaded.number("numTanks"), Some(4.0));
        // Replace semantics: the old field is gone, not merged in.
        assert!(loaded.get("journeyDays").is_none());
    }
}
