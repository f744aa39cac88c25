//! File-backed local tier.
//!
//! Persists the snapshot as one flat JSON object, the same shape the remote
//! service reads and writes. Writes use a temp file + rename so a crash
//! mid-save never leaves a torn file behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use refsched_core::FormSnapshot;

use crate::tier::{StorageTier, TierError, TierResult};

/// Snapshot storage in a single JSON file.
///
/// # Atomic Writes
///
/// 1. Write to `{path}.tmp`
/// 2. Flush and sync
/// 3. Rename `{path}.tmp` -> `{path}`
pub struct LocalTier {
    path: PathBuf,
}

impl LocalTier {
    /// Create a local tier at the given path.
    ///
    /// The file does not need to exist; it is created on first store.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a tier at the default location.
    ///
    /// Uses `$XDG_STATE_HOME/refsched/inputs.json`, falling back to
    /// `~/.local/state`, then the current directory.
    #[must_use]
    pub fn default_location() -> Self {
        let base = state_dir_or_fallback();
        Self {
            path: base.join("refsched").join("inputs.json"),
        }
    }

    /// The file this tier reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }
}

fn state_dir_or_fallback() -> PathBuf {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(state_home);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("state");
    }
    PathBuf::from(".")
}

impl StorageTier for LocalTier {
    fn name(&self) -> &str {
        "LocalTier"
    }

    fn load(&self) -> TierResult<Option<FormSnapshot>> {
        if !self.path.exists() {
            // First run, nothing saved yet.
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let snapshot: FormSnapshot = serde_json::from_reader(reader)
            .map_err(|e| TierError::Serialization(format!("failed to parse saved inputs: {e}")))?;
        Ok(Some(snapshot))
    }

    fn store(&self, snapshot: &FormSnapshot) -> TierResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.temp_path();
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, snapshot)
                .map_err(|e| TierError::Serialization(format!("failed to encode inputs: {e}")))?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            fields = snapshot.len(),
            "saved inputs"
        );
        Ok(())
    }

    fn is_available(&self) -> bool {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                return fs::create_dir_all(parent).is_ok();
            }
            let probe = parent.join(".refsched_test_write");
            if fs::write(&probe, b"test").is_ok() {
                let _ = fs::remove_file(&probe);
                return true;
            }
        }
        false
    }
}
