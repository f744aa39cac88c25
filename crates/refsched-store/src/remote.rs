//! Remote tier backed by the scheduling service.
//!
//! `GET /api/load_inputs` returns the last saved flat object (an empty object
//! when nothing was ever saved); `POST /api/save_inputs` replaces it. Every
//! call is bounded by a request timeout so a dead service cannot hang the
//! client.

use std::time::Duration;

use refsched_core::FormSnapshot;

use crate::tier::{StorageTier, TierError, TierResult};

const LOAD_PATH: &str = "/api/load_inputs";
const SAVE_PATH: &str = "/api/save_inputs";

/// Connection settings for the scheduling service.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    /// Service origin, e.g. `http://localhost:5000`. No trailing slash.
    pub base_url: String,
    /// Per-request deadline.
    pub timeout: Duration,
}

impl RemoteConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Override the per-request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Snapshot storage on the scheduling service.
pub struct RemoteTier {
    config: RemoteConfig,
    client: reqwest::blocking::Client,
}

impl RemoteTier {
    /// Build a tier against the given service.
    ///
    /// Fails only if the underlying HTTP client cannot be constructed.
    pub fn new(config: RemoteConfig) -> TierResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TierError::Http(format!("failed to build http client: {e}")))?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }
}

impl StorageTier for RemoteTier {
    fn name(&self) -> &str {
        "RemoteTier"
    }

    fn load(&self) -> TierResult<Option<FormSnapshot>> {
        let response = self
            .client
            .get(self.url(LOAD_PATH))
            .send()
            .map_err(|e| TierError::Http(format!("load request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TierError::Http(format!("load returned {status}")));
        }
        let snapshot: FormSnapshot = response
            .json()
            .map_err(|e| TierError::Serialization(format!("bad load payload: {e}")))?;
        // The service answers {} when it has nothing saved.
        if snapshot.is_empty() {
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    fn store(&self, snapshot: &FormSnapshot) -> TierResult<()> {
        let response = self
            .client
            .post(self.url(SAVE_PATH))
            .json(snapshot)
            .send()
            .map_err(|e| TierError::Http(format!("save request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TierError::Http(format!("save returned {status}")));
        }
        tracing::debug!(fields = snapshot.len(), "saved inputs to service");
        Ok(())
    }
}
