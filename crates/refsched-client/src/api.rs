//! JSON-over-HTTP contract with the scheduling service.
//!
//! Simulation and analysis requests post a full [`FormSnapshot`]; the two
//! export endpoints instead post the last [`SimulationOutcome`], from which
//! the service rebuilds its workbook sheets. Responses are typed here.
//! Transport failures, non-2xx statuses and malformed payloads each map to
//! their own [`ApiError`] variant so callers can degrade differently per
//! cause. A 2xx simulation response can still carry a domain error in its
//! `error` field; that surfaces as [`ApiError::Remote`].

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use refsched_core::FormSnapshot;

pub mod endpoints {
    pub const SIMULATE: &str = "/api/simulate";
    pub const BUFFER_ANALYSIS: &str = "/api/buffer_analysis";
    pub const CARGO_OPTIMIZATION: &str = "/api/cargo_optimization";
    pub const VALIDATE_INVENTORY_RANGE: &str = "/api/validate_inventory_range";
    pub const EXPORT_TANK_STATUS: &str = "/api/export_tank_status";
    pub const EXPORT_CHARTS: &str = "/api/export_charts";
}

/// Fallback filename for a tank-status export with no usable
/// `Content-Disposition` header.
pub const TANK_STATUS_FALLBACK: &str = "tank_status_export.xlsx";
/// Fallback filename for a charts export.
pub const CHARTS_FALLBACK: &str = "charts_export.xlsx";

/// Errors from the service boundary.
#[derive(Debug)]
pub enum ApiError {
    /// Request never completed (connect, timeout, DNS).
    Transport(String),
    /// The service answered with a non-success status.
    Status(u16),
    /// The body did not match the expected shape.
    Decode(String),
    /// A well-formed response reporting a domain failure.
    Remote(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "transport error: {msg}"),
            ApiError::Status(code) => write!(f, "service returned status {code}"),
            ApiError::Decode(msg) => write!(f, "bad response payload: {msg}"),
            ApiError::Remote(msg) => write!(f, "service error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Result type for service calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Aggregate figures for one simulation run.
///
/// Unknown fields are tolerated; absent ones default so older service
/// builds keep working. `Serialize` because the whole outcome is posted
/// back for exports.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    #[serde(default)]
    pub total_processed: f64,
    #[serde(default)]
    pub avg_utilization: f64,
    #[serde(default)]
    pub min_inventory: f64,
    #[serde(default)]
    pub max_inventory: f64,
    #[serde(default)]
    pub critical_days: u32,
    #[serde(default)]
    pub clash_days: u32,
    #[serde(default)]
    pub processing_efficiency: f64,
    #[serde(default)]
    pub sustainable_processing: bool,
    #[serde(default)]
    pub avg_processing_rate: f64,
    #[serde(default)]
    pub total_cargoes: u32,
    #[serde(default)]
    pub cargo_mix: String,
}

/// One operator-facing message emitted during the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub day: String,
    pub message: String,
}

/// One simulated day.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub arrivals: f64,
    #[serde(default)]
    pub cargo_type: String,
    #[serde(default)]
    pub processing: f64,
    #[serde(default)]
    pub clash_detected: bool,
    #[serde(default)]
    pub start_inventory: f64,
    #[serde(default)]
    pub end_inventory: f64,
}

/// One scheduled cargo in the run's report.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CargoEntry {
    #[serde(default)]
    pub cargo_id: Option<u32>,
    #[serde(default)]
    pub berth: String,
    #[serde(default)]
    pub vessel_name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub dep_time: String,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub pumping_days: f64,
}

/// Full simulation response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    #[serde(default)]
    pub metrics: SimulationMetrics,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub simulation_data: Vec<DayRecord>,
    #[serde(default)]
    pub cargo_report: Vec<CargoEntry>,
    /// Set when the run failed inside the service.
    #[serde(default)]
    pub error: Option<String>,
}

/// One buffer-stock scenario (keyed `normal_operations`,
/// `extended_disruption`, ...).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct BufferScenario {
    pub description: String,
    #[serde(default)]
    pub lead_time: f64,
    #[serde(default)]
    pub buffer_needed: f64,
    #[serde(default)]
    pub tanks_needed: u32,
    #[serde(default)]
    pub adequate_current: bool,
    #[serde(default)]
    pub additional_tanks: u32,
}

/// One tested cargo combination (keyed `combo_1`, `combo_2`, ...).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CargoCombo {
    #[serde(default)]
    pub cargo_types: Vec<String>,
    #[serde(default)]
    pub efficiency: f64,
    #[serde(default)]
    pub total_cargoes: u32,
    #[serde(default)]
    pub cargo_mix: String,
    #[serde(default)]
    pub clash_days: u32,
    #[serde(default)]
    pub min_inventory: f64,
    #[serde(default)]
    pub sustainable: bool,
}

/// Server-side verdict on the declared inventory range.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RangeCheck {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// A downloaded export file.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportDownload {
    /// Recovered from `Content-Disposition`, or the endpoint fallback.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Connection settings for [`ApiClient`].
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Service origin, e.g. `http://localhost:5000`. No trailing slash.
    pub base_url: String,
    /// Per-request deadline. Simulations can be slow; exports slower.
    pub timeout: Duration,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Override the per-request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Blocking client for the scheduling service.
pub struct ApiClient {
    config: ApiConfig,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    /// Build a client against the given service.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn post<B>(&self, path: &str, body: &B) -> ApiResult<reqwest::blocking::Response>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        Ok(response)
    }

    /// Run a full simulation over the submitted snapshot.
    ///
    /// A 2xx body whose `error` field is set is surfaced as
    /// [`ApiError::Remote`].
    pub fn simulate(&self, snapshot: &FormSnapshot) -> ApiResult<SimulationOutcome> {
        let mut outcome: SimulationOutcome = self
            .post(endpoints::SIMULATE, snapshot)?
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        if let Some(message) = outcome.error.take() {
            return Err(ApiError::Remote(message));
        }
        tracing::debug!(
            days = outcome.simulation_data.len(),
            cargoes = outcome.cargo_report.len(),
            "simulation completed"
        );
        Ok(outcome)
    }

    /// Buffer-stock scenarios for the current parameters.
    pub fn buffer_analysis(
        &self,
        snapshot: &FormSnapshot,
    ) -> ApiResult<BTreeMap<String, BufferScenario>> {
        self.post(endpoints::BUFFER_ANALYSIS, snapshot)?
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Cargo-mix combinations ranked by the service.
    pub fn cargo_optimization(
        &self,
        snapshot: &FormSnapshot,
    ) -> ApiResult<BTreeMap<String, CargoCombo>> {
        self.post(endpoints::CARGO_OPTIMIZATION, snapshot)?
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Server-side inventory range check.
    pub fn validate_inventory_range(&self, snapshot: &FormSnapshot) -> ApiResult<RangeCheck> {
        self.post(endpoints::VALIDATE_INVENTORY_RANGE, snapshot)?
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Download the tank-status workbook built from the last run.
    ///
    /// The request body is the simulation outcome itself; the service
    /// rebuilds its sheets from it, not from the form.
    pub fn export_tank_status(&self, outcome: &SimulationOutcome) -> ApiResult<ExportDownload> {
        self.download(endpoints::EXPORT_TANK_STATUS, outcome, TANK_STATUS_FALLBACK)
    }

    /// Download the charts workbook built from the last run.
    pub fn export_charts(&self, outcome: &SimulationOutcome) -> ApiResult<ExportDownload> {
        self.download(endpoints::EXPORT_CHARTS, outcome, CHARTS_FALLBACK)
    }

    fn download(
        &self,
        path: &str,
        outcome: &SimulationOutcome,
        fallback: &str,
    ) -> ApiResult<ExportDownload> {
        let response = self.post(path, outcome)?;
        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_disposition)
            .unwrap_or_else(|| fallback.to_string());
        let bytes = response
            .bytes()
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .to_vec();
        tracing::debug!(filename = %filename, bytes = bytes.len(), "export downloaded");
        Ok(ExportDownload { filename, bytes })
    }
}

/// Pull the filename out of a `Content-Disposition` header value.
///
/// Accepts both quoted and bare forms
/// (`attachment; filename="report.xlsx"`, `attachment; filename=report.xlsx`).
#[must_use]
pub fn parse_content_disposition(header: &str) -> Option<String> {
    let marker = "filename=";
    let start = header.find(marker)? + marker.len();
    let rest = &header[start..];
    let name = match rest.strip_prefix('"') {
        Some(quoted) => quoted.split('"').next()?,
        None => rest.split(';').next()?.trim(),
    };
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}
