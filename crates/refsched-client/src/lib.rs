//! Client engine for the refinery tank-scheduling tool.
//!
//! Combines the domain model (`refsched-core`) and the two-tier store
//! (`refsched-store`) with the pieces a live client needs: the debounced
//! autosave scheduler, the typed HTTP contract with the scheduling service,
//! the session result holder, and the headless event-driven [`ClientModel`]
//! that ties them together.

#![forbid(unsafe_code)]

pub mod api;
pub mod autosave;
pub mod model;
pub mod session;

pub use api::{
    Alert, ApiClient, ApiConfig, ApiError, ApiResult, BufferScenario, CargoCombo, CargoEntry,
    DayRecord, ExportDownload, RangeCheck, SimulationMetrics, SimulationOutcome,
    parse_content_disposition,
};
pub use autosave::{
    AutoSaveConfig, AutoSaveScheduler, InputClass, SaveAction, SaveTrigger, SchedulerStats,
};
pub use model::{ClientModel, Effect, Event, ExportKind};
pub use session::SessionContext;
