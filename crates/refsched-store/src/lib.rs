//! Two-tier persistence for scheduling form snapshots.
//!
//! A snapshot is saved to a local JSON file for instant restore and, when a
//! service is configured, mirrored to it best-effort. The [`StorageTier`]
//! trait keeps the two interchangeable; [`StoreCoordinator`] owns the
//! precedence rules between them.

#![forbid(unsafe_code)]

pub mod coordinator;
pub mod local;
pub mod remote;
pub mod tier;

pub use coordinator::{LoadSource, RemoteSaveStatus, SaveReport, StoreCoordinator};
pub use local::LocalTier;
pub use remote::{RemoteConfig, RemoteTier};
pub use tier::{MemoryTier, StorageTier, TierError, TierResult};
