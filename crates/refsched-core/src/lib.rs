//! Core domain model for the refinery tank-scheduling client.
//!
//! This crate is deliberately free of I/O: it owns the form parameters, the
//! live tank set, point-in-time snapshots of both, and the validity verdict
//! derived from them. Persistence tiers and service calls live in the sibling
//! crates and consume these types.

#![forbid(unsafe_code)]

pub mod form;
pub mod snapshot;
pub mod tank;
pub mod validate;

pub use form::{DepartureMode, FormState, keys};
pub use snapshot::{FieldValue, FormSnapshot};
pub use tank::{
    DEAD_BOTTOM_DEFAULT_BBL, DEAD_BOTTOM_MAX_BBL, DEAD_BOTTOM_MIN_BBL, MIN_TANKS, RegistryChange,
    RegistryError, Tank, TankRegistry,
};
pub use validate::{InventoryBounds, Severity, Verdict, validate};
