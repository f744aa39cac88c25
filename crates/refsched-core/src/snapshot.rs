//! Point-in-time form captures.
//!
//! A [`FormSnapshot`] is the unit of persistence and the unit sent to the
//! remote scheduling service: a flat mapping from stable field identifier to
//! a typed value. A snapshot is captured whole and applied whole; a new
//! capture replaces rather than patches.
//!
//! # Invariants
//!
//! 1. **Keys are unique**: one value per field identifier.
//! 2. **Replace, never merge**: applying a snapshot overwrites every field
//!    it names; fields it does not name keep their current value.
//! 3. **Wire-compatible**: serializes to the same flat JSON object the
//!    scheduling service reads (`{"numTanks": 12, "departureMode": "manual"}`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single captured field value.
///
/// Untagged on the wire: booleans, numbers and strings map directly to their
/// JSON counterparts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Checkbox state.
    Bool(bool),
    /// Numeric input.
    Number(f64),
    /// Free text or select value.
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value.
    ///
    /// Text values are parsed leniently (the service historically stored
    /// numbers as strings); unparseable text yields `None`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// String view of the value, for select-style fields.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean view of the value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// An immutable capture of every labeled input at one moment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSnapshot {
    fields: BTreeMap<String, FieldValue>,
}

impl FormSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field value. Later writes to the same key win.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Look up a field by identifier.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Numeric value of a field, if present and numeric.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(FieldValue::as_number)
    }

    /// Number of captured fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// An empty snapshot never overrides anything on load.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate captured fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_values_round_trip_json() {
        let mut snap = FormSnapshot::new();
        snap.set("numTanks", 12.0);
        snap.set("departureMode", "manual");
        snap.set("solverEnabled", true);

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains(r#""numTanks":12.0"#));
        assert!(json.contains(r#""departureMode":"manual""#));

        let back: FormSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
        assert_eq!(
            back.get("solverEnabled").and_then(FieldValue::as_bool),
            Some(true)
        );
    }

    #[test]
    fn parses_flat_service_object() {
        let snap: FormSnapshot =
            serde_json::from_str(r#"{"tankCapacity": 500000, "departureMode": "solver"}"#).unwrap();
        assert_eq!(snap.number("tankCapacity"), Some(500_000.0));
        assert_eq!(
            snap.get("departureMode").and_then(FieldValue::as_text),
            Some("solver")
        );
    }

    #[test]
    fn number_view_parses_stringly_typed_values() {
        let snap: FormSnapshot = serde_json::from_str(r#"{"journeyDays": "10.5"}"#).unwrap();
        assert_eq!(snap.number("journeyDays"), Some(10.5));
    }

    #[test]
    fn later_writes_win() {
        let mut snap = FormSnapshot::new();
        snap.set("minInventory", 1.0);
        snap.set("minInventory", 2.0);
        assert_eq!(snap.number("minInventory"), Some(2.0));
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn empty_snapshot_is_empty() {
        assert!(FormSnapshot::new().is_empty());
    }
}
