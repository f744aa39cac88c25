//! Scheduling form state and its wire vocabulary.
//!
//! [`FormState`] holds every scalar parameter the operator edits, mirrors the
//! flat key space the scheduling service expects, and derives the handful of
//! figures the client computes locally (lead time, pumping days). Per-tank
//! state lives in [`TankRegistry`]; capture and apply bridge the two.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::snapshot::{FieldValue, FormSnapshot};
use crate::tank::TankRegistry;

/// Stable field identifiers shared with the scheduling service.
///
/// These are wire names; renaming one silently orphans persisted data.
pub mod keys {
    pub const NUM_TANKS: &str = "numTanks";
    pub const TANK_CAPACITY: &str = "tankCapacity";
    pub const MIN_INVENTORY: &str = "minInventory";
    pub const MAX_INVENTORY: &str = "maxInventory";
    pub const DEFAULT_DEAD_BOTTOM: &str = "defaultDeadBottom";
    pub const PROCESSING_RATE: &str = "processingRate";
    pub const PUMPING_RATE: &str = "pumpingRate";
    pub const PRE_JOURNEY_DAYS: &str = "preJourneyDays";
    pub const JOURNEY_DAYS: &str = "journeyDays";
    pub const PRE_DISCHARGE_DAYS: &str = "preDischargeDays";
    pub const SETTLING_TIME: &str = "settlingTime";
    pub const LAB_TESTING_DAYS: &str = "labTestingDays";
    pub const DEPARTURE_MODE: &str = "departureMode";
    pub const VLCC_CAPACITY: &str = "vlccCapacity";
    pub const SUEZMAX_CAPACITY: &str = "suezmaxCapacity";
    pub const AFRAMAX_CAPACITY: &str = "aframaxCapacity";
    pub const PANAMAX_CAPACITY: &str = "panamaxCapacity";
    pub const HANDYMAX_CAPACITY: &str = "handymaxCapacity";

    /// Key of tank `id`'s level field (`tank1Level`, `tank2Level`, ...).
    #[must_use]
    pub fn tank_level(id: u32) -> String {
        format!("tank{id}Level")
    }

    /// Key of tank `id`'s dead-bottom field.
    #[must_use]
    pub fn dead_bottom(id: u32) -> String {
        format!("deadBottom{id}")
    }
}

/// How cargo departures are chosen during a simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepartureMode {
    /// Operator-entered departure schedule.
    #[default]
    Manual,
    /// The service's optimizer picks departures.
    Solver,
}

impl DepartureMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Solver => "solver",
        }
    }

    /// Parse a wire value; unknown strings fall back to manual.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim() {
            "solver" => Self::Solver,
            _ => Self::Manual,
        }
    }
}

impl fmt::Display for DepartureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every scalar parameter of the scheduling form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub tank_capacity_bbl: f64,
    pub min_inventory_bbl: f64,
    pub max_inventory_bbl: f64,
    pub default_dead_bottom_bbl: f64,
    /// Barrels per day consumed by the refinery.
    pub processing_rate_bbl_day: f64,
    /// Barrels per hour.
    pub pumping_rate_bbl_hr: f64,
    pub pre_journey_days: f64,
    pub journey_days: f64,
    pub pre_discharge_days: f64,
    pub settling_days: f64,
    pub lab_testing_days: f64,
    pub departure_mode: DepartureMode,
    pub vlcc_capacity_bbl: f64,
    pub suezmax_capacity_bbl: f64,
    pub aframax_capacity_bbl: f64,
    pub panamax_capacity_bbl: f64,
    pub handymax_capacity_bbl: f64,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            tank_capacity_bbl: 500_000.0,
            min_inventory_bbl: 0.0,
            max_inventory_bbl: 0.0,
            default_dead_bottom_bbl: crate::tank::DEAD_BOTTOM_DEFAULT_BBL,
            processing_rate_bbl_day: 50_000.0,
            pumping_rate_bbl_hr: 30_000.0,
            pre_journey_days: 1.0,
            journey_days: 10.0,
            pre_discharge_days: 1.0,
            settling_days: 2.0,
            lab_testing_days: 1.0,
            departure_mode: DepartureMode::Manual,
            vlcc_capacity_bbl: 0.0,
            suezmax_capacity_bbl: 0.0,
            aframax_capacity_bbl: 0.0,
            panamax_capacity_bbl: 0.0,
            handymax_capacity_bbl: 0.0,
        }
    }
}

impl FormState {
    /// Default number of tanks for a fresh session.
    pub const DEFAULT_TANK_COUNT: u32 = 12;

    /// Total days between cargo nomination and usable discharged crude.
    #[must_use]
    pub fn lead_time_days(&self) -> f64 {
        self.pre_journey_days
            + self.journey_days
            + self.pre_discharge_days
            + self.settling_days
            + self.lab_testing_days
    }

    /// Largest configured cargo parcel, in barrels.
    #[must_use]
    pub fn largest_cargo_bbl(&self) -> f64 {
        [
            self.vlcc_capacity_bbl,
            self.suezmax_capacity_bbl,
            self.aframax_capacity_bbl,
            self.panamax_capacity_bbl,
            self.handymax_capacity_bbl,
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }

    /// Days needed to discharge the largest cargo at the configured rate.
    ///
    /// Zero when no cargo is configured or the rate is not positive.
    #[must_use]
    pub fn pumping_days(&self) -> f64 {
        let largest = self.largest_cargo_bbl();
        if largest <= 0.0 || self.pumping_rate_bbl_hr <= 0.0 {
            return 0.0;
        }
        largest / (self.pumping_rate_bbl_hr * 24.0)
    }

    /// The declared aggregate inventory bounds.
    #[must_use]
    pub fn inventory_bounds(&self) -> crate::validate::InventoryBounds {
        crate::validate::InventoryBounds::new(self.min_inventory_bbl, self.max_inventory_bbl)
    }

    /// Capture the full form, scalars plus per-tank fields, as one snapshot.
    #[must_use]
    pub fn capture(&self, registry: &TankRegistry) -> FormSnapshot {
        let mut snap = FormSnapshot::new();
        snap.set(keys::NUM_TANKS, f64::from(registry.count()));
        snap.set(keys::TANK_CAPACITY, registry.capacity_bbl());
        snap.set(keys::MIN_INVENTORY, self.min_inventory_bbl);
        snap.set(keys::MAX_INVENTORY, self.max_inventory_bbl);
        snap.set(keys::DEFAULT_DEAD_BOTTOM, self.default_dead_bottom_bbl);
        snap.set(keys::PROCESSING_RATE, self.processing_rate_bbl_day);
        snap.set(keys::PUMPING_RATE, self.pumping_rate_bbl_hr);
        snap.set(keys::PRE_JOURNEY_DAYS, self.pre_journey_days);
        snap.set(keys::JOURNEY_DAYS, self.journey_days);
        snap.set(keys::PRE_DISCHARGE_DAYS, self.pre_discharge_days);
        snap.set(keys::SETTLING_TIME, self.settling_days);
        snap.set(keys::LAB_TESTING_DAYS, self.lab_testing_days);
        snap.set(keys::DEPARTURE_MODE, self.departure_mode.as_str());
        snap.set(keys::VLCC_CAPACITY, self.vlcc_capacity_bbl);
        snap.set(keys::SUEZMAX_CAPACITY, self.suezmax_capacity_bbl);
        snap.set(keys::AFRAMAX_CAPACITY, self.aframax_capacity_bbl);
        snap.set(keys::PANAMAX_CAPACITY, self.panamax_capacity_bbl);
        snap.set(keys::HANDYMAX_CAPACITY, self.handymax_capacity_bbl);
        for tank in registry.tanks() {
            snap.set(keys::tank_level(tank.id), tank.level_bbl);
            snap.set(keys::dead_bottom(tank.id), tank.dead_bottom_bbl);
        }
        snap
    }

    /// Apply a persisted snapshot to the form and registry.
    ///
    /// Scalars land first, then the tank count is reconciled, then per-tank
    /// fields for ids that are live after reconciliation. Fields the snapshot
    /// does not name keep their current value.
    pub fn apply_snapshot(&mut self, registry: &mut TankRegistry, snap: &FormSnapshot) {
        for (key, value) in snap.iter() {
            let per_tank = parse_indexed_key(key, "tank", "Level").is_some()
                || parse_indexed_key(key, "deadBottom", "").is_some();
            if key == keys::NUM_TANKS || per_tank {
                continue;
            }
            self.apply_field(registry, key, value);
        }
        if let Some(n) = snap.number(keys::NUM_TANKS) {
            if n >= 0.0 && n.fract() == 0.0 {
                registry.set_count(n as u32);
            }
        }
        for tank_id in 1..=registry.count() {
            if let Some(level) = snap.number(&keys::tank_level(tank_id)) {
                registry.set_level(tank_id, level);
            }
            if let Some(dead) = snap.number(&keys::dead_bottom(tank_id)) {
                registry.set_dead_bottom(tank_id, dead);
            }
        }
        tracing::debug!(fields = snap.len(), tanks = registry.count(), "snapshot applied");
    }

    /// Route one field edit to the form or the registry.
    ///
    /// Returns false for an unknown key or a value of the wrong shape; state
    /// is untouched in that case.
    pub fn apply_field(
        &mut self,
        registry: &mut TankRegistry,
        key: &str,
        value: &FieldValue,
    ) -> bool {
        if key == keys::DEPARTURE_MODE {
            return match value.as_text() {
                Some(raw) => {
                    self.departure_mode = DepartureMode::from_wire(raw);
                    true
                }
                None => false,
            };
        }

        let Some(number) = value.as_number() else {
            return false;
        };
        match key {
            keys::NUM_TANKS => {
                if number < 0.0 || number.fract() != 0.0 {
                    return false;
                }
                registry.set_count(number as u32);
            }
            keys::TANK_CAPACITY => registry.set_capacity(number),
            keys::MIN_INVENTORY => self.min_inventory_bbl = number,
            keys::MAX_INVENTORY => self.max_inventory_bbl = number,
            keys::DEFAULT_DEAD_BOTTOM => self.default_dead_bottom_bbl = number,
            keys::PROCESSING_RATE => self.processing_rate_bbl_day = number,
            keys::PUMPING_RATE => self.pumping_rate_bbl_hr = number,
            keys::PRE_JOURNEY_DAYS => self.pre_journey_days = number,
            keys::JOURNEY_DAYS => self.journey_days = number,
            keys::PRE_DISCHARGE_DAYS => self.pre_discharge_days = number,
            keys::SETTLING_TIME => self.settling_days = number,
            keys::LAB_TESTING_DAYS => self.lab_testing_days = number,
            keys::VLCC_CAPACITY => self.vlcc_capacity_bbl = number,
            keys::SUEZMAX_CAPACITY => self.suezmax_capacity_bbl = number,
            keys::AFRAMAX_CAPACITY => self.aframax_capacity_bbl = number,
            keys::PANAMAX_CAPACITY => self.panamax_capacity_bbl = number,
            keys::HANDYMAX_CAPACITY => self.handymax_capacity_bbl = number,
            _ => return self.apply_tank_field(registry, key, number),
        }
        true
    }

    fn apply_tank_field(&mut self, registry: &mut TankRegistry, key: &str, number: f64) -> bool {
        if let Some(id) = parse_indexed_key(key, "tank", "Level") {
            return registry.set_level(id, number);
        }
        if let Some(id) = parse_indexed_key(key, "deadBottom", "") {
            return registry.set_dead_bottom(id, number);
        }
        false
    }
}

/// Extract the tank id from keys shaped `<prefix><id><suffix>`.
fn parse_indexed_key(key: &str, prefix: &str, suffix: &str) -> Option<u32> {
    let middle = key.strip_prefix(prefix)?.strip_suffix(suffix)?;
    if middle.is_empty() {
        return None;
    }
    middle.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (FormState, TankRegistry) {
        let form = FormState::default();
        let registry = TankRegistry::new(FormState::DEFAULT_TANK_COUNT, form.tank_capacity_bbl);
        (form, registry)
    }

    #[test]
    fn default_lead_time_sums_all_stages() {
        let form = FormState::default();
        assert_eq!(form.lead_time_days(), 15.0);
    }

    #[test]
    fn pumping_days_uses_largest_cargo() {
        let mut form = FormState::default();
        form.vlcc_capacity_bbl = 2_000_000.0;
        form.suezmax_capacity_bbl = 1_000_000.0;
        // 2_000_000 / (30_000 * 24)
        let expected = 2_000_000.0 / 720_000.0;
        assert!((form.pumping_days() - expected).abs() < 1e-9);
    }

    #[test]
    fn pumping_days_is_zero_without_cargo_or_rate() {
        let mut form = FormState::default();
        assert_eq!(form.pumping_days(), 0.0);
        form.vlcc_capacity_bbl = 2_000_000.0;
        form.pumping_rate_bbl_hr = 0.0;
        assert_eq!(form.pumping_days(), 0.0);
    }

    #[test]
    fn capture_includes_scalars_and_every_tank() {
        let (form, registry) = fresh();
        let snap = form.capture(&registry);
        assert_eq!(snap.number(keys::NUM_TANKS), Some(12.0));
        assert_eq!(snap.number(keys::TANK_CAPACITY), Some(500_000.0));
        assert_eq!(
            snap.get(keys::DEPARTURE_MODE).and_then(FieldValue::as_text),
            Some("manual")
        );
        assert_eq!(snap.number(&keys::tank_level(1)), Some(500_000.0));
        assert_eq!(snap.number(&keys::dead_bottom(12)), Some(10_000.0));
        assert!(snap.get(&keys::tank_level(13)).is_none());
    }

    #[test]
    fn snapshot_round_trips_through_capture_and_apply() {
        let (mut form, mut registry) = fresh();
        form.min_inventory_bbl = 1_000_000.0;
        form.departure_mode = DepartureMode::Solver;
        registry.set_count(4);
        registry.set_level(2, 123_456.0);
        let snap = form.capture(&registry);

        let (mut form2, mut registry2) = fresh();
        form2.apply_snapshot(&mut registry2, &snap);
        assert_eq!(form2, form);
        assert_eq!(registry2, registry);
    }

    #[test]
    fn apply_snapshot_reconciles_count_before_tank_fields() {
        let (mut form, mut registry) = fresh();
        let mut snap = FormSnapshot::new();
        snap.set(keys::NUM_TANKS, 14.0);
        snap.set(keys::tank_level(14), 77_000.0);
        form.apply_snapshot(&mut registry, &snap);
        assert_eq!(registry.count(), 14);
        assert_eq!(registry.tank(14).unwrap().level_bbl, 77_000.0);
    }

    #[test]
    fn apply_snapshot_ignores_fields_it_does_not_name() {
        let (mut form, mut registry) = fresh();
        form.journey_days = 21.0;
        let mut snap = FormSnapshot::new();
        snap.set(keys::PUMPING_RATE, 25_000.0);
        form.apply_snapshot(&mut registry, &snap);
        assert_eq!(form.pumping_rate_bbl_hr, 25_000.0);
        assert_eq!(form.journey_days, 21.0);
    }

    #[test]
    fn apply_field_routes_tank_keys() {
        let (mut form, mut registry) = fresh();
        assert!(form.apply_field(&mut registry, "tank3Level", &FieldValue::Number(80_000.0)));
        assert_eq!(registry.tank(3).unwrap().level_bbl, 80_000.0);
        assert!(form.apply_field(&mut registry, "deadBottom3", &FieldValue::Number(10_200.0)));
        assert_eq!(registry.tank(3).unwrap().dead_bottom_bbl, 10_200.0);
        // Dead tank ids are rejected.
        assert!(!form.apply_field(&mut registry, "tank40Level", &FieldValue::Number(1.0)));
    }

    #[test]
    fn apply_field_rejects_unknown_keys_and_wrong_shapes() {
        let (mut form, mut registry) = fresh();
        assert!(!form.apply_field(&mut registry, "nonsense", &FieldValue::Number(1.0)));
        assert!(!form.apply_field(&mut registry, keys::JOURNEY_DAYS, &FieldValue::Bool(true)));
        assert!(!form.apply_field(&mut registry, keys::NUM_TANKS, &FieldValue::Number(2.5)));
        assert_eq!(registry.count(), 12);
    }

    #[test]
    fn departure_mode_parses_wire_values() {
        assert_eq!(DepartureMode::from_wire("solver"), DepartureMode::Solver);
        assert_eq!(DepartureMode::from_wire("manual"), DepartureMode::Manual);
        assert_eq!(DepartureMode::from_wire("garbage"), DepartureMode::Manual);
    }

    #[test]
    fn stringly_typed_numbers_still_apply() {
        let (mut form, mut registry) = fresh();
        assert!(form.apply_field(
            &mut registry,
            keys::MIN_INVENTORY,
            &FieldValue::Text("2000000".to_string())
        ));
        assert_eq!(form.min_inventory_bbl, 2_000_000.0);
    }
}
