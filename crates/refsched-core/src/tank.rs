//! The live tank set.
//!
//! [`TankRegistry`] owns the dynamically-sized collection of storage tanks
//! and keeps it in lockstep with the operator-declared count. The id space
//! is dense: live ids are always exactly `{1..=N}`.
//!
//! # Invariants
//!
//! 1. **Dense ids**: no gaps, no duplicates; a tank's id doubles as its
//!    display index.
//! 2. **Trim from the top**: shrinking removes the highest ids first, so
//!    survivors are never reindexed.
//! 3. **Full by default**: tanks appended on growth start at the shared
//!    capacity, not at zero.
//! 4. **Fail-closed parsing**: a count that does not parse as a
//!    non-negative integer leaves the registry untouched.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `remove_one` at the floor | No-op, `RegistryChange::Unchanged` |
//! | Unparseable count string | `RegistryError::InvalidCount`, no mutation |
//! | Level above capacity | Clamped to capacity |
//! | Dead bottom outside domain | Clamped into `[10_000, 10_500]` |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default unusable floor for a tank, in barrels.
pub const DEAD_BOTTOM_DEFAULT_BBL: f64 = 10_000.0;
/// Lower bound of the dead-bottom domain.
pub const DEAD_BOTTOM_MIN_BBL: f64 = 10_000.0;
/// Upper bound of the dead-bottom domain.
pub const DEAD_BOTTOM_MAX_BBL: f64 = 10_500.0;
/// The registry never shrinks below one live tank.
pub const MIN_TANKS: u32 = 1;

/// One physical storage tank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    /// 1-based, dense within the live set.
    pub id: u32,
    /// Current inventory in barrels, bounded above by the shared capacity.
    pub level_bbl: f64,
    /// Unusable inventory floor in barrels.
    pub dead_bottom_bbl: f64,
}

impl Tank {
    fn new(id: u32, capacity_bbl: f64) -> Self {
        Self {
            id,
            level_bbl: capacity_bbl,
            dead_bottom_bbl: DEAD_BOTTOM_DEFAULT_BBL,
        }
    }

    /// Inventory that counts toward the aggregate figure.
    ///
    /// Dead bottom is never usable; a tank below its own dead bottom
    /// contributes zero, never a negative amount.
    #[must_use]
    pub fn usable_bbl(&self) -> f64 {
        (self.level_bbl - self.dead_bottom_bbl).max(0.0)
    }
}

/// Outcome of a registry reconcile, reported so the caller can refresh the
/// validity verdict and request an autosave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryChange {
    /// Requested count matched the live count.
    Unchanged,
    /// Tanks were appended at the high end.
    Grew {
        /// Number of tanks added.
        added: u32,
    },
    /// Tanks were removed from the high end.
    Shrank {
        /// Number of tanks removed.
        removed: u32,
    },
}

impl RegistryChange {
    /// Whether the live set was mutated.
    #[must_use]
    pub fn mutated(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Rejection of a registry operation; the registry is left unchanged.
#[derive(Debug)]
pub enum RegistryError {
    /// The requested count could not be parsed as a non-negative integer.
    InvalidCount(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCount(raw) => {
                write!(f, "tank count must be a non-negative integer, got {raw:?}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// The dynamically-sized set of tanks under management.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TankRegistry {
    tanks: Vec<Tank>,
    capacity_bbl: f64,
}

impl TankRegistry {
    /// Create a registry with `count` tanks, each full at `capacity_bbl`.
    #[must_use]
    pub fn new(count: u32, capacity_bbl: f64) -> Self {
        let mut registry = Self {
            tanks: Vec::new(),
            capacity_bbl,
        };
        registry.set_count(count);
        registry
    }

    /// Number of live tanks.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.tanks.len() as u32
    }

    /// Shared tank capacity in barrels.
    #[must_use]
    pub fn capacity_bbl(&self) -> f64 {
        self.capacity_bbl
    }

    /// The live tanks in id order.
    #[must_use]
    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    /// Look up a tank by id.
    #[must_use]
    pub fn tank(&self, id: u32) -> Option<&Tank> {
        (id >= 1).then(|| self.tanks.get(id as usize - 1)).flatten()
    }

    /// Reconcile the live set to exactly `n` tanks. Idempotent.
    ///
    /// Growth appends ids `current+1..=n` initialized full at the shared
    /// capacity with the default dead bottom; shrink trims from the top.
    pub fn set_count(&mut self, n: u32) -> RegistryChange {
        let current = self.count();
        let change = match n.cmp(&current) {
            std::cmp::Ordering::Greater => {
                for id in current + 1..=n {
                    self.tanks.push(Tank::new(id, self.capacity_bbl));
                }
                RegistryChange::Grew { added: n - current }
            }
            std::cmp::Ordering::Less => {
                self.tanks.truncate(n as usize);
                RegistryChange::Shrank {
                    removed: current - n,
                }
            }
            std::cmp::Ordering::Equal => RegistryChange::Unchanged,
        };
        if change.mutated() {
            tracing::debug!(from = current, to = n, "tank count reconciled");
        }
        change
    }

    /// Reconcile from an operator-entered string, fail-closed.
    pub fn set_count_from_str(&mut self, raw: &str) -> Result<RegistryChange, RegistryError> {
        let n: u32 = raw
            .trim()
            .parse()
            .map_err(|_| RegistryError::InvalidCount(raw.to_string()))?;
        Ok(self.set_count(n))
    }

    /// Append one tank at the high end.
    pub fn add_one(&mut self) -> RegistryChange {
        self.set_count(self.count() + 1)
    }

    /// Remove the highest-id tank; no-op at the floor of one tank.
    pub fn remove_one(&mut self) -> RegistryChange {
        let current = self.count();
        if current <= MIN_TANKS {
            return RegistryChange::Unchanged;
        }
        self.set_count(current - 1)
    }

    /// Change the shared capacity, clamping every live level to the new
    /// ceiling.
    pub fn set_capacity(&mut self, capacity_bbl: f64) {
        self.capacity_bbl = capacity_bbl.max(0.0);
        for tank in &mut self.tanks {
            if tank.level_bbl > self.capacity_bbl {
                tank.level_bbl = self.capacity_bbl;
            }
        }
    }

    /// Set every live tank's level to the shared capacity ("start full").
    pub fn populate_levels(&mut self) {
        for tank in &mut self.tanks {
            tank.level_bbl = self.capacity_bbl;
        }
    }

    /// Overwrite every live tank's dead bottom, clamped into the legal
    /// domain.
    pub fn apply_default_dead_bottom(&mut self, dead_bottom_bbl: f64) {
        let clamped = dead_bottom_bbl.clamp(DEAD_BOTTOM_MIN_BBL, DEAD_BOTTOM_MAX_BBL);
        for tank in &mut self.tanks {
            tank.dead_bottom_bbl = clamped;
        }
    }

    /// Edit one tank's level, clamped into `[0, capacity]`.
    ///
    /// Returns false if the id is not live.
    pub fn set_level(&mut self, id: u32, level_bbl: f64) -> bool {
        let capacity = self.capacity_bbl;
        match self.tank_mut(id) {
            Some(tank) => {
                tank.level_bbl = level_bbl.clamp(0.0, capacity);
                true
            }
            None => false,
        }
    }

    /// Edit one tank's dead bottom, clamped into the legal domain.
    ///
    /// Returns false if the id is not live.
    pub fn set_dead_bottom(&mut self, id: u32, dead_bottom_bbl: f64) -> bool {
        match self.tank_mut(id) {
            Some(tank) => {
                tank.dead_bottom_bbl =
                    dead_bottom_bbl.clamp(DEAD_BOTTOM_MIN_BBL, DEAD_BOTTOM_MAX_BBL);
                true
            }
            None => false,
        }
    }

    /// Aggregate usable inventory across the live set.
    #[must_use]
    pub fn usable_inventory_bbl(&self) -> f64 {
        self.tanks.iter().map(Tank::usable_bbl).sum()
    }

    fn tank_mut(&mut self, id: u32) -> Option<&mut Tank> {
        (id >= 1)
            .then(|| self.tanks.get_mut(id as usize - 1))
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(registry: &TankRegistry) -> Vec<u32> {
        registry.tanks().iter().map(|t| t.id).collect()
    }

    #[test]
    fn new_registry_is_dense_and_full() {
        let registry = TankRegistry::new(3, 500_000.0);
        assert_eq!(ids(&registry), vec![1, 2, 3]);
        for tank in registry.tanks() {
            assert_eq!(tank.level_bbl, 500_000.0);
            assert_eq!(tank.dead_bottom_bbl, DEAD_BOTTOM_DEFAULT_BBL);
        }
    }

    #[test]
    fn grow_appends_at_the_high_end() {
        let mut registry = TankRegistry::new(2, 500_000.0);
        registry.set_level(1, 120_000.0);

        let change = registry.set_count(4);
        assert_eq!(change, RegistryChange::Grew { added: 2 });
        assert_eq!(ids(&registry), vec![1, 2, 3, 4]);
        // Survivors keep their edits; new tanks start full.
        assert_eq!(registry.tank(1).unwrap().level_bbl, 120_000.0);
        assert_eq!(registry.tank(4).unwrap().level_bbl, 500_000.0);
    }

    #[test]
    fn shrink_trims_from_the_top() {
        let mut registry = TankRegistry::new(5, 500_000.0);
        registry.set_level(2, 42_000.0);

        let change = registry.set_count(2);
        assert_eq!(change, RegistryChange::Shrank { removed: 3 });
        assert_eq!(ids(&registry), vec![1, 2]);
        assert_eq!(registry.tank(2).unwrap().level_bbl, 42_000.0);
    }

    #[test]
    fn set_count_is_idempotent() {
        let mut registry = TankRegistry::new(4, 500_000.0);
        assert_eq!(registry.set_count(4), RegistryChange::Unchanged);
        assert_eq!(registry.count(), 4);
    }

    #[test]
    fn remove_one_refuses_to_go_below_the_floor() {
        let mut registry = TankRegistry::new(1, 500_000.0);
        assert_eq!(registry.remove_one(), RegistryChange::Unchanged);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn add_and_remove_are_count_sugar() {
        let mut registry = TankRegistry::new(2, 500_000.0);
        assert_eq!(registry.add_one(), RegistryChange::Grew { added: 1 });
        assert_eq!(registry.count(), 3);
        assert_eq!(registry.remove_one(), RegistryChange::Shrank { removed: 1 });
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn unparseable_count_is_rejected_without_mutation() {
        let mut registry = TankRegistry::new(3, 500_000.0);
        let err = registry.set_count_from_str("twelve").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidCount(_)));
        assert_eq!(registry.count(), 3);

        assert!(registry.set_count_from_str("-2").is_err());
        assert_eq!(registry.count(), 3);

        assert_eq!(
            registry.set_count_from_str(" 5 ").unwrap(),
            RegistryChange::Grew { added: 2 }
        );
    }

    #[test]
    fn lowering_capacity_clamps_levels() {
        let mut registry = TankRegistry::new(2, 500_000.0);
        registry.set_capacity(300_000.0);
        assert!(registry.tanks().iter().all(|t| t.level_bbl == 300_000.0));

        // Raising it back does not touch levels.
        registry.set_capacity(500_000.0);
        assert!(registry.tanks().iter().all(|t| t.level_bbl == 300_000.0));
    }

    #[test]
    fn populate_levels_fills_every_tank() {
        let mut registry = TankRegistry::new(3, 500_000.0);
        registry.set_level(2, 0.0);
        registry.populate_levels();
        assert!(registry.tanks().iter().all(|t| t.level_bbl == 500_000.0));
    }

    #[test]
    fn dead_bottom_edits_are_clamped_to_domain() {
        let mut registry = TankRegistry::new(2, 500_000.0);
        assert!(registry.set_dead_bottom(1, 99_999.0));
        assert_eq!(registry.tank(1).unwrap().dead_bottom_bbl, DEAD_BOTTOM_MAX_BBL);

        registry.apply_default_dead_bottom(1.0);
        assert!(
            registry
                .tanks()
                .iter()
                .all(|t| t.dead_bottom_bbl == DEAD_BOTTOM_MIN_BBL)
        );
    }

    #[test]
    fn level_edits_clamp_into_range() {
        let mut registry = TankRegistry::new(1, 500_000.0);
        assert!(registry.set_level(1, 900_000.0));
        assert_eq!(registry.tank(1).unwrap().level_bbl, 500_000.0);
        assert!(registry.set_level(1, -5.0));
        assert_eq!(registry.tank(1).unwrap().level_bbl, 0.0);
        assert!(!registry.set_level(7, 1.0));
    }

    #[test]
    fn usable_inventory_ignores_dead_bottom() {
        let mut registry = TankRegistry::new(2, 500_000.0);
        registry.set_level(1, 500_000.0);
        registry.set_level(2, 5_000.0); // below its own dead bottom
        assert_eq!(registry.usable_inventory_bbl(), 490_000.0);
    }

    proptest! {
        #[test]
        fn ids_stay_dense_across_arbitrary_walks(counts in proptest::collection::vec(0u32..64, 1..16)) {
            let mut registry = TankRegistry::new(12, 500_000.0);
            for n in counts {
                registry.set_count(n);
                let expected: Vec<u32> = (1..=n).collect();
                prop_assert_eq!(ids(&registry), expected);
            }
        }

        #[test]
        fn usable_is_never_negative(level in 0.0f64..1e6, dead in 9_000.0f64..12_000.0) {
            let tank = Tank { id: 1, level_bbl: level, dead_bottom_bbl: dead };
            prop_assert!(tank.usable_bbl() >= 0.0);
        }
    }
}
