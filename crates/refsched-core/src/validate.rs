//! Aggregate inventory validation.
//!
//! Judges the live tank set against operator-declared inventory bounds and
//! produces a tri-state verdict. The verdict is derived state: recomputed on
//! every relevant mutation, never persisted.
//!
//! Errors block simulation submission; Warnings are advisory only.

use std::fmt;

use crate::tank::Tank;

/// Operator-declared aggregate inventory bounds, in barrels.
///
/// Zero (or absent) on both sides means no range is declared.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InventoryBounds {
    pub min_bbl: f64,
    pub max_bbl: f64,
}

impl InventoryBounds {
    #[must_use]
    pub fn new(min_bbl: f64, max_bbl: f64) -> Self {
        Self { min_bbl, max_bbl }
    }

    /// A range is only enforced when both bounds are positive.
    #[must_use]
    pub fn declared(&self) -> bool {
        self.min_bbl > 0.0 && self.max_bbl > 0.0
    }

    /// Whether these bounds must block a simulation request.
    ///
    /// Only a malformed declared range blocks; out-of-range inventory is
    /// advisory.
    #[must_use]
    pub fn blocks_submission(&self) -> bool {
        (self.min_bbl > 0.0 || self.max_bbl > 0.0) && self.min_bbl >= self.max_bbl
    }
}

/// Severity of a [`Verdict`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

/// The derived validity judgment over the live tank set.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    /// Bounds are malformed or negative. Blocks submission.
    Error { message: String },
    /// Bounds are well-formed but the aggregate is outside the range.
    /// Advisory only.
    Warning { message: String, current_bbl: f64 },
    /// In range, or no range declared.
    Ok { message: String, current_bbl: f64 },
}

impl Verdict {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Error { .. } => Severity::Error,
            Self::Warning { .. } => Severity::Warning,
            Self::Ok { .. } => Severity::Ok,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Error { message }
            | Self::Warning { message, .. }
            | Self::Ok { message, .. } => message,
        }
    }

    /// The aggregate figure, when the bounds were well-formed enough to
    /// compute one.
    #[must_use]
    pub fn current_bbl(&self) -> Option<f64> {
        match self {
            Self::Error { .. } => None,
            Self::Warning { current_bbl, .. } | Self::Ok { current_bbl, .. } => Some(*current_bbl),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Format a barrel figure with thousands separators for operator-facing
/// messages.
fn format_bbl(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    let first_group = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - first_group) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Judge the aggregate usable inventory against the declared bounds.
pub fn validate(bounds: InventoryBounds, tanks: &[Tank]) -> Verdict {
    if bounds.min_bbl >= bounds.max_bbl && bounds.max_bbl > 0.0 {
        return Verdict::Error {
            message: "minimum inventory must be less than maximum inventory".to_string(),
        };
    }
    if bounds.min_bbl < 0.0 || bounds.max_bbl < 0.0 {
        return Verdict::Error {
            message: "inventory values cannot be negative".to_string(),
        };
    }

    let current_bbl: f64 = tanks.iter().map(Tank::usable_bbl).sum();
    let tank_count = tanks.len();

    if bounds.declared() {
        if current_bbl < bounds.min_bbl {
            return Verdict::Warning {
                message: format!(
                    "current inventory ({} bbl) is below minimum ({} bbl)",
                    format_bbl(current_bbl),
                    format_bbl(bounds.min_bbl)
                ),
                current_bbl,
            };
        }
        if current_bbl > bounds.max_bbl {
            return Verdict::Warning {
                message: format!(
                    "current inventory ({} bbl) is above maximum ({} bbl)",
                    format_bbl(current_bbl),
                    format_bbl(bounds.max_bbl)
                ),
                current_bbl,
            };
        }
        return Verdict::Ok {
            message: format!(
                "current inventory: {} bbl (range {} - {} bbl) - {} tanks",
                format_bbl(current_bbl),
                format_bbl(bounds.min_bbl),
                format_bbl(bounds.max_bbl),
                tank_count
            ),
            current_bbl,
        };
    }

    Verdict::Ok {
        message: format!(
            "current inventory: {} bbl - {} tanks (no range limits set)",
            format_bbl(current_bbl),
            tank_count
        ),
        current_bbl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tank(level: f64, dead: f64) -> Tank {
        Tank {
            id: 1,
            level_bbl: level,
            dead_bottom_bbl: dead,
        }
    }

    #[test]
    fn inverted_bounds_are_an_error_for_any_tank_state() {
        let verdict = validate(InventoryBounds::new(10_000.0, 5_000.0), &[]);
        assert_eq!(verdict.severity(), Severity::Error);
        assert!(verdict.message().contains("less than maximum"));
        assert_eq!(verdict.current_bbl(), None);

        let verdict = validate(
            InventoryBounds::new(10_000.0, 5_000.0),
            &[tank(1e9, 10_000.0)],
        );
        assert_eq!(verdict.severity(), Severity::Error);
    }

    #[test]
    fn negative_bounds_are_an_error() {
        let verdict = validate(InventoryBounds::new(-1.0, 0.0), &[]);
        assert_eq!(verdict.severity(), Severity::Error);
        assert!(verdict.message().contains("cannot be negative"));
    }

    #[test]
    fn no_range_reports_the_figure() {
        let verdict = validate(
            InventoryBounds::new(0.0, 0.0),
            &[tank(500_000.0, 10_000.0)],
        );
        assert_eq!(verdict.severity(), Severity::Ok);
        assert_eq!(verdict.current_bbl(), Some(490_000.0));
        assert!(verdict.message().contains("490,000"));
    }

    #[test]
    fn below_minimum_is_a_warning() {
        let verdict = validate(
            InventoryBounds::new(500_000.0, 600_000.0),
            &[tank(500_000.0, 10_000.0)],
        );
        assert!(matches!(verdict, Verdict::Warning { .. }));
        assert_eq!(verdict.current_bbl(), Some(490_000.0));
        assert!(verdict.message().contains("below minimum"));
    }

    #[test]
    fn above_maximum_is_a_warning() {
        let verdict = validate(
            InventoryBounds::new(100_000.0, 200_000.0),
            &[tank(500_000.0, 10_000.0)],
        );
        assert!(matches!(verdict, Verdict::Warning { .. }));
        assert!(verdict.message().contains("above maximum"));
    }

    #[test]
    fn in_range_is_ok_and_reports_range() {
        let verdict = validate(
            InventoryBounds::new(400_000.0, 600_000.0),
            &[tank(500_000.0, 10_000.0)],
        );
        assert_eq!(verdict.severity(), Severity::Ok);
        assert!(verdict.message().contains("range"));
    }

    #[test]
    fn tanks_below_dead_bottom_contribute_zero() {
        let tanks = [tank(5_000.0, 10_000.0), tank(30_000.0, 10_000.0)];
        let verdict = validate(InventoryBounds::default(), &tanks);
        assert_eq!(verdict.current_bbl(), Some(20_000.0));
    }

    #[test]
    fn submission_gating_follows_bounds_not_warnings() {
        assert!(InventoryBounds::new(10_000.0, 5_000.0).blocks_submission());
        assert!(InventoryBounds::new(10_000.0, 0.0).blocks_submission());
        assert!(!InventoryBounds::new(0.0, 0.0).blocks_submission());
        assert!(!InventoryBounds::new(1_000.0, 2_000.0).blocks_submission());
    }

    #[test]
    fn figure_formatting_groups_thousands() {
        assert_eq!(format_bbl(0.0), "0");
        assert_eq!(format_bbl(999.0), "999");
        assert_eq!(format_bbl(1_000.0), "1,000");
        assert_eq!(format_bbl(490_000.0), "490,000");
        assert_eq!(format_bbl(2_500_000.0), "2,500,000");
    }
}
