//! Debounced autosave scheduling.
//!
//! [`AutoSaveScheduler`] is a deterministic state machine deciding *when* a
//! save should happen; it never performs the save itself. All methods take
//! the current time as an argument, so tests drive the clock directly and
//! never sleep.
//!
//! # Decision Rules
//!
//! | Event | Input class | Decision |
//! |-------|-------------|----------|
//! | change | Discrete (select, checkbox) | save now |
//! | input | Continuous (text, numeric) | arm/reset debounce deadline |
//! | blur | Continuous | save now; pending deadline stays armed |
//! | tick past deadline | — | save now, deadline cleared |
//!
//! A typing burst therefore yields exactly one debounced save per pause of
//! at least the debounce interval, plus one guaranteed save on blur.

use std::time::{Duration, Instant};

/// Default pause after the last keystroke before a debounced save fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Tuning for [`AutoSaveScheduler`].
#[derive(Clone, Copy, Debug)]
pub struct AutoSaveConfig {
    /// Trailing-edge debounce interval for continuous inputs.
    pub debounce: Duration,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl AutoSaveConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the debounce interval.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// How an input field behaves for save scheduling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputClass {
    /// Select, checkbox, radio: one deliberate action per change.
    Discrete,
    /// Text or numeric entry: a stream of keystrokes per edit.
    Continuous,
}

/// Why a save fired, for logging and the stats counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveTrigger {
    /// A discrete input changed.
    Change,
    /// A continuous input lost focus.
    Blur,
    /// The debounce deadline elapsed with no superseding event.
    Debounce,
}

/// What the caller should do after feeding the scheduler an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveAction {
    /// Nothing to do yet.
    None,
    /// Capture a fresh snapshot and save it.
    SaveNow(SaveTrigger),
}

impl SaveAction {
    /// Whether this action fires a save.
    #[must_use]
    pub fn fires(self) -> bool {
        matches!(self, Self::SaveNow(_))
    }
}

/// Decision counters, for debugging save behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Continuous input events observed.
    pub inputs_observed: u64,
    /// Deadlines superseded by a newer input before firing.
    pub deadlines_reset: u64,
    /// Saves fired, by trigger.
    pub change_saves: u64,
    pub blur_saves: u64,
    pub debounce_saves: u64,
}

impl SchedulerStats {
    /// Total saves fired across all triggers.
    #[must_use]
    pub fn total_saves(&self) -> u64 {
        self.change_saves + self.blur_saves + self.debounce_saves
    }
}

/// Trailing-edge debounce state machine for form autosaves.
#[derive(Debug)]
pub struct AutoSaveScheduler {
    config: AutoSaveConfig,
    deadline: Option<Instant>,
    stats: SchedulerStats,
}

impl AutoSaveScheduler {
    #[must_use]
    pub fn new(config: AutoSaveConfig) -> Self {
        Self {
            config,
            deadline: None,
            stats: SchedulerStats::default(),
        }
    }

    /// An input event at `now`.
    ///
    /// Discrete inputs save immediately; continuous inputs arm (or push
    /// back) the debounce deadline.
    pub fn record_input_at(&mut self, class: InputClass, now: Instant) -> SaveAction {
        match class {
            InputClass::Discrete => {
                self.stats.change_saves += 1;
                SaveAction::SaveNow(SaveTrigger::Change)
            }
            InputClass::Continuous => {
                self.stats.inputs_observed += 1;
                if self.deadline.is_some() {
                    self.stats.deadlines_reset += 1;
                }
                self.deadline = Some(now + self.config.debounce);
                SaveAction::None
            }
        }
    }

    /// A continuous input lost focus at `now`.
    ///
    /// Fires immediately. The pending deadline, if any, stays armed; the
    /// trailing save after a pause is guaranteed even when focus moves.
    pub fn record_blur_at(&mut self, _now: Instant) -> SaveAction {
        self.stats.blur_saves += 1;
        SaveAction::SaveNow(SaveTrigger::Blur)
    }

    /// Advance the clock to `now`, firing the deadline if it has passed.
    pub fn tick_at(&mut self, now: Instant) -> SaveAction {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.stats.debounce_saves += 1;
                SaveAction::SaveNow(SaveTrigger::Debounce)
            }
            _ => SaveAction::None,
        }
    }

    /// Whether a debounce deadline is armed.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time remaining until the armed deadline, zero if already due.
    #[must_use]
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Decision counters so far.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }
}

impl Default for AutoSaveScheduler {
    fn default() -> Self {
        Self::new(AutoSaveConfig::default())
    }
}
