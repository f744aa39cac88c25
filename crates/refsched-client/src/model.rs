//! Headless client model.
//!
//! [`ClientModel`] wires the form, tank registry, validator, autosave
//! scheduler and session together behind one `handle(event, now) -> Effect`
//! entry point. All mutation happens inside `handle`, which runs to
//! completion per event; network and file work is expressed as returned
//! [`Effect`] values the embedding runtime executes, feeding results back in
//! as further events.
//!
//! # Invariants
//!
//! 1. **Verdict freshness**: every mutation of tanks or bounds re-runs the
//!    validator before `handle` returns.
//! 2. **Stale remote loads are discarded**: a remote snapshot is applied
//!    only if no edit happened since the fetch was issued (generation
//!    match). In-flight operator edits always win over a slow load.
//! 3. **Snapshots at fire time**: a save effect carries the snapshot
//!    captured when the save fired, never an earlier one.

use std::time::Instant;

use refsched_core::{FieldValue, FormSnapshot, FormState, TankRegistry, Verdict, validate};

use crate::api::SimulationOutcome;
use crate::autosave::{AutoSaveConfig, AutoSaveScheduler, InputClass, SaveAction, SaveTrigger};
use crate::session::SessionContext;

/// Everything that can happen to the model.
#[derive(Clone, Debug)]
pub enum Event {
    /// One labeled input changed value.
    FieldEdited {
        key: String,
        value: FieldValue,
        class: InputClass,
    },
    /// A continuous input lost focus.
    FieldBlurred,
    /// Clock advance; drives the debounce deadline.
    Tick,
    /// Operator typed a new tank count.
    TankCountEntered(String),
    /// Add-one-tank button.
    TankAdded,
    /// Remove-one-tank button.
    TankRemoved,
    /// Fill every tank to the shared capacity.
    LevelsPopulated,
    /// Push the form's default dead bottom to every tank.
    DeadBottomApplied,
    /// The remote load issued at `generation` came back.
    RemoteLoaded {
        snapshot: FormSnapshot,
        generation: u64,
    },
    /// The remote load failed; local state stands.
    RemoteLoadFailed { generation: u64, error: String },
    /// Operator requested a simulation run.
    SimulationRequested,
    /// Operator requested a workbook export of the last run.
    ExportRequested(ExportKind),
    /// A run finished on the service.
    SimulationCompleted(SimulationOutcome),
    /// A run failed in transport or on the service.
    SimulationFailed(String),
}

/// Which workbook an export request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    TankStatus,
    Charts,
}

/// Work the embedding runtime must perform after an event.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Nothing to do.
    None,
    /// Persist this snapshot through the store coordinator.
    Save {
        trigger: SaveTrigger,
        snapshot: FormSnapshot,
    },
    /// Fetch the remote snapshot; echo `generation` back in `RemoteLoaded`.
    FetchRemote { generation: u64 },
    /// Submit this snapshot to the simulation service.
    Simulate(FormSnapshot),
    /// Download a workbook built from the last run's outcome.
    Export {
        kind: ExportKind,
        outcome: SimulationOutcome,
    },
    /// Submission refused; show the message to the operator.
    Blocked(String),
}

/// The client's entire mutable state.
pub struct ClientModel {
    form: FormState,
    registry: TankRegistry,
    scheduler: AutoSaveScheduler,
    verdict: Verdict,
    session: SessionContext,
    edit_generation: u64,
}

impl ClientModel {
    /// Fresh model with default parameters and a full default tank set.
    #[must_use]
    pub fn new(autosave: AutoSaveConfig) -> Self {
        let form = FormState::default();
        let registry = TankRegistry::new(FormState::DEFAULT_TANK_COUNT, form.tank_capacity_bbl);
        let verdict = validate(form.inventory_bounds(), registry.tanks());
        Self {
            form,
            registry,
            scheduler: AutoSaveScheduler::new(autosave),
            verdict,
            session: SessionContext::new(),
            edit_generation: 0,
        }
    }

    /// Bring the model up: apply the locally restored snapshot (if any) and
    /// ask the runtime to fetch the remote one.
    pub fn start(&mut self, local: Option<FormSnapshot>) -> Effect {
        if let Some(snapshot) = local {
            self.form.apply_snapshot(&mut self.registry, &snapshot);
            self.revalidate();
        }
        Effect::FetchRemote {
            generation: self.edit_generation,
        }
    }

    /// Dispatch one event. Runs to completion; never blocks.
    pub fn handle(&mut self, event: Event, now: Instant) -> Effect {
        match event {
            Event::FieldEdited { key, value, class } => self.field_edited(&key, &value, class, now),
            Event::FieldBlurred => {
                let action = self.scheduler.record_blur_at(now);
                self.action_to_effect(action)
            }
            Event::Tick => {
                let action = self.scheduler.tick_at(now);
                self.action_to_effect(action)
            }
            Event::TankCountEntered(raw) => self.tank_count_entered(&raw, now),
            Event::TankAdded => {
                self.registry.add_one();
                self.mutated_discrete(now)
            }
            Event::TankRemoved => {
                if self.registry.remove_one().mutated() {
                    self.mutated_discrete(now)
                } else {
                    Effect::None
                }
            }
            Event::LevelsPopulated => {
                self.registry.populate_levels();
                self.mutated_discrete(now)
            }
            Event::DeadBottomApplied => {
                self.registry
                    .apply_default_dead_bottom(self.form.default_dead_bottom_bbl);
                self.mutated_discrete(now)
            }
            Event::RemoteLoaded {
                snapshot,
                generation,
            } => {
                self.remote_loaded(snapshot, generation);
                Effect::None
            }
            Event::RemoteLoadFailed { generation, error } => {
                tracing::warn!(generation, error = %error, "remote load failed, local state stands");
                Effect::None
            }
            Event::SimulationRequested => self.simulation_requested(),
            Event::ExportRequested(kind) => self.export_requested(kind),
            Event::SimulationCompleted(outcome) => {
                self.session.record_outcome(outcome);
                Effect::None
            }
            Event::SimulationFailed(error) => {
                tracing::warn!(error = %error, "simulation failed");
                Effect::None
            }
        }
    }

    fn field_edited(
        &mut self,
        key: &str,
        value: &FieldValue,
        class: InputClass,
        now: Instant,
    ) -> Effect {
        if !self.form.apply_field(&mut self.registry, key, value) {
            tracing::debug!(key, "edit rejected, state unchanged");
            return Effect::None;
        }
        self.edit_generation += 1;
        self.revalidate();
        let action = self.scheduler.record_input_at(class, now);
        self.action_to_effect(action)
    }

    fn tank_count_entered(&mut self, raw: &str, now: Instant) -> Effect {
        match self.registry.set_count_from_str(raw) {
            Ok(change) if change.mutated() => self.mutated_discrete(now),
            Ok(_) => Effect::None,
            Err(e) => {
                tracing::warn!(error = %e, "tank count rejected");
                Effect::None
            }
        }
    }

    /// A structural mutation: bump the generation, revalidate, save now.
    fn mutated_discrete(&mut self, now: Instant) -> Effect {
        self.edit_generation += 1;
        self.revalidate();
        let action = self.scheduler.record_input_at(InputClass::Discrete, now);
        self.action_to_effect(action)
    }

    fn remote_loaded(&mut self, snapshot: FormSnapshot, generation: u64) {
        if generation != self.edit_generation {
            tracing::info!(
                issued = generation,
                current = self.edit_generation,
                "remote snapshot stale, discarding"
            );
            return;
        }
        if snapshot.is_empty() {
            return;
        }
        self.form.apply_snapshot(&mut self.registry, &snapshot);
        self.revalidate();
    }

    fn simulation_requested(&mut self) -> Effect {
        let bounds = self.form.inventory_bounds();
        if bounds.blocks_submission() {
            let message = match &self.verdict {
                Verdict::Error { message } => message.clone(),
                _ => "inventory range is invalid".to_string(),
            };
            return Effect::Blocked(message);
        }
        Effect::Simulate(self.capture())
    }

    /// Exports draw on the session's last run; without one there is nothing
    /// to build a workbook from.
    fn export_requested(&self, kind: ExportKind) -> Effect {
        match self.session.last_outcome() {
            Some(outcome) => Effect::Export {
                kind,
                outcome: outcome.clone(),
            },
            None => Effect::Blocked("run a simulation before exporting".to_string()),
        }
    }

    fn action_to_effect(&self, action: SaveAction) -> Effect {
        match action {
            SaveAction::SaveNow(trigger) => Effect::Save {
                trigger,
                snapshot: self.capture(),
            },
            SaveAction::None => Effect::None,
        }
    }

    fn revalidate(&mut self) {
        self.verdict = validate(self.form.inventory_bounds(), self.registry.tanks());
    }

    /// Capture the whole form and tank set right now.
    #[must_use]
    pub fn capture(&self) -> FormSnapshot {
        self.form.capture(&self.registry)
    }

    #[must_use]
    pub fn form(&self) -> &FormState {
        &self.form
    }

    #[must_use]
    pub fn registry(&self) -> &TankRegistry {
        &self.registry
    }

    /// Current validity judgment; always reflects the latest mutation.
    #[must_use]
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    #[must_use]
    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    /// Monotonic counter of operator edits, used to fence stale loads.
    #[must_use]
    pub fn edit_generation(&self) -> u64 {
        self.edit_generation
    }
}

impl Default for ClientModel {
    fn default() -> Self {
        Self::new(AutoSaveConfig::default())
    }
}
