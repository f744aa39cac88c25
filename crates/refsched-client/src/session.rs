//! Session-scoped result holder.
//!
//! Exports and report views need the outcome of the most recent simulation
//! run. [`SessionContext`] holds it explicitly and hands out references, so
//! the current result is owned state rather than something ambient.

use crate::api::SimulationOutcome;

/// Holds the last completed simulation run for the session.
#[derive(Debug, Default)]
pub struct SessionContext {
    last_outcome: Option<SimulationOutcome>,
    runs_completed: u64,
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed run, replacing the previous one.
    pub fn record_outcome(&mut self, outcome: SimulationOutcome) {
        self.runs_completed += 1;
        tracing::debug!(run = self.runs_completed, "simulation outcome recorded");
        self.last_outcome = Some(outcome);
    }

    /// The most recent completed run, if any.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&SimulationOutcome> {
        self.last_outcome.as_ref()
    }

    /// Whether an export has a run to draw from.
    #[must_use]
    pub fn has_outcome(&self) -> bool {
        self.last_outcome.is_some()
    }

    /// Completed runs this session.
    #[must_use]
    pub fn runs_completed(&self) -> u64 {
        self.runs_completed
    }

    /// Drop the stored run (e.g. after parameters changed enough that
    /// exporting it would mislead).
    pub fn clear(&mut self) {
        self.last_outcome = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SimulationMetrics;

    fn outcome(total_cargoes: u32) -> SimulationOutcome {
        SimulationOutcome {
            metrics: SimulationMetrics {
                total_cargoes,
                ..SimulationMetrics::default()
            },
            ..SimulationOutcome::default()
        }
    }

    #[test]
    fn starts_without_an_outcome() {
        let session = SessionContext::new();
        assert!(!session.has_outcome());
        assert_eq!(session.runs_completed(), 0);
    }

    #[test]
    fn record_replaces_the_previous_run() {
        let mut session = SessionContext::new();
        session.record_outcome(outcome(2));
        session.record_outcome(outcome(5));
        assert_eq!(session.last_outcome().unwrap().metrics.total_cargoes, 5);
        assert_eq!(session.runs_completed(), 2);
    }

    #[test]
    fn clear_drops_the_outcome_but_keeps_the_count() {
        let mut session = SessionContext::new();
        session.record_outcome(outcome(1));
        session.clear();
        assert!(!session.has_outcome());
        assert_eq!(session.runs_completed(), 1);
    }
}
