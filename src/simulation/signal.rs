//! Signal controller gating which entry roads may dispatch
//!
//! The controller only answers "is this road green right now"; it
//! never touches roads or vehicles.

use super::types::EntryRoadId;

/// A set of entry roads that are green together
#[derive(Debug, Clone)]
pub struct Phase {
    pub open: Vec<EntryRoadId>,
}

/// Rotates the phase partition at a fixed cadence
#[derive(Debug, Clone)]
pub struct SignalController {
    phase_duration_s: u64,
    phases: Vec<Phase>,
    current: usize,
}

impl SignalController {
    /// The phase partition must be non-empty; init validation rejects
    /// an empty one before this is constructed.
    pub fn new(phase_duration_s: u64, phases: Vec<Phase>) -> Self {
        Self {
            phase_duration_s,
            phases,
            current: 0,
        }
    }

    /// True iff `road` may dispatch during the current phase
    pub fn open(&self, road: EntryRoadId) -> bool {
        self.phases[self.current].open.contains(&road)
    }

    /// Advance to the next phase
    pub fn change(&mut self) {
        self.current = (self.current + 1) % self.phases.len();
    }

    pub fn phase_duration_s(&self) -> u64 {
        self.phase_duration_s
    }

    pub fn current_phase(&self) -> usize {
        self.current
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SignalController {
        SignalController::new(
            10,
            vec![
                Phase {
                    open: vec![EntryRoadId(0), EntryRoadId(2)],
                },
                Phase {
                    open: vec![EntryRoadId(1)],
                },
            ],
        )
    }

    #[test]
    fn open_is_phase_membership() {
        let signal = controller();
        assert!(signal.open(EntryRoadId(0)));
        assert!(signal.open(EntryRoadId(2)));
        assert!(!signal.open(EntryRoadId(1)));
    }

    #[test]
    fn change_rotates_modulo_phase_count() {
        let mut signal = controller();
        signal.change();
        assert_eq!(signal.current_phase(), 1);
        assert!(signal.open(EntryRoadId(1)));
        assert!(!signal.open(EntryRoadId(0)));

        signal.change();
        assert_eq!(signal.current_phase(), 0);
        assert!(signal.open(EntryRoadId(0)));
    }
}
