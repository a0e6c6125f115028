use super::error::EngineError;

/// Lifecycle of a single docking request.
///
/// Stages only move forward, one step at a time; `Error` is reachable from anywhere and
/// is terminal, as is `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DockingStage {
    ProteinUnset,
    ProteinReady,
    LigandPrepared,
    Docked,
    Parsed,
    Scored,
    Done,
    Error,
}

impl DockingStage {
    pub fn name(&self) -> &'static str {
        match self {
            DockingStage::ProteinUnset => "protein-unset",
            DockingStage::ProteinReady => "protein-ready",
            DockingStage::LigandPrepared => "ligand-prepared",
            DockingStage::Docked => "docked",
            DockingStage::Parsed => "parsed",
            DockingStage::Scored => "scored",
            DockingStage::Done => "done",
            DockingStage::Error => "error",
        }
    }

    fn successor(&self) -> Option<DockingStage> {
        match self {
            DockingStage::ProteinUnset => Some(DockingStage::ProteinReady),
            DockingStage::ProteinReady => Some(DockingStage::LigandPrepared),
            DockingStage::LigandPrepared => Some(DockingStage::Docked),
            DockingStage::Docked => Some(DockingStage::Parsed),
            DockingStage::Parsed => Some(DockingStage::Scored),
            DockingStage::Scored => Some(DockingStage::Done),
            DockingStage::Done | DockingStage::Error => None,
        }
    }

    pub fn can_transition_to(&self, next: DockingStage) -> bool {
        match next {
            DockingStage::Error => !self.is_terminal(),
            _ => self.successor() == Some(next),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DockingStage::Done | DockingStage::Error)
    }
}

/// Tracks the stage of one request and rejects illegal moves.
#[derive(Debug, Clone)]
pub struct StageTracker {
    current: DockingStage,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self {
            current: DockingStage::ProteinUnset,
        }
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> DockingStage {
        self.current
    }

    pub fn advance(&mut self, next: DockingStage) -> Result<(), EngineError> {
        if !self.current.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                from: self.current,
                to: next,
            });
        }
        self.current = next;
        Ok(())
    }

    /// Moves to `Error` unless the request already finished.
    pub fn fail(&mut self) {
        if !self.current.is_terminal() {
            self.current = DockingStage::Error;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_advance_one_step_at_a_time() {
        let mut tracker = StageTracker::new();
        for stage in [
            DockingStage::ProteinReady,
            DockingStage::LigandPrepared,
            DockingStage::Docked,
            DockingStage::Parsed,
            DockingStage::Scored,
            DockingStage::Done,
        ] {
            tracker.advance(stage).unwrap();
        }
        assert_eq!(tracker.current(), DockingStage::Done);
    }

    #[test]
    fn skipping_or_going_back_is_rejected() {
        let mut tracker = StageTracker::new();
        assert!(matches!(
            tracker.advance(DockingStage::Docked),
            Err(EngineError::InvalidTransition {
                from: DockingStage::ProteinUnset,
                to: DockingStage::Docked
            })
        ));
        tracker.advance(DockingStage::ProteinReady).unwrap();
        assert!(tracker.advance(DockingStage::ProteinUnset).is_err());
        assert!(tracker.advance(DockingStage::ProteinReady).is_err());
    }

    #[test]
    fn error_is_reachable_until_the_request_finishes() {
        let mut tracker = StageTracker::new();
        tracker.advance(DockingStage::ProteinReady).unwrap();
        tracker.advance(DockingStage::Error).unwrap();
        assert!(tracker.advance(DockingStage::LigandPrepared).is_err());
        assert!(!DockingStage::Done.can_transition_to(DockingStage::Error));

        let mut finished = StageTracker {
            current: DockingStage::Done,
        };
        finished.fail();
        assert_eq!(finished.current(), DockingStage::Done);
    }
}
