use crate::engine::{Phase, RunSummary};
use crate::infra::protocol::{Briefing, Observation};
use crate::infra::Position;
use crate::planners::{Pick, StepKind};
use crate::state::WorldKnowledge;

/// Trait for observing search events during a run
pub trait SearchObserver {
    /// Called once the briefing has been read, before the zeroth move
    fn on_start(&mut self, briefing: &Briefing, strategy: &str);

    /// Called whenever the engine changes phase
    fn on_phase_change(&mut self, from: Phase, to: Phase);

    /// Called after every real move, once its response has been recorded
    fn on_move(
        &mut self,
        pos: Position,
        kind: StepKind,
        observation: &Observation,
        knowledge: &WorldKnowledge,
    );

    /// Called when the strategy makes a decision
    fn on_pick(&mut self, _pick: &Pick) {
        // Default implementation does nothing
    }

    /// Called after the terminal record has been reported
    fn on_finished(&mut self, summary: &RunSummary);
}
