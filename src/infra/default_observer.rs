use tracing::{debug, info, trace};

use crate::engine::{Phase, RunSummary};
use crate::infra::game_observer::SearchObserver;
use crate::infra::protocol::{Briefing, Observation, Outcome};
use crate::infra::Position;
use crate::planners::{Pick, StepKind};
use crate::state::WorldKnowledge;

/// Logs the run through `tracing`.
#[derive(Debug, Default)]
pub struct DefaultObserver;

impl SearchObserver for DefaultObserver {
    fn on_start(&mut self, briefing: &Briefing, strategy: &str) {
        info!("Search started with strategy {}", strategy);
        info!("- keymaker at {}", briefing.keymaker);
        info!("- perception radius: {}", briefing.perception_radius);
    }

    fn on_phase_change(&mut self, from: Phase, to: Phase) {
        debug!("Phase {:?} -> {:?}", from, to);
    }

    fn on_move(
        &mut self,
        pos: Position,
        kind: StepKind,
        observation: &Observation,
        knowledge: &WorldKnowledge,
    ) {
        debug!(
            "move #{}: {} ({:?}), {} items in sight",
            knowledge.moves_issued(),
            pos,
            kind,
            observation.len()
        );
        for sighting in observation {
            trace!("  {} at {}", sighting.item.symbol(), sighting.pos);
        }
    }

    fn on_pick(&mut self, pick: &Pick) {
        debug!("Pick: {:?}", pick);
    }

    fn on_finished(&mut self, summary: &RunSummary) {
        match summary.outcome {
            Outcome::Found { moves } => info!("Keymaker reached, shortest route {} moves", moves),
            Outcome::Unreachable => info!("Keymaker unreachable"),
        }
        info!(
            "Strategy {} issued {} real moves",
            summary.strategy, summary.moves_issued
        );
    }
}
