use tracing::debug;

use crate::infra::{Bounds, EngineError, Environment, Outcome, Position, SearchObserver};
use crate::navigator::plan_route;
use crate::planners::{Pick, SearchStrategy, StepKind, StrategyKind};
use crate::state::WorldKnowledge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Exploring,
    Relocating,
    Found,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: Outcome,
    pub strategy: &'static str,
    /// Every real move, zeroth move, backtracks and relocations included.
    pub moves_issued: usize,
}

/// Drives one search: strategy picks, navigator relocates, environment
/// answers, knowledge grows. Exactly one terminal record is reported.
pub struct Engine<E: Environment> {
    env: E,
    observer: Box<dyn SearchObserver>,
    bounds: Bounds,
    phase: Phase,
    position: Option<Position>,
    knowledge: Option<WorldKnowledge>,
}

impl<E: Environment> Engine<E> {
    pub fn new(env: E, observer: impl SearchObserver + 'static) -> Self {
        Self {
            env,
            observer: Box::new(observer),
            bounds: Bounds::keymaker_grid(),
            phase: Phase::Start,
            position: None,
            knowledge: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn into_environment(self) -> E {
        self.env
    }

    /// Knowledge at the end of the last run.
    pub fn knowledge(&self) -> Option<&WorldKnowledge> {
        self.knowledge.as_ref()
    }

    pub fn run(&mut self, kind: StrategyKind) -> Result<RunSummary, EngineError> {
        let (summary, _) = self.run_with(|knowledge| kind.build(knowledge))?;
        Ok(summary)
    }

    /// Runs a search with the strategy `build` creates once the briefing is
    /// known, handing the strategy back for inspection.
    pub fn run_with<S, F>(&mut self, build: F) -> Result<(RunSummary, S), EngineError>
    where
        S: SearchStrategy,
        F: FnOnce(&WorldKnowledge) -> S,
    {
        let briefing = self.env.briefing()?;
        let mut knowledge = WorldKnowledge::new(self.bounds, briefing.keymaker);
        let mut strategy = build(&knowledge);
        self.observer.on_start(&briefing, strategy.name());

        self.phase = Phase::Start;
        self.position = None;
        self.step(&mut knowledge, &mut strategy, Position::ORIGIN, StepKind::Visit)?;
        self.set_phase(Phase::Exploring);

        let outcome = loop {
            let pick = strategy.pick_next(&knowledge);
            self.observer.on_pick(&pick);
            match pick {
                Pick::Done(outcome) => break outcome,
                Pick::Visit(target) => self.travel_to(&mut knowledge, &mut strategy, target)?,
            }
        };

        self.set_phase(match outcome {
            Outcome::Found { .. } => Phase::Found,
            Outcome::Unreachable => Phase::Unreachable,
        });
        self.env.report(outcome)?;

        let summary = RunSummary {
            outcome,
            strategy: strategy.name(),
            moves_issued: knowledge.moves_issued(),
        };
        self.observer.on_finished(&summary);
        self.knowledge = Some(knowledge);
        Ok((summary, strategy))
    }

    /// Walks to `target`, relocating along known paths first when it is not
    /// a single step away.
    fn travel_to<S: SearchStrategy>(
        &mut self,
        knowledge: &mut WorldKnowledge,
        strategy: &mut S,
        target: Position,
    ) -> Result<(), EngineError> {
        if let Some(current) = self.position
            && current != target
            && !current.is_adjacent(&target)
        {
            let current_path = strategy
                .path_from_origin(current)
                .ok_or(EngineError::MissingPath(current))?;
            let target_path = strategy
                .path_from_origin(target)
                .ok_or(EngineError::MissingPath(target))?;
            let route = plan_route(&current_path, &target_path);
            debug!("Relocating {} -> {} via {} moves", current, target, route.len());

            self.set_phase(Phase::Relocating);
            for pos in route {
                self.step(knowledge, strategy, pos, StepKind::Relocation)?;
            }
            self.set_phase(Phase::Exploring);
        }

        self.step(knowledge, strategy, target, StepKind::Visit)
    }

    /// One real move: request, drain the response, update beliefs.
    fn step<S: SearchStrategy>(
        &mut self,
        knowledge: &mut WorldKnowledge,
        strategy: &mut S,
        pos: Position,
        kind: StepKind,
    ) -> Result<(), EngineError> {
        if !knowledge.is_traversable(&pos) {
            return Err(EngineError::UnsafeMove(pos));
        }
        if let Some(current) = self.position
            && !current.is_adjacent(&pos)
        {
            return Err(EngineError::NotAdjacent {
                from: current,
                to: pos,
            });
        }

        let observation = self.env.exchange(pos)?;
        self.position = Some(pos);
        knowledge.record_move(pos);
        knowledge.record_observations(&observation);
        strategy.on_observation(pos, kind, knowledge);
        self.observer.on_move(pos, kind, &observation, knowledge);
        Ok(())
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            self.observer.on_phase_change(self.phase, phase);
            self.phase = phase;
        }
    }
}
