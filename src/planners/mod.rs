//! Search strategies deciding which cell the agent visits next.
//!
//! Both strategies sit behind [`SearchStrategy`]; the engine and the
//! navigator are shared.
//!
//! | Strategy | Picks | Result |
//! |---|---|---|
//! | [`AStarStrategy`] | best frontier cell by cost + Manhattan estimate | cost of the target node |
//! | [`BacktrackingStrategy`] | depth-first walk with a backtrack stack | breadth-first propagated distance |

mod astar;
mod backtracking;

use std::fmt;
use std::str::FromStr;

pub use astar::{AStarStrategy, SearchNode};
pub use backtracking::{BacktrackingStrategy, DistanceMap};

use crate::infra::{Outcome, Position};
use crate::state::WorldKnowledge;

/// A strategy's decision for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// Walk to this cell, relocating first when it is not adjacent.
    Visit(Position),
    /// Nothing left to do.
    Done(Outcome),
}

/// Why a real move was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// The cell the strategy picked.
    Visit,
    /// Repositioning on known safe ground on the way to a pick.
    Relocation,
}

pub trait SearchStrategy {
    fn name(&self) -> &'static str;

    /// Decide what to do next given everything known so far.
    fn pick_next(&mut self, knowledge: &WorldKnowledge) -> Pick;

    /// Called after every real move once its response is recorded.
    fn on_observation(&mut self, pos: Position, kind: StepKind, knowledge: &WorldKnowledge);

    /// Known safe path from the origin to `pos`, both ends included.
    fn path_from_origin(&self, pos: Position) -> Option<Vec<Position>>;
}

impl<S: SearchStrategy + ?Sized> SearchStrategy for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn pick_next(&mut self, knowledge: &WorldKnowledge) -> Pick {
        (**self).pick_next(knowledge)
    }

    fn on_observation(&mut self, pos: Position, kind: StepKind, knowledge: &WorldKnowledge) {
        (**self).on_observation(pos, kind, knowledge)
    }

    fn path_from_origin(&self, pos: Position) -> Option<Vec<Position>> {
        (**self).path_from_origin(pos)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    AStar,
    Backtracking,
}

impl StrategyKind {
    pub fn build(&self, knowledge: &WorldKnowledge) -> Box<dyn SearchStrategy> {
        match self {
            StrategyKind::AStar => Box::new(AStarStrategy::new(knowledge.keymaker())),
            StrategyKind::Backtracking => Box::new(BacktrackingStrategy::new(
                knowledge.bounds(),
                knowledge.keymaker(),
            )),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "astar" | "a*" | "a_star" => Ok(StrategyKind::AStar),
            "backtracking" | "backtrack" => Ok(StrategyKind::Backtracking),
            other => Err(format!("unknown strategy {other}")),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::AStar => write!(f, "astar"),
            StrategyKind::Backtracking => write!(f, "backtracking"),
        }
    }
}
