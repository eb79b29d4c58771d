use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::infra::{Bounds, Grid, Outcome, Position};
use crate::planners::{Pick, SearchStrategy, StepKind};
use crate::state::WorldKnowledge;

/// Hop distances from the origin over a fully mapped board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMap {
    distances: Grid<Option<u32>>,
}

impl DistanceMap {
    /// Breadth-first relaxation from `origin` over the cells `is_open`
    /// accepts. Each cell is queued at most once and its distance is fixed
    /// when it leaves the queue, as one more than its best finalized
    /// neighbor.
    pub fn propagate<F>(bounds: Bounds, origin: Position, is_open: F) -> Self
    where
        F: Fn(&Position) -> bool,
    {
        let mut distances = Grid::new(bounds, None);
        let mut queued = Grid::new(bounds, false);
        let mut queue = VecDeque::new();

        if !distances.set(&origin, Some(0)) {
            return Self { distances };
        }
        queued.set(&origin, true);
        enqueue_neighbors(bounds, origin, &is_open, &mut queued, &mut queue);

        while let Some(pos) = queue.pop_front() {
            let best = bounds
                .neighbors(pos)
                .filter_map(|n| distances.get(&n).copied().flatten())
                .min();
            let Some(best) = best else {
                continue;
            };
            distances.set(&pos, Some(best + 1));
            enqueue_neighbors(bounds, pos, &is_open, &mut queued, &mut queue);
        }

        Self { distances }
    }

    pub fn distance(&self, pos: &Position) -> Option<u32> {
        self.distances.get(pos).copied().flatten()
    }
}

fn enqueue_neighbors<F>(
    bounds: Bounds,
    pos: Position,
    is_open: &F,
    queued: &mut Grid<bool>,
    queue: &mut VecDeque<Position>,
) where
    F: Fn(&Position) -> bool,
{
    for neighbor in bounds.neighbors(pos) {
        if queued.get(&neighbor) == Some(&false) && is_open(&neighbor) {
            queued.set(&neighbor, true);
            queue.push_back(neighbor);
        }
    }
}

/// Maps every safe cell reachable from the origin with a depth-first walk,
/// then reads the keymaker's distance off a propagated [`DistanceMap`].
///
/// The walk stack always equals the real moves from the origin to where the
/// agent stands: forward steps push, backtrack steps pop. The keymaker cell
/// itself is never stepped on; it is known safe from the briefing.
pub struct BacktrackingStrategy {
    bounds: Bounds,
    target: Position,
    visited: Grid<bool>,
    stack: Vec<Position>,
    distances: Option<DistanceMap>,
}

impl BacktrackingStrategy {
    pub fn new(bounds: Bounds, target: Position) -> Self {
        Self {
            bounds,
            target,
            visited: Grid::new(bounds, false),
            stack: Vec::new(),
            distances: None,
        }
    }

    pub fn walk_stack(&self) -> &[Position] {
        &self.stack
    }

    pub fn distances(&self) -> Option<&DistanceMap> {
        self.distances.as_ref()
    }

    pub fn is_visited(&self, pos: &Position) -> bool {
        self.visited.get(pos).copied().unwrap_or(false)
    }

    fn next_unvisited(&self, pos: Position, knowledge: &WorldKnowledge) -> Option<Position> {
        self.bounds.neighbors(pos).find(|n| {
            *n != self.target && !self.is_visited(n) && knowledge.is_traversable(n)
        })
    }

    fn finish(&mut self, knowledge: &WorldKnowledge) -> Outcome {
        let origin = self.stack.first().copied().unwrap_or(Position::ORIGIN);
        let map = DistanceMap::propagate(self.bounds, origin, |pos| {
            self.is_visited(pos) || (*pos == self.target && knowledge.is_traversable(pos))
        });
        let outcome = match map.distance(&self.target) {
            Some(moves) => Outcome::Found { moves },
            None => Outcome::Unreachable,
        };
        debug!(
            "Mapping complete: {} cells visited, outcome {:?}",
            self.visited.iter().filter(|(_, v)| **v).count(),
            outcome
        );
        self.distances = Some(map);
        outcome
    }
}

impl SearchStrategy for BacktrackingStrategy {
    fn name(&self) -> &'static str {
        "backtracking"
    }

    fn pick_next(&mut self, knowledge: &WorldKnowledge) -> Pick {
        if let Some(map) = &self.distances {
            return Pick::Done(match map.distance(&self.target) {
                Some(moves) => Outcome::Found { moves },
                None => Outcome::Unreachable,
            });
        }

        if self.is_visited(&self.target) {
            // Only possible when the keymaker sits on the origin.
            return Pick::Done(self.finish(knowledge));
        }

        let Some(&top) = self.stack.last() else {
            warn!("Asked for a pick before the zeroth move");
            return Pick::Done(Outcome::Unreachable);
        };

        if let Some(next) = self.next_unvisited(top, knowledge) {
            return Pick::Visit(next);
        }

        if self.stack.len() > 1 {
            let back = self.stack[self.stack.len() - 2];
            debug!("Dead end at {}, backtracking to {}", top, back);
            return Pick::Visit(back);
        }

        Pick::Done(self.finish(knowledge))
    }

    fn on_observation(&mut self, pos: Position, _kind: StepKind, _knowledge: &WorldKnowledge) {
        let len = self.stack.len();
        if len >= 2 && self.stack[len - 2] == pos {
            self.stack.pop();
        } else if self.stack.last() != Some(&pos) {
            self.stack.push(pos);
            self.visited.set(&pos, true);
        }
    }

    fn path_from_origin(&self, pos: Position) -> Option<Vec<Position>> {
        self.stack
            .iter()
            .position(|p| *p == pos)
            .map(|i| self.stack[..=i].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{ItemKind, Sighting};

    /// Drives the walk without an engine, returning every move issued.
    fn walk(
        strategy: &mut BacktrackingStrategy,
        knowledge: &mut WorldKnowledge,
    ) -> (Vec<Position>, Outcome) {
        let mut moves = vec![Position::ORIGIN];
        knowledge.record_move(Position::ORIGIN);
        strategy.on_observation(Position::ORIGIN, StepKind::Visit, knowledge);
        loop {
            match strategy.pick_next(knowledge) {
                Pick::Visit(pos) => {
                    let here = *moves.last().unwrap();
                    assert!(here.is_adjacent(&pos), "{} -> {} is not a step", here, pos);
                    assert!(!knowledge.is_dangerous(&pos));
                    moves.push(pos);
                    knowledge.record_move(pos);
                    strategy.on_observation(pos, StepKind::Visit, knowledge);
                }
                Pick::Done(outcome) => return (moves, outcome),
            }
        }
    }

    fn walled(target: Position, dangers: &[Position]) -> (BacktrackingStrategy, WorldKnowledge) {
        let bounds = Bounds::keymaker_grid();
        let mut knowledge = WorldKnowledge::new(bounds, target);
        let sightings: Vec<Sighting> = dangers
            .iter()
            .map(|p| Sighting::new(*p, ItemKind::AgentSmith))
            .collect();
        knowledge.record_observations(&sightings);
        (BacktrackingStrategy::new(bounds, target), knowledge)
    }

    #[test]
    fn test_propagation_over_open_board() {
        let map = DistanceMap::propagate(Bounds::keymaker_grid(), Position::ORIGIN, |_| true);
        for pos in Bounds::keymaker_grid().positions() {
            assert_eq!(map.distance(&pos), Some((pos.x + pos.y) as u32));
        }
    }

    #[test]
    fn test_propagation_skips_closed_cells() {
        let wall: Vec<Position> = (0..8).map(|y| Position::new(1, y)).collect();
        let map = DistanceMap::propagate(Bounds::keymaker_grid(), Position::ORIGIN, |p| {
            !wall.contains(p)
        });
        assert_eq!(map.distance(&Position::new(1, 3)), None);
        assert_eq!(map.distance(&Position::new(0, 8)), Some(8));
        assert_eq!(map.distance(&Position::new(2, 0)), Some(18));
    }

    #[test]
    fn test_maps_whole_board_and_returns_home() {
        let target = Position::new(3, 4);
        let (mut strategy, mut knowledge) = walled(target, &[]);
        let (moves, outcome) = walk(&mut strategy, &mut knowledge);

        assert_eq!(outcome, Outcome::Found { moves: 7 });
        assert_eq!(strategy.walk_stack(), &[Position::ORIGIN]);
        assert_eq!(moves.last(), Some(&Position::ORIGIN));
        for pos in Bounds::keymaker_grid().positions() {
            assert_eq!(strategy.is_visited(&pos), pos != target, "{}", pos);
        }
        assert!(!moves.contains(&target));
    }

    #[test]
    fn test_walk_stack_replays_moves() {
        let dangers = [
            Position::new(1, 1),
            Position::new(2, 1),
            Position::new(3, 3),
            Position::new(0, 4),
            Position::new(5, 0),
        ];
        let (mut strategy, mut knowledge) = walled(Position::new(7, 7), &dangers);
        let (moves, _) = walk(&mut strategy, &mut knowledge);

        // Replaying from an empty stack: returning to the entry below the top
        // pops, anything else pushes. The stack top always matches the move.
        let mut replay: Vec<Position> = Vec::new();
        for pos in &moves {
            let len = replay.len();
            if len >= 2 && replay[len - 2] == *pos {
                replay.pop();
            } else {
                replay.push(*pos);
            }
            assert_eq!(replay.last(), Some(pos));
        }
        assert_eq!(replay, strategy.walk_stack());
        assert_eq!(knowledge.trail(), moves.as_slice());
    }

    #[test]
    fn test_walled_off_target_is_unreachable() {
        let target = Position::new(6, 6);
        let dangers: Vec<Position> = target.neighbors().to_vec();
        let (mut strategy, mut knowledge) = walled(target, &dangers);
        let (moves, outcome) = walk(&mut strategy, &mut knowledge);

        assert_eq!(outcome, Outcome::Unreachable);
        assert!(moves.iter().all(|p| !dangers.contains(p)));
        let map = strategy.distances().unwrap();
        assert_eq!(map.distance(&target), None);
        assert_eq!(map.distance(&Position::new(8, 8)), Some(16));
    }

    #[test]
    fn test_detour_distance() {
        // Column 1 blocked except at the bottom row.
        let dangers: Vec<Position> = (0..8).map(|y| Position::new(1, y)).collect();
        let (mut strategy, mut knowledge) = walled(Position::new(2, 0), &dangers);
        let (_, outcome) = walk(&mut strategy, &mut knowledge);
        assert_eq!(outcome, Outcome::Found { moves: 18 });
        assert_eq!(
            strategy.path_from_origin(Position::ORIGIN),
            Some(vec![Position::ORIGIN])
        );
    }
}
