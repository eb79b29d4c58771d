use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::infra::{Outcome, Position};
use crate::planners::{Pick, SearchStrategy, StepKind};
use crate::state::WorldKnowledge;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchNode {
    pub pos: Position,
    /// Real moves from the origin along `path`.
    pub cost: u32,
    /// Manhattan distance to the keymaker.
    pub estimate: u32,
    /// Origin to `pos`, both included.
    pub path: Vec<Position>,
}

impl SearchNode {
    fn origin(pos: Position, target: Position) -> Self {
        Self {
            pos,
            cost: 0,
            estimate: heuristic(pos, target),
            path: vec![pos],
        }
    }

    fn extend(&self, next: Position, target: Position) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(next);
        Self {
            pos: next,
            cost: self.cost + 1,
            estimate: heuristic(next, target),
            path,
        }
    }

    /// Ordering key: total estimated cost first, then the estimate alone.
    pub fn priority(&self) -> (u32, u32) {
        (self.cost + self.estimate, self.estimate)
    }
}

fn heuristic(a: Position, b: Position) -> u32 {
    a.distance(&b) as u32
}

/// Online A*: the open set only holds cells next to ones the agent has
/// physically stood on, and the agent walks to every cell it expands.
pub struct AStarStrategy {
    target: Position,
    visited: BTreeMap<Position, SearchNode>,
    frontier: BTreeMap<Position, SearchNode>,
}

impl AStarStrategy {
    pub fn new(target: Position) -> Self {
        Self {
            target,
            visited: BTreeMap::new(),
            frontier: BTreeMap::new(),
        }
    }

    pub fn visited(&self) -> &BTreeMap<Position, SearchNode> {
        &self.visited
    }

    pub fn frontier(&self) -> &BTreeMap<Position, SearchNode> {
        &self.frontier
    }

    /// Rebuilds the frontier from every visited node, keeping the cheapest
    /// way to reach each candidate.
    fn update_frontier(&mut self, knowledge: &WorldKnowledge) {
        self.frontier.clear();
        let bounds = knowledge.bounds();
        for node in self.visited.values() {
            for neighbor in bounds.neighbors(node.pos) {
                if self.visited.contains_key(&neighbor) || !knowledge.is_traversable(&neighbor) {
                    continue;
                }
                let candidate = node.extend(neighbor, self.target);
                match self.frontier.get(&neighbor) {
                    Some(existing) if existing.cost <= candidate.cost => {}
                    _ => {
                        self.frontier.insert(neighbor, candidate);
                    }
                }
            }
        }
    }
}

impl SearchStrategy for AStarStrategy {
    fn name(&self) -> &'static str {
        "astar"
    }

    fn pick_next(&mut self, _knowledge: &WorldKnowledge) -> Pick {
        if let Some(node) = self.visited.get(&self.target) {
            return Pick::Done(Outcome::Found { moves: node.cost });
        }

        let Some(best) = self.frontier.values().min_by_key(|node| node.priority()) else {
            debug!("Frontier exhausted after {} visited cells", self.visited.len());
            return Pick::Done(Outcome::Unreachable);
        };

        debug!(
            "Best frontier cell {} (cost {}, estimate {}) out of {}",
            best.pos,
            best.cost,
            best.estimate,
            self.frontier.len()
        );

        if best.pos == self.target {
            Pick::Done(Outcome::Found { moves: best.cost })
        } else {
            Pick::Visit(best.pos)
        }
    }

    fn on_observation(&mut self, pos: Position, kind: StepKind, knowledge: &WorldKnowledge) {
        if kind == StepKind::Visit && !self.visited.contains_key(&pos) {
            let node = if self.visited.is_empty() {
                Some(SearchNode::origin(pos, self.target))
            } else {
                self.frontier.remove(&pos)
            };
            match node {
                Some(node) => {
                    self.visited.insert(pos, node);
                }
                None => warn!("Visited {} without a frontier entry", pos),
            }
        }
        self.update_frontier(knowledge);
    }

    fn path_from_origin(&self, pos: Position) -> Option<Vec<Position>> {
        self.visited
            .get(&pos)
            .or_else(|| self.frontier.get(&pos))
            .map(|node| node.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{Bounds, ItemKind, Sighting};

    fn setup(target: Position) -> (AStarStrategy, WorldKnowledge) {
        let knowledge = WorldKnowledge::new(Bounds::keymaker_grid(), target);
        (AStarStrategy::new(target), knowledge)
    }

    fn visit(strategy: &mut AStarStrategy, knowledge: &mut WorldKnowledge, pos: Position) {
        knowledge.record_move(pos);
        strategy.on_observation(pos, StepKind::Visit, knowledge);
    }

    #[test]
    fn test_origin_seeds_frontier() {
        let (mut strategy, mut knowledge) = setup(Position::new(3, 4));
        visit(&mut strategy, &mut knowledge, Position::ORIGIN);

        let frontier: Vec<Position> = strategy.frontier().keys().copied().collect();
        assert_eq!(frontier, vec![Position::new(0, 1), Position::new(1, 0)]);
        assert!(strategy.frontier().values().all(|n| n.cost == 1));
        assert_eq!(strategy.visited()[&Position::ORIGIN].cost, 0);
    }

    #[test]
    fn test_ties_prefer_smaller_estimate() {
        let (mut strategy, mut knowledge) = setup(Position::new(3, 4));
        visit(&mut strategy, &mut knowledge, Position::ORIGIN);
        visit(&mut strategy, &mut knowledge, Position::new(1, 0));

        // (0,1), (1,1) and (2,0) all total 7; the last two are closer.
        let totals: Vec<u32> = strategy
            .frontier()
            .values()
            .map(|n| n.priority().0)
            .collect();
        assert_eq!(totals, vec![7, 7, 7]);
        assert_eq!(
            strategy.pick_next(&knowledge),
            Pick::Visit(Position::new(1, 1))
        );
    }

    #[test]
    fn test_dangerous_cells_never_enter_frontier() {
        let (mut strategy, mut knowledge) = setup(Position::new(3, 4));
        knowledge.record_observations(&[Sighting::new(Position::new(1, 0), ItemKind::Sentinel)]);
        visit(&mut strategy, &mut knowledge, Position::ORIGIN);
        assert!(!strategy.frontier().contains_key(&Position::new(1, 0)));
        assert_eq!(
            strategy.pick_next(&knowledge),
            Pick::Visit(Position::new(0, 1))
        );
    }

    #[test]
    fn test_frontier_keeps_cheapest_path() {
        let (mut strategy, mut knowledge) = setup(Position::new(8, 8));
        knowledge.record_observations(&[Sighting::new(Position::new(0, 1), ItemKind::AgentSmith)]);
        for pos in [
            Position::ORIGIN,
            Position::new(1, 0),
            Position::new(1, 1),
            Position::new(1, 2),
            Position::new(1, 3),
            Position::new(0, 3),
        ] {
            visit(&mut strategy, &mut knowledge, pos);
        }

        // Reachable from (0,3) at cost 6 and from (1,2) at cost 4.
        let node = &strategy.frontier()[&Position::new(0, 2)];
        assert_eq!(node.cost, 4);
        assert_eq!(
            node.path,
            vec![
                Position::ORIGIN,
                Position::new(1, 0),
                Position::new(1, 1),
                Position::new(1, 2),
                Position::new(0, 2),
            ]
        );
    }

    #[test]
    fn test_visited_costs_are_final() {
        let (mut strategy, mut knowledge) = setup(Position::new(6, 5));
        knowledge.record_observations(&[
            Sighting::new(Position::new(2, 0), ItemKind::Perception),
            Sighting::new(Position::new(2, 1), ItemKind::Perception),
            Sighting::new(Position::new(2, 2), ItemKind::Perception),
        ]);
        visit(&mut strategy, &mut knowledge, Position::ORIGIN);

        let mut seen: BTreeMap<Position, u32> = BTreeMap::new();
        loop {
            for (pos, node) in strategy.visited() {
                let cost = *seen.entry(*pos).or_insert(node.cost);
                assert_eq!(cost, node.cost, "cost of {} changed", pos);
            }
            match strategy.pick_next(&knowledge) {
                Pick::Visit(pos) => visit(&mut strategy, &mut knowledge, pos),
                Pick::Done(outcome) => {
                    assert_eq!(outcome, Outcome::Found { moves: 11 });
                    break;
                }
            }
        }
    }

    #[test]
    fn test_target_at_origin() {
        let (mut strategy, mut knowledge) = setup(Position::ORIGIN);
        visit(&mut strategy, &mut knowledge, Position::ORIGIN);
        assert_eq!(
            strategy.pick_next(&knowledge),
            Pick::Done(Outcome::Found { moves: 0 })
        );
    }

    #[test]
    fn test_empty_frontier_is_unreachable() {
        let (mut strategy, mut knowledge) = setup(Position::new(5, 5));
        knowledge.record_observations(&[
            Sighting::new(Position::new(1, 0), ItemKind::AgentSmith),
            Sighting::new(Position::new(0, 1), ItemKind::AgentSmith),
        ]);
        visit(&mut strategy, &mut knowledge, Position::ORIGIN);
        assert_eq!(strategy.pick_next(&knowledge), Pick::Done(Outcome::Unreachable));
    }
}
