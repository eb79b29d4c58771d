use std::collections::{BTreeMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::infra::protocol::{Briefing, Environment, ItemKind, Observation, Outcome, Sighting};
use crate::infra::{Bounds, Grid, Position, ProtocolError};

const DANGERS: [ItemKind; 3] = [ItemKind::AgentSmith, ItemKind::Sentinel, ItemKind::Perception];

/// In-process board used for offline runs and tests.
///
/// Items within `perception_radius` (Chebyshev) of the agent are reported
/// after every move. Every move received is logged, as is the final report.
#[derive(Debug, Clone)]
pub struct SimulatedWorld {
    bounds: Bounds,
    perception_radius: i32,
    keymaker: Position,
    items: BTreeMap<Position, ItemKind>,
    moves: Vec<Position>,
    outcome: Option<Outcome>,
}

impl SimulatedWorld {
    pub fn new(keymaker: Position, perception_radius: i32) -> Self {
        let mut items = BTreeMap::new();
        items.insert(keymaker, ItemKind::Keymaker);
        Self {
            bounds: Bounds::keymaker_grid(),
            perception_radius,
            keymaker,
            items,
            moves: Vec::new(),
            outcome: None,
        }
    }

    /// Parses a board drawn one row per line (`y` grows downwards), using
    /// item symbols and `.` for empty cells. Exactly one `K` is required.
    pub fn from_layout(layout: &str, perception_radius: i32) -> Result<Self, ProtocolError> {
        let mut items = BTreeMap::new();
        let mut keymaker = None;
        for (y, row) in layout.lines().map(str::trim).filter(|r| !r.is_empty()).enumerate() {
            for (x, symbol) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                if symbol == '.' {
                    continue;
                }
                let item = ItemKind::from_symbol(&symbol.to_string())?;
                if item == ItemKind::Keymaker && keymaker.replace(pos).is_some() {
                    return Err(ProtocolError::Malformed {
                        expected: "layout with a single keymaker",
                        line: row.to_string(),
                    });
                }
                items.insert(pos, item);
            }
        }
        let keymaker = keymaker.ok_or_else(|| ProtocolError::Malformed {
            expected: "layout with a keymaker",
            line: layout.to_string(),
        })?;
        let mut world = Self::new(keymaker, perception_radius);
        world.items = items;
        Ok(world)
    }

    /// Generates a board from `seed`. The origin and the keymaker are never
    /// dangerous.
    pub fn random(seed: u64, perception_radius: i32, danger_density: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let bounds = Bounds::keymaker_grid();
        let keymaker = Position::new(
            rng.random_range(bounds.min_x..=bounds.max_x),
            rng.random_range(bounds.min_y..=bounds.max_y),
        );
        let mut world = Self::new(keymaker, perception_radius);
        let density = danger_density.clamp(0.0, 1.0);
        for pos in bounds.positions() {
            if pos == Position::ORIGIN || pos == keymaker {
                continue;
            }
            if rng.random_bool(density) {
                let item = DANGERS[rng.random_range(0..DANGERS.len())];
                world.items.insert(pos, item);
            }
        }
        debug!(
            "Generated board for seed {}: keymaker at {}, {} items",
            seed,
            keymaker,
            world.items.len()
        );
        world
    }

    pub fn place(&mut self, pos: Position, item: ItemKind) {
        self.items.insert(pos, item);
    }

    pub fn keymaker(&self) -> Position {
        self.keymaker
    }

    pub fn is_danger(&self, pos: &Position) -> bool {
        self.items.get(pos).is_some_and(|item| item.is_danger())
    }

    /// Every move received so far, in order.
    pub fn moves(&self) -> &[Position] {
        &self.moves
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Length of the true shortest safe route, computed with full knowledge.
    pub fn shortest_distance(&self) -> Option<u32> {
        let mut distances = Grid::new(self.bounds, None);
        let mut queue = VecDeque::new();
        distances.set(&Position::ORIGIN, Some(0u32));
        queue.push_back(Position::ORIGIN);
        while let Some(current) = queue.pop_front() {
            let Some(&Some(d)) = distances.get(&current) else {
                continue;
            };
            if current == self.keymaker {
                return Some(d);
            }
            for neighbor in self.bounds.neighbors(current) {
                if self.is_danger(&neighbor) || !matches!(distances.get(&neighbor), Some(None)) {
                    continue;
                }
                distances.set(&neighbor, Some(d + 1));
                queue.push_back(neighbor);
            }
        }
        None
    }

    fn visible_from(&self, pos: Position) -> Observation {
        let r = self.perception_radius;
        self.items
            .iter()
            .filter(|(p, _)| (p.x - pos.x).abs() <= r && (p.y - pos.y).abs() <= r)
            .map(|(p, item)| Sighting::new(*p, *item))
            .collect()
    }
}

impl Environment for SimulatedWorld {
    fn briefing(&mut self) -> Result<Briefing, ProtocolError> {
        Ok(Briefing {
            perception_radius: self.perception_radius,
            keymaker: self.keymaker,
        })
    }

    fn exchange(&mut self, pos: Position) -> Result<Observation, ProtocolError> {
        if !self.bounds.contains(&pos) {
            return Err(ProtocolError::OutOfBounds(pos));
        }
        if self.is_danger(&pos) {
            return Err(ProtocolError::Lethal(pos));
        }
        self.moves.push(pos);
        Ok(self.visible_from(pos))
    }

    fn report(&mut self, outcome: Outcome) -> Result<(), ProtocolError> {
        self.outcome = Some(outcome);
        Ok(())
    }
}
