use tracing::warn;

use crate::infra::{Bounds, Grid, ItemKind, Position, Sighting};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeKind {
    Clear,
    Keymaker,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellKnowledge {
    #[default]
    Unknown,
    Safe(SafeKind),
    Dangerous,
}

/// What the agent believes about the board, plus the trail it actually walked.
///
/// Knowledge only grows: a cell that is `Dangerous` or `Safe` never goes back
/// to another state. A safe cell may still gain an annotation (a plain cell
/// later seen holding the keymaker).
#[derive(Debug, Clone, PartialEq)]
pub struct WorldKnowledge {
    bounds: Bounds,
    keymaker: Position,
    cells: Grid<CellKnowledge>,
    keymaker_sighting: Option<Position>,
    trail: Vec<Position>,
}

impl WorldKnowledge {
    pub fn new(bounds: Bounds, keymaker: Position) -> Self {
        Self {
            bounds,
            keymaker,
            cells: Grid::new(bounds, CellKnowledge::Unknown),
            keymaker_sighting: None,
            trail: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Goal position from the briefing.
    pub fn keymaker(&self) -> Position {
        self.keymaker
    }

    /// Where the keymaker was actually seen, if it has been.
    pub fn keymaker_sighting(&self) -> Option<Position> {
        self.keymaker_sighting
    }

    pub fn knowledge(&self, pos: &Position) -> CellKnowledge {
        self.cells.get(pos).copied().unwrap_or_default()
    }

    pub fn is_safe(&self, pos: &Position) -> bool {
        matches!(self.knowledge(pos), CellKnowledge::Safe(_))
    }

    pub fn is_dangerous(&self, pos: &Position) -> bool {
        self.knowledge(pos) == CellKnowledge::Dangerous
    }

    pub fn is_traversable(&self, pos: &Position) -> bool {
        self.bounds.contains(pos) && !self.is_dangerous(pos)
    }

    /// Every real move issued so far, zeroth move included.
    pub fn trail(&self) -> &[Position] {
        &self.trail
    }

    pub fn moves_issued(&self) -> usize {
        self.trail.len()
    }

    pub fn record_observations(&mut self, sightings: &[Sighting]) {
        for sighting in sightings {
            if !self.bounds.contains(&sighting.pos) {
                warn!("Ignoring {:?} reported off the board at {}", sighting.item, sighting.pos);
                continue;
            }
            let knowledge = match sighting.item {
                item if item.is_danger() => CellKnowledge::Dangerous,
                ItemKind::Keymaker => {
                    if sighting.pos != self.keymaker {
                        warn!(
                            "Keymaker seen at {} but briefed at {}",
                            sighting.pos, self.keymaker
                        );
                    }
                    self.keymaker_sighting = Some(sighting.pos);
                    CellKnowledge::Safe(SafeKind::Keymaker)
                }
                _ => CellKnowledge::Safe(SafeKind::Neutral),
            };
            self.mark(sighting.pos, knowledge);
        }
    }

    /// Records a real move: the agent stands on `pos`, so it is safe.
    pub fn record_move(&mut self, pos: Position) {
        self.trail.push(pos);
        self.mark(pos, CellKnowledge::Safe(SafeKind::Clear));
    }

    fn mark(&mut self, pos: Position, new: CellKnowledge) {
        let Some(cell) = self.cells.get_mut(&pos) else {
            return;
        };
        let merged = match (*cell, new) {
            (CellKnowledge::Unknown, _) => new,
            (CellKnowledge::Safe(SafeKind::Clear), CellKnowledge::Safe(kind)) => {
                CellKnowledge::Safe(kind)
            }
            (CellKnowledge::Safe(SafeKind::Neutral), CellKnowledge::Safe(SafeKind::Keymaker)) => {
                CellKnowledge::Safe(SafeKind::Keymaker)
            }
            (CellKnowledge::Safe(_), CellKnowledge::Dangerous)
            | (CellKnowledge::Dangerous, CellKnowledge::Safe(_)) => {
                warn!("Conflicting knowledge at {}: {:?} vs {:?}", pos, *cell, new);
                *cell
            }
            (current, _) => current,
        };
        *cell = merged;
    }
}
