//! Vocabulary shared by every environment the agent can talk to.

use std::fmt;

use crate::infra::{Position, ProtocolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    AgentSmith,
    Sentinel,
    Perception,
    Keymaker,
    BackdoorKey,
    Neo,
}

impl ItemKind {
    pub fn from_symbol(symbol: &str) -> Result<Self, ProtocolError> {
        match symbol {
            "A" => Ok(ItemKind::AgentSmith),
            "S" => Ok(ItemKind::Sentinel),
            "P" => Ok(ItemKind::Perception),
            "K" => Ok(ItemKind::Keymaker),
            "B" => Ok(ItemKind::BackdoorKey),
            "N" => Ok(ItemKind::Neo),
            other => Err(ProtocolError::UnknownItem(other.to_string())),
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            ItemKind::AgentSmith => 'A',
            ItemKind::Sentinel => 'S',
            ItemKind::Perception => 'P',
            ItemKind::Keymaker => 'K',
            ItemKind::BackdoorKey => 'B',
            ItemKind::Neo => 'N',
        }
    }

    /// Lethal items block their cell for the rest of the run.
    pub fn is_danger(&self) -> bool {
        matches!(
            self,
            ItemKind::AgentSmith | ItemKind::Sentinel | ItemKind::Perception
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sighting {
    pub pos: Position,
    pub item: ItemKind,
}

impl Sighting {
    pub fn new(pos: Position, item: ItemKind) -> Self {
        Self { pos, item }
    }
}

/// Everything a single move response revealed.
pub type Observation = Vec<Sighting>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Briefing {
    pub perception_radius: i32,
    pub keymaker: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Found { moves: u32 },
    Unreachable,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Found { moves } => write!(f, "e {}", moves),
            Outcome::Unreachable => write!(f, "e -1"),
        }
    }
}

/// The world the agent moves through.
///
/// Every call is a full round trip: `exchange` does not return until the
/// response to the move has been completely consumed, so there is never
/// more than one outstanding move.
pub trait Environment {
    /// Initial configuration, read once before the first move.
    fn briefing(&mut self) -> Result<Briefing, ProtocolError>;

    /// Moves the agent to `pos` and returns what became visible there.
    fn exchange(&mut self, pos: Position) -> Result<Observation, ProtocolError>;

    /// Emits the terminal record. Called exactly once per run.
    fn report(&mut self, outcome: Outcome) -> Result<(), ProtocolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_symbols() {
        for symbol in ["A", "S", "P", "K", "B", "N"] {
            let item = ItemKind::from_symbol(symbol).unwrap();
            assert_eq!(item.symbol().to_string(), symbol);
        }
        assert!(matches!(
            ItemKind::from_symbol("X"),
            Err(ProtocolError::UnknownItem(s)) if s == "X"
        ));
    }

    #[test]
    fn test_danger_classification() {
        assert!(ItemKind::AgentSmith.is_danger());
        assert!(ItemKind::Sentinel.is_danger());
        assert!(ItemKind::Perception.is_danger());
        assert!(!ItemKind::Keymaker.is_danger());
        assert!(!ItemKind::BackdoorKey.is_danger());
        assert!(!ItemKind::Neo.is_danger());
    }

    #[test]
    fn test_outcome_record() {
        assert_eq!(Outcome::Found { moves: 7 }.to_string(), "e 7");
        assert_eq!(Outcome::Unreachable.to_string(), "e -1");
    }
}
