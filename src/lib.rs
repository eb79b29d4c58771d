pub mod engine;
pub mod infra;
pub mod navigator;
pub mod planners;
pub mod state;

// Re-export commonly used types for convenience
pub use engine::{Engine, Phase, RunSummary};
pub use infra::{Config, Environment, LineProtocol, Outcome, Position, SimulatedWorld};
pub use planners::{AStarStrategy, BacktrackingStrategy, SearchStrategy, StrategyKind};
pub use state::WorldKnowledge;
