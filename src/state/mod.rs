mod world_knowledge;

pub use world_knowledge::{CellKnowledge, SafeKind, WorldKnowledge};
