mod config;
mod default_observer;
mod error;
mod game_observer;
mod line_protocol;
pub mod protocol;
mod simulated;
mod types;

pub use config::Config;
pub use default_observer::DefaultObserver;
pub use error::{ConfigError, EngineError, ProtocolError};
pub use game_observer::SearchObserver;
pub use line_protocol::LineProtocol;
pub use protocol::{Briefing, Environment, ItemKind, Observation, Outcome, Sighting};
pub use simulated::SimulatedWorld;
pub use types::{BOARD_MAX, Bounds, Grid, Position};
