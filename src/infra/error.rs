use std::io;

use thiserror::Error;

use crate::infra::Position;

/// Broken conversation with the environment. Always fatal for the run.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("i/o failure talking to the environment")]
    Io(#[from] io::Error),
    #[error("input ended while reading {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("malformed {expected}: {line:?}")]
    Malformed { expected: &'static str, line: String },
    #[error("unknown item symbol {0:?}")]
    UnknownItem(String),
    #[error("move to {0} leaves the board")]
    OutOfBounds(Position),
    #[error("move to {0} stepped onto a danger")]
    Lethal(Position),
}

/// Failures of the search engine itself.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("refusing to move onto {0}: known dangerous or off the board")]
    UnsafeMove(Position),
    #[error("move from {from} to {to} is not a single step")]
    NotAdjacent { from: Position, to: Position },
    #[error("no known path from the origin to {0}")]
    MissingPath(Position),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}
