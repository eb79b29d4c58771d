use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;

use time::{OffsetDateTime, format_description};
use tracing::{debug, warn};

use crate::infra::protocol::{Briefing, Environment, ItemKind, Observation, Outcome, Sighting};
use crate::infra::{Bounds, Position, ProtocolError};

/// Text protocol spoken over a reader/writer pair (stdin/stdout in production).
///
/// ```text
/// <- 1            perception radius
/// <- 3 4          keymaker position
/// -> m 0 0        move
/// <- 2            item count
/// <- 1 1 A        x y symbol
/// <- 0 2 P
/// -> e 7          terminal record (or "e -1")
/// ```
pub struct LineProtocol<R: BufRead, W: Write> {
    reader: R,
    writer: W,
    replay_file: Option<ReplayFile>,
}

impl<R: BufRead, W: Write> LineProtocol<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            replay_file: None,
        }
    }

    /// Hands back the underlying reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Mirrors the whole conversation into a transcript under `folder`.
    pub fn with_replay_folder(mut self, folder: &str, label: &str) -> Self {
        match ReplayFile::new(folder, label) {
            Ok(file) => self.replay_file = Some(file),
            Err(e) => warn!("Replay transcript disabled: {}", e),
        }
        self
    }

    fn send(&mut self, line: &str) -> Result<(), ProtocolError> {
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        if let Some(ref mut replay_file) = self.replay_file {
            replay_file.append('>', line)?;
        }
        Ok(())
    }

    fn receive(&mut self, expected: &'static str) -> Result<String, ProtocolError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(ProtocolError::UnexpectedEof { expected });
        }
        let line = line.trim().to_string();
        if let Some(ref mut replay_file) = self.replay_file {
            replay_file.append('<', &line)?;
        }
        Ok(line)
    }
}

fn parse_number<T: std::str::FromStr>(
    token: Option<&str>,
    expected: &'static str,
    line: &str,
) -> Result<T, ProtocolError> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| ProtocolError::Malformed {
            expected,
            line: line.to_string(),
        })
}

fn parse_position(line: &str) -> Result<Position, ProtocolError> {
    let mut tokens = line.split_whitespace();
    let x = parse_number(tokens.next(), "position", line)?;
    let y = parse_number(tokens.next(), "position", line)?;
    if tokens.next().is_some() {
        return Err(ProtocolError::Malformed {
            expected: "position",
            line: line.to_string(),
        });
    }
    Ok(Position::new(x, y))
}

fn parse_sighting(line: &str) -> Result<Sighting, ProtocolError> {
    let mut tokens = line.split_whitespace();
    let x = parse_number(tokens.next(), "item", line)?;
    let y = parse_number(tokens.next(), "item", line)?;
    let symbol = tokens.next().ok_or_else(|| ProtocolError::Malformed {
        expected: "item",
        line: line.to_string(),
    })?;
    let item = ItemKind::from_symbol(symbol)?;
    Ok(Sighting::new(Position::new(x, y), item))
}

impl<R: BufRead, W: Write> Environment for LineProtocol<R, W> {
    fn briefing(&mut self) -> Result<Briefing, ProtocolError> {
        let line = self.receive("perception radius")?;
        let perception_radius =
            parse_number(line.split_whitespace().next(), "perception radius", &line)?;
        let line = self.receive("keymaker position")?;
        let keymaker = parse_position(&line)?;
        Ok(Briefing {
            perception_radius,
            keymaker,
        })
    }

    fn exchange(&mut self, pos: Position) -> Result<Observation, ProtocolError> {
        self.send(&format!("m {} {}", pos.x, pos.y))?;

        let line = self.receive("item count")?;
        let count: usize = parse_number(line.split_whitespace().next(), "item count", &line)?;
        let board = Bounds::keymaker_grid();
        if count > board.width() * board.height() {
            return Err(ProtocolError::Malformed {
                expected: "item count",
                line,
            });
        }
        let mut observation = Observation::with_capacity(count);
        for _ in 0..count {
            let line = self.receive("item")?;
            observation.push(parse_sighting(&line)?);
        }
        debug!("Response to move {}: {} items", pos, observation.len());
        Ok(observation)
    }

    fn report(&mut self, outcome: Outcome) -> Result<(), ProtocolError> {
        self.send(&outcome.to_string())
    }
}

struct ReplayFile {
    file: File,
}

impl ReplayFile {
    fn new(replays_folder: &str, label: &str) -> Result<Self, io::Error> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let format = format_description::parse("[year][month][day]-[hour][minute][second]")
            .map_err(io::Error::other)?;
        let date_time_str = now.format(&format).map_err(io::Error::other)?;

        let filename =
            Path::new(replays_folder).join(format!("keymaker - {} - {}.log", date_time_str, label));

        if let Some(parent) = filename.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(filename)?;
        Ok(ReplayFile { file })
    }

    fn append(&mut self, direction: char, line: &str) -> io::Result<()> {
        writeln!(self.file, "{} {}", direction, line)?;
        self.file.flush()
    }
}
