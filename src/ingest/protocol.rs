//! Wire format of the ingestion socket.
//!
//! Newline-framed, Latin-1 text records with pipe-delimited fields; field 0
//! is the opcode.
//!
//! ```text
//! V|<id>|<side>|<name>    vertex      side ∈ {L, R}
//! E|<left>|<right>        edge
//! P|<left>|<right>        probe (acknowledged, no graph effect)
//! D                       done
//! ```
//!
//! Server-side records: `A` on accept, an echo of every applied command, and
//! `D` when the session ends.

use std::fmt;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unrecognized line: {0:?}")]
    UnknownCommand(String),

    #[error("'{opcode}' expects {expected} fields, got {got}: {line:?}")]
    FieldCount { opcode: char, expected: usize, got: usize, line: String },

    #[error("invalid side {0:?} (expected L or R)")]
    InvalidSide(String),

    #[error("unknown vertex id {0:?}")]
    UnknownVertex(String),

    #[error("vertex id {0:?} is already in use")]
    DuplicateVertex(String),

    #[error("vertex name {0:?} is already in use")]
    DuplicateName(String),

    #[error("vertex {id:?} needs root {root:?}, which was never declared")]
    MissingRoot { id: String, root: &'static str },
}

// ============================================================================
// Commands
// ============================================================================

/// Which half of the picture a vertex belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Protocol id of this side's root anchor.
    pub fn root_id(self) -> &'static str {
        match self {
            Side::Left => "0",
            Side::Right => "1",
        }
    }
}

impl std::str::FromStr for Side {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(Side::Left),
            "R" => Ok(Side::Right),
            other => Err(ProtocolError::InvalidSide(other.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "L",
            Side::Right => "R",
        })
    }
}

/// One parsed client line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Vertex { id: String, side: Side, name: String },
    Edge { left: String, right: String },
    Probe { left: String, right: String },
    Done,
}

impl Command {
    /// Parse one line (without its `\n`).
    pub fn parse(line: &str) -> Result<Command, ProtocolError> {
        let fields: Vec<&str> = line.split('|').collect();
        let arity = |opcode: char, expected: usize| {
            if fields.len() == expected {
                Ok(())
            } else {
                Err(ProtocolError::FieldCount { opcode, expected, got: fields.len(), line: line.to_string() })
            }
        };

        match fields[0] {
            "V" => {
                arity('V', 4)?;
                Ok(Command::Vertex {
                    id: fields[1].to_string(),
                    side: fields[2].parse()?,
                    name: fields[3].to_string(),
                })
            }
            "E" => {
                arity('E', 3)?;
                Ok(Command::Edge { left: fields[1].to_string(), right: fields[2].to_string() })
            }
            "P" => {
                arity('P', 3)?;
                Ok(Command::Probe { left: fields[1].to_string(), right: fields[2].to_string() })
            }
            "D" => {
                arity('D', 1)?;
                Ok(Command::Done)
            }
            _ => Err(ProtocolError::UnknownCommand(line.to_string())),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// A server-side status record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A client connection was accepted and the graph reset.
    Accepted,
    Vertex { id: String, side: Side, name: String },
    Edge { left: String, right: String },
    Probe { left: String, right: String },
    /// The session ended.
    Done,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Accepted => f.write_str("A"),
            Record::Vertex { id, side, name } => write!(f, "V|{id}|{side}|{name}"),
            Record::Edge { left, right } => write!(f, "E|{left}|{right}"),
            Record::Probe { left, right } => write!(f, "P|{left}|{right}"),
            Record::Done => f.write_str("D"),
        }
    }
}

// ============================================================================
// Framing
// ============================================================================

/// Accumulates raw bytes and yields complete lines. A trailing partial line
/// is kept and prefixed to the next chunk.
#[derive(Debug, Default)]
pub struct LineBuffer {
    partial: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk (decoded as Latin-1) and drain every complete line.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.partial.extend(chunk.iter().map(|&b| b as char));

        let Some(last_newline) = self.partial.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.partial.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.partial, rest);
        complete[..complete.len() - 1].split('\n').map(str::to_string).collect()
    }

    /// Bytes received after the last newline.
    pub fn pending(&self) -> &str {
        &self.partial
    }
}

// ============================================================================
// Tests
// ============================================================================
