//! Load errors.

use hexflow_core::{NodeKindTag, TransportError, TransportId};
use hexflow_spatial::GridError;
use std::fmt;

/// What was wrong with a save file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatErrorKind {
    #[error("expected {expected}, but the file ended")]
    UnexpectedEof { expected: &'static str },

    #[error("{field} must be an integer, got '{text}'")]
    InvalidInteger { field: &'static str, text: String },

    #[error("grid range must be positive, got {0}")]
    InvalidRange(i64),

    #[error("{field} must not be negative, got {value}")]
    NegativeCount { field: &'static str, value: i64 },

    #[error("expected a divider line starting with '_____', got '{found}'")]
    MissingDivider { found: String },

    #[error("item names must not be empty")]
    EmptyItemName,

    /// The name list and the placed nodes of one kind differ in length.
    /// Surplus names are rejected as well as missing ones, so a file never
    /// carries keys that no node uses.
    #[error("{declared} {kind} item names given but the grid places {placed}")]
    KeyCountMismatch {
        kind: NodeKindTag,
        declared: usize,
        placed: usize,
    },

    #[error("unknown cell token '{0}'")]
    UnknownToken(String),

    #[error("grid row {row} must hold {expected} cells, found {found}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("malformed wiring line '{0}'")]
    MalformedWiring(String),

    #[error("wiring line '{0}' names neither an input nor an output")]
    EmptyWiring(String),

    #[error("node {id} is a {kind} and cannot take belt-style wiring")]
    ContainerWiredAsBelt { id: TransportId, kind: NodeKindTag },

    #[error("wiring refers to unknown node {0}")]
    UnknownId(TransportId),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("invalid link: {0}")]
    Link(#[from] TransportError),
}

/// A format fault, with the 1-based line it was found on. `line` is `None`
/// when the fault concerns the file as a whole or its end.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} ({})", Location(.line))]
pub struct FormatError {
    pub line: Option<usize>,
    pub kind: FormatErrorKind,
}

impl FormatError {
    pub fn at(line: usize, kind: FormatErrorKind) -> Self {
        Self {
            line: Some(line),
            kind,
        }
    }

    pub fn eof(expected: &'static str) -> Self {
        Self {
            line: None,
            kind: FormatErrorKind::UnexpectedEof { expected },
        }
    }
}

struct Location<'a>(&'a Option<usize>);

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.0 {
            Some(line) => write!(f, "line: {line}"),
            None => f.write_str("end of input"),
        }
    }
}

/// Errors from [`load`](crate::load) and friends.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("bad save file: {0}")]
    Format(#[from] FormatError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// The format fault, if this is one.
    pub fn as_format(&self) -> Option<&FormatError> {
        match self {
            LoadError::Format(e) => Some(e),
            LoadError::Io(_) => None,
        }
    }
}
