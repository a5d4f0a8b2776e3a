//! Save-file loader.
//!
//! A save file is line oriented. Sections appear in this order, separated by
//! divider lines that start with `_____`:
//!
//! 1. the grid range
//! 2. the producer count, then the receiver count
//! 3. one item name per producer
//! 4. one item name per receiver
//! 5. the grid rows, in [`RowWalk`] order, cells separated by whitespace
//! 6. zero or more wiring lines (see [`crate::wiring`])
//!
//! Cell tokens are `o` (empty), `w` (wall), `p` (producer), `r` (receiver)
//! and `b` (belt). Producers, receivers and belts get ids 1, 2, 3, ... in
//! walk order; producers and receivers take the next name of their kind.

use crate::error::{FormatError, FormatErrorKind, LoadError};
use crate::wiring::{WiringContext, WiringLine};
use hexflow_core::{Item, NodeKindTag, Transport, TransportId};
use hexflow_spatial::{Cell, Coordinate, Factory, FactoryError, RowWalk};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

const DIVIDER: &str = "_____";

// ===========================================================================
// Entry points
// ===========================================================================

/// Load a factory from any buffered reader.
pub fn load<R: BufRead>(reader: R) -> Result<Factory, LoadError> {
    let mut lines = Lines::new(reader);

    let header = read_header(&mut lines)?;
    let rows = read_rows(&mut lines, header.range)?;
    check_key_counts(&header, &rows)?;
    lines.divider()?;

    let range = header.range;
    let (mut factory, mut ctx) = build(header, rows)?;

    while let Some((number, text)) = lines.next_line()? {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let wiring = WiringLine::parse(text).map_err(|k| FormatError::at(number, k))?;
        ctx.apply(factory.network_mut(), wiring)
            .map_err(|k| FormatError::at(number, k))?;
    }

    let network = factory.network();
    info!(
        range,
        cells = factory.grid().len(),
        producers = network.count_of(NodeKindTag::Producer),
        receivers = network.count_of(NodeKindTag::Receiver),
        belts = network.count_of(NodeKindTag::Belt),
        links = ctx.links(),
        "save file loaded"
    );
    Ok(factory)
}

/// Load a factory from an in-memory save file.
pub fn load_str(text: &str) -> Result<Factory, LoadError> {
    load(text.as_bytes())
}

/// Load a factory from a save file on disk.
pub fn load_path(path: impl AsRef<Path>) -> Result<Factory, LoadError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening save file");
    load(BufReader::new(File::open(path)?))
}

// ===========================================================================
// Line reader
// ===========================================================================

/// Reads lines and tracks their 1-based number.
struct Lines<R> {
    reader: R,
    number: usize,
    buf: String,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            number: 0,
            buf: String::new(),
        }
    }

    /// The next line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> Result<Option<(usize, String)>, LoadError> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.number += 1;
        let line = self.buf.trim_end_matches(['\n', '\r']).to_string();
        Ok(Some((self.number, line)))
    }

    fn expect(&mut self, what: &'static str) -> Result<(usize, String), LoadError> {
        self.next_line()?
            .ok_or_else(|| FormatError::eof(what).into())
    }

    fn divider(&mut self) -> Result<(), LoadError> {
        let (number, text) = self.expect("a divider line")?;
        if !text.starts_with(DIVIDER) {
            return Err(
                FormatError::at(number, FormatErrorKind::MissingDivider { found: text }).into(),
            );
        }
        Ok(())
    }

    fn integer(&mut self, field: &'static str) -> Result<(usize, i64), LoadError> {
        let (number, text) = self.expect(field)?;
        let value = text.trim().parse::<i64>().map_err(|_| {
            FormatError::at(
                number,
                FormatErrorKind::InvalidInteger {
                    field,
                    text: text.clone(),
                },
            )
        })?;
        Ok((number, value))
    }

    fn count(&mut self, field: &'static str) -> Result<usize, LoadError> {
        let (number, value) = self.integer(field)?;
        usize::try_from(value).map_err(|_| {
            FormatError::at(number, FormatErrorKind::NegativeCount { field, value }).into()
        })
    }

    fn item_names(
        &mut self,
        count: usize,
        what: &'static str,
    ) -> Result<VecDeque<Item>, LoadError> {
        let mut names = VecDeque::new();
        for _ in 0..count {
            let (number, text) = self.expect(what)?;
            let item = Item::new(text.trim())
                .map_err(|_| FormatError::at(number, FormatErrorKind::EmptyItemName))?;
            names.push_back(item);
        }
        Ok(names)
    }
}

// ===========================================================================
// Sections
// ===========================================================================

struct Header {
    range: i32,
    producer_keys: VecDeque<Item>,
    receiver_keys: VecDeque<Item>,
}

fn read_header<R: BufRead>(lines: &mut Lines<R>) -> Result<Header, LoadError> {
    let (number, range) = lines.integer("grid range")?;
    let range = match i32::try_from(range) {
        Ok(r) if r > 0 => r,
        _ => return Err(FormatError::at(number, FormatErrorKind::InvalidRange(range)).into()),
    };
    lines.divider()?;

    let producers = lines.count("producer count")?;
    let receivers = lines.count("receiver count")?;
    lines.divider()?;

    let producer_keys = lines.item_names(producers, "a producer item name")?;
    lines.divider()?;
    let receiver_keys = lines.item_names(receivers, "a receiver item name")?;
    lines.divider()?;

    Ok(Header {
        range,
        producer_keys,
        receiver_keys,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Empty,
    Wall,
    Node(NodeKindTag),
}

impl Token {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "o" => Some(Token::Empty),
            "w" => Some(Token::Wall),
            "p" => Some(Token::Node(NodeKindTag::Producer)),
            "r" => Some(Token::Node(NodeKindTag::Receiver)),
            "b" => Some(Token::Node(NodeKindTag::Belt)),
            _ => None,
        }
    }
}

/// A grid row: the line it came from and its cells.
struct Row {
    line: usize,
    cells: Vec<(Coordinate, Token)>,
}

fn read_rows<R: BufRead>(lines: &mut Lines<R>, range: i32) -> Result<Vec<Row>, LoadError> {
    let mut rows = Vec::new();
    for (index, walk_row) in RowWalk::new(range).enumerate() {
        let (number, text) = lines.expect("a grid row")?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != walk_row.len {
            return Err(FormatError::at(
                number,
                FormatErrorKind::RowLength {
                    row: index + 1,
                    expected: walk_row.len,
                    found: tokens.len(),
                },
            )
            .into());
        }
        let cells = walk_row
            .cells()
            .zip(tokens)
            .map(|(coord, token)| {
                Token::parse(token).map(|t| (coord, t)).ok_or_else(|| {
                    FormatError::at(number, FormatErrorKind::UnknownToken(token.to_string()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(Row {
            line: number,
            cells,
        });
    }
    Ok(rows)
}

fn check_key_counts(header: &Header, rows: &[Row]) -> Result<(), FormatError> {
    let count = |kind: NodeKindTag| {
        rows.iter()
            .flat_map(|r| &r.cells)
            .filter(|(_, t)| *t == Token::Node(kind))
            .count()
    };
    let last_line = rows.last().map(|r| r.line);
    for (kind, declared) in [
        (NodeKindTag::Producer, header.producer_keys.len()),
        (NodeKindTag::Receiver, header.receiver_keys.len()),
    ] {
        let placed = count(kind);
        if placed != declared {
            return Err(FormatError {
                line: last_line,
                kind: FormatErrorKind::KeyCountMismatch {
                    kind,
                    declared,
                    placed,
                },
            });
        }
    }
    Ok(())
}

/// Place every cell and register the nodes for wiring.
fn build(header: Header, rows: Vec<Row>) -> Result<(Factory, WiringContext), FormatError> {
    let mut factory = Factory::new(header.range).map_err(|e| FormatError {
        line: None,
        kind: FormatErrorKind::Grid(e),
    })?;
    let mut ctx = WiringContext::new();
    let Header {
        mut producer_keys,
        mut receiver_keys,
        ..
    } = header;
    let declared_producers = producer_keys.len();
    let declared_receivers = receiver_keys.len();
    let mut next_id = 0u32;

    for row in rows {
        let at = |kind: FormatErrorKind| FormatError::at(row.line, kind);
        for (coord, token) in row.cells {
            let kind = match token {
                Token::Empty => {
                    factory.set_cell(coord, Cell::Empty).map_err(|e| at(e.into()))?;
                    continue;
                }
                Token::Wall => {
                    factory.set_cell(coord, Cell::Wall).map_err(|e| at(e.into()))?;
                    continue;
                }
                Token::Node(kind) => kind,
            };
            next_id += 1;
            let id = TransportId(next_id);
            let transport = match kind {
                NodeKindTag::Belt => Transport::belt(id),
                NodeKindTag::Producer => Transport::producer(
                    id,
                    take_key(&mut producer_keys, kind, declared_producers, row.line)?,
                ),
                NodeKindTag::Receiver => Transport::receiver(
                    id,
                    take_key(&mut receiver_keys, kind, declared_receivers, row.line)?,
                ),
            };
            let node = factory.place(coord, transport).map_err(|e| {
                at(match e {
                    FactoryError::Grid(g) => g.into(),
                    FactoryError::Transport(t) => t.into(),
                })
            })?;
            ctx.register(id, node, kind);
        }
    }

    debug!(nodes = ctx.len(), "grid placed");
    Ok((factory, ctx))
}

/// Next item name of `kind`. Counts were checked up front, so running dry
/// means the file places more nodes than it names.
fn take_key(
    keys: &mut VecDeque<Item>,
    kind: NodeKindTag,
    declared: usize,
    line: usize,
) -> Result<Item, FormatError> {
    keys.pop_front().ok_or_else(|| {
        FormatError::at(
            line,
            FormatErrorKind::KeyCountMismatch {
                kind,
                declared,
                placed: declared + 1,
            },
        )
    })
}

// ===========================================================================
// Tests
// ===========================================================================
