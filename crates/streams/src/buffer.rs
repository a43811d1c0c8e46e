//! The interface to the editor's text storage, along with a small in-memory implementation

use crate::{ErrorKind, Result, RillSend, RillSync};
use rill_memory::PtrMut;
use std::fmt;

/// A character slot in a buffer's line array
///
/// Positions order by row first, then by column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// The line index
    pub row: usize,
    /// The character index within the line
    pub col: usize,
}

impl Position {
    /// Makes a position from a row and column
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} . {})", self.col, self.row)
    }
}

/// The half-open range of rows in a buffer that are currently visible to editing and streams
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Restriction {
    /// The first visible row
    pub start: usize,
    /// One past the last visible row
    pub end: usize,
}

impl Restriction {
    /// Returns true if the row is inside the restriction
    pub fn contains(&self, row: usize) -> bool {
        row >= self.start && row < self.end
    }
}

/// The operations the stream layer needs from a text buffer
///
/// Columns and lengths are measured in characters. Lines don't include their terminating
/// newline, the stream layer synthesizes one when a read crosses a line boundary.
pub trait TextBuffer: RillSend + RillSync {
    /// The buffer's name, used when displaying the buffer
    fn name(&self) -> String;

    /// The total number of lines in the buffer, ignoring the restriction
    fn line_count(&self) -> usize;

    /// The number of characters in the given line
    fn line_len(&self, row: usize) -> usize;

    /// Returns the character at the given position, or None if it's past the end of its line
    fn char_at(&self, position: Position) -> Option<char>;

    /// The buffer's active restriction
    fn restriction(&self) -> Restriction;

    /// Returns true if the buffer can't be modified
    fn is_read_only(&self) -> bool;

    /// The buffer's cursor position
    fn point(&self) -> Position;

    /// Moves the buffer's cursor
    fn set_point(&mut self, position: Position);

    /// Inserts text at the given position, returning the position just after the inserted text
    fn insert(&mut self, position: Position, text: &str) -> Result<Position>;

    /// Makes the position valid for insertion by extending a short line with spaces
    fn pad_position(&mut self, position: Position) -> Result<()> {
        let len = self.line_len(position.row);
        if position.col > len {
            let padding = " ".repeat(position.col - len);
            self.insert(Position::new(position.row, len), &padding)?;
        }
        Ok(())
    }

    /// The position just past the last character in the restriction
    fn logical_end(&self) -> Position {
        let row = self.restriction().end.saturating_sub(1);
        Position::new(row, self.line_len(row))
    }
}

/// A shared reference to a buffer
pub type BufferRef = PtrMut<dyn TextBuffer>;

/// A saved position in a buffer
///
/// A mark is resident while it's attached to a live buffer, only resident marks can be used as
/// streams.
pub struct Mark {
    buffer: Option<BufferRef>,
    /// The mark's position, advanced in place when the mark is used as a stream
    pub position: Position,
}

/// A shared reference to a mark
pub type MarkRef = PtrMut<Mark>;

impl Mark {
    /// Makes a mark that's attached to a buffer
    pub fn new(buffer: BufferRef, position: Position) -> Self {
        Self {
            buffer: Some(buffer),
            position,
        }
    }

    /// Makes a mark that isn't attached to any buffer
    pub fn non_resident(position: Position) -> Self {
        Self {
            buffer: None,
            position,
        }
    }

    /// The mark's buffer, if the mark is resident
    pub fn buffer(&self) -> Option<&BufferRef> {
        self.buffer.as_ref()
    }

    /// Detaches the mark from its buffer
    pub fn detach(&mut self) {
        self.buffer = None;
    }
}

/// A line-array text buffer held in memory
///
/// This covers the buffer operations the stream layer relies on, for hosts that don't have
/// their own text engine.
pub struct LineBuffer {
    name: String,
    lines: Vec<Vec<char>>,
    restriction: Restriction,
    read_only: bool,
    point: Position,
}

impl LineBuffer {
    /// Makes a buffer containing the given text, with the restriction covering every line
    pub fn new(name: &str, text: &str) -> Self {
        let lines: Vec<Vec<char>> = text.split('\n').map(|line| line.chars().collect()).collect();
        let restriction = Restriction {
            start: 0,
            end: lines.len(),
        };

        Self {
            name: name.into(),
            lines,
            restriction,
            read_only: false,
            point: Position::default(),
        }
    }

    /// Limits streams and editing to the given rows
    pub fn restrict(&mut self, start: usize, end: usize) -> Result<()> {
        if start >= end || end > self.lines.len() {
            return Err(ErrorKind::InvalidPosition {
                position: Position::new(end, 0),
            }
            .into());
        }
        self.restriction = Restriction { start, end };
        Ok(())
    }

    /// Makes every line visible again
    pub fn widen(&mut self) {
        self.restriction = Restriction {
            start: 0,
            end: self.lines.len(),
        };
    }

    /// Sets the buffer's read-only status
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Returns the text of a single line
    pub fn line(&self, row: usize) -> Option<String> {
        self.lines.get(row).map(|line| line.iter().collect())
    }

    /// Returns the buffer's full contents
    pub fn text(&self) -> String {
        let mut result = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                result.push('\n');
            }
            result.extend(line.iter());
        }
        result
    }
}

impl TextBuffer for LineBuffer {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, Vec::len)
    }

    fn char_at(&self, position: Position) -> Option<char> {
        self.lines
            .get(position.row)
            .and_then(|line| line.get(position.col))
            .copied()
    }

    fn restriction(&self) -> Restriction {
        self.restriction
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn point(&self) -> Position {
        self.point
    }

    fn set_point(&mut self, position: Position) {
        self.point = position;
    }

    fn insert(&mut self, position: Position, text: &str) -> Result<Position> {
        let Some(line) = self.lines.get_mut(position.row) else {
            return Err(ErrorKind::InvalidPosition { position }.into());
        };
        if position.col > line.len() {
            return Err(ErrorKind::InvalidPosition { position }.into());
        }

        let mut segments = text.split('\n');
        let first: Vec<char> = segments.next().unwrap_or_default().chars().collect();
        let rest: Vec<Vec<char>> = segments.map(|s| s.chars().collect()).collect();

        let end = if rest.is_empty() {
            let end_col = position.col + first.len();
            let tail = line.split_off(position.col);
            line.extend(first);
            line.extend(tail);
            Position::new(position.row, end_col)
        } else {
            let tail = line.split_off(position.col);
            line.extend(first);

            let added = rest.len();
            let mut new_lines = rest;
            let end_col = new_lines.last().map_or(0, Vec::len);
            if let Some(last) = new_lines.last_mut() {
                last.extend(tail);
            }

            let insert_at = position.row + 1;
            for (offset, new_line) in new_lines.into_iter().enumerate() {
                self.lines.insert(insert_at + offset, new_line);
            }
            if self.restriction.contains(position.row) {
                self.restriction.end += added;
            }

            Position::new(position.row + added, end_col)
        };

        if self.point > position {
            self.point = if self.point.row == position.row {
                Position::new(end.row, end.col + (self.point.col - position.col))
            } else {
                Position::new(self.point.row + (end.row - position.row), self.point.col)
            };
        }

        Ok(end)
    }
}
