//! Reading and writing characters at a position in a buffer
//!
//! All movement stays inside the buffer's restriction. Crossing the end of a line yields a
//! single newline and moves to the start of the next line, while the end of the restriction's
//! last line is the logical end, reads there return `None` without moving.

use crate::{ErrorKind, Position, Result, TextBuffer};

/// Reads the character at `position` and advances the position
pub fn read_char(buffer: &dyn TextBuffer, position: &mut Position) -> Result<Option<char>> {
    let restriction = buffer.restriction();
    if position.row < restriction.start {
        return Err(ErrorKind::InvalidPosition {
            position: *position,
        }
        .into());
    }
    if position.row >= restriction.end {
        return Ok(None);
    }

    if position.col >= buffer.line_len(position.row) {
        if position.row + 1 == restriction.end {
            Ok(None)
        } else {
            *position = Position::new(position.row + 1, 0);
            Ok(Some('\n'))
        }
    } else {
        let c = buffer.char_at(*position);
        position.col += 1;
        Ok(c)
    }
}

/// Moves `position` back by one character
///
/// Stepping back from the start of a line moves to the end of the previous line, where the
/// next read will produce the newline again. Returns false if the position is already at the
/// start of the restriction.
pub fn unread_char(buffer: &dyn TextBuffer, position: &mut Position) -> bool {
    if position.col > 0 {
        position.col -= 1;
        true
    } else if position.row > buffer.restriction().start {
        let row = position.row - 1;
        *position = Position::new(row, buffer.line_len(row));
        true
    } else {
        false
    }
}

/// Inserts text at `position` and advances the position past it
///
/// The line is padded with spaces first when the position lies beyond its end.
/// Returns the number of characters written.
pub fn write_str(
    buffer: &mut dyn TextBuffer,
    position: &mut Position,
    text: &str,
) -> Result<usize> {
    if buffer.is_read_only() {
        return Err(ErrorKind::BufferReadOnly {
            buffer: buffer.name(),
        }
        .into());
    }
    if !buffer.restriction().contains(position.row) {
        return Err(ErrorKind::InvalidPosition {
            position: *position,
        }
        .into());
    }

    buffer.pad_position(*position)?;
    *position = buffer.insert(*position, text)?;
    Ok(text.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LineBuffer;

    fn read_all(buffer: &LineBuffer, position: &mut Position) -> String {
        let mut result = String::new();
        while let Some(c) = read_char(buffer, position).unwrap() {
            result.push(c);
        }
        result
    }

    #[test]
    fn reading_synthesizes_newlines_between_lines() {
        let buffer = LineBuffer::new("test", "ab\n\ncd");
        let mut position = Position::default();
        assert_eq!(read_all(&buffer, &mut position), "ab\n\ncd");
        assert_eq!(position, Position::new(2, 2));
    }

    #[test]
    fn reading_at_the_logical_end_doesnt_move() {
        let buffer = LineBuffer::new("test", "xy");
        let mut position = Position::new(0, 2);
        assert_eq!(read_char(&buffer, &mut position).unwrap(), None);
        assert_eq!(read_char(&buffer, &mut position).unwrap(), None);
        assert_eq!(position, Position::new(0, 2));
    }

    #[test]
    fn reading_stops_at_the_restriction() {
        let mut buffer = LineBuffer::new("test", "one\ntwo\nthree");
        buffer.restrict(1, 2).unwrap();
        let mut position = Position::new(1, 0);
        assert_eq!(read_all(&buffer, &mut position), "two");

        let mut before = Position::new(0, 0);
        assert!(read_char(&buffer, &mut before).is_err());
    }

    #[test]
    fn unread_reverses_reads() {
        let buffer = LineBuffer::new("test", "ab\ncd");
        let start = Position::new(0, 1);
        let mut position = start;
        for _ in 0..3 {
            read_char(&buffer, &mut position).unwrap();
        }
        assert_eq!(position, Position::new(1, 1));
        for _ in 0..3 {
            assert!(unread_char(&buffer, &mut position));
        }
        assert_eq!(position, start);
    }

    #[test]
    fn unread_at_the_start_of_the_restriction_fails() {
        let buffer = LineBuffer::new("test", "ab");
        let mut position = Position::default();
        assert!(!unread_char(&buffer, &mut position));
        assert_eq!(position, Position::default());
    }

    #[test]
    fn writing_past_the_end_of_a_line_pads_with_spaces() {
        let mut buffer = LineBuffer::new("test", "");
        let mut position = Position::new(0, 5);
        assert_eq!(write_str(&mut buffer, &mut position, "ab").unwrap(), 2);
        assert_eq!(buffer.text(), "     ab");
        assert_eq!(position, Position::new(0, 7));
    }

    #[test]
    fn written_characters_can_be_read_back() {
        let mut buffer = LineBuffer::new("test", "xyz");
        let start = Position::new(0, 1);
        let mut position = start;
        write_str(&mut buffer, &mut position, "Q").unwrap();
        let mut position = start;
        assert_eq!(read_char(&buffer, &mut position).unwrap(), Some('Q'));
    }

    #[test]
    fn writing_to_a_read_only_buffer_fails() {
        let mut buffer = LineBuffer::new("test", "abc");
        buffer.set_read_only(true);
        let mut position = Position::default();
        let result = write_str(&mut buffer, &mut position, "x");
        assert!(matches!(
            result.map_err(|e| e.error),
            Err(ErrorKind::BufferReadOnly { .. })
        ));
        assert_eq!(buffer.text(), "abc");
    }
}
