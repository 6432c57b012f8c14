//! A cursor over the source text: an immutable buffer and a mutable position.
//!
//! Every grammar rule takes a [`Mark`] on entry and [`Cursor::seek`]s back to it
//! when it fails to match, so sibling alternatives all start from the same place.
//!
//! The position is a byte offset that only ever moves by whole characters, so it
//! always sits on a `char` boundary.

use regex::{Error as RegexError, Regex};
use std::fmt;

pub type Offset = usize;
pub type Line = u32;
pub type Col = u32;

/// Compile a regex that only matches at the start of the haystack.
pub(crate) fn anchored_regex(regex: &str) -> Result<Regex, RegexError> {
    match Regex::new(&format!("^({})", regex)) {
        Ok(regex) => Ok(regex),
        Err(err) => match Regex::new(regex) {
            // This error message is better because it doesn't have the ^({}) wrapper in it.
            Err(err) => Err(err),
            Ok(_) => Err(err),
        },
    }
}

/*========================================*/
/*          Position                      */
/*========================================*/

/// A position in the input text, _between_ two characters (or at the
/// start or end of a line). For example, "xyz" has 4 possible positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Byte offset from the beginning of the source string.
    pub offset: Offset,
    /// Line number.
    pub line: Line,
    /// Column number, counted in bytes.
    pub col: Col,
    /// Column number, counted in utf8 codepoints.
    pub utf8_col: Col,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.utf8_col)
    }
}

impl Position {
    /// The line and column of byte `offset` in `source`. Offsets past the end
    /// are clamped to the end.
    pub fn locate(source: &str, offset: Offset) -> Position {
        let mut pos = Position {
            offset: 0,
            line: 0,
            col: 0,
            utf8_col: 0,
        };
        for ch in source.chars() {
            if pos.offset >= offset {
                break;
            }
            pos.advance(ch);
        }
        pos
    }

    fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8() as Offset;
        if ch == '\n' {
            self.col = 0;
            self.utf8_col = 0;
            self.line += 1;
        } else {
            self.col += ch.len_utf8() as Col;
            self.utf8_col += 1;
        }
    }
}

/*========================================*/
/*          Mark                          */
/*========================================*/

/// A saved cursor position. The only way to get one is [`Cursor::mark`], and
/// [`Cursor::seek`] refuses any mark that isn't a position in its own source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mark(Offset);

impl Mark {
    pub fn offset(self) -> Offset {
        self.0
    }
}

/*========================================*/
/*          Cursor                        */
/*========================================*/

#[derive(Debug, Clone)]
pub struct Cursor<'s> {
    source: &'s str,
    offset: Offset,
    whitespace: Option<&'s Regex>,
}

impl<'s> Cursor<'s> {
    /// A cursor at the start of `source` that never skips whitespace.
    pub fn new(source: &'s str) -> Cursor<'s> {
        Cursor {
            source,
            offset: 0,
            whitespace: None,
        }
    }

    /// A cursor at the start of `source`. [`Cursor::skip_whitespace`] will
    /// consume whatever `whitespace` matches. The regex must be anchored.
    pub fn with_whitespace(source: &'s str, whitespace: &'s Regex) -> Cursor<'s> {
        Cursor {
            source,
            offset: 0,
            whitespace: Some(whitespace),
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    /// The _remaining, unconsumed_ source text.
    pub fn remaining(&self) -> &'s str {
        &self.source[self.offset..]
    }

    pub fn at_end(&self) -> bool {
        self.offset == self.source.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn read(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        Some(ch)
    }

    pub fn mark(&self) -> Mark {
        Mark(self.offset)
    }

    /// Move back (or forward) to `mark`. A mark taken from some other cursor
    /// may not land inside this one's source, or may split a character; then
    /// the cursor stays put and this returns false.
    pub fn seek(&mut self, mark: Mark) -> bool {
        if !self.source.is_char_boundary(mark.0) {
            return false;
        }
        self.offset = mark.0;
        true
    }

    /// Consume the next `count` characters (or fewer, at the end of the buffer)
    /// and return them.
    pub fn slice(&mut self, count: usize) -> &'s str {
        let remaining = self.remaining();
        let len = match remaining.char_indices().nth(count) {
            Some((len, _)) => len,
            None => remaining.len(),
        };
        self.consume(len)
    }

    /// If the remaining text starts with `prefix`, consume it.
    pub fn eat(&mut self, prefix: &str) -> bool {
        if self.remaining().starts_with(prefix) {
            self.offset += prefix.len();
            true
        } else {
            false
        }
    }

    /// Consume the longest match of `regex` at the current position, if any.
    /// `regex` must be anchored with `^`.
    pub fn eat_regex(&mut self, regex: &Regex) -> Option<&'s str> {
        let len = regex.find(self.remaining())?.end();
        if len == 0 {
            return None;
        }
        Some(self.consume(len))
    }

    pub fn skip_whitespace(&mut self) {
        if let Some(whitespace) = self.whitespace {
            self.eat_regex(whitespace);
        }
    }

    /// Line and column of the current position.
    pub fn position(&self) -> Position {
        Position::locate(self.source, self.offset)
    }

    /// Line and column of a previously taken mark.
    pub fn position_of(&self, mark: Mark) -> Position {
        Position::locate(self.source, mark.0)
    }

    fn consume(&mut self, len: usize) -> &'s str {
        let consumed = &self.source[self.offset..self.offset + len];
        self.offset += len;
        consumed
    }
}
