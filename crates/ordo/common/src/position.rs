// Ordo
// Copyright (C) 2025 Ordo contributors

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Source position tracking for the pseudocode front end

use serde::Serialize;
use std::fmt;

/// Represents a position in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Create a position at the beginning of a file
    pub fn start() -> Self {
        Self::new(1, 1)
    }

    /// Advance to the next column
    pub fn next_column(&mut self) {
        self.column += 1;
    }

    /// Advance to the next line
    pub fn next_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    /// Advance by a character (handles newlines)
    pub fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.next_line();
        } else {
            self.next_column();
        }
    }

    /// Create a span from this position to another
    pub fn span_to(&self, end: Position) -> Span {
        Span::new(*self, end)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

/// Represents a span of source code between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a span covering a single position
    pub fn single(position: Position) -> Self {
        let mut end = position;
        end.next_column();
        Self::new(position, end)
    }

    /// Merge this span with another span
    pub fn merge(&self, other: Span) -> Span {
        let start = if self.start <= other.start { self.start } else { other.start };
        let end = if self.end >= other.end { self.end } else { other.end };
        Span::new(start, end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}

/// Utility for tracking position while scanning source text
#[derive(Debug, Clone)]
pub struct PositionTracker {
    position: Position,
    source: String,
    byte_offset: usize,
}

impl PositionTracker {
    /// Create a new position tracker
    pub fn new(source: String) -> Self {
        Self {
            position: Position::start(),
            source,
            byte_offset: 0,
        }
    }

    /// Get the current position
    pub fn position(&self) -> Position {
        self.position
    }

    /// Check if we're at the end of the source
    pub fn is_at_end(&self) -> bool {
        self.byte_offset >= self.source.len()
    }

    /// Peek at the current character without advancing
    pub fn peek_char(&self) -> Option<char> {
        self.source[self.byte_offset..].chars().next()
    }

    /// Peek at the character after the current one
    pub fn peek_next_char(&self) -> Option<char> {
        let mut chars = self.source[self.byte_offset..].chars();
        chars.next();
        chars.next()
    }

    /// Advance by one character and return it
    pub fn next_char(&mut self) -> Option<char> {
        if let Some(ch) = self.peek_char() {
            self.position.advance(ch);
            self.byte_offset += ch.len_utf8();
            Some(ch)
        } else {
            None
        }
    }

    /// Consume the current character if it matches
    pub fn consume_if(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    /// Skip whitespace and return the number of characters skipped
    pub fn skip_whitespace(&mut self) -> usize {
        let mut count = 0;
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
                count += 1;
            } else {
                break;
            }
        }
        count
    }
}
