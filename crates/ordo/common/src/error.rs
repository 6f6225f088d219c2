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

//! Error and warning types for parsing and analysis

use crate::position::Position;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Main error type for parsing operations.
///
/// Parse errors are the only errors surfaced to callers: every later
/// analysis stage recovers locally and annotates the result instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The kind of error
    pub kind: ParseErrorKind,
    /// Position where the error occurred
    pub position: Position,
    /// Human-readable error message
    pub message: String,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ParseErrorKind, position: Position, message: String) -> Self {
        Self { kind, position, message }
    }

    /// Create an unexpected token error
    pub fn unexpected_token(position: Position, found: String, expected: Option<String>) -> Self {
        let message = if let Some(exp) = expected {
            format!("Found '{}', expected {}", found, exp)
        } else {
            format!("Unexpected token '{}'", found)
        };
        Self::new(ParseErrorKind::UnexpectedToken, position, message)
    }

    /// Create an unexpected EOF error
    pub fn unexpected_eof(position: Position) -> Self {
        Self::new(ParseErrorKind::UnexpectedEof, position, "Unexpected end of file".to_string())
    }

    /// Create an invalid character error
    pub fn invalid_character(position: Position, ch: char) -> Self {
        Self::new(ParseErrorKind::InvalidCharacter, position, format!("Unexpected character '{}'", ch))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{} at line {}, column {}: {}", self.kind.description(), self.position.line, self.position.column, self.message)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

/// Categories of parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Lexical errors (tokenization)
    #[error("Lexical error")]
    LexicalError,

    /// Syntax errors (grammar violations)
    #[error("Syntax error")]
    SyntaxError,

    /// Unexpected token
    #[error("Unexpected token")]
    UnexpectedToken,

    /// Unexpected end of file
    #[error("Unexpected end of file")]
    UnexpectedEof,

    /// Invalid character
    #[error("Invalid character")]
    InvalidCharacter,

    /// Invalid number format
    #[error("Invalid number")]
    InvalidNumber,
}

impl ParseErrorKind {
    /// Get a short error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ParseErrorKind::LexicalError => "E001",
            ParseErrorKind::SyntaxError => "E002",
            ParseErrorKind::UnexpectedToken => "E003",
            ParseErrorKind::UnexpectedEof => "E004",
            ParseErrorKind::InvalidCharacter => "E005",
            ParseErrorKind::InvalidNumber => "E006",
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ParseErrorKind::LexicalError => "Lexical error",
            ParseErrorKind::SyntaxError => "Syntax error",
            ParseErrorKind::UnexpectedToken => "Unexpected token",
            ParseErrorKind::UnexpectedEof => "Unexpected end of file",
            ParseErrorKind::InvalidCharacter => "Invalid character",
            ParseErrorKind::InvalidNumber => "Invalid number format",
        }
    }
}

/// Recoverable conditions raised after parsing.
///
/// None of these abort an analysis; they are recorded on the result so the
/// caller can see which fallbacks were taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AnalysisWarning {
    /// The program parsed but contains no analyzable statements
    EmptyStructure,
    /// No strategy matched the recurrence precisely; the recursion-tree
    /// fallback produced the classification
    UnresolvedRecurrence { relation: String },
    /// An implicit base case's guard could not be negated structurally;
    /// analysis continued with the explicit base cases only
    NegationAmbiguity { guard: String },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::EmptyStructure => write!(f, "program contains no analyzable statements"),
            AnalysisWarning::UnresolvedRecurrence { relation } => {
                write!(f, "no strategy matched '{}' precisely; recursion-tree expansion used as fallback", relation)
            }
            AnalysisWarning::NegationAmbiguity { guard } => {
                write!(f, "guard '{}' could not be negated structurally; implicit base case skipped", guard)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_creation() {
        let pos = Position::new(10, 5);
        let error = ParseError::new(ParseErrorKind::SyntaxError, pos, "Test error".to_string());

        assert_eq!(error.kind, ParseErrorKind::SyntaxError);
        assert_eq!(error.position, pos);
        assert_eq!(error.message, "Test error");
    }

    #[test]
    fn test_error_messages() {
        let error = ParseError::new(ParseErrorKind::SyntaxError, Position::new(10, 5), "Test message".to_string());

        let user_msg = error.user_message();
        assert!(user_msg.contains("line 10"));
        assert!(user_msg.contains("column 5"));
        assert!(user_msg.contains("Test message"));
    }

    #[test]
    fn test_helper_constructors() {
        let pos = Position::new(5, 10);

        let unexpected = ParseError::unexpected_token(pos, "=".to_string(), Some("assignment arrow".to_string()));
        assert_eq!(unexpected.kind, ParseErrorKind::UnexpectedToken);
        assert!(unexpected.message.contains("Found '='"));

        let eof = ParseError::unexpected_eof(pos);
        assert_eq!(eof.kind, ParseErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ParseErrorKind::SyntaxError.code(), "E002");
        assert_eq!(ParseErrorKind::InvalidCharacter.code(), "E005");
    }

    #[test]
    fn test_warning_display() {
        let warning = AnalysisWarning::NegationAmbiguity { guard: "flag".to_string() };
        assert!(warning.to_string().contains("flag"));
    }
}
