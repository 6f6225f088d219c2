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

//! Lexical analyzer for the pseudocode dialect

use crate::token::{Delimiter, Keyword, Operator, Token, TokenType};
use ordo_common::{ParseError, ParseResult, Position, PositionTracker, Span};

/// Pseudocode lexical analyzer
pub struct Lexer {
    tracker: PositionTracker,
}

impl Lexer {
    /// Create a new lexer over the given source
    pub fn new(source: &str) -> Self {
        Self {
            tracker: PositionTracker::new(source.to_string()),
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token()?;
            let is_eof = matches!(token.token_type, TokenType::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    /// Scan the next token from input
    fn scan_token(&mut self) -> ParseResult<Token> {
        self.tracker.skip_whitespace();

        let start_pos = self.tracker.position();

        if self.tracker.is_at_end() {
            return Ok(Token::new(TokenType::Eof, String::new(), Span::single(start_pos)));
        }

        let ch = self.tracker.peek_char().expect("not at end");

        match ch {
            '(' | ')' | '[' | ']' | '{' | '}' | ',' => {
                self.tracker.next_char();
                let delimiter = Delimiter::from_char(ch).expect("delimiter char");
                self.make_token(TokenType::Delimiter(delimiter), ch.to_string(), start_pos)
            }

            '+' => self.single_operator(Operator::Plus, start_pos),
            '*' => self.single_operator(Operator::Multiply, start_pos),
            '.' => self.single_operator(Operator::Dot, start_pos),
            '=' => self.single_operator(Operator::Equal, start_pos),
            '≠' => self.single_operator(Operator::NotEqual, start_pos),
            '🡨' => self.single_operator(Operator::Assign, start_pos),

            '-' => self.single_operator(Operator::Minus, start_pos),

            '/' => self.scan_slash_or_comment(start_pos),

            '<' => {
                self.tracker.next_char();
                if self.tracker.consume_if('=') {
                    self.make_token(TokenType::Operator(Operator::LessEqual), "<=".to_string(), start_pos)
                } else if self.tracker.consume_if('-') {
                    // ASCII spelling of the assignment arrow
                    self.make_token(TokenType::Operator(Operator::Assign), "<-".to_string(), start_pos)
                } else {
                    self.make_token(TokenType::Operator(Operator::Less), "<".to_string(), start_pos)
                }
            }

            '>' => {
                self.tracker.next_char();
                if self.tracker.consume_if('=') {
                    self.make_token(TokenType::Operator(Operator::GreaterEqual), ">=".to_string(), start_pos)
                } else {
                    self.make_token(TokenType::Operator(Operator::Greater), ">".to_string(), start_pos)
                }
            }

            c if c.is_ascii_digit() => self.scan_number(start_pos),

            c if is_identifier_start(c) => self.scan_identifier_or_keyword(start_pos),

            // `!` and `==` spellings are not part of the grammar; they fall
            // through here and fail like any other foreign character.
            _ => {
                self.tracker.next_char();
                Err(ParseError::invalid_character(start_pos, ch))
            }
        }
    }

    fn single_operator(&mut self, operator: Operator, start_pos: Position) -> ParseResult<Token> {
        let ch = self.tracker.next_char().expect("not at end");
        self.make_token(TokenType::Operator(operator), ch.to_string(), start_pos)
    }

    /// `/` is division; `//` starts a line comment
    fn scan_slash_or_comment(&mut self, start_pos: Position) -> ParseResult<Token> {
        self.tracker.next_char();
        if self.tracker.consume_if('/') {
            let mut text = String::new();
            while let Some(ch) = self.tracker.peek_char() {
                if ch == '\n' {
                    break;
                }
                text.push(ch);
                self.tracker.next_char();
            }
            let trimmed = text.trim().to_string();
            self.make_token(TokenType::Comment(trimmed.clone()), trimmed, start_pos)
        } else {
            self.make_token(TokenType::Operator(Operator::Divide), "/".to_string(), start_pos)
        }
    }

    fn scan_number(&mut self, start_pos: Position) -> ParseResult<Token> {
        let mut lexeme = String::new();
        while let Some(ch) = self.tracker.peek_char() {
            if ch.is_ascii_digit() {
                lexeme.push(ch);
                self.tracker.next_char();
            } else {
                break;
            }
        }
        // A digit run glued to letters (e.g. `12x`) is not a valid number
        if self.tracker.peek_char().map(is_identifier_start).unwrap_or(false) {
            return Err(ParseError::new(
                ordo_common::ParseErrorKind::InvalidNumber,
                start_pos,
                format!("Invalid number literal starting with '{}'", lexeme),
            ));
        }
        let value: i64 = lexeme
            .parse()
            .map_err(|_| ParseError::new(ordo_common::ParseErrorKind::InvalidNumber, start_pos, format!("Number '{}' out of range", lexeme)))?;
        self.make_token(TokenType::Number(value), lexeme, start_pos)
    }

    fn scan_identifier_or_keyword(&mut self, start_pos: Position) -> ParseResult<Token> {
        let mut lexeme = String::new();
        while let Some(ch) = self.tracker.peek_char() {
            if is_identifier_continue(ch) {
                lexeme.push(ch);
                self.tracker.next_char();
            } else {
                break;
            }
        }

        // Boolean literals, word operators, keywords, then plain identifiers
        let token_type = match lexeme.as_str() {
            "T" => TokenType::Boolean(true),
            "F" => TokenType::Boolean(false),
            word => {
                if let Some(op) = Operator::from_word(word) {
                    TokenType::Operator(op)
                } else if let Some(kw) = Keyword::from_word(word) {
                    TokenType::Keyword(kw)
                } else {
                    TokenType::Identifier(lexeme.clone())
                }
            }
        };
        self.make_token(token_type, lexeme, start_pos)
    }

    fn make_token(&self, token_type: TokenType, lexeme: String, start_pos: Position) -> ParseResult<Token> {
        let span = start_pos.span_to(self.tracker.position());
        Ok(Token::new(token_type, lexeme, span))
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
