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

//! Pseudocode front end: token model, lexer, and recursive-descent parser
//! producing the canonical `AstNode` tree.
//!
//! The dialect uses `begin`/`end` blocks, the `🡨` assignment arrow (with
//! `<-` as an ASCII spelling), `=` for equality and `≠` for inequality, and
//! an explicit `CALL` keyword for invocation. Parsing is a pure function of
//! the input text: one deterministic left-to-right pass, no recovery.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{AstNode, BinOp, Literal, UnOp};
pub use lexer::Lexer;
pub use parser::{parse, Parser};
pub use token::{Delimiter, Keyword, Operator, Token, TokenType};
