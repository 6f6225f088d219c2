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

//! Recursive-descent parser for the pseudocode dialect.
//!
//! Deterministic single pass, left-to-right, with one token of lookahead
//! beyond the grammar's ambiguity points (procedure definition vs
//! assignment target, class definition vs object declaration). Any token
//! that cannot be consumed fails immediately with a positioned error; the
//! parser never recovers mid-statement.

use crate::ast::{AstNode, BinOp, Literal, UnOp};
use crate::lexer::Lexer;
use crate::token::{Delimiter, Keyword, Operator, Token, TokenType};
use ordo_common::{ParseError, ParseResult, Position};
use tracing::debug;

/// Parse pseudocode source into a statement list.
///
/// Pure function of the input text: identical sources produce structurally
/// identical trees.
pub fn parse(source: &str) -> ParseResult<Vec<AstNode>> {
    let tokens = Lexer::new(source).tokenize()?;
    debug!(tokens = tokens.len(), "tokenized source");
    Parser::new(tokens).parse_program()
}

/// Token-stream parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse the whole token stream as a program
    pub fn parse_program(&mut self) -> ParseResult<Vec<AstNode>> {
        let mut statements = Vec::new();
        while !self.at_eof() {
            statements.push(self.parse_statement()?);
        }
        debug!(statements = statements.len(), "parsed program");
        Ok(statements)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> ParseResult<AstNode> {
        let token = self.current()?.clone();
        match &token.token_type {
            TokenType::Comment(text) => {
                self.advance();
                Ok(AstNode::Comment(text.clone()))
            }
            TokenType::Keyword(Keyword::For) => self.parse_for(),
            TokenType::Keyword(Keyword::While) => self.parse_while(),
            TokenType::Keyword(Keyword::Repeat) => self.parse_repeat(),
            TokenType::Keyword(Keyword::If) => self.parse_if(),
            TokenType::Keyword(Keyword::Call) => self.parse_call_statement(),
            TokenType::Keyword(Keyword::Return) => self.parse_return(),
            TokenType::Keyword(Keyword::Class) => self.parse_class(),
            TokenType::Identifier(_) => self.parse_assignment_or_procedure(),
            _ => Err(ParseError::unexpected_token(token.span.start, token.lexeme.clone(), Some("a statement".to_string()))),
        }
    }

    /// `for v 🡨 e1 to e2 do begin … end`
    fn parse_for(&mut self) -> ParseResult<AstNode> {
        self.expect_keyword(Keyword::For)?;
        let var = self.expect_identifier("loop variable")?;
        self.expect_operator(Operator::Assign, "assignment arrow '🡨'")?;
        let from = self.parse_expression()?;
        self.expect_keyword(Keyword::To)?;
        let to = self.parse_expression()?;
        self.expect_keyword(Keyword::Do)?;
        let body = self.parse_block()?;
        Ok(AstNode::For {
            var,
            from: Box::new(from),
            to: Box::new(to),
            body,
        })
    }

    /// `while (cond) do begin … end`
    fn parse_while(&mut self) -> ParseResult<AstNode> {
        self.expect_keyword(Keyword::While)?;
        self.expect_delimiter(Delimiter::LeftParen, "'('")?;
        let cond = self.parse_expression()?;
        self.expect_delimiter(Delimiter::RightParen, "')'")?;
        self.expect_keyword(Keyword::Do)?;
        let body = self.parse_block()?;
        Ok(AstNode::While { cond: Box::new(cond), body })
    }

    /// `repeat … until (cond)`
    fn parse_repeat(&mut self) -> ParseResult<AstNode> {
        self.expect_keyword(Keyword::Repeat)?;
        let mut body = Vec::new();
        while !self.check_keyword(Keyword::Until) {
            if self.at_eof() {
                return Err(ParseError::unexpected_eof(self.previous_position()));
            }
            body.push(self.parse_statement()?);
        }
        self.expect_keyword(Keyword::Until)?;
        self.expect_delimiter(Delimiter::LeftParen, "'('")?;
        let cond = self.parse_expression()?;
        self.expect_delimiter(Delimiter::RightParen, "')'")?;
        Ok(AstNode::Repeat { body, cond: Box::new(cond) })
    }

    /// `if (cond) then begin … end [else begin … end]`
    fn parse_if(&mut self) -> ParseResult<AstNode> {
        self.expect_keyword(Keyword::If)?;
        self.expect_delimiter(Delimiter::LeftParen, "'('")?;
        let cond = self.parse_expression()?;
        self.expect_delimiter(Delimiter::RightParen, "')'")?;
        self.expect_keyword(Keyword::Then)?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.check_keyword(Keyword::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(AstNode::If {
            cond: Box::new(cond),
            then_branch,
            else_branch,
        })
    }

    /// `CALL name(args)` in statement position
    fn parse_call_statement(&mut self) -> ParseResult<AstNode> {
        self.expect_keyword(Keyword::Call)?;
        let name = self.expect_identifier("procedure name")?;
        let args = self.parse_call_args()?;
        Ok(AstNode::Call { name, args })
    }

    /// `return expr`
    fn parse_return(&mut self) -> ParseResult<AstNode> {
        self.expect_keyword(Keyword::Return)?;
        let value = self.parse_expression()?;
        Ok(AstNode::Return { value: Box::new(value) })
    }

    /// `class Name { attrs }` or `class Name ident`
    fn parse_class(&mut self) -> ParseResult<AstNode> {
        self.expect_keyword(Keyword::Class)?;
        let name = self.expect_identifier("class name")?;
        if self.check_delimiter(Delimiter::LeftBrace) {
            self.advance();
            let mut attributes = Vec::new();
            while !self.check_delimiter(Delimiter::RightBrace) {
                attributes.push(self.expect_identifier("attribute name")?);
            }
            self.expect_delimiter(Delimiter::RightBrace, "'}'")?;
            Ok(AstNode::ClassDef { name, attributes })
        } else {
            let object = self.expect_identifier("object name")?;
            Ok(AstNode::ObjectDecl { class_name: name, name: object })
        }
    }

    /// Statement starting with an identifier: either an assignment target
    /// (`x 🡨 …`, `A[i] 🡨 …`, `p.x 🡨 …`) or a procedure definition
    /// (`name(params) begin … end`). One token of lookahead decides.
    fn parse_assignment_or_procedure(&mut self) -> ParseResult<AstNode> {
        let name = self.expect_identifier("identifier")?;
        let token = self.current()?.clone();
        match &token.token_type {
            TokenType::Delimiter(Delimiter::LeftParen) => self.parse_procedure_def(name),
            TokenType::Operator(Operator::Assign) => {
                self.advance();
                let value = self.parse_expression()?;
                Ok(AstNode::Assign {
                    target: Box::new(AstNode::Identifier(name)),
                    value: Box::new(value),
                })
            }
            TokenType::Delimiter(Delimiter::LeftBracket) => {
                self.advance();
                let index = self.parse_expression()?;
                self.expect_delimiter(Delimiter::RightBracket, "']'")?;
                self.expect_operator(Operator::Assign, "assignment arrow '🡨'")?;
                let value = self.parse_expression()?;
                Ok(AstNode::Assign {
                    target: Box::new(AstNode::ArrayAccess { array: name, index: Box::new(index) }),
                    value: Box::new(value),
                })
            }
            TokenType::Operator(Operator::Dot) => {
                self.advance();
                let field = self.expect_identifier("field name")?;
                self.expect_operator(Operator::Assign, "assignment arrow '🡨'")?;
                let value = self.parse_expression()?;
                Ok(AstNode::Assign {
                    target: Box::new(AstNode::FieldAccess { object: name, field }),
                    value: Box::new(value),
                })
            }
            // `x = 5` lands here: equality is not assignment.
            _ => Err(ParseError::unexpected_token(
                token.span.start,
                token.lexeme.clone(),
                Some("assignment arrow '🡨'".to_string()),
            )),
        }
    }

    /// `name(params) begin … end`, the name already consumed
    fn parse_procedure_def(&mut self, name: String) -> ParseResult<AstNode> {
        self.expect_delimiter(Delimiter::LeftParen, "'('")?;
        let mut params = Vec::new();
        if !self.check_delimiter(Delimiter::RightParen) {
            loop {
                params.push(self.expect_identifier("parameter name")?);
                if self.check_delimiter(Delimiter::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_delimiter(Delimiter::RightParen, "')'")?;
        let body = self.parse_block()?;
        Ok(AstNode::ProcedureDef { name, params, body })
    }

    /// `begin stmts end`
    fn parse_block(&mut self) -> ParseResult<Vec<AstNode>> {
        self.expect_keyword(Keyword::Begin)?;
        let mut statements = Vec::new();
        while !self.check_keyword(Keyword::End) {
            if self.at_eof() {
                return Err(ParseError::unexpected_eof(self.previous_position()));
            }
            statements.push(self.parse_statement()?);
        }
        self.expect_keyword(Keyword::End)?;
        Ok(statements)
    }

    // ------------------------------------------------------------------
    // Expressions (precedence climbing)
    // ------------------------------------------------------------------

    fn parse_expression(&mut self) -> ParseResult<AstNode> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<AstNode> {
        let mut lhs = self.parse_unary()?;
        loop {
            let Some(op) = self.current_binary_operator() else { break };
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(precedence + 1)?;
            lhs = AstNode::Binary {
                op: binop_of(op),
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult<AstNode> {
        let token = self.current()?.clone();
        match &token.token_type {
            TokenType::Operator(Operator::Not) => {
                self.advance();
                let value = self.parse_unary()?;
                Ok(AstNode::Unary { op: UnOp::Not, value: Box::new(value) })
            }
            TokenType::Operator(Operator::Minus) => {
                self.advance();
                let value = self.parse_unary()?;
                Ok(AstNode::Unary { op: UnOp::Neg, value: Box::new(value) })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ParseResult<AstNode> {
        let token = self.current()?.clone();
        match &token.token_type {
            TokenType::Number(value) => {
                self.advance();
                Ok(AstNode::Literal(Literal::Number(*value)))
            }
            TokenType::Boolean(value) => {
                self.advance();
                Ok(AstNode::Literal(Literal::Boolean(*value)))
            }
            TokenType::Keyword(Keyword::Call) => {
                self.advance();
                let name = self.expect_identifier("procedure name")?;
                let args = self.parse_call_args()?;
                Ok(AstNode::Call { name, args })
            }
            TokenType::Keyword(kw @ (Keyword::Ceil | Keyword::Floor)) => {
                let op = if *kw == Keyword::Ceil { UnOp::Ceil } else { UnOp::Floor };
                self.advance();
                self.expect_delimiter(Delimiter::LeftParen, "'('")?;
                let value = self.parse_expression()?;
                self.expect_delimiter(Delimiter::RightParen, "')'")?;
                Ok(AstNode::Unary { op, value: Box::new(value) })
            }
            TokenType::Delimiter(Delimiter::LeftParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_delimiter(Delimiter::RightParen, "')'")?;
                Ok(inner)
            }
            TokenType::Identifier(name) => {
                let name = name.clone();
                self.advance();
                match self.current().map(|t| t.token_type.clone()) {
                    Ok(TokenType::Delimiter(Delimiter::LeftBracket)) => {
                        self.advance();
                        let index = self.parse_expression()?;
                        self.expect_delimiter(Delimiter::RightBracket, "']'")?;
                        Ok(AstNode::ArrayAccess { array: name, index: Box::new(index) })
                    }
                    Ok(TokenType::Operator(Operator::Dot)) => {
                        self.advance();
                        let field = self.expect_identifier("field name")?;
                        Ok(AstNode::FieldAccess { object: name, field })
                    }
                    Ok(TokenType::Delimiter(Delimiter::LeftParen)) => {
                        let args = self.parse_call_args()?;
                        Ok(AstNode::Call { name, args })
                    }
                    _ => Ok(AstNode::Identifier(name)),
                }
            }
            _ => Err(ParseError::unexpected_token(token.span.start, token.lexeme.clone(), Some("an expression".to_string()))),
        }
    }

    fn parse_call_args(&mut self) -> ParseResult<Vec<AstNode>> {
        self.expect_delimiter(Delimiter::LeftParen, "'('")?;
        let mut args = Vec::new();
        if !self.check_delimiter(Delimiter::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.check_delimiter(Delimiter::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_delimiter(Delimiter::RightParen, "')'")?;
        Ok(args)
    }

    // ------------------------------------------------------------------
    // Token-stream helpers
    // ------------------------------------------------------------------

    fn current(&self) -> ParseResult<&Token> {
        self.tokens.get(self.pos).ok_or_else(|| ParseError::unexpected_eof(self.previous_position()))
    }

    fn current_binary_operator(&self) -> Option<Operator> {
        self.tokens.get(self.pos).and_then(|t| t.as_operator()).filter(|op| op.is_binary())
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn at_eof(&self) -> bool {
        matches!(self.tokens.get(self.pos).map(|t| &t.token_type), Some(TokenType::Eof) | None)
    }

    fn previous_position(&self) -> Position {
        self.tokens.get(self.pos.saturating_sub(1)).map(|t| t.span.start).unwrap_or_default()
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.tokens.get(self.pos).map(|t| t.is_keyword(keyword)).unwrap_or(false)
    }

    fn check_delimiter(&self, delimiter: Delimiter) -> bool {
        self.tokens.get(self.pos).map(|t| t.is_delimiter(delimiter)).unwrap_or(false)
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<()> {
        let token = self.current()?;
        if token.is_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected_token(token.span.start, token.lexeme.clone(), Some(format!("'{}'", keyword))))
        }
    }

    fn expect_operator(&mut self, operator: Operator, expected: &str) -> ParseResult<()> {
        let token = self.current()?;
        if token.is_operator(operator) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected_token(token.span.start, token.lexeme.clone(), Some(expected.to_string())))
        }
    }

    fn expect_delimiter(&mut self, delimiter: Delimiter, expected: &str) -> ParseResult<()> {
        let token = self.current()?;
        if token.is_delimiter(delimiter) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected_token(token.span.start, token.lexeme.clone(), Some(expected.to_string())))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> ParseResult<String> {
        let token = self.current()?;
        match token.as_identifier() {
            Some(name) => {
                let name = name.to_string();
                self.advance();
                Ok(name)
            }
            None => Err(ParseError::unexpected_token(token.span.start, token.lexeme.clone(), Some(expected.to_string()))),
        }
    }
}

fn binop_of(op: Operator) -> BinOp {
    match op {
        Operator::Plus => BinOp::Add,
        Operator::Minus => BinOp::Sub,
        Operator::Multiply => BinOp::Mul,
        Operator::Divide => BinOp::Div,
        Operator::IntDivide => BinOp::IntDiv,
        Operator::Modulo => BinOp::Mod,
        Operator::Equal => BinOp::Eq,
        Operator::NotEqual => BinOp::Ne,
        Operator::Less => BinOp::Lt,
        Operator::LessEqual => BinOp::Le,
        Operator::Greater => BinOp::Gt,
        Operator::GreaterEqual => BinOp::Ge,
        Operator::And => BinOp::And,
        Operator::Or => BinOp::Or,
        // filtered out by `is_binary`
        Operator::Assign | Operator::Not | Operator::Dot => unreachable!("not a binary operator"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_common::ParseErrorKind;

    #[test]
    fn test_simple_assignment() {
        let ast = parse("x 🡨 5").expect("parse");
        assert_eq!(
            ast,
            vec![AstNode::Assign {
                target: Box::new(AstNode::ident("x")),
                value: Box::new(AstNode::number(5)),
            }]
        );
    }

    #[test]
    fn test_equality_is_not_assignment() {
        // `=` is the equality comparator; `x = 5` is never an assignment.
        let err = parse("x = 5").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert!(err.message.contains("'='"));
    }

    #[test]
    fn test_for_loop() {
        let ast = parse("for i 🡨 0 to n - 1 do begin s 🡨 s + i end").expect("parse");
        match &ast[0] {
            AstNode::For { var, body, .. } => {
                assert_eq!(var, "i");
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected for loop, got {:?}", other),
        }
    }

    #[test]
    fn test_while_requires_parens() {
        assert!(parse("while (i < n) do begin i 🡨 i + 1 end").is_ok());
        assert!(parse("while i < n do begin i 🡨 i + 1 end").is_err());
    }

    #[test]
    fn test_repeat_until() {
        let ast = parse("repeat i 🡨 i + 1 until (i >= n)").expect("parse");
        match &ast[0] {
            AstNode::Repeat { body, cond } => {
                assert_eq!(body.len(), 1);
                assert!(matches!(cond.as_ref(), AstNode::Binary { op: BinOp::Ge, .. }));
            }
            other => panic!("expected repeat, got {:?}", other),
        }
    }

    #[test]
    fn test_if_with_else() {
        let source = "if (x > 0) then begin return 1 end else begin return -1 end";
        let ast = parse(source).expect("parse");
        match &ast[0] {
            AstNode::If { else_branch, .. } => assert!(else_branch.is_some()),
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_if_without_else() {
        let ast = parse("if (x > 0) then begin return 1 end").expect("parse");
        match &ast[0] {
            AstNode::If { else_branch, .. } => assert!(else_branch.is_none()),
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_procedure_def_and_call() {
        let source = "suma(x, y)\nbegin\n    z 🡨 x + y\n    return z\nend\nCALL suma(5, 10)";
        let ast = parse(source).expect("parse");
        assert_eq!(ast.len(), 2);
        match &ast[0] {
            AstNode::ProcedureDef { name, params, body } => {
                assert_eq!(name, "suma");
                assert_eq!(params, &vec!["x".to_string(), "y".to_string()]);
                assert_eq!(body.len(), 2);
            }
            other => panic!("expected procedure, got {:?}", other),
        }
        assert!(matches!(&ast[1], AstNode::Call { name, args } if name == "suma" && args.len() == 2));
    }

    #[test]
    fn test_call_in_expression_position() {
        let source = "factorial(n)\nbegin\n    if (n <= 1) then\n    begin\n        return 1\n    end\n    return n * CALL factorial(n - 1)\nend";
        let ast = parse(source).expect("parse");
        let AstNode::ProcedureDef { body, .. } = &ast[0] else { panic!("expected procedure") };
        let AstNode::Return { value } = &body[1] else { panic!("expected return") };
        assert!(matches!(value.as_ref(), AstNode::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_array_and_field_targets() {
        let ast = parse("A[i] 🡨 A[i + 1]\np.edad 🡨 30").expect("parse");
        assert!(matches!(&ast[0], AstNode::Assign { target, .. } if matches!(target.as_ref(), AstNode::ArrayAccess { .. })));
        assert!(matches!(&ast[1], AstNode::Assign { target, .. } if matches!(target.as_ref(), AstNode::FieldAccess { .. })));
    }

    #[test]
    fn test_class_def_and_object_decl() {
        let ast = parse("class Persona { nombre edad }\nclass Persona p").expect("parse");
        assert_eq!(
            ast[0],
            AstNode::ClassDef {
                name: "Persona".to_string(),
                attributes: vec!["nombre".to_string(), "edad".to_string()],
            }
        );
        assert_eq!(
            ast[1],
            AstNode::ObjectDecl {
                class_name: "Persona".to_string(),
                name: "p".to_string(),
            }
        );
    }

    #[test]
    fn test_precedence() {
        let ast = parse("x 🡨 1 + 2 * 3").expect("parse");
        let AstNode::Assign { value, .. } = &ast[0] else { panic!("expected assign") };
        // 1 + (2 * 3), not (1 + 2) * 3
        let AstNode::Binary { op: BinOp::Add, rhs, .. } = value.as_ref() else { panic!("expected addition at the top") };
        assert!(matches!(rhs.as_ref(), AstNode::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_logical_precedence() {
        let ast = parse("x 🡨 a < b and not c").expect("parse");
        let AstNode::Assign { value, .. } = &ast[0] else { panic!("expected assign") };
        assert!(matches!(value.as_ref(), AstNode::Binary { op: BinOp::And, .. }));
    }

    #[test]
    fn test_intdiv_midpoint() {
        let ast = parse("mid 🡨 (low + high) div 2").expect("parse");
        let AstNode::Assign { value, .. } = &ast[0] else { panic!("expected assign") };
        assert!(matches!(value.as_ref(), AstNode::Binary { op: BinOp::IntDiv, .. }));
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse("while (x < n) do begin x 🡨 x + 1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_comment_statement() {
        let ast = parse("// swap the pair\ntemp 🡨 a").expect("parse");
        assert_eq!(ast[0], AstNode::Comment("swap the pair".to_string()));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let source = "bubble(A, n)\nbegin\n    for i 🡨 0 to n - 1 do\n    begin\n        for j 🡨 0 to n - 2 - i do\n        begin\n            if (A[j] > A[j + 1]) then\n            begin\n                t 🡨 A[j]\n                A[j] 🡨 A[j + 1]\n                A[j + 1] 🡨 t\n            end\n        end\n    end\nend";
        let first = parse(source).expect("parse");
        let second = parse(source).expect("parse");
        assert_eq!(first, second);
    }
}
