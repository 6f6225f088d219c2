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

//! Abstract syntax tree for the pseudocode dialect.
//!
//! One closed enum with one constructor per grammar production; every
//! traversal is an exhaustive match. Nodes own their children exclusively
//! (a tree, never a graph) and evaluation order is source order.

use serde::Serialize;
use std::fmt;

/// Literal values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Literal {
    Number(i64),
    Boolean(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Boolean(true) => write!(f, "T"),
            Literal::Boolean(false) => write!(f, "F"),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn is_comparison(&self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::IntDiv | BinOp::Mod)
    }

    /// The comparator with the opposite truth table, for comparison
    /// operators only.
    pub fn negated_comparison(&self) -> Option<BinOp> {
        match self {
            BinOp::Lt => Some(BinOp::Ge),
            BinOp::Gt => Some(BinOp::Le),
            BinOp::Le => Some(BinOp::Gt),
            BinOp::Ge => Some(BinOp::Lt),
            BinOp::Eq => Some(BinOp::Ne),
            BinOp::Ne => Some(BinOp::Eq),
            _ => None,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::IntDiv => "div",
            BinOp::Mod => "mod",
            BinOp::Eq => "=",
            BinOp::Ne => "≠",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        };
        write!(f, "{}", s)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnOp {
    Not,
    Neg,
    Ceil,
    Floor,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnOp::Not => "not",
            UnOp::Neg => "-",
            UnOp::Ceil => "ceil",
            UnOp::Floor => "floor",
        };
        write!(f, "{}", s)
    }
}

/// A node of the abstract syntax tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AstNode {
    /// `target 🡨 value`
    Assign { target: Box<AstNode>, value: Box<AstNode> },
    /// `for var 🡨 from to to_expr do begin body end`
    For {
        var: String,
        from: Box<AstNode>,
        to: Box<AstNode>,
        body: Vec<AstNode>,
    },
    /// `while (cond) do begin body end`
    While { cond: Box<AstNode>, body: Vec<AstNode> },
    /// `repeat body until (cond)`
    Repeat { body: Vec<AstNode>, cond: Box<AstNode> },
    /// `if (cond) then begin … end [else begin … end]`
    If {
        cond: Box<AstNode>,
        then_branch: Vec<AstNode>,
        else_branch: Option<Vec<AstNode>>,
    },
    /// `CALL name(args)`, in statement or expression position
    Call { name: String, args: Vec<AstNode> },
    /// `return value`
    Return { value: Box<AstNode> },
    /// `lhs op rhs`
    Binary { op: BinOp, lhs: Box<AstNode>, rhs: Box<AstNode> },
    /// `op value`
    Unary { op: UnOp, value: Box<AstNode> },
    /// `array[index]`
    ArrayAccess { array: String, index: Box<AstNode> },
    /// `object.field`
    FieldAccess { object: String, field: String },
    /// Number or boolean literal
    Literal(Literal),
    /// Bare identifier
    Identifier(String),
    /// `name(params) begin body end`
    ProcedureDef { name: String, params: Vec<String>, body: Vec<AstNode> },
    /// `class Name { attributes }`
    ClassDef { name: String, attributes: Vec<String> },
    /// `class Name ident`
    ObjectDecl { class_name: String, name: String },
    /// `// text`
    Comment(String),
}

impl AstNode {
    pub fn number(value: i64) -> Self {
        AstNode::Literal(Literal::Number(value))
    }

    pub fn boolean(value: bool) -> Self {
        AstNode::Literal(Literal::Boolean(value))
    }

    pub fn ident(name: &str) -> Self {
        AstNode::Identifier(name.to_string())
    }

    /// All direct children, in source order. Bodies contribute their
    /// statements; expressions contribute their operands.
    pub fn children(&self) -> Vec<&AstNode> {
        match self {
            AstNode::Assign { target, value } => vec![target.as_ref(), value.as_ref()],
            AstNode::For { from, to, body, .. } => {
                let mut out = vec![from.as_ref(), to.as_ref()];
                out.extend(body.iter());
                out
            }
            AstNode::While { cond, body } => {
                let mut out = vec![cond.as_ref()];
                out.extend(body.iter());
                out
            }
            AstNode::Repeat { body, cond } => {
                let mut out: Vec<&AstNode> = body.iter().collect();
                out.push(cond.as_ref());
                out
            }
            AstNode::If { cond, then_branch, else_branch } => {
                let mut out = vec![cond.as_ref()];
                out.extend(then_branch.iter());
                if let Some(else_branch) = else_branch {
                    out.extend(else_branch.iter());
                }
                out
            }
            AstNode::Call { args, .. } => args.iter().collect(),
            AstNode::Return { value } => vec![value.as_ref()],
            AstNode::Binary { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            AstNode::Unary { value, .. } => vec![value.as_ref()],
            AstNode::ArrayAccess { index, .. } => vec![index.as_ref()],
            AstNode::ProcedureDef { body, .. } => body.iter().collect(),
            AstNode::FieldAccess { .. } | AstNode::Literal(_) | AstNode::Identifier(_) | AstNode::ClassDef { .. } | AstNode::ObjectDecl { .. } | AstNode::Comment(_) => Vec::new(),
        }
    }

    /// Depth-first pre-order visit of this node and all descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a AstNode)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// True for nodes that only appear in expression position.
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            AstNode::Binary { .. } | AstNode::Unary { .. } | AstNode::ArrayAccess { .. } | AstNode::FieldAccess { .. } | AstNode::Literal(_) | AstNode::Identifier(_)
        )
    }

    /// Render an expression node back to surface-like syntax, for reports
    /// and derivation steps.
    pub fn render(&self) -> String {
        match self {
            AstNode::Literal(lit) => lit.to_string(),
            AstNode::Identifier(name) => name.clone(),
            AstNode::Binary { op, lhs, rhs } => format!("{} {} {}", lhs.render(), op, rhs.render()),
            AstNode::Unary { op: UnOp::Neg, value } => format!("-{}", value.render()),
            AstNode::Unary { op, value } => format!("{}({})", op, value.render()),
            AstNode::ArrayAccess { array, index } => format!("{}[{}]", array, index.render()),
            AstNode::FieldAccess { object, field } => format!("{}.{}", object, field),
            AstNode::Call { name, args } => {
                let rendered: Vec<String> = args.iter().map(|a| a.render()).collect();
                format!("{}({})", name, rendered.join(", "))
            }
            AstNode::Assign { target, value } => format!("{} 🡨 {}", target.render(), value.render()),
            AstNode::Return { value } => format!("return {}", value.render()),
            other => format!("{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparator_negation_table() {
        assert_eq!(BinOp::Lt.negated_comparison(), Some(BinOp::Ge));
        assert_eq!(BinOp::Gt.negated_comparison(), Some(BinOp::Le));
        assert_eq!(BinOp::Eq.negated_comparison(), Some(BinOp::Ne));
        assert_eq!(BinOp::And.negated_comparison(), None);
    }

    #[test]
    fn test_children_cover_branches() {
        let node = AstNode::If {
            cond: Box::new(AstNode::boolean(true)),
            then_branch: vec![AstNode::Return { value: Box::new(AstNode::number(1)) }],
            else_branch: Some(vec![AstNode::Return {
                value: Box::new(AstNode::Unary {
                    op: UnOp::Neg,
                    value: Box::new(AstNode::number(1)),
                }),
            }]),
        };
        assert_eq!(node.children().len(), 3);
    }

    #[test]
    fn test_walk_visits_nested_calls() {
        let node = AstNode::Return {
            value: Box::new(AstNode::Binary {
                op: BinOp::Mul,
                lhs: Box::new(AstNode::ident("n")),
                rhs: Box::new(AstNode::Call {
                    name: "factorial".to_string(),
                    args: vec![AstNode::Binary {
                        op: BinOp::Sub,
                        lhs: Box::new(AstNode::ident("n")),
                        rhs: Box::new(AstNode::number(1)),
                    }],
                }),
            }),
        };

        let mut calls = 0;
        node.walk(&mut |n| {
            if matches!(n, AstNode::Call { .. }) {
                calls += 1;
            }
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_render_round_trips_shape() {
        let expr = AstNode::Binary {
            op: BinOp::IntDiv,
            lhs: Box::new(AstNode::Binary {
                op: BinOp::Add,
                lhs: Box::new(AstNode::ident("low")),
                rhs: Box::new(AstNode::ident("high")),
            }),
            rhs: Box::new(AstNode::number(2)),
        };
        assert_eq!(expr.render(), "low + high div 2");
    }
}
