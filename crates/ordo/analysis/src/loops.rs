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

//! Loop discovery for the iterative analyzer.
//!
//! Depth-first traversal: entering a loop increments the current depth and
//! emits one descriptor per syntactic loop, regardless of how many times it
//! runs at runtime. `if` and procedure definitions are transparent: their
//! bodies are visited at unchanged depth. This stage is total over any
//! parsed AST; it cannot fail.

use crate::cost::block_units;
use ordo_common::{LoopDescriptor, LoopKind, RangeShape};
use ordo_parser::AstNode;
use tracing::debug;

/// Output of loop discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopAnalysis {
    pub loops: Vec<LoopDescriptor>,
    pub max_nesting_depth: u32,
}

/// Walk the AST and collect every syntactic loop with its nesting depth.
pub fn analyze_loops(ast: &[AstNode]) -> LoopAnalysis {
    let mut analyzer = LoopAnalyzer::default();
    analyzer.visit_block(ast, 0, None);
    debug!(loops = analyzer.loops.len(), depth = analyzer.max_depth, "loop discovery finished");
    LoopAnalysis {
        loops: analyzer.loops,
        max_nesting_depth: analyzer.max_depth,
    }
}

#[derive(Default)]
struct LoopAnalyzer {
    loops: Vec<LoopDescriptor>,
    max_depth: u32,
}

impl LoopAnalyzer {
    fn visit_block(&mut self, statements: &[AstNode], depth: u32, parent: Option<usize>) {
        for statement in statements {
            self.visit(statement, depth, parent);
        }
    }

    fn visit(&mut self, node: &AstNode, depth: u32, parent: Option<usize>) {
        match node {
            AstNode::For { var, from, to, body } => {
                let control = format!("{} 🡨 {} to {}", var, from.render(), to.render());
                let shape = range_shape(&from.render(), &to.render());
                let index = self.emit(LoopKind::For, depth, control, Some(shape), parent, body);
                self.visit_block(body, depth + 1, Some(index));
            }
            AstNode::While { cond, body } => {
                let index = self.emit(LoopKind::While, depth, cond.render(), None, parent, body);
                self.visit_block(body, depth + 1, Some(index));
            }
            AstNode::Repeat { body, cond } => {
                let index = self.emit(LoopKind::Repeat, depth, cond.render(), None, parent, body);
                self.visit_block(body, depth + 1, Some(index));
            }
            AstNode::If { then_branch, else_branch, .. } => {
                // Transparent: both branches at unchanged depth
                self.visit_block(then_branch, depth, parent);
                if let Some(else_branch) = else_branch {
                    self.visit_block(else_branch, depth, parent);
                }
            }
            AstNode::ProcedureDef { body, .. } => {
                self.visit_block(body, depth, parent);
            }
            // No other statement can contain a loop
            _ => {}
        }
    }

    fn emit(&mut self, kind: LoopKind, depth: u32, control: String, range_shape: Option<RangeShape>, parent: Option<usize>, body: &[AstNode]) -> usize {
        let current_depth = depth + 1;
        self.max_depth = self.max_depth.max(current_depth);
        let index = self.loops.len() + 1;
        let body_ops = block_units(body);
        self.loops.push(LoopDescriptor {
            kind,
            depth: current_depth,
            index,
            control,
            range_shape,
            parent,
            body_ops,
        });
        index
    }
}

/// Classify a `for` range from its rendered bounds.
fn range_shape(from: &str, to: &str) -> RangeShape {
    let to_lower = to.to_lowercase();
    let mentions_n = to_lower.contains('n') || to_lower.contains("length");
    match from {
        "0" => {
            if mentions_n {
                RangeShape::ZeroBasedToN
            } else {
                RangeShape::ZeroBased
            }
        }
        "1" => {
            if mentions_n {
                RangeShape::OneBasedToN
            } else {
                RangeShape::OneBased
            }
        }
        _ => {
            if mentions_n {
                RangeShape::LinearToN
            } else {
                RangeShape::Custom
            }
        }
    }
}
