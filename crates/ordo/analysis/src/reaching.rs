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

//! Reaching definitions over the statement sequence.
//!
//! One explicit forward pass produces a variable → last-assignment map
//! consulted by the recursive analyzer when it resolves call-site
//! arguments; a later assignment to the same variable kills the earlier
//! one. Branch bodies are folded in source order, which is the
//! conservative reading for the argument-pattern search.

use ordo_parser::AstNode;
use std::collections::HashMap;

/// Variable → most recent assigned expression.
#[derive(Debug, Clone, Default)]
pub struct ReachingDefinitions {
    defs: HashMap<String, AstNode>,
}

impl ReachingDefinitions {
    /// Run the pass over a statement sequence.
    pub fn compute(statements: &[AstNode]) -> Self {
        let mut pass = Self::default();
        pass.visit_block(statements);
        pass
    }

    /// The expression most recently assigned to `name`, if any.
    pub fn resolve(&self, name: &str) -> Option<&AstNode> {
        self.defs.get(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    fn visit_block(&mut self, statements: &[AstNode]) {
        for stmt in statements {
            self.visit(stmt);
        }
    }

    fn visit(&mut self, stmt: &AstNode) {
        match stmt {
            AstNode::Assign { target, value } => {
                if let AstNode::Identifier(name) = target.as_ref() {
                    // gen: record the definition, killing any previous one
                    self.defs.insert(name.clone(), value.as_ref().clone());
                }
            }
            AstNode::For { var, from, body, .. } => {
                self.defs.insert(var.clone(), from.as_ref().clone());
                self.visit_block(body);
            }
            AstNode::While { body, .. } | AstNode::Repeat { body, .. } => self.visit_block(body),
            AstNode::If { then_branch, else_branch, .. } => {
                self.visit_block(then_branch);
                if let Some(else_branch) = else_branch {
                    self.visit_block(else_branch);
                }
            }
            AstNode::ProcedureDef { body, .. } => self.visit_block(body),
            _ => {}
        }
    }
}

/// Find the expression assigned to `name` anywhere in a block, nested
/// scopes included. Used for loop-update detection, where only the
/// existence and shape of the update matter.
pub fn find_assignment<'a>(body: &'a [AstNode], name: &str) -> Option<&'a AstNode> {
    for stmt in body {
        let mut found: Option<&AstNode> = None;
        stmt.walk(&mut |node| {
            if found.is_none() {
                if let AstNode::Assign { target, value } = node {
                    if matches!(target.as_ref(), AstNode::Identifier(t) if t == name) {
                        found = Some(value.as_ref());
                    }
                }
            }
        });
        if found.is_some() {
            return found;
        }
    }
    None
}
