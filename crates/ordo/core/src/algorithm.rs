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

//! The `Algorithm` entity: one parsed program under analysis.

use ordo_common::{AlgorithmKind, ParseResult};
use ordo_parser::{parse, AstNode};
use tracing::info;

/// A parsed algorithm. Immutable after parse; created fresh per analysis
/// call and never shared across concurrent requests.
#[derive(Debug, Clone, PartialEq)]
pub struct Algorithm {
    pub name: String,
    pub source: String,
    pub kind: AlgorithmKind,
    pub ast: Vec<AstNode>,
}

impl Algorithm {
    /// Parse source text into an algorithm, detecting its kind.
    ///
    /// The procedure name is taken from the first procedure definition;
    /// a program without one keeps the caller-supplied name. A procedure
    /// that calls itself anywhere (not only in tail position) is
    /// recursive; everything else is iterative.
    pub fn parse(name: &str, source: &str) -> ParseResult<Self> {
        let ast = parse(source)?;
        let name = first_procedure_name(&ast).unwrap_or_else(|| name.to_string());
        let kind = if has_self_call(&ast, &name) { AlgorithmKind::Recursive } else { AlgorithmKind::Iterative };
        info!(algorithm = %name, ?kind, "parsed algorithm");
        Ok(Self {
            name,
            source: source.to_string(),
            kind,
            ast,
        })
    }
}

fn first_procedure_name(ast: &[AstNode]) -> Option<String> {
    ast.iter().find_map(|node| match node {
        AstNode::ProcedureDef { name, .. } => Some(name.clone()),
        _ => None,
    })
}

fn has_self_call(ast: &[AstNode], name: &str) -> bool {
    let mut found = false;
    for node in ast {
        node.walk(&mut |candidate| {
            if let AstNode::Call { name: callee, .. } = candidate {
                if callee.eq_ignore_ascii_case(name) {
                    found = true;
                }
            }
        });
    }
    found
}
