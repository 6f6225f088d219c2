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

//! Serializable analysis artifacts: loop descriptors, call sites, base
//! cases, recursion trees and the final complexity result. These cross the
//! collaborator boundary read-only; the narrative and diagram generators
//! consume them as JSON.

use crate::algebra::CostExpr;
use crate::error::AnalysisWarning;
use serde::Serialize;
use std::fmt;

/// Kind of algorithm under analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlgorithmKind {
    Iterative,
    Recursive,
}

/// Kind of syntactic loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopKind {
    For,
    While,
    Repeat,
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopKind::For => write!(f, "for"),
            LoopKind::While => write!(f, "while"),
            LoopKind::Repeat => write!(f, "repeat"),
        }
    }
}

/// Shape of a `for` range, classified from its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RangeShape {
    ZeroBasedToN,
    OneBasedToN,
    LinearToN,
    ZeroBased,
    OneBased,
    Custom,
}

/// One syntactic loop, regardless of how many times it runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopDescriptor {
    pub kind: LoopKind,
    /// Nesting depth, 1-based for top-level loops
    pub depth: u32,
    /// Sequential discovery index, 1-based
    pub index: usize,
    /// Control variable and bounds (for) or condition (while/repeat)
    pub control: String,
    /// Range classification; only `for` loops carry one
    pub range_shape: Option<RangeShape>,
    /// Discovery index of the enclosing loop, if nested
    pub parent: Option<usize>,
    /// Elementary-operation count of the loop body
    pub body_ops: u32,
}

/// Detected argument-reduction pattern of a recursive call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReductionPattern {
    DivideBy(u32),
    SubtractBy(u32),
    Unrecognized,
}

/// One self-call found anywhere in the procedure body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecursiveCallSite {
    pub callee: String,
    pub args: Vec<String>,
    pub pattern: ReductionPattern,
}

/// Origin of a base case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BaseCaseOrigin {
    /// The guarded branch contains a `return`
    Explicit,
    /// Negation of a guard whose branch only holds recursive work
    Implicit,
}

/// A condition under which recursion terminates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseCase {
    pub condition: String,
    pub origin: BaseCaseOrigin,
}

/// A node of the bounded recursion-tree sketch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    /// Symbolic subproblem size, e.g. `T(n/2)`
    pub label: String,
    pub depth: u32,
    /// Child indices into the arena; nodes are never mutated after creation
    pub children: Vec<usize>,
}

/// Arena-backed recursion tree, built to a bounded depth for visualization
/// only; the complexity derivation is algebraic.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct RecursionTree {
    pub nodes: Vec<TreeNode>,
}

impl RecursionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, wiring it into its parent's child list. Returns its index.
    pub fn add_node(&mut self, label: String, depth: u32, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(TreeNode { label, depth, children: Vec::new() });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(index);
        }
        index
    }

    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }
}

/// Asymptotic notation symbol, fixed by case: Ω best, O worst, Θ average
/// and uniform. Never inferred from the solved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Notation {
    BigO,
    BigOmega,
    BigTheta,
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notation::BigO => write!(f, "O"),
            Notation::BigOmega => write!(f, "Ω"),
            Notation::BigTheta => write!(f, "Θ"),
        }
    }
}

/// Which case a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaseLabel {
    Best,
    Worst,
    Average,
}

impl CaseLabel {
    /// The notation this case always reports.
    pub fn notation(&self) -> Notation {
        match self {
            CaseLabel::Best => Notation::BigOmega,
            CaseLabel::Worst => Notation::BigO,
            CaseLabel::Average => Notation::BigTheta,
        }
    }
}

impl fmt::Display for CaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseLabel::Best => write!(f, "best"),
            CaseLabel::Worst => write!(f, "worst"),
            CaseLabel::Average => write!(f, "average"),
        }
    }
}

/// The solved classification for one case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    pub case: CaseLabel,
    pub notation: Notation,
    /// Coefficient-free dominant witness, e.g. `n log n`
    pub complexity: String,
    /// Full closed form before the dominant term is taken
    pub closed_form: CostExpr,
    /// Name of the solving method that produced this case
    pub method: String,
    /// Ordered derivation trail of algebraic steps
    pub steps: Vec<String>,
}

impl CaseReport {
    /// Render as `O(n log n)`-style bound.
    pub fn bound(&self) -> String {
        format!("{}({})", self.notation, self.complexity)
    }
}

/// The complete analysis output for one algorithm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexityResult {
    pub algorithm: String,
    pub kind: AlgorithmKind,
    /// Whether best/worst/average diverge for this algorithm
    pub has_multiple_cases: bool,
    pub best: CaseReport,
    pub worst: CaseReport,
    pub average: CaseReport,
    // Diagnostic artifacts for the narrative/diagram collaborators
    pub loops: Vec<LoopDescriptor>,
    pub max_nesting_depth: u32,
    pub call_sites: Vec<RecursiveCallSite>,
    pub base_cases: Vec<BaseCase>,
    pub trees: Vec<RecursionTree>,
    pub warnings: Vec<AnalysisWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_notation_is_fixed() {
        assert_eq!(CaseLabel::Best.notation(), Notation::BigOmega);
        assert_eq!(CaseLabel::Worst.notation(), Notation::BigO);
        assert_eq!(CaseLabel::Average.notation(), Notation::BigTheta);
    }

    #[test]
    fn test_tree_arena_wiring() {
        let mut tree = RecursionTree::new();
        let root = tree.add_node("T(n)".to_string(), 0, None);
        let left = tree.add_node("T(n/2)".to_string(), 1, Some(root));
        let right = tree.add_node("T(n/2)".to_string(), 1, Some(root));

        assert_eq!(tree.nodes[root].children, vec![left, right]);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_bound_rendering() {
        let report = CaseReport {
            case: CaseLabel::Worst,
            notation: CaseLabel::Worst.notation(),
            complexity: "n^2".to_string(),
            closed_form: CostExpr::zero(),
            method: "summation".to_string(),
            steps: Vec::new(),
        };
        assert_eq!(report.bound(), "O(n^2)");
    }
}
