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

//! Best/worst/average case classification.
//!
//! Uniform when every guard that gates recursive work depends only on the
//! problem size (a fixed split like halving is uniform even when the guard
//! reads data, because both branches shrink the problem identically).
//! BestWorstAverage when the amount of recursive work depends on data
//! contents: an early exit triggered by finding a target, or a split whose
//! size comes out of another procedure (a partition).

use crate::cost::has_guarded_return;
use crate::recursion::RecursionAnalysis;
use ordo_common::{CostExpr, Degree, GrowthTerm, RecurrenceRelation, RecursiveTerm, Reduction};
use ordo_parser::AstNode;
use tracing::debug;

/// Why an algorithm diverges into cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseCause {
    /// A data-dependent guard can stop the work early
    EarlyExit,
    /// The split size is decided by data (partition quality)
    UnbalancedPartition,
}

/// Whether an algorithm exhibits distinct best/worst/average cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Uniform,
    BestWorstAverage { cause: CaseCause },
}

impl CaseMode {
    pub fn has_multiple_cases(&self) -> bool {
        matches!(self, CaseMode::BestWorstAverage { .. })
    }
}

/// One relation per case when the classifier reports divergence.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRelations {
    pub best: RecurrenceRelation,
    pub worst: RecurrenceRelation,
    pub average: RecurrenceRelation,
}

/// Decide the case mode for a recursive algorithm.
///
/// Divide-style recursion with a fixed divisor is uniform: whichever branch
/// a data comparison picks, the subproblem has the same size (binary
/// search, merge sort). Data decides the outcome only when the split comes
/// out of another procedure, or when a linear recursion can exit early
/// behind a data-dependent guard.
pub fn classify_cases(ast: &[AstNode], analysis: &RecursionAnalysis) -> CaseMode {
    if analysis.no_recursion() {
        // Iterative path: an early data-dependent return inside a loop
        if iterative_early_exit(ast) {
            return CaseMode::BestWorstAverage { cause: CaseCause::EarlyExit };
        }
        return CaseMode::Uniform;
    }

    if analysis.opaque_split {
        debug!("split size resolves through another procedure: best/worst/average diverge");
        return CaseMode::BestWorstAverage {
            cause: CaseCause::UnbalancedPartition,
        };
    }

    let fixed_divide = analysis.relation.uniform_divide().is_some();
    if !fixed_divide && has_data_dependent_exit(ast) {
        debug!("linear recursion with a data-dependent early exit: best/worst/average diverge");
        return CaseMode::BestWorstAverage { cause: CaseCause::EarlyExit };
    }

    CaseMode::Uniform
}

/// Build the per-case relations from the synthesized one.
pub fn case_relations(base: &RecurrenceRelation, mode: CaseMode) -> CaseRelations {
    match mode {
        CaseMode::Uniform => CaseRelations {
            best: base.clone(),
            worst: base.clone(),
            average: base.clone(),
        },
        CaseMode::BestWorstAverage { cause: CaseCause::EarlyExit } => CaseRelations {
            // Earliest exit: the target is found immediately
            best: RecurrenceRelation::trivial(CostExpr::constant(1.0)),
            worst: base.clone(),
            // Expected position halfway through: same dominant growth
            average: base.clone(),
        },
        CaseMode::BestWorstAverage {
            cause: CaseCause::UnbalancedPartition,
        } => {
            let work = partition_work(base);
            let balanced = RecurrenceRelation::new(vec![RecursiveTerm { count: 2, reduction: Reduction::Divide { divisor: 2 } }], work.clone());
            let unbalanced = RecurrenceRelation::new(vec![RecursiveTerm { count: 1, reduction: Reduction::Subtract { amount: 1 } }], work);
            CaseRelations {
                best: balanced.clone(),
                worst: unbalanced,
                average: balanced,
            }
        }
    }
}

/// Partition-style algorithms pay at least a linear scan per level.
fn partition_work(base: &RecurrenceRelation) -> CostExpr {
    let dominant = ordo_solver::dominant_term(&base.work);
    if dominant.is_constant() {
        CostExpr::from_term(GrowthTerm::poly(1.0, Degree::ONE))
    } else {
        base.work.clone()
    }
}

/// An iterative algorithm whose loop body can return early behind a guard
/// that reads data contents.
fn iterative_early_exit(ast: &[AstNode]) -> bool {
    let mut found = false;
    for node in ast {
        node.walk(&mut |candidate| {
            let body = match candidate {
                AstNode::For { body, .. } | AstNode::While { body, .. } | AstNode::Repeat { body, .. } => body,
                _ => return,
            };
            if has_guarded_return(body) && body_reads_data(body) {
                found = true;
            }
        });
    }
    found
}

/// A recursion guarded by a data read with an early return ahead of the
/// recursive work.
fn has_data_dependent_exit(ast: &[AstNode]) -> bool {
    let mut found = false;
    for node in ast {
        node.walk(&mut |candidate| {
            if let AstNode::If { cond, then_branch, .. } = candidate {
                let guard_reads_data = expr_reads_data(cond);
                let returns = then_branch.iter().any(|s| matches!(s, AstNode::Return { value } if !contains_call(value)));
                if guard_reads_data && returns {
                    found = true;
                }
            }
        });
    }
    found
}

fn body_reads_data(body: &[AstNode]) -> bool {
    body.iter().any(|stmt| {
        let mut reads = false;
        stmt.walk(&mut |node| {
            if matches!(node, AstNode::ArrayAccess { .. } | AstNode::FieldAccess { .. }) {
                reads = true;
            }
        });
        reads
    })
}

fn expr_reads_data(expr: &AstNode) -> bool {
    let mut reads = false;
    expr.walk(&mut |node| {
        if matches!(node, AstNode::ArrayAccess { .. } | AstNode::FieldAccess { .. }) {
            reads = true;
        }
    });
    reads
}

fn contains_call(expr: &AstNode) -> bool {
    let mut found = false;
    expr.walk(&mut |node| {
        if matches!(node, AstNode::Call { .. }) {
            found = true;
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recursion::analyze_recursion;
    use ordo_parser::parse;
    use ordo_solver::dominant_term;

    fn classify(source: &str, name: &str) -> CaseMode {
        let ast = parse(source).expect("parse");
        let analysis = analyze_recursion(&ast, name);
        classify_cases(&ast, &analysis)
    }

    #[test]
    fn test_binary_search_is_uniform() {
        let source = "bs(A, x, low, high)\nbegin\n    mid 🡨 (low + high) div 2\n    if (A[mid] < x) then\n    begin\n        return CALL bs(A, x, mid + 1, high)\n    end\n    else\n    begin\n        return CALL bs(A, x, low, mid - 1)\n    end\nend";
        assert_eq!(classify(source, "bs"), CaseMode::Uniform);
    }

    #[test]
    fn test_factorial_is_uniform() {
        let source = "factorial(n)\nbegin\n    if (n <= 1) then\n    begin\n        return 1\n    end\n    return n * CALL factorial(n - 1)\nend";
        assert_eq!(classify(source, "factorial"), CaseMode::Uniform);
    }

    #[test]
    fn test_partition_split_diverges() {
        let source = "qs(A, low, high)\nbegin\n    if (low < high) then\n    begin\n        p 🡨 CALL partition(A, low, high)\n        CALL qs(A, low, p - 1)\n        CALL qs(A, p + 1, high)\n    end\nend";
        assert_eq!(
            classify(source, "qs"),
            CaseMode::BestWorstAverage {
                cause: CaseCause::UnbalancedPartition
            }
        );
    }

    #[test]
    fn test_recursive_linear_search_diverges() {
        let source = "search(A, x, i, n)\nbegin\n    if (i >= n) then\n    begin\n        return -1\n    end\n    if (A[i] = x) then\n    begin\n        return i\n    end\n    return CALL search(A, x, i + 1, n)\nend";
        assert_eq!(classify(source, "search"), CaseMode::BestWorstAverage { cause: CaseCause::EarlyExit });
    }

    #[test]
    fn test_iterative_linear_search_diverges() {
        let source = "search(A, x, n)\nbegin\n    for i 🡨 0 to n - 1 do\n    begin\n        if (A[i] = x) then\n        begin\n            return i\n        end\n    end\n    return -1\nend";
        assert_eq!(classify(source, "search"), CaseMode::BestWorstAverage { cause: CaseCause::EarlyExit });
    }

    #[test]
    fn test_plain_iterative_loop_is_uniform() {
        let source = "sum(A, n)\nbegin\n    s 🡨 0\n    for i 🡨 0 to n - 1 do\n    begin\n        s 🡨 s + A[i]\n    end\n    return s\nend";
        assert_eq!(classify(source, "sum"), CaseMode::Uniform);
    }

    #[test]
    fn test_early_exit_relations() {
        let base = RecurrenceRelation::new(vec![RecursiveTerm { count: 1, reduction: Reduction::Subtract { amount: 1 } }], CostExpr::constant(1.0));
        let relations = case_relations(&base, CaseMode::BestWorstAverage { cause: CaseCause::EarlyExit });

        assert!(relations.best.is_trivial());
        assert_eq!(relations.worst, base);
        assert_eq!(relations.average, base);
    }

    #[test]
    fn test_partition_relations() {
        let base = RecurrenceRelation::new(vec![RecursiveTerm { count: 2, reduction: Reduction::Divide { divisor: 2 } }], CostExpr::constant(1.0));
        let relations = case_relations(&base, CaseMode::BestWorstAverage {
            cause: CaseCause::UnbalancedPartition,
        });

        // best/average: balanced split with linear partition work
        assert_eq!(relations.best.uniform_divide(), Some((2, 2)));
        assert_eq!(dominant_term(&relations.best.work).witness(), "n");
        // worst: fully unbalanced split
        assert_eq!(relations.worst.subtract_terms(), Some(vec![(1, 1)]));
    }

    #[test]
    fn test_uniform_relations_are_shared() {
        let base = RecurrenceRelation::new(vec![RecursiveTerm { count: 2, reduction: Reduction::Divide { divisor: 2 } }], CostExpr::constant(1.0));
        let relations = case_relations(&base, CaseMode::Uniform);
        assert_eq!(relations.best, relations.worst);
        assert_eq!(relations.worst, relations.average);
    }
}
