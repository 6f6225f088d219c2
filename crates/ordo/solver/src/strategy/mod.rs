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

//! Recurrence strategy dispatcher.
//!
//! Strategies form an explicit ordered list; each one pattern-matches the
//! relation structurally and reports `applicable` in its outcome. The
//! dispatcher runs the first structural match and, if that strategy turns
//! out inapplicable, falls through to recursion-tree expansion, which is
//! defined for every relation shape. Selection is deterministic: identical
//! relations always take the same path.

mod characteristic;
mod direct;
mod master;
mod substitution;
mod tree_expansion;

pub use characteristic::CharacteristicEquation;
pub use direct::DirectExpression;
pub use master::MasterTheorem;
pub use substitution::IterativeSubstitution;
pub use tree_expansion::TreeExpansion;

use ordo_common::{AnalysisWarning, CostExpr, Degree, RecurrenceRelation};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// The available solving methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum StrategyKind {
    None,
    MasterTheorem,
    CharacteristicEquation,
    IterativeSubstitution,
    TreeExpansion,
}

impl StrategyKind {
    /// Human-readable method name carried on reports.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::None => "direct expression",
            StrategyKind::MasterTheorem => "master theorem",
            StrategyKind::CharacteristicEquation => "characteristic equation",
            StrategyKind::IterativeSubstitution => "iterative substitution",
            StrategyKind::TreeExpansion => "recursion tree",
        }
    }
}

/// Result of running one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome {
    pub method: StrategyKind,
    pub closed_form: CostExpr,
    pub steps: Vec<String>,
    pub applicable: bool,
}

impl StrategyOutcome {
    pub fn inapplicable(method: StrategyKind, reason: String) -> Self {
        Self {
            method,
            closed_form: CostExpr::zero(),
            steps: vec![reason],
            applicable: false,
        }
    }
}

/// A recurrence-solving strategy.
pub trait SolveStrategy {
    fn kind(&self) -> StrategyKind;
    /// Structural pattern match: can this strategy even be attempted?
    fn matches(&self, relation: &RecurrenceRelation) -> bool;
    /// Run the strategy. May still report `applicable = false` when the
    /// relation turns out to violate an assumption the structural match
    /// cannot see.
    fn solve(&self, relation: &RecurrenceRelation) -> StrategyOutcome;
}

fn strategies() -> Vec<Box<dyn SolveStrategy>> {
    vec![
        Box::new(DirectExpression),
        Box::new(MasterTheorem),
        Box::new(IterativeSubstitution),
        Box::new(CharacteristicEquation),
        Box::new(TreeExpansion),
    ]
}

/// Solve a recurrence relation.
///
/// Returns the outcome together with the warning recorded when the first
/// matching strategy declared itself inapplicable and the recursion-tree
/// fallback produced the classification instead.
pub fn solve_relation(relation: &RecurrenceRelation) -> (StrategyOutcome, Option<AnalysisWarning>) {
    let mut fell_through = false;
    for strategy in strategies() {
        if !strategy.matches(relation) {
            continue;
        }
        debug!(method = strategy.kind().name(), relation = %relation, "running strategy");
        let outcome = strategy.solve(relation);
        if outcome.applicable {
            let warning = if fell_through {
                warn!(relation = %relation, "primary strategy inapplicable, recursion-tree fallback used");
                Some(AnalysisWarning::UnresolvedRecurrence { relation: relation.to_string() })
            } else {
                None
            };
            return (outcome, warning);
        }
        fell_through = true;
    }
    // The tree strategy matches every relation, so this is unreachable in
    // practice; keep a defined answer anyway.
    let outcome = TreeExpansion.solve(relation);
    (outcome, Some(AnalysisWarning::UnresolvedRecurrence { relation: relation.to_string() }))
}

/// Exact rational exponent `p/q` with `b^p = a^q` when one exists with a
/// small denominator (so `log_b a = p/q`); otherwise the nearest rational
/// approximation of the logarithm.
pub(crate) fn log_degree(a: u32, b: u32) -> Degree {
    if a <= 1 {
        return Degree::ZERO;
    }
    let (a, b) = (a as i128, b as i128);
    for q in 1..=4i64 {
        if let Some(rhs) = a.checked_pow(q as u32) {
            let mut power: i128 = 1;
            for p in 1..=64i64 {
                power = match power.checked_mul(b) {
                    Some(v) => v,
                    None => break,
                };
                match power.cmp(&rhs) {
                    Ordering::Equal => return Degree::new(p, q),
                    Ordering::Greater => break,
                    Ordering::Less => {}
                }
            }
        }
    }
    Degree::approx((a as f64).ln() / (b as f64).ln())
}

/// Exact comparison of a rational polynomial degree `p/q` against
/// `log_b a`, by integer cross-powering: `p/q ⋛ log_b a ⇔ b^p ⋛ a^q`.
/// Overflowing magnitudes fall back to logarithms of exact integers.
pub(crate) fn cmp_degree_vs_log(degree: Degree, a: u32, b: u32) -> Ordering {
    let (p, q) = (degree.numerator(), degree.denominator());
    if p < 0 {
        return Ordering::Less;
    }
    let lhs = u32::try_from(p).ok().and_then(|p| (b as i128).checked_pow(p));
    let rhs = u32::try_from(q).ok().and_then(|q| (a as i128).checked_pow(q));
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
        _ => {
            let lhs = p as f64 * (b as f64).ln();
            let rhs = q as f64 * (a as f64).ln();
            lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_common::{GrowthTerm, RecursiveTerm, Reduction};

    #[test]
    fn test_log_degree_exact_cases() {
        assert_eq!(log_degree(4, 2), Degree::from_int(2));
        assert_eq!(log_degree(2, 2), Degree::ONE);
        assert_eq!(log_degree(2, 4), Degree::new(1, 2));
        assert_eq!(log_degree(8, 2), Degree::from_int(3));
        assert_eq!(log_degree(1, 2), Degree::ZERO);
    }

    #[test]
    fn test_log_degree_irrational_approximation() {
        // log_2 3 ≈ 1.585
        let degree = log_degree(3, 2);
        assert!((degree.as_f64() - 1.585).abs() < 0.01);
    }

    #[test]
    fn test_cmp_degree_vs_log() {
        // degree 1 vs log_2 4 = 2 → less
        assert_eq!(cmp_degree_vs_log(Degree::ONE, 4, 2), Ordering::Less);
        // degree 1 vs log_2 2 = 1 → equal
        assert_eq!(cmp_degree_vs_log(Degree::ONE, 2, 2), Ordering::Equal);
        // degree 1.5 vs log_4 2 = 0.5 → greater
        assert_eq!(cmp_degree_vs_log(Degree::new(3, 2), 2, 4), Ordering::Greater);
    }

    #[test]
    fn test_dispatcher_routes_trivial_to_direct() {
        let relation = RecurrenceRelation::trivial(CostExpr::constant(1.0));
        let (outcome, warning) = solve_relation(&relation);
        assert_eq!(outcome.method, StrategyKind::None);
        assert!(outcome.applicable);
        assert!(warning.is_none());
    }

    #[test]
    fn test_dispatcher_routes_divide_to_master() {
        let relation = RecurrenceRelation::new(
            vec![RecursiveTerm { count: 2, reduction: Reduction::Divide { divisor: 2 } }],
            CostExpr::from_term(GrowthTerm::poly(1.0, Degree::ONE)),
        );
        let (outcome, _) = solve_relation(&relation);
        assert_eq!(outcome.method, StrategyKind::MasterTheorem);
    }

    #[test]
    fn test_dispatcher_routes_mixed_to_tree() {
        let relation = RecurrenceRelation::new(
            vec![
                RecursiveTerm { count: 1, reduction: Reduction::Divide { divisor: 2 } },
                RecursiveTerm { count: 1, reduction: Reduction::Subtract { amount: 1 } },
            ],
            CostExpr::constant(1.0),
        );
        let (outcome, warning) = solve_relation(&relation);
        assert_eq!(outcome.method, StrategyKind::TreeExpansion);
        // Tree was the natural structural match, not a fallback.
        assert!(warning.is_none());
    }

    #[test]
    fn test_dispatcher_is_deterministic() {
        let relation = RecurrenceRelation::new(vec![RecursiveTerm { count: 1, reduction: Reduction::Subtract { amount: 1 } }], CostExpr::constant(1.0));
        let (first, _) = solve_relation(&relation);
        let (second, _) = solve_relation(&relation);
        assert_eq!(first, second);
    }
}
