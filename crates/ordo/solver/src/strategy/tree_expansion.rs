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

//! Recursion-tree expansion: the universal fallback, defined for every
//! relation shape.
//!
//! Per-level work forms a geometric progression with ratio
//! `q = Σ cᵢ / bᵢ^d` for divide relations of work degree `d`: a shrinking
//! ratio leaves the root's work dominant, ratio 1 multiplies by the number
//! of levels, and a growing ratio makes the leaves dominate with exponent
//! `α` solving `Σ cᵢ·bᵢ^(−α) = 1`.

use crate::algebra::dominant_term;
use crate::strategy::{log_degree, SolveStrategy, StrategyKind, StrategyOutcome};
use ordo_common::{CostExpr, Degree, GrowthTerm, RecurrenceRelation, Reduction};

const EPS: f64 = 1e-9;

pub struct TreeExpansion;

impl SolveStrategy for TreeExpansion {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TreeExpansion
    }

    fn matches(&self, _relation: &RecurrenceRelation) -> bool {
        true
    }

    fn solve(&self, relation: &RecurrenceRelation) -> StrategyOutcome {
        let work = if relation.work.is_zero() { CostExpr::constant(1.0) } else { relation.work.clone() };
        let f = dominant_term(&work);
        let mut steps = vec![format!("expand {} level by level", relation)];

        if relation.is_trivial() {
            steps.push("no recursive terms; the tree is a single node".to_string());
            let witness = f.witness();
            steps.push(format!("total work: {}", witness));
            return StrategyOutcome {
                method: self.kind(),
                closed_form: work,
                steps,
                applicable: true,
            };
        }

        let has_subtract = relation.terms.iter().any(|t| matches!(t.reduction, Reduction::Subtract { .. }));
        let closed_form = if has_subtract {
            solve_subtract_shape(relation, &f, &mut steps)
        } else {
            solve_divide_shape(relation, &f, &mut steps)
        };

        let witness = dominant_term(&closed_form).witness();
        steps.push(format!("dominant term across all levels: {}", witness));

        StrategyOutcome {
            method: self.kind(),
            closed_form,
            steps,
            applicable: true,
        }
    }
}

/// Divide-only relations, including unbalanced divisor mixes that the
/// Master Theorem's uniformity assumption rejects.
fn solve_divide_shape(relation: &RecurrenceRelation, f: &GrowthTerm, steps: &mut Vec<String>) -> CostExpr {
    let d = f.degree.as_f64();
    let mut ratio = 0.0f64;
    for term in &relation.terms {
        if let Reduction::Divide { divisor } = term.reduction {
            ratio += term.count as f64 / (divisor as f64).powf(d);
        }
    }
    steps.push(format!("work at level j is q^j · f(n) with ratio q = Σ cᵢ/bᵢ^d = {:.4}", ratio));
    steps.push(format!("level 0: f(n);  level 1: {:.2}·f(n);  level 2: {:.2}·f(n)", ratio, ratio * ratio));

    if ratio < 1.0 - EPS {
        steps.push("the geometric series shrinks; the root level dominates → Θ(f(n))".to_string());
        CostExpr::from_term(GrowthTerm { coeff: 1.0, ..f.clone() })
    } else if ratio < 1.0 + EPS {
        steps.push("every level contributes equally; multiply f(n) by the log n levels".to_string());
        CostExpr::from_term(GrowthTerm {
            coeff: 1.0,
            log_pow: f.log_pow + 1,
            ..f.clone()
        })
    } else {
        // Leaves dominate: α solves Σ cᵢ·bᵢ^(−α) = 1
        let alpha = leaf_exponent(relation);
        steps.push(format!("the series grows; the leaf level dominates with exponent α = {:.4}", alpha));
        let degree = exact_or_approx_degree(relation, alpha);
        CostExpr::from_term(GrowthTerm::poly(1.0, degree))
    }
}

/// Subtract-involving relations: a single chain gives one extra polynomial
/// degree; a fan-out of two or more branches over a depth-n chain is
/// exponential.
fn solve_subtract_shape(relation: &RecurrenceRelation, f: &GrowthTerm, steps: &mut Vec<String>) -> CostExpr {
    let total: u32 = relation.total_calls();
    let k_min = relation
        .terms
        .iter()
        .filter_map(|t| match t.reduction {
            Reduction::Subtract { amount } => Some(amount.max(1)),
            Reduction::Divide { .. } => None,
        })
        .min()
        .unwrap_or(1);

    if total <= 1 {
        steps.push(format!("a single chain of n/{} levels, each contributing f", k_min));
        let degree = f.degree.add(Degree::ONE);
        CostExpr::from_term(GrowthTerm {
            coeff: 1.0 / k_min as f64,
            degree,
            log_pow: f.log_pow,
            exp_base: None,
        })
    } else {
        let base = (total as f64).powf(1.0 / k_min as f64);
        steps.push(format!("each level fans out into {} subproblems over a depth-n chain → {}^n nodes (upper bound)", total, fmt_base(base)));
        CostExpr::from_term(GrowthTerm::exponential(1.0, base))
    }
}

fn leaf_exponent(relation: &RecurrenceRelation) -> f64 {
    let value = |alpha: f64| -> f64 {
        relation
            .terms
            .iter()
            .map(|t| match t.reduction {
                Reduction::Divide { divisor } => t.count as f64 * (divisor as f64).powf(-alpha),
                Reduction::Subtract { .. } => 0.0,
            })
            .sum()
    };

    let (mut lo, mut hi) = (0.0f64, 64.0f64);
    for _ in 0..200 {
        let mid = (lo + hi) / 2.0;
        if value(mid) > 1.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}

/// Uniform divides recover the exact rational `log_b a`; unbalanced mixes
/// keep the numeric exponent.
fn exact_or_approx_degree(relation: &RecurrenceRelation, alpha: f64) -> Degree {
    if let Some((a, b)) = relation.uniform_divide() {
        log_degree(a, b)
    } else {
        Degree::approx(alpha)
    }
}

fn fmt_base(base: f64) -> String {
    if (base - base.round()).abs() < 1e-9 {
        format!("{}", base.round() as i64)
    } else {
        format!("{:.2}", base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_common::RecursiveTerm;

    fn relation(terms: Vec<(u32, Reduction)>, work: CostExpr) -> RecurrenceRelation {
        RecurrenceRelation::new(terms.into_iter().map(|(count, reduction)| RecursiveTerm { count, reduction }).collect(), work)
    }

    #[test]
    fn test_root_dominated_series() {
        // T(n) = T(n/2) + n: q = 1/2 < 1 → Θ(n)
        let r = relation(vec![(1, Reduction::Divide { divisor: 2 })], CostExpr::from_term(GrowthTerm::poly(1.0, Degree::ONE)));
        let outcome = TreeExpansion.solve(&r);
        assert_eq!(dominant_term(&outcome.closed_form).witness(), "n");
    }

    #[test]
    fn test_balanced_series_adds_log() {
        // T(n) = 2T(n/2) + n: q = 1 → Θ(n log n)
        let r = relation(vec![(2, Reduction::Divide { divisor: 2 })], CostExpr::from_term(GrowthTerm::poly(1.0, Degree::ONE)));
        let outcome = TreeExpansion.solve(&r);
        assert_eq!(dominant_term(&outcome.closed_form).witness(), "n log n");
    }

    #[test]
    fn test_leaf_dominated_series() {
        // T(n) = 4T(n/2) + n: q = 2 > 1 → Θ(n²) via the exact log_2 4
        let r = relation(vec![(4, Reduction::Divide { divisor: 2 })], CostExpr::from_term(GrowthTerm::poly(1.0, Degree::ONE)));
        let outcome = TreeExpansion.solve(&r);
        assert_eq!(dominant_term(&outcome.closed_form).witness(), "n^2");
    }

    #[test]
    fn test_unbalanced_divide_mix() {
        // T(n) = T(n/3) + T(n/4) + n: Σ 1/3 + 1/4 < 1 → Θ(n)
        let r = relation(
            vec![(1, Reduction::Divide { divisor: 3 }), (1, Reduction::Divide { divisor: 4 })],
            CostExpr::from_term(GrowthTerm::poly(1.0, Degree::ONE)),
        );
        let outcome = TreeExpansion.solve(&r);
        assert_eq!(dominant_term(&outcome.closed_form).witness(), "n");
    }

    #[test]
    fn test_single_subtract_chain() {
        // T(n) = T(n-1) + n → degree 2
        let r = relation(vec![(1, Reduction::Subtract { amount: 1 })], CostExpr::from_term(GrowthTerm::poly(1.0, Degree::ONE)));
        let outcome = TreeExpansion.solve(&r);
        assert_eq!(dominant_term(&outcome.closed_form).witness(), "n^2");
    }

    #[test]
    fn test_subtract_fan_out_is_exponential() {
        // Fibonacci fallback shape: 2 branches → 2^n upper bound
        let r = relation(
            vec![(1, Reduction::Subtract { amount: 1 }), (1, Reduction::Subtract { amount: 2 })],
            CostExpr::zero(),
        );
        let outcome = TreeExpansion.solve(&r);
        assert_eq!(dominant_term(&outcome.closed_form).exp_base, Some(2.0));
    }

    #[test]
    fn test_always_matches() {
        let r = relation(vec![(1, Reduction::Divide { divisor: 2 }), (1, Reduction::Subtract { amount: 1 })], CostExpr::constant(1.0));
        assert!(TreeExpansion.matches(&r));
        assert!(TreeExpansion.solve(&r).applicable);
    }

    #[test]
    fn test_trivial_relation() {
        let r = RecurrenceRelation::trivial(CostExpr::constant(2.0));
        let outcome = TreeExpansion.solve(&r);
        assert!(dominant_term(&outcome.closed_form).is_constant());
    }
}
