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

//! Iterative substitution (expansion) for `T(n) = T(n−k) + f(n)`.
//!
//! Unrolls the recurrence symbolically, identifies the pattern
//! `T(n−jk) + Σ f`, substitutes the base case at `j = (n−1)/k`, and closes
//! the remaining sum through the algebra engine.

use crate::algebra::{dominant_term, sum_closed_form};
use crate::strategy::{SolveStrategy, StrategyKind, StrategyOutcome};
use ordo_common::{Bound, CostExpr, GrowthTerm, RecurrenceRelation, SumExpr};

pub struct IterativeSubstitution;

impl SolveStrategy for IterativeSubstitution {
    fn kind(&self) -> StrategyKind {
        StrategyKind::IterativeSubstitution
    }

    /// A single recursive term `T(n−k)` with coefficient 1; coefficients
    /// above 1 belong to the characteristic equation.
    fn matches(&self, relation: &RecurrenceRelation) -> bool {
        match relation.subtract_terms() {
            Some(pairs) => pairs.len() == 1 && pairs[0].0 == 1,
            None => false,
        }
    }

    fn solve(&self, relation: &RecurrenceRelation) -> StrategyOutcome {
        let Some(pairs) = relation.subtract_terms() else {
            return StrategyOutcome::inapplicable(self.kind(), "relation is not a single-term subtraction".to_string());
        };
        let k = pairs[0].1 as i64;
        let work = if relation.work.is_zero() { CostExpr::constant(1.0) } else { relation.work.clone() };
        let work_dominant = dominant_term(&work);

        let mut steps = Vec::new();
        let f = work.to_string();
        steps.push(format!("expand the recurrence: T(n) = T(n-{}) + {}", k, f));
        steps.push(format!("T(n) = T(n-{}) + 2·({})  after two substitutions", 2 * k, f));
        steps.push(format!("T(n) = T(n-{}) + 3·({})  after three substitutions", 3 * k, f));
        steps.push(format!("pattern after j substitutions: T(n) = T(n-{}j) + Σ work", k));
        steps.push(format!("base case T(1) = {} is reached at j = (n-1)/{}", relation.base_value, k));

        let closed_form = if work_dominant.is_constant() {
            // T(n) = T(n-k) + c closes to (c/k)·n + base
            let c = work_dominant_coeff(&work);
            let mut expr = CostExpr::from_term(GrowthTerm::poly(c / k as f64, ordo_common::Degree::ONE));
            expr.push(GrowthTerm::constant(relation.base_value));
            steps.push(format!("substitute the base case: T(n) = T(1) + {}·(n-1)/{} ≈ {}", fmt(c), k, expr));
            expr
        } else {
            // Accumulated work Σ_{j=1}^{n} f(j) closed by the algebra engine
            let mut accumulated = Vec::new();
            for term in &work.terms {
                if term.exp_base.is_some() {
                    accumulated.push(SumExpr::Pow2 { coeff: term.coeff, var: "j".to_string() });
                } else {
                    accumulated.push(SumExpr::var_power(term.coeff, "j", term.degree.as_f64().round() as u32));
                }
            }
            let closed = sum_closed_form(&[SumExpr::sum("j", Bound::constant(1), Bound::of_var("n"), accumulated)]);
            steps.push(format!("accumulated work: Σ(j=1,n)[{}]", f));
            steps.extend(closed.steps.clone());
            let mut expr = closed.expr.scaled(1.0 / k as f64);
            expr.push(GrowthTerm::constant(relation.base_value));
            expr
        };

        let witness = dominant_term(&closed_form).witness();
        steps.push(format!("closed form {} → O({})", closed_form, witness));

        StrategyOutcome {
            method: self.kind(),
            closed_form,
            steps,
            applicable: true,
        }
    }
}

fn work_dominant_coeff(work: &CostExpr) -> f64 {
    work.terms.iter().find(|t| t.is_constant()).map(|t| t.coeff).unwrap_or(1.0)
}

fn fmt(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.2}", value)
    }
}
