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

//! Trivial path: relations with no recursive terms classify directly from
//! their work expression.

use crate::algebra::dominant_term;
use crate::strategy::{SolveStrategy, StrategyKind, StrategyOutcome};
use ordo_common::{CostExpr, GrowthTerm, RecurrenceRelation};

pub struct DirectExpression;

impl DirectExpression {
    fn describe(term: &GrowthTerm) -> String {
        if term.exp_base.is_some() {
            "exponential".to_string()
        } else if term.degree.is_zero() && term.log_pow == 0 {
            "constant".to_string()
        } else if term.degree.is_zero() {
            "logarithmic".to_string()
        } else if term.log_pow > 0 {
            "linearithmic".to_string()
        } else {
            match term.degree.numerator() {
                1 if term.degree.is_integer() => "linear".to_string(),
                2 if term.degree.is_integer() => "quadratic".to_string(),
                3 if term.degree.is_integer() => "cubic".to_string(),
                _ => format!("polynomial of degree {}", term.degree),
            }
        }
    }
}

impl SolveStrategy for DirectExpression {
    fn kind(&self) -> StrategyKind {
        StrategyKind::None
    }

    fn matches(&self, relation: &RecurrenceRelation) -> bool {
        relation.is_trivial()
    }

    fn solve(&self, relation: &RecurrenceRelation) -> StrategyOutcome {
        let closed_form = if relation.work.is_zero() {
            CostExpr::constant(relation.base_value)
        } else {
            relation.work.clone().normalized()
        };
        let dominant = dominant_term(&closed_form);

        let steps = vec![
            format!("{} has no recursive terms", relation),
            format!("the expression is {}; its dominant term is {}", Self::describe(&dominant), dominant.witness()),
        ];

        StrategyOutcome {
            method: StrategyKind::None,
            closed_form,
            steps,
            applicable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_common::Degree;

    #[test]
    fn test_constant_expression() {
        let relation = RecurrenceRelation::trivial(CostExpr::constant(5.0));
        let outcome = DirectExpression.solve(&relation);
        assert!(outcome.applicable);
        assert!(dominant_term(&outcome.closed_form).is_constant());
        assert!(outcome.steps.iter().any(|s| s.contains("constant")));
    }

    #[test]
    fn test_quadratic_expression() {
        let relation = RecurrenceRelation::trivial(CostExpr::from_term(GrowthTerm::poly(3.0, Degree::from_int(2))));
        let outcome = DirectExpression.solve(&relation);
        assert_eq!(dominant_term(&outcome.closed_form).witness(), "n^2");
        assert!(outcome.steps.iter().any(|s| s.contains("quadratic")));
    }

    #[test]
    fn test_zero_work_falls_back_to_base_value() {
        let relation = RecurrenceRelation::trivial(CostExpr::zero());
        let outcome = DirectExpression.solve(&relation);
        assert!(dominant_term(&outcome.closed_form).is_constant());
    }

    #[test]
    fn test_does_not_match_recursive_relations() {
        use ordo_common::{RecursiveTerm, Reduction};
        let relation = RecurrenceRelation::new(vec![RecursiveTerm { count: 1, reduction: Reduction::Subtract { amount: 1 } }], CostExpr::constant(1.0));
        assert!(!DirectExpression.matches(&relation));
    }
}
