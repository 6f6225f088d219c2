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

//! Master Theorem for `T(n) = aT(n/b) + f(n)`.
//!
//! The critical exponent is compared against the work term through exact
//! integer cross-powering, never floating logarithms: `d ⋛ log_b a` iff
//! `b^p ⋛ a^q` for `d = p/q`.

use crate::algebra::dominant_term;
use crate::strategy::{cmp_degree_vs_log, log_degree, SolveStrategy, StrategyKind, StrategyOutcome};
use ordo_common::{CostExpr, GrowthTerm, RecurrenceRelation};
use std::cmp::Ordering;

pub struct MasterTheorem;

impl SolveStrategy for MasterTheorem {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MasterTheorem
    }

    fn matches(&self, relation: &RecurrenceRelation) -> bool {
        relation.uniform_divide().is_some()
    }

    fn solve(&self, relation: &RecurrenceRelation) -> StrategyOutcome {
        let Some((a, b)) = relation.uniform_divide() else {
            return StrategyOutcome::inapplicable(self.kind(), "relation is not of the form T(n) = aT(n/b) + f(n)".to_string());
        };

        let work = if relation.work.is_zero() { CostExpr::constant(1.0) } else { relation.work.clone() };
        let f = dominant_term(&work);

        // An exponential work term breaks the theorem's polynomial
        // comparison; hand the relation to the tree fallback.
        if f.exp_base.is_some() {
            return StrategyOutcome::inapplicable(self.kind(), format!("work term {} is exponential; master theorem does not apply", f.witness()));
        }

        let critical = log_degree(a, b);
        let critical_term = GrowthTerm::poly(1.0, critical);

        let mut steps = vec![
            format!("parameters: a = {}, b = {}, f(n) = {}", a, b, work),
            format!("critical exponent: log_{}({}) = {}", b, a, critical),
            format!("compare f(n) against n^{}", critical),
        ];

        let (closed_form, case) = match cmp_degree_vs_log(f.degree, a, b) {
            Ordering::Less => {
                steps.push(format!("f(n) = {} grows strictly slower than n^{} → case 1", f.witness(), critical));
                (CostExpr::from_term(critical_term), 1)
            }
            Ordering::Equal => {
                let log_pow = f.log_pow + 1;
                steps.push(format!("f(n) = {} matches n^{} → case 2, a logarithmic factor is added", f.witness(), critical));
                (CostExpr::from_term(GrowthTerm::linearithmic(1.0, critical, log_pow)), 2)
            }
            Ordering::Greater => {
                steps.push(format!(
                    "f(n) = {} grows strictly faster than n^{} → case 3 (regularity holds for polynomial work)",
                    f.witness(),
                    critical
                ));
                (work.clone(), 3)
            }
        };

        let dominant = dominant_term(&closed_form);
        steps.push(format!("case {} conclusion: Θ({})", case, dominant.witness()));

        StrategyOutcome {
            method: self.kind(),
            closed_form,
            steps,
            applicable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_common::{Degree, RecursiveTerm, Reduction};

    fn divide_relation(a: u32, b: u32, work: CostExpr) -> RecurrenceRelation {
        RecurrenceRelation::new(vec![RecursiveTerm { count: a, reduction: Reduction::Divide { divisor: b } }], work)
    }

    #[test]
    fn test_case_1_table_entry() {
        // a=4, b=2, f(n)=n → Θ(n²)
        let relation = divide_relation(4, 2, CostExpr::from_term(GrowthTerm::poly(1.0, Degree::ONE)));
        let outcome = MasterTheorem.solve(&relation);
        assert!(outcome.applicable);
        assert_eq!(dominant_term(&outcome.closed_form).witness(), "n^2");
        assert!(outcome.steps.iter().any(|s| s.contains("case 1")));
    }

    #[test]
    fn test_case_2_table_entry() {
        // a=2, b=2, f(n)=n → Θ(n log n)
        let relation = divide_relation(2, 2, CostExpr::from_term(GrowthTerm::poly(1.0, Degree::ONE)));
        let outcome = MasterTheorem.solve(&relation);
        assert_eq!(dominant_term(&outcome.closed_form).witness(), "n log n");
        assert!(outcome.steps.iter().any(|s| s.contains("case 2")));
    }

    #[test]
    fn test_case_3_table_entry() {
        // a=2, b=4, f(n)=n^1.5 → Θ(n^1.5)
        let relation = divide_relation(2, 4, CostExpr::from_term(GrowthTerm::poly(1.0, Degree::new(3, 2))));
        let outcome = MasterTheorem.solve(&relation);
        assert_eq!(dominant_term(&outcome.closed_form).witness(), "n^1.5");
        assert!(outcome.steps.iter().any(|s| s.contains("case 3")));
    }

    #[test]
    fn test_binary_search_case_2() {
        // T(n) = T(n/2) + 1 → Θ(log n)
        let relation = divide_relation(1, 2, CostExpr::constant(1.0));
        let outcome = MasterTheorem.solve(&relation);
        let dominant = dominant_term(&outcome.closed_form);
        assert!(dominant.degree.is_zero());
        assert_eq!(dominant.log_pow, 1);
        assert_eq!(dominant.witness(), "log n");
    }

    #[test]
    fn test_strassen_like_irrational_exponent() {
        // T(n) = 7T(n/2) + n² → Θ(n^log_2 7) ≈ n^2.81
        let relation = divide_relation(7, 2, CostExpr::from_term(GrowthTerm::poly(1.0, Degree::from_int(2))));
        let outcome = MasterTheorem.solve(&relation);
        let dominant = dominant_term(&outcome.closed_form);
        assert!((dominant.degree.as_f64() - 2.81).abs() < 0.01);
    }

    #[test]
    fn test_exponential_work_is_inapplicable() {
        let relation = divide_relation(2, 2, CostExpr::from_term(GrowthTerm::exponential(1.0, 2.0)));
        let outcome = MasterTheorem.solve(&relation);
        assert!(!outcome.applicable);
    }

    #[test]
    fn test_extended_case_2_with_log_work() {
        // T(n) = 2T(n/2) + n log n → Θ(n log² n)
        let relation = divide_relation(2, 2, CostExpr::from_term(GrowthTerm::linearithmic(1.0, Degree::ONE, 1)));
        let outcome = MasterTheorem.solve(&relation);
        let dominant = dominant_term(&outcome.closed_form);
        assert_eq!(dominant.log_pow, 2);
        assert_eq!(dominant.degree, Degree::ONE);
    }
}
