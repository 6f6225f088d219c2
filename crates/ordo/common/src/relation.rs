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

//! Structured recurrence relations.
//!
//! A relation is never a string to be re-parsed: strategies pattern-match on
//! this representation directly.

use crate::algebra::CostExpr;
use serde::Serialize;
use std::fmt;

/// How a recursive call shrinks its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Reduction {
    /// Subproblem of size `n / divisor`
    Divide { divisor: u32 },
    /// Subproblem of size `n - amount`
    Subtract { amount: u32 },
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reduction::Divide { divisor } => write!(f, "n/{}", divisor),
            Reduction::Subtract { amount } => write!(f, "n-{}", amount),
        }
    }
}

/// One group of identical recursive terms: `count · T(reduced n)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecursiveTerm {
    pub count: u32,
    pub reduction: Reduction,
}

/// A recurrence relation `T(n) = Σ count·T(reduced) + work`, with the base
/// value `T(base) = base_value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurrenceRelation {
    pub terms: Vec<RecursiveTerm>,
    pub work: CostExpr,
    pub base_value: f64,
}

impl RecurrenceRelation {
    pub fn new(terms: Vec<RecursiveTerm>, work: CostExpr) -> Self {
        Self { terms, work, base_value: 1.0 }
    }

    /// A relation with no recursive terms: `T(n) = work`.
    pub fn trivial(work: CostExpr) -> Self {
        Self::new(Vec::new(), work)
    }

    /// Total number of recursive calls per invocation.
    pub fn total_calls(&self) -> u32 {
        self.terms.iter().map(|t| t.count).sum()
    }

    pub fn is_trivial(&self) -> bool {
        self.terms.is_empty()
    }

    /// If every term divides by the same divisor, returns `(a, b)` for the
    /// Master-Theorem form `T(n) = aT(n/b) + f(n)`.
    pub fn uniform_divide(&self) -> Option<(u32, u32)> {
        let mut divisor = None;
        for term in &self.terms {
            match term.reduction {
                Reduction::Divide { divisor: b } => match divisor {
                    None => divisor = Some(b),
                    Some(existing) if existing == b => {}
                    Some(_) => return None,
                },
                Reduction::Subtract { .. } => return None,
            }
        }
        divisor.filter(|b| *b > 1).map(|b| (self.total_calls(), b))
    }

    /// If every term subtracts a constant, returns `(count, amount)` pairs
    /// ordered by amount, i.e. the coefficients of a linear recurrence.
    pub fn subtract_terms(&self) -> Option<Vec<(u32, u32)>> {
        let mut out = Vec::new();
        for term in &self.terms {
            match term.reduction {
                Reduction::Subtract { amount } => out.push((term.count, amount)),
                Reduction::Divide { .. } => return None,
            }
        }
        if out.is_empty() {
            return None;
        }
        out.sort_by_key(|(_, amount)| *amount);
        Some(out)
    }

    /// True when both divide and subtract reductions appear.
    pub fn is_mixed(&self) -> bool {
        !self.terms.is_empty() && self.uniform_divide().is_none() && self.subtract_terms().is_none()
    }
}

impl fmt::Display for RecurrenceRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T(n) = ")?;
        if self.terms.is_empty() {
            return write!(f, "{}", self.work);
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            if term.count == 1 {
                write!(f, "T({})", term.reduction)?;
            } else {
                write!(f, "{}T({})", term.count, term.reduction)?;
            }
        }
        if !self.work.is_zero() {
            write!(f, " + {}", self.work)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Degree, GrowthTerm};

    fn linear_work() -> CostExpr {
        CostExpr::from_term(GrowthTerm::poly(1.0, Degree::ONE))
    }

    #[test]
    fn test_uniform_divide_detection() {
        let relation = RecurrenceRelation::new(vec![RecursiveTerm { count: 2, reduction: Reduction::Divide { divisor: 2 } }], linear_work());
        assert_eq!(relation.uniform_divide(), Some((2, 2)));
        assert!(relation.subtract_terms().is_none());
    }

    #[test]
    fn test_subtract_terms_ordering() {
        let relation = RecurrenceRelation::new(
            vec![
                RecursiveTerm { count: 1, reduction: Reduction::Subtract { amount: 2 } },
                RecursiveTerm { count: 1, reduction: Reduction::Subtract { amount: 1 } },
            ],
            CostExpr::zero(),
        );
        assert_eq!(relation.subtract_terms(), Some(vec![(1, 1), (1, 2)]));
        assert!(!relation.is_mixed());
    }

    #[test]
    fn test_mixed_relation() {
        let relation = RecurrenceRelation::new(
            vec![
                RecursiveTerm { count: 1, reduction: Reduction::Divide { divisor: 2 } },
                RecursiveTerm { count: 1, reduction: Reduction::Subtract { amount: 1 } },
            ],
            CostExpr::zero(),
        );
        assert!(relation.is_mixed());
    }

    #[test]
    fn test_display() {
        let relation = RecurrenceRelation::new(vec![RecursiveTerm { count: 2, reduction: Reduction::Divide { divisor: 2 } }], linear_work());
        assert_eq!(relation.to_string(), "T(n) = 2T(n/2) + n");

        let trivial = RecurrenceRelation::trivial(CostExpr::constant(1.0));
        assert_eq!(trivial.to_string(), "T(n) = 1");
    }
}
