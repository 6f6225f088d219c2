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

//! Symbolic cost-expression values.
//!
//! `CostExpr` is a closed sum of growth terms (polynomial, logarithmic,
//! exponential and products of these); `SumExpr` is the open summation form
//! the analyzers build before the algebra engine closes it. Growth-rate
//! comparison is exact: polynomial exponents are rationals, and the only
//! floating comparison allowed anywhere is between characteristic-equation
//! roots that are not exact integers.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Tolerance used when two exponential bases come from numeric root-finding.
pub const ROOT_EPSILON: f64 = 1e-6;

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}

/// An exact rational exponent of `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Degree {
    num: i64,
    den: i64,
}

impl Degree {
    pub const ZERO: Degree = Degree { num: 0, den: 1 };
    pub const ONE: Degree = Degree { num: 1, den: 1 };

    /// Create a reduced rational `num/den`. Panics on a zero denominator.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "degree denominator must be nonzero");
        let sign = if den < 0 { -1 } else { 1 };
        let g = gcd(num, den);
        Self {
            num: sign * num / g,
            den: sign * den / g,
        }
    }

    pub fn from_int(value: i64) -> Self {
        Self { num: value, den: 1 }
    }

    /// Nearest rational with denominator 100, for exponents that have no
    /// exact rational form (e.g. log_2 3).
    pub fn approx(value: f64) -> Self {
        Self::new((value * 100.0).round() as i64, 100)
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    pub fn numerator(&self) -> i64 {
        self.num
    }

    pub fn denominator(&self) -> i64 {
        self.den
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    pub fn add(&self, other: Degree) -> Degree {
        Degree::new(self.num * other.den + other.num * self.den, self.den * other.den)
    }
}

impl PartialOrd for Degree {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Degree {
    fn cmp(&self, other: &Self) -> Ordering {
        // Exact cross-multiplication; denominators are positive.
        let lhs = self.num as i128 * other.den as i128;
        let rhs = other.num as i128 * self.den as i128;
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            let value = self.as_f64();
            let rounded = format!("{:.2}", value);
            write!(f, "{}", rounded.trim_end_matches('0').trim_end_matches('.'))
        }
    }
}

/// A single growth term `coeff · n^degree · (log n)^log_pow · base^n`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthTerm {
    pub coeff: f64,
    pub degree: Degree,
    pub log_pow: u32,
    pub exp_base: Option<f64>,
}

impl GrowthTerm {
    pub fn constant(coeff: f64) -> Self {
        Self {
            coeff,
            degree: Degree::ZERO,
            log_pow: 0,
            exp_base: None,
        }
    }

    pub fn poly(coeff: f64, degree: Degree) -> Self {
        Self {
            coeff,
            degree,
            log_pow: 0,
            exp_base: None,
        }
    }

    pub fn log(coeff: f64, log_pow: u32) -> Self {
        Self {
            coeff,
            degree: Degree::ZERO,
            log_pow,
            exp_base: None,
        }
    }

    pub fn linearithmic(coeff: f64, degree: Degree, log_pow: u32) -> Self {
        Self {
            coeff,
            degree,
            log_pow,
            exp_base: None,
        }
    }

    pub fn exponential(coeff: f64, base: f64) -> Self {
        Self {
            coeff,
            degree: Degree::ZERO,
            log_pow: 0,
            exp_base: Some(base),
        }
    }

    pub fn is_constant(&self) -> bool {
        self.degree.is_zero() && self.log_pow == 0 && self.exp_base.is_none()
    }

    /// Total order of the algebra engine: constant < logarithmic < any
    /// positive polynomial degree < that degree with a log factor <
    /// exponential, exponentials compared by base.
    pub fn cmp_growth(&self, other: &GrowthTerm) -> Ordering {
        match (self.exp_base, other.exp_base) {
            (Some(a), Some(b)) => {
                if (a - b).abs() < ROOT_EPSILON {
                    self.degree.cmp(&other.degree).then(self.log_pow.cmp(&other.log_pow))
                } else {
                    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
                }
            }
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.degree.cmp(&other.degree).then(self.log_pow.cmp(&other.log_pow)),
        }
    }

    /// True when both terms share the same growth class (they differ at most
    /// in their numeric coefficients).
    pub fn same_growth(&self, other: &GrowthTerm) -> bool {
        self.cmp_growth(other) == Ordering::Equal
    }

    /// The coefficient-free witness of this growth class, e.g. `n log n`.
    pub fn witness(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if !self.degree.is_zero() {
            if self.degree == Degree::ONE {
                parts.push("n".to_string());
            } else {
                parts.push(format!("n^{}", self.degree));
            }
        }
        if self.log_pow == 1 {
            parts.push("log n".to_string());
        } else if self.log_pow > 1 {
            parts.push(format!("log^{} n", self.log_pow));
        }
        if let Some(base) = self.exp_base {
            parts.push(format!("{}^n", format_base(base)));
        }
        if parts.is_empty() {
            "1".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Format an exponential base: integers exactly, the golden ratio as φ,
/// anything else to two decimals.
pub fn format_base(base: f64) -> String {
    if (base - 1.618).abs() < 0.01 {
        "φ".to_string()
    } else if (base - base.round()).abs() < ROOT_EPSILON {
        format!("{}", base.round() as i64)
    } else {
        format!("{:.2}", base)
    }
}

fn format_coeff(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// A closed cost expression: a sum of growth terms.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CostExpr {
    pub terms: Vec<GrowthTerm>,
}

impl CostExpr {
    pub fn zero() -> Self {
        Self { terms: Vec::new() }
    }

    pub fn constant(coeff: f64) -> Self {
        Self::from_term(GrowthTerm::constant(coeff))
    }

    pub fn from_term(term: GrowthTerm) -> Self {
        let mut expr = Self::zero();
        expr.push(term);
        expr
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Add a term, merging it into an existing term of the same growth class.
    pub fn push(&mut self, term: GrowthTerm) {
        if term.coeff == 0.0 {
            return;
        }
        for existing in &mut self.terms {
            if existing.same_growth(&term) {
                existing.coeff += term.coeff;
                return;
            }
        }
        self.terms.push(term);
    }

    pub fn add(&mut self, other: &CostExpr) {
        for term in &other.terms {
            self.push(term.clone());
        }
    }

    pub fn scaled(&self, factor: f64) -> CostExpr {
        let mut out = CostExpr::zero();
        for term in &self.terms {
            let mut t = term.clone();
            t.coeff *= factor;
            out.push(t);
        }
        out
    }

    /// Sort terms by descending growth so displays read leading-term first.
    pub fn normalized(mut self) -> CostExpr {
        self.terms.retain(|t| t.coeff != 0.0);
        self.terms.sort_by(|a, b| b.cmp_growth(a));
        self
    }
}

impl fmt::Display for CostExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        let mut sorted = self.terms.clone();
        sorted.sort_by(|a, b| b.cmp_growth(a));
        let rendered: Vec<String> = sorted
            .iter()
            .map(|t| {
                let witness = t.witness();
                if t.is_constant() {
                    format_coeff(t.coeff)
                } else if (t.coeff - 1.0).abs() < 1e-9 {
                    witness
                } else {
                    format!("{}·{}", format_coeff(t.coeff), witness)
                }
            })
            .collect();
        write!(f, "{}", rendered.join(" + "))
    }
}

/// An affine bound over named variables: `Σ coeff·var + constant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bound {
    pub terms: Vec<(String, i64)>,
    pub constant: i64,
}

impl Bound {
    pub fn constant(value: i64) -> Self {
        Self { terms: Vec::new(), constant: value }
    }

    pub fn of_var(name: &str) -> Self {
        Self {
            terms: vec![(name.to_string(), 1)],
            constant: 0,
        }
    }

    pub fn with_var(mut self, name: &str, coeff: i64) -> Self {
        self.terms.push((name.to_string(), coeff));
        self
    }

    pub fn shifted(mut self, delta: i64) -> Self {
        self.constant += delta;
        self
    }

    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(|(_, c)| *c == 0)
    }

    pub fn coeff_of(&self, name: &str) -> i64 {
        self.terms.iter().filter(|(v, _)| v == name).map(|(_, c)| *c).sum()
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (var, coeff) in &self.terms {
            if *coeff == 0 {
                continue;
            }
            if first {
                match *coeff {
                    1 => write!(f, "{}", var)?,
                    -1 => write!(f, "-{}", var)?,
                    c => write!(f, "{}{}", c, var)?,
                }
                first = false;
            } else if *coeff > 0 {
                if *coeff == 1 {
                    write!(f, " + {}", var)?;
                } else {
                    write!(f, " + {}{}", coeff, var)?;
                }
            } else if *coeff == -1 {
                write!(f, " - {}", var)?;
            } else {
                write!(f, " - {}{}", -coeff, var)?;
            }
        }
        if first {
            write!(f, "{}", self.constant)?;
        } else if self.constant > 0 {
            write!(f, " + {}", self.constant)?;
        } else if self.constant < 0 {
            write!(f, " - {}", -self.constant)?;
        }
        Ok(())
    }
}

/// Iteration-count class for loops whose trip count is not an affine
/// for-range: `while`/`repeat` loops inferred from their condition and the
/// update of their control variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum IterCount {
    Constant(f64),
    Linear { halved: bool },
    Log { halved: bool },
}

/// An open (not yet closed-form) symbolic cost sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SumExpr {
    /// `coeff · var^power`, or a plain constant when `var` is `None`
    Term { coeff: f64, var: Option<String>, power: u32 },
    /// `coeff · 2^var`
    Pow2 { coeff: f64, var: String },
    /// A bounded summation over an index variable
    Sum(Box<Summation>),
    /// A body repeated `count` times (while/repeat loops)
    Repeated { count: IterCount, body: Vec<SumExpr> },
}

impl SumExpr {
    pub fn constant(coeff: f64) -> Self {
        SumExpr::Term { coeff, var: None, power: 0 }
    }

    pub fn var_power(coeff: f64, var: &str, power: u32) -> Self {
        SumExpr::Term {
            coeff,
            var: Some(var.to_string()),
            power,
        }
    }

    pub fn sum(var: &str, lower: Bound, upper: Bound, body: Vec<SumExpr>) -> Self {
        SumExpr::Sum(Box::new(Summation {
            var: var.to_string(),
            lower,
            upper,
            body,
        }))
    }
}

/// A summation `Σ_{var = lower}^{upper} body`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summation {
    pub var: String,
    pub lower: Bound,
    pub upper: Bound,
    pub body: Vec<SumExpr>,
}

impl fmt::Display for Summation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Σ({}={},{})[...]", self.var, self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_reduction_and_order() {
        assert_eq!(Degree::new(2, 4), Degree::new(1, 2));
        assert!(Degree::new(3, 2) > Degree::ONE);
        assert!(Degree::new(1, 2) < Degree::ONE);
        assert_eq!(Degree::new(4, 2), Degree::from_int(2));
    }

    #[test]
    fn test_degree_display() {
        assert_eq!(Degree::from_int(2).to_string(), "2");
        assert_eq!(Degree::new(3, 2).to_string(), "1.5");
        assert_eq!(Degree::approx(1.584).to_string(), "1.58");
    }

    #[test]
    fn test_growth_order() {
        let constant = GrowthTerm::constant(5.0);
        let logarithmic = GrowthTerm::log(1.0, 1);
        let linear = GrowthTerm::poly(1.0, Degree::ONE);
        let linearithmic = GrowthTerm::linearithmic(1.0, Degree::ONE, 1);
        let quadratic = GrowthTerm::poly(1.0, Degree::from_int(2));
        let exponential = GrowthTerm::exponential(1.0, 2.0);

        assert_eq!(constant.cmp_growth(&logarithmic), Ordering::Less);
        assert_eq!(logarithmic.cmp_growth(&linear), Ordering::Less);
        assert_eq!(linear.cmp_growth(&linearithmic), Ordering::Less);
        assert_eq!(linearithmic.cmp_growth(&quadratic), Ordering::Less);
        assert_eq!(quadratic.cmp_growth(&exponential), Ordering::Less);
        assert_eq!(exponential.cmp_growth(&GrowthTerm::exponential(1.0, 3.0)), Ordering::Less);
    }

    #[test]
    fn test_equal_growth_collapses() {
        let mut expr = CostExpr::zero();
        expr.push(GrowthTerm::poly(2.0, Degree::from_int(2)));
        expr.push(GrowthTerm::poly(3.0, Degree::from_int(2)));
        expr.push(GrowthTerm::constant(1.0));

        assert_eq!(expr.terms.len(), 2);
        assert_eq!(expr.terms[0].coeff, 5.0);
    }

    #[test]
    fn test_witness_formatting() {
        assert_eq!(GrowthTerm::constant(7.0).witness(), "1");
        assert_eq!(GrowthTerm::poly(3.0, Degree::ONE).witness(), "n");
        assert_eq!(GrowthTerm::linearithmic(1.0, Degree::ONE, 1).witness(), "n log n");
        assert_eq!(GrowthTerm::poly(1.0, Degree::new(3, 2)).witness(), "n^1.5");
        assert_eq!(GrowthTerm::exponential(1.0, 2.0).witness(), "2^n");
        assert_eq!(GrowthTerm::exponential(1.0, 1.618034).witness(), "φ^n");
    }

    #[test]
    fn test_bound_display() {
        let bound = Bound::of_var("n").with_var("i", -1).shifted(-1);
        assert_eq!(bound.to_string(), "n - i - 1");
        assert_eq!(Bound::constant(0).to_string(), "0");
    }

    #[test]
    fn test_cost_expr_display() {
        let mut expr = CostExpr::zero();
        expr.push(GrowthTerm::poly(1.0, Degree::from_int(2)));
        expr.push(GrowthTerm::constant(3.0));
        assert_eq!(expr.to_string(), "n^2 + 3");
    }
}
