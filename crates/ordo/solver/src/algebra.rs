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

//! Closed-form summation engine.
//!
//! Summation rules, innermost sub-sums first: Σc = c·(n+1), Σi = n(n+1)/2,
//! Σi² = n(n+1)(2n+1)/6, Σ2^i = 2^(n+1)−1, linearity over sums of terms.
//! Bounds are affine in the enclosing loop variables, so closing an inner
//! sum substitutes its bounds and yields a polynomial in the outer
//! variables; the outer sum then closes that polynomial.

use ordo_common::{Bound, CostExpr, Degree, GrowthTerm, IterCount, SumExpr, Summation};
use std::collections::BTreeMap;
use tracing::debug;

/// Result of closing a symbolic sum: the closed expression plus the ordered
/// derivation steps taken to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedSum {
    pub expr: CostExpr,
    pub steps: Vec<String>,
}

/// Internal multivariate term: `coeff · Π var^pow · (log n)^log_pow ·
/// base^(exp var)`. Variables other than `n` are loop indices that are
/// eliminated as their enclosing sums close.
#[derive(Debug, Clone, PartialEq)]
struct PTerm {
    coeff: f64,
    vars: BTreeMap<String, u32>,
    log_pow: u32,
    exp: Option<(f64, String)>,
}

impl PTerm {
    fn constant(coeff: f64) -> Self {
        Self {
            coeff,
            vars: BTreeMap::new(),
            log_pow: 0,
            exp: None,
        }
    }

    fn var(coeff: f64, name: &str, power: u32) -> Self {
        let mut vars = BTreeMap::new();
        if power > 0 {
            vars.insert(name.to_string(), power);
        }
        Self {
            coeff,
            vars,
            log_pow: 0,
            exp: None,
        }
    }

    fn power_of(&self, name: &str) -> u32 {
        self.vars.get(name).copied().unwrap_or(0)
    }

    fn without_var(&self, name: &str) -> PTerm {
        let mut out = self.clone();
        out.vars.remove(name);
        out
    }

    fn same_shape(&self, other: &PTerm) -> bool {
        self.vars == other.vars && self.log_pow == other.log_pow && self.exp == other.exp
    }

    fn mul(&self, other: &PTerm) -> PTerm {
        let mut vars = self.vars.clone();
        for (name, pow) in &other.vars {
            *vars.entry(name.clone()).or_insert(0) += pow;
        }
        let exp = match (&self.exp, &other.exp) {
            (None, None) => None,
            (Some(e), None) | (None, Some(e)) => Some(e.clone()),
            (Some((b1, v1)), Some((b2, v2))) if v1 == v2 => Some((b1 * b2, v1.clone())),
            // distinct exponential variables never survive to this point
            (Some(e), Some(_)) => Some(e.clone()),
        };
        PTerm {
            coeff: self.coeff * other.coeff,
            vars,
            log_pow: self.log_pow + other.log_pow,
            exp,
        }
    }
}

type Poly = Vec<PTerm>;

fn poly_push(poly: &mut Poly, term: PTerm) {
    if term.coeff == 0.0 {
        return;
    }
    for existing in poly.iter_mut() {
        if existing.same_shape(&term) {
            existing.coeff += term.coeff;
            return;
        }
    }
    poly.push(term);
}

fn poly_add(a: &mut Poly, b: Poly) {
    for term in b {
        poly_push(a, term);
    }
}

fn poly_mul(a: &Poly, b: &Poly) -> Poly {
    let mut out = Poly::new();
    for ta in a {
        for tb in b {
            poly_push(&mut out, ta.mul(tb));
        }
    }
    out
}

fn poly_scale(poly: &Poly, factor: f64) -> Poly {
    poly.iter()
        .map(|t| {
            let mut t = t.clone();
            t.coeff *= factor;
            t
        })
        .collect()
}

fn bound_to_poly(bound: &Bound) -> Poly {
    let mut poly = Poly::new();
    for (name, coeff) in &bound.terms {
        poly_push(&mut poly, PTerm::var(*coeff as f64, name, 1));
    }
    poly_push(&mut poly, PTerm::constant(bound.constant as f64));
    poly
}

fn poly_pow(base: &Poly, exponent: u32) -> Poly {
    let mut out = vec![PTerm::constant(1.0)];
    for _ in 0..exponent {
        out = poly_mul(&out, base);
    }
    out
}

/// Prefix power sum `S_p(X) = Σ_{i=0}^{X} i^p` as a polynomial in `X`,
/// for the degrees the summation rules cover. Higher degrees fall back to
/// the leading term `X^{p+1}/(p+1)`, which preserves the dominant term.
fn prefix_power_sum(power: u32, upper: &Poly) -> Poly {
    match power {
        0 => {
            // S0(X) = X + 1
            let mut out = upper.clone();
            poly_push(&mut out, PTerm::constant(1.0));
            out
        }
        1 => {
            // S1(X) = X(X+1)/2
            let square = poly_pow(upper, 2);
            let mut out = poly_scale(&square, 0.5);
            poly_add(&mut out, poly_scale(upper, 0.5));
            out
        }
        2 => {
            // S2(X) = X(X+1)(2X+1)/6 = (2X³ + 3X² + X)/6
            let cube = poly_pow(upper, 3);
            let square = poly_pow(upper, 2);
            let mut out = poly_scale(&cube, 2.0 / 6.0);
            poly_add(&mut out, poly_scale(&square, 3.0 / 6.0));
            poly_add(&mut out, poly_scale(upper, 1.0 / 6.0));
            out
        }
        3 => {
            // S3(X) = X²(X+1)²/4
            let fourth = poly_pow(upper, 4);
            let cube = poly_pow(upper, 3);
            let square = poly_pow(upper, 2);
            let mut out = poly_scale(&fourth, 0.25);
            poly_add(&mut out, poly_scale(&cube, 0.5));
            poly_add(&mut out, poly_scale(&square, 0.25));
            out
        }
        p => {
            let raised = poly_pow(upper, p + 1);
            poly_scale(&raised, 1.0 / (p as f64 + 1.0))
        }
    }
}

fn formula_name(power: u32) -> &'static str {
    match power {
        0 => "Σc = c·(n+1)",
        1 => "Σi = n(n+1)/2",
        2 => "Σi² = n(n+1)(2n+1)/6",
        _ => "power-sum formula",
    }
}

/// Close one summation: every body term is already a polynomial in the sum
/// variable and the enclosing variables.
fn close_summation(sum: &Summation, steps: &mut Vec<String>) -> Poly {
    let mut body = Poly::new();
    for item in &sum.body {
        poly_add(&mut body, eval_sum_expr(item, steps));
    }

    // Empty constant ranges contribute nothing.
    if sum.lower.is_constant() && sum.upper.is_constant() && sum.upper.constant < sum.lower.constant {
        steps.push(format!("Σ({}={},{}) is empty", sum.var, sum.lower, sum.upper));
        return Poly::new();
    }

    let upper_poly = bound_to_poly(&sum.upper);
    let lower_minus_one = bound_to_poly(&sum.lower.clone().shifted(-1));
    let mut out = Poly::new();

    for term in &body {
        let power = term.power_of(&sum.var);
        let rest = term.without_var(&sum.var);

        if let Some((base, exp_var)) = &term.exp {
            if exp_var == &sum.var {
                // Σ base^i for i = L..U = (base^(U+1) − base^L)/(base − 1)
                poly_add(&mut out, close_exponential_sum(*base, &rest, &sum.lower, &sum.upper, steps, &sum.var));
                continue;
            }
        }

        // Σ_{i=L}^{U} i^p = S_p(U) − S_p(L−1), by linearity per term
        let mut closed = prefix_power_sum(power, &upper_poly);
        let lower_part = prefix_power_sum(power, &lower_minus_one);
        poly_add(&mut closed, poly_scale(&lower_part, -1.0));
        let contribution = poly_mul(&closed, &vec![rest]);

        steps.push(format!(
            "Σ({}={},{})[{}·{}^{}] via {}",
            sum.var,
            sum.lower,
            sum.upper,
            format_number(term.coeff),
            sum.var,
            power,
            formula_name(power)
        ));
        poly_add(&mut out, contribution);
    }

    out
}

/// Σ_{i=L}^{U} base^i with an affine upper bound. Bounds that are not a
/// single scaled variable plus a constant degrade to `base^n`, which keeps
/// the dominant term sound.
fn close_exponential_sum(base: f64, rest: &PTerm, lower: &Bound, upper: &Bound, steps: &mut Vec<String>, var: &str) -> Poly {
    steps.push(format!("Σ({}={},{})[{}^{}] via Σ2^i = 2^(n+1)−1", var, lower, upper, format_number(base), var));

    let denom = base - 1.0;
    let mut out = Poly::new();

    let non_zero: Vec<&(String, i64)> = upper.terms.iter().filter(|(_, c)| *c != 0).collect();
    match non_zero.as_slice() {
        [] => {
            // Fully constant range: a plain number
            let total = (base.powi(upper.constant as i32 + 1) - base.powi(lower.constant as i32)) / denom;
            let mut t = rest.clone();
            t.coeff *= total;
            poly_push(&mut out, t);
        }
        [(name, coeff)] => {
            // base^(c·v + k + 1) = base^(k+1) · (base^c)^v
            let effective_base = base.powi(*coeff as i32);
            let scale = base.powi(upper.constant as i32 + 1) / denom;
            let mut t = rest.clone();
            t.coeff *= scale;
            t.exp = Some((effective_base, name.clone()));
            poly_push(&mut out, t);
            if lower.is_constant() {
                let mut low = rest.clone();
                low.coeff *= -base.powi(lower.constant as i32) / denom;
                poly_push(&mut out, low);
            }
        }
        _ => {
            let mut t = rest.clone();
            t.exp = Some((base, "n".to_string()));
            poly_push(&mut out, t);
        }
    }
    out
}

fn eval_sum_expr(expr: &SumExpr, steps: &mut Vec<String>) -> Poly {
    match expr {
        SumExpr::Term { coeff, var, power } => match var {
            Some(name) => vec![PTerm::var(*coeff, name, *power)],
            None => vec![PTerm::constant(*coeff)],
        },
        SumExpr::Pow2 { coeff, var } => {
            let mut t = PTerm::constant(*coeff);
            t.exp = Some((2.0, var.clone()));
            vec![t]
        }
        SumExpr::Sum(sum) => close_summation(sum, steps),
        SumExpr::Repeated { count, body } => {
            let mut closed = Poly::new();
            for item in body {
                poly_add(&mut closed, eval_sum_expr(item, steps));
            }
            match count {
                IterCount::Constant(c) => poly_scale(&closed, *c),
                IterCount::Linear { halved } => {
                    steps.push(format!("loop body repeated {} times", if *halved { "n/2" } else { "n" }));
                    let factor = vec![PTerm::var(if *halved { 0.5 } else { 1.0 }, "n", 1)];
                    poly_mul(&closed, &factor)
                }
                IterCount::Log { halved } => {
                    steps.push(format!("loop body repeated {} times", if *halved { "log(n)/2" } else { "log n" }));
                    let mut factor = PTerm::constant(if *halved { 0.5 } else { 1.0 });
                    factor.log_pow = 1;
                    poly_mul(&closed, &vec![factor])
                }
            }
        }
    }
}

fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Convert the fully closed polynomial into a `CostExpr`. At this point the
/// only surviving variable is `n`; a stray index variable (possible only
/// when a bound could not be resolved) is treated as `n`, which keeps the
/// estimate an upper bound.
fn poly_to_cost(poly: Poly) -> CostExpr {
    let mut out = CostExpr::zero();
    for term in poly {
        let total_power: u32 = term.vars.values().sum();
        out.push(GrowthTerm {
            coeff: term.coeff,
            degree: Degree::from_int(total_power as i64),
            log_pow: term.log_pow,
            exp_base: term.exp.map(|(base, _)| base),
        });
    }
    out.normalized()
}

/// Close a symbolic cost sum into a `CostExpr`, resolving innermost
/// sub-sums first and recording each formula application.
pub fn sum_closed_form(body: &[SumExpr]) -> ClosedSum {
    let mut steps = Vec::new();
    let mut poly = Poly::new();
    for item in body {
        poly_add(&mut poly, eval_sum_expr(item, &mut steps));
    }
    let expr = poly_to_cost(poly);
    debug!(%expr, "closed cost sum");
    steps.push(format!("closed form: {}", expr));
    ClosedSum { expr, steps }
}

/// The single term of maximal growth, with its coefficient stripped.
/// Expressions with no terms collapse to the constant witness.
pub fn dominant_term(expr: &CostExpr) -> GrowthTerm {
    let mut dominant = expr.terms.iter().max_by(|a, b| a.cmp_growth(b)).cloned().unwrap_or_else(|| GrowthTerm::constant(1.0));
    dominant.coeff = 1.0;
    dominant
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degree_of(expr: &CostExpr) -> i64 {
        dominant_term(expr).degree.as_f64() as i64
    }

    #[test]
    fn test_sum_of_constant() {
        // Σ(i=0,n)[c] = c·(n+1)
        let sum = SumExpr::sum("i", Bound::constant(0), Bound::of_var("n"), vec![SumExpr::constant(3.0)]);
        let closed = sum_closed_form(&[sum]);
        assert_eq!(degree_of(&closed.expr), 1);
        let linear = closed.expr.terms.iter().find(|t| t.degree == Degree::ONE).expect("linear term");
        assert!((linear.coeff - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sum_of_i() {
        // Σ(i=1,n)[i] = n(n+1)/2
        let sum = SumExpr::sum("i", Bound::constant(1), Bound::of_var("n"), vec![SumExpr::var_power(1.0, "i", 1)]);
        let closed = sum_closed_form(&[sum]);
        let quad = closed.expr.terms.iter().find(|t| t.degree == Degree::from_int(2)).expect("quadratic term");
        assert!((quad.coeff - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_sum_of_i_squared() {
        // Σ(i=1,n)[i²] = n(n+1)(2n+1)/6, leading coefficient 1/3
        let sum = SumExpr::sum("i", Bound::constant(1), Bound::of_var("n"), vec![SumExpr::var_power(1.0, "i", 2)]);
        let closed = sum_closed_form(&[sum]);
        let cubic = closed.expr.terms.iter().find(|t| t.degree == Degree::from_int(3)).expect("cubic term");
        assert!((cubic.coeff - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sum_of_pow2() {
        // Σ(i=0,n)[2^i] = 2^(n+1) − 1
        let sum = SumExpr::sum("i", Bound::constant(0), Bound::of_var("n"), vec![SumExpr::Pow2 { coeff: 1.0, var: "i".to_string() }]);
        let closed = sum_closed_form(&[sum]);
        let dominant = dominant_term(&closed.expr);
        assert_eq!(dominant.exp_base, Some(2.0));
    }

    #[test]
    fn test_constant_range_evaluates_numerically() {
        // Σ(i=2,4)[i] = 2 + 3 + 4 = 9
        let sum = SumExpr::sum("i", Bound::constant(2), Bound::constant(4), vec![SumExpr::var_power(1.0, "i", 1)]);
        let closed = sum_closed_form(&[sum]);
        assert_eq!(closed.expr.terms.len(), 1);
        assert!((closed.expr.terms[0].coeff - 9.0).abs() < 1e-9);
        assert!(closed.expr.terms[0].is_constant());
    }

    #[test]
    fn test_empty_range_is_zero() {
        let sum = SumExpr::sum("i", Bound::constant(5), Bound::constant(2), vec![SumExpr::constant(7.0)]);
        let closed = sum_closed_form(&[sum]);
        assert!(closed.expr.is_zero());
    }

    #[test]
    fn test_nested_sums_innermost_first() {
        // Σ(i=0,n-1)[ Σ(j=0,n-i-1)[c] ] → quadratic, the bubble-sort shape
        let inner = SumExpr::sum("j", Bound::constant(0), Bound::of_var("n").with_var("i", -1).shifted(-1), vec![SumExpr::constant(3.0)]);
        let outer = SumExpr::sum("i", Bound::constant(0), Bound::of_var("n").shifted(-1), vec![inner]);
        let closed = sum_closed_form(&[outer]);
        assert_eq!(degree_of(&closed.expr), 2);
        let quad = closed.expr.terms.iter().find(|t| t.degree == Degree::from_int(2)).expect("quadratic term");
        assert!((quad.coeff - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_triangular_nesting() {
        // Σ(i=2,n)[ Σ(j=1,i-1)[c] ], the insertion-sort shape: quadratic
        let inner = SumExpr::sum("j", Bound::constant(1), Bound::of_var("i").shifted(-1), vec![SumExpr::constant(2.0)]);
        let outer = SumExpr::sum("i", Bound::constant(2), Bound::of_var("n"), vec![inner]);
        let closed = sum_closed_form(&[outer]);
        assert_eq!(degree_of(&closed.expr), 2);
    }

    #[test]
    fn test_triple_nesting_gives_cubic() {
        let innermost = SumExpr::sum("k", Bound::constant(1), Bound::of_var("j"), vec![SumExpr::constant(1.0)]);
        let middle = SumExpr::sum("j", Bound::constant(1), Bound::of_var("i"), vec![innermost]);
        let outer = SumExpr::sum("i", Bound::constant(1), Bound::of_var("n"), vec![middle]);
        let closed = sum_closed_form(&[outer]);
        assert_eq!(degree_of(&closed.expr), 3);
    }

    #[test]
    fn test_repeated_log_count() {
        // A log-n while loop around a constant body
        let loop_expr = SumExpr::Repeated {
            count: IterCount::Log { halved: false },
            body: vec![SumExpr::constant(4.0)],
        };
        let closed = sum_closed_form(&[loop_expr]);
        let dominant = dominant_term(&closed.expr);
        assert!(dominant.degree.is_zero());
        assert_eq!(dominant.log_pow, 1);
    }

    #[test]
    fn test_linear_while_around_inner_loop() {
        // while (linear) { for i in 1..n { c } } → n²
        let inner = SumExpr::sum("i", Bound::constant(1), Bound::of_var("n"), vec![SumExpr::constant(1.0)]);
        let loop_expr = SumExpr::Repeated {
            count: IterCount::Linear { halved: false },
            body: vec![inner],
        };
        let closed = sum_closed_form(&[loop_expr]);
        assert_eq!(degree_of(&closed.expr), 2);
    }

    #[test]
    fn test_linearity_of_mixed_body() {
        // Σ(i=1,n)[c + i] → n²/2 dominant
        let sum = SumExpr::sum("i", Bound::constant(1), Bound::of_var("n"), vec![SumExpr::constant(5.0), SumExpr::var_power(1.0, "i", 1)]);
        let closed = sum_closed_form(&[sum]);
        assert_eq!(degree_of(&closed.expr), 2);
        // the linear contribution of Σc must also be present
        assert!(closed.expr.terms.iter().any(|t| t.degree == Degree::ONE));
    }

    #[test]
    fn test_dominant_term_strips_coefficients() {
        let mut expr = CostExpr::zero();
        expr.push(GrowthTerm::poly(7.0, Degree::from_int(2)));
        expr.push(GrowthTerm::poly(100.0, Degree::ONE));
        let dominant = dominant_term(&expr);
        assert_eq!(dominant.coeff, 1.0);
        assert_eq!(dominant.degree, Degree::from_int(2));
    }

    #[test]
    fn test_dominant_term_of_empty_expr() {
        assert!(dominant_term(&CostExpr::zero()).is_constant());
    }

    #[test]
    fn test_steps_name_the_formulas() {
        let sum = SumExpr::sum("i", Bound::constant(1), Bound::of_var("n"), vec![SumExpr::var_power(1.0, "i", 1)]);
        let closed = sum_closed_form(&[sum]);
        assert!(closed.steps.iter().any(|s| s.contains("n(n+1)/2")));
    }
}
