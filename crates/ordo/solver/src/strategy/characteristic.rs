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

//! Characteristic-equation strategy for linear recurrences in `n−k` terms.
//!
//! Order ≤ 2 resolves by the quadratic formula; higher orders use
//! Durand–Kerner iteration over the same characteristic polynomial. The
//! root comparisons here are the one place the algebra is allowed a numeric
//! epsilon, because the roots themselves are not exact integers in general.

use crate::strategy::{SolveStrategy, StrategyKind, StrategyOutcome};
use ordo_common::algebra::ROOT_EPSILON;
use ordo_common::{CostExpr, Degree, GrowthTerm, RecurrenceRelation};

/// Comparison tolerance for characteristic roots.
const EPS: f64 = 1e-4;

pub struct CharacteristicEquation;

#[derive(Debug, Clone, Copy)]
struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    fn modulus(&self) -> f64 {
        self.re.hypot(self.im)
    }

    fn sub(self, other: Complex) -> Complex {
        Complex::new(self.re - other.re, self.im - other.im)
    }

    fn mul(self, other: Complex) -> Complex {
        Complex::new(self.re * other.re - self.im * other.im, self.re * other.im + self.im * other.re)
    }

    fn div(self, other: Complex) -> Complex {
        let denom = other.re * other.re + other.im * other.im;
        Complex::new((self.re * other.re + self.im * other.im) / denom, (self.im * other.re - self.re * other.im) / denom)
    }
}

/// Roots of a monic polynomial given by ascending coefficients
/// `c0 + c1·r + … + r^m` (the leading 1 is implicit), via Durand–Kerner.
fn durand_kerner(coeffs: &[f64]) -> Vec<Complex> {
    let degree = coeffs.len();
    let eval = |x: Complex| {
        // Horner over [c0 … c_{m-1}, 1]
        let mut acc = Complex::new(1.0, 0.0);
        for &c in coeffs.iter().rev() {
            acc = acc.mul(x);
            acc = Complex::new(acc.re + c, acc.im);
        }
        acc
    };

    let seed = Complex::new(0.4, 0.9);
    let mut roots: Vec<Complex> = (0..degree)
        .map(|k| {
            let mut acc = Complex::new(1.0, 0.0);
            for _ in 0..k + 1 {
                acc = acc.mul(seed);
            }
            acc
        })
        .collect();

    for _ in 0..500 {
        let mut moved = 0.0f64;
        for i in 0..degree {
            let mut denom = Complex::new(1.0, 0.0);
            for j in 0..degree {
                if i != j {
                    denom = denom.mul(roots[i].sub(roots[j]));
                }
            }
            let delta = eval(roots[i]).div(denom);
            roots[i] = roots[i].sub(delta);
            moved = moved.max(delta.modulus());
        }
        if moved < 1e-12 {
            break;
        }
    }
    roots
}

impl SolveStrategy for CharacteristicEquation {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CharacteristicEquation
    }

    fn matches(&self, relation: &RecurrenceRelation) -> bool {
        relation.subtract_terms().is_some()
    }

    fn solve(&self, relation: &RecurrenceRelation) -> StrategyOutcome {
        let Some(pairs) = relation.subtract_terms() else {
            return StrategyOutcome::inapplicable(self.kind(), "relation is not a linear recurrence in n−k terms".to_string());
        };

        let order = pairs.iter().map(|(_, k)| *k).max().unwrap_or(0) as usize;
        if order == 0 {
            return StrategyOutcome::inapplicable(self.kind(), "no subtraction delay found".to_string());
        }

        // Coefficient of T(n-k) for each k in 1..=order
        let mut coeff = vec![0.0f64; order + 1];
        for (count, k) in &pairs {
            coeff[*k as usize] += *count as f64;
        }

        let mut steps = vec![format!("relation {} is linear with constant coefficients", relation)];
        let equation = render_characteristic(order, &coeff);
        steps.push(format!("characteristic equation: {}", equation));

        // Moduli of all roots, ordered descending
        let roots = find_roots(order, &coeff);
        let rendered: Vec<String> = roots.iter().map(|r| format_root(*r)).collect();
        steps.push(format!("roots: {}", rendered.join(", ")));

        let mut moduli: Vec<f64> = roots.iter().map(|r| r.modulus()).collect();
        moduli.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let dominant = moduli[0];
        let multiplicity = moduli.iter().filter(|m| (*m - dominant).abs() < EPS).count();
        let has_complex = roots.iter().any(|r| r.im.abs() > EPS);
        if has_complex {
            steps.push(format!("complex-conjugate pair: using the modulus {:.4} as the effective base", dominant));
        }

        let work = crate::algebra::dominant_term(&relation.work);
        let closed_form = classify_roots(dominant, multiplicity, &work, &mut steps);

        let witness = crate::algebra::dominant_term(&closed_form).witness();
        steps.push(format!("general solution dominated by the largest root → O({})", witness));

        StrategyOutcome {
            method: self.kind(),
            closed_form,
            steps,
            applicable: true,
        }
    }
}

fn find_roots(order: usize, coeff: &[f64]) -> Vec<Complex> {
    match order {
        1 => vec![Complex::new(coeff[1], 0.0)],
        2 => {
            // r² − c1·r − c2 = 0
            let (c1, c2) = (coeff[1], coeff[2]);
            let disc = c1 * c1 + 4.0 * c2;
            if disc >= 0.0 {
                let sqrt = disc.sqrt();
                vec![Complex::new((c1 + sqrt) / 2.0, 0.0), Complex::new((c1 - sqrt) / 2.0, 0.0)]
            } else {
                let im = (-disc).sqrt() / 2.0;
                vec![Complex::new(c1 / 2.0, im), Complex::new(c1 / 2.0, -im)]
            }
        }
        _ => {
            // Monic polynomial r^m − c1·r^{m-1} − … − cm, ascending coeffs
            let ascending: Vec<f64> = (0..order).map(|i| -coeff[order - i]).collect();
            durand_kerner(&ascending)
        }
    }
}

fn classify_roots(dominant: f64, multiplicity: usize, work: &GrowthTerm, steps: &mut Vec<String>) -> CostExpr {
    if (dominant - 1.0).abs() < EPS {
        // Root 1: polynomial growth, lifted by any non-constant work term
        let work_degree = if work.is_constant() { 0 } else { work.degree.as_f64().ceil() as i64 };
        let degree = (multiplicity as i64 - 1) + work_degree + 1;
        steps.push(format!("dominant root r = 1 with multiplicity {} → polynomial growth of degree {}", multiplicity, degree));
        CostExpr::from_term(GrowthTerm::poly(1.0, Degree::from_int(degree)))
    } else if dominant > 1.0 {
        if multiplicity > 1 {
            steps.push(format!("repeated dominant root r = {:.4} → n·r^n growth", dominant));
            CostExpr::from_term(GrowthTerm {
                coeff: 1.0,
                degree: Degree::from_int(multiplicity as i64 - 1),
                log_pow: 0,
                exp_base: Some(normalize_base(dominant)),
            })
        } else {
            steps.push(format!("dominant root r = {:.4} exceeds 1 → exponential growth r^n", dominant));
            CostExpr::from_term(GrowthTerm::exponential(1.0, normalize_base(dominant)))
        }
    } else {
        steps.push(format!("dominant root r = {:.4} is below 1 → the recurrence converges to a constant", dominant));
        CostExpr::constant(1.0)
    }
}

/// Snap a numeric root to its integer when it is one; leave genuine
/// irrationals (φ and friends) untouched.
fn normalize_base(root: f64) -> f64 {
    if (root - root.round()).abs() < ROOT_EPSILON {
        root.round()
    } else {
        root
    }
}

fn render_characteristic(order: usize, coeff: &[f64]) -> String {
    let mut out = if order == 1 { "r".to_string() } else { format!("r^{}", order) };
    for k in 1..=order {
        if coeff[k] == 0.0 {
            continue;
        }
        let power = order - k;
        let var = match power {
            0 => String::new(),
            1 => "r".to_string(),
            p => format!("r^{}", p),
        };
        let c = if coeff[k] == 1.0 && !var.is_empty() { String::new() } else { format!("{}", coeff[k]) };
        out.push_str(&format!(" - {}{}", c, var));
    }
    out.push_str(" = 0");
    out
}

fn format_root(root: Complex) -> String {
    if root.im.abs() < EPS {
        format!("{:.4}", root.re)
    } else {
        format!("{:.4} ± {:.4}i", root.re, root.im.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::dominant_term;
    use ordo_common::{RecursiveTerm, Reduction};

    fn subtract_relation(terms: &[(u32, u32)], work: CostExpr) -> RecurrenceRelation {
        RecurrenceRelation::new(
            terms.iter().map(|(count, k)| RecursiveTerm { count: *count, reduction: Reduction::Subtract { amount: *k } }).collect(),
            work,
        )
    }

    #[test]
    fn test_fibonacci_golden_ratio() {
        // T(n) = T(n-1) + T(n-2) → dominant root ≈ 1.618 → O(φ^n)
        let relation = subtract_relation(&[(1, 1), (1, 2)], CostExpr::zero());
        let outcome = CharacteristicEquation.solve(&relation);
        assert!(outcome.applicable);

        let dominant = dominant_term(&outcome.closed_form);
        let base = dominant.exp_base.expect("exponential");
        assert!((base - 1.618).abs() < 0.001);
        assert_eq!(dominant.witness(), "φ^n");
        assert!(outcome.steps.iter().any(|s| s.contains("1.618")));
    }

    #[test]
    fn test_hanoi_doubling() {
        // T(n) = 2T(n-1) + 1 → root 2 → O(2^n)
        let relation = subtract_relation(&[(2, 1)], CostExpr::constant(1.0));
        let outcome = CharacteristicEquation.solve(&relation);
        let dominant = dominant_term(&outcome.closed_form);
        assert_eq!(dominant.exp_base, Some(2.0));
        assert_eq!(dominant.witness(), "2^n");
    }

    #[test]
    fn test_third_order_unit_roots_stay_polynomial() {
        // T(n) = T(n-3): r³ = 1, all roots on the unit circle
        let relation = subtract_relation(&[(1, 3)], CostExpr::zero());
        let outcome = CharacteristicEquation.solve(&relation);
        assert!(outcome.applicable);
        assert!(dominant_term(&outcome.closed_form).exp_base.is_none());
    }

    #[test]
    fn test_third_order_durand_kerner() {
        // T(n) = T(n-1) + T(n-2) + T(n-3) (tribonacci) → dominant ≈ 1.839
        let relation = subtract_relation(&[(1, 1), (1, 2), (1, 3)], CostExpr::zero());
        let outcome = CharacteristicEquation.solve(&relation);
        let dominant = dominant_term(&outcome.closed_form);
        let base = dominant.exp_base.expect("exponential");
        assert!((base - 1.839).abs() < 0.01);
    }

    #[test]
    fn test_characteristic_equation_rendering() {
        let relation = subtract_relation(&[(1, 1), (1, 2)], CostExpr::zero());
        let outcome = CharacteristicEquation.solve(&relation);
        assert!(outcome.steps.iter().any(|s| s.contains("r^2 - r - 1 = 0")));
    }
}
