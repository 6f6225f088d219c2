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

//! Per-statement cost models and the symbolic cost-sum builder.
//!
//! Two counters coexist: the operation-unit model (one unit per visible
//! operator token, plus fixed units for assignment, return, CALL, and loop
//! headers) that feeds `LoopDescriptor.body_ops`, and the elementary cost
//! table (array and field accesses cost 2, CALL costs 2) that prices
//! statements for the best/average/worst cost sums.

use crate::reaching::find_assignment;
use ordo_common::{Bound, IterCount, SumExpr};
use ordo_parser::{AstNode, BinOp};

// Elementary cost table
const COST_ASSIGN: u32 = 1;
const COST_ARRAY_ACCESS: u32 = 2;
const COST_FIELD_ACCESS: u32 = 2;
const COST_COMPARISON: u32 = 1;
const COST_LOGIC: u32 = 1;
const COST_CALL: u32 = 2;
const COST_RETURN: u32 = 1;
const COST_LOOP_HEADER: u32 = 1;

/// Operation units of a single statement (headers only, for control
/// statements): one unit per visible operator token, one for the
/// assignment itself, one for `return`, one for `CALL`; a `for` header adds
/// two implicit units for the bound comparison and increment; a condition
/// with no visible operator still costs one unit.
pub fn statement_units(node: &AstNode) -> u32 {
    match node {
        AstNode::Assign { target, value } => 1 + target_units(target) + expr_units(value),
        AstNode::For { from, to, .. } => 1 + expr_units(from) + expr_units(to) + 2,
        AstNode::While { cond, .. } | AstNode::Repeat { cond, .. } | AstNode::If { cond, .. } => expr_units(cond).max(1),
        AstNode::Call { args, .. } => 1 + args.iter().map(expr_units).sum::<u32>(),
        AstNode::Return { value } => 1 + expr_units(value),
        _ => 0,
    }
}

fn target_units(target: &AstNode) -> u32 {
    match target {
        AstNode::ArrayAccess { index, .. } => 1 + expr_units(index),
        AstNode::FieldAccess { .. } => 1,
        _ => 0,
    }
}

fn expr_units(expr: &AstNode) -> u32 {
    match expr {
        AstNode::Binary { lhs, rhs, .. } => 1 + expr_units(lhs) + expr_units(rhs),
        AstNode::Unary { value, .. } => 1 + expr_units(value),
        AstNode::ArrayAccess { index, .. } => 1 + expr_units(index),
        AstNode::FieldAccess { .. } => 1,
        AstNode::Call { args, .. } => 1 + args.iter().map(expr_units).sum::<u32>(),
        _ => 0,
    }
}

/// Deep operation units of a statement sequence, nested loop bodies
/// included. This is what `LoopDescriptor.body_ops` carries.
pub fn block_units(statements: &[AstNode]) -> u32 {
    statements
        .iter()
        .map(|stmt| {
            let own = statement_units(stmt);
            let nested = match stmt {
                AstNode::For { body, .. } | AstNode::While { body, .. } | AstNode::Repeat { body, .. } | AstNode::ProcedureDef { body, .. } => block_units(body),
                AstNode::If { then_branch, else_branch, .. } => block_units(then_branch) + else_branch.as_deref().map(block_units).unwrap_or(0),
                _ => 0,
            };
            own + nested
        })
        .sum()
}

/// Elementary cost of a single statement, before iteration multiplication.
pub fn elementary_cost(stmt: &AstNode) -> u32 {
    match stmt {
        AstNode::Assign { value, .. } => COST_ASSIGN + expr_elementary(value),
        AstNode::Call { args, .. } => COST_CALL + args.iter().map(expr_elementary).sum::<u32>(),
        AstNode::Return { value } => COST_RETURN + expr_elementary(value),
        AstNode::If { cond, .. } => match cond.as_ref() {
            AstNode::Binary { op, .. } if op.is_comparison() => COST_COMPARISON,
            AstNode::Binary { op, .. } if op.is_logical() => COST_LOGIC,
            AstNode::Unary { op: ordo_parser::UnOp::Not, .. } => COST_LOGIC,
            _ => 0,
        },
        AstNode::For { .. } | AstNode::While { .. } | AstNode::Repeat { .. } => COST_LOOP_HEADER,
        _ => 0,
    }
}

fn expr_elementary(expr: &AstNode) -> u32 {
    match expr {
        AstNode::ArrayAccess { .. } => COST_ARRAY_ACCESS,
        AstNode::FieldAccess { .. } => COST_FIELD_ACCESS,
        AstNode::Call { .. } => COST_CALL,
        AstNode::Binary { op, lhs, rhs } if op.is_arithmetic() => 1 + expr_elementary(lhs) + expr_elementary(rhs),
        AstNode::Binary { op, lhs, rhs } if op.is_comparison() => COST_COMPARISON + expr_elementary(lhs) + expr_elementary(rhs),
        AstNode::Binary { lhs, rhs, .. } => COST_LOGIC + expr_elementary(lhs) + expr_elementary(rhs),
        AstNode::Unary { value, .. } => 1 + expr_elementary(value),
        _ => 0,
    }
}

/// Which case a cost sum models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Best,
    Average,
    Worst,
}

/// The three symbolic cost sums of one program.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseCosts {
    pub best: Vec<SumExpr>,
    pub average: Vec<SumExpr>,
    pub worst: Vec<SumExpr>,
}

/// Build the best/average/worst symbolic cost sums for a statement list.
pub fn cost_sums(ast: &[AstNode]) -> CaseCosts {
    CaseCosts {
        best: build_block(ast, Case::Best),
        average: build_block(ast, Case::Average),
        worst: build_block(ast, Case::Worst),
    }
}

fn build_block(statements: &[AstNode], case: Case) -> Vec<SumExpr> {
    let mut out = Vec::new();
    for stmt in statements {
        build_statement(stmt, case, &mut out);
    }
    out
}

fn build_statement(stmt: &AstNode, case: Case, out: &mut Vec<SumExpr>) {
    match stmt {
        AstNode::For { var, from, to, body } => {
            let mut items = vec![SumExpr::constant(COST_LOOP_HEADER as f64)];
            items.extend(build_block(body, case));

            let exits_early = has_guarded_return(body);
            match (case, exits_early) {
                (Case::Best, true) => {
                    // Earliest possible exit: the body runs once
                    out.push(SumExpr::Repeated {
                        count: IterCount::Constant(1.0),
                        body: items,
                    });
                }
                (Case::Average, true) => {
                    let lower = affine_bound(from).unwrap_or_else(|| Bound::constant(1));
                    let upper = affine_bound(to).unwrap_or_else(|| Bound::of_var("n"));
                    // Expected hit halfway through the range
                    out.push(SumExpr::sum(var, lower, upper, scale_items(items, 0.5)));
                }
                _ => {
                    let lower = affine_bound(from).unwrap_or_else(|| Bound::constant(1));
                    let upper = affine_bound(to).unwrap_or_else(|| Bound::of_var("n"));
                    out.push(SumExpr::sum(var, lower, upper, items));
                }
            }
        }
        AstNode::While { cond, body } | AstNode::Repeat { body, cond } => {
            let mut items = vec![SumExpr::constant(COST_LOOP_HEADER as f64)];
            items.extend(build_block(body, case));
            let count = iteration_count(cond, body, case);
            out.push(SumExpr::Repeated { count, body: items });
        }
        AstNode::If { then_branch, else_branch, .. } => {
            out.push(SumExpr::constant(elementary_cost(stmt) as f64));
            out.extend(build_block(then_branch, case));
            if let Some(else_branch) = else_branch {
                out.extend(build_block(else_branch, case));
            }
        }
        AstNode::ProcedureDef { body, .. } => {
            out.extend(build_block(body, case));
        }
        AstNode::Comment(_) | AstNode::ClassDef { .. } | AstNode::ObjectDecl { .. } => {}
        other => {
            let cost = elementary_cost(other);
            if cost > 0 {
                out.push(SumExpr::constant(cost as f64));
            }
        }
    }
}

fn scale_items(items: Vec<SumExpr>, factor: f64) -> Vec<SumExpr> {
    items
        .into_iter()
        .map(|item| match item {
            SumExpr::Term { coeff, var, power } => SumExpr::Term { coeff: coeff * factor, var, power },
            SumExpr::Pow2 { coeff, var } => SumExpr::Pow2 { coeff: coeff * factor, var },
            other => other,
        })
        .collect()
}

/// Iteration count of a `while`/`repeat` loop: resolve the control
/// variable's update inside the body: multiplicative updates give a
/// logarithmic count, additive ones linear, unknown updates default linear.
fn iteration_count(cond: &AstNode, body: &[AstNode], case: Case) -> IterCount {
    if case == Case::Best {
        // At most one trip before the condition can fail
        return IterCount::Constant(1.0);
    }
    let halved = case == Case::Average;

    let Some(control) = control_variable(cond) else {
        return IterCount::Linear { halved };
    };
    let Some(update) = find_assignment(body, &control) else {
        return IterCount::Linear { halved };
    };
    match update {
        AstNode::Binary { op: BinOp::Mul, .. } | AstNode::Binary { op: BinOp::Div, .. } | AstNode::Binary { op: BinOp::IntDiv, .. } => IterCount::Log { halved },
        _ => IterCount::Linear { halved },
    }
}

/// The variable a loop condition watches: the identifier side of its
/// top-level comparison, or the first identifier anywhere in the condition.
fn control_variable(cond: &AstNode) -> Option<String> {
    if let AstNode::Binary { op, lhs, rhs } = cond {
        if op.is_comparison() {
            if let AstNode::Identifier(name) = lhs.as_ref() {
                return Some(name.clone());
            }
            if let AstNode::Identifier(name) = rhs.as_ref() {
                return Some(name.clone());
            }
        }
    }
    let mut found = None;
    cond.walk(&mut |node| {
        if found.is_none() {
            if let AstNode::Identifier(name) = node {
                found = Some(name.clone());
            }
        }
    });
    found
}

/// True when the block contains a conditional `return`, the shape of an
/// early exit from a search loop.
pub fn has_guarded_return(body: &[AstNode]) -> bool {
    let mut found = false;
    for stmt in body {
        stmt.walk(&mut |node| {
            if let AstNode::If { then_branch, else_branch, .. } = node {
                let branch_returns = |branch: &[AstNode]| branch.iter().any(|s| matches!(s, AstNode::Return { .. }));
                if branch_returns(then_branch) || else_branch.as_deref().map(branch_returns).unwrap_or(false) {
                    found = true;
                }
            }
        });
    }
    found
}

/// Extract an affine bound (`a·n + b·outer + c`) from a bound expression.
fn affine_bound(expr: &AstNode) -> Option<Bound> {
    match expr {
        AstNode::Literal(ordo_parser::Literal::Number(value)) => Some(Bound::constant(*value)),
        AstNode::Identifier(name) => Some(Bound::of_var(name)),
        AstNode::Binary { op: BinOp::Add, lhs, rhs } => combine(affine_bound(lhs)?, affine_bound(rhs)?, 1),
        AstNode::Binary { op: BinOp::Sub, lhs, rhs } => combine(affine_bound(lhs)?, affine_bound(rhs)?, -1),
        AstNode::Unary { op: ordo_parser::UnOp::Neg, value } => {
            let inner = affine_bound(value)?;
            combine(Bound::constant(0), inner, -1)
        }
        _ => None,
    }
}

fn combine(mut lhs: Bound, rhs: Bound, sign: i64) -> Option<Bound> {
    for (name, coeff) in rhs.terms {
        lhs = lhs.with_var(&name, coeff * sign);
    }
    lhs.constant += rhs.constant * sign;
    Some(lhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_parser::parse;
    use ordo_solver::{dominant_term, sum_closed_form};

    fn worst_degree(source: &str) -> f64 {
        let ast = parse(source).expect("parse");
        let sums = cost_sums(&ast);
        let closed = sum_closed_form(&sums.worst);
        dominant_term(&closed.expr).degree.as_f64()
    }

    #[test]
    fn test_statement_units_assignment() {
        let ast = parse("x 🡨 a + b * c").expect("parse");
        // assignment (1) + two operators (2)
        assert_eq!(statement_units(&ast[0]), 3);
    }

    #[test]
    fn test_statement_units_for_header() {
        let ast = parse("for i 🡨 1 to n do\nbegin\nend").expect("parse");
        // visible assignment (1) + implicit compare and increment (2)
        assert_eq!(statement_units(&ast[0]), 3);
    }

    #[test]
    fn test_statement_units_bare_flag_condition() {
        let ast = parse("while (flag) do\nbegin\nend").expect("parse");
        // condition with no visible operator defaults to 1
        assert_eq!(statement_units(&ast[0]), 1);
    }

    #[test]
    fn test_elementary_cost_table() {
        let ast = parse("x 🡨 A[i]\nCALL f(a)\nreturn x").expect("parse");
        assert_eq!(elementary_cost(&ast[0]), 3); // assign 1 + array access 2
        assert_eq!(elementary_cost(&ast[1]), 2); // CALL 2, identifier arg free
        assert_eq!(elementary_cost(&ast[2]), 1); // return 1
    }

    #[test]
    fn test_single_loop_is_linear() {
        assert_eq!(worst_degree("for i 🡨 1 to n do\nbegin\n    s 🡨 s + i\nend"), 1.0);
    }

    #[test]
    fn test_double_nested_is_quadratic() {
        let source = "for i 🡨 0 to n - 1 do\nbegin\n    for j 🡨 0 to n - 2 - i do\n    begin\n        t 🡨 A[j]\n    end\nend";
        assert_eq!(worst_degree(source), 2.0);
    }

    #[test]
    fn test_triple_nested_is_cubic() {
        let source = "for i 🡨 1 to n do\nbegin\n    for j 🡨 1 to n do\n    begin\n        for k 🡨 1 to n do\n        begin\n            s 🡨 s + 1\n        end\n    end\nend";
        assert_eq!(worst_degree(source), 3.0);
    }

    #[test]
    fn test_log_while_loop() {
        let source = "while (i < n) do\nbegin\n    i 🡨 i * 2\nend";
        let ast = parse(source).expect("parse");
        let sums = cost_sums(&ast);
        let closed = sum_closed_form(&sums.worst);
        let dominant = dominant_term(&closed.expr);
        assert!(dominant.degree.is_zero());
        assert_eq!(dominant.log_pow, 1);
    }

    #[test]
    fn test_halving_while_loop_is_logarithmic() {
        let source = "while (high > low) do\nbegin\n    high 🡨 high div 2\nend";
        let ast = parse(source).expect("parse");
        let closed = sum_closed_form(&cost_sums(&ast).worst);
        assert_eq!(dominant_term(&closed.expr).log_pow, 1);
    }

    #[test]
    fn test_best_case_of_search_loop_is_constant() {
        let source = "for i 🡨 0 to n - 1 do\nbegin\n    if (A[i] = x) then\n    begin\n        return i\n    end\nend";
        let ast = parse(source).expect("parse");
        let sums = cost_sums(&ast);
        let best = sum_closed_form(&sums.best);
        assert!(dominant_term(&best.expr).is_constant());
        let worst = sum_closed_form(&sums.worst);
        assert_eq!(dominant_term(&worst.expr).degree.as_f64(), 1.0);
        // average hits halfway through: still linear
        let average = sum_closed_form(&sums.average);
        assert_eq!(dominant_term(&average.expr).degree.as_f64(), 1.0);
    }

    #[test]
    fn test_literal_bounds_are_constant_cost() {
        let source = "for i 🡨 1 to 8 do\nbegin\n    s 🡨 s + 1\nend";
        let ast = parse(source).expect("parse");
        let closed = sum_closed_form(&cost_sums(&ast).worst);
        assert!(dominant_term(&closed.expr).is_constant());
    }

    #[test]
    fn test_affine_bound_extraction() {
        let ast = parse("for j 🡨 0 to n - 2 - i do\nbegin\nend").expect("parse");
        let AstNode::For { to, .. } = &ast[0] else { panic!("expected for") };
        let bound = affine_bound(to).expect("affine");
        assert_eq!(bound.coeff_of("n"), 1);
        assert_eq!(bound.coeff_of("i"), -1);
        assert_eq!(bound.constant, -2);
    }
}
