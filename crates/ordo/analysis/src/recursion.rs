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

//! Recursive-algorithm analyzer: call-site extraction, reduction-pattern
//! detection through reaching definitions, base-case extraction with
//! structural negation, recurrence synthesis, and the bounded
//! recursion-tree sketch.

use crate::cost::cost_sums;
use crate::reaching::ReachingDefinitions;
use ordo_common::{
    AnalysisWarning, BaseCase, BaseCaseOrigin, CostExpr, Degree, GrowthTerm, RecurrenceRelation, RecursionTree, RecursiveCallSite, RecursiveTerm, Reduction, ReductionPattern,
};
use ordo_parser::{AstNode, BinOp, Literal, UnOp};
use ordo_solver::{dominant_term, sum_closed_form};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Maximum depth of the recursion-tree sketch.
const TREE_DEPTH: u32 = 4;
/// Node budget for wide trees.
const TREE_NODE_LIMIT: usize = 200;
/// Resolution depth for def-use chains when classifying arguments.
const RESOLVE_DEPTH: u32 = 4;

/// Everything the recursive analyzer learns about one procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct RecursionAnalysis {
    pub call_sites: Vec<RecursiveCallSite>,
    pub base_cases: Vec<BaseCase>,
    pub relation: RecurrenceRelation,
    pub tree: RecursionTree,
    pub warnings: Vec<AnalysisWarning>,
    /// A call argument resolves through a call to another procedure, so
    /// the split size depends on data the analyzer cannot see
    pub opaque_split: bool,
}

impl RecursionAnalysis {
    /// Zero base cases and zero call sites together mean the procedure is
    /// not recursive at all.
    pub fn no_recursion(&self) -> bool {
        self.call_sites.is_empty()
    }
}

/// Analyze the recursion structure of `procedure_name` within the AST.
pub fn analyze_recursion(ast: &[AstNode], procedure_name: &str) -> RecursionAnalysis {
    let defs = ReachingDefinitions::compute(ast);
    let mut warnings = Vec::new();

    let mut call_sites = Vec::new();
    let mut opaque_split = false;
    for node in ast {
        node.walk(&mut |candidate| {
            if let AstNode::Call { name, args } = candidate {
                if name.eq_ignore_ascii_case(procedure_name) {
                    let (pattern, opaque) = classify_arguments(args, &defs);
                    opaque_split |= opaque;
                    call_sites.push(RecursiveCallSite {
                        callee: name.clone(),
                        args: args.iter().map(|a| a.render()).collect(),
                        pattern,
                    });
                }
            }
        });
    }

    let base_cases = extract_base_cases(ast, procedure_name, &mut warnings);
    let relation = synthesize_relation(ast, procedure_name, &defs, &call_sites);
    let tree = recursion_tree(&relation);

    debug!(
        procedure = procedure_name,
        call_sites = call_sites.len(),
        base_cases = base_cases.len(),
        relation = %relation,
        "recursion analysis finished"
    );

    RecursionAnalysis {
        call_sites,
        base_cases,
        relation,
        tree,
        warnings,
        opaque_split,
    }
}

// ----------------------------------------------------------------------
// Reduction-pattern detection
// ----------------------------------------------------------------------

/// Classify a call's arguments: division anywhere wins over subtraction;
/// identifiers resolve through their most recent assignment.
fn classify_arguments(args: &[AstNode], defs: &ReachingDefinitions) -> (ReductionPattern, bool) {
    let mut divide: Option<u32> = None;
    let mut subtract: Option<u32> = None;
    let mut opaque = false;

    for arg in args {
        scan_expr(arg, defs, RESOLVE_DEPTH, &mut HashSet::new(), &mut divide, &mut subtract, &mut opaque);
    }

    let pattern = if let Some(b) = divide {
        ReductionPattern::DivideBy(b)
    } else if let Some(k) = subtract {
        ReductionPattern::SubtractBy(k)
    } else {
        ReductionPattern::Unrecognized
    };
    (pattern, opaque)
}

fn scan_expr(expr: &AstNode, defs: &ReachingDefinitions, depth: u32, visited: &mut HashSet<String>, divide: &mut Option<u32>, subtract: &mut Option<u32>, opaque: &mut bool) {
    match expr {
        AstNode::Binary { op: BinOp::Div | BinOp::IntDiv, lhs, rhs } => {
            if let AstNode::Literal(Literal::Number(b)) = rhs.as_ref() {
                if *b > 1 && divide.is_none() {
                    *divide = Some(*b as u32);
                }
            }
            scan_expr(lhs, defs, depth, visited, divide, subtract, opaque);
        }
        AstNode::Binary { op: BinOp::Sub, lhs, rhs } => {
            let amount = match rhs.as_ref() {
                AstNode::Literal(Literal::Number(k)) if *k >= 1 => *k as u32,
                // subtraction of a non-literal defaults to k = 1
                _ => 1,
            };
            if subtract.is_none() {
                *subtract = Some(amount);
            }
            scan_expr(lhs, defs, depth, visited, divide, subtract, opaque);
            scan_expr(rhs, defs, depth, visited, divide, subtract, opaque);
        }
        AstNode::Binary { op: BinOp::Add, lhs, rhs } => {
            // An index advancing by a constant shrinks the remaining
            // problem by that constant.
            if subtract.is_none() {
                if let AstNode::Literal(Literal::Number(k)) = rhs.as_ref() {
                    if *k >= 1 {
                        *subtract = Some(*k as u32);
                    }
                } else if let AstNode::Literal(Literal::Number(k)) = lhs.as_ref() {
                    if *k >= 1 {
                        *subtract = Some(*k as u32);
                    }
                }
            }
            scan_expr(lhs, defs, depth, visited, divide, subtract, opaque);
            scan_expr(rhs, defs, depth, visited, divide, subtract, opaque);
        }
        AstNode::Binary { lhs, rhs, .. } => {
            scan_expr(lhs, defs, depth, visited, divide, subtract, opaque);
            scan_expr(rhs, defs, depth, visited, divide, subtract, opaque);
        }
        AstNode::Unary { value, .. } => scan_expr(value, defs, depth, visited, divide, subtract, opaque),
        AstNode::Identifier(name) => {
            if depth > 0 && visited.insert(name.clone()) {
                if let Some(definition) = defs.resolve(name) {
                    scan_expr(definition, defs, depth - 1, visited, divide, subtract, opaque);
                }
            }
        }
        AstNode::Call { .. } => {
            // The argument's value comes out of another procedure; the
            // split size is invisible to static analysis.
            *opaque = true;
        }
        _ => {}
    }
}

// ----------------------------------------------------------------------
// Base-case extraction
// ----------------------------------------------------------------------

fn extract_base_cases(ast: &[AstNode], procedure_name: &str, warnings: &mut Vec<AnalysisWarning>) -> Vec<BaseCase> {
    let mut base_cases = Vec::new();
    for node in ast {
        node.walk(&mut |candidate| {
            if let AstNode::If { cond, then_branch, else_branch } = candidate {
                let has_return = then_branch.iter().any(|s| matches!(s, AstNode::Return { .. }));
                if has_return {
                    base_cases.push(BaseCase {
                        condition: cond.render(),
                        origin: BaseCaseOrigin::Explicit,
                    });
                }

                let has_recursion = then_branch.iter().any(|s| contains_self_call(s, procedure_name));
                if has_recursion && else_branch.is_none() {
                    match negate_condition(cond) {
                        Some(negated) => base_cases.push(BaseCase {
                            condition: negated,
                            origin: BaseCaseOrigin::Implicit,
                        }),
                        None => warnings.push(AnalysisWarning::NegationAmbiguity { guard: cond.render() }),
                    }
                }
            }
        });
    }
    base_cases
}

fn contains_self_call(node: &AstNode, procedure_name: &str) -> bool {
    let mut found = false;
    node.walk(&mut |candidate| {
        if let AstNode::Call { name, .. } = candidate {
            if name.eq_ignore_ascii_case(procedure_name) {
                found = true;
            }
        }
    });
    found
}

/// Structural negation: flip the top-level comparator of a single
/// condition; compound conditions negate by De Morgan. Conditions with no
/// structural negation (a bare flag) return `None`.
fn negate_condition(cond: &AstNode) -> Option<String> {
    match cond {
        AstNode::Binary { op, lhs, rhs } if op.is_comparison() => {
            let negated = op.negated_comparison()?;
            Some(format!("{} {} {}", lhs.render(), negated, rhs.render()))
        }
        AstNode::Binary { op: BinOp::And, lhs, rhs } => Some(format!("{} or {}", negate_condition(lhs)?, negate_condition(rhs)?)),
        AstNode::Binary { op: BinOp::Or, lhs, rhs } => Some(format!("{} and {}", negate_condition(lhs)?, negate_condition(rhs)?)),
        AstNode::Unary { op: UnOp::Not, value } => Some(value.render()),
        _ => None,
    }
}

// ----------------------------------------------------------------------
// Relation synthesis
// ----------------------------------------------------------------------

fn synthesize_relation(ast: &[AstNode], procedure_name: &str, defs: &ReachingDefinitions, call_sites: &[RecursiveCallSite]) -> RecurrenceRelation {
    if call_sites.is_empty() {
        let work = derive_work(ast, procedure_name);
        return RecurrenceRelation::trivial(work);
    }

    // Calls in mutually exclusive branches of the same `if` run one at a
    // time; one invocation spawns the max over branches, not the sum.
    let counts = exclusive_counts(ast, procedure_name, defs);
    let mut divides: BTreeMap<u32, u32> = BTreeMap::new();
    let mut subtracts: BTreeMap<u32, u32> = BTreeMap::new();
    let mut unrecognized = 0u32;
    for (pattern, count) in counts {
        match pattern {
            PatternKey::Divide(b) => *divides.entry(b).or_insert(0) += count,
            PatternKey::Subtract(k) => *subtracts.entry(k).or_insert(0) += count,
            PatternKey::Unrecognized => unrecognized += count,
        }
    }

    let mixed = !divides.is_empty() && !subtracts.is_empty();
    if mixed || unrecognized > 0 {
        // Conservative fallback: a generic balanced two-way split
        let work = lift_constant_work(derive_work(ast, procedure_name), 2, Some(2), ast, procedure_name);
        return RecurrenceRelation::new(vec![RecursiveTerm { count: 2, reduction: Reduction::Divide { divisor: 2 } }], work);
    }

    if !divides.is_empty() {
        let terms: Vec<RecursiveTerm> = divides
            .iter()
            .map(|(divisor, count)| RecursiveTerm {
                count: *count,
                reduction: Reduction::Divide { divisor: *divisor },
            })
            .collect();
        let a: u32 = terms.iter().map(|t| t.count).sum();
        let b = divides.keys().next().copied();
        let work = lift_constant_work(derive_work(ast, procedure_name), a, b, ast, procedure_name);
        return RecurrenceRelation::new(terms, work);
    }

    let terms: Vec<RecursiveTerm> = subtracts
        .iter()
        .map(|(amount, count)| RecursiveTerm {
            count: *count,
            reduction: Reduction::Subtract { amount: *amount },
        })
        .collect();
    let work = derive_work(ast, procedure_name);
    RecurrenceRelation::new(terms, work)
}

/// Reduction pattern keyed for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PatternKey {
    Divide(u32),
    Subtract(u32),
    Unrecognized,
}

impl From<ReductionPattern> for PatternKey {
    fn from(pattern: ReductionPattern) -> Self {
        match pattern {
            ReductionPattern::DivideBy(b) => PatternKey::Divide(b),
            ReductionPattern::SubtractBy(k) => PatternKey::Subtract(k),
            ReductionPattern::Unrecognized => PatternKey::Unrecognized,
        }
    }
}

type PatternCounts = BTreeMap<PatternKey, u32>;

fn merge_sum(total: &mut PatternCounts, other: PatternCounts) {
    for (key, count) in other {
        *total.entry(key).or_insert(0) += count;
    }
}

fn merge_max(mut lhs: PatternCounts, rhs: PatternCounts) -> PatternCounts {
    for (key, count) in rhs {
        let entry = lhs.entry(key).or_insert(0);
        *entry = (*entry).max(count);
    }
    lhs
}

/// Count self-calls per reduction pattern, taking the max over the two
/// branches of an `if` (they are mutually exclusive per invocation) and
/// the sum everywhere else.
fn exclusive_counts(nodes: &[AstNode], procedure_name: &str, defs: &ReachingDefinitions) -> PatternCounts {
    let mut total = PatternCounts::new();
    for node in nodes {
        merge_sum(&mut total, node_counts(node, procedure_name, defs));
    }
    total
}

fn node_counts(node: &AstNode, procedure_name: &str, defs: &ReachingDefinitions) -> PatternCounts {
    match node {
        AstNode::If { cond, then_branch, else_branch } => {
            let mut counts = node_counts(cond, procedure_name, defs);
            let then_counts = exclusive_counts(then_branch, procedure_name, defs);
            let else_counts = else_branch.as_deref().map(|b| exclusive_counts(b, procedure_name, defs)).unwrap_or_default();
            merge_sum(&mut counts, merge_max(then_counts, else_counts));
            counts
        }
        AstNode::Call { name, args } => {
            let mut counts = PatternCounts::new();
            for arg in args {
                merge_sum(&mut counts, node_counts(arg, procedure_name, defs));
            }
            if name.eq_ignore_ascii_case(procedure_name) {
                let (pattern, _) = classify_arguments(args, defs);
                *counts.entry(pattern.into()).or_insert(0) += 1;
            }
            counts
        }
        other => {
            let mut counts = PatternCounts::new();
            for child in other.children() {
                merge_sum(&mut counts, node_counts(child, procedure_name, defs));
            }
            counts
        }
    }
}

/// Non-recursive work, derived from the cost model over the statements
/// that do not contain a self-call. Derivation comes first; the fixed
/// defaults apply only when there is nothing to derive.
fn derive_work(ast: &[AstNode], procedure_name: &str) -> CostExpr {
    let filtered = strip_self_calls(ast, procedure_name);
    if filtered.is_empty() {
        return CostExpr::zero();
    }
    let sums = cost_sums(&filtered);
    sum_closed_form(&sums.worst).expr
}

/// Divide relations whose derived work is constant: a multi-way split
/// implies a combine step, and any call into another procedure hides that
/// step's cost; assume linear work, the classical `a=2, b=2 → O(n)`
/// default. A truly empty body keeps the constant-vs-linear defaults of
/// the relation rules.
fn lift_constant_work(derived: CostExpr, a: u32, _b: Option<u32>, ast: &[AstNode], procedure_name: &str) -> CostExpr {
    let dominant = dominant_term(&derived);
    if !dominant.is_constant() {
        return derived;
    }
    if a >= 2 && has_foreign_call(ast, procedure_name) {
        debug!("constant derived work lifted to linear: combine step calls another procedure");
        return CostExpr::from_term(GrowthTerm::poly(1.0, Degree::ONE));
    }
    if derived.is_zero() {
        // Nothing to derive at all: last-resort defaults
        if a == 1 {
            return CostExpr::constant(1.0);
        }
        return CostExpr::from_term(GrowthTerm::poly(1.0, Degree::ONE));
    }
    derived
}

fn has_foreign_call(ast: &[AstNode], procedure_name: &str) -> bool {
    let mut found = false;
    for node in ast {
        node.walk(&mut |candidate| {
            if let AstNode::Call { name, .. } = candidate {
                if !name.eq_ignore_ascii_case(procedure_name) {
                    found = true;
                }
            }
        });
    }
    found
}

/// Copy the statement list without any statement that contains a
/// self-call, recursing into block bodies.
fn strip_self_calls(statements: &[AstNode], procedure_name: &str) -> Vec<AstNode> {
    let mut out = Vec::new();
    for stmt in statements {
        if contains_self_call(stmt, procedure_name) {
            match stmt {
                AstNode::ProcedureDef { name, params, body } => out.push(AstNode::ProcedureDef {
                    name: name.clone(),
                    params: params.clone(),
                    body: strip_self_calls(body, procedure_name),
                }),
                AstNode::If { cond, then_branch, else_branch } => out.push(AstNode::If {
                    cond: cond.clone(),
                    then_branch: strip_self_calls(then_branch, procedure_name),
                    else_branch: else_branch.as_ref().map(|b| strip_self_calls(b, procedure_name)),
                }),
                AstNode::For { var, from, to, body } => out.push(AstNode::For {
                    var: var.clone(),
                    from: from.clone(),
                    to: to.clone(),
                    body: strip_self_calls(body, procedure_name),
                }),
                AstNode::While { cond, body } => out.push(AstNode::While {
                    cond: cond.clone(),
                    body: strip_self_calls(body, procedure_name),
                }),
                AstNode::Repeat { body, cond } => out.push(AstNode::Repeat {
                    body: strip_self_calls(body, procedure_name),
                    cond: cond.clone(),
                }),
                // Assignments, returns and bare calls that mention the
                // procedure are the recursion itself; drop them.
                _ => {}
            }
        } else {
            out.push(stmt.clone());
        }
    }
    out
}

// ----------------------------------------------------------------------
// Recursion-tree sketch
// ----------------------------------------------------------------------

/// Bounded-depth sketch of the relation's call tree: divide relations fan
/// out `a` children per level with divided sizes; a single subtract term
/// draws the chain `n-k, n-2k, …`; multiple subtract terms draw one child
/// per term.
pub fn recursion_tree(relation: &RecurrenceRelation) -> RecursionTree {
    let mut tree = RecursionTree::new();
    let root = tree.add_node("T(n)".to_string(), 0, None);
    if relation.is_trivial() {
        return tree;
    }
    expand_node(&mut tree, relation, root, 1, 1, 0);
    tree
}

fn expand_node(tree: &mut RecursionTree, relation: &RecurrenceRelation, parent: usize, depth: u32, denominator: u64, offset: i64) {
    if depth > TREE_DEPTH || tree.nodes.len() >= TREE_NODE_LIMIT {
        return;
    }
    for term in &relation.terms {
        let (child_den, child_offset) = match term.reduction {
            Reduction::Divide { divisor } => (denominator * divisor as u64, offset),
            Reduction::Subtract { amount } => (denominator, offset + amount as i64),
        };
        for _ in 0..term.count {
            if tree.nodes.len() >= TREE_NODE_LIMIT {
                return;
            }
            let label = node_label(child_den, child_offset);
            let child = tree.add_node(label, depth, Some(parent));
            expand_node(tree, relation, child, depth + 1, child_den, child_offset);
        }
    }
}

fn node_label(denominator: u64, offset: i64) -> String {
    match (denominator, offset) {
        (1, 0) => "T(n)".to_string(),
        (1, o) => format!("T(n-{})", o),
        (d, 0) => format!("T(n/{})", d),
        (d, o) => format!("T(n/{}-{})", d, o),
    }
}
