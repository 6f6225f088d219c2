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

//! Analysis controllers: one per algorithm kind, behind a common trait and
//! an explicit dispatch enum. Notation is fixed by case (Ω for best, O
//! for worst, Θ for average and uniform) and never inferred from the solved
//! value. The three per-case solves are independent pure computations.

use crate::algorithm::Algorithm;
use ordo_analysis::{analyze_loops, analyze_recursion, case_relations, classify_cases, cost_sums, recursion, CaseMode, LoopAnalysis, RecursionAnalysis};
use ordo_common::{AlgorithmKind, AnalysisWarning, CaseLabel, CaseReport, ComplexityResult, ParseResult, RecurrenceRelation, RecursionTree, SumExpr};
use ordo_solver::{dominant_term, solve_relation, sum_closed_form};
use ordo_parser::AstNode;
use tracing::info;

/// Parse and fully analyze one pseudocode source.
pub fn analyze_source(name: &str, source: &str) -> ParseResult<ComplexityResult> {
    let algorithm = Algorithm::parse(name, source)?;
    Ok(analyze_algorithm(&algorithm))
}

/// Run the kind-appropriate controller over a parsed algorithm.
pub fn analyze_algorithm(algorithm: &Algorithm) -> ComplexityResult {
    let mut controller = match algorithm.kind {
        AlgorithmKind::Iterative => Controller::Iterative(IterativeAnalyzer::new(algorithm)),
        AlgorithmKind::Recursive => Controller::Recursive(RecursiveAnalyzer::new(algorithm)),
    };
    controller.analyze();
    controller.solve();
    controller.export()
}

/// The controller contract: gather artifacts, solve per case, export the
/// combined result.
pub trait Analyzer {
    fn analyze(&mut self);
    fn solve(&mut self);
    fn export(self) -> ComplexityResult;
}

/// Explicit dispatch over the two controllers.
enum Controller<'a> {
    Iterative(IterativeAnalyzer<'a>),
    Recursive(RecursiveAnalyzer<'a>),
}

impl Controller<'_> {
    fn analyze(&mut self) {
        match self {
            Controller::Iterative(inner) => inner.analyze(),
            Controller::Recursive(inner) => inner.analyze(),
        }
    }

    fn solve(&mut self) {
        match self {
            Controller::Iterative(inner) => inner.solve(),
            Controller::Recursive(inner) => inner.solve(),
        }
    }

    fn export(self) -> ComplexityResult {
        match self {
            Controller::Iterative(inner) => inner.export(),
            Controller::Recursive(inner) => inner.export(),
        }
    }
}

// ----------------------------------------------------------------------
// Iterative controller
// ----------------------------------------------------------------------

struct IterativeAnalyzer<'a> {
    algorithm: &'a Algorithm,
    loops: LoopAnalysis,
    recursion: Option<RecursionAnalysis>,
    mode: CaseMode,
    warnings: Vec<AnalysisWarning>,
    reports: Option<(CaseReport, CaseReport, CaseReport)>,
}

impl<'a> IterativeAnalyzer<'a> {
    fn new(algorithm: &'a Algorithm) -> Self {
        Self {
            algorithm,
            loops: LoopAnalysis {
                loops: Vec::new(),
                max_nesting_depth: 0,
            },
            recursion: None,
            mode: CaseMode::Uniform,
            warnings: Vec::new(),
            reports: None,
        }
    }

    fn solve_case(&self, label: CaseLabel, sum: &[SumExpr]) -> CaseReport {
        // Close the cost sum, then classify its dominant term through the
        // dispatcher's trivial path.
        let closed = sum_closed_form(sum);
        let relation = RecurrenceRelation::trivial(closed.expr.clone());
        let (outcome, _) = solve_relation(&relation);

        let mut steps = closed.steps;
        steps.extend(outcome.steps);
        CaseReport {
            case: label,
            notation: label.notation(),
            complexity: dominant_term(&outcome.closed_form).witness(),
            closed_form: outcome.closed_form,
            method: outcome.method.name().to_string(),
            steps,
        }
    }
}

impl Analyzer for IterativeAnalyzer<'_> {
    fn analyze(&mut self) {
        self.loops = analyze_loops(&self.algorithm.ast);
        let recursion = analyze_recursion(&self.algorithm.ast, &self.algorithm.name);
        self.mode = classify_cases(&self.algorithm.ast, &recursion);
        self.recursion = Some(recursion);
        if is_empty_program(&self.algorithm.ast) {
            self.warnings.push(AnalysisWarning::EmptyStructure);
        }
    }

    fn solve(&mut self) {
        let sums = cost_sums(&self.algorithm.ast);
        let best = self.solve_case(CaseLabel::Best, &sums.best);
        let worst = self.solve_case(CaseLabel::Worst, &sums.worst);
        let average = self.solve_case(CaseLabel::Average, &sums.average);
        info!(algorithm = %self.algorithm.name, worst = %worst.bound(), "iterative analysis solved");
        self.reports = Some((best, worst, average));
    }

    fn export(self) -> ComplexityResult {
        let (best, worst, average) = self.reports.expect("solve runs before export");
        let mut warnings = self.warnings;
        if let Some(recursion) = &self.recursion {
            warnings.extend(recursion.warnings.clone());
        }
        ComplexityResult {
            algorithm: self.algorithm.name.clone(),
            kind: AlgorithmKind::Iterative,
            has_multiple_cases: self.mode.has_multiple_cases(),
            best,
            worst,
            average,
            loops: self.loops.loops,
            max_nesting_depth: self.loops.max_nesting_depth,
            call_sites: Vec::new(),
            base_cases: Vec::new(),
            trees: Vec::new(),
            warnings,
        }
    }
}

// ----------------------------------------------------------------------
// Recursive controller
// ----------------------------------------------------------------------

struct RecursiveAnalyzer<'a> {
    algorithm: &'a Algorithm,
    loops: LoopAnalysis,
    recursion: Option<RecursionAnalysis>,
    mode: CaseMode,
    warnings: Vec<AnalysisWarning>,
    trees: Vec<RecursionTree>,
    reports: Option<(CaseReport, CaseReport, CaseReport)>,
}

impl<'a> RecursiveAnalyzer<'a> {
    fn new(algorithm: &'a Algorithm) -> Self {
        Self {
            algorithm,
            loops: LoopAnalysis {
                loops: Vec::new(),
                max_nesting_depth: 0,
            },
            recursion: None,
            mode: CaseMode::Uniform,
            warnings: Vec::new(),
            trees: Vec::new(),
            reports: None,
        }
    }

    fn solve_case(&mut self, label: CaseLabel, relation: &RecurrenceRelation) -> CaseReport {
        let (outcome, warning) = solve_relation(relation);
        if let Some(warning) = warning {
            self.warnings.push(warning);
        }
        let mut steps = vec![format!("{} case relation: {}", label, relation)];
        steps.extend(outcome.steps);
        CaseReport {
            case: label,
            notation: label.notation(),
            complexity: dominant_term(&outcome.closed_form).witness(),
            closed_form: outcome.closed_form,
            method: outcome.method.name().to_string(),
            steps,
        }
    }
}

impl Analyzer for RecursiveAnalyzer<'_> {
    fn analyze(&mut self) {
        self.loops = analyze_loops(&self.algorithm.ast);
        let recursion = analyze_recursion(&self.algorithm.ast, &self.algorithm.name);
        self.warnings.extend(recursion.warnings.clone());
        self.mode = classify_cases(&self.algorithm.ast, &recursion);
        self.recursion = Some(recursion);
        if is_empty_program(&self.algorithm.ast) {
            self.warnings.push(AnalysisWarning::EmptyStructure);
        }
    }

    fn solve(&mut self) {
        let analysis = self.recursion.clone().expect("analyze runs before solve");
        let relations = case_relations(&analysis.relation, self.mode);

        // One tree sketch per distinct case relation
        self.trees.push(analysis.tree.clone());
        if self.mode.has_multiple_cases() {
            self.trees = vec![
                recursion::recursion_tree(&relations.best),
                recursion::recursion_tree(&relations.worst),
                recursion::recursion_tree(&relations.average),
            ];
        }

        // Independent pure computations; no ordering requirement
        let best = self.solve_case(CaseLabel::Best, &relations.best);
        let worst = self.solve_case(CaseLabel::Worst, &relations.worst);
        let average = self.solve_case(CaseLabel::Average, &relations.average);
        info!(
            algorithm = %self.algorithm.name,
            best = %best.bound(),
            worst = %worst.bound(),
            average = %average.bound(),
            "recursive analysis solved"
        );
        self.reports = Some((best, worst, average));
    }

    fn export(self) -> ComplexityResult {
        let (best, worst, average) = self.reports.expect("solve runs before export");
        let analysis = self.recursion.expect("analyze runs before export");
        ComplexityResult {
            algorithm: self.algorithm.name.clone(),
            kind: AlgorithmKind::Recursive,
            has_multiple_cases: self.mode.has_multiple_cases(),
            best,
            worst,
            average,
            loops: self.loops.loops,
            max_nesting_depth: self.loops.max_nesting_depth,
            call_sites: analysis.call_sites,
            base_cases: analysis.base_cases,
            trees: self.trees,
            warnings: self.warnings,
        }
    }
}

/// A program whose statements carry no analyzable work.
fn is_empty_program(ast: &[AstNode]) -> bool {
    ast.iter().all(|node| matches!(node, AstNode::Comment(_) | AstNode::ClassDef { .. } | AstNode::ObjectDecl { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_common::Notation;

    #[test]
    fn test_notation_is_fixed_by_case() {
        let result = analyze_source("sum", "for i 🡨 1 to n do\nbegin\n    s 🡨 s + i\nend").expect("analyze");
        assert_eq!(result.best.notation, Notation::BigOmega);
        assert_eq!(result.worst.notation, Notation::BigO);
        assert_eq!(result.average.notation, Notation::BigTheta);
    }

    #[test]
    fn test_empty_program_yields_structured_result() {
        let result = analyze_source("empty", "// nothing here").expect("analyze");
        assert!(result.warnings.contains(&AnalysisWarning::EmptyStructure));
        assert_eq!(result.worst.complexity, "1");
    }

    #[test]
    fn test_parse_error_is_surfaced() {
        assert!(analyze_source("bad", "x = 5").is_err());
    }

    #[test]
    fn test_uniform_iterative_has_single_case() {
        let result = analyze_source("sum", "for i 🡨 1 to n do\nbegin\n    s 🡨 s + i\nend").expect("analyze");
        assert!(!result.has_multiple_cases);
        assert_eq!(result.worst.complexity, result.average.complexity);
    }
}
