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

//! Shared types for the Ordo complexity analyzer: source positions, error
//! and warning kinds, the symbolic cost algebra values, structured
//! recurrence relations, and the serializable analysis artifacts.

pub mod algebra;
pub mod error;
pub mod position;
pub mod relation;
pub mod report;

pub use algebra::{Bound, CostExpr, Degree, GrowthTerm, IterCount, SumExpr, Summation};
pub use error::{AnalysisWarning, ParseError, ParseErrorKind, ParseResult};
pub use position::{Position, PositionTracker, Span};
pub use relation::{RecurrenceRelation, RecursiveTerm, Reduction};
pub use report::{
    AlgorithmKind, BaseCase, BaseCaseOrigin, CaseLabel, CaseReport, ComplexityResult, LoopDescriptor, LoopKind, Notation, RangeShape, RecursionTree, RecursiveCallSite, ReductionPattern,
    TreeNode,
};
