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

//! Static analyzers over the pseudocode AST: loop discovery and cost
//! modeling for iterative algorithms, call-site/base-case extraction and
//! recurrence synthesis for recursive ones, and the best/worst/average
//! case classifier.

pub mod cases;
pub mod cost;
pub mod loops;
pub mod reaching;
pub mod recursion;

pub use cases::{case_relations, classify_cases, CaseCause, CaseMode, CaseRelations};
pub use cost::{cost_sums, elementary_cost, statement_units, CaseCosts};
pub use loops::{analyze_loops, LoopAnalysis};
pub use reaching::ReachingDefinitions;
pub use recursion::{analyze_recursion, RecursionAnalysis};
