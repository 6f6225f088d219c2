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

//! The analysis pipeline: parse pseudocode, pick the iterative or
//! recursive analyzer, solve per case, and assemble the final
//! `ComplexityResult`.
//!
//! Every call builds its own `Algorithm` and intermediate state; nothing
//! is shared between calls, so concurrent analyses need no locking.

pub mod algorithm;
pub mod pipeline;

pub use algorithm::Algorithm;
pub use pipeline::{analyze_algorithm, analyze_source, Analyzer};
