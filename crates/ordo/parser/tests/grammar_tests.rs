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

//! Grammar-level integration tests over full algorithm sources.

use ordo_parser::{parse, AstNode};
use proptest::prelude::*;

const BUBBLE_SORT: &str = r#"bubble_sort(A, n)
begin
    swapped 🡨 T
    i 🡨 0
    while (swapped = T) do
    begin
        swapped 🡨 F
        for j 🡨 0 to n - 2 - i do
        begin
            if (A[j] > A[j+1]) then
            begin
                temp 🡨 A[j]
                A[j] 🡨 A[j+1]
                A[j+1] 🡨 temp
                swapped 🡨 T
            end
        end
        i 🡨 i + 1
    end
    return A
end"#;

const BINARY_SEARCH: &str = r#"binary_search(A, x, n)
begin
    low 🡨 0
    high 🡨 n - 1
    while (low <= high) do
    begin
        mid 🡨 (low + high) div 2
        if (A[mid] = x) then
        begin
            return mid
        end
        if (A[mid] < x) then
        begin
            low 🡨 mid + 1
        end
        else
        begin
            high 🡨 mid - 1
        end
    end
    return -1
end"#;

#[test]
fn parses_bubble_sort_corpus_sample() {
    let ast = parse(BUBBLE_SORT).expect("bubble sort parses");
    assert_eq!(ast.len(), 1);
    let AstNode::ProcedureDef { name, params, body } = &ast[0] else {
        panic!("expected a procedure definition");
    };
    assert_eq!(name, "bubble_sort");
    assert_eq!(params.len(), 2);
    assert!(!body.is_empty());
}

#[test]
fn parses_binary_search_corpus_sample() {
    let ast = parse(BINARY_SEARCH).expect("binary search parses");
    let AstNode::ProcedureDef { body, .. } = &ast[0] else {
        panic!("expected a procedure definition");
    };
    // low, high, while, return
    assert_eq!(body.len(), 4);
}

#[test]
fn parse_twice_is_deep_equal_on_corpus() {
    for source in [BUBBLE_SORT, BINARY_SEARCH] {
        let first = parse(source).expect("parse");
        let second = parse(source).expect("parse");
        assert_eq!(first, second);
    }
}

/// Tiny generator of syntactically valid programs: assignments and nested
/// `for` loops with arithmetic right-hand sides.
fn arb_program() -> impl Strategy<Value = String> {
    let assign = (prop::sample::select(vec!["x", "y", "z", "acc"]), 0i64..100).prop_map(|(var, value)| format!("{} 🡨 {}", var, value));

    let stmt = assign.clone();
    (prop::collection::vec(stmt, 1..4), 0u32..3).prop_map(|(stmts, depth)| {
        let mut body = stmts.join("\n");
        for level in 0..depth {
            body = format!("for i{} 🡨 1 to n do\nbegin\n{}\nend", level, body);
        }
        body
    })
}

proptest! {
    /// Parsing the same source twice yields structurally identical trees.
    #[test]
    fn parse_is_idempotent(source in arb_program()) {
        let first = parse(&source).expect("generated program parses");
        let second = parse(&source).expect("generated program parses");
        prop_assert_eq!(first, second);
    }

    /// Every generated statement round-trips into a known node kind.
    #[test]
    fn generated_programs_have_expected_shape(source in arb_program()) {
        let ast = parse(&source).expect("generated program parses");
        for node in &ast {
            prop_assert!(
                matches!(node, AstNode::Assign { .. } | AstNode::For { .. }),
                "unexpected node kind: {:?}",
                node
            );
        }
    }
}
