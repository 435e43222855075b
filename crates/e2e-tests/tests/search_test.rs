//! Boolean search E2E tests.
//!
//! Operators must agree with set algebra over the results of their operands.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;

use e2e_tests::{ids, TestHarness, BEACH, MALL, NEW_YORK, NEW_YORK_OR_JAPAN};
use kai_search::{parse_query, SearchError};

const ORIGIN: &str = "peter@peter.co.nz";

#[test]
fn test_peter_boat_scenarios() {
    let harness = TestHarness::new();
    let beach = harness.index(ORIGIN, BEACH)[0].id;
    let mall = harness.index(ORIGIN, MALL)[0].id;
    let evaluator = harness.evaluator();

    let found = evaluator.search("any(Peter)", ORIGIN).unwrap();
    assert_eq!(ids(&found), BTreeSet::from([beach, mall]));

    let found = evaluator.search("any(Peter) and any(boat)", ORIGIN).unwrap();
    assert_eq!(ids(&found), BTreeSet::from([beach]));

    let found = evaluator.search("any(boat) or any(movie)", ORIGIN).unwrap();
    assert_eq!(ids(&found), BTreeSet::from([beach, mall]));

    let found = evaluator.search("any(Peter) and not any(movie)", ORIGIN).unwrap();
    assert_eq!(ids(&found), BTreeSet::from([beach]));
}

#[test]
fn test_operators_match_set_algebra() {
    let harness = TestHarness::new();
    harness.index(ORIGIN, BEACH);
    harness.index(ORIGIN, MALL);
    harness.index(ORIGIN, NEW_YORK);
    harness.index(ORIGIN, NEW_YORK_OR_JAPAN);
    let evaluator = harness.evaluator();

    let leaves = ["any(Peter)", "any(text)", "any(Japan)", "any(movie)", "any(submarine)"];
    for a in leaves {
        for b in leaves {
            let left = ids(&evaluator.search(a, ORIGIN).unwrap());
            let right = ids(&evaluator.search(b, ORIGIN).unwrap());

            let and = ids(&evaluator.search(&format!("{} and {}", a, b), ORIGIN).unwrap());
            let or = ids(&evaluator.search(&format!("{} or {}", a, b), ORIGIN).unwrap());
            let not = ids(&evaluator.search(&format!("{} and not {}", a, b), ORIGIN).unwrap());

            assert_eq!(and, &left & &right, "{} and {}", a, b);
            assert_eq!(or, &left | &right, "{} or {}", a, b);
            assert_eq!(not, &left - &right, "{} and not {}", a, b);
        }
    }
}

#[test]
fn test_and_concatenates_match_lists() {
    let harness = TestHarness::new();
    let beach = harness.index(ORIGIN, BEACH)[0].id;
    let evaluator = harness.evaluator();

    let found = evaluator.search("any(Peter) and any(beach)", ORIGIN).unwrap();
    let words: Vec<&str> = found[&beach].iter().map(|m| m.entry.word.as_str()).collect();
    assert_eq!(words, vec!["peter", "beach"]);
}

#[test]
fn test_brackets_group() {
    let harness = TestHarness::new();
    let beach = harness.index(ORIGIN, BEACH)[0].id;
    let mall = harness.index(ORIGIN, MALL)[0].id;
    let evaluator = harness.evaluator();

    // right-nested: boat or (movie and mall)
    let found = evaluator.search("any(boat) or any(movie) and any(mall)", ORIGIN).unwrap();
    assert_eq!(ids(&found), BTreeSet::from([beach, mall]));

    let found = evaluator
        .search("(any(boat) or any(movie)) and any(beach)", ORIGIN)
        .unwrap();
    assert_eq!(ids(&found), BTreeSet::from([beach]));
}

#[test]
fn test_qualifiers_parse_but_do_not_filter() {
    let harness = TestHarness::new();
    let beach = harness.index(ORIGIN, BEACH)[0].id;
    let evaluator = harness.evaluator();

    let node = parse_query("exact location(beach)").unwrap();
    let leaf = node.as_word().unwrap();
    assert!(leaf.exact);
    assert_eq!(leaf.tag.as_deref(), Some("NNP"));

    // "beach" is tagged NN in the index, yet the leaf still matches it
    let found = evaluator.evaluate(&node, ORIGIN).unwrap();
    assert_eq!(ids(&found), BTreeSet::from([beach]));
}

#[test]
fn test_malformed_queries_are_rejected() {
    let harness = TestHarness::new();
    let evaluator = harness.evaluator();

    for query in ["", "any(Peter) and", "any(Peter", "(any(Peter)", "boat", "any(Peter) any(boat)"] {
        let result = evaluator.search(query, ORIGIN);
        assert!(
            matches!(result, Err(SearchError::Parse { .. })),
            "query {:?} should not parse",
            query
        );
    }
}
