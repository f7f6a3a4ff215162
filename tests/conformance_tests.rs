use brimstone_parser_harness::{
    index::{ExpectedResult, TestIndex},
    runner::TestRunner,
};

use std::path::Path;

#[test]
fn conformance_corpus() {
    let corpus_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("conformance");
    let index = TestIndex::new(&corpus_root).unwrap();

    let num_tests = index.tests.len();
    let num_negative = index
        .tests
        .values()
        .filter(|test| matches!(test.expected_result, ExpectedResult::Negative { .. }))
        .count();

    // Corpus pairs accepted and rejected forms
    assert!(num_negative > 0 && num_negative < num_tests);

    let mut runner = TestRunner::new(index, corpus_root, 4, None);
    let results = runner.run(false);

    let failures = results
        .failures()
        .iter()
        .map(|(path, message)| format!("{}\n{}\n", path, message))
        .collect::<Vec<_>>();

    assert!(failures.is_empty(), "\n{}", failures.join("\n"));
    assert_eq!(results.num_succeeded(), num_tests);
}

#[test]
fn conformance_filter() {
    let corpus_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("conformance");
    let index = TestIndex::new(&corpus_root).unwrap();
    let num_yield_tests = index.tests.keys().filter(|path| path.starts_with("yield")).count();

    let filter = regex::Regex::new("^yield").unwrap();
    let mut runner = TestRunner::new(index, corpus_root, 2, Some(filter));
    let results = runner.run(false);

    assert!(results.is_successful());
    assert_eq!(results.num_succeeded(), num_yield_tests);
}
