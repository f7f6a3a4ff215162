use regex::Regex;
use serde_json::{self, json};
use threadpool::ThreadPool;
use tracing::debug;

use std::{
    collections::BTreeMap,
    fs,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    rc::Rc,
    sync::mpsc::channel,
    time::{Duration, SystemTime},
};

use crate::{
    index::{ExpectedResult, Test, TestIndex, TestMode, TestPhase},
    table::{format_table, TableCell},
    utils::{GenericResult, BOLD, DIM, GREEN, RED, RESET, WHITE},
};

use brimstone_parser::js::{
    common::options::ParseOptions,
    parser::{parse_script, source::Source, ParseError},
};

pub struct TestRunner {
    index: TestIndex,
    corpus_root: PathBuf,
    thread_pool: ThreadPool,
    filter: Option<Regex>,
}

// Runner threads have an 8MB stack, deeply nested test sources recurse deeply in the parser
const RUNNER_THREAD_STACK_SIZE: usize = 1 << 23;

impl TestRunner {
    pub fn new(
        index: TestIndex,
        corpus_root: PathBuf,
        num_threads: u8,
        filter: Option<Regex>,
    ) -> TestRunner {
        let thread_pool = threadpool::Builder::new()
            .num_threads(num_threads.max(1).into())
            .thread_stack_size(RUNNER_THREAD_STACK_SIZE)
            .build();

        TestRunner { index, corpus_root, thread_pool, filter }
    }

    pub fn run(&mut self, verbose: bool) -> TestResults {
        let (sender, receiver) = channel::<TestResult>();
        let mut num_jobs = 0;
        let mut num_skipped: BTreeMap<String, u64> = BTreeMap::new();

        let all_tests_start_timestamp = SystemTime::now();

        for (i, test) in self.index.tests.values().enumerate() {
            // If a filter was provided then skip all tests that do not match the filter
            if let Some(filter) = &self.filter {
                if !filter.is_match(&test.path) {
                    *num_skipped.entry(test.category.clone()).or_default() += 1;
                    continue;
                }
            }

            // Runtime errors cannot be observed by a parser
            if let ExpectedResult::Negative { phase: TestPhase::Runtime, .. } = test.expected_result
            {
                *num_skipped.entry(test.category.clone()).or_default() += 1;
                continue;
            }

            let test = test.clone();
            let sender = sender.clone();
            let test_path = self.corpus_root.join(&test.path);

            num_jobs += 1;

            self.thread_pool.execute(move || {
                let start_timestamp = SystemTime::now();

                let panic_result = panic::catch_unwind(AssertUnwindSafe(|| {
                    if verbose {
                        println!("{i}: {}", test.path);
                    }

                    run_full_test(&test, &test_path)
                }));

                let duration = start_timestamp.elapsed().unwrap_or_default();

                let result = match panic_result {
                    Ok(Ok(())) => TestResult::success(&test, duration),
                    Ok(Err(message)) => TestResult::failure(&test, message, duration),
                    Err(err) => {
                        // Attempt to extract string message from panic
                        let message = err
                            .downcast_ref::<&str>()
                            .map(|message| message.to_string())
                            .or_else(|| err.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| String::from("<panic message not found>"));

                        let message = format!("Thread panicked:\n{}", message);
                        TestResult::failure(&test, message, duration)
                    }
                };

                // The receiver only hangs up once every job has been collected
                let _ = sender.send(result);
            });
        }

        let results: Vec<TestResult> = receiver.iter().take(num_jobs).collect();

        let total_duration = all_tests_start_timestamp.elapsed().unwrap_or_default();
        TestResults::collate(results, num_skipped, total_duration)
    }
}

/// Run a test in every mode it applies to, stopping at the first failing mode.
fn run_full_test(test: &Test, test_path: &Path) -> Result<(), String> {
    let source = match Source::new_from_file(&test_path.to_string_lossy()) {
        Ok(source) => Rc::new(source),
        Err(err) => return Err(format!("Could not load test file:\n{}", err)),
    };

    match test.mode {
        TestMode::StrictScript => run_single_test(test, &source, true),
        TestMode::NonStrictScript => run_single_test(test, &source, false),
        // Both modes must pass for this test to be successful
        TestMode::Script => {
            run_single_test(test, &source, false)?;
            run_single_test(test, &source, true)
        }
    }
}

fn run_single_test(
    test: &Test,
    source: &Rc<Source>,
    force_strict_mode: bool,
) -> Result<(), String> {
    let options = ParseOptions {
        strict: force_strict_mode,
        disable_web_compat: test.no_web_compat,
        record_source_locations: false,
    };

    let mode = if force_strict_mode { "strict" } else { "non-strict" };
    debug!(path = %test.path, mode, "running test");

    match (parse_script(source, &options), &test.expected_result) {
        (Ok(_), ExpectedResult::Positive) => Ok(()),
        (Ok(_), expected @ ExpectedResult::Negative { .. }) => Err(format!(
            "Parsing succeeded in {} mode, but expected {}",
            mode, expected
        )),
        (Err(err), ExpectedResult::Negative { phase: TestPhase::Parse, type_ })
            if !matches!(err.error, ParseError::Io(_)) =>
        {
            // Every error reported by the parser is a SyntaxError
            if type_ == "SyntaxError" {
                Ok(())
            } else {
                Err(format!(
                    "Expected {} during parsing in {} mode, but found:\n{}",
                    type_, mode, err
                ))
            }
        }
        (Err(err), _) => {
            Err(format!("Unexpected error during parsing in {} mode:\n{}", mode, err))
        }
    }
}

struct TestResult {
    path: String,
    category: String,
    result: TestResultCompletion,
    // Total time this test took to run
    time: Duration,
}

#[derive(PartialEq)]
enum TestResultCompletion {
    Success,
    Failure(String),
}

impl TestResult {
    fn success(test: &Test, time: Duration) -> TestResult {
        TestResult {
            path: test.path.clone(),
            category: test.category.clone(),
            result: TestResultCompletion::Success,
            time,
        }
    }

    fn failure(test: &Test, message: String, time: Duration) -> TestResult {
        TestResult {
            path: test.path.clone(),
            category: test.category.clone(),
            result: TestResultCompletion::Failure(message),
            time,
        }
    }
}

pub struct TestResults {
    /// Succeeded tests in each category
    succeeded: BTreeMap<String, Vec<TestResult>>,
    /// Failed tests in each category
    failed: BTreeMap<String, Vec<TestResult>>,
    /// Count of skipped tests in each category
    num_skipped: BTreeMap<String, u64>,
    /// Total duration of the entire test run
    total_duration: Duration,
}

impl TestResults {
    fn collate(
        results: Vec<TestResult>,
        num_skipped: BTreeMap<String, u64>,
        total_duration: Duration,
    ) -> TestResults {
        let mut collated = TestResults {
            succeeded: BTreeMap::new(),
            failed: BTreeMap::new(),
            num_skipped,
            total_duration,
        };

        for result in results {
            let results = match result.result {
                TestResultCompletion::Success => &mut collated.succeeded,
                TestResultCompletion::Failure(_) => &mut collated.failed,
            };

            results.entry(result.category.clone()).or_default().push(result);
        }

        collated
            .succeeded
            .values_mut()
            .chain(collated.failed.values_mut())
            .for_each(|results| results.sort_by(|a, b| a.path.cmp(&b.path)));

        collated
    }

    pub fn is_successful(&self) -> bool {
        self.failed.values().all(|results| results.is_empty())
    }

    pub fn num_succeeded(&self) -> usize {
        self.succeeded.values().map(Vec::len).sum()
    }

    /// Paths and messages of all failed tests, in path order within each category.
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.failed
            .values()
            .flatten()
            .filter_map(|failed| match &failed.result {
                TestResultCompletion::Failure(message) => {
                    Some((failed.path.as_str(), message.as_str()))
                }
                TestResultCompletion::Success => None,
            })
            .collect()
    }

    /// All categories that had at least one test succeed, fail, or be skipped.
    fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self
            .succeeded
            .keys()
            .chain(self.failed.keys())
            .chain(self.num_skipped.keys())
            .map(String::as_str)
            .collect();

        categories.sort_unstable();
        categories.dedup();

        categories
    }

    pub fn print_to_console(&self) {
        for (path, message) in self.failures() {
            println!("{}{}Failed{}: {}\n{}\n", BOLD, RED, RESET, path, message);
        }

        let status = if self.is_successful() {
            format!("{}{}Passed{}", BOLD, GREEN, RESET)
        } else {
            format!("{}{}Failed{}", BOLD, RED, RESET)
        };

        println!(
            "{}: {}Tests completed in {:.2} seconds{}\n",
            status,
            BOLD,
            self.total_duration.as_secs_f64(),
            RESET,
        );

        let mut rows = vec![vec![
            TableCell::new(String::new()),
            TableCell::new("Succeeded".to_owned()).with_modifiers(&[BOLD, GREEN]),
            TableCell::new("Failed".to_owned()).with_modifiers(&[BOLD, RED]),
            TableCell::new("Skipped".to_owned()).with_modifiers(&[BOLD, DIM, WHITE]),
        ]];

        for category in self.categories() {
            let count = |results: &BTreeMap<String, Vec<TestResult>>| {
                results.get(category).map_or(0, Vec::len).to_string()
            };
            let num_skipped = self.num_skipped.get(category).copied().unwrap_or(0);

            rows.push(vec![
                TableCell::new(category.to_owned()).with_modifiers(&[BOLD]).align_left(),
                TableCell::new(count(&self.succeeded)),
                TableCell::new(count(&self.failed)),
                TableCell::new(num_skipped.to_string()),
            ]);
        }

        println!("{}", format_table(&rows));
    }

    /// Write the paths of all succeeded and failed tests to `<path>_success.json` and
    /// `<path>_failed.json`.
    pub fn save_to_result_files(&self, result_files_path: &str) -> GenericResult {
        let to_json = |results: &BTreeMap<String, Vec<TestResult>>| {
            let entries: Vec<_> = results
                .values()
                .flatten()
                .map(|result| {
                    let message = match &result.result {
                        TestResultCompletion::Failure(message) => Some(message),
                        TestResultCompletion::Success => None,
                    };

                    json!({
                        "path": result.path,
                        "category": result.category,
                        "time": result.time.as_secs_f64(),
                        "message": message,
                    })
                })
                .collect();

            serde_json::to_string_pretty(&entries)
        };

        fs::write(format!("{}_success.json", result_files_path), to_json(&self.succeeded)?)?;
        fs::write(format!("{}_failed.json", result_files_path), to_json(&self.failed)?)?;

        Ok(())
    }
}
