use brimstone_parser::js::{
    common::options::ParseOptions,
    parser::{parse_script, print_program, source::Source},
};

use std::{cmp::min, env, error, fs, path::Path, rc::Rc};

type GenericResult<T> = Result<T, Box<dyn error::Error>>;

const RECORD_ENV_VAR: &str = "RECORD";

const OPTIONS_PREFIX: &str = "// OPTIONS:";

struct TestEnv {
    errors: Vec<String>,
}

#[test]
fn js_parser_snapshot_tests() -> GenericResult<()> {
    let parser_tests_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("js_parser");
    run_snapshot_tests(&parser_tests_dir, &mut |path| print_ast(path))
}

/// Parse the file and print its ESTree JSON, or the error kind and message if parsing fails.
fn print_ast(path: &str) -> GenericResult<String> {
    let source = Rc::new(Source::new_from_file(path)?);
    let options = options_for_file(&source.contents);

    match parse_script(&source, &options) {
        Ok(program) => Ok(print_program(&program, &source, options.record_source_locations)),
        Err(err) => Ok(format!("{:?}: {}", err.kind(), err.error)),
    }
}

/// Test files may start with a line like `// OPTIONS: --strict --no-web-compat`.
fn options_for_file(contents: &str) -> ParseOptions {
    let mut options = ParseOptions::default();

    let first_line = contents.lines().next().unwrap_or("");
    if let Some(args) = first_line.strip_prefix(OPTIONS_PREFIX) {
        for arg in args.split_whitespace() {
            match arg {
                "--strict" => options.strict = true,
                "--no-web-compat" => options.disable_web_compat = true,
                "--locations" => options.record_source_locations = true,
                other => panic!("Unknown test option {}", other),
            }
        }
    }

    options
}

/// Run snapshot tests for all js files under the given directory.
///
/// Individual tests implemented as a function that takes in a path and returns the output of the
/// test.
fn run_snapshot_tests(
    root_path: &Path,
    test_fn: &mut impl FnMut(&str) -> GenericResult<String>,
) -> GenericResult<()> {
    let mut env = TestEnv { errors: vec![] };
    visit_directory(&mut env, root_path, test_fn)?;

    if !env.errors.is_empty() {
        assert_eq!("actual", "expected", "\n{}\n", env.errors.join(""))
    }

    Ok(())
}

/// Recursively visit all subdirectories under the target directory, searching for js files.
fn visit_directory(
    env: &mut TestEnv,
    path: &Path,
    test_fn: &mut impl FnMut(&str) -> GenericResult<String>,
) -> GenericResult<()> {
    let mut entries = fs::read_dir(path)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            visit_directory(env, &path, test_fn)?
        } else if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("js") {
            process_snapshot_test_file(env, &path, test_fn)?
        }
    }

    Ok(())
}

/// Compare actual vs expected output for the test file with the given path.
fn process_snapshot_test_file(
    env: &mut TestEnv,
    path: &Path,
    test_fn: &mut impl FnMut(&str) -> GenericResult<String>,
) -> GenericResult<()> {
    let path_str = path.to_str().unwrap();
    let exp_path = path.with_extension("exp");

    let actual = test_fn(path_str)?;

    let expected = if exp_path.exists() {
        fs::read_to_string(&exp_path)?
    } else {
        String::new()
    };

    if actual != expected {
        if env::var(RECORD_ENV_VAR).is_ok() {
            fs::write(&exp_path, &actual)?;
        }

        env.errors.push(find_diff_snippet(path, &actual, &expected))
    }

    Ok(())
}

const RED: &str = "\u{001B}[31m";
const GREEN: &str = "\u{001B}[32m";
const RESET: &str = "\u{001B}[0m";
const BOLD: &str = "\u{001B}[1m";

/// Find and format a snippet showing the difference between the two strings.
fn find_diff_snippet(path: &Path, actual: &str, expected: &str) -> String {
    let actual_lines = actual.lines().collect::<Vec<&str>>();
    let expected_lines = expected.lines().collect::<Vec<&str>>();

    // First line that differs
    let i = actual_lines
        .iter()
        .zip(expected_lines.iter())
        .take_while(|(actual, expected)| actual == expected)
        .count();

    let snippet = |lines: &[&str], marker: &str, color: &str| {
        if i == lines.len() {
            return String::new();
        }

        let snippet_end = min(i + 10, lines.len());
        let joined = lines[i..snippet_end].join(&format!("\n{} ", marker));
        format!("{}{}{} {}{}", color, BOLD, marker, joined, RESET)
    };

    format!(
        "\n{}\nActual and expected differ on line {}\n{}\n{}\n",
        path.display(),
        i + 1,
        snippet(&expected_lines, "-", GREEN),
        snippet(&actual_lines, "+", RED),
    )
}
