use clap::Parser;
use regex::Regex;

use std::path::{Path, PathBuf};

use brimstone_parser::js::common::logging::init_tracing;
use brimstone_parser_harness::{index::TestIndex, runner::TestRunner, utils::GenericResult};

#[derive(Parser)]
#[command(about)]
struct Args {
    /// Path to the root of the conformance corpus. If not set attempts to locate the
    /// `tests/conformance` directory of the repo automatically.
    #[arg(long)]
    corpus_dir: Option<String>,

    /// Write the test index to the given path before running
    #[arg(long)]
    save_index: Option<String>,

    /// Number of threads to use in test runner
    #[arg(short, long, default_value_t = 8)]
    threads: u8,

    /// Print extra information to console while running tests
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Optional path to write result files to. Result files will have the names
    /// <path>_success.json and <path>_failed.json.
    #[arg(long)]
    save_result_files: Option<String>,

    /// Only run tests whose path matches this regular expression
    filter: Option<String>,
}

fn main_impl() -> GenericResult {
    let args = Args::parse();

    init_tracing();

    let corpus_root = match args.corpus_dir {
        Some(corpus_dir) => PathBuf::from(corpus_dir),
        None => find_default_corpus_path()?,
    };

    let index = TestIndex::new(&corpus_root)?;

    if let Some(index_path) = &args.save_index {
        index.write_to_file(Path::new(index_path))?;
    }

    let filter = args.filter.as_deref().map(Regex::new).transpose()?;

    let mut runner = TestRunner::new(index, corpus_root, args.threads, filter);
    let results = runner.run(args.verbose);

    results.print_to_console();

    if let Some(result_files_path) = &args.save_result_files {
        results.save_to_result_files(result_files_path)?;
    }

    if !results.is_successful() {
        std::process::exit(1);
    }

    Ok(())
}

/// Wrapper to pretty print errors
fn main() {
    match main_impl() {
        Ok(_) => (),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

/// The default corpus path if none was provided, `tests/conformance` in the root of the repo.
///
/// Will only succeed when the program is run from within the repo.
fn find_default_corpus_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut path = std::env::current_dir()?;

    // Search upwards for a Cargo.toml that starts with `[workspace]`
    loop {
        let cargo_toml = path.join("Cargo.toml");
        if cargo_toml.exists() && std::fs::read_to_string(&cargo_toml)?.starts_with("[workspace]") {
            return Ok(path.join("tests").join("conformance"));
        }

        if !path.pop() {
            return Err("Could not find the root of the repository".into());
        }
    }
}
