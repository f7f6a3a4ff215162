use serde::{Deserialize, Serialize};
use yaml_rust::{Yaml, YamlLoader};

use std::{collections::BTreeMap, fmt, fs, path::Path};

use crate::utils::{GenericError, GenericResult};

/// A single conformance test file along with its metadata
#[derive(Clone, Serialize, Deserialize)]
pub struct Test {
    /// Path to the test file. Relative to the corpus root.
    pub path: String,
    /// Top level directory of the test, used to group results.
    pub category: String,
    pub description: Option<String>,
    pub expected_result: ExpectedResult,
    pub mode: TestMode,
    /// Parse with web compatibility syntax disabled.
    pub no_web_compat: bool,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpectedResult {
    // Tests that are expected to parse without error
    Positive,
    // Tests that are expected to fail with an error in the given phase
    Negative { phase: TestPhase, type_: String },
}

#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TestPhase {
    Parse,
    Runtime,
}

#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TestMode {
    // Parse as script, both in strict and non-strict mode
    Script,
    // Parse as script in strict mode only
    StrictScript,
    // Parse as script in non-strict mode only
    NonStrictScript,
}

impl fmt::Display for ExpectedResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExpectedResult::Positive => write!(f, "no error to be thrown"),
            ExpectedResult::Negative { phase, type_ } => {
                let phase_string = match phase {
                    TestPhase::Parse => "parsing",
                    TestPhase::Runtime => "evaluation",
                };

                write!(f, "{} to be thrown during {}", type_, phase_string)
            }
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TestIndex {
    // Tests indexed by test path, in path order
    pub tests: BTreeMap<String, Test>,
}

impl TestIndex {
    /// Index every js file under the corpus root.
    pub fn new(corpus_root: &Path) -> Result<TestIndex, GenericError> {
        let mut index = TestIndex { tests: BTreeMap::new() };
        index.visit_directory(corpus_root, corpus_root)?;

        Ok(index)
    }

    pub fn write_to_file(&self, index_path: &Path) -> GenericResult {
        let index_string = serde_json::to_string_pretty(self)?;
        fs::write(index_path, index_string)?;

        Ok(())
    }

    /// Recursively visit all subdirectories under the target directory, searching for js files.
    fn visit_directory(&mut self, corpus_root: &Path, path: &Path) -> GenericResult {
        for entry in fs::read_dir(path)? {
            let path = entry?.path();
            if path.is_dir() {
                self.visit_directory(corpus_root, &path)?
            } else if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("js")
            {
                let relative_path = path.strip_prefix(corpus_root)?.to_string_lossy().into_owned();
                let contents = fs::read_to_string(&path)?;

                let test = parse_test_metadata(&relative_path, &contents)?;
                self.tests.insert(relative_path, test);
            }
        }

        Ok(())
    }
}

/// Build a test from the YAML metadata comment, delimited by `/*---` and `---*/`, found in the
/// test file's contents.
pub fn parse_test_metadata(path: &str, contents: &str) -> Result<Test, GenericError> {
    let metadata_error = || -> GenericError {
        format!(
            "No metadata comment found in test file {}. Metadata comment must start with '/*---' \
             and end with '---*/'",
            path
        )
        .into()
    };

    let comment_start = contents.find("/*---").ok_or_else(metadata_error)?;
    let comment_end = contents[comment_start..]
        .find("---*/")
        .ok_or_else(metadata_error)?;
    let comment = &contents[comment_start + 5..comment_start + comment_end];

    // The YAML parser doesn't consider CR to be a newline
    let documents = YamlLoader::load_from_str(&comment.replace('\r', "\n"))?;
    let metadata = match documents.first() {
        Some(metadata) => metadata,
        None => return Err(format!("No YAML metadata found in test file {}", path).into()),
    };

    let raw_negative = &metadata["negative"];
    let expected_result = if raw_negative.is_badvalue() {
        ExpectedResult::Positive
    } else {
        let phase = match raw_negative["phase"].as_str() {
            Some("parse") => TestPhase::Parse,
            Some("runtime") => TestPhase::Runtime,
            other => return Err(format!("Unexpected phase {:?} in {}", other, path).into()),
        };

        let type_ = raw_negative["type"]
            .as_str()
            .ok_or_else(|| format!("Negative test {} is missing an error type", path))?
            .to_owned();

        ExpectedResult::Negative { phase, type_ }
    };

    let mut mode = TestMode::Script;
    let mut no_web_compat = false;

    for flag in metadata["flags"].as_vec().map(Vec::as_slice).unwrap_or_default() {
        match flag {
            Yaml::String(flag) if flag == "onlyStrict" => mode = TestMode::StrictScript,
            Yaml::String(flag) if flag == "noStrict" => mode = TestMode::NonStrictScript,
            Yaml::String(flag) if flag == "noWebCompat" => no_web_compat = true,
            other => return Err(format!("Unknown flag {:?} in {}", other, path).into()),
        }
    }

    let category = match path.split_once(std::path::MAIN_SEPARATOR) {
        Some((category, _)) => category.to_owned(),
        None => String::from("<root>"),
    };

    Ok(Test {
        path: path.to_owned(),
        category,
        description: metadata["description"].as_str().map(String::from),
        expected_result,
        mode,
        no_web_compat,
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_test_metadata, ExpectedResult, TestMode, TestPhase};

    #[test]
    fn negative_strict_metadata() {
        let contents = "/*---
description: yield is reserved
flags: [onlyStrict, noWebCompat]
negative:
  phase: parse
  type: SyntaxError
---*/
yield;
";
        let test = parse_test_metadata("yield/reserved.js", contents).unwrap();

        assert_eq!(test.category, "yield");
        assert_eq!(test.description.as_deref(), Some("yield is reserved"));
        assert!(test.mode == TestMode::StrictScript);
        assert!(test.no_web_compat);
        assert!(
            test.expected_result
                == ExpectedResult::Negative {
                    phase: TestPhase::Parse,
                    type_: "SyntaxError".to_owned()
                }
        );
    }

    #[test]
    fn positive_metadata_defaults() {
        let test = parse_test_metadata("a.js", "/*---\ndescription: plain\n---*/\na;").unwrap();

        assert_eq!(test.category, "<root>");
        assert!(test.mode == TestMode::Script);
        assert!(!test.no_web_compat);
        assert!(test.expected_result == ExpectedResult::Positive);
    }

    #[test]
    fn missing_metadata() {
        assert!(parse_test_metadata("a.js", "a;").is_err());
        assert!(parse_test_metadata("a.js", "/*---\nflags: [module]\n---*/").is_err());
    }
}
