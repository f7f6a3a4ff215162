use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::js::common::options::ParseOptions;

use self::ast::Program;
use self::context::ParseContext;
use self::source::Source;

pub mod ast;
pub mod classifier;
pub mod context;
mod early_errors;
mod lexer;
pub mod loc;
pub mod parse_error;
mod parser;
mod printer;
mod reparse;
mod scope;
pub mod source;
mod token;

pub use parse_error::{ErrorKind, LocalizedParseError, ParseError, ParseResult};
pub use printer::{print_program, program_to_estree};

/// Parse source text as a script. Stops at the first error.
pub fn parse(source_text: &str, options: &ParseOptions) -> ParseResult<Program> {
    let source = Rc::new(Source::new_from_string("<input>", source_text.to_owned()));
    parse_script(&source, options)
}

/// Parse a source file as a script. Stops at the first error.
pub fn parse_script(source: &Rc<Source>, options: &ParseOptions) -> ParseResult<Program> {
    debug!(file = %source.file_path, ?options, "parse_script");

    let ctx = ParseContext::for_script(options.strict, options.disable_web_compat);
    let (program, _) = parser::parse_program(source, ctx)?;

    Ok(program)
}

/// Parse source text and convert the resulting program to ESTree JSON, recording source locations
/// if the options ask for them.
pub fn parse_to_estree(source_text: &str, options: &ParseOptions) -> ParseResult<Value> {
    let source = Rc::new(Source::new_from_string("<input>", source_text.to_owned()));
    let program = parse_script(&source, options)?;

    Ok(program_to_estree(&program, &source, options.record_source_locations))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse, parse_to_estree, ErrorKind};
    use crate::js::common::options::ParseOptions;

    #[test]
    fn options_select_context() {
        let sloppy = ParseOptions::default();
        let strict = ParseOptions { strict: true, ..ParseOptions::default() };
        let no_web_compat = ParseOptions { disable_web_compat: true, ..ParseOptions::default() };

        assert!(parse("var yield = 1;", &sloppy).is_ok());
        assert_eq!(
            parse("var yield = 1;", &strict).unwrap_err().kind(),
            ErrorKind::ReservedWordBinding
        );
        assert_eq!(
            parse("var yield = 1;", &no_web_compat).unwrap_err().kind(),
            ErrorKind::ReservedWordBinding
        );

        assert!(parse("with (a) {}", &no_web_compat).is_ok());
        assert!(parse("with (a) {}", &strict).is_err());
    }

    #[test]
    fn estree_with_locations() {
        let options = ParseOptions { record_source_locations: true, ..ParseOptions::default() };
        let program = parse_to_estree("yield", &options).unwrap();

        assert_eq!(
            program["body"][0]["expression"],
            json!({
                "type": "Identifier",
                "start": 0,
                "end": 5,
                "loc": { "start": { "line": 1, "column": 0 }, "end": { "line": 1, "column": 5 } },
                "name": "yield",
            })
        );

        let program = parse_to_estree("yield", &ParseOptions::default()).unwrap();
        assert_eq!(
            program["body"][0]["expression"],
            json!({ "type": "Identifier", "name": "yield" })
        );
    }
}
