use clap::Parser;

/// Raw command line arguments.
#[derive(Parser)]
#[command(about)]
pub struct Args {
    /// Print the AST to the console as ESTree JSON
    #[arg(long, default_value_t = false)]
    pub print_ast: bool,

    /// Parse the script as strict mode code
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Disable web compatibility (Annex B) behavior
    #[arg(long, default_value_t = false)]
    pub no_web_compat: bool,

    /// Include start, end, and loc properties on every printed node
    #[arg(long, default_value_t = false)]
    pub locations: bool,

    pub file: String,
}

/// Options that control how a script is parsed and printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Parse the whole script as strict mode code, as if it began with "use strict"
    pub strict: bool,
    /// Reject the legacy web compatibility syntax, e.g. `yield` as an identifier
    pub disable_web_compat: bool,
    /// Record `start`, `end`, and `loc` on every node of the ESTree output
    pub record_source_locations: bool,
}

impl ParseOptions {
    /// Create a new options struct from the command line arguments.
    pub fn new_from_args(args: &Args) -> Self {
        Self {
            strict: args.strict,
            disable_web_compat: args.no_web_compat,
            record_source_locations: args.locations,
        }
    }
}

impl Default for ParseOptions {
    /// Create a new options struct with default values.
    fn default() -> Self {
        Self { strict: false, disable_web_compat: false, record_source_locations: false }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Args, ParseOptions};

    #[test]
    fn options_from_args() {
        let args = Args::parse_from(["bsp", "--strict", "--locations", "test.js"]);
        let options = ParseOptions::new_from_args(&args);

        assert!(options.strict);
        assert!(!options.disable_web_compat);
        assert!(options.record_source_locations);
        assert_eq!(args.file, "test.js");

        let args = Args::parse_from(["bsp", "--no-web-compat", "test.js"]);
        let options = ParseOptions::new_from_args(&args);
        assert!(options.disable_web_compat);
        assert!(!options.strict);
    }
}
