use clap::Parser;

use std::error::Error;
use std::rc::Rc;

use brimstone_parser::js::common::logging::init_tracing;
use brimstone_parser::js::common::options::{Args, ParseOptions};
use brimstone_parser::js::parser::{parse_script, print_program, source::Source};

fn main_impl() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let options = ParseOptions::new_from_args(&args);

    init_tracing();

    let source = Rc::new(Source::new_from_file(&args.file)?);
    let program = parse_script(&source, &options)?;

    if args.print_ast {
        println!("{}", print_program(&program, &source, options.record_source_locations));
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
