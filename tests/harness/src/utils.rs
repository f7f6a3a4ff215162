use std::error::Error;

pub type GenericError = Box<dyn Error>;

pub type GenericResult = Result<(), GenericError>;

// ANSI codes for pretty printing
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const WHITE: &str = "\x1b[37m";
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
