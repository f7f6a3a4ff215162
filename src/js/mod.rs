pub mod common;
pub mod parser;
