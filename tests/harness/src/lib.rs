pub mod index;
pub mod runner;
pub mod table;
pub mod utils;
