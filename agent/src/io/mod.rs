pub mod config;
pub mod inference;
pub mod process;
pub mod prompt;
