pub mod chat;
pub mod config;
pub mod help;
pub mod history;
pub mod interpret;
pub mod replay;
pub mod scan;
pub mod utils;

#[cfg(test)]
#[path = "../commands_test.rs"]
mod commands_test;
