//! Command-line interface
//!
//! Argument parsing and the interactive operator console.

pub mod commands;
pub mod console;

pub use commands::{Command, Opt};
pub use console::run_console;
