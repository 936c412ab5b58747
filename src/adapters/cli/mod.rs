//! CLI Adapter
//!
//! Command-line interface for the pairscout scanner.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, ConsoleNotifier, RunCmd, ScanCmd};
