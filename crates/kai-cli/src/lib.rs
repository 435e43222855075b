//! k-ai index command-line tool.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations over an opened store

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{init_logging, load_settings, run, Engine};
