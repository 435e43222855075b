//! k-ai text index
//!
//! # Usage
//!
//! ```bash
//! kai index --topic news sentences.json
//! kai find --topic news New York
//! kai search --origin news "any(Peter) and not any(movie)"
//! kai save-topic sailing sailing.json
//! kai status
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/kai/config.toml)
//! 3. Config file given with `--config`
//! 4. Environment variables (KAI_*)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use kai_cli::{init_logging, load_settings, run, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    init_logging(&settings.log_level)?;
    run(cli.command, &settings)
}
