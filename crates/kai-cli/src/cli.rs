//! CLI argument parsing for the `kai` tool.
//!
//! CLI flags override every other configuration source.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// k-ai text index
///
/// Shard-aware inverted word index with topic ranking and boolean search.
#[derive(Parser, Debug)]
#[command(name = "kai")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/kai/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override database path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Index commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Index sentences from a JSON file under a topic
    Index {
        /// Topic (or origin) namespace
        #[arg(short, long)]
        topic: String,

        /// Shard (default from config)
        #[arg(short, long)]
        shard: Option<i32>,

        /// Score dropoff per sentence (default from config)
        #[arg(long)]
        dropoff: Option<f64>,

        /// JSON file with a list of parsed sentences
        file: PathBuf,
    },

    /// Remove the index rows of sentences from a topic
    Remove {
        #[arg(short, long)]
        topic: String,

        /// Sentence ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Find sentences containing every keyword
    Find {
        #[arg(short, long)]
        topic: String,

        #[arg(short, long)]
        shard: Option<i32>,

        /// Render stored sentence text for each hit
        #[arg(long)]
        text: bool,

        /// Query words
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Run a boolean query, e.g. "any(Peter) and not any(movie)"
    Search {
        /// Topic (or origin) namespace
        #[arg(short, long)]
        origin: String,

        query: String,
    },

    /// Save a topic from a JSON file of parsed sentences
    SaveTopic {
        name: String,

        file: PathBuf,

        /// Topic body (defaults to the sentences' text)
        #[arg(long)]
        body: Option<String>,
    },

    /// Rank topics against the nouns and verbs of parsed sentences
    Topics {
        /// JSON file with a list of parsed sentences
        file: PathBuf,

        /// Maximum results
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// List topics by name
    ListTopics {
        /// Start after this topic name
        #[arg(short, long)]
        after: Option<String>,

        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Delete a topic and everything indexed for it
    DeleteTopic { name: String },

    /// Show database statistics
    Status,
}
