//! Command implementations.
//!
//! Each command runs against an [`Engine`] and returns a JSON value that
//! [`run`] prints.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use kai_index::{DocumentFinder, Removal, SentenceStore, WordIndexer};
use kai_nlu::{filter_spaces, to_text, tokenize, Lexicon, StandardLexicon};
use kai_search::QueryEvaluator;
use kai_storage::{RetryPolicy, Storage};
use kai_topics::TopicStorage;
use kai_types::{MatchSet, Sentence, SentenceId, Settings, Token};

use crate::cli::{Cli, Commands};

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(db_path) = &cli.db_path {
        settings.db_path = db_path.clone();
    }
    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }
    Ok(settings)
}

/// Install the tracing subscriber. `RUST_LOG` wins over `log_level`.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Opened store plus the components commands run against.
pub struct Engine {
    storage: Arc<Storage>,
    lexicon: Arc<dyn Lexicon>,
    settings: Settings,
}

impl Engine {
    /// Open the database named by `settings`, creating its directory.
    pub fn open(settings: &Settings) -> Result<Self> {
        let db_path = settings.expanded_db_path();
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent).context("Failed to create database directory")?;
        }
        debug!(path = ?db_path, "Opening storage");
        let storage = Storage::open_with_retry(&db_path, RetryPolicy::from(&settings.retry))
            .with_context(|| format!("Failed to open storage at {}", db_path.display()))?;
        Ok(Self::with_storage(Arc::new(storage), settings.clone()))
    }

    pub fn with_storage(storage: Arc<Storage>, settings: Settings) -> Self {
        Self {
            storage,
            lexicon: Arc::new(StandardLexicon::new()),
            settings,
        }
    }

    fn indexer(&self) -> WordIndexer {
        WordIndexer::new(self.storage.clone(), self.lexicon.clone())
    }

    fn finder(&self) -> DocumentFinder {
        DocumentFinder::new(self.storage.clone(), self.lexicon.clone())
    }

    fn topics(&self) -> TopicStorage {
        TopicStorage::new(
            self.storage.clone(),
            self.lexicon.clone(),
            self.settings.topics.clone(),
        )
    }

    /// Run one command.
    pub fn execute(&self, command: Commands) -> Result<JsonValue> {
        match command {
            Commands::Index {
                topic,
                shard,
                dropoff,
                file,
            } => {
                let sentences = read_sentences(&file)?;
                let shard = shard.unwrap_or(self.settings.index.default_shard);
                let dropoff = dropoff.unwrap_or(self.settings.index.score_dropoff);
                let rows = self
                    .indexer()
                    .index_document(&topic, shard, &sentences, dropoff)
                    .context("Failed to index sentences")?;
                let ids: Vec<String> = sentences.iter().map(|s| s.id.to_string()).collect();
                Ok(json!({ "topic": topic, "shard": shard, "rows": rows, "sentences": ids }))
            }

            Commands::Remove { topic, ids } => {
                let indexer = self.indexer();
                let mut removal = Removal::default();
                for id in &ids {
                    let id: SentenceId = id
                        .parse()
                        .with_context(|| format!("Invalid sentence id: {}", id))?;
                    removal += indexer
                        .remove_indexes(id, &topic)
                        .with_context(|| format!("Failed to remove indexes of {}", id))?;
                }
                Ok(json!({ "topic": topic, "removed": removal.rows, "failures": removal.failures }))
            }

            Commands::Find {
                topic,
                shard,
                text,
                query,
            } => {
                let tokens = query_tokens(&query.join(" "));
                if text {
                    let store = SentenceStore::new(self.storage.clone(), self.finder());
                    let matches = store.find_text(&tokens, &topic).context("Find failed")?;
                    return Ok(serde_json::to_value(matches)?);
                }
                let shard = shard.unwrap_or(self.settings.index.default_shard);
                let found = self
                    .finder()
                    .find_documents(&tokens, &topic, shard)
                    .context("Find failed")?;
                Ok(match_set_json(&found))
            }

            Commands::Search { origin, query } => {
                let evaluator = QueryEvaluator::new(self.storage.clone(), self.lexicon.clone());
                let found = evaluator.search(&query, &origin).context("Search failed")?;
                Ok(match_set_json(&found))
            }

            Commands::SaveTopic { name, file, body } => {
                let sentences = read_sentences(&file)?;
                let body = body.unwrap_or_else(|| {
                    sentences
                        .iter()
                        .map(|s| to_text(&s.tokens))
                        .collect::<Vec<_>>()
                        .join(" ")
                });
                self.topics()
                    .save_topic(&name, &body, &sentences)
                    .with_context(|| format!("Failed to save topic {}", name))?;
                info!(topic = %name, "Topic saved");
                Ok(json!({ "topic": name, "sentences": sentences.len() }))
            }

            Commands::Topics { file, limit } => {
                let tokens: Vec<Token> = read_sentences(&file)?
                    .into_iter()
                    .flat_map(|s| s.tokens)
                    .collect();
                let mut ranked = self
                    .topics()
                    .ranker()
                    .get_top_topics(&tokens)
                    .context("Topic ranking failed")?;
                ranked.truncate(limit);
                Ok(serde_json::to_value(ranked)?)
            }

            Commands::ListTopics { after, limit } => {
                let topics = self
                    .topics()
                    .list_topics(after.as_deref(), limit)
                    .context("Failed to list topics")?;
                Ok(serde_json::to_value(topics)?)
            }

            Commands::DeleteTopic { name } => {
                let summary = self
                    .topics()
                    .delete_topic(&name)
                    .with_context(|| format!("Failed to delete topic {}", name))?;
                Ok(serde_json::to_value(summary)?)
            }

            Commands::Status => {
                let stats = self.storage.get_stats().context("Failed to read stats")?;
                Ok(json!({ "db_path": self.settings.db_path, "stats": stats }))
            }
        }
    }
}

/// Open the store and run a command, printing its result.
pub fn run(command: Commands, settings: &Settings) -> Result<()> {
    let engine = Engine::open(settings)?;
    let output = engine.execute(command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Read a JSON list of parsed sentences, giving each an id if it has none.
fn read_sentences(path: &Path) -> Result<Vec<Sentence>> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let sentences = Sentence::list_from_json(&json)
        .with_context(|| format!("Invalid sentence JSON in {}", path.display()))?;
    if sentences.is_empty() {
        bail!("No sentences in {}", path.display());
    }
    Ok(sentences)
}

fn query_tokens(text: &str) -> Vec<Token> {
    filter_spaces(&tokenize(text))
}

/// Hits ordered by sentence id.
fn match_set_json(found: &MatchSet) -> JsonValue {
    let mut ids: Vec<&SentenceId> = found.keys().collect();
    ids.sort();
    let hits: Vec<JsonValue> = ids
        .into_iter()
        .map(|id| {
            let matches: Vec<JsonValue> = found[id]
                .iter()
                .map(|m| {
                    json!({
                        "word": m.entry.word,
                        "tag": m.entry.tag,
                        "offset": m.entry.offset,
                        "score": m.entry.score,
                        "keyword_index": m.keyword_index,
                    })
                })
                .collect();
            json!({ "sentence_id": id.to_string(), "matches": matches })
        })
        .collect();
    json!(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const SENTENCES: &str = r#"[
        {"tokenList":[
            {"index":0,"list":[],"tag":"NNP","text":"Peter","dep":"nsubj","synid":-1,"semantic":""},
            {"index":1,"list":[],"tag":"VBZ","text":"sails","dep":"ROOT","synid":-1,"semantic":""},
            {"index":2,"list":[],"tag":"NNS","text":"boats","dep":"dobj","synid":-1,"semantic":""},
            {"index":3,"list":[],"tag":".","text":".","dep":"punct","synid":-1,"semantic":""}
        ]}
    ]"#;

    fn create_test_engine() -> (TempDir, Engine, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(
            Storage::open_with_retry(&temp_dir.path().join("db"), RetryPolicy::none()).unwrap(),
        );
        let file = temp_dir.path().join("sentences.json");
        fs::write(&file, SENTENCES).unwrap();
        (temp_dir, Engine::with_storage(storage, Settings::default()), file)
    }

    #[test]
    fn test_index_then_find() {
        let (_temp, engine, file) = create_test_engine();
        let indexed = engine
            .execute(Commands::Index {
                topic: "t1".to_string(),
                shard: None,
                dropoff: None,
                file,
            })
            .unwrap();
        assert_eq!(indexed["rows"], 3);

        let found = engine
            .execute(Commands::Find {
                topic: "t1".to_string(),
                shard: None,
                text: false,
                query: vec!["boat".to_string()],
            })
            .unwrap();
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["matches"][0]["offset"], 2);
    }

    #[test]
    fn test_remove_rejects_bad_id() {
        let (_temp, engine, _file) = create_test_engine();
        let result = engine.execute(Commands::Remove {
            topic: "t1".to_string(),
            ids: vec!["not-an-id".to_string()],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_topic_lifecycle() {
        let (_temp, engine, file) = create_test_engine();
        engine
            .execute(Commands::SaveTopic {
                name: "sailing".to_string(),
                file: file.clone(),
                body: None,
            })
            .unwrap();

        let listed = engine
            .execute(Commands::ListTopics { after: None, limit: 10 })
            .unwrap();
        assert_eq!(listed[0]["name"], "sailing");
        assert_eq!(listed[0]["body"], "Peter sails boats.");

        let ranked = engine.execute(Commands::Topics { file, limit: 5 }).unwrap();
        assert_eq!(ranked[0]["topic"], "sailing");

        let found = engine
            .execute(Commands::Search {
                origin: "global".to_string(),
                query: "any(boat) and not any(movie)".to_string(),
            })
            .unwrap();
        assert_eq!(found.as_array().unwrap().len(), 1);

        let summary = engine
            .execute(Commands::DeleteTopic {
                name: "sailing".to_string(),
            })
            .unwrap();
        assert_eq!(summary["sentences"], 1);
        assert_eq!(summary["failures"], 0);

        let status = engine.execute(Commands::Status).unwrap();
        assert_eq!(status["stats"]["word_index_rows"], 0);
        assert_eq!(status["stats"]["topic_rows"], 0);
    }

    #[test]
    fn test_missing_file() {
        let (temp, engine, _file) = create_test_engine();
        let result = engine.execute(Commands::Index {
            topic: "t1".to_string(),
            shard: None,
            dropoff: None,
            file: temp.path().join("missing.json"),
        });
        assert!(result.is_err());
    }
}
