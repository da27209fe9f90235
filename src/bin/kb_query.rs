//! Knowledge base query CLI
//!
//! Loads entities from JSON, trains the encoder on their aliases (or loads a
//! saved encoder model), builds the alias index and resolves mentions.
//!
//! # Usage
//!
//! ```bash
//! kb_query --entities drugs.json Aspirin paracetamol
//! kb_query --entities drugs.json --config linker.yaml --top-k 3 -o json ASA
//! RUST_LOG=debug kb_query --entities drugs.json --model encoder.bin Aspirin
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kb_encoder::{EncoderModel, TracingReporter};
use kb_linker::{EntityCandidate, KnowledgeBase, LinkerConfig, NamedEntity};

#[derive(Parser)]
#[command(name = "kb_query")]
#[command(version = "0.1.0")]
#[command(about = "Resolve mentions against a knowledge base of named entities")]
struct Cli {
    /// JSON array of entities ({"id", "name", "aliases", ...})
    #[arg(long, short = 'e')]
    entities: PathBuf,

    /// YAML linker configuration
    #[arg(long, short = 'c', env = "KB_LINKER_CONFIG")]
    config: Option<PathBuf>,

    /// Saved encoder model; skips training when given
    #[arg(long, short = 'm')]
    model: Option<PathBuf>,

    /// Candidates per mention
    #[arg(long, short = 'k', default_value_t = 5)]
    top_k: usize,

    /// Output format
    #[arg(long, short = 'o', default_value = "text", value_enum)]
    format: OutputFormat,

    /// Mentions to resolve
    #[arg(required = true)]
    mentions: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn load_entities(path: &Path) -> Result<Vec<NamedEntity>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read entities from {}", path.display()))?;
    let entities: Vec<NamedEntity> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse entities in {}", path.display()))?;
    Ok(entities)
}

fn build_knowledge_base(cli: &Cli) -> Result<KnowledgeBase> {
    let config = match &cli.config {
        Some(path) => LinkerConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LinkerConfig::default(),
    };

    let mut kb = match &cli.model {
        Some(path) => {
            let encoder = EncoderModel::load(path)?.into_encoder()?;
            KnowledgeBase::with_encoder(
                encoder,
                config.index.clone(),
                config.knowledge_base.clone(),
            )?
        }
        None => KnowledgeBase::new(&config)?,
    };

    let added = kb.add_entities(load_entities(&cli.entities)?)?;
    info!(entities = added, mentions = kb.count_mentions(), "Entities loaded");

    if cli.model.is_none() {
        let params = kb.training_params().clone();
        kb.train_encoder(&params, &mut TracingReporter)?;
    }
    kb.build_index(&mut TracingReporter)?;
    Ok(kb)
}

fn print_text(mention: &str, candidates: &[EntityCandidate]) {
    println!("{mention}");
    if candidates.is_empty() {
        println!("  (no candidates)");
    }
    for candidate in candidates {
        println!(
            "  {:>3}  {:<12} {:.4}  {}",
            candidate.rank,
            candidate.entity.id,
            candidate.similarity,
            candidate.entity.name
        );
    }
}

fn candidates_json(mention: &str, candidates: &[EntityCandidate]) -> serde_json::Value {
    serde_json::json!({
        "mention": mention,
        "candidates": candidates
            .iter()
            .map(|c| serde_json::json!({
                "id": c.entity.id,
                "name": c.entity.name,
                "similarity": c.similarity,
                "rank": c.rank,
            }))
            .collect::<Vec<_>>(),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let kb = build_knowledge_base(&cli)?;
    let results = kb.find_nearest_entities_batch(cli.mentions.as_slice(), cli.top_k)?;

    match cli.format {
        OutputFormat::Text => {
            for (mention, candidates) in cli.mentions.iter().zip(&results) {
                print_text(mention, candidates);
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = cli
                .mentions
                .iter()
                .zip(&results)
                .map(|(mention, candidates)| candidates_json(mention, candidates))
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
