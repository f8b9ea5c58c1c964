//! # Doc Compare CLI (`dcmp`)
//!
//! Compares plain-text documents from the command line.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dcmp compare <a> <b>` | Full insights report for a document pair |
//! | `dcmp diff <a> <b>` | Unified, side-by-side, inline or summary diff |
//! | `dcmp corpus <files...>` | Similarity matrix and drift signals over N documents |
//! | `dcmp keywords <a> <b> -k <kw>` | Keyword presence and line numbers |
//! | `dcmp translate <file>` | Translate a document |
//! | `dcmp detect <file>` | Detect a document's language |
//! | `dcmp metrics <a> <b>` | Count, overlap and coverage metrics |
//!
//! ## Examples
//!
//! ```bash
//! dcmp compare old.txt new.txt --json
//! dcmp diff old.txt new.txt --format side-by-side --context 1
//! dcmp corpus q1.txt q2.txt q3.txt --reference 0
//! dcmp --config ./config/dcmp.toml translate memo.txt --to de
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=debug` for retry and chunk details.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use doc_compare::config::{self, Config};
use doc_compare::views::DiffFormat;
use doc_compare::{insights, translate, views};

const TRANSLATOR_KEY_VAR: &str = "DCMP_TRANSLATOR_KEY";
const NARRATIVE_KEY_VAR: &str = "DCMP_NARRATIVE_KEY";

/// Doc Compare: lexical, semantic, sentiment and tone comparison of
/// plain-text documents.
#[derive(Parser)]
#[command(name = "dcmp", version, about = "Compare plain-text documents")]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional. Without it every backend is disabled and the stock
    /// thresholds apply.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full insights report for two documents.
    Compare {
        doc1: PathBuf,
        doc2: PathBuf,

        /// Keywords whose coverage is added to the metrics.
        #[arg(short = 'k', long = "keyword")]
        keywords: Vec<String>,
    },

    /// Line-level diff of two documents.
    Diff {
        doc1: PathBuf,
        doc2: PathBuf,

        #[arg(long, value_enum, default_value = "unified")]
        format: DiffFormat,

        /// Context lines around each change. Defaults to `diff.context_lines`.
        #[arg(long)]
        context: Option<usize>,
    },

    /// Corpus-wide similarity and drift signals.
    Corpus {
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Rank every document by similarity to this one (0-based).
        #[arg(long)]
        reference: Option<usize>,
    },

    /// Search both documents for keywords.
    Keywords {
        doc1: PathBuf,
        doc2: PathBuf,

        #[arg(short = 'k', long = "keyword", required = true)]
        keywords: Vec<String>,

        #[arg(long)]
        case_sensitive: bool,
    },

    /// Translate a document with the configured backend.
    Translate {
        file: PathBuf,

        /// Target language. Defaults to `translation.target_language`.
        #[arg(long)]
        to: Option<String>,

        /// Source language. Detected by the backend when omitted.
        #[arg(long)]
        from: Option<String>,
    },

    /// Detect the language of a document.
    Detect { file: PathBuf },

    /// Text metrics for two documents.
    Metrics {
        doc1: PathBuf,
        doc2: PathBuf,

        #[arg(short = 'k', long = "keyword")]
        keywords: Vec<String>,
    },
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))
}

/// Fill empty credentials from the process environment.
fn apply_env_credentials(cfg: &mut Config) {
    if cfg.translation.api_key.is_none() {
        cfg.translation.api_key = std::env::var(TRANSLATOR_KEY_VAR).ok().filter(|v| !v.is_empty());
    }
    if cfg.narrative.api_key.is_none() {
        cfg.narrative.api_key = std::env::var(NARRATIVE_KEY_VAR).ok().filter(|v| !v.is_empty());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::minimal(),
    };
    apply_env_credentials(&mut cfg);

    match cli.command {
        Commands::Compare {
            doc1,
            doc2,
            keywords,
        } => {
            let (a, b) = (read_text(&doc1)?, read_text(&doc2)?);
            insights::run_compare(&cfg, &a, &b, keywords, cli.json).await?;
        }
        Commands::Diff {
            doc1,
            doc2,
            format,
            context,
        } => {
            let (a, b) = (read_text(&doc1)?, read_text(&doc2)?);
            views::run_diff(&cfg, &a, &b, format, context, cli.json)?;
        }
        Commands::Corpus { files, reference } => {
            let names: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
            let docs = files
                .iter()
                .map(|p| read_text(p))
                .collect::<Result<Vec<_>>>()?;
            views::run_corpus(&cfg, names, &docs, reference, cli.json)?;
        }
        Commands::Keywords {
            doc1,
            doc2,
            keywords,
            case_sensitive,
        } => {
            let (a, b) = (read_text(&doc1)?, read_text(&doc2)?);
            views::run_keywords(&a, &b, &keywords, case_sensitive, cli.json)?;
        }
        Commands::Translate { file, to, from } => {
            let text = read_text(&file)?;
            translate::run_translate(&cfg, &text, to.as_deref(), from.as_deref()).await?;
        }
        Commands::Detect { file } => {
            let text = read_text(&file)?;
            translate::run_detect(&cfg, &text, cli.json).await?;
        }
        Commands::Metrics {
            doc1,
            doc2,
            keywords,
        } => {
            let (a, b) = (read_text(&doc1)?, read_text(&doc2)?);
            views::run_metrics(&a, &b, &keywords, cli.json)?;
        }
    }

    Ok(())
}
