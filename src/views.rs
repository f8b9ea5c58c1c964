//! Individual comparison views behind the `diff`, `corpus`, `keywords` and
//! `metrics` commands.
//!
//! Each view has a function returning plain data and a `run_*` entry point
//! that prints it, as text or as JSON.

use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::Serialize;

use doc_compare_core::analysis::LocalAnalyzer;
use doc_compare_core::diff::{keyword_search, LineDiff};
use doc_compare_core::metrics::all_metrics;
use doc_compare_core::semantic::{PairScore, SemanticAlert, SemanticComparator, SimilarityMatrix};
use doc_compare_core::sentiment::{LabelScores, SentimentAlert, SentimentClassifier};
use doc_compare_core::tone::ToneAnalyzer;

use crate::config::Config;

/// Rendering used by `dcmp diff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiffFormat {
    Unified,
    SideBySide,
    Inline,
    Summary,
}

pub fn render_diff(doc1: &str, doc2: &str, format: DiffFormat, context: usize) -> String {
    let line_diff = LineDiff::new(doc1, doc2);
    match format {
        DiffFormat::Unified => line_diff.unified(context),
        DiffFormat::SideBySide => line_diff.side_by_side(Some(context)),
        DiffFormat::Inline => line_diff.inline(context),
        DiffFormat::Summary => line_diff.summary_report(),
    }
}

pub fn run_diff(
    config: &Config,
    doc1: &str,
    doc2: &str,
    format: DiffFormat,
    context: Option<usize>,
    json: bool,
) -> Result<()> {
    let context = context.unwrap_or(config.diff.context_lines);
    if json {
        let line_diff = LineDiff::new(doc1, doc2);
        let value = serde_json::json!({
            "stats": line_diff.stats(),
            "summary": line_diff.summary(),
            "percentage": line_diff.percentage(),
            "opcodes": line_diff.result(),
            "blocks": line_diff.blocks(context),
            "changed_lines": line_diff.changed_lines(),
            "line_mapping": line_diff.line_mapping(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let rendered = render_diff(doc1, doc2, format, context);
    if rendered.is_empty() {
        println!("No changes detected.");
    } else {
        println!("{}", rendered);
    }
    Ok(())
}

/// Corpus-wide signals over an ordered list of documents.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusReport {
    pub documents: Vec<String>,
    pub similarity_matrix: SimilarityMatrix,
    pub most_similar_pair: Option<PairScore>,
    pub most_dissimilar_pair: Option<PairScore>,
    pub diversity_score: f64,
    pub outliers: Vec<usize>,
    pub semantic_change_points: Vec<usize>,
    pub semantic_alerts: Vec<SemanticAlert>,
    pub documents_with_no_overlap: Vec<(usize, usize)>,
    /// Present only when a reference document was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking: Option<Vec<(usize, f64)>>,
    pub sentiment_change_points: Vec<usize>,
    pub sentiment_variance: LabelScores,
    pub sentiment_alerts: Vec<SentimentAlert>,
    pub tone_change_summary: String,
}

pub fn corpus_report(
    config: &Config,
    names: Vec<String>,
    docs: &[String],
    reference: Option<usize>,
) -> Result<CorpusReport> {
    if let Some(r) = reference {
        if r >= docs.len() {
            bail!(
                "--reference {} is out of range for {} documents",
                r,
                docs.len()
            );
        }
    }

    let analyzer = LocalAnalyzer::new();
    let thresholds = &config.thresholds;
    let corpus = SemanticComparator::new(&analyzer).corpus(docs);
    let series = SentimentClassifier::with_thresholds(&analyzer, thresholds.sentiment()).series(docs);
    let tone = ToneAnalyzer::with_emotion_threshold(&analyzer, thresholds.tone_emotion);

    Ok(CorpusReport {
        documents: names,
        similarity_matrix: corpus.similarity_matrix(),
        most_similar_pair: corpus.most_similar_pair(),
        most_dissimilar_pair: corpus.most_dissimilar_pair(),
        diversity_score: corpus.diversity_score(),
        outliers: corpus.outliers(thresholds.semantic_outlier),
        semantic_change_points: corpus.change_points(thresholds.semantic_change),
        semantic_alerts: corpus.semantic_alerts(thresholds.semantic_alert),
        documents_with_no_overlap: corpus.documents_with_no_overlap(),
        ranking: reference.map(|r| corpus.similarity_ranking(r)),
        sentiment_change_points: series.change_points(),
        sentiment_variance: series.variance(),
        sentiment_alerts: series.alerts(thresholds.sentiment_alert),
        tone_change_summary: tone.tone_change_summary(docs),
    })
}

pub fn run_corpus(
    config: &Config,
    names: Vec<String>,
    docs: &[String],
    reference: Option<usize>,
    json: bool,
) -> Result<()> {
    let report = corpus_report(config, names, docs, reference)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("--- Documents ---");
    for (i, name) in report.documents.iter().enumerate() {
        println!("[{}] {}", i, name);
    }
    println!();
    println!("--- Similarity Matrix ---");
    for row in report.similarity_matrix.rows() {
        let cells: Vec<String> = row.iter().map(|v| format!("{:.3}", v)).collect();
        println!("{}", cells.join("  "));
    }
    println!();
    if let Some(p) = report.most_similar_pair {
        println!("most similar:    {:?} ({})", p.pair, p.similarity);
    }
    if let Some(p) = report.most_dissimilar_pair {
        println!("most dissimilar: {:?} ({})", p.pair, p.similarity);
    }
    println!("diversity:       {}", report.diversity_score);
    println!("outliers:        {:?}", report.outliers);
    println!("semantic change points:  {:?}", report.semantic_change_points);
    println!("sentiment change points: {:?}", report.sentiment_change_points);
    println!("sentiment variance: {}", report.sentiment_variance);
    println!("{}", report.tone_change_summary);
    if let Some(ref ranking) = report.ranking {
        println!();
        println!("--- Ranking ---");
        for (idx, score) in ranking {
            println!("[{}] {}", idx, score);
        }
    }
    for alert in &report.semantic_alerts {
        println!("alert: {}", alert.alert);
    }
    for alert in &report.sentiment_alerts {
        println!("alert: {}", alert.alert);
    }
    Ok(())
}

pub fn run_keywords(
    doc1: &str,
    doc2: &str,
    keywords: &[String],
    case_sensitive: bool,
    json: bool,
) -> Result<()> {
    let hits = keyword_search(doc1, doc2, keywords, case_sensitive);
    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }
    for hit in &hits {
        println!(
            "{}: doc1 {:?}, doc2 {:?}",
            hit.keyword, hit.lines_in_doc1, hit.lines_in_doc2
        );
    }
    Ok(())
}

pub fn run_metrics(doc1: &str, doc2: &str, keywords: &[String], json: bool) -> Result<()> {
    let metrics = all_metrics(doc1, doc2, keywords);
    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }
    let counts = [
        ("words", &metrics.word_count),
        ("lines", &metrics.line_count),
        ("chars", &metrics.char_count),
    ];
    for (name, c) in counts {
        println!(
            "{:<6} {} vs {} (difference {}, {}%)",
            name, c.doc1, c.doc2, c.difference, c.percent_difference
        );
    }
    println!(
        "unique word ratio: {} vs {}",
        metrics.unique_word_ratio_doc1, metrics.unique_word_ratio_doc2
    );
    println!("jaccard: {}", metrics.jaccard_similarity);
    println!("cosine:  {}", metrics.cosine_similarity);
    if let Some(coverage) = metrics.keyword_coverage {
        println!("keyword coverage: {}% vs {}%", coverage.doc1, coverage.doc2);
    }
    Ok(())
}
