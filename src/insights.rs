//! Insights aggregation.
//!
//! [`InsightsEngine::get_document_insights`] is the single-call entry
//! point: it detects and normalizes the language of both documents, runs
//! the lexical, semantic, sentiment and tone comparisons in parallel on
//! blocking worker threads, then merges every sub-result and the optional
//! AI narrative into one [`InsightsReport`].
//!
//! # Pipeline
//!
//! ```text
//! doc1, doc2 ──▶ detect + translate ──┬──▶ diff       ──┐
//!                                     ├──▶ semantic   ──┤
//!                                     ├──▶ sentiment  ──┼──▶ InsightsReport
//!                                     ├──▶ tone       ──┤
//!                                     └──▶ narrative  ──┘
//! ```
//!
//! Every comparison task reads only its own copy of the two texts and
//! writes only its own result, so nothing is shared between tasks. A
//! disabled translator or narrative backend leaves the corresponding
//! fields at their fallback values; the report is always produced.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use doc_compare_core::analysis::{LocalAnalyzer, SentimentAnalyzer, TextAnalyzer};
use doc_compare_core::diff::{
    self, DiffBlock, DiffLists, DiffStats, DiffSummary, LineDiff, WordDiffStats,
};
use doc_compare_core::metrics::{all_metrics, TextMetrics};
use doc_compare_core::models::{RiskLevel, SentimentLabel, Tone};
use doc_compare_core::semantic::{
    CommonAndUnique, EntityComparison, SemanticAlert, SemanticComparator,
};
use doc_compare_core::sentiment::{
    explain_sentiment, is_controversial, ExtremeSentiment, LabelScores, SentimentAlert,
    SentimentClassifier, SentimentComparison, SentimentSeries,
};
use doc_compare_core::tone::{self, important_points, ToneAnalyzer, ToneShift};

use crate::config::{Config, ThresholdsConfig};
use crate::narrative::{create_narrative, NarrativeGenerator, Narrator};
use crate::translate::{create_translator, Translator, UNDETERMINED_LANGUAGE};

/// A value computed once for each of the two documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerDocument<T> {
    pub doc1: T,
    pub doc2: T,
}

impl<T> PerDocument<T> {
    pub fn new(doc1: T, doc2: T) -> Self {
        Self { doc1, doc2 }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffInsights {
    pub similarity_ratio: f64,
    pub stats: DiffStats,
    pub unchanged_percent: f64,
    pub added_percent: f64,
    pub removed_percent: f64,
    pub summary: DiffSummary,
    pub summary_text: String,
    pub diff_percentage: f64,
    pub word_stats: WordDiffStats,
    pub blocks: Vec<DiffBlock>,
    pub lists: DiffLists,
    pub unified: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SemanticInsights {
    pub similarity_score: f64,
    pub unique_to_doc1: Vec<String>,
    pub unique_to_doc2: Vec<String>,
    pub diversity_score: f64,
    pub outliers: Vec<usize>,
    pub alerts: Vec<SemanticAlert>,
    pub topics: PerDocument<Vec<String>>,
    pub common_and_unique: CommonAndUnique,
    pub entities: BTreeMap<String, EntityComparison>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentInsights {
    pub comparison: SentimentComparison,
    pub risk: PerDocument<RiskLevel>,
    pub controversial: PerDocument<bool>,
    pub priority_actions: PerDocument<Vec<String>>,
    pub explanation: PerDocument<String>,
    pub trend: Vec<SentimentLabel>,
    pub change_points: Vec<usize>,
    pub distribution: BTreeMap<SentimentLabel, usize>,
    pub average_scores: LabelScores,
    pub variance: LabelScores,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_extreme: Option<ExtremeSentiment>,
    pub alerts: Vec<SentimentAlert>,
    pub heatmap: Vec<[f64; 3]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToneInsights {
    pub shift: ToneShift,
    pub trend: Vec<Tone>,
    pub distribution: BTreeMap<Tone, usize>,
    pub change_summary: String,
    /// `None` per document when the analysis backend reports no emotions.
    pub controversial: PerDocument<Option<bool>>,
    pub score_difference: BTreeMap<String, f64>,
    pub important_points: PerDocument<Vec<String>>,
    pub compliance_flags: PerDocument<Vec<String>>,
}

/// Prose layered on top of the metrics. Every field is absent when no
/// narrative backend is configured or its call failed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NarrativeInsights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted_changes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_edits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural_comparison: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_alignment: Option<String>,
}

impl NarrativeInsights {
    pub fn is_empty(&self) -> bool {
        self.diff_explanation.is_none()
            && self.similarity_explanation.is_none()
            && self.highlighted_changes.is_none()
            && self.risk_assessment.is_none()
            && self.suggested_edits.is_none()
            && self.structural_comparison.is_none()
            && self.section_alignment.is_none()
    }
}

/// Plain numbers for a chart renderer.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub line_counts: BTreeMap<&'static str, usize>,
    pub similarity_scores: BTreeMap<&'static str, f64>,
    pub sentiment_heatmap: Vec<[f64; 3]>,
    pub tone_counts: BTreeMap<Tone, usize>,
}

/// The aggregate comparison of one document pair.
#[derive(Debug, Clone, Serialize)]
pub struct InsightsReport {
    pub languages: PerDocument<String>,
    pub translated_to: Option<String>,
    pub diff: DiffInsights,
    pub semantic: SemanticInsights,
    pub sentiment: SentimentInsights,
    pub tone: ToneInsights,
    pub compliance_flags: PerDocument<Vec<String>>,
    pub pii: PerDocument<Vec<String>>,
    pub metrics: TextMetrics,
    pub narrative: NarrativeInsights,
    pub charts: ChartData,
}

pub fn diff_insights(doc1: &str, doc2: &str, context: usize) -> DiffInsights {
    let line_diff = LineDiff::new(doc1, doc2);
    let stats = line_diff.stats();
    DiffInsights {
        similarity_ratio: diff::similarity_ratio(doc1, doc2),
        stats,
        unchanged_percent: stats.unchanged_percent(),
        added_percent: stats.added_percent(),
        removed_percent: stats.removed_percent(),
        summary: line_diff.summary(),
        summary_text: line_diff.summarize_changes(),
        diff_percentage: line_diff.percentage(),
        word_stats: diff::word_diff_stats(doc1, doc2),
        blocks: line_diff.blocks(context),
        lists: line_diff.lists(),
        unified: line_diff.unified(context),
    }
}

pub fn semantic_insights(
    analyzer: &dyn TextAnalyzer,
    doc1: &str,
    doc2: &str,
    thresholds: &ThresholdsConfig,
) -> SemanticInsights {
    let comparator = SemanticComparator::new(analyzer);
    let corpus = comparator.corpus(&[doc1, doc2]);
    let common_and_unique = corpus.common_and_unique_phrases();
    let unique = |i: usize| common_and_unique.unique.get(i).cloned().unwrap_or_default();

    SemanticInsights {
        similarity_score: corpus.similarity(0, 1).unwrap_or_default(),
        unique_to_doc1: unique(0),
        unique_to_doc2: unique(1),
        diversity_score: corpus.diversity_score(),
        outliers: corpus.outliers(thresholds.semantic_outlier),
        alerts: corpus.semantic_alerts(thresholds.semantic_alert),
        topics: PerDocument::new(
            comparator.document_topics(doc1),
            comparator.document_topics(doc2),
        ),
        entities: comparator.compare_entities(doc1, doc2),
        common_and_unique,
    }
}

pub fn sentiment_insights(
    analyzer: &dyn SentimentAnalyzer,
    doc1: &str,
    doc2: &str,
    thresholds: &ThresholdsConfig,
) -> SentimentInsights {
    let classifier = SentimentClassifier::with_thresholds(analyzer, thresholds.sentiment());
    let r1 = classifier.classify(doc1);
    let r2 = classifier.classify(doc2);
    let series = SentimentSeries::new(vec![r1.clone(), r2.clone()]);

    SentimentInsights {
        risk: PerDocument::new(classifier.assess_risk(&r1), classifier.assess_risk(&r2)),
        controversial: PerDocument::new(
            is_controversial(&r1, thresholds.controversy),
            is_controversial(&r2, thresholds.controversy),
        ),
        priority_actions: PerDocument::new(
            classifier.priority_actions_for(&r1),
            classifier.priority_actions_for(&r2),
        ),
        explanation: PerDocument::new(explain_sentiment(&r1), explain_sentiment(&r2)),
        trend: series.labels(),
        change_points: series.change_points(),
        distribution: series.distribution(),
        average_scores: series.average_scores(),
        variance: series.variance(),
        most_extreme: series.most_extreme(),
        alerts: series.alerts(thresholds.sentiment_alert),
        heatmap: series.heatmap_data(),
        comparison: SentimentComparison {
            same_sentiment: r1.sentiment == r2.sentiment,
            doc1_sentiment: r1,
            doc2_sentiment: r2,
        },
    }
}

pub fn tone_insights(
    analyzer: &dyn TextAnalyzer,
    doc1: &str,
    doc2: &str,
    thresholds: &ThresholdsConfig,
) -> ToneInsights {
    let analyzer = ToneAnalyzer::with_emotion_threshold(analyzer, thresholds.tone_emotion);
    let shift = analyzer.analyze_tone_shift(doc1, doc2);
    let trend = vec![shift.document1_tone, shift.document2_tone];

    ToneInsights {
        distribution: tone::tone_distribution(&trend),
        change_summary: tone::tone_change_summary(&trend),
        controversial: PerDocument::new(
            analyzer.is_tone_controversial(doc1),
            analyzer.is_tone_controversial(doc2),
        ),
        score_difference: analyzer.compare_tone_scores(doc1, doc2),
        important_points: PerDocument::new(important_points(doc1), important_points(doc2)),
        compliance_flags: PerDocument::new(
            analyzer.compliance_flags(doc1),
            analyzer.compliance_flags(doc2),
        ),
        trend,
        shift,
    }
}

fn chart_data(
    diff: &DiffInsights,
    semantic: &SemanticInsights,
    sentiment: &SentimentInsights,
    tone: &ToneInsights,
    metrics: &TextMetrics,
) -> ChartData {
    ChartData {
        line_counts: BTreeMap::from([
            ("unchanged", diff.stats.unchanged),
            ("added", diff.stats.added),
            ("removed", diff.stats.removed),
        ]),
        similarity_scores: BTreeMap::from([
            ("lexical", diff.similarity_ratio),
            ("semantic", semantic.similarity_score),
            ("jaccard", metrics.jaccard_similarity),
            ("cosine", metrics.cosine_similarity),
        ]),
        sentiment_heatmap: sentiment.heatmap.clone(),
        tone_counts: tone.distribution.clone(),
    }
}

/// Orchestrates every comparison of a document pair.
pub struct InsightsEngine {
    text_analyzer: Arc<dyn TextAnalyzer>,
    sentiment_analyzer: Arc<dyn SentimentAnalyzer>,
    translator: Arc<dyn Translator>,
    narrator: Narrator,
    thresholds: ThresholdsConfig,
    context_lines: usize,
    target_language: String,
    keywords: Vec<String>,
}

impl InsightsEngine {
    pub fn new(
        text_analyzer: Arc<dyn TextAnalyzer>,
        sentiment_analyzer: Arc<dyn SentimentAnalyzer>,
        translator: Arc<dyn Translator>,
        narrative: Arc<dyn NarrativeGenerator>,
        config: &Config,
    ) -> Self {
        Self {
            text_analyzer,
            sentiment_analyzer,
            translator,
            narrator: Narrator::new(narrative),
            thresholds: config.thresholds.clone(),
            context_lines: config.diff.context_lines,
            target_language: config.translation.target_language.clone(),
            keywords: Vec::new(),
        }
    }

    /// Local heuristic analysis plus whichever remote backends `config`
    /// enables.
    pub fn from_config(config: &Config) -> Result<Self> {
        let local = Arc::new(LocalAnalyzer::new());
        let translator = create_translator(&config.translation, &config.remote)?;
        let narrative = create_narrative(&config.narrative, &config.remote)?;
        info!(
            translator = translator.name(),
            narrative = narrative.name(),
            "insights engine ready"
        );
        Ok(Self::new(local.clone(), local, translator, narrative, config))
    }

    /// Keywords whose coverage is added to the text metrics.
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    /// Build the full report for `doc1` against `doc2`.
    ///
    /// Fails only if a comparison worker panics; missing backends and
    /// remote failures degrade to fallback values instead.
    pub async fn get_document_insights(&self, doc1: &str, doc2: &str) -> Result<InsightsReport> {
        let (lang1, lang2) = tokio::join!(
            self.translator.detect_language(doc1),
            self.translator.detect_language(doc2)
        );
        let languages = PerDocument::new(
            lang1.clone().unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_string()),
            lang2.clone().unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_string()),
        );

        let target = self.target_language.as_str();
        let (text1, text2) = tokio::join!(
            self.translator.translate(doc1, target, lang1.as_deref()),
            self.translator.translate(doc2, target, lang2.as_deref())
        );
        let translated_to = (self.translator.name() != "disabled").then(|| target.to_string());
        let text1: Arc<str> = Arc::from(text1);
        let text2: Arc<str> = Arc::from(text2);

        let diff_task = {
            let (a, b) = (text1.clone(), text2.clone());
            let context = self.context_lines;
            tokio::task::spawn_blocking(move || diff_insights(&a, &b, context))
        };
        let semantic_task = {
            let (a, b) = (text1.clone(), text2.clone());
            let analyzer = self.text_analyzer.clone();
            let thresholds = self.thresholds.clone();
            tokio::task::spawn_blocking(move || semantic_insights(&*analyzer, &a, &b, &thresholds))
        };
        let sentiment_task = {
            let (a, b) = (text1.clone(), text2.clone());
            let analyzer = self.sentiment_analyzer.clone();
            let thresholds = self.thresholds.clone();
            tokio::task::spawn_blocking(move || sentiment_insights(&*analyzer, &a, &b, &thresholds))
        };
        let tone_task = {
            let (a, b) = (text1.clone(), text2.clone());
            let analyzer = self.text_analyzer.clone();
            let thresholds = self.thresholds.clone();
            tokio::task::spawn_blocking(move || tone_insights(&*analyzer, &a, &b, &thresholds))
        };

        let (narrative, pii1, pii2) = tokio::join!(
            self.narrative(&text1, &text2),
            self.narrator.detect_pii(&text1),
            self.narrator.detect_pii(&text2)
        );

        let diff = diff_task.await.context("diff worker failed")?;
        let semantic = semantic_task.await.context("semantic worker failed")?;
        let sentiment = sentiment_task.await.context("sentiment worker failed")?;
        let tone = tone_task.await.context("tone worker failed")?;
        let metrics = all_metrics(&text1, &text2, &self.keywords);

        debug!(
            similarity = diff.similarity_ratio,
            semantic = semantic.similarity_score,
            narrative = !narrative.is_empty(),
            "insights computed"
        );

        Ok(InsightsReport {
            charts: chart_data(&diff, &semantic, &sentiment, &tone, &metrics),
            compliance_flags: tone.compliance_flags.clone(),
            languages,
            translated_to,
            diff,
            semantic,
            sentiment,
            tone,
            pii: PerDocument::new(pii1, pii2),
            metrics,
            narrative,
        })
    }

    async fn narrative(&self, doc1: &str, doc2: &str) -> NarrativeInsights {
        if !self.narrator.is_enabled() {
            return NarrativeInsights::default();
        }
        let n = &self.narrator;
        let (
            diff_explanation,
            similarity_explanation,
            highlighted_changes,
            risk_assessment,
            suggested_edits,
            structural_comparison,
            section_alignment,
        ) = tokio::join!(
            n.diff_explanation(doc1, doc2),
            n.similarity_explanation(doc1, doc2),
            n.highlighted_changes(doc1, doc2),
            n.risk_assessment(doc1, doc2),
            n.suggested_edits(doc1, doc2),
            n.structural_comparison(doc1, doc2),
            n.section_alignment(doc1, doc2)
        );
        NarrativeInsights {
            diff_explanation,
            similarity_explanation,
            highlighted_changes,
            risk_assessment,
            suggested_edits,
            structural_comparison,
            section_alignment,
        }
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

/// Print a report as readable text.
pub fn print_report(report: &InsightsReport) {
    println!("--- Languages ---");
    println!("doc1: {}", report.languages.doc1);
    println!("doc2: {}", report.languages.doc2);
    if let Some(ref target) = report.translated_to {
        println!("translated to: {}", target);
    }
    println!();

    println!("--- Lexical Diff ---");
    println!("similarity ratio: {}", report.diff.similarity_ratio);
    println!(
        "lines: {} unchanged ({}%), {} added ({}%), {} removed ({}%)",
        report.diff.stats.unchanged,
        report.diff.unchanged_percent,
        report.diff.stats.added,
        report.diff.added_percent,
        report.diff.stats.removed,
        report.diff.removed_percent
    );
    println!("{}", report.diff.summary_text);
    println!("diff percentage: {}%", report.diff.diff_percentage);
    println!(
        "words: {} added, {} removed, {} common",
        report.diff.word_stats.added, report.diff.word_stats.removed, report.diff.word_stats.common
    );
    println!();

    println!("--- Semantic ---");
    println!("similarity: {}", report.semantic.similarity_score);
    println!("unique to doc1: {}", list_or_none(&report.semantic.unique_to_doc1));
    println!("unique to doc2: {}", list_or_none(&report.semantic.unique_to_doc2));
    println!("topics doc1: {}", list_or_none(&report.semantic.topics.doc1));
    println!("topics doc2: {}", list_or_none(&report.semantic.topics.doc2));
    for alert in &report.semantic.alerts {
        println!("alert: {}", alert.alert);
    }
    println!();

    println!("--- Sentiment ---");
    let s = &report.sentiment;
    println!(
        "doc1: {} (risk {})",
        s.comparison.doc1_sentiment.sentiment, s.risk.doc1
    );
    println!(
        "doc2: {} (risk {})",
        s.comparison.doc2_sentiment.sentiment, s.risk.doc2
    );
    println!("average: {}", s.average_scores);
    println!("variance: {}", s.variance);
    for alert in &s.alerts {
        println!("alert: {}", alert.alert);
    }
    println!();

    println!("--- Tone ---");
    println!("{}", report.tone.shift.tone_shift_details);
    println!("{}", report.tone.change_summary);
    println!();

    println!("--- Compliance ---");
    for flag in report.compliance_flags.doc1.iter() {
        println!("doc1: {}", flag);
    }
    for flag in report.compliance_flags.doc2.iter() {
        println!("doc2: {}", flag);
    }
    if !report.pii.doc1.is_empty() || !report.pii.doc2.is_empty() {
        println!("pii doc1: {}", list_or_none(&report.pii.doc1));
        println!("pii doc2: {}", list_or_none(&report.pii.doc2));
    }

    let n = &report.narrative;
    let sections = [
        ("Diff Explanation", &n.diff_explanation),
        ("Similarity Explanation", &n.similarity_explanation),
        ("Highlighted Changes", &n.highlighted_changes),
        ("Risk Assessment", &n.risk_assessment),
        ("Suggested Edits", &n.suggested_edits),
        ("Structural Comparison", &n.structural_comparison),
        ("Section Alignment", &n.section_alignment),
    ];
    for (title, text) in sections {
        if let Some(text) = text {
            println!();
            println!("--- {} ---", title);
            println!("{}", text);
        }
    }
}

/// CLI entry point for `dcmp compare`.
pub async fn run_compare(
    config: &Config,
    doc1: &str,
    doc2: &str,
    keywords: Vec<String>,
    json: bool,
) -> Result<()> {
    let engine = InsightsEngine::from_config(config)?.with_keywords(keywords);
    let report = engine.get_document_insights(doc1, doc2).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}
