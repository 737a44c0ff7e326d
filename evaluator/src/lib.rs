use anyhow::{bail, Context, Result};
use ireval_core::index::duplicate_ids;
use ireval_core::loader::{read_common_words, read_documents, read_judgments, read_queries};
use ireval_core::report::{DatasetSummary, Report};
use ireval_core::{evaluate, evaluate_parallel, Analyzer, AnalyzerKind, InvertedIndex, SearchConfig};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Inputs and settings of one evaluation run.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub documents: PathBuf,
    pub queries: PathBuf,
    pub qrels: PathBuf,
    pub common_words: Option<PathBuf>,
    pub analyzer: AnalyzerKind,
    pub max_results: Option<usize>,
    pub smoothed_idf: bool,
    pub workers: NonZeroUsize,
    pub per_query: bool,
}

fn build_analyzer(config: &EvalConfig) -> Result<Analyzer> {
    match (config.analyzer, &config.common_words) {
        (AnalyzerKind::EnglishCommonWords, Some(path)) => {
            let words = read_common_words(path)?;
            Ok(Analyzer::with_common_words(words))
        }
        (AnalyzerKind::EnglishCommonWords, None) => {
            bail!("the english-common-words analyzer needs --common-words")
        }
        (kind, Some(path)) => {
            tracing::warn!(path = %path.display(), analyzer = %kind, "common words are only used by english-common-words, ignoring");
            Ok(Analyzer::new(kind))
        }
        (kind, None) => Ok(Analyzer::new(kind)),
    }
}

/// Load every input, index the collection and evaluate all queries against it.
pub fn run(config: &EvalConfig) -> Result<Report> {
    // Ground truth first: a malformed qrels file aborts before any indexing work.
    let queries = read_queries(&config.queries).context("loading queries")?;
    let judgments = read_judgments(&config.qrels).context("loading relevance judgments")?;
    let dataset = DatasetSummary::new(&queries, &judgments);
    tracing::info!(
        queries = dataset.num_queries,
        qrels = dataset.num_qrels,
        avg_relevant = dataset.avg_relevant_per_query,
        "loaded evaluation inputs"
    );

    let analyzer = build_analyzer(config)?;
    let documents = read_documents(&config.documents).context("loading documents")?;
    let dups = duplicate_ids(&documents);
    if !dups.is_empty() {
        tracing::warn!(count = dups.len(), first = dups[0], "documents share an id");
    }

    let search_config = SearchConfig { analyzer, max_results: config.max_results, smoothed_idf: config.smoothed_idf };
    let index = InvertedIndex::build(documents, search_config);
    let analyzer_name = index.config().analyzer.describe();

    let run = if config.workers.get() > 1 {
        evaluate_parallel(&queries, &judgments, &index, config.workers)?
    } else {
        evaluate(&queries, &judgments, &index)?
    };

    Ok(Report { analyzer: analyzer_name, dataset, run, show_per_query: config.per_query })
}
