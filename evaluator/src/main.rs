use anyhow::Result;
use clap::Parser;
use evaluator::{run, EvalConfig};
use ireval_core::AnalyzerKind;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "evaluator")]
#[command(about = "Evaluate retrieval quality against relevance judgments", long_about = None)]
struct Args {
    /// Document collection (id, authors, title, summary; tab separated)
    #[arg(long, default_value = "documents/cacm.txt")]
    documents: PathBuf,
    /// Query file, one tab-separated record per query
    #[arg(long, default_value = "evaluation/query.txt")]
    queries: PathBuf,
    /// Relevance judgments, `query;doc,doc,...` per line
    #[arg(long, default_value = "evaluation/qrels.txt")]
    qrels: PathBuf,
    /// Stop-word list for the english-common-words analyzer
    #[arg(long)]
    common_words: Option<PathBuf>,
    /// standard, whitespace, english or english-common-words
    #[arg(long, default_value = "standard")]
    analyzer: AnalyzerKind,
    /// Keep at most this many results per query
    #[arg(long)]
    max_results: Option<usize>,
    /// Use smoothed IDF = ln(1 + N/df) instead of ln(N/df)
    #[arg(long, default_value_t = false)]
    smoothed_idf: bool,
    /// Worker threads used to evaluate queries
    #[arg(long, default_value = "1")]
    workers: NonZeroUsize,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Include per-query metrics
    #[arg(long)]
    per_query: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let args = Args::parse();

    let config = EvalConfig {
        documents: args.documents,
        queries: args.queries,
        qrels: args.qrels,
        common_words: args.common_words,
        analyzer: args.analyzer,
        max_results: args.max_results,
        smoothed_idf: args.smoothed_idf,
        workers: args.workers,
        per_query: args.per_query,
    };
    let report = run(&config)?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }
    Ok(())
}
