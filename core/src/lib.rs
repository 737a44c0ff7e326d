pub mod aggregate;
pub mod driver;
pub mod error;
pub mod index;
pub mod loader;
pub mod metrics;
pub mod qrels;
pub mod report;
pub mod tokenizer;

pub use aggregate::{Aggregator, CorpusMetrics};
pub use driver::{evaluate, evaluate_parallel, EvaluationRun, Searcher};
pub use error::{EvalError, Result};
pub use index::{InvertedIndex, SearchConfig};
pub use metrics::{evaluate_query, f_measure, PerQueryMetrics, RECALL_LEVELS};
pub use qrels::{RelevanceJudgments, RelevanceSet};
pub use tokenizer::{Analyzer, AnalyzerKind};

pub type TermId = u32;
pub type DocId = u32;
/// 1-based position of a query in the query file.
pub type QueryId = u32;
