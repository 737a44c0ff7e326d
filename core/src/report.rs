use crate::aggregate::CorpusMetrics;
use crate::driver::EvaluationRun;
use crate::qrels::RelevanceJudgments;
use serde::Serialize;
use std::fmt;

/// Size of the evaluation inputs, shown ahead of the metrics.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub num_queries: usize,
    pub num_qrels: usize,
    pub avg_relevant_per_query: f64,
}

impl DatasetSummary {
    pub fn new(queries: &[String], judgments: &RelevanceJudgments) -> Self {
        Self {
            num_queries: queries.len(),
            num_qrels: judgments.len(),
            avg_relevant_per_query: judgments.average_relevant_per_query(),
        }
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of queries: {}", self.num_queries)?;
        writeln!(f, "Number of qrels: {}", self.num_qrels)?;
        writeln!(f, "Average number of relevant docs per query: {}", self.avg_relevant_per_query)
    }
}

/// Everything printed at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub analyzer: String,
    pub dataset: DatasetSummary,
    #[serde(flatten)]
    pub run: EvaluationRun,
    #[serde(skip)]
    pub show_per_query: bool,
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        if self.show_per_query {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string_pretty(&serde_json::json!({
                "analyzer": self.analyzer,
                "dataset": self.dataset,
                "corpus": self.run.corpus,
            }))
        }
    }
}

impl fmt::Display for CorpusMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of retrieved documents: {}", self.total_retrieved)?;
        writeln!(f, "Number of relevant documents: {}", self.total_relevant)?;
        writeln!(f, "Number of relevant documents retrieved: {}", self.total_retrieved_relevant)?;
        writeln!(f, "Average precision: {}", self.mean_precision)?;
        writeln!(f, "Average recall: {}", self.mean_recall)?;
        writeln!(f, "F-measure: {}", self.f_measure)?;
        writeln!(f, "MAP: {}", self.mean_average_precision)?;
        writeln!(f, "Average R-Precision: {}", self.mean_r_precision)?;
        writeln!(f, "Average precision at recall levels: ")?;
        for (i, p) in self.precision_at_recall_levels.iter().enumerate() {
            writeln!(f, "\t{i}: {p}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dataset)?;
        writeln!(f, "{}", self.analyzer)?;
        write!(f, "{}", self.run.corpus)?;
        if self.show_per_query {
            writeln!(f, "Per query (id, retrieved, relevant, retrieved relevant, precision, recall, AP, R-precision):")?;
            for m in &self.run.per_query {
                writeln!(
                    f,
                    "\t{}\t{}\t{}\t{}\t{:.4}\t{:.4}\t{:.4}\t{:.4}",
                    m.query_id,
                    m.retrieved_count,
                    m.relevant_count,
                    m.retrieved_relevant_count,
                    m.precision,
                    m.recall,
                    m.average_precision,
                    m.r_precision
                )?;
            }
        }
        Ok(())
    }
}
