use crate::QueryId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    /// A query, judgment, document or common-words record could not be parsed.
    #[error("malformed record in {source_name} at line {line}: {reason}")]
    MalformedInput {
        source_name: String,
        line: usize,
        reason: String,
    },
    /// The inputs of a query do not line up with the query list.
    #[error("invalid input for query {query_id}: {reason}")]
    InvalidInput { query_id: QueryId, reason: String },
    /// The search collaborator failed to produce a ranked list.
    #[error("search failed for query {query_id}")]
    Search {
        query_id: QueryId,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown analyzer `{0}` (expected standard, whitespace, english or english-common-words)")]
    UnknownAnalyzer(String),
}

pub type Result<T, E = EvalError> = std::result::Result<T, E>;
