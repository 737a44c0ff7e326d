use crate::aggregate::{Aggregator, CorpusMetrics};
use crate::error::{EvalError, Result};
use crate::metrics::{evaluate_query, PerQueryMetrics};
use crate::qrels::RelevanceJudgments;
use crate::{DocId, QueryId};
use parking_lot::Mutex;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::thread;

/// Anything that can turn a query text into a ranked list of document ids, best first.
pub trait Searcher {
    fn search(&self, query: &str) -> anyhow::Result<Vec<DocId>>;
}

impl<F> Searcher for F
where
    F: Fn(&str) -> anyhow::Result<Vec<DocId>>,
{
    fn search(&self, query: &str) -> anyhow::Result<Vec<DocId>> { self(query) }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRun {
    pub corpus: CorpusMetrics,
    /// Ordered by query id.
    pub per_query: Vec<PerQueryMetrics>,
}

/// Evaluate every query in order. Query `i` of the slice gets id `i + 1`.
pub fn evaluate<S: Searcher + ?Sized>(queries: &[String], judgments: &RelevanceJudgments, searcher: &S) -> Result<EvaluationRun> {
    check_judgments(queries.len(), judgments)?;

    let mut aggregator = Aggregator::new();
    let mut per_query = Vec::with_capacity(queries.len());
    for (query_id, query) in numbered(queries) {
        let metrics = run_query(query_id, query, judgments, searcher)?;
        aggregator.fold(&metrics);
        per_query.push(metrics);
    }

    let corpus = aggregator.finalize();
    tracing::info!(queries = corpus.query_count, map = corpus.mean_average_precision, "evaluation complete");
    Ok(EvaluationRun { corpus, per_query })
}

/// Same result as [`evaluate`], with queries spread over `workers` scoped threads.
///
/// Each worker folds its share into a local aggregator and merges it into the
/// shared one when done; the corpus metrics are finalized after every worker
/// has joined.
pub fn evaluate_parallel<S>(
    queries: &[String],
    judgments: &RelevanceJudgments,
    searcher: &S,
    workers: NonZeroUsize,
) -> Result<EvaluationRun>
where
    S: Searcher + Sync + ?Sized,
{
    check_judgments(queries.len(), judgments)?;

    let numbered: Vec<(QueryId, &str)> = numbered(queries).collect();
    let chunk_size = numbered.len().div_ceil(workers.get()).max(1);
    let shared = Mutex::new((Aggregator::new(), Vec::<PerQueryMetrics>::with_capacity(numbered.len())));

    thread::scope(|scope| -> Result<()> {
        let handles: Vec<_> = numbered
            .chunks(chunk_size)
            .map(|chunk| {
                let shared = &shared;
                scope.spawn(move || -> Result<()> {
                    let mut local = Aggregator::new();
                    let mut rows = Vec::with_capacity(chunk.len());
                    for &(query_id, query) in chunk {
                        let metrics = run_query(query_id, query, judgments, searcher)?;
                        local.fold(&metrics);
                        rows.push(metrics);
                    }
                    let mut guard = shared.lock();
                    guard.0.merge(local);
                    guard.1.extend(rows);
                    Ok(())
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(result) => result?,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        Ok(())
    })?;

    let (aggregator, mut per_query) = shared.into_inner();
    per_query.sort_by_key(|m| m.query_id);
    let corpus = aggregator.finalize();
    tracing::info!(
        queries = corpus.query_count,
        workers = workers.get(),
        map = corpus.mean_average_precision,
        "evaluation complete"
    );
    Ok(EvaluationRun { corpus, per_query })
}

fn numbered(queries: &[String]) -> impl Iterator<Item = (QueryId, &str)> {
    (1..).zip(queries.iter().map(String::as_str))
}

fn run_query<S: Searcher + ?Sized>(
    query_id: QueryId,
    query: &str,
    judgments: &RelevanceJudgments,
    searcher: &S,
) -> Result<PerQueryMetrics> {
    let ranked = searcher
        .search(query)
        .map_err(|source| EvalError::Search { query_id, source })?;
    let metrics = evaluate_query(query_id, &ranked, judgments.lookup(query_id));
    tracing::debug!(
        query_id,
        retrieved = metrics.retrieved_count,
        relevant = metrics.relevant_count,
        ap = metrics.average_precision,
        "query evaluated"
    );
    Ok(metrics)
}

// Judgments for a query id past the end of the query list mean the two files
// are out of step; scoring anyway would average over the wrong queries.
fn check_judgments(query_count: usize, judgments: &RelevanceJudgments) -> Result<()> {
    match judgments.max_query_id() {
        Some(max) if max as usize > query_count => Err(EvalError::InvalidInput {
            query_id: max,
            reason: format!("judged query has no matching query ({query_count} queries loaded)"),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn canned(results: Vec<(&'static str, Vec<DocId>)>) -> impl Fn(&str) -> anyhow::Result<Vec<DocId>> + Sync {
        let table: HashMap<&'static str, Vec<DocId>> = results.into_iter().collect();
        move |q: &str| Ok(table.get(q).cloned().unwrap_or_default())
    }

    fn queries(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn query_ids_follow_input_order() {
        let qs = queries(&["alpha", "beta"]);
        let judgments = RelevanceJudgments::from_pairs(vec![(1, vec![1, 2]), (2, vec![3])]);
        let searcher = canned(vec![("alpha", vec![1, 2]), ("beta", vec![9, 3])]);

        let run = evaluate(&qs, &judgments, &searcher).unwrap();
        assert_eq!(run.per_query[0].query_id, 1);
        assert_eq!(run.per_query[1].query_id, 2);
        assert!((run.per_query[0].average_precision - 1.0).abs() < 1e-12);
        assert!((run.per_query[1].average_precision - 0.5).abs() < 1e-12);
        assert!((run.corpus.mean_average_precision - 0.75).abs() < 1e-12);
    }

    #[test]
    fn unjudged_queries_still_count_toward_the_mean() {
        let qs = queries(&["alpha", "beta"]);
        let judgments = RelevanceJudgments::from_pairs(vec![(1, vec![1])]);
        let searcher = canned(vec![("alpha", vec![1]), ("beta", vec![1])]);

        let run = evaluate(&qs, &judgments, &searcher).unwrap();
        assert_eq!(run.corpus.query_count, 2);
        assert!((run.corpus.mean_average_precision - 0.5).abs() < 1e-12);
        assert_eq!(run.per_query[1].recall, 0.0);
    }

    #[test]
    fn judgments_beyond_query_list_are_rejected() {
        let qs = queries(&["alpha"]);
        let judgments = RelevanceJudgments::from_pairs(vec![(1, vec![1]), (4, vec![2])]);
        let searcher = canned(vec![]);

        let err = evaluate(&qs, &judgments, &searcher).unwrap_err();
        assert!(matches!(err, EvalError::InvalidInput { query_id: 4, .. }));
    }

    #[test]
    fn search_failure_aborts_the_run() {
        let qs = queries(&["ok", "broken"]);
        let judgments = RelevanceJudgments::new();
        let searcher = |q: &str| -> anyhow::Result<Vec<DocId>> {
            if q == "broken" {
                anyhow::bail!("index unavailable")
            }
            Ok(vec![1])
        };

        let err = evaluate(&qs, &judgments, &searcher).unwrap_err();
        assert!(matches!(err, EvalError::Search { query_id: 2, .. }));
    }

    #[test]
    fn parallel_run_matches_sequential_run() {
        let texts: Vec<String> = (0..17).map(|i| format!("q{i}")).collect();
        let judgments = RelevanceJudgments::from_pairs((1..=17).map(|id| (id, vec![id, id + 100])));
        let searcher = |q: &str| -> anyhow::Result<Vec<DocId>> {
            let n: DocId = q[1..].parse()?;
            Ok(vec![n + 200, n + 1, n + 101, n + 300])
        };

        let sequential = evaluate(&texts, &judgments, &searcher).unwrap();
        let parallel = evaluate_parallel(&texts, &judgments, &searcher, NonZeroUsize::new(4).unwrap()).unwrap();

        assert_eq!(sequential.per_query, parallel.per_query);
        assert_eq!(sequential.corpus.total_retrieved_relevant, parallel.corpus.total_retrieved_relevant);
        assert!((sequential.corpus.mean_average_precision - parallel.corpus.mean_average_precision).abs() < 1e-9);
        assert!((sequential.corpus.f_measure - parallel.corpus.f_measure).abs() < 1e-9);
    }

    #[test]
    fn parallel_run_on_empty_query_list() {
        let run = evaluate_parallel(&[], &RelevanceJudgments::new(), &canned(vec![]), NonZeroUsize::new(3).unwrap()).unwrap();
        assert_eq!(run.corpus.query_count, 0);
        assert!(run.per_query.is_empty());
    }
}
