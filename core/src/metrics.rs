//! Per-query retrieval metrics.
//!
//! Given one ranked result list and the relevance set of its query, computes
//! precision, recall, Average Precision, the R-Precision contribution and the
//! interpolated precision at the 11 standard recall levels.
//!
//! Counting rules:
//! - true positives are counted over the *distinct* retrieved documents, so a
//!   repeated relevant hit does not inflate precision or recall;
//! - the Average Precision and R-Precision walks inspect every rank on its own,
//!   duplicates included;
//! - with no retrieved documents precision is 0;
//! - with no relevant documents recall, AP and R-Precision are 0.

use crate::qrels::RelevanceSet;
use crate::{DocId, QueryId};
use serde::Serialize;
use std::collections::HashSet;

/// Number of standard recall levels: 0.0, 0.1, ..., 1.0.
pub const RECALL_LEVELS: usize = 11;

/// Absorbs rounding when comparing a recall ratio with a level such as 0.3.
const RECALL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerQueryMetrics {
    pub query_id: QueryId,
    pub retrieved_count: usize,
    pub relevant_count: usize,
    pub retrieved_relevant_count: usize,
    pub precision: f64,
    pub recall: f64,
    pub average_precision: f64,
    pub r_precision: f64,
    /// Interpolated precision at recall level `i / 10`.
    pub interpolated_precision: [f64; RECALL_LEVELS],
}

/// Compute every per-query metric for `ranked` (rank 1 first) against `relevant`.
pub fn evaluate_query(query_id: QueryId, ranked: &[DocId], relevant: &RelevanceSet) -> PerQueryMetrics {
    let retrieved_count = ranked.len();
    let relevant_count = relevant.len();

    let distinct: HashSet<DocId> = ranked.iter().copied().collect();
    let retrieved_relevant_count = distinct.iter().filter(|d| relevant.contains(d)).count();

    let precision = ratio(retrieved_relevant_count, retrieved_count);
    let recall = ratio(retrieved_relevant_count, relevant_count);

    let mut hits = 0usize;
    let mut hits_at_r: Option<usize> = None;
    let mut precision_sum = 0.0;
    let mut seen_relevant: HashSet<DocId> = HashSet::new();
    let mut interpolated_precision = [0.0; RECALL_LEVELS];

    for (i, doc) in ranked.iter().enumerate() {
        let rank = i + 1;
        if relevant.contains(doc) {
            hits += 1;
            precision_sum += hits as f64 / rank as f64;
            seen_relevant.insert(*doc);
        }
        if rank == relevant_count {
            hits_at_r = Some(hits);
        }
        if relevant_count > 0 {
            let found = seen_relevant.len();
            raise_curve(
                &mut interpolated_precision,
                ratio(found, relevant_count),
                ratio(found, rank),
            );
        }
    }

    let average_precision = if relevant_count > 0 { precision_sum / relevant_count as f64 } else { 0.0 };
    // A list shorter than R is scored on everything it retrieved.
    let r_precision = ratio(hits_at_r.unwrap_or(hits), relevant_count);

    PerQueryMetrics {
        query_id,
        retrieved_count,
        relevant_count,
        retrieved_relevant_count,
        precision,
        recall,
        average_precision,
        r_precision,
        interpolated_precision,
    }
}

/// Harmonic mean of precision and recall; 0 when both are 0.
pub fn f_measure(precision: f64, recall: f64) -> f64 {
    let denom = precision + recall;
    if denom == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / denom
    }
}

/// The recall value of level `index` (0.0 ..= 1.0).
pub fn recall_level(index: usize) -> f64 {
    index as f64 / (RECALL_LEVELS - 1) as f64
}

// Interpolated precision at a level is the best precision seen at any rank
// whose recall reaches that level.
fn raise_curve(curve: &mut [f64; RECALL_LEVELS], recall: f64, precision: f64) {
    for (level, best) in curve.iter_mut().enumerate() {
        if recall + RECALL_EPSILON >= recall_level(level) && precision > *best {
            *best = precision;
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
