use crate::{DocId, QueryId};
use std::collections::{HashMap, HashSet};

pub type RelevanceSet = HashSet<DocId>;

/// Ground-truth relevance judgments, keyed by query id.
///
/// Built once from the qrels source and read-only afterwards, so it can be
/// shared freely between evaluation workers.
#[derive(Debug, Clone, Default)]
pub struct RelevanceJudgments {
    judgments: HashMap<QueryId, RelevanceSet>,
    empty: RelevanceSet,
}

impl RelevanceJudgments {
    pub fn new() -> Self { Self::default() }

    /// Build the store from `(query id, relevant documents)` pairs.
    ///
    /// A query id that appears more than once keeps only its last entry.
    pub fn from_pairs<I, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (QueryId, D)>,
        D: IntoIterator<Item = DocId>,
    {
        let mut judgments = HashMap::new();
        for (query_id, docs) in pairs {
            let set: RelevanceSet = docs.into_iter().collect();
            if judgments.insert(query_id, set).is_some() {
                tracing::warn!(query_id, "query judged more than once, keeping the last entry");
            }
        }
        Self { judgments, empty: RelevanceSet::new() }
    }

    /// Relevant documents for `query_id`; the empty set when the query was never judged.
    pub fn lookup(&self, query_id: QueryId) -> &RelevanceSet {
        self.judgments.get(&query_id).unwrap_or(&self.empty)
    }

    pub fn contains(&self, query_id: QueryId) -> bool { self.judgments.contains_key(&query_id) }

    /// Number of judged queries.
    pub fn len(&self) -> usize { self.judgments.len() }

    pub fn is_empty(&self) -> bool { self.judgments.is_empty() }

    pub fn max_query_id(&self) -> Option<QueryId> { self.judgments.keys().copied().max() }

    /// Mean size of the relevance sets over judged queries, 0 when nothing is judged.
    pub fn average_relevant_per_query(&self) -> f64 {
        if self.judgments.is_empty() {
            return 0.0;
        }
        let total: usize = self.judgments.values().map(HashSet::len).sum();
        total as f64 / self.judgments.len() as f64
    }
}
