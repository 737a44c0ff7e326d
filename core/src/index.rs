use crate::driver::Searcher;
use crate::tokenizer::Analyzer;
use crate::{DocId, TermId};
use std::collections::{HashMap, HashSet};

/// A document of the collection as read from the documents file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub authors: String,
    pub title: String,
    pub summary: Option<String>,
}

impl Document {
    /// Text that gets indexed: title followed by the summary, if any.
    pub fn indexed_text(&self) -> String {
        match &self.summary {
            Some(summary) => format!("{}\n{}", self.title, summary),
            None => self.title.clone(),
        }
    }
}

/// How the collection is analyzed and searched for one evaluation run.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    pub analyzer: Analyzer,
    /// Keep at most this many hits per query; `None` keeps every match.
    pub max_results: Option<usize>,
    /// Use smoothed IDF = ln(1 + N/df) instead of ln(N/df)
    pub smoothed_idf: bool,
}

#[derive(Debug, Clone)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f32, // normalized tf-idf weight
}

/// In-memory inverted index ranking documents by TF-IDF cosine similarity.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    config: SearchConfig,
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    postings: HashMap<TermId, Vec<Posting>>, // postings sorted by doc_id
    num_docs: u32,
}

impl InvertedIndex {
    pub fn build<I>(documents: I, config: SearchConfig) -> Self
    where
        I: IntoIterator<Item = Document>,
    {
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut postings_raw: HashMap<TermId, Vec<(DocId, u32)>> = HashMap::new();
        let mut num_docs: u32 = 0;

        for doc in documents {
            num_docs += 1;
            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for (term, _pos) in config.analyzer.tokenize(&doc.indexed_text()) {
                let next_id = dictionary.len() as TermId;
                let tid = *dictionary.entry(term).or_insert(next_id);
                if df.len() <= tid as usize { df.resize(tid as usize + 1, 0); }
                *tf_counts.entry(tid).or_insert(0) += 1;
            }
            for (tid, tf_raw) in tf_counts {
                df[tid as usize] += 1;
                postings_raw.entry(tid).or_default().push((doc.id, tf_raw));
            }
        }

        let n = num_docs.max(1);
        let mut doc_norms: HashMap<DocId, f32> = HashMap::new();
        let mut weighted: HashMap<TermId, Vec<(DocId, f32)>> = HashMap::with_capacity(postings_raw.len());
        // First pass: compute tfidf and accumulate norms
        for (term_id, plist) in postings_raw {
            let idf = idf(n, df[term_id as usize], config.smoothed_idf);
            let entries = plist
                .into_iter()
                .map(|(doc_id, tf_raw)| {
                    let tfidf = log_tf(tf_raw) * idf;
                    *doc_norms.entry(doc_id).or_insert(0.0) += tfidf * tfidf;
                    (doc_id, tfidf)
                })
                .collect();
            weighted.insert(term_id, entries);
        }
        for dn in doc_norms.values_mut() {
            *dn = dn.sqrt();
            if *dn == 0.0 { *dn = 1.0; }
        }

        // Second pass: normalize
        let postings = weighted
            .into_iter()
            .map(|(term_id, plist)| {
                let mut out: Vec<Posting> = plist
                    .into_iter()
                    .map(|(doc_id, tfidf)| Posting { doc_id, weight: tfidf / doc_norms[&doc_id] })
                    .collect();
                out.sort_by_key(|p| p.doc_id);
                (term_id, out)
            })
            .collect();

        tracing::info!(num_docs, num_terms = dictionary.len(), analyzer = %config.analyzer.describe(), "index built");
        Self { config, dictionary, df, postings, num_docs }
    }

    pub fn num_docs(&self) -> u32 { self.num_docs }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    pub fn config(&self) -> &SearchConfig { &self.config }

    /// Rank documents for `query`, best first; ties go to the lower document id.
    pub fn search_scored(&self, query: &str) -> Vec<(DocId, f32)> {
        // Tokenize query and build tf map
        let mut tf_q_raw: HashMap<TermId, u32> = HashMap::new();
        for (term, _pos) in self.config.analyzer.tokenize(query) {
            if let Some(&tid) = self.dictionary.get(&term) {
                *tf_q_raw.entry(tid).or_insert(0) += 1;
            }
        }
        // Edge case: empty after filtering
        if tf_q_raw.is_empty() {
            return Vec::new();
        }

        let n = self.num_docs.max(1);
        let mut q_weights: HashMap<TermId, f32> = tf_q_raw
            .iter()
            .map(|(&tid, &tf_raw)| {
                let df_t = self.df.get(tid as usize).copied().unwrap_or(1);
                (tid, log_tf(tf_raw) * idf(n, df_t, self.config.smoothed_idf))
            })
            .collect();
        let mut norm = q_weights.values().map(|w| w * w).sum::<f32>().sqrt();
        if norm == 0.0 { norm = 1.0; }
        for w in q_weights.values_mut() { *w /= norm; }

        // Aggregate scores from postings
        let mut scores: HashMap<DocId, f32> = HashMap::new();
        for (tid, q_w) in &q_weights {
            if let Some(postings) = self.postings.get(tid) {
                for p in postings {
                    *scores.entry(p.doc_id).or_insert(0.0) += p.weight * q_w; // cosine since doc weights are normalized
                }
            }
        }

        let mut scored: Vec<(DocId, f32)> = scores.into_iter().collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
        if let Some(k) = self.config.max_results {
            scored.truncate(k);
        }
        scored
    }
}

impl Searcher for InvertedIndex {
    fn search(&self, query: &str) -> anyhow::Result<Vec<DocId>> {
        Ok(self.search_scored(query).into_iter().map(|(doc_id, _)| doc_id).collect())
    }
}

fn log_tf(tf_raw: u32) -> f32 {
    if tf_raw > 0 { 1.0 + (tf_raw as f32).ln() } else { 0.0 }
}

fn idf(n: u32, df_t: u32, smoothed: bool) -> f32 {
    let ratio = n as f32 / df_t.max(1) as f32;
    if smoothed { (1.0 + ratio).ln() } else { ratio.ln() }
}

/// Ids that appear on more than one document; a later duplicate shadows the earlier one in the index.
pub fn duplicate_ids(documents: &[Document]) -> Vec<DocId> {
    let mut seen = HashSet::new();
    let mut dups: Vec<DocId> = documents.iter().filter(|d| !seen.insert(d.id)).map(|d| d.id).collect();
    dups.sort_unstable();
    dups.dedup();
    dups
}
