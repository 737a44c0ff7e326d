use crate::metrics::{f_measure, PerQueryMetrics, RECALL_LEVELS};
use serde::Serialize;

/// Running totals over the per-query metrics of an evaluation.
///
/// Folding is associative and commutative, so partial aggregators built on
/// different workers can be merged before [`Aggregator::finalize`].
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    query_count: usize,
    total_retrieved: usize,
    total_relevant: usize,
    total_retrieved_relevant: usize,
    sum_precision: f64,
    sum_recall: f64,
    sum_average_precision: f64,
    sum_r_precision: f64,
    sum_interpolated: [f64; RECALL_LEVELS],
}

/// Corpus-level metrics, produced once every query has been folded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusMetrics {
    pub query_count: usize,
    pub total_retrieved: usize,
    pub total_relevant: usize,
    pub total_retrieved_relevant: usize,
    pub mean_precision: f64,
    pub mean_recall: f64,
    pub f_measure: f64,
    pub mean_average_precision: f64,
    pub mean_r_precision: f64,
    pub precision_at_recall_levels: [f64; RECALL_LEVELS],
}

impl Aggregator {
    pub fn new() -> Self { Self::default() }

    pub fn fold(&mut self, m: &PerQueryMetrics) {
        self.query_count += 1;
        self.total_retrieved += m.retrieved_count;
        self.total_relevant += m.relevant_count;
        self.total_retrieved_relevant += m.retrieved_relevant_count;
        self.sum_precision += m.precision;
        self.sum_recall += m.recall;
        self.sum_average_precision += m.average_precision;
        self.sum_r_precision += m.r_precision;
        for (sum, p) in self.sum_interpolated.iter_mut().zip(m.interpolated_precision.iter()) {
            *sum += p;
        }
    }

    /// Combine the totals of another aggregator into this one.
    pub fn merge(&mut self, other: Aggregator) {
        self.query_count += other.query_count;
        self.total_retrieved += other.total_retrieved;
        self.total_relevant += other.total_relevant;
        self.total_retrieved_relevant += other.total_retrieved_relevant;
        self.sum_precision += other.sum_precision;
        self.sum_recall += other.sum_recall;
        self.sum_average_precision += other.sum_average_precision;
        self.sum_r_precision += other.sum_r_precision;
        for (sum, p) in self.sum_interpolated.iter_mut().zip(other.sum_interpolated.iter()) {
            *sum += p;
        }
    }

    pub fn query_count(&self) -> usize { self.query_count }

    /// Divide the sums by the query count. Consumes the aggregator so the
    /// means can only be read once folding is over.
    pub fn finalize(self) -> CorpusMetrics {
        let n = self.query_count;
        let mean = |sum: f64| if n == 0 { 0.0 } else { sum / n as f64 };

        let mean_precision = mean(self.sum_precision);
        let mean_recall = mean(self.sum_recall);
        let mut precision_at_recall_levels = [0.0; RECALL_LEVELS];
        for (avg, sum) in precision_at_recall_levels.iter_mut().zip(self.sum_interpolated.iter()) {
            *avg = mean(*sum);
        }

        CorpusMetrics {
            query_count: n,
            total_retrieved: self.total_retrieved,
            total_relevant: self.total_relevant,
            total_retrieved_relevant: self.total_retrieved_relevant,
            mean_precision,
            mean_recall,
            f_measure: f_measure(mean_precision, mean_recall),
            mean_average_precision: mean(self.sum_average_precision),
            mean_r_precision: mean(self.sum_r_precision),
            precision_at_recall_levels,
        }
    }
}

impl<'a> Extend<&'a PerQueryMetrics> for Aggregator {
    fn extend<T: IntoIterator<Item = &'a PerQueryMetrics>>(&mut self, iter: T) {
        for m in iter {
            self.fold(m);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::evaluate_query;
    use crate::qrels::RelevanceSet;

    fn rel(ids: &[u32]) -> RelevanceSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn map_is_mean_of_average_precisions() {
        // AP = 1.0
        let a = evaluate_query(1, &[1, 2], &rel(&[1, 2]));
        // AP = (1/2) / 1 = 0.5
        let b = evaluate_query(2, &[9, 3], &rel(&[3]));
        assert!((b.average_precision - 0.5).abs() < 1e-12);

        let mut agg = Aggregator::new();
        agg.fold(&a);
        agg.fold(&b);
        let corpus = agg.finalize();
        assert!((corpus.mean_average_precision - 0.75).abs() < 1e-12);
        assert_eq!(corpus.query_count, 2);
        assert_eq!(corpus.total_retrieved, 4);
        assert_eq!(corpus.total_relevant, 3);
        assert_eq!(corpus.total_retrieved_relevant, 3);
    }

    #[test]
    fn single_query_map_equals_its_ap() {
        let m = evaluate_query(1, &[1, 4, 2, 5, 3], &rel(&[1, 2, 3]));
        let mut agg = Aggregator::new();
        agg.fold(&m);
        let corpus = agg.finalize();
        assert_eq!(corpus.mean_average_precision, m.average_precision);
        assert_eq!(corpus.precision_at_recall_levels, m.interpolated_precision);
    }

    #[test]
    fn f_measure_uses_the_means() {
        let a = evaluate_query(1, &[1, 5, 6, 7], &rel(&[1]));
        let b = evaluate_query(2, &[2, 3], &rel(&[2, 3, 4, 8]));
        let mut agg = Aggregator::new();
        agg.extend([&a, &b]);
        let corpus = agg.finalize();
        let p = (0.25 + 1.0) / 2.0;
        let r = (1.0 + 0.5) / 2.0;
        assert!((corpus.mean_precision - p).abs() < 1e-12);
        assert!((corpus.mean_recall - r).abs() < 1e-12);
        assert!((corpus.f_measure - 2.0 * p * r / (p + r)).abs() < 1e-12);
    }

    #[test]
    fn all_zero_means_give_zero_f_measure() {
        let mut agg = Aggregator::new();
        agg.fold(&evaluate_query(1, &[], &rel(&[1])));
        let corpus = agg.finalize();
        assert_eq!(corpus.f_measure, 0.0);
        assert_eq!(corpus.mean_precision, 0.0);
    }

    #[test]
    fn empty_aggregator_finalizes_to_zeros() {
        let corpus = Aggregator::new().finalize();
        assert_eq!(corpus.query_count, 0);
        assert_eq!(corpus.mean_average_precision, 0.0);
        assert_eq!(corpus.precision_at_recall_levels, [0.0; RECALL_LEVELS]);
    }

    #[test]
    fn merged_partials_match_a_single_fold() {
        let metrics = vec![
            evaluate_query(1, &[1, 2, 3], &rel(&[2])),
            evaluate_query(2, &[4, 5], &rel(&[4, 5, 6])),
            evaluate_query(3, &[7], &rel(&[])),
        ];
        let mut whole = Aggregator::new();
        whole.extend(&metrics);

        let mut left = Aggregator::new();
        left.fold(&metrics[0]);
        let mut right = Aggregator::new();
        right.extend(&metrics[1..]);
        left.merge(right);

        let a = whole.finalize();
        let b = left.finalize();
        assert_eq!(a.query_count, b.query_count);
        assert_eq!(a.total_retrieved_relevant, b.total_retrieved_relevant);
        assert!((a.mean_average_precision - b.mean_average_precision).abs() < 1e-12);
        assert!((a.mean_r_precision - b.mean_r_precision).abs() < 1e-12);
    }
}
