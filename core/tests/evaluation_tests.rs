use ireval_core::loader::{parse_documents, parse_judgments, parse_queries};
use ireval_core::{evaluate, evaluate_query, f_measure, Aggregator, DocId, InvertedIndex, RelevanceSet, SearchConfig};
use std::io::Cursor;

fn rel(ids: &[DocId]) -> RelevanceSet {
    ids.iter().copied().collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn relevant_documents_interleaved_with_misses() {
    let m = evaluate_query(1, &[1, 4, 2, 5, 3], &rel(&[1, 2, 3]));
    assert!(close(m.average_precision, (1.0 + 2.0 / 3.0 + 3.0 / 5.0) / 3.0));
    assert!(close(m.average_precision, 0.7556));
    assert!(close(m.precision, 0.6));
    assert!(close(m.recall, 1.0));
}

#[test]
fn query_without_relevant_documents() {
    let m = evaluate_query(1, &[7, 8], &rel(&[]));
    assert_eq!((m.recall, m.average_precision, m.precision), (0.0, 0.0, 0.0));
}

#[test]
fn query_with_nothing_retrieved() {
    let m = evaluate_query(1, &[], &rel(&[1, 2]));
    assert_eq!(m.retrieved_count, 0);
    assert_eq!(m.recall, 0.0);
    assert_eq!(m.precision, 0.0);
    assert!(m.precision.is_finite());
}

#[test]
fn map_over_two_queries() {
    let perfect = evaluate_query(1, &[5], &rel(&[5]));
    let half = evaluate_query(2, &[1, 5], &rel(&[5]));
    assert_eq!(perfect.average_precision, 1.0);
    assert_eq!(half.average_precision, 0.5);

    let mut agg = Aggregator::new();
    agg.extend([&perfect, &half]);
    assert!(close(agg.finalize().mean_average_precision, 0.75));
}

#[test]
fn f_measure_symmetry() {
    for (p, r) in [(0.1, 0.9), (0.33, 0.66), (1.0, 0.0)] {
        assert!(close(f_measure(p, r), f_measure(r, p)));
    }
}

#[test]
fn end_to_end_over_a_tiny_collection() {
    let documents = "\
1\tPerlis, A. J.\tAlgebraic language report\tA report on the ALGOL algebraic language
2\tHerrick, H. L.\tMatrix inversion\tInverting matrices numerically
3\t\tSorting on magnetic tape\tExternal sorting methods
4\t\tAlgebraic compilers\tCompiling the ALGOL language
";
    let queries = "q1\tALGOL language\nq2\tsorting tape\nq3\tneural networks\n";
    let qrels = "1;1,4\n2;3\n";

    let docs = parse_documents(Cursor::new(documents), "docs").unwrap();
    let queries = parse_queries(Cursor::new(queries), "queries").unwrap();
    let judgments = parse_judgments(Cursor::new(qrels), "qrels").unwrap();
    let index = InvertedIndex::build(docs, SearchConfig::default());

    let run = evaluate(&queries, &judgments, &index).unwrap();
    let corpus = &run.corpus;
    assert_eq!(corpus.query_count, 3);
    assert_eq!(corpus.total_relevant, 3);
    assert_eq!(corpus.total_retrieved_relevant, 3);
    assert!(close(run.per_query[0].average_precision, 1.0));
    assert!(close(run.per_query[1].average_precision, 1.0));
    // nothing matches the third query and nothing is relevant to it
    assert_eq!(run.per_query[2].retrieved_count, 0);
    assert!(close(corpus.mean_average_precision, 2.0 / 3.0));
    assert!(close(corpus.mean_recall, 2.0 / 3.0));
    assert!(close(corpus.precision_at_recall_levels[0], 2.0 / 3.0));
}

#[test]
fn reads_inputs_from_disk() {
    use ireval_core::loader::{read_common_words, read_judgments, read_queries};
    use ireval_core::EvalError;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("query.txt"), "1\tfirst query\n2\tsecond query\n").unwrap();
    std::fs::write(dir.path().join("qrels.txt"), "2;10,11\n").unwrap();
    std::fs::write(dir.path().join("common_words.txt"), "a\nan\n\nthe\n").unwrap();

    let queries = read_queries(&dir.path().join("query.txt")).unwrap();
    let judgments = read_judgments(&dir.path().join("qrels.txt")).unwrap();
    let words = read_common_words(&dir.path().join("common_words.txt")).unwrap();
    assert_eq!(queries.len(), 2);
    assert_eq!(judgments.lookup(2).len(), 2);
    assert_eq!(words, vec!["a", "an", "the"]);

    let err = read_judgments(&dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, EvalError::Io { .. }));
}
