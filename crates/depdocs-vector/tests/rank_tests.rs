use depdocs_core::traits::Ranker;
use depdocs_core::types::{DependencyRef, Record};
use depdocs_core::Error;
use depdocs_vector::{cosine_similarity, ExhaustiveRanker};

fn record(text: &str, repo: &str, file: &str, embedding: Vec<f32>) -> Record {
    Record::new(text, embedding, &DependencyRef::new(repo.rsplit('/').next().unwrap(), repo), file)
}

#[test]
fn self_similarity_is_one_and_symmetric() {
    let a = [0.3f32, -1.2, 4.0, 0.5];
    let b = [1.0f32, 0.0, 2.0, -0.5];
    assert!((cosine_similarity(&a, &a).unwrap() - 1.0).abs() < 1e-6);
    assert_eq!(cosine_similarity(&a, &b).unwrap(), cosine_similarity(&b, &a).unwrap());
}

#[test]
fn zero_vector_scores_zero() {
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap(), 0.0);
}

#[test]
fn mismatched_lengths_fail_fast() {
    let err = cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0]).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 2 }));

    let records = vec![record("a", "o/r", "f.md", vec![1.0, 0.0])];
    assert!(ExhaustiveRanker.rank(&[1.0, 0.0, 0.0], &records, None, 5).is_err());
}

#[test]
fn two_record_scenario() {
    let records = vec![
        record("first", "o/a", "a.md", vec![0.1, 0.2, 0.3]),
        record("second", "o/b", "b.md", vec![0.2, 0.3, 0.4]),
    ];
    let results = ExhaustiveRanker.rank(&[0.1, 0.2, 0.3], &records, None, 5).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].text_chunk, "first");
    assert!((results[0].similarity_score - 1.0).abs() < 1e-6);
    assert!(results[1].similarity_score < results[0].similarity_score);
}

#[test]
fn output_is_sorted_non_increasing() {
    let records: Vec<Record> = (0..25)
        .map(|i| {
            let x = i as f32;
            record(&format!("c{i}"), "o/r", "f.md", vec![(x * 0.7).sin(), (x * 1.3).cos(), x / 25.0])
        })
        .collect();
    let results = ExhaustiveRanker.rank(&[0.2, 0.9, 0.1], &records, None, 25).unwrap();
    assert_eq!(results.len(), 25);
    assert!(results.windows(2).all(|w| w[0].similarity_score >= w[1].similarity_score));
}

#[test]
fn top_k_truncates_to_min_of_k_and_matches() {
    let records: Vec<Record> = (0..10).map(|i| record(&format!("c{i}"), "o/r", "f.md", vec![1.0, i as f32])).collect();
    assert_eq!(ExhaustiveRanker.rank(&[1.0, 1.0], &records, None, 8).unwrap().len(), 8);
    assert_eq!(ExhaustiveRanker.rank(&[1.0, 1.0], &records, None, 50).unwrap().len(), 10);
    assert!(ExhaustiveRanker.rank(&[1.0, 1.0], &records, None, 0).unwrap().is_empty());
}

#[test]
fn ties_keep_insertion_order() {
    let records: Vec<Record> = (0..6).map(|i| record(&format!("c{i}"), "o/r", "f.md", vec![0.5, 0.5])).collect();
    let results = ExhaustiveRanker.rank(&[1.0, 1.0], &records, None, 6).unwrap();
    let order: Vec<&str> = results.iter().map(|r| r.text_chunk.as_str()).collect();
    assert_eq!(order, vec!["c0", "c1", "c2", "c3", "c4", "c5"]);
}

#[test]
fn repository_filter_is_substring_match() {
    let records = vec![
        record("express docs", "expressjs/express", "README.md", vec![1.0, 0.0]),
        record("react docs", "facebook/react", "README.md", vec![1.0, 0.0]),
    ];
    let results = ExhaustiveRanker.rank(&[1.0, 0.0], &records, Some("express"), 5).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source_repository, "expressjs/express");
}

#[test]
fn repository_filter_also_matches_file_path() {
    let records = vec![
        record("a", "o/one", "docs/routing/intro.md", vec![1.0, 0.0]),
        record("b", "o/two", "docs/state.md", vec![1.0, 0.0]),
    ];
    let results = ExhaustiveRanker.rank(&[1.0, 0.0], &records, Some("routing"), 5).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text_chunk, "a");
}

#[test]
fn repository_filter_is_case_sensitive() {
    let records = vec![record("a", "expressjs/express", "x.md", vec![1.0])];
    assert!(ExhaustiveRanker.rank(&[1.0], &records, Some("Express"), 5).unwrap().is_empty());
}

#[test]
fn filter_matching_none_or_all() {
    let records = vec![
        record("a", "org/lib-a", "a.md", vec![1.0, 0.0]),
        record("b", "org/lib-b", "b.md", vec![0.6, 0.8]),
    ];
    assert!(ExhaustiveRanker.rank(&[1.0, 0.0], &records, Some("nothing"), 5).unwrap().is_empty());
    let all = ExhaustiveRanker.rank(&[1.0, 0.0], &records, Some("org/"), 5).unwrap();
    let unfiltered = ExhaustiveRanker.rank(&[1.0, 0.0], &records, None, 5).unwrap();
    assert_eq!(all, unfiltered);
    let empty_filter = ExhaustiveRanker.rank(&[1.0, 0.0], &records, Some(""), 5).unwrap();
    assert_eq!(empty_filter, unfiltered, "an empty filter is no filter");
}

#[test]
fn empty_record_set_ranks_to_nothing() {
    assert!(ExhaustiveRanker.rank(&[1.0, 0.0], &[], None, 5).unwrap().is_empty());
}
