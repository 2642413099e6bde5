//! Tests for the branch concurrency classifier.
mod common;
use common::*;
use nagare::prelude::*;
use rstest::rstest;

#[test]
fn test_unmerged_siblings_are_concurrent() {
    let fan_out = records(&[("0_0", "A"), ("0_1", "B")]);
    assert_eq!(classify_concurrent_branches(&fan_out, &[]), vec!["A", "B"]);
}

#[test]
fn test_merged_siblings_are_excluded() {
    let fan_out = records(&[("0_0", "A"), ("0_1", "B")]);
    let merge = records(&[("0", "M")]);
    assert!(classify_concurrent_branches(&fan_out, &merge).is_empty());
}

#[test]
fn test_same_lineage_is_excluded() {
    let fan_out = records(&[("0_0", "A"), ("0_0_1", "B")]);
    let classifier = BranchClassifier::new();
    assert!(classifier.concurrent_pairs(&fan_out, &[]).is_empty());
    assert!(classifier.classify(&fan_out, &[]).is_empty());
}

#[rstest]
#[case(&[], &[], &[])]
#[case(&[("0_0", "A")], &[], &[])]
#[case(&[("0_0", "A"), ("0_0", "B")], &[], &[])] // Identical labels share a lineage
#[case(&[("0_0_0", "A"), ("0_1_0", "B")], &[], &["A", "B"])] // Cousins
#[case(&[("0_0_0", "A"), ("0_1_0", "B")], &[("0_0", "M")], &["A", "B"])] // Merge on one side only
#[case(&[("1_0_0", "A"), ("1_1_0", "B")], &[("1", "M")], &[])] // Both downstream of merge "1"
#[case(&[("0_0_0", "A"), ("0_0_1", "B")], &[("0_0", "M")], &[])] // Siblings rejoined at their parent
#[case(&[("0_0_0", "A"), ("0_0_1", "B")], &[("0_1", "M")], &["A", "B"])] // Unrelated merge
fn test_classifier_cases(
    #[case] fan_out: &[(&str, &str)],
    #[case] merge: &[(&str, &str)],
    #[case] expected: &[&str],
) {
    let result = classify_concurrent_branches(&records(fan_out), &records(merge));
    assert_eq!(result, expected);
}

#[test]
fn test_result_is_deduplicated_in_first_seen_order() {
    let fan_out = records(&[("0_0", "A"), ("0_1", "B"), ("0_2", "C")]);
    let classifier = BranchClassifier::new();

    let pairs: Vec<_> = classifier
        .concurrent_pairs(&fan_out, &[])
        .into_iter()
        .map(|(a, b)| (a.node_id.as_str(), b.node_id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("A", "B"), ("A", "C"), ("B", "C")]);
    assert_eq!(classifier.classify(&fan_out, &[]), vec!["A", "B", "C"]);
}

#[test]
fn test_merge_order_in_input_does_not_matter() {
    let fan_out = records(&[("0_0_0", "A"), ("0_1_0", "B"), ("1", "C")]);
    let merge = records(&[("0_1_0_1", "Deep"), ("0", "Shallow")]);
    let reversed: Vec<_> = merge.iter().rev().cloned().collect();

    assert_eq!(
        classify_concurrent_branches(&fan_out, &merge),
        classify_concurrent_branches(&fan_out, &reversed)
    );
}

// Multi-digit segments: a literal prefix test treats "0_1" as an ancestor of "0_10",
// so the two are never reported together. Segment matching reports them.

#[test]
fn test_literal_matching_hides_multi_digit_siblings() {
    let fan_out = records(&[("0_1", "A"), ("0_10", "B")]);
    assert!(classify_concurrent_branches(&fan_out, &[]).is_empty());
}

#[test]
fn test_segmented_matching_reports_multi_digit_siblings() {
    let fan_out = records(&[("0_1", "A"), ("0_10", "B")]);
    let classifier = BranchClassifier::builder()
        .with_matching(PathMatching::Segmented)
        .build();
    assert_eq!(classifier.classify(&fan_out, &[]), vec!["A", "B"]);
}

#[test]
fn test_segmented_matching_ignores_merge_that_only_prefixes_characters() {
    let fan_out = records(&[("2_1_0", "A"), ("2_10_0", "B")]);
    let merge = records(&[("2_1", "M")]);
    let literal = classify_concurrent_branches(&fan_out, &merge);
    let segmented = BranchClassifier::builder()
        .with_matching(PathMatching::Segmented)
        .build()
        .classify(&fan_out, &merge);
    assert!(literal.is_empty());
    assert_eq!(segmented, vec!["A", "B"]);
}

#[test]
fn test_records_deserialize_from_editor_json() {
    let json = r#"[{"branch": "0_1", "nodeId": "llm_2"}, {"branch": "0_0", "node_id": "llm_1"}]"#;
    let parsed: Vec<BranchRecord> = serde_json::from_str(json).unwrap();
    assert_eq!(parsed[0], BranchRecord::new("0_1", "llm_2"));
    assert_eq!(parsed[1].node_id, "llm_1");
}
