use linex::analyzer::analyze_file;
use linex::chunking::ChunkPolicy;
use linex::slice::{slice_file, SliceRequest};
use std::fs;

#[test]
fn longest_line_can_be_sliced_back_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.log");
    let long = "L".repeat(40_000);
    fs::write(&path, format!("head\n{long}\ntail line\n")).unwrap();

    let policy = ChunkPolicy::computed();
    let stats = analyze_file(&path, &policy).unwrap();
    assert_eq!(stats.max_line_length, 40_000);
    assert_eq!(stats.max_line_position, 5);

    let mut out = Vec::new();
    let request = SliceRequest {
        start: stats.max_line_position,
        size: stats.max_line_length,
        full_lines_only: false,
    };
    let summary = slice_file(&path, request, &policy, &mut out).unwrap();
    assert_eq!(summary.bytes_written, 40_000);
    assert_eq!(out, long.as_bytes());
}

#[test]
fn full_lines_slice_across_many_small_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lines.txt");
    let content: String = (0..200).map(|i| format!("line number {i}\n")).collect();
    fs::write(&path, &content).unwrap();

    let mut out = Vec::new();
    let request = SliceRequest {
        start: 3,
        size: 100,
        full_lines_only: true,
    };
    let summary = slice_file(&path, request, &ChunkPolicy::with_override(Some("7")), &mut out).unwrap();
    assert_eq!(summary.bytes_read, 100);

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("line number 1\n"));
    assert!(text.ends_with('\n'));
    assert!(content[3..103].contains(text.as_str()));
}

#[test]
fn invalid_override_falls_back_to_computed_size() {
    let policy = ChunkPolicy::with_override(Some("not-a-number"));
    assert_eq!(policy.override_size(), None);
    let policy = ChunkPolicy::with_override(Some("0"));
    assert_eq!(policy.override_size(), None);
    let policy = ChunkPolicy::with_override(Some("4096"));
    assert_eq!(policy.override_size(), Some(4096));
}
