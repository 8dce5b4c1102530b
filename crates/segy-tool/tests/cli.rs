//! End-to-end command tests over a synthetic file
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic, clippy::float_cmp, clippy::cast_precision_loss)]

use clap::Parser;
use pretty_assertions::assert_eq;
use segy_format::SegyReader;
use segy_format::test_utils::{SyntheticFile, ensemble_offset_file};
use segy_tool::{Cli, ToolError, run};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn line_file() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("line.sgy");
    ensemble_offset_file(4).write_to(&path).unwrap();
    (dir, path)
}

fn run_args(args: &[&str]) -> Result<String, ToolError> {
    let cli = Cli::try_parse_from(std::iter::once("segy-tool").chain(args.iter().copied()))
        .unwrap();
    let mut out = Vec::new();
    run(&cli, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn info_reports_geometry() {
    let (_dir, path) = line_file();
    let text = run_args(&["info", s(&path)]).unwrap();

    assert!(text.contains("Records:           8"));
    assert!(text.contains("Samples/trace:     4"));
    assert!(text.contains("Record size:       256 bytes"));
    assert!(text.contains("First samples:     [104.0, 105.0, 106.0, 107.0]"));
}

#[test]
fn info_json_includes_amplitude_range() {
    let (_dir, path) = line_file();
    let text = run_args(&["info", s(&path), "--json", "--samples", "2"]).unwrap();
    let report: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(report["record_count"], 8);
    assert_eq!(report["record_size"], 256);
    assert_eq!(report["first_samples"], serde_json::json!([104.0, 105.0]));
    assert_eq!(report["amplitude_min"], 100.0);
    assert_eq!(report["amplitude_max"], 205.0);
}

#[test]
fn header_prints_requested_fields() {
    let (_dir, path) = line_file();

    let text = run_args(&["header", s(&path), "1", "-f", "CDP", "-f", "offset"]).unwrap();
    assert_eq!(text, "CDP = 2\noffset = 1\n");

    let all = run_args(&["header", s(&path), "7"]).unwrap();
    assert!(all.lines().any(|line| line == "CDP = 1"));
    assert!(all.lines().any(|line| line == "offset = 1"));

    assert!(matches!(
        run_args(&["header", s(&path), "8"]),
        Err(ToolError::Format(_))
    ));
}

#[test]
fn index_build_query_and_unique() {
    let (dir, path) = line_file();
    let db = dir.path().join("line.db");
    let keys = "CDP,offset,sequence_number";

    let built = run_args(&[
        "index", "build", s(&path), "--db", s(&db), "--keys", keys, "--sort", "offset",
        "--threads", "2",
    ])
    .unwrap();
    assert!(built.starts_with("Indexed 8 records into 8 groups"));

    let gather = run_args(&["index", "query", "--db", s(&db), "--keys", keys, "-w", "CDP=2"]).unwrap();
    assert_eq!(gather, "4\n1\n6\n");

    let single = run_args(&[
        "index", "query", "--db", s(&db), "--keys", keys, "-w", "CDP=1", "-w",
        "sequence_number=2",
    ])
    .unwrap();
    assert_eq!(single, "2\n");

    let values = run_args(&["index", "unique", "--db", s(&db), "--keys", keys, "offset"]).unwrap();
    assert_eq!(values, "0\n1\n2\n3\n4\n");

    let pairs =
        run_args(&["index", "unique", "--db", s(&db), "--keys", keys, "CDP", "offset"]).unwrap();
    assert_eq!(pairs.lines().count(), 8);
    assert_eq!(pairs.lines().next(), Some("1\t0"));
}

#[test]
fn query_rejects_unknown_binding() {
    let (dir, path) = line_file();
    let db = dir.path().join("line.db");
    run_args(&["index", "build", s(&path), "--db", s(&db), "--keys", "CDP"]).unwrap();

    let result = run_args(&["index", "query", "--db", s(&db), "--keys", "CDP", "-w", "offset=1"]);
    assert!(matches!(result, Err(ToolError::InvalidArgument(_))));
}

#[test]
fn export_writes_sorted_gather() {
    let (dir, path) = line_file();
    let out_path = dir.path().join("cdp2.sgy");

    let text = run_args(&["export", s(&path), s(&out_path), "-w", "CDP=2", "--sort", "offset"])
        .unwrap();
    assert!(text.starts_with("Wrote 3 records"));

    let exported = SegyReader::open(&out_path).unwrap();
    assert_eq!(exported.record_count(), 3);
    assert_eq!(exported.preamble().record_count_field(), 3);
    let offsets: Vec<i32> = (0..3)
        .map(|i| exported.header_value(i, "offset").unwrap())
        .collect();
    assert_eq!(offsets, vec![0, 1, 2]);
    assert_eq!(exported.get_record(2).unwrap()[0], 202.0);
}

#[test]
fn export_reuses_persistent_map() {
    let (dir, path) = line_file();
    let db = dir.path().join("export.db");
    let first = dir.path().join("first.sgy");
    let second = dir.path().join("second.sgy");

    run_args(&["export", s(&path), s(&first), "-w", "CDP=1", "--db", s(&db)]).unwrap();
    let text =
        run_args(&["export", s(&path), s(&second), "-w", "CDP=1", "--db", s(&db)]).unwrap();
    assert!(text.starts_with("Wrote 5 records"));

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert_eq!(a, b);
}

#[test]
fn export_refuses_index_of_another_file() {
    let (dir, path) = line_file();
    let db = dir.path().join("shared.db");
    let other = dir.path().join("other.sgy");
    (0..8)
        .fold(SyntheticFile::new(4), |file, offset| {
            file.marker_trace(&[("CDP", 1), ("offset", offset)], offset as f32)
        })
        .write_to(&other)
        .unwrap();
    let out_path = dir.path().join("out.sgy");

    run_args(&["export", s(&path), s(&out_path), "-w", "CDP=1", "--db", s(&db)]).unwrap();

    let stale = run_args(&["export", s(&other), s(&out_path), "-w", "CDP=1", "--db", s(&db)]);
    assert!(matches!(stale, Err(ToolError::InvalidArgument(_))));

    let text = run_args(&[
        "export", s(&other), s(&out_path), "-w", "CDP=1", "--db", s(&db), "--rebuild",
    ])
    .unwrap();
    assert!(text.starts_with("Wrote 8 records"));
    let exported = SegyReader::open(&out_path).unwrap();
    let cdps: Vec<i32> = (0..8)
        .map(|i| exported.header_value(i, "CDP").unwrap())
        .collect();
    assert_eq!(cdps, vec![1; 8]);
}

#[test]
fn export_reuses_index_built_with_more_keys() {
    let (dir, path) = line_file();
    let db = dir.path().join("line.db");
    let out_path = dir.path().join("cdp1.sgy");

    run_args(&[
        "index", "build", s(&path), "--db", s(&db), "--keys", "CDP,offset", "--sort", "offset",
    ])
    .unwrap();

    let text = run_args(&[
        "export", s(&path), s(&out_path), "--keys", "CDP,offset", "-w", "CDP=1", "--db", s(&db),
    ])
    .unwrap();
    assert!(text.starts_with("Wrote 5 records"));

    let exported = SegyReader::open(&out_path).unwrap();
    let offsets: Vec<i32> = (0..5)
        .map(|i| exported.header_value(i, "offset").unwrap())
        .collect();
    assert_eq!(offsets, vec![0, 1, 2, 3, 4]);

    // A different sort order needs an explicit rebuild
    let resorted = run_args(&[
        "export", s(&path), s(&out_path), "--keys", "CDP,offset", "-w", "CDP=1", "--db", s(&db),
        "--sort", "CDP",
    ]);
    assert!(matches!(resorted, Err(ToolError::InvalidArgument(_))));
}
