//! Trace map build and query tests over synthetic files
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic, clippy::float_cmp)]

use pretty_assertions::assert_eq;
use segy_format::SegyReader;
use segy_format::test_utils::{SyntheticFile, ensemble_offset_file};
use segy_tracemap::{BuildPhase, TraceMap, TraceMapConfig, TraceMapError};
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    reader: SegyReader,
}

impl Fixture {
    fn ensembles() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("line.sgy");
        ensemble_offset_file(8).write_to(&path).unwrap();
        let reader = SegyReader::open(&path).unwrap();
        Self { dir, reader }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("line.db")
    }
}

#[test]
fn ensemble_query_returns_sorted_gather() {
    let fx = Fixture::ensembles();
    let mut map = TraceMap::open(fx.db(), &["CDP", "offset"]).unwrap();
    map.build(&fx.reader, Some("offset")).unwrap();

    let records = map.query(&[Some(1), None]).unwrap();
    assert_eq!(records.len(), 5);
    let offsets: Vec<i32> = records
        .iter()
        .map(|&r| fx.reader.header_value(r, "offset").unwrap())
        .collect();
    assert_eq!(offsets, vec![0, 1, 2, 3, 4]);

    assert_eq!(map.query(&[Some(2)]).unwrap(), vec![4, 1, 6]);
    assert_eq!(map.query(&[Some(1), Some(3)]).unwrap(), vec![5]);
    assert_eq!(map.query(&[None, Some(0)]).unwrap(), vec![3, 4]);
    assert_eq!(map.group_count().unwrap(), 8);
}

#[test]
fn unbound_and_unmatched_queries_are_empty() {
    let fx = Fixture::ensembles();
    let mut map = TraceMap::open(fx.db(), &["CDP", "offset"]).unwrap();
    map.build(&fx.reader, None).unwrap();

    assert!(map.query(&[]).unwrap().is_empty());
    assert!(map.query(&[None, None]).unwrap().is_empty());
    assert!(map.query(&[Some(3)]).unwrap().is_empty());
    assert!(map.query(&[Some(1), Some(99)]).unwrap().is_empty());
    assert!(matches!(
        map.query(&[Some(1), None, Some(0)]),
        Err(TraceMapError::KeyArity { expected: 2, actual: 3 })
    ));
}

#[test]
fn ordinal_key_selects_by_position() {
    let fx = Fixture::ensembles();
    let mut map = TraceMap::open(fx.db(), &["CDP", "sequence_number"]).unwrap();
    assert!(map.has_ordinal());
    assert_eq!(map.keys(), &["CDP".to_string()]);
    map.build(&fx.reader, Some("offset")).unwrap();

    assert_eq!(map.query(&[Some(1)]).unwrap(), vec![3, 7, 2, 5, 0]);
    assert_eq!(map.query(&[Some(1), Some(0)]).unwrap(), vec![3]);
    assert_eq!(map.query(&[Some(1), Some(4)]).unwrap(), vec![0]);
    assert!(map.query(&[Some(1), Some(5)]).unwrap().is_empty());
    assert!(map.query(&[Some(1), Some(-1)]).unwrap().is_empty());
    // Ordinal alone binds no stored key
    assert!(map.query(&[None, Some(0)]).unwrap().is_empty());
}

#[test]
fn unique_values_and_pairs() {
    let fx = Fixture::ensembles();
    let mut map = TraceMap::open(fx.db(), &["CDP", "offset"]).unwrap();
    map.build(&fx.reader, None).unwrap();

    assert_eq!(map.unique_values("CDP").unwrap(), vec![1, 2]);
    assert_eq!(map.unique_values("offset").unwrap(), vec![0, 1, 2, 3, 4]);
    assert_eq!(
        map.unique_pairs("offset", "CDP").unwrap(),
        vec![(0, 1), (0, 2), (1, 1), (1, 2), (2, 1), (2, 2), (3, 1), (4, 1)]
    );

    assert!(matches!(
        map.unique_values("FieldRecord"),
        Err(TraceMapError::UnknownKey(key)) if key == "FieldRecord"
    ));
    assert!(matches!(
        map.unique_pairs("CDP", "sequence_number"),
        Err(TraceMapError::UnknownKey(_))
    ));
}

#[test]
fn default_sort_key_is_first_key() {
    let fx = Fixture::ensembles();
    let mut map = TraceMap::open(fx.db(), &["CDP"]).unwrap();
    map.build(&fx.reader, None).unwrap();

    // All CDP values in a group are equal, so record numbers decide
    assert_eq!(map.query(&[Some(1)]).unwrap(), vec![0, 2, 3, 5, 7]);
}

#[test]
fn unknown_sort_key_is_rejected_before_writing() {
    let fx = Fixture::ensembles();
    let mut map = TraceMap::open(fx.db(), &["CDP"]).unwrap();
    map.build(&fx.reader, None).unwrap();

    assert!(matches!(
        map.build(&fx.reader, Some("NoSuchField")),
        Err(TraceMapError::UnknownKey(_))
    ));
    assert_eq!(map.query(&[Some(2)]).unwrap(), vec![1, 4, 6]);
}

#[test]
fn rebuild_replaces_previous_index() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("index.db");

    let first = dir.path().join("first.sgy");
    ensemble_offset_file(4).write_to(&first).unwrap();
    let second = dir.path().join("second.sgy");
    SyntheticFile::new(4)
        .marker_trace(&[("CDP", 7), ("offset", 0)], 0.0)
        .marker_trace(&[("CDP", 7), ("offset", 1)], 1.0)
        .write_to(&second)
        .unwrap();

    let mut map = TraceMap::open(&db, &["CDP", "offset"]).unwrap();
    map.build(&SegyReader::open(&first).unwrap(), None).unwrap();
    assert_eq!(map.unique_values("CDP").unwrap(), vec![1, 2]);

    map.build(&SegyReader::open(&second).unwrap(), None).unwrap();
    assert_eq!(map.unique_values("CDP").unwrap(), vec![7]);
    assert!(map.query(&[Some(1)]).unwrap().is_empty());
    assert_eq!(map.query(&[Some(7)]).unwrap(), vec![0, 1]);
}

#[test]
fn index_persists_across_reopen() {
    let fx = Fixture::ensembles();
    {
        let mut map = TraceMap::open(fx.db(), &["CDP", "offset"]).unwrap();
        map.build(&fx.reader, Some("offset")).unwrap();
    }

    let map = TraceMap::open(fx.db(), &["CDP", "offset"]).unwrap();
    assert_eq!(map.group_count().unwrap(), 8);
    assert_eq!(map.query(&[Some(2)]).unwrap(), vec![4, 1, 6]);

    // Reopening with other keys against the same table is refused
    assert!(matches!(
        TraceMap::open(fx.db(), &["FieldRecord"]),
        Err(TraceMapError::InvalidConfig(_))
    ));
}

#[test]
fn chunking_and_threads_do_not_change_order() {
    let fx = Fixture::ensembles();
    let record_size = fx.reader.record_size();

    let mut reference = TraceMap::open(fx.db(), &["CDP", "offset"]).unwrap();
    reference.build(&fx.reader, Some("offset")).unwrap();

    let config = TraceMapConfig::default()
        .with_table("chunked")
        .with_chunk_bytes(3 * record_size)
        .with_threads(3);
    let mut chunked = TraceMap::open_with_config(fx.db(), &["CDP", "offset"], config).unwrap();

    let mut phases = Vec::new();
    chunked
        .build_with_progress(&fx.reader, Some("offset"), |p| phases.push((p.phase, p.done)))
        .unwrap();

    // 8 records in chunks of 3, then one write batch of 8 groups
    assert_eq!(
        phases,
        vec![
            (BuildPhase::Scanning, 3),
            (BuildPhase::Scanning, 6),
            (BuildPhase::Scanning, 8),
            (BuildPhase::Writing, 8),
        ]
    );

    for cdp in [1, 2] {
        assert_eq!(
            chunked.query(&[Some(cdp)]).unwrap(),
            reference.query(&[Some(cdp)]).unwrap()
        );
    }
}

#[test]
fn gather_reads_traces_in_map_order() {
    let fx = Fixture::ensembles();
    let mut map = TraceMap::open(fx.db(), &["CDP", "offset"]).unwrap();
    map.build(&fx.reader, Some("offset")).unwrap();

    let gather = map.gather(&fx.reader, &[Some(2)]).unwrap();
    assert_eq!(gather.len(), 3);
    assert_eq!(gather.records(), vec![4, 1, 6]);
    assert_eq!(gather.field_values("offset").unwrap(), vec![0, 1, 2]);
    assert_eq!(gather.traces()[2].samples[0], 202.0);

    assert!(map.gather(&fx.reader, &[Some(5)]).unwrap().is_empty());
}

#[test]
fn invalid_configuration_is_rejected() {
    let fx = Fixture::ensembles();
    let empty: [&str; 0] = [];
    assert!(matches!(
        TraceMap::open(fx.db(), &empty),
        Err(TraceMapError::InvalidConfig(_))
    ));
    assert!(matches!(
        TraceMap::open(fx.db(), &["NotAField"]),
        Err(TraceMapError::UnknownKey(_))
    ));
    assert!(matches!(
        TraceMap::open_with_config(
            fx.db(),
            &["CDP"],
            TraceMapConfig::default().with_chunk_bytes(0)
        ),
        Err(TraceMapError::InvalidConfig(_))
    ));
}

#[test]
fn failed_rebuild_keeps_previous_index() {
    let fx = Fixture::ensembles();
    let config = TraceMapConfig::default().with_busy_timeout_ms(0);
    let mut map = TraceMap::open_with_config(fx.db(), &["CDP", "offset"], config).unwrap();
    map.build(&fx.reader, None).unwrap();
    let before = map.query(&[Some(1)]).unwrap();

    // Another connection holds the write lock for the whole rebuild
    let other = rusqlite::Connection::open(fx.db()).unwrap();
    other.execute_batch("BEGIN IMMEDIATE").unwrap();
    assert!(matches!(
        map.build(&fx.reader, Some("offset")),
        Err(TraceMapError::Store(_))
    ));
    other.execute_batch("ROLLBACK").unwrap();

    assert_eq!(map.group_count().unwrap(), 8);
    assert_eq!(map.query(&[Some(1)]).unwrap(), before);
    assert_eq!(map.source().unwrap().unwrap().sort_key, "CDP");
}

#[test]
fn empty_file_reports_both_phases() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.sgy");
    SyntheticFile::new(4).write_to(&path).unwrap();
    let reader = SegyReader::open(&path).unwrap();

    let mut map = TraceMap::open(dir.path().join("empty.db"), &["CDP"]).unwrap();
    let mut updates = Vec::new();
    map.build_with_progress(&reader, None, |p| updates.push((p.phase, p.done, p.total)))
        .unwrap();

    assert_eq!(
        updates,
        vec![(BuildPhase::Scanning, 0, 0), (BuildPhase::Writing, 0, 0)]
    );
    assert_eq!(map.group_count().unwrap(), 0);
    assert!(map.is_built_from(&reader, None).unwrap());
}

#[test]
fn build_records_its_source() {
    let fx = Fixture::ensembles();
    let mut map = TraceMap::open(fx.db(), &["CDP"]).unwrap();
    assert_eq!(map.source().unwrap(), None);
    assert!(!map.is_built_from(&fx.reader, None).unwrap());

    map.build(&fx.reader, Some("offset")).unwrap();
    let source = map.source().unwrap().unwrap();
    assert_eq!(source.record_count, 8);
    assert_eq!(source.file_size, fx.reader.file_size());
    assert_eq!(source.sort_key, "offset");

    assert!(map.is_built_from(&fx.reader, None).unwrap());
    assert!(map.is_built_from(&fx.reader, Some("offset")).unwrap());
    assert!(!map.is_built_from(&fx.reader, Some("CDP")).unwrap());

    let other_path = fx.dir.path().join("other.sgy");
    ensemble_offset_file(8).write_to(&other_path).unwrap();
    let other = SegyReader::open(&other_path).unwrap();
    assert!(!map.is_built_from(&other, None).unwrap());
}
