//! Parallel header scan
//!
//! Records are visited in fixed-size chunks of the memory-mapped file. Each
//! chunk is split across the worker pool; every worker folds into its own
//! key map and the partial maps are reduced pairwise. After the last chunk
//! every group is sorted by `(sort value, record number)`, so the result is
//! independent of chunk size and thread count.

use crate::error::{Result, TraceMapError};
use crate::progress::{BuildPhase, BuildProgress};
use rayon::prelude::*;
use segy_format::fields::read_field;
use segy_format::{FieldInfo, SegyReader};
use std::collections::HashMap;
use tracing::debug;

/// Key tuple to `(sort value, record number)` pairs
type PartialGroups = HashMap<Vec<i32>, Vec<(i32, u32)>>;

/// One index entry: key values and ordered record numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Values of the stored keys
    pub key: Vec<i32>,
    /// Record numbers in gather order
    pub records: Vec<u32>,
}

/// What to extract from every record header
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScanPlan<'a> {
    pub keys: &'a [FieldInfo],
    pub sort: FieldInfo,
    pub chunk_bytes: usize,
}

/// Scan every record of `reader` and group record numbers by key.
///
/// Groups are returned in ascending key order.
pub(crate) fn scan_groups(
    reader: &SegyReader,
    plan: ScanPlan<'_>,
    pool: &rayon::ThreadPool,
    progress: &mut dyn FnMut(BuildProgress),
) -> Result<Vec<Group>> {
    let total = reader.record_count();
    if i32::try_from(total).is_err() {
        return Err(TraceMapError::TooManyRecords(total));
    }

    let record_size = reader.record_size();
    let per_chunk = (plan.chunk_bytes / record_size).max(1);
    debug!(
        "Scanning {} records in chunks of {} on {} threads",
        total,
        per_chunk,
        pool.current_num_threads()
    );

    let mut groups = PartialGroups::new();
    if total == 0 {
        progress(BuildProgress {
            phase: BuildPhase::Scanning,
            done: 0,
            total: 0,
        });
    }
    let mut start = 0;
    while start < total {
        let count = per_chunk.min(total - start);
        let block = reader.read_raw(start, count * record_size)?;
        let partial = pool.install(|| scan_block(block, record_size, start, plan))?;
        merge(&mut groups, partial);

        start += count;
        progress(BuildProgress {
            phase: BuildPhase::Scanning,
            done: start,
            total,
        });
    }

    let mut sorted: Vec<Group> = groups
        .into_iter()
        .map(|(key, mut entries)| {
            entries.sort_unstable();
            Group {
                key,
                records: entries.into_iter().map(|(_, record)| record).collect(),
            }
        })
        .collect();
    sorted.sort_unstable_by(|a, b| a.key.cmp(&b.key));
    Ok(sorted)
}

fn scan_block(
    block: &[u8],
    record_size: usize,
    first_record: usize,
    plan: ScanPlan<'_>,
) -> Result<PartialGroups> {
    block
        .par_chunks_exact(record_size)
        .enumerate()
        .try_fold(PartialGroups::new, |mut acc, (i, record)| {
            let key = plan
                .keys
                .iter()
                .map(|field| read_field(record, field))
                .collect::<segy_format::Result<Vec<i32>>>()?;
            let sort_value = read_field(record, &plan.sort)?;
            acc.entry(key)
                .or_default()
                .push((sort_value, (first_record + i) as u32));
            Ok::<_, TraceMapError>(acc)
        })
        .try_reduce(PartialGroups::new, |mut a, b| {
            merge(&mut a, b);
            Ok(a)
        })
}

fn merge(into: &mut PartialGroups, from: PartialGroups) {
    for (key, mut entries) in from {
        into.entry(key).or_default().append(&mut entries);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use segy_format::fields::trace_field;
    use segy_format::test_utils::ensemble_offset_file;

    fn run(chunk_bytes: usize, threads: usize) -> (Vec<Group>, Vec<BuildProgress>) {
        let (_dir, path) = ensemble_offset_file(8).write_temp().unwrap();
        let reader = SegyReader::open(&path).unwrap();
        let keys = [trace_field("CDP").unwrap()];
        let plan = ScanPlan {
            keys: &keys,
            sort: trace_field("offset").unwrap(),
            chunk_bytes,
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        let mut updates = Vec::new();
        let groups = scan_groups(&reader, plan, &pool, &mut |p: BuildProgress| updates.push(p)).unwrap();
        (groups, updates)
    }

    #[test]
    fn test_groups_sorted_by_sort_field() {
        let (groups, updates) = run(1 << 20, 2);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, vec![1]);
        // Offsets 0..4 live at records 3, 7, 2, 5, 0
        assert_eq!(groups[0].records, vec![3, 7, 2, 5, 0]);
        assert_eq!(groups[1].key, vec![2]);
        assert_eq!(groups[1].records, vec![4, 1, 6]);

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].done, 8);
    }

    #[test]
    fn test_chunking_does_not_change_result() {
        let (reference, _) = run(1 << 20, 1);
        // One record per chunk
        let (chunked, updates) = run(1, 4);
        assert_eq!(chunked, reference);
        assert_eq!(updates.len(), 8);
        assert!(updates.iter().all(|p| p.phase == BuildPhase::Scanning));
    }
}
