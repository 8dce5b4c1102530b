//! Command implementations
//!
//! Every command writes its report to the supplied output so the binary can
//! pass stdout and tests can pass a buffer.

use crate::cli::{BuildArgs, ExportArgs, HeaderArgs, IndexCommand, InfoArgs, QueryArgs, UniqueArgs};
use crate::error::{Result, ToolError};
use segy_cache::{AmplitudeRange, CacheConfig, TraceCache};
use segy_format::fields::{TRACE_FIELD_TABLE, read_field, read_trace_field};
use segy_format::{SegyReader, SegyWriter};
use segy_tracemap::{BuildPhase, BuildProgress, SEQUENCE_NUMBER, TraceMap, TraceMapConfig};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Database path SQLite treats as a private in-memory database
const IN_MEMORY_DB: &str = ":memory:";

/// File summary printed by `info`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoReport {
    /// File path as given
    pub path: String,
    /// File size in bytes
    pub file_size: u64,
    /// Whole records in the file
    pub record_count: usize,
    /// Samples per record
    pub samples_per_trace: usize,
    /// Sample interval in microseconds
    pub sample_interval_us: f32,
    /// Bytes per record
    pub record_size: usize,
    /// Legacy record-count field of the binary header
    pub record_count_field: i32,
    /// Data sample format code
    pub sample_format: i32,
    /// Non-blank text header cards
    pub text_header: Vec<String>,
    /// Leading samples of the first record
    pub first_samples: Vec<f32>,
    /// Finite amplitude bounds over the first traces
    pub amplitude_min: f32,
    /// Upper amplitude bound
    pub amplitude_max: f32,
}

impl InfoReport {
    /// Collect the summary for an open file
    pub fn collect(reader: &SegyReader, samples: usize, stats_traces: usize) -> Result<Self> {
        let preamble = reader.preamble();
        let config = CacheConfig::default()
            .with_capacity(1)
            .with_stats_traces(stats_traces.max(1));
        let mut cache = TraceCache::with_config(reader, config)?;

        let first_samples = if reader.record_count() > 0 {
            cache.get(0)?.iter().take(samples).copied().collect()
        } else {
            Vec::new()
        };
        let AmplitudeRange { min, max } = cache.amplitude_range()?;

        Ok(Self {
            path: reader.path().display().to_string(),
            file_size: reader.file_size(),
            record_count: reader.record_count(),
            samples_per_trace: reader.samples_per_trace(),
            sample_interval_us: reader.sample_interval(),
            record_size: reader.record_size(),
            record_count_field: preamble.record_count_field(),
            sample_format: preamble.field("DataSampleFormat")?,
            text_header: preamble
                .text_lines()
                .into_iter()
                .filter(|line| !line.is_empty())
                .collect(),
            first_samples,
            amplitude_min: min,
            amplitude_max: max,
        })
    }

    fn write_text<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "File:              {}", self.path)?;
        writeln!(out, "Size:              {} bytes", self.file_size)?;
        writeln!(out, "Records:           {}", self.record_count)?;
        writeln!(out, "Samples/trace:     {}", self.samples_per_trace)?;
        writeln!(out, "Sample interval:   {} us", self.sample_interval_us)?;
        writeln!(out, "Record size:       {} bytes", self.record_size)?;
        writeln!(out, "Record count field:{:>6}", self.record_count_field)?;
        writeln!(out, "Sample format:     {}", self.sample_format)?;
        writeln!(
            out,
            "Amplitude range:   {} .. {}",
            self.amplitude_min, self.amplitude_max
        )?;
        writeln!(out, "First samples:     {:?}", self.first_samples)?;
        if !self.text_header.is_empty() {
            writeln!(out, "Text header:")?;
            for line in &self.text_header {
                writeln!(out, "  {line}")?;
            }
        }
        Ok(())
    }
}

/// `info`
pub fn info<W: Write>(args: &InfoArgs, out: &mut W) -> Result<()> {
    let reader = SegyReader::open(&args.file)?;
    let report = InfoReport::collect(&reader, args.samples, args.stats_traces)?;
    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        report.write_text(out)?;
    }
    Ok(())
}

/// `header`
pub fn header<W: Write>(args: &HeaderArgs, out: &mut W) -> Result<()> {
    let reader = SegyReader::open(&args.file)?;
    let header = reader.get_header(args.trace)?;

    if args.fields.is_empty() {
        for (name, field) in TRACE_FIELD_TABLE {
            let value = read_field(header, field)?;
            if value != 0 {
                writeln!(out, "{name} = {value}")?;
            }
        }
    } else {
        for name in &args.fields {
            writeln!(out, "{name} = {}", read_trace_field(header, name)?)?;
        }
    }
    Ok(())
}

/// `index` subcommands
pub fn index<W: Write>(command: &IndexCommand, out: &mut W) -> Result<()> {
    match command {
        IndexCommand::Build(args) => index_build(args, out),
        IndexCommand::Query(args) => index_query(args, out),
        IndexCommand::Unique(args) => index_unique(args, out),
    }
}

fn index_build<W: Write>(args: &BuildArgs, out: &mut W) -> Result<()> {
    let reader = SegyReader::open(&args.file)?;
    let config = args
        .map
        .config()
        .with_threads(args.threads)
        .with_chunk_bytes(args.chunk_mib.saturating_mul(1024 * 1024));
    let mut map = TraceMap::open_with_config(&args.map.db, args.map.keys.as_slice(), config)?;

    let mut throttle = ProgressThrottle::default();
    map.build_with_progress(&reader, args.sort.as_deref(), |progress| {
        if throttle.should_log(&progress) {
            info!("Index build {}", progress);
        }
    })?;

    writeln!(
        out,
        "Indexed {} records into {} groups ({})",
        reader.record_count(),
        map.group_count()?,
        map.db_path().display()
    )?;
    Ok(())
}

fn index_query<W: Write>(args: &QueryArgs, out: &mut W) -> Result<()> {
    let map = TraceMap::open_with_config(&args.map.db, args.map.keys.as_slice(), args.map.config())?;
    let values = bind_values(&map, &args.bindings)?;
    for record in map.query(&values)? {
        writeln!(out, "{record}")?;
    }
    Ok(())
}

fn index_unique<W: Write>(args: &UniqueArgs, out: &mut W) -> Result<()> {
    let map = TraceMap::open_with_config(&args.map.db, args.map.keys.as_slice(), args.map.config())?;
    match &args.second {
        Some(second) => {
            for (a, b) in map.unique_pairs(&args.key, second)? {
                writeln!(out, "{a}\t{b}")?;
            }
        }
        None => {
            for value in map.unique_values(&args.key)? {
                writeln!(out, "{value}")?;
            }
        }
    }
    Ok(())
}

/// `export`
///
/// A persistent trace map is reused only when it was built from the same
/// file; `--rebuild` replaces it otherwise.
pub fn export<W: Write>(args: &ExportArgs, out: &mut W) -> Result<()> {
    let reader = SegyReader::open(&args.source)?;
    let keys = args.map_keys();
    let db = args
        .db
        .as_deref()
        .unwrap_or_else(|| Path::new(IN_MEMORY_DB));
    let config = TraceMapConfig::default().with_table(args.table.clone());

    let mut map = TraceMap::open_with_config(db, keys.as_slice(), config)?;
    let sort = args.sort.as_deref();
    match map.source()? {
        Some(_) if map.is_built_from(&reader, sort)? && !args.rebuild => {
            debug!("Reusing trace map in {}", db.display());
        }
        Some(source) if !args.rebuild => {
            return Err(ToolError::InvalidArgument(format!(
                "trace map in {} was built from {} ({} records, sorted by {}); \
                 pass --rebuild to replace it",
                db.display(),
                source.path,
                source.record_count,
                source.sort_key
            )));
        }
        _ => map.build(&reader, sort)?,
    }

    let values = bind_values(&map, &args.bindings)?;
    let gather = map.gather(&reader, &values)?;
    let mut writer = SegyWriter::create_like(&args.destination, &reader)?;
    for trace in gather.traces() {
        writer.append_trace(trace)?;
    }
    let written = writer.record_count();
    writer.close()?;

    info!(
        "Exported {} records from {} to {}",
        written,
        args.source.display(),
        args.destination.display()
    );
    writeln!(
        out,
        "Wrote {} records to {}",
        written,
        args.destination.display()
    )?;
    Ok(())
}

/// Passes one progress update per phase and tenth of the work
#[derive(Debug, Default)]
struct ProgressThrottle {
    last: Option<(BuildPhase, u64)>,
}

impl ProgressThrottle {
    fn should_log(&mut self, progress: &BuildProgress) -> bool {
        let step = (progress.phase, (progress.percent() / 10.0) as u64);
        if self.last == Some(step) {
            return false;
        }
        self.last = Some(step);
        true
    }
}

/// Turn `KEY=VALUE` bindings into one query slot per map key
fn bind_values(map: &TraceMap, bindings: &[(String, i32)]) -> Result<Vec<Option<i32>>> {
    let mut slots: Vec<&str> = map.keys().iter().map(String::as_str).collect();
    if map.has_ordinal() {
        slots.push(SEQUENCE_NUMBER);
    }

    let mut values = vec![None; slots.len()];
    for (key, value) in bindings {
        let position = slots
            .iter()
            .position(|slot| slot == key)
            .ok_or_else(|| {
                ToolError::InvalidArgument(format!(
                    "'{key}' is not one of the keys [{}]",
                    slots.join(", ")
                ))
            })?;
        values[position] = Some(*value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(phase: BuildPhase, done: usize, total: usize) -> BuildProgress {
        BuildProgress { phase, done, total }
    }

    #[test]
    fn test_progress_throttle() {
        let mut throttle = ProgressThrottle::default();
        let logged: Vec<usize> = (1..=100)
            .filter(|&done| throttle.should_log(&update(BuildPhase::Scanning, done, 100)))
            .collect();
        assert_eq!(logged, vec![1, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);

        // A new phase always logs, including an empty one
        assert!(throttle.should_log(&update(BuildPhase::Writing, 0, 0)));
        assert!(!throttle.should_log(&update(BuildPhase::Writing, 0, 0)));
    }
}
