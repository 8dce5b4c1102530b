//! Trace map: build and query a persistent multi-key index

use crate::config::TraceMapConfig;
use crate::error::{Result, TraceMapError};
use crate::gather::Gather;
use crate::keys::KeySpec;
use crate::progress::BuildProgress;
use crate::scan::{ScanPlan, scan_groups};
use crate::source::IndexSource;
use crate::store::IndexStore;
use segy_format::SegyReader;
use segy_format::fields::trace_field;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Index from key tuples to ordered record numbers, stored in SQLite
///
/// ```no_run
/// use segy_format::SegyReader;
/// use segy_tracemap::TraceMap;
///
/// let reader = SegyReader::open("line.sgy")?;
/// let mut map = TraceMap::open("line.db", &["CDP", "offset"])?;
/// map.build(&reader, Some("offset"))?;
/// let records = map.query(&[Some(1200), None])?;
/// # Ok::<(), segy_tracemap::TraceMapError>(())
/// ```
pub struct TraceMap {
    store: IndexStore,
    keys: KeySpec,
    config: TraceMapConfig,
    db_path: PathBuf,
}

impl TraceMap {
    /// Open a trace map with the default configuration
    pub fn open<S: AsRef<str>>(db_path: impl AsRef<Path>, keys: &[S]) -> Result<Self> {
        Self::open_with_config(db_path, keys, TraceMapConfig::default())
    }

    /// Open a trace map.
    ///
    /// The database and table are created when missing; an existing index is
    /// queryable immediately.
    pub fn open_with_config<S: AsRef<str>>(
        db_path: impl AsRef<Path>,
        keys: &[S],
        config: TraceMapConfig,
    ) -> Result<Self> {
        config.validate()?;
        let keys = KeySpec::new(keys)?;
        let db_path = db_path.as_ref().to_path_buf();
        let store = IndexStore::open(
            &db_path,
            &config.table,
            keys.names(),
            Duration::from_millis(config.busy_timeout_ms),
        )?;

        Ok(Self {
            store,
            keys,
            config,
            db_path,
        })
    }

    /// Stored key names, in column order (the ordinal key is not included)
    pub fn keys(&self) -> &[String] {
        self.keys.names()
    }

    /// Whether queries accept a trailing `sequence_number` value
    pub fn has_ordinal(&self) -> bool {
        self.keys.has_ordinal()
    }

    /// Database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Active configuration
    pub fn config(&self) -> &TraceMapConfig {
        &self.config
    }

    /// Rebuild the index from every record of `reader`.
    ///
    /// Records of a group are ordered by the `sort_key` header field
    /// (default: the first key), ties by record number.
    pub fn build(&mut self, reader: &SegyReader, sort_key: Option<&str>) -> Result<()> {
        self.build_with_progress(reader, sort_key, |_| {})
    }

    /// Rebuild the index, reporting progress per scanned chunk and per batch
    /// of written groups.
    ///
    /// The previous index stays intact if any step fails.
    pub fn build_with_progress<F>(
        &mut self,
        reader: &SegyReader,
        sort_key: Option<&str>,
        mut progress: F,
    ) -> Result<()>
    where
        F: FnMut(BuildProgress),
    {
        let sort_name = sort_key.unwrap_or(self.keys.names()[0].as_str());
        let sort =
            trace_field(sort_name).map_err(|_| TraceMapError::UnknownKey(sort_name.to_string()))?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()?;

        info!(
            "Building trace map for {} ({} records) keyed by [{}], sorted by {}",
            reader.path().display(),
            reader.record_count(),
            self.keys.names().join(", "),
            sort_name
        );
        let started = Instant::now();

        let plan = ScanPlan {
            keys: self.keys.fields(),
            sort,
            chunk_bytes: self.config.chunk_bytes,
        };
        let groups = scan_groups(reader, plan, &pool, &mut progress)?;
        debug!("Scan finished with {} groups", groups.len());

        let source = IndexSource::of(reader, sort_name);
        self.store.replace_all(&groups, &source, &mut progress)?;

        info!(
            "Trace map built: {} groups in {:.2?}",
            groups.len(),
            started.elapsed()
        );
        Ok(())
    }

    /// Record numbers matching the given key values.
    ///
    /// `values` holds one optional value per key, in key order, plus one for
    /// `sequence_number` when configured. Missing trailing values are
    /// unbound. Matching groups are concatenated in key order; a bound
    /// ordinal selects one record of that concatenation by position.
    /// Returns an empty list when no stored key is bound.
    pub fn query(&self, values: &[Option<i32>]) -> Result<Vec<usize>> {
        let (bound, ordinal) = self.keys.bind(values)?;
        if bound.is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<usize> = self
            .store
            .select(&bound)?
            .into_iter()
            .flatten()
            .map(|record| record as usize)
            .collect();

        Ok(match ordinal {
            Some(position) => usize::try_from(position)
                .ok()
                .and_then(|p| records.get(p).copied())
                .into_iter()
                .collect(),
            None => records,
        })
    }

    /// Read the traces matched by `values`, in query order
    pub fn gather(&self, reader: &SegyReader, values: &[Option<i32>]) -> Result<Gather> {
        let records = self.query(values)?;
        Ok(Gather::new(reader.read_traces(&records)?))
    }

    /// Sorted distinct values of one stored key
    pub fn unique_values(&self, key: &str) -> Result<Vec<i32>> {
        self.keys.column(key)?;
        Ok(self
            .store
            .distinct(&[key])?
            .into_iter()
            .filter_map(|row| row.first().copied())
            .collect())
    }

    /// Sorted distinct value pairs of two stored keys
    pub fn unique_pairs(&self, key1: &str, key2: &str) -> Result<Vec<(i32, i32)>> {
        self.keys.column(key1)?;
        self.keys.column(key2)?;
        Ok(self
            .store
            .distinct(&[key1, key2])?
            .into_iter()
            .filter_map(|row| match row.as_slice() {
                &[a, b] => Some((a, b)),
                _ => None,
            })
            .collect())
    }

    /// File and sort key of the last successful build, `None` before the
    /// first build
    pub fn source(&self) -> Result<Option<IndexSource>> {
        self.store.source()
    }

    /// Whether the stored index was built from the file `reader` has open.
    ///
    /// With a `sort_key` the recorded sort key must match as well; with
    /// `None` any sort order is accepted.
    pub fn is_built_from(&self, reader: &SegyReader, sort_key: Option<&str>) -> Result<bool> {
        Ok(self.source()?.is_some_and(|source| {
            source.is_file(reader) && sort_key.is_none_or(|sort| source.sort_key == sort)
        }))
    }

    /// Number of distinct key tuples in the index
    pub fn group_count(&self) -> Result<usize> {
        self.store.count()
    }
}

impl std::fmt::Debug for TraceMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceMap")
            .field("db_path", &self.db_path)
            .field("keys", &self.keys)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
