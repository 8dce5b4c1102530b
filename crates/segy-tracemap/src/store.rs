//! SQLite persistence for trace map groups
//!
//! One table per map: an `INTEGER NOT NULL` column per key, a `records` blob
//! of little-endian `i32` record numbers, and a primary key over the key
//! columns. A rebuild drops and recreates the table inside one transaction,
//! together with its row in the shared source table.

use crate::config::SOURCE_TABLE;
use crate::error::{Result, TraceMapError};
use crate::progress::{BuildPhase, BuildProgress};
use crate::scan::Group;
use crate::source::IndexSource;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Groups written between two progress updates
const WRITE_BATCH: usize = 1000;

/// Name of the blob column
const RECORDS_COLUMN: &str = "records";

pub(crate) struct IndexStore {
    conn: Connection,
    table: String,
    columns: Vec<String>,
}

impl IndexStore {
    /// Open (or create) the database and make sure the table exists with the
    /// expected columns
    pub(crate) fn open(
        path: &Path,
        table: &str,
        columns: &[String],
        busy_timeout: Duration,
    ) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    table_name TEXT PRIMARY KEY,
                    path TEXT NOT NULL,
                    file_size INTEGER NOT NULL,
                    record_count INTEGER NOT NULL,
                    sort_key TEXT NOT NULL
                )",
                quote(SOURCE_TABLE)
            ),
            (),
        )?;

        let store = Self {
            conn,
            table: table.to_string(),
            columns: columns.to_vec(),
        };
        store.conn.execute(&store.create_sql(), ())?;
        store.check_columns()?;

        debug!("Opened index table {} in {}", table, path.display());
        Ok(store)
    }

    /// Replace the table contents with `groups` and record their source,
    /// atomically
    pub(crate) fn replace_all(
        &mut self,
        groups: &[Group],
        source: &IndexSource,
        progress: &mut dyn FnMut(BuildProgress),
    ) -> Result<()> {
        let drop_sql = format!("DROP TABLE IF EXISTS {}", quote(&self.table));
        let create_sql = self.create_sql();
        let insert_sql = self.insert_sql();
        let total = groups.len();

        let tx = self.conn.transaction()?;
        tx.execute(&drop_sql, ())?;
        tx.execute(&create_sql, ())?;
        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for (n, group) in groups.iter().enumerate() {
                let mut values: Vec<Value> = group
                    .key
                    .iter()
                    .map(|&v| Value::Integer(i64::from(v)))
                    .collect();
                values.push(Value::Blob(encode_records(&group.records)));
                stmt.execute(params_from_iter(values))?;

                let done = n + 1;
                if done % WRITE_BATCH == 0 || done == total {
                    progress(BuildProgress {
                        phase: BuildPhase::Writing,
                        done,
                        total,
                    });
                }
            }
        }
        tx.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (table_name, path, file_size, record_count, sort_key)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                quote(SOURCE_TABLE)
            ),
            params![
                self.table,
                source.path,
                source.file_size as i64,
                source.record_count as i64,
                source.sort_key
            ],
        )?;
        tx.commit()?;

        if total == 0 {
            progress(BuildProgress {
                phase: BuildPhase::Writing,
                done: 0,
                total: 0,
            });
        }
        Ok(())
    }

    /// Source recorded by the last successful build, if any
    pub(crate) fn source(&self) -> Result<Option<IndexSource>> {
        let sql = format!(
            "SELECT path, file_size, record_count, sort_key FROM {} WHERE table_name = ?1",
            quote(SOURCE_TABLE)
        );
        let row = self
            .conn
            .query_row(&sql, [&self.table], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .optional()?;

        row.map(|(path, file_size, record_count, sort_key)| {
            Ok(IndexSource {
                path,
                file_size: u64::try_from(file_size).map_err(|_| {
                    TraceMapError::CorruptIndex(format!("negative file size {file_size}"))
                })?,
                record_count: usize::try_from(record_count).map_err(|_| {
                    TraceMapError::CorruptIndex(format!("negative record count {record_count}"))
                })?,
                sort_key,
            })
        })
        .transpose()
    }

    /// Record lists of every group matching all bindings, in key order
    pub(crate) fn select(&self, bound: &[(&str, i32)]) -> Result<Vec<Vec<u32>>> {
        let filter = bound
            .iter()
            .map(|(name, _)| format!("{} = ?", quote(name)))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {}",
            RECORDS_COLUMN,
            quote(&self.table),
            filter,
            self.column_list()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bound.iter().map(|(_, v)| v)), |row| {
            row.get::<_, Vec<u8>>(0)
        })?;

        let mut lists = Vec::new();
        for blob in rows {
            lists.push(decode_records(&blob?)?);
        }
        Ok(lists)
    }

    /// Sorted distinct value tuples of the given columns
    pub(crate) fn distinct(&self, columns: &[&str]) -> Result<Vec<Vec<i32>>> {
        let list = columns
            .iter()
            .map(|c| quote(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT DISTINCT {list} FROM {} ORDER BY {list}",
            quote(&self.table)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map((), |row| {
            (0..columns.len())
                .map(|i| row.get::<_, i32>(i))
                .collect::<rusqlite::Result<Vec<i32>>>()
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Number of stored groups
    pub(crate) fn count(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote(&self.table));
        let count = self.conn.query_row(&sql, (), |row| row.get::<_, i64>(0))?;
        usize::try_from(count)
            .map_err(|_| TraceMapError::CorruptIndex(format!("invalid group count {count}")))
    }

    fn check_columns(&self) -> Result<()> {
        let sql = format!("PRAGMA table_info({})", quote(&self.table));
        let mut stmt = self.conn.prepare(&sql)?;
        let existing = stmt
            .query_map((), |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        let expected: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(RECORDS_COLUMN))
            .collect();
        if existing != expected {
            return Err(TraceMapError::InvalidConfig(format!(
                "table {} has columns [{}], expected [{}]",
                self.table,
                existing.join(", "),
                expected.join(", ")
            )));
        }
        Ok(())
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| quote(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("{} INTEGER NOT NULL", quote(c)))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({}, {} BLOB NOT NULL, PRIMARY KEY ({}))",
            quote(&self.table),
            columns,
            RECORDS_COLUMN,
            self.column_list()
        )
    }

    fn insert_sql(&self) -> String {
        let placeholders = vec!["?"; self.columns.len() + 1].join(", ");
        format!(
            "INSERT INTO {} ({}, {}) VALUES ({})",
            quote(&self.table),
            self.column_list(),
            RECORDS_COLUMN,
            placeholders
        )
    }
}

/// Quote an SQL identifier
fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub(crate) fn encode_records(records: &[u32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(records.len() * 4);
    for &record in records {
        blob.extend_from_slice(&(record as i32).to_le_bytes());
    }
    blob
}

pub(crate) fn decode_records(blob: &[u8]) -> Result<Vec<u32>> {
    if blob.len() % 4 != 0 {
        return Err(TraceMapError::CorruptIndex(format!(
            "record blob of {} bytes is not a multiple of 4",
            blob.len()
        )));
    }
    blob.chunks_exact(4)
        .map(|chunk| {
            let value = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            u32::try_from(value).map_err(|_| {
                TraceMapError::CorruptIndex(format!("negative record number {value}"))
            })
        })
        .collect()
}
