//! Command line definition.
//!
//! Index locations can also come from the environment:
//! - `SEGY_TOOL_DB`: trace map database path
//! - `SEGY_TOOL_TABLE`: table name inside the database
//! - `SEGY_TOOL_THREADS`: scan worker threads
//! - `SEGY_TOOL_LOG_FORMAT`: `text` or `json`

use clap::{Args, Parser, Subcommand, ValueEnum};
use segy_tracemap::{SEQUENCE_NUMBER, TraceMapConfig};
use segy_tracemap::config::DEFAULT_TABLE;
use std::path::PathBuf;

/// Inspect, index and export SEG-Y files
#[derive(Debug, Clone, Parser)]
#[command(name = "segy-tool", version, about)]
pub struct Cli {
    /// Log output format (logs go to stderr)
    #[arg(
        long,
        global = true,
        env = "SEGY_TOOL_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// Top-level commands
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Summarize a file: geometry, text header and first samples
    Info(InfoArgs),
    /// Print trace header fields of one record
    Header(HeaderArgs),
    /// Build and query trace maps
    #[command(subcommand)]
    Index(IndexCommand),
    /// Copy the records matching key values into a new file
    Export(ExportArgs),
}

/// Arguments of `info`
#[derive(Debug, Clone, Args)]
pub struct InfoArgs {
    /// SEG-Y file
    pub file: PathBuf,

    /// Samples of the first trace to show
    #[arg(long, default_value_t = 5)]
    pub samples: usize,

    /// Traces used for the amplitude range
    #[arg(long, default_value_t = 1000)]
    pub stats_traces: usize,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments of `header`
#[derive(Debug, Clone, Args)]
pub struct HeaderArgs {
    /// SEG-Y file
    pub file: PathBuf,

    /// Zero-based record number
    pub trace: usize,

    /// Fields to print (default: every non-zero field)
    #[arg(long = "field", short = 'f')]
    pub fields: Vec<String>,
}

/// Where a trace map lives and how it is keyed
#[derive(Debug, Clone, Args)]
pub struct MapArgs {
    /// SQLite database holding the trace map
    #[arg(long, env = "SEGY_TOOL_DB")]
    pub db: PathBuf,

    /// Table name inside the database
    #[arg(long, env = "SEGY_TOOL_TABLE", default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Comma-separated key fields; `sequence_number` may come last
    #[arg(long, value_delimiter = ',', required = true)]
    pub keys: Vec<String>,
}

impl MapArgs {
    /// Trace map configuration for these arguments
    pub fn config(&self) -> TraceMapConfig {
        TraceMapConfig::default().with_table(self.table.clone())
    }
}

/// `index` subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum IndexCommand {
    /// Scan a file and (re)build its trace map
    Build(BuildArgs),
    /// Print the record numbers matching key values
    Query(QueryArgs),
    /// Print the distinct values of one key, or pairs of two keys
    Unique(UniqueArgs),
}

/// Arguments of `index build`
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// SEG-Y file to scan
    pub file: PathBuf,

    #[command(flatten)]
    pub map: MapArgs,

    /// Header field ordering records within a group (default: first key)
    #[arg(long)]
    pub sort: Option<String>,

    /// Scan worker threads (0: one per CPU)
    #[arg(long, env = "SEGY_TOOL_THREADS", default_value_t = 0)]
    pub threads: usize,

    /// Scan chunk size in MiB
    #[arg(long, default_value_t = 256)]
    pub chunk_mib: usize,
}

/// Arguments of `index query`
#[derive(Debug, Clone, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub map: MapArgs,

    /// Key bindings such as `CDP=1200`
    #[arg(long = "where", short = 'w', value_parser = parse_binding)]
    pub bindings: Vec<(String, i32)>,
}

/// Arguments of `index unique`
#[derive(Debug, Clone, Args)]
pub struct UniqueArgs {
    #[command(flatten)]
    pub map: MapArgs,

    /// Key to list
    pub key: String,

    /// Second key for value pairs
    pub second: Option<String>,
}

/// Arguments of `export`
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Source SEG-Y file
    pub source: PathBuf,

    /// Destination SEG-Y file (overwritten)
    pub destination: PathBuf,

    /// Key bindings selecting the records, such as `CDP=1200`
    #[arg(long = "where", short = 'w', value_parser = parse_binding, required = true)]
    pub bindings: Vec<(String, i32)>,

    /// Header field ordering the exported records (default: first key)
    #[arg(long)]
    pub sort: Option<String>,

    /// Key fields of the trace map (default: the `--where` keys in order)
    #[arg(long, value_delimiter = ',')]
    pub keys: Vec<String>,

    /// Trace map database to reuse; an in-memory index is built otherwise
    #[arg(long, env = "SEGY_TOOL_DB")]
    pub db: Option<PathBuf>,

    /// Table name inside the database
    #[arg(long, env = "SEGY_TOOL_TABLE", default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Replace a trace map built from another file or with another sort key
    #[arg(long)]
    pub rebuild: bool,
}

impl ExportArgs {
    /// Trace map keys: `--keys` when given, otherwise the binding names with
    /// `sequence_number` moved last
    pub fn map_keys(&self) -> Vec<String> {
        if !self.keys.is_empty() {
            return self.keys.clone();
        }
        let (ordinal, mut keys): (Vec<String>, Vec<String>) = self
            .bindings
            .iter()
            .map(|(key, _)| key.clone())
            .partition(|key| key == SEQUENCE_NUMBER);
        keys.extend(ordinal);
        keys
    }
}

/// Parse `KEY=VALUE` with an integer value
pub fn parse_binding(s: &str) -> Result<(String, i32), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{s}'"));
    }
    let value = value
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid value in '{s}': {e}"))?;
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binding() {
        assert_eq!(parse_binding("CDP=12"), Ok(("CDP".to_string(), 12)));
        assert_eq!(parse_binding(" offset = -40 "), Ok(("offset".to_string(), -40)));
        assert!(parse_binding("CDP").is_err());
        assert!(parse_binding("=3").is_err());
        assert!(parse_binding("CDP=x").is_err());
    }

    #[test]
    fn test_cli_parses_index_build() {
        let cli = Cli::try_parse_from([
            "segy-tool",
            "index",
            "build",
            "line.sgy",
            "--db",
            "line.db",
            "--keys",
            "CDP,offset",
            "--sort",
            "offset",
            "--threads",
            "2",
        ]);
        let Ok(cli) = cli else {
            unreachable!("valid command line rejected");
        };
        let Command::Index(IndexCommand::Build(args)) = cli.command else {
            unreachable!("wrong subcommand");
        };
        assert_eq!(args.map.keys, vec!["CDP".to_string(), "offset".to_string()]);
        assert_eq!(args.map.table, DEFAULT_TABLE);
        assert_eq!(args.sort.as_deref(), Some("offset"));
        assert_eq!(args.threads, 2);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_cli_parses_export_bindings() {
        let cli = Cli::try_parse_from([
            "segy-tool",
            "export",
            "in.sgy",
            "out.sgy",
            "--where",
            "CDP=1",
            "-w",
            "offset=2",
        ]);
        let Ok(Cli {
            command: Command::Export(args),
            ..
        }) = cli
        else {
            unreachable!("valid command line rejected");
        };
        assert_eq!(
            args.bindings,
            vec![("CDP".to_string(), 1), ("offset".to_string(), 2)]
        );
        assert!(!args.rebuild);
        assert_eq!(args.map_keys(), vec!["CDP".to_string(), "offset".to_string()]);
    }

    #[test]
    fn test_export_keys() {
        let cli = Cli::try_parse_from([
            "segy-tool",
            "export",
            "in.sgy",
            "out.sgy",
            "-w",
            "sequence_number=0",
            "-w",
            "CDP=1",
        ]);
        let Ok(Cli {
            command: Command::Export(args),
            ..
        }) = cli
        else {
            unreachable!("valid command line rejected");
        };
        assert_eq!(
            args.map_keys(),
            vec!["CDP".to_string(), "sequence_number".to_string()]
        );

        let explicit = ExportArgs {
            keys: vec!["CDP".to_string(), "offset".to_string()],
            ..args
        };
        assert_eq!(explicit.map_keys(), vec!["CDP".to_string(), "offset".to_string()]);
    }
}
