//! SEG-Y inspection, indexing and export.
//!
#![allow(clippy::uninlined_format_args)] // Consistent log formatting
//! This crate backs the `segy-tool` binary:
//! - `info`: geometry, text header, first samples and amplitude range
//! - `header`: trace header fields of one record
//! - `index build|query|unique`: persistent trace maps
//! - `export`: copy the records matching key values into a new file
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use segy_tool::{Cli, run};
//!
//! let cli = Cli::parse_from(["segy-tool", "info", "line.sgy"]);
//! run(&cli, &mut std::io::stdout())?;
//! # Ok::<(), segy_tool::ToolError>(())
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod cli;
pub mod commands;
mod error;

pub use cli::{Cli, Command, LogFormat};
pub use error::{Result, ToolError};

use std::io::Write;

/// Run the parsed command, writing its report to `out`
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    match &cli.command {
        Command::Info(args) => commands::info(args, out),
        Command::Header(args) => commands::header(args, out),
        Command::Index(command) => commands::index(command, out),
        Command::Export(args) => commands::export(args, out),
    }
}
