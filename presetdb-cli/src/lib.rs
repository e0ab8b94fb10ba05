//! Command-line interface for querying a preset catalog directory.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;

mod catalog;
mod error;
mod matching;
mod search;

pub use error::CliError;

use matching::{MatchArgs, run_match_with};
use search::{SearchArgs, run_search_with};

pub(crate) const ARG_PRESETS_DIR: &str = "presets-dir";
pub(crate) const ARG_LANG: &str = "lang";
pub(crate) const ARG_GEOMETRY: &str = "geometry";
pub(crate) const ARG_TAG: &str = "tag";
pub(crate) const ARG_LON: &str = "lon";
pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ARG_COUNTRY: &str = "country";
pub(crate) const ARG_INCLUDE_SECONDARY: &str = "include-secondary";
pub(crate) const ARG_QUERY: &str = "query";
pub(crate) const ENV_MATCH_PRESETS_DIR: &str = "PRESETDB_CMDS_MATCH_PRESETS_DIR";
pub(crate) const ENV_SEARCH_PRESETS_DIR: &str = "PRESETDB_CMDS_SEARCH_PRESETS_DIR";
pub(crate) const ENV_SEARCH_QUERY: &str = "PRESETDB_CMDS_SEARCH_QUERY";

/// Run the presetdb CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// catalog cannot be loaded or output cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Match(args) => run_match_with(args, &mut stdout),
        Command::Search(args) => run_search_with(args, &mut stdout),
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "presetdb",
    about = "Match and search entity presets in a preset catalog directory",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find the preset that best describes a set of tags.
    Match(MatchArgs),
    /// Rank presets against a free-text query.
    Search(SearchArgs),
}

#[cfg(test)]
mod tests;
