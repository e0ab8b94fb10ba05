//! Error types emitted by the presetdb CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use presetdb_data::CatalogError;
use thiserror::Error;

/// Errors emitted by the presetdb CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The presets directory does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingPresetsDir {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// The presets directory exists but is not a directory.
    #[error("{field} path {path:?} exists but is not a directory")]
    PresetsDirNotDirectory {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// The presets directory could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectPresetsDir {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A `--tag` value was not of the form `key=value`.
    #[error("tag {value:?} must have the form key=value")]
    InvalidTag { value: String },
    /// The geometry name is not one of the known classes.
    #[error("invalid --geometry: {reason}")]
    InvalidGeometry { reason: String },
    /// Only one of longitude and latitude was supplied.
    #[error("--lon and --lat must be given together")]
    IncompleteLocation,
    /// A coordinate was outside the valid WGS84 range.
    #[error("{field} {value} is out of range")]
    CoordinateOutOfRange { field: &'static str, value: f64 },
    /// Opening the presets directory failed.
    #[error("failed to open presets directory {path:?}: {source}")]
    OpenPresetsDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Loading the baseline catalog failed.
    #[error("failed to load preset catalog: {0}")]
    LoadCatalog(#[from] Box<CatalogError>),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl From<CatalogError> for CliError {
    fn from(source: CatalogError) -> Self {
        Self::LoadCatalog(Box::new(source))
    }
}
