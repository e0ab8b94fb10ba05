//! Catalog options shared by the `match` and `search` subcommands.

use std::str::FromStr;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use log::{debug, warn};
use presetdb_core::{GeoContext, Geometry, Tags};
use presetdb_data::{AugmentOutcome, CatalogSources, DirectoryProvider, PresetCatalog};

use crate::{ARG_LAT, ARG_LON, ARG_PRESETS_DIR, CliError};

/// Language used when none is configured.
pub(crate) const DEFAULT_LANGUAGE: &str = "en";

/// Resolved options for opening and querying a catalog.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CatalogConfig {
    /// Directory holding the catalog documents.
    pub(crate) presets_dir: Utf8PathBuf,
    /// Language of the loaded catalog.
    pub(crate) language: String,
    /// Geometry class of the entity being described.
    pub(crate) geometry: Geometry,
    /// Where the entity is, if known.
    pub(crate) location: GeoContext,
    /// Wait for the secondary dataset before answering.
    pub(crate) include_secondary: bool,
}

/// Raw catalog options after configuration merging.
pub(crate) struct CatalogInputs {
    pub(crate) presets_dir: Utf8PathBuf,
    pub(crate) language: Option<String>,
    pub(crate) geometry: Option<String>,
    pub(crate) lon: Option<f64>,
    pub(crate) lat: Option<f64>,
    pub(crate) country: Option<String>,
    pub(crate) include_secondary: bool,
}

impl TryFrom<CatalogInputs> for CatalogConfig {
    type Error = CliError;

    fn try_from(inputs: CatalogInputs) -> Result<Self, Self::Error> {
        let geometry = match inputs.geometry.as_deref() {
            Some(name) => {
                Geometry::from_str(name).map_err(|reason| CliError::InvalidGeometry { reason })?
            }
            None => Geometry::Point,
        };
        let mut location = match (inputs.lon, inputs.lat) {
            (Some(lon), Some(lat)) => GeoContext::at(checked_coord(lon, lat)?),
            (None, None) => GeoContext::unknown(),
            _ => return Err(CliError::IncompleteLocation),
        };
        if let Some(code) = inputs.country.as_deref() {
            location = location.with_country(code);
        }
        Ok(Self {
            presets_dir: inputs.presets_dir,
            language: inputs
                .language
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()),
            geometry,
            location,
            include_secondary: inputs.include_secondary,
        })
    }
}

fn checked_coord(lon: f64, lat: f64) -> Result<Coord<f64>, CliError> {
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CliError::CoordinateOutOfRange {
            field: ARG_LON,
            value: lon,
        });
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CliError::CoordinateOutOfRange {
            field: ARG_LAT,
            value: lat,
        });
    }
    Ok(Coord { x: lon, y: lat })
}

impl CatalogConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_directory(&self.presets_dir)
    }

    /// Load the catalog, augmenting it first when requested.
    ///
    /// A failed augmentation leaves the baseline catalog in place.
    pub(crate) fn open(&self) -> Result<PresetCatalog, CliError> {
        let provider = DirectoryProvider::open(self.presets_dir.clone()).map_err(|source| {
            CliError::OpenPresetsDir {
                path: self.presets_dir.clone(),
                source,
            }
        })?;
        let catalog = PresetCatalog::open(
            Arc::new(provider),
            CatalogSources::default(),
            &self.language,
        )?;
        if self.include_secondary {
            match catalog.start_augmentation().map(|handle| handle.join()) {
                Ok(AugmentOutcome::Published) => debug!("secondary presets loaded"),
                Ok(AugmentOutcome::Superseded) => debug!("secondary presets superseded"),
                Ok(AugmentOutcome::Failed(err)) => {
                    debug!("answering from the baseline catalog: {err}");
                }
                Err(err) => warn!("answering from the baseline catalog: {err}"),
            }
        }
        Ok(catalog)
    }
}

fn require_directory(path: &Utf8Path) -> Result<(), CliError> {
    let field = ARG_PRESETS_DIR;
    match presetdb_fs::dir_is_dir(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::PresetsDirNotDirectory {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingPresetsDir {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectPresetsDir {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parse repeated `key=value` arguments; later keys replace earlier ones.
pub(crate) fn parse_tags(raw: &[String]) -> Result<Tags, CliError> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
            _ => Err(CliError::InvalidTag {
                value: pair.clone(),
            }),
        })
        .collect()
}
