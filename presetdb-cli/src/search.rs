//! Search command implementation for the presetdb CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use presetdb_core::FeatureSource;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogConfig, CatalogInputs};
use crate::{
    ARG_COUNTRY, ARG_GEOMETRY, ARG_INCLUDE_SECONDARY, ARG_LANG, ARG_LAT, ARG_LON, ARG_PRESETS_DIR,
    ARG_QUERY, CliError, ENV_SEARCH_PRESETS_DIR, ENV_SEARCH_QUERY, write_json,
};

/// Number of results printed when no limit is configured.
pub(crate) const DEFAULT_LIMIT: usize = 10;

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load the preset catalog from a directory and rank presets \
                 whose names, terms or tag values contain the query. Settings \
                 can come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Rank presets against a free-text query"
)]
#[ortho_config(prefix = "PRESETDB")]
pub(crate) struct SearchArgs {
    /// Text to look for.
    #[arg(value_name = ARG_QUERY)]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Directory containing `presets.json` and the other catalog documents.
    #[arg(long = ARG_PRESETS_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) presets_dir: Option<Utf8PathBuf>,
    /// Catalog language code.
    #[arg(long = ARG_LANG, value_name = "code")]
    #[serde(default)]
    pub(crate) lang: Option<String>,
    /// Geometry class the results must support.
    #[arg(long = ARG_GEOMETRY, value_name = "class")]
    #[serde(default)]
    pub(crate) geometry: Option<String>,
    /// Longitude used to filter location-restricted presets.
    #[arg(long = ARG_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Latitude used to filter location-restricted presets.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// ISO 3166 country code used to filter location-restricted presets.
    #[arg(long = ARG_COUNTRY, value_name = "code")]
    #[serde(default)]
    pub(crate) country: Option<String>,
    /// Load brand presets before searching.
    #[arg(long = ARG_INCLUDE_SECONDARY)]
    #[serde(default)]
    pub(crate) include_secondary: bool,
    /// Maximum number of results to print.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchConfig {
    pub(crate) catalog: CatalogConfig,
    pub(crate) query: String,
    pub(crate) limit: usize,
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let query = args.query.ok_or(CliError::MissingArgument {
            field: ARG_QUERY,
            env: ENV_SEARCH_QUERY,
        })?;
        let presets_dir = args.presets_dir.ok_or(CliError::MissingArgument {
            field: ARG_PRESETS_DIR,
            env: ENV_SEARCH_PRESETS_DIR,
        })?;
        let catalog = CatalogConfig::try_from(CatalogInputs {
            presets_dir,
            language: args.lang,
            geometry: args.geometry,
            lon: args.lon,
            lat: args.lat,
            country: args.country,
            include_secondary: args.include_secondary,
        })?;
        Ok(Self {
            catalog,
            query,
            limit: args.limit.unwrap_or(DEFAULT_LIMIT),
        })
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SearchHit {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) source: FeatureSource,
    pub(crate) score: u32,
}

pub(crate) fn run_search_with(args: SearchArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.catalog.validate_sources()?;
    let hits = execute_search(&config)?;
    write_json(writer, &hits)
}

pub(crate) fn execute_search(config: &SearchConfig) -> Result<Vec<SearchHit>, CliError> {
    let catalog = config.catalog.open()?;
    let hits = catalog
        .search(
            Some(&config.query),
            config.catalog.geometry,
            &config.catalog.location,
        )
        .into_iter()
        .take(config.limit)
        .map(|(feature, score)| SearchHit {
            id: feature.id.clone(),
            name: feature.name.clone(),
            source: feature.source,
            score,
        })
        .collect();
    Ok(hits)
}
