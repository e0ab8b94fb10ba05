//! Match command implementation for the presetdb CLI.

use std::collections::BTreeMap;
use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use presetdb_core::{Feature, FeatureSource};
use presetdb_data::PresetCatalog;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogConfig, CatalogInputs, parse_tags};
use crate::{
    ARG_COUNTRY, ARG_GEOMETRY, ARG_INCLUDE_SECONDARY, ARG_LANG, ARG_LAT, ARG_LON, ARG_PRESETS_DIR,
    ARG_TAG, CliError, ENV_MATCH_PRESETS_DIR, write_json,
};

/// CLI arguments for the `match` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load the preset catalog from a directory and report the \
                 preset that best describes the given tags. Settings can come \
                 from CLI flags, configuration files, or environment \
                 variables.",
    about = "Find the best-matching preset for a set of tags"
)]
#[ortho_config(prefix = "PRESETDB")]
pub(crate) struct MatchArgs {
    /// Directory containing `presets.json` and the other catalog documents.
    #[arg(long = ARG_PRESETS_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) presets_dir: Option<Utf8PathBuf>,
    /// Catalog language code.
    #[arg(long = ARG_LANG, value_name = "code")]
    #[serde(default)]
    pub(crate) lang: Option<String>,
    /// Geometry class of the entity (point, vertex, line, area, relation).
    #[arg(long = ARG_GEOMETRY, value_name = "class")]
    #[serde(default)]
    pub(crate) geometry: Option<String>,
    /// Entity tag as `key=value`; repeat for several tags.
    #[arg(long = ARG_TAG, value_name = "key=value")]
    #[serde(default)]
    pub(crate) tag: Vec<String>,
    /// Longitude of the entity.
    #[arg(long = ARG_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Latitude of the entity.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// ISO 3166 country code of the entity.
    #[arg(long = ARG_COUNTRY, value_name = "code")]
    #[serde(default)]
    pub(crate) country: Option<String>,
    /// Load brand presets before matching.
    #[arg(long = ARG_INCLUDE_SECONDARY)]
    #[serde(default)]
    pub(crate) include_secondary: bool,
}

impl MatchArgs {
    pub(crate) fn into_config(self) -> Result<MatchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MatchConfig::try_from(merged)
    }
}

/// Resolved `match` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MatchConfig {
    pub(crate) catalog: CatalogConfig,
    pub(crate) tags: BTreeMap<String, String>,
}

impl TryFrom<MatchArgs> for MatchConfig {
    type Error = CliError;

    fn try_from(args: MatchArgs) -> Result<Self, Self::Error> {
        let presets_dir = args.presets_dir.ok_or(CliError::MissingArgument {
            field: ARG_PRESETS_DIR,
            env: ENV_MATCH_PRESETS_DIR,
        })?;
        let tags = parse_tags(&args.tag)?;
        let catalog = CatalogConfig::try_from(CatalogInputs {
            presets_dir,
            language: args.lang,
            geometry: args.geometry,
            lon: args.lon,
            lat: args.lat,
            country: args.country,
            include_secondary: args.include_secondary,
        })?;
        Ok(Self { catalog, tags })
    }
}

/// JSON description of a matched preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct MatchedPreset {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) source: FeatureSource,
    /// Icon of the preset or its nearest baseline ancestor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) icon: Option<String>,
    pub(crate) tags: BTreeMap<String, String>,
}

impl MatchedPreset {
    pub(crate) fn describe(catalog: &PresetCatalog, feature: &Feature) -> Self {
        let icon = feature
            .icon
            .clone()
            .or_else(|| catalog.inherited(Some(&feature.id), |parent| parent.icon.clone()));
        Self {
            id: feature.id.clone(),
            name: feature.name.clone(),
            source: feature.source,
            icon,
            tags: feature.tags.clone(),
        }
    }
}

pub(crate) fn run_match_with(args: MatchArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.catalog.validate_sources()?;
    let matched = execute_match(&config)?;
    write_json(writer, &matched)
}

pub(crate) fn execute_match(config: &MatchConfig) -> Result<Option<MatchedPreset>, CliError> {
    let catalog = config.catalog.open()?;
    let matched = catalog.best_match(
        &config.tags,
        config.catalog.geometry,
        &config.catalog.location,
        config.catalog.include_secondary,
    );
    Ok(matched.map(|feature| MatchedPreset::describe(&catalog, &feature)))
}
