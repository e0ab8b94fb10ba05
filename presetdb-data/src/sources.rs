//! Logical document names making up a catalog.

/// Default directory holding translation documents.
pub const DEFAULT_TRANSLATIONS_DIR: &str = "translations";

/// Names of the documents requested from a
/// [`DocumentProvider`](crate::DocumentProvider).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSources {
    /// Baseline presets, keyed by feature identifier.
    pub presets: String,
    /// Baseline fields, keyed by field identifier.
    pub fields: String,
    /// Baseline categories, keyed by category identifier.
    pub categories: String,
    /// List of address formats.
    pub address_formats: String,
    /// Default preset lists keyed by geometry.
    pub defaults: String,
    /// Directory containing `{language}.json` translations.
    pub translations_dir: String,
    /// Secondary (brand) presets.
    pub secondary_presets: String,
    /// GeoJSON feature collection of geofence regions.
    pub geofences: String,
}

impl Default for CatalogSources {
    fn default() -> Self {
        Self {
            presets: "presets.json".to_owned(),
            fields: "fields.json".to_owned(),
            categories: "preset_categories.json".to_owned(),
            address_formats: "address_formats.json".to_owned(),
            defaults: "preset_defaults.json".to_owned(),
            translations_dir: DEFAULT_TRANSLATIONS_DIR.to_owned(),
            secondary_presets: "nsi_presets.json".to_owned(),
            geofences: "nsi_geojson.json".to_owned(),
        }
    }
}

impl CatalogSources {
    /// Name of the translation document for `language`.
    ///
    /// # Examples
    /// ```
    /// use presetdb_data::CatalogSources;
    ///
    /// assert_eq!(CatalogSources::default().translation("de"), "translations/de.json");
    /// ```
    pub fn translation(&self, language: &str) -> String {
        format!("{}/{language}.json", self.translations_dir)
    }

    /// Set the translations directory.
    #[must_use]
    pub fn with_translations_dir(mut self, dir: impl Into<String>) -> Self {
        self.translations_dir = dir.into();
        self
    }

    /// Set the secondary preset document name.
    #[must_use]
    pub fn with_secondary_presets(mut self, name: impl Into<String>) -> Self {
        self.secondary_presets = name.into();
        self
    }

    /// Set the geofence document name.
    #[must_use]
    pub fn with_geofences(mut self, name: impl Into<String>) -> Self {
        self.geofences = name.into();
        self
    }
}
