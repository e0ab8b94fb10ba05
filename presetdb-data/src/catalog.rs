//! The published catalog shared by every query consumer.
//!
//! [`PresetCatalog`] owns the currently published [`CatalogSnapshot`].
//! Queries load the snapshot once at call start and never block on I/O.
//! Writers replace the snapshot in one atomic store, so readers see either
//! the old or the new catalog, never a mixture.

use std::sync::Arc;

use arc_swap::ArcSwap;
use log::info;
use presetdb_core::{
    AddressFormat, CatalogSnapshot, Feature, Field, GeoContext, Geometry, LocaleStrings,
    MatchWeights, Tags, rank,
};

use crate::{
    AugmentError, AugmentationHandle, CatalogError, CatalogSources, DocumentProvider,
    KnownValuesSource, TagValueCache, load_baseline, spawn_augmentation, suggest_values,
};

/// Explicitly constructed catalog context.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
/// use presetdb_core::{GeoContext, Geometry, Tags};
/// use presetdb_data::{CatalogSources, DirectoryProvider, PresetCatalog};
///
/// let provider = Arc::new(DirectoryProvider::open("data/presets")?);
/// let catalog = PresetCatalog::open(provider, CatalogSources::default(), "en")?;
/// let _augmenting = catalog.start_augmentation()?;
///
/// let tags = Tags::from([("amenity".into(), "cafe".into())]);
/// let matched = catalog.best_match(&tags, Geometry::Point, &GeoContext::unknown(), true);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PresetCatalog {
    current: Arc<ArcSwap<CatalogSnapshot>>,
    provider: Arc<dyn DocumentProvider>,
    sources: CatalogSources,
    weights: MatchWeights,
    values: Option<TagValueCache>,
}

impl std::fmt::Debug for PresetCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.current.load();
        f.debug_struct("PresetCatalog")
            .field("language", &snapshot.language())
            .field("augmented", &snapshot.is_augmented())
            .field("sources", &self.sources)
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}

impl PresetCatalog {
    /// Load the baseline catalog for `language` with default match weights.
    ///
    /// The returned catalog answers queries immediately; call
    /// [`Self::start_augmentation`] to add the secondary dataset.
    ///
    /// # Errors
    /// Returns [`CatalogError`] when a baseline document cannot be loaded.
    pub fn open(
        provider: Arc<dyn DocumentProvider>,
        sources: CatalogSources,
        language: &str,
    ) -> Result<Self, CatalogError> {
        Self::open_with_weights(provider, sources, language, MatchWeights::default())
    }

    /// Load the baseline catalog using `weights` for tag matching.
    ///
    /// # Errors
    /// Returns [`CatalogError::Weights`] when `weights` fail validation, or
    /// another [`CatalogError`] when a baseline document cannot be loaded.
    pub fn open_with_weights(
        provider: Arc<dyn DocumentProvider>,
        sources: CatalogSources,
        language: &str,
        weights: MatchWeights,
    ) -> Result<Self, CatalogError> {
        let weights = weights
            .validate()
            .map_err(|source| CatalogError::Weights { source })?;
        let baseline = load_baseline(provider.as_ref(), &sources, language)?;
        let snapshot = CatalogSnapshot::new(baseline).with_weights(weights);
        Ok(Self {
            current: Arc::new(ArcSwap::from_pointee(snapshot)),
            provider,
            sources,
            weights,
            values: None,
        })
    }

    /// Attach a remote source of known tag values.
    #[must_use]
    pub fn with_value_source(mut self, source: Arc<dyn KnownValuesSource>) -> Self {
        self.values = Some(TagValueCache::new(source));
        self
    }

    /// The currently published snapshot.
    ///
    /// Holding the returned `Arc` keeps that snapshot alive across later
    /// reloads or augmentation.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.load_full()
    }

    /// Load the secondary dataset in the background.
    ///
    /// # Errors
    /// Returns [`AugmentError::Spawn`] when the worker cannot be started.
    pub fn start_augmentation(&self) -> Result<AugmentationHandle, AugmentError> {
        spawn_augmentation(
            Arc::clone(&self.current),
            self.snapshot(),
            Arc::clone(&self.provider),
            self.sources.clone(),
        )
    }

    /// Switch to `language` and start a fresh augmentation.
    ///
    /// The new baseline is built synchronously and published before this
    /// returns. Any augmentation still running for the previous snapshot
    /// will find it superseded and discard its result.
    ///
    /// # Errors
    /// Returns [`CatalogError`] when the new baseline cannot be loaded or the
    /// augmentation worker cannot be started. On a load error the previous
    /// snapshot stays published.
    pub fn reload(&self, language: &str) -> Result<AugmentationHandle, CatalogError> {
        let baseline = load_baseline(self.provider.as_ref(), &self.sources, language)?;
        let snapshot = CatalogSnapshot::new(baseline).with_weights(self.weights);
        self.current.store(Arc::new(snapshot));
        info!("published baseline catalog for `{language}`");
        self.start_augmentation()
            .map_err(|source| CatalogError::Augmentation { source })
    }

    /// Best-matching preset for an entity.
    pub fn best_match(
        &self,
        tags: &Tags,
        geometry: Geometry,
        location: &GeoContext,
        include_secondary: bool,
    ) -> Option<Arc<Feature>> {
        self.current
            .load()
            .best_match(tags, geometry, location, include_secondary)
    }

    /// Presets matching free text, best first.
    pub fn search(
        &self,
        query: Option<&str>,
        geometry: Geometry,
        location: &GeoContext,
    ) -> Vec<(Arc<Feature>, u32)> {
        let mut results = self.current.load().search(query, geometry, location);
        rank(&mut results);
        results
    }

    /// Walk up the baseline hierarchy until `accessor` yields a value.
    pub fn inherited<T>(
        &self,
        feature_id: Option<&str>,
        accessor: impl Fn(&Feature) -> Option<T>,
    ) -> Option<T> {
        self.current.load().inherited(feature_id, accessor)
    }

    /// Look up a preset, preferring the baseline.
    pub fn feature(&self, id: &str) -> Option<Arc<Feature>> {
        self.current.load().feature(id).cloned()
    }

    /// Member presets of a category; unknown members are skipped.
    pub fn category_features(&self, category_id: &str) -> Vec<Arc<Feature>> {
        self.current
            .load()
            .category_features(category_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Field descriptor by id.
    pub fn field(&self, id: &str) -> Option<Field> {
        self.current.load().field(id).cloned()
    }

    /// Address layout for a country, falling back to the default layout.
    pub fn address_format_for(&self, country_code: Option<&str>) -> Option<AddressFormat> {
        self.current.load().address_format_for(country_code).cloned()
    }

    /// Localized `yes`, `no` and `unknown` labels.
    pub fn locale_strings(&self) -> LocaleStrings {
        self.current.load().locale_strings().clone()
    }

    /// Language code of the published catalog.
    pub fn language(&self) -> String {
        self.current.load().language().to_owned()
    }

    /// Suggest values for `key` starting with `prefix`.
    pub fn suggest_values(&self, key: &str, prefix: &str) -> Vec<String> {
        suggest_values(&self.current.load(), self.values.as_ref(), key, prefix)
    }
}
