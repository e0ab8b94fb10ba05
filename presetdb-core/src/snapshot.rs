//! Immutable catalog snapshots answering every read query.
//!
//! A [`BaselineCatalog`] holds the language-specific catalog and its index.
//! A [`CatalogSnapshot`] shares a baseline and optionally adds the secondary
//! feature collection, geofence regions and a combined index. Augmenting a
//! snapshot never mutates it; [`CatalogSnapshot::augment`] returns a new one.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::{
    AddressFormat, Category, Feature, FeatureMap, Field, GeoContext, GeofenceMap, Geometry,
    LocaleStrings, MatchWeights, TagIndex, Tags, matching, parent_id, search, significant_keys,
};

/// Converted baseline entities handed to [`BaselineCatalog::new`].
#[derive(Debug, Clone, Default)]
pub struct CatalogParts {
    /// Language code of the translation overlay, e.g. `en`.
    pub language: String,
    /// Baseline features keyed by identifier.
    pub features: FeatureMap,
    /// Fields keyed by identifier.
    pub fields: BTreeMap<String, Field>,
    /// Categories keyed by identifier.
    pub categories: BTreeMap<String, Category>,
    /// Address formats in catalog order.
    pub address_formats: Vec<AddressFormat>,
    /// Default feature or category identifiers per geometry class.
    pub defaults: BTreeMap<Geometry, Vec<String>>,
}

/// The language-specific baseline catalog with its tag index.
#[derive(Debug)]
pub struct BaselineCatalog {
    parts: CatalogParts,
    locale: LocaleStrings,
    significant_keys: BTreeSet<String>,
    index: TagIndex,
}

impl BaselineCatalog {
    /// Index the baseline features and derive locale strings.
    pub fn new(parts: CatalogParts) -> Self {
        let significant_keys = significant_keys(&parts.features);
        let index = TagIndex::build(&[&parts.features], &significant_keys);
        let locale = LocaleStrings::from_fields(&parts.fields);
        Self {
            parts,
            locale,
            significant_keys,
            index,
        }
    }

    /// Language code of this catalog.
    pub fn language(&self) -> &str {
        &self.parts.language
    }

    /// Baseline features keyed by identifier.
    pub fn features(&self) -> &FeatureMap {
        &self.parts.features
    }

    /// Index over baseline features only.
    pub fn index(&self) -> &TagIndex {
        &self.index
    }

    /// First path segments of the baseline identifiers.
    pub fn significant_keys(&self) -> &BTreeSet<String> {
        &self.significant_keys
    }
}

/// A resolved entry of a geometry's default list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultEntry<'a> {
    /// A feature offered directly.
    Feature(&'a Arc<Feature>),
    /// A category of features.
    Category(&'a Category),
}

/// Everything needed to answer queries, published as one unit.
///
/// # Examples
/// ```
/// use presetdb_core::{BaselineCatalog, CatalogParts, CatalogSnapshot, Geometry, GeoContext};
///
/// let snapshot = CatalogSnapshot::new(BaselineCatalog::new(CatalogParts {
///     language: "en".into(),
///     ..CatalogParts::default()
/// }));
/// assert!(!snapshot.is_augmented());
/// assert!(snapshot.search(Some("cafe"), Geometry::Point, &GeoContext::unknown()).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    baseline: Arc<BaselineCatalog>,
    secondary: Arc<FeatureMap>,
    combined: Option<Arc<TagIndex>>,
    geofences: Arc<GeofenceMap>,
    weights: MatchWeights,
}

impl CatalogSnapshot {
    /// Baseline-only snapshot using default match weights.
    pub fn new(baseline: BaselineCatalog) -> Self {
        Self {
            baseline: Arc::new(baseline),
            secondary: Arc::default(),
            combined: None,
            geofences: Arc::default(),
            weights: MatchWeights::default(),
        }
    }

    /// Replace the match weights.
    #[must_use]
    pub fn with_weights(mut self, weights: MatchWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Build the augmented successor of this snapshot.
    ///
    /// The baseline is shared. The combined index covers baseline then
    /// secondary features, bucketed by the baseline's significant keys.
    #[must_use]
    pub fn augment(&self, secondary: FeatureMap, geofences: GeofenceMap) -> Self {
        let combined = TagIndex::build(
            &[self.baseline.features(), &secondary],
            self.baseline.significant_keys(),
        );
        Self {
            baseline: Arc::clone(&self.baseline),
            secondary: Arc::new(secondary),
            combined: Some(Arc::new(combined)),
            geofences: Arc::new(geofences),
            weights: self.weights,
        }
    }

    /// The shared baseline catalog.
    pub fn baseline(&self) -> &Arc<BaselineCatalog> {
        &self.baseline
    }

    /// Secondary features keyed by identifier; empty before augmentation.
    pub fn secondary(&self) -> &FeatureMap {
        &self.secondary
    }

    /// Geofence regions; empty before augmentation.
    pub fn geofences(&self) -> &GeofenceMap {
        &self.geofences
    }

    /// Match weights used by [`Self::best_match`].
    pub fn weights(&self) -> &MatchWeights {
        &self.weights
    }

    /// Report whether the secondary dataset has been merged in.
    pub fn is_augmented(&self) -> bool {
        self.combined.is_some()
    }

    /// Combined index when augmented and requested, else the baseline index.
    pub fn index(&self, include_secondary: bool) -> &TagIndex {
        match &self.combined {
            Some(combined) if include_secondary => combined,
            _ => self.baseline.index(),
        }
    }

    /// Best-matching feature for an entity, see [`matching::best_match`].
    pub fn best_match(
        &self,
        tags: &Tags,
        geometry: Geometry,
        location: &GeoContext,
        include_secondary: bool,
    ) -> Option<Arc<Feature>> {
        matching::best_match(
            self.index(include_secondary),
            tags,
            geometry,
            location,
            &self.geofences,
            &self.weights,
        )
        .map(Arc::clone)
    }

    /// Score baseline and secondary features against `query`.
    pub fn search(
        &self,
        query: Option<&str>,
        geometry: Geometry,
        location: &GeoContext,
    ) -> Vec<(Arc<Feature>, u32)> {
        search::search(
            self.baseline.features().values().chain(self.secondary.values()),
            query,
            geometry,
            location,
            &self.geofences,
        )
    }

    /// Walk up the baseline hierarchy until `accessor` yields a value.
    ///
    /// Starts at `feature_id` itself and strips one trailing segment per
    /// step. Identifiers absent from the baseline are skipped, not fatal.
    /// Secondary features are never consulted.
    pub fn inherited<T>(
        &self,
        feature_id: Option<&str>,
        accessor: impl Fn(&Feature) -> Option<T>,
    ) -> Option<T> {
        let features = self.baseline.features();
        let mut current = feature_id;
        while let Some(id) = current {
            if let Some(value) = features.get(id).and_then(|feature| accessor(feature)) {
                return Some(value);
            }
            current = parent_id(id);
        }
        None
    }

    /// Look up a feature, preferring the baseline.
    pub fn feature(&self, id: &str) -> Option<&Arc<Feature>> {
        self.baseline
            .features()
            .get(id)
            .or_else(|| self.secondary.get(id))
    }

    /// Member features of a category; unknown members are skipped.
    pub fn category_features(&self, category_id: &str) -> Vec<&Arc<Feature>> {
        self.baseline
            .parts
            .categories
            .get(category_id)
            .map(|category| {
                category
                    .members
                    .iter()
                    .filter_map(|id| self.feature(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up a category.
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.baseline.parts.categories.get(id)
    }

    /// Resolved default list for `geometry`; unknown identifiers are skipped.
    pub fn defaults_for(&self, geometry: Geometry) -> Vec<DefaultEntry<'_>> {
        let Some(ids) = self.baseline.parts.defaults.get(&geometry) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| {
                self.category(id)
                    .map(DefaultEntry::Category)
                    .or_else(|| self.feature(id).map(DefaultEntry::Feature))
            })
            .collect()
    }

    /// Address layout for a country, falling back to the default layout.
    pub fn address_format_for(&self, country_code: Option<&str>) -> Option<&AddressFormat> {
        let formats = &self.baseline.parts.address_formats;
        let code = country_code.map(str::to_lowercase);
        code.and_then(|code| {
            formats
                .iter()
                .find(|format| format.country_codes.contains(&code))
        })
        .or_else(|| formats.iter().find(|format| format.is_default()))
    }

    /// Look up a field.
    pub fn field(&self, id: &str) -> Option<&Field> {
        self.baseline.parts.fields.get(id)
    }

    /// Fields keyed by identifier.
    pub fn fields(&self) -> &BTreeMap<String, Field> {
        &self.baseline.parts.fields
    }

    /// Localized `yes`, `no` and `unknown` labels.
    pub fn locale_strings(&self) -> &LocaleStrings {
        &self.baseline.locale
    }

    /// Language code of the baseline catalog.
    pub fn language(&self) -> &str {
        self.baseline.language()
    }

    /// Report whether `other` was derived from the same baseline build.
    pub fn shares_baseline(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.baseline, &other.baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{brand, feature, feature_map, snapshot, tags};
    use rstest::{fixture, rstest};

    #[fixture]
    fn catalog() -> CatalogSnapshot {
        let mut restaurant = feature("amenity/restaurant", &[("amenity", "restaurant")]);
        restaurant.icon = Some("restaurant".to_owned());
        let pizza = feature(
            "amenity/restaurant/pizza",
            &[("amenity", "restaurant"), ("cuisine", "pizza")],
        );
        snapshot([feature("amenity", &[("amenity", "*")]), restaurant, pizza])
    }

    fn secondary() -> FeatureMap {
        feature_map([brand(
            "brands/amenity/restaurant/pizza_hut",
            "Pizza Hut",
            &[("amenity", "restaurant"), ("brand", "Pizza Hut"), ("cuisine", "pizza")],
        )])
    }

    #[rstest]
    fn inheritance_walks_up_to_ancestor(catalog: CatalogSnapshot) {
        let icon = catalog.inherited(Some("amenity/restaurant/pizza"), |f| f.icon.clone());
        assert_eq!(icon.as_deref(), Some("restaurant"));
        assert_eq!(catalog.inherited(Some("amenity"), |f| f.icon.clone()), None);
        assert_eq!(catalog.inherited(None, |f| f.icon.clone()), None);
    }

    #[rstest]
    fn inheritance_skips_missing_ids(catalog: CatalogSnapshot) {
        let icon = catalog.inherited(Some("amenity/restaurant/unknown/deeper"), |f| f.icon.clone());
        assert_eq!(icon.as_deref(), Some("restaurant"));
    }

    #[rstest]
    fn inheritance_ignores_secondary(catalog: CatalogSnapshot) {
        let augmented = catalog.augment(secondary(), GeofenceMap::new());
        let name = augmented.inherited(Some("brands/amenity/restaurant/pizza_hut"), |f| {
            Some(f.name.clone())
        });
        assert_eq!(name, None);
    }

    #[rstest]
    fn augmentation_shares_baseline_and_extends_index(catalog: CatalogSnapshot) {
        let augmented = catalog.augment(secondary(), GeofenceMap::new());
        assert!(augmented.is_augmented());
        assert!(!catalog.is_augmented());
        assert!(augmented.shares_baseline(&catalog));

        let query = tags(&[("amenity", "restaurant"), ("brand", "Pizza Hut"), ("cuisine", "pizza")]);
        let location = GeoContext::unknown();
        let baseline_hit = augmented.best_match(&query, Geometry::Point, &location, false);
        let brand_hit = augmented.best_match(&query, Geometry::Point, &location, true);
        assert_eq!(
            baseline_hit.map(|f| f.id.clone()).as_deref(),
            Some("amenity/restaurant/pizza")
        );
        assert_eq!(
            brand_hit.map(|f| f.id.clone()).as_deref(),
            Some("brands/amenity/restaurant/pizza_hut")
        );
        assert_eq!(
            catalog
                .best_match(&query, Geometry::Point, &location, true)
                .map(|f| f.id.clone())
                .as_deref(),
            Some("amenity/restaurant/pizza")
        );
    }

    #[rstest]
    fn search_covers_secondary(catalog: CatalogSnapshot) {
        let augmented = catalog.augment(secondary(), GeofenceMap::new());
        let hits = augmented.search(Some("pizza hut"), Geometry::Point, &GeoContext::unknown());
        assert_eq!(hits.len(), 1);
        assert!(augmented.feature("brands/amenity/restaurant/pizza_hut").is_some());
    }

    #[rstest]
    fn address_format_falls_back_to_default() {
        let parts = CatalogParts {
            language: "en".to_owned(),
            address_formats: vec![
                AddressFormat {
                    country_codes: Vec::new(),
                    format: vec![vec!["street".to_owned()]],
                },
                AddressFormat {
                    country_codes: vec!["gb".to_owned()],
                    format: vec![vec!["housename".to_owned()]],
                },
            ],
            ..CatalogParts::default()
        };
        let snapshot = CatalogSnapshot::new(BaselineCatalog::new(parts));
        let gb = snapshot.address_format_for(Some("GB")).expect("format for gb");
        assert_eq!(gb.country_codes, ["gb"]);
        let fallback = snapshot.address_format_for(Some("fr")).expect("default format");
        assert!(fallback.is_default());
        assert!(snapshot.address_format_for(None).is_some_and(AddressFormat::is_default));
    }

    #[rstest]
    fn defaults_and_categories_resolve_known_ids() {
        let features = feature_map([feature("building", &[("building", "*")])]);
        let category = Category {
            id: "category-building".to_owned(),
            name: "Building".to_owned(),
            icon: None,
            geometry: [Geometry::Area].into_iter().collect(),
            members: vec!["building".to_owned(), "building/missing".to_owned()],
        };
        let parts = CatalogParts {
            language: "en".to_owned(),
            features,
            categories: BTreeMap::from([(category.id.clone(), category)]),
            defaults: BTreeMap::from([(
                Geometry::Area,
                vec![
                    "category-building".to_owned(),
                    "building".to_owned(),
                    "nonexistent".to_owned(),
                ],
            )]),
            ..CatalogParts::default()
        };
        let snapshot = CatalogSnapshot::new(BaselineCatalog::new(parts));

        let members = snapshot.category_features("category-building");
        assert_eq!(members.len(), 1);
        let defaults = snapshot.defaults_for(Geometry::Area);
        assert!(matches!(defaults.as_slice(), [DefaultEntry::Category(_), DefaultEntry::Feature(_)]));
        assert!(snapshot.defaults_for(Geometry::Point).is_empty());
        assert_eq!(snapshot.locale_strings(), &LocaleStrings::default());
    }
}
