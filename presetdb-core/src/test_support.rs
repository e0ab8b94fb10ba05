//! Builders for small in-memory catalogs used by unit and behaviour tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::{
    BaselineCatalog, CatalogParts, CatalogSnapshot, Feature, FeatureMap, FeatureSource, Geometry,
    Tags,
};

/// Build a tag map from string pairs.
pub fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

/// Baseline feature applying to every geometry class, named after its id.
pub fn feature(id: &str, pairs: &[(&str, &str)]) -> Feature {
    Feature {
        id: id.to_owned(),
        source: FeatureSource::Baseline,
        name: id.to_owned(),
        geometry: Geometry::ALL.into_iter().collect::<BTreeSet<_>>(),
        tags: tags(pairs),
        add_tags: Tags::new(),
        terms: Vec::new(),
        aliases: Vec::new(),
        searchable: true,
        match_score: 1.0,
        location_set: None,
        fields: Vec::new(),
        more_fields: Vec::new(),
        icon: None,
    }
}

/// Secondary (brand) feature applying to every geometry class.
pub fn brand(id: &str, name: &str, pairs: &[(&str, &str)]) -> Feature {
    Feature {
        source: FeatureSource::Secondary,
        name: name.to_owned(),
        ..feature(id, pairs)
    }
}

/// Collect features into a map keyed by identifier.
pub fn feature_map(features: impl IntoIterator<Item = Feature>) -> FeatureMap {
    features
        .into_iter()
        .map(|feature| (feature.id.clone(), Arc::new(feature)))
        .collect()
}

/// Snapshot over `features` with no supporting catalogs, in English.
pub fn snapshot(features: impl IntoIterator<Item = Feature>) -> CatalogSnapshot {
    CatalogSnapshot::new(BaselineCatalog::new(CatalogParts {
        language: "en".to_owned(),
        features: feature_map(features),
        fields: BTreeMap::new(),
        categories: BTreeMap::new(),
        address_formats: Vec::new(),
        defaults: BTreeMap::new(),
    }))
}
