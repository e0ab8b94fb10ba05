//! Build the baseline catalog from provider documents.
//!
//! Each baseline document is overlaid entry by entry with the matching
//! section of the translation document, then converted into typed entities.
//! Malformed entries are logged and skipped; a missing or wrongly shaped
//! baseline document aborts the load.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, info, warn};
use presetdb_core::{
    AddressFormat, BaselineCatalog, CatalogParts, Category, Document, DocumentMap, EntityError,
    Feature, FeatureMap, FeatureSource, Field, Geometry, WeightsError, merge,
};
use thiserror::Error;

use crate::{AugmentError, CatalogSources, DocumentProvider, ProviderError};

/// Errors that prevent a baseline catalog from loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required document could not be fetched.
    #[error("failed to load catalog document `{name}`")]
    Document {
        /// Logical document name.
        name: String,
        /// Provider failure.
        #[source]
        source: ProviderError,
    },
    /// A required document had the wrong top-level shape.
    #[error("catalog document `{name}` must be {expected}")]
    Shape {
        /// Logical document name.
        name: String,
        /// Accepted shape.
        expected: &'static str,
    },
    /// The configured match weights are inconsistent.
    #[error("invalid match weights")]
    Weights {
        /// Validation failure.
        #[source]
        source: WeightsError,
    },
    /// The catalog loaded but its augmentation worker could not start.
    #[error("failed to start catalog augmentation")]
    Augmentation {
        /// Spawn failure.
        #[source]
        source: AugmentError,
    },
}

/// Translation sections for one language.
struct Overlay {
    sections: Option<Document>,
}

impl Overlay {
    fn fetch(provider: &dyn DocumentProvider, sources: &CatalogSources, language: &str) -> Self {
        let name = sources.translation(language);
        let sections = match provider.fetch(&name) {
            Ok(document) => {
                let sections = document.get(language).and_then(|lang| lang.get("presets"));
                if sections.is_none() {
                    warn!("translation `{name}` has no `{language}.presets` section");
                }
                sections.cloned()
            }
            Err(err) => {
                warn!("loading catalog without translations: {err}");
                None
            }
        };
        Self { sections }
    }

    fn entry(&self, section: &str, id: &str) -> Option<&Document> {
        self.sections
            .as_ref()
            .and_then(|sections| sections.get(section))
            .and_then(|entries| entries.get(id))
    }
}

/// Running count of skipped entries, reported in the load summary.
#[derive(Default)]
struct Skipped(usize);

impl Skipped {
    fn record(&mut self, kind: &str, id: &str, err: &EntityError) {
        warn!("skipping {kind} `{id}`: {err}");
        self.0 += 1;
    }
}

fn fetch_object(
    provider: &dyn DocumentProvider,
    name: &str,
) -> Result<DocumentMap, CatalogError> {
    match fetch(provider, name)? {
        Document::Object(map) => Ok(map),
        _ => Err(CatalogError::Shape {
            name: name.to_owned(),
            expected: "an object",
        }),
    }
}

fn fetch(provider: &dyn DocumentProvider, name: &str) -> Result<Document, CatalogError> {
    provider
        .fetch(name)
        .map_err(|source| CatalogError::Document {
            name: name.to_owned(),
            source,
        })
}

/// Convert every entry of a keyed document, overlaying its translation.
fn convert_entries<T>(
    entries: DocumentMap,
    overlay: &Overlay,
    section: &str,
    skipped: &mut Skipped,
    convert: impl Fn(&str, &Document) -> Result<T, EntityError>,
) -> BTreeMap<String, T> {
    entries
        .into_iter()
        .filter_map(|(id, entry)| {
            let merged = merge(entry, overlay.entry(section, &id));
            match convert(&id, &merged) {
                Ok(value) => Some((id, value)),
                Err(err) => {
                    skipped.record(section, &id, &err);
                    None
                }
            }
        })
        .collect()
}

/// Convert the per-geometry defaults, letting a translated list replace the
/// baseline one.
fn convert_defaults(
    entries: DocumentMap,
    overlay: &Overlay,
    skipped: &mut Skipped,
) -> BTreeMap<Geometry, Vec<String>> {
    let mut defaults = BTreeMap::new();
    for (name, list) in entries {
        let list = merge(list, overlay.entry("defaults", &name));
        let Ok(geometry) = Geometry::from_str(&name) else {
            skipped.record(
                "defaults",
                &name,
                &EntityError::UnknownGeometry { name: name.clone() },
            );
            continue;
        };
        let ids = match list.as_array() {
            Some(items) => items
                .iter()
                .filter_map(Document::as_str)
                .map(str::to_owned)
                .collect(),
            None => {
                skipped.record(
                    "defaults",
                    &name,
                    &EntityError::WrongType {
                        field: "defaults",
                        expected: "a list of identifiers",
                    },
                );
                continue;
            }
        };
        defaults.insert(geometry, ids);
    }
    defaults
}

/// Load and index the baseline catalog for `language`.
///
/// A missing translation is not fatal: the catalog loads with its
/// language-neutral strings.
///
/// # Errors
/// Returns [`CatalogError`] when a baseline document is missing,
/// unparseable or not of the expected shape.
///
/// # Examples
/// ```
/// use presetdb_core::Document;
/// use presetdb_data::{CatalogSources, MemoryProvider, load_baseline};
/// use serde_json::json;
///
/// let provider = MemoryProvider::new()
///     .with_document("presets.json", Document::from(json!({
///         "amenity/cafe": {"geometry": ["point"], "tags": {"amenity": "cafe"}}
///     })))
///     .with_document("fields.json", Document::from(json!({})))
///     .with_document("preset_categories.json", Document::from(json!({})))
///     .with_document("address_formats.json", Document::from(json!([])))
///     .with_document("preset_defaults.json", Document::from(json!({})));
///
/// let baseline = load_baseline(&provider, &CatalogSources::default(), "en")?;
/// assert_eq!(baseline.features().len(), 1);
/// # Ok::<(), presetdb_data::CatalogError>(())
/// ```
pub fn load_baseline(
    provider: &dyn DocumentProvider,
    sources: &CatalogSources,
    language: &str,
) -> Result<BaselineCatalog, CatalogError> {
    let presets = fetch_object(provider, &sources.presets)?;
    let fields = fetch_object(provider, &sources.fields)?;
    let categories = fetch_object(provider, &sources.categories)?;
    let defaults = fetch_object(provider, &sources.defaults)?;
    let Document::Array(formats) = fetch(provider, &sources.address_formats)? else {
        return Err(CatalogError::Shape {
            name: sources.address_formats.clone(),
            expected: "a list",
        });
    };
    let overlay = Overlay::fetch(provider, sources, language);
    let mut skipped = Skipped::default();

    let features: FeatureMap = convert_entries(presets, &overlay, "presets", &mut skipped, |id, doc| {
        Feature::from_document(id, FeatureSource::Baseline, doc).map(Arc::new)
    });
    let fields = convert_entries(fields, &overlay, "fields", &mut skipped, Field::from_document);
    let categories = convert_entries(
        categories,
        &overlay,
        "categories",
        &mut skipped,
        Category::from_document,
    );
    let address_formats: Vec<AddressFormat> = formats
        .iter()
        .enumerate()
        .filter_map(|(position, entry)| match AddressFormat::from_document(entry) {
            Ok(format) => Some(format),
            Err(err) => {
                skipped.record("address format", &position.to_string(), &err);
                None
            }
        })
        .collect();
    let defaults = convert_defaults(defaults, &overlay, &mut skipped);

    info!(
        "loaded {} presets, {} fields, {} categories and {} address formats for `{language}` ({} entries skipped)",
        features.len(),
        fields.len(),
        categories.len(),
        address_formats.len(),
        skipped.0,
    );
    let baseline = BaselineCatalog::new(CatalogParts {
        language: language.to_owned(),
        features,
        fields,
        categories,
        address_formats,
        defaults,
    });
    debug!(
        "baseline index holds {} entries across {} significant keys",
        baseline.index().len(),
        baseline.significant_keys().len()
    );
    Ok(baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::baseline_provider;
    use crate::MemoryProvider;
    use presetdb_core::DefaultEntry;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn translations_populate_names_and_option_strings() {
        let provider = baseline_provider();
        let baseline = load_baseline(&provider, &CatalogSources::default(), "de").expect("load");
        let restaurant = baseline
            .features()
            .get("amenity/restaurant")
            .expect("restaurant preset");
        assert_eq!(restaurant.name, "Restaurant (de)");
        assert_eq!(restaurant.terms, ["Gaststätte", "Speiselokal"]);

        let snapshot = presetdb_core::CatalogSnapshot::new(baseline);
        assert_eq!(snapshot.locale_strings().yes, "Ja");
        assert_eq!(snapshot.locale_strings().unknown, "unbekannt");
        let field = snapshot.field("internet_access").expect("field");
        assert_eq!(field.option_label("wlan"), "WLAN");
        assert_eq!(field.options, ["yes", "no", "wlan"]);
    }

    #[rstest]
    fn missing_translation_falls_back_to_baseline_strings() {
        let provider = baseline_provider();
        let baseline = load_baseline(&provider, &CatalogSources::default(), "fr").expect("load");
        let restaurant = baseline
            .features()
            .get("amenity/restaurant")
            .expect("restaurant preset");
        assert_eq!(restaurant.name, "Restaurant");
        assert_eq!(baseline.language(), "fr");
    }

    #[rstest]
    fn malformed_entries_are_skipped() {
        let provider = baseline_provider().with_document(
            "presets.json",
            Document::from(json!({
                "amenity": {"geometry": ["point"], "tags": {"amenity": "*"}},
                "broken/no_tags": {"geometry": ["point"]},
                "broken/bad_geometry": {"geometry": ["blob"], "tags": {"x": "y"}}
            })),
        );
        let baseline = load_baseline(&provider, &CatalogSources::default(), "en").expect("load");
        let ids: Vec<&str> = baseline.features().keys().map(String::as_str).collect();
        assert_eq!(ids, ["amenity"]);
    }

    #[rstest]
    fn defaults_are_keyed_by_geometry() {
        let provider = baseline_provider();
        let baseline = load_baseline(&provider, &CatalogSources::default(), "en").expect("load");
        let snapshot = presetdb_core::CatalogSnapshot::new(baseline);
        assert_eq!(snapshot.defaults_for(Geometry::Point).len(), 2);
        assert!(snapshot.defaults_for(Geometry::Relation).is_empty());
    }

    #[rstest]
    fn translated_defaults_replace_baseline_lists() {
        let provider = baseline_provider().with_document(
            "translations/fr.json",
            Document::from(json!({
                "fr": {"presets": {
                    "defaults": {"point": ["amenity/restaurant/pizza"]}
                }}
            })),
        );
        let baseline = load_baseline(&provider, &CatalogSources::default(), "fr").expect("load");
        let snapshot = presetdb_core::CatalogSnapshot::new(baseline);
        let point: Vec<&str> = snapshot
            .defaults_for(Geometry::Point)
            .into_iter()
            .map(|entry| match entry {
                DefaultEntry::Feature(feature) => feature.id.as_str(),
                DefaultEntry::Category(category) => category.id.as_str(),
            })
            .collect();
        assert_eq!(point, ["amenity/restaurant/pizza"]);
        assert_eq!(snapshot.defaults_for(Geometry::Area).len(), 1);
    }

    #[rstest]
    #[case("presets.json")]
    #[case("fields.json")]
    #[case("address_formats.json")]
    fn missing_baseline_documents_are_fatal(#[case] name: &str) {
        let sources = CatalogSources::default();
        let mut provider = MemoryProvider::new();
        for other in [
            "presets.json",
            "fields.json",
            "preset_categories.json",
            "address_formats.json",
            "preset_defaults.json",
        ]
        .into_iter()
        .filter(|other| *other != name)
        {
            let empty = if other == "address_formats.json" {
                json!([])
            } else {
                json!({})
            };
            provider.insert(other, Document::from(empty));
        }
        let err = load_baseline(&provider, &sources, "en").expect_err("load should fail");
        assert!(matches!(
            err,
            CatalogError::Document { name: failed, source: ProviderError::NotFound { .. } }
                if failed == name
        ));
    }

    #[rstest]
    fn wrongly_shaped_documents_are_fatal() {
        let provider = baseline_provider().with_document("presets.json", Document::from(json!([])));
        let err = load_baseline(&provider, &CatalogSources::default(), "en").expect_err("fail");
        assert!(matches!(err, CatalogError::Shape { expected: "an object", .. }));
    }
}
