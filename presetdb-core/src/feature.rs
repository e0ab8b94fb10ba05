//! Presets describing categories of mapped entities.
//!
//! A [`Feature`] pairs a tag pattern with display metadata. Identifiers are
//! hierarchical paths such as `amenity/restaurant`; the parent of a feature is
//! its identifier with the last segment removed.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Document, EntityError, Geometry, LocationSet, parse};

/// Tag mapping, ordered by key.
pub type Tags = BTreeMap<String, String>;

/// Pattern value accepting any tag value.
pub const WILDCARD: &str = "*";

/// Collection a feature was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FeatureSource {
    /// The language-neutral preset catalog.
    Baseline,
    /// The optional, asynchronously loaded brand dataset.
    Secondary,
}

/// A reusable descriptor of a category of real-world entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Hierarchical identifier, unique within its source.
    pub id: String,
    /// Collection the feature belongs to.
    pub source: FeatureSource,
    /// Localized display name; falls back to the identifier.
    pub name: String,
    /// Geometry classes the feature applies to.
    pub geometry: BTreeSet<Geometry>,
    /// Tags an entity must carry to match. [`WILDCARD`] accepts any value.
    pub tags: Tags,
    /// Tags applied when the preset is chosen, beyond `tags`.
    pub add_tags: Tags,
    /// Localized search terms.
    pub terms: Vec<String>,
    /// Localized alternative names.
    pub aliases: Vec<String>,
    /// Whether the feature is offered in search results.
    pub searchable: bool,
    /// Multiplier applied to the tag match score.
    pub match_score: f64,
    /// Where the feature applies, if restricted.
    pub location_set: Option<LocationSet>,
    /// Field identifiers shown for this feature.
    pub fields: Vec<String>,
    /// Additional field identifiers offered on demand.
    pub more_fields: Vec<String>,
    /// Icon identifier.
    pub icon: Option<String>,
}

impl Feature {
    /// Convert a merged catalog entry into a feature.
    ///
    /// # Errors
    /// Returns [`EntityError`] when the entry is not an object, lacks `tags`
    /// or `geometry`, or carries values of the wrong shape.
    ///
    /// # Examples
    /// ```
    /// use std::collections::BTreeMap;
    /// use presetdb_core::{Document, Feature, FeatureSource, Geometry};
    ///
    /// let entry = Document::Object(BTreeMap::from([
    ///     ("geometry".into(), Document::from(vec![Document::from("point")])),
    ///     ("tags".into(), Document::Object(BTreeMap::from([
    ///         ("amenity".into(), Document::from("cafe")),
    ///     ]))),
    ///     ("name".into(), Document::from("Cafe")),
    /// ]));
    ///
    /// let feature = Feature::from_document("amenity/cafe", FeatureSource::Baseline, &entry)?;
    /// assert!(feature.geometry.contains(&Geometry::Point));
    /// assert_eq!(feature.parent_id(), Some("amenity"));
    /// # Ok::<(), presetdb_core::EntityError>(())
    /// ```
    pub fn from_document(
        id: &str,
        source: FeatureSource,
        document: &Document,
    ) -> Result<Self, EntityError> {
        let map = parse::object(document)?;
        if !map.contains_key("tags") {
            return Err(EntityError::MissingField { field: "tags" });
        }
        if !map.contains_key("geometry") {
            return Err(EntityError::MissingField { field: "geometry" });
        }
        let location_set = match map.get("locationSet") {
            None | Some(Document::Null) => None,
            Some(set) => Some(LocationSet::from_document(set)?),
        };
        Ok(Self {
            id: id.to_owned(),
            source,
            name: parse::optional_string(map, "name")?.unwrap_or_else(|| id.to_owned()),
            geometry: parse::geometry_set(map, "geometry")?,
            tags: parse::string_map(map, "tags")?,
            add_tags: parse::string_map(map, "addTags")?,
            terms: parse::string_list(map, "terms", ',')?,
            aliases: parse::string_list(map, "aliases", '\n')?,
            searchable: parse::optional_bool(map, "searchable")?.unwrap_or(true),
            match_score: parse::optional_number(map, "matchScore")?.unwrap_or(1.0),
            location_set,
            fields: parse::string_list(map, "fields", ',')?,
            more_fields: parse::string_list(map, "moreFields", ',')?,
            icon: parse::optional_string(map, "icon")?,
        })
    }

    /// Identifier of this feature's parent, if any.
    pub fn parent_id(&self) -> Option<&str> {
        parent_id(&self.id)
    }

    /// Report whether the feature applies to `geometry`.
    pub fn allows_geometry(&self, geometry: Geometry) -> bool {
        self.geometry.contains(&geometry)
    }
}

/// Strip the last `/`-delimited segment from `id`.
///
/// # Examples
/// ```
/// use presetdb_core::parent_id;
///
/// assert_eq!(parent_id("amenity/restaurant"), Some("amenity"));
/// assert_eq!(parent_id("amenity"), None);
/// ```
pub fn parent_id(id: &str) -> Option<&str> {
    id.rsplit_once('/').map(|(parent, _)| parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentMap;
    use rstest::{fixture, rstest};

    #[fixture]
    fn restaurant() -> DocumentMap {
        DocumentMap::from([
            (
                "geometry".to_owned(),
                Document::from(vec![Document::from("point"), Document::from("area")]),
            ),
            (
                "tags".to_owned(),
                Document::Object(DocumentMap::from([(
                    "amenity".to_owned(),
                    Document::from("restaurant"),
                )])),
            ),
            (
                "fields".to_owned(),
                Document::from(vec![Document::from("name"), Document::from("cuisine")]),
            ),
        ])
    }

    #[rstest]
    fn defaults_apply_to_optional_keys(restaurant: DocumentMap) {
        let feature = Feature::from_document(
            "amenity/restaurant",
            FeatureSource::Baseline,
            &Document::Object(restaurant),
        )
        .expect("feature parses");
        assert_eq!(feature.name, "amenity/restaurant");
        assert!(feature.searchable);
        assert!((feature.match_score - 1.0).abs() < f64::EPSILON);
        assert!(feature.location_set.is_none());
        assert_eq!(feature.fields, ["name", "cuisine"]);
    }

    #[rstest]
    fn translated_terms_and_aliases_are_split(mut restaurant: DocumentMap) {
        restaurant.insert("terms".to_owned(), Document::from("diner,eatery"));
        restaurant.insert("aliases".to_owned(), Document::from("Eatery\nBistro"));
        let feature = Feature::from_document(
            "amenity/restaurant",
            FeatureSource::Baseline,
            &Document::Object(restaurant),
        )
        .expect("feature parses");
        assert_eq!(feature.terms, ["diner", "eatery"]);
        assert_eq!(feature.aliases, ["Eatery", "Bistro"]);
    }

    #[rstest]
    #[case("tags")]
    #[case("geometry")]
    fn required_keys_are_enforced(mut restaurant: DocumentMap, #[case] field: &'static str) {
        restaurant.remove(field);
        let result = Feature::from_document(
            "amenity/restaurant",
            FeatureSource::Baseline,
            &Document::Object(restaurant),
        );
        assert_eq!(result, Err(EntityError::MissingField { field }));
    }

    #[rstest]
    fn non_object_entries_are_rejected() {
        let result = Feature::from_document("x", FeatureSource::Secondary, &Document::from(1.0));
        assert_eq!(result, Err(EntityError::NotAnObject { found: "number" }));
    }

    #[rstest]
    #[case("a/b/c", Some("a/b"))]
    #[case("a/b", Some("a"))]
    #[case("a", None)]
    fn parent_strips_last_segment(#[case] id: &str, #[case] expected: Option<&str>) {
        assert_eq!(parent_id(id), expected);
    }
}
