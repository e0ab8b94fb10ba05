//! Free-text search over feature names, terms, aliases and tag values.

use std::sync::Arc;

use crate::{Feature, GeoContext, GeofenceMap, Geometry, WILDCARD};

const NAME_PREFIX: u32 = 1000;
const NAME_SUBSTRING: u32 = 800;
const TERM_PREFIX: u32 = 600;
const TERM_SUBSTRING: u32 = 400;
const TAG_VALUE_PREFIX: u32 = 300;
const TAG_VALUE_SUBSTRING: u32 = 200;
const MAX_POSITION_PENALTY: u32 = 99;

/// Score `feature` against a lowercase, trimmed `needle`.
///
/// The best tier wins: name prefix, name substring, term or alias prefix,
/// term or alias substring, tag value prefix, tag value substring. Substring
/// tiers lose one point per character of offset, up to 99. Returns `0` when
/// nothing matches.
pub fn search_score(feature: &Feature, needle: &str) -> u32 {
    if needle.is_empty() {
        return 0;
    }
    let name = text_score(&feature.name, needle, NAME_PREFIX, NAME_SUBSTRING);
    let terms = feature
        .terms
        .iter()
        .chain(&feature.aliases)
        .map(|text| text_score(text, needle, TERM_PREFIX, TERM_SUBSTRING));
    let values = feature
        .tags
        .values()
        .filter(|value| value.as_str() != WILDCARD)
        .map(|value| text_score(value, needle, TAG_VALUE_PREFIX, TAG_VALUE_SUBSTRING));
    std::iter::once(name)
        .chain(terms)
        .chain(values)
        .max()
        .unwrap_or(0)
}

fn text_score(haystack: &str, needle: &str, prefix: u32, substring: u32) -> u32 {
    let haystack = haystack.to_lowercase();
    match haystack.find(needle) {
        Some(0) => prefix,
        Some(offset) => {
            let position = haystack[..offset].chars().count();
            let penalty = u32::try_from(position)
                .unwrap_or(MAX_POSITION_PENALTY)
                .min(MAX_POSITION_PENALTY);
            substring - penalty
        }
        None => 0,
    }
}

/// Score every eligible feature against `query`.
///
/// Features are skipped when non-searchable, inapplicable to `geometry` or
/// outside their location set. Zero scores are omitted. An absent or blank
/// query yields an empty list. Result order follows `features`; use [`rank`]
/// to sort.
pub fn search<'a>(
    features: impl IntoIterator<Item = &'a Arc<Feature>>,
    query: Option<&str>,
    geometry: Geometry,
    location: &GeoContext,
    regions: &GeofenceMap,
) -> Vec<(Arc<Feature>, u32)> {
    let Some(needle) = query
        .map(|query| query.trim().to_lowercase())
        .filter(|needle| !needle.is_empty())
    else {
        return Vec::new();
    };
    features
        .into_iter()
        .filter(|feature| feature.searchable && feature.allows_geometry(geometry))
        .filter(|feature| {
            feature
                .location_set
                .as_ref()
                .is_none_or(|set| set.includes(location, regions))
        })
        .filter_map(|feature| {
            let score = search_score(feature, &needle);
            (score > 0).then(|| (Arc::clone(feature), score))
        })
        .collect()
}

/// Sort results by descending score, breaking ties by identifier.
pub fn rank(results: &mut [(Arc<Feature>, u32)]) {
    results.sort_by(|(left, left_score), (right, right_score)| {
        right_score
            .cmp(left_score)
            .then_with(|| left.id.cmp(&right.id))
    });
}
