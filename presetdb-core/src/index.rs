//! Inverted index from tag key to candidate features.
//!
//! Only *significant* keys get their own bucket: the first path segment of
//! every baseline feature identifier. Features whose tags mention none of
//! them land in the catch-all bucket under the empty key. The index has no
//! incremental update path; augmentation rebuilds it in full.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::Feature;

/// Features keyed by identifier.
pub type FeatureMap = BTreeMap<String, Arc<Feature>>;

/// Key of the bucket holding features with no significant tag key.
pub const CATCH_ALL_KEY: &str = "";

/// Derive the significant keys from the baseline collection.
///
/// # Examples
/// ```
/// use presetdb_core::{FeatureMap, significant_keys};
///
/// assert!(significant_keys(&FeatureMap::new()).is_empty());
/// ```
pub fn significant_keys(baseline: &FeatureMap) -> BTreeSet<String> {
    baseline
        .keys()
        .filter_map(|id| id.split('/').next())
        .map(str::to_owned)
        .collect()
}

/// Mapping from tag key to the features that may match an entity carrying it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagIndex {
    buckets: BTreeMap<String, Vec<Arc<Feature>>>,
}

impl TagIndex {
    /// Index every feature of every collection.
    ///
    /// Collections are visited in the order given and features in identifier
    /// order, so bucket contents are deterministic.
    pub fn build(collections: &[&FeatureMap], significant_keys: &BTreeSet<String>) -> Self {
        let mut buckets: BTreeMap<String, Vec<Arc<Feature>>> = BTreeMap::new();
        for feature in collections.iter().flat_map(|collection| collection.values()) {
            let mut added = false;
            for key in feature.tags.keys() {
                if significant_keys.contains(key) {
                    buckets
                        .entry(key.clone())
                        .or_default()
                        .push(Arc::clone(feature));
                    added = true;
                }
            }
            if !added {
                buckets
                    .entry(CATCH_ALL_KEY.to_owned())
                    .or_default()
                    .push(Arc::clone(feature));
            }
        }
        Self { buckets }
    }

    /// Features filed under `key`, in insertion order.
    pub fn bucket(&self, key: &str) -> &[Arc<Feature>] {
        self.buckets
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Bucket keys in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Total number of bucket entries; a feature may be counted more than once.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Report whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::feature;
    use rstest::{fixture, rstest};

    fn collection(features: impl IntoIterator<Item = Feature>) -> FeatureMap {
        features
            .into_iter()
            .map(|feature| (feature.id.clone(), Arc::new(feature)))
            .collect()
    }

    #[fixture]
    fn baseline() -> FeatureMap {
        collection([
            feature("amenity/restaurant", &[("amenity", "restaurant")]),
            feature("shop/bakery", &[("shop", "bakery")]),
            feature("point", &[]),
            feature("craft", &[("craft", "*")]),
        ])
    }

    #[rstest]
    fn significant_keys_use_first_segment(baseline: FeatureMap) {
        let keys = significant_keys(&baseline);
        let expected: BTreeSet<String> = ["amenity", "craft", "point", "shop"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(keys, expected);
    }

    #[rstest]
    fn features_without_significant_keys_use_catch_all(baseline: FeatureMap) {
        let index = TagIndex::build(&[&baseline], &significant_keys(&baseline));
        let catch_all: Vec<&str> = index
            .bucket(CATCH_ALL_KEY)
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(catch_all, ["point"]);
        assert_eq!(index.bucket("amenity").len(), 1);
        assert!(index.bucket("cuisine").is_empty());
    }

    #[rstest]
    fn secondary_features_use_baseline_keys(baseline: FeatureMap) {
        let secondary = collection([
            feature("brands/amenity/pizza_hut", &[("amenity", "restaurant"), ("brand", "Pizza Hut")]),
            feature("brands/office/acme", &[("office", "company")]),
        ]);
        let index = TagIndex::build(&[&baseline, &secondary], &significant_keys(&baseline));

        let amenity: Vec<&str> = index.bucket("amenity").iter().map(|f| f.id.as_str()).collect();
        assert_eq!(amenity, ["amenity/restaurant", "brands/amenity/pizza_hut"]);
        assert!(index.bucket("brand").is_empty());
        assert!(index.bucket("office").is_empty());
        assert!(
            index
                .bucket(CATCH_ALL_KEY)
                .iter()
                .any(|f| f.id == "brands/office/acme")
        );
    }

    #[rstest]
    fn multi_key_features_appear_in_each_bucket() {
        let baseline = collection([
            feature("amenity/fuel", &[("amenity", "fuel")]),
            feature("shop/convenience", &[("shop", "convenience")]),
            feature("amenity/fuel/shop", &[("amenity", "fuel"), ("shop", "convenience")]),
        ]);
        let index = TagIndex::build(&[&baseline], &significant_keys(&baseline));
        assert_eq!(index.bucket("amenity").len(), 2);
        assert_eq!(index.bucket("shop").len(), 2);
        assert_eq!(index.len(), 4);
    }
}
