//! Select the preset that best describes an entity's tags.
//!
//! Every feature filed under one of the entity's keys (or the catch-all key)
//! is scored. A feature requiring more satisfied keys outranks one requiring
//! a subset of them; among equal key counts, [`MatchWeights::exact`] credits
//! for equal values beat [`MatchWeights::wildcard`] credits. Non-searchable
//! features are scaled by [`MatchWeights::non_searchable_penalty`] so that a
//! searchable feature wins a tie.

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use crate::{CATCH_ALL_KEY, Feature, GeoContext, GeofenceMap, Geometry, TagIndex, Tags, WILDCARD};

/// Tunable credits used by [`match_score`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchWeights {
    /// Credit for a required key whose value matches exactly.
    pub exact: f64,
    /// Credit for a required key matched by a wildcard.
    pub wildcard: f64,
    /// Multiplier applied to non-searchable features.
    pub non_searchable_penalty: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            exact: 2.0,
            wildcard: 1.0,
            non_searchable_penalty: 0.999,
        }
    }
}

/// Errors returned by [`MatchWeights::validate`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WeightsError {
    /// A credit was not finite and positive.
    #[error("match credits must be finite and positive")]
    NonPositiveCredit,
    /// The exact credit did not exceed the wildcard credit.
    #[error("exact match credit must exceed wildcard credit")]
    ExactNotAboveWildcard,
    /// The penalty was outside the open interval `(0, 1)`.
    #[error("non-searchable penalty must lie strictly between 0 and 1")]
    PenaltyOutOfRange,
}

impl MatchWeights {
    /// Replace the exact-value credit.
    ///
    /// # Examples
    /// ```
    /// use presetdb_core::MatchWeights;
    ///
    /// let weights = MatchWeights::default().with_exact(3.0);
    /// assert_eq!(weights.exact, 3.0);
    /// assert!(weights.validate().is_ok());
    /// ```
    #[must_use]
    pub const fn with_exact(mut self, exact: f64) -> Self {
        self.exact = exact;
        self
    }

    /// Replace the wildcard credit.
    #[must_use]
    pub const fn with_wildcard(mut self, wildcard: f64) -> Self {
        self.wildcard = wildcard;
        self
    }

    /// Replace the multiplier applied to non-searchable features.
    #[must_use]
    pub const fn with_non_searchable_penalty(mut self, penalty: f64) -> Self {
        self.non_searchable_penalty = penalty;
        self
    }

    /// Validate the weights and return a copy.
    ///
    /// # Errors
    /// Returns [`WeightsError`] when a credit is not finite and positive,
    /// when `exact <= wildcard`, or when the penalty is outside `(0, 1)`.
    pub fn validate(self) -> Result<Self, WeightsError> {
        let positive = |value: f64| value.is_finite() && value > 0.0;
        if !positive(self.exact) || !positive(self.wildcard) {
            return Err(WeightsError::NonPositiveCredit);
        }
        if self.exact <= self.wildcard {
            return Err(WeightsError::ExactNotAboveWildcard);
        }
        if !(self.non_searchable_penalty > 0.0 && self.non_searchable_penalty < 1.0) {
            return Err(WeightsError::PenaltyOutOfRange);
        }
        Ok(self)
    }
}

/// Score how well `feature` describes an entity with `tags`.
///
/// The number of satisfied required keys dominates the score. Exact and
/// wildcard credits only rank features that require the same number of keys.
///
/// Returns `0.0` when the feature is disqualified: wrong geometry, outside
/// its location set, a required key missing or a required value different.
/// Features without tags never match.
pub fn match_score(
    feature: &Feature,
    tags: &Tags,
    geometry: Geometry,
    location: &GeoContext,
    regions: &GeofenceMap,
    weights: &MatchWeights,
) -> f64 {
    if feature.tags.is_empty() || !feature.allows_geometry(geometry) {
        return 0.0;
    }
    if let Some(set) = &feature.location_set
        && !set.includes(location, regions)
    {
        return 0.0;
    }
    let mut satisfied = 0.0;
    let mut credits = 0.0;
    for (key, required) in &feature.tags {
        let Some(value) = tags.get(key) else {
            return 0.0;
        };
        if required == WILDCARD {
            credits += weights.wildcard;
        } else if required == value {
            credits += weights.exact;
        } else {
            return 0.0;
        }
        satisfied += 1.0;
    }
    // The credit ratio lies in [wildcard / exact, 1], so it orders features
    // requiring the same number of keys without overtaking an extra key.
    let specificity = satisfied + credits / (satisfied * weights.exact);
    let score = specificity * feature.match_score;
    if feature.searchable {
        score
    } else {
        score * weights.non_searchable_penalty
    }
}

/// Find the highest-scoring feature in `index` for an entity.
///
/// Keys are visited in lexicographic order followed by bucket order; the
/// first feature to reach the maximum wins, so results are repeatable for a
/// given index. Empty `tags` yield `None`.
pub fn best_match<'a>(
    index: &'a TagIndex,
    tags: &Tags,
    geometry: Geometry,
    location: &GeoContext,
    regions: &GeofenceMap,
    weights: &MatchWeights,
) -> Option<&'a Arc<Feature>> {
    if tags.is_empty() {
        return None;
    }
    let keys: BTreeSet<&str> = tags
        .keys()
        .map(String::as_str)
        .chain(std::iter::once(CATCH_ALL_KEY))
        .collect();

    let mut best: Option<&Arc<Feature>> = None;
    let mut best_score = 0.0;
    for feature in keys.into_iter().flat_map(|key| index.bucket(key)) {
        let score = match_score(feature, tags, geometry, location, regions, weights);
        if score > best_score {
            best_score = score;
            best = Some(feature);
        }
    }
    best
}
