//! Core domain model for the presetdb catalog engine.
//!
//! The crate is pure: it converts already-parsed documents into typed
//! presets, builds the tag index and answers matching, search and
//! inheritance queries against an immutable [`CatalogSnapshot`]. Loading
//! documents and publishing snapshots live in `presetdb-data`.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use presetdb_core::{Document, merge};
//!
//! let base = Document::Object(BTreeMap::from([("name".into(), Document::from("Cafe"))]));
//! let overlay = Document::Object(BTreeMap::from([("name".into(), Document::from("Café"))]));
//! let merged = merge(base, Some(&overlay));
//! assert_eq!(merged.get("name").and_then(Document::as_str), Some("Café"));
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod catalog;
mod document;
mod error;
mod feature;
mod geofence;
mod geometry;
mod index;
mod matching;
pub(crate) mod parse;
mod search;
mod snapshot;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use catalog::{AddressFormat, Category, Field, LocaleStrings};
pub use document::{Document, DocumentMap, OPTIONS_KEY, STRINGS_KEY, merge};
pub use error::EntityError;
pub use feature::{Feature, FeatureSource, Tags, WILDCARD, parent_id};
pub use geofence::{
    DEFAULT_CIRCLE_RADIUS_KM, GeoContext, GeofenceMap, GeofenceRegion, LocationRef, LocationSet,
    REGION_SUFFIX, WORLD_CODE,
};
pub use geometry::Geometry;
pub use index::{CATCH_ALL_KEY, FeatureMap, TagIndex, significant_keys};
pub use matching::{MatchWeights, WeightsError, best_match, match_score};
pub use search::{rank, search, search_score};
pub use snapshot::{BaselineCatalog, CatalogParts, CatalogSnapshot, DefaultEntry};
