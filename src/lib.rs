//! Facade crate for the presetdb catalog engine.
//!
//! This crate re-exports the core domain types together with the catalog
//! loading and publishing layer.

#![forbid(unsafe_code)]

pub use presetdb_core::{
    AddressFormat, BaselineCatalog, CatalogSnapshot, Category, DefaultEntry, Document, EntityError,
    Feature, FeatureSource, Field, GeoContext, Geometry, LocaleStrings, LocationSet, MatchWeights,
    Tags, WeightsError, merge,
};

pub use presetdb_data::{
    AugmentError, AugmentOutcome, AugmentationHandle, CatalogError, CatalogSources,
    DirectoryProvider, DocumentProvider, KnownValuesSource, LookupUnavailable, MemoryProvider,
    PresetCatalog, ProviderError,
};
