//! Loading and publishing for the presetdb catalog engine.
//!
//! Responsibilities:
//! - Define the [`DocumentProvider`] boundary and its file and memory
//!   adapters.
//! - Build baseline catalogs from provider documents.
//! - Load the secondary dataset in the background and publish augmented
//!   snapshots.
//! - Own the published snapshot through [`PresetCatalog`].
//!
//! Boundaries:
//! - Do not encode matching or search rules (live in `presetdb-core`).
//! - Never block queries on document I/O.
//!
//! Invariants:
//! - A published snapshot is never mutated; writers replace it atomically.
//! - No global mutable state.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod augment;
mod catalog;
mod loader;
mod provider;
mod sources;
mod values;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use augment::{
    AugmentError, AugmentOutcome, AugmentationHandle, augment_and_publish, load_secondary,
    spawn_augmentation,
};
pub use catalog::PresetCatalog;
pub use loader::{CatalogError, load_baseline};
pub use provider::{DirectoryProvider, DocumentProvider, MemoryProvider, ProviderError};
pub use sources::{CatalogSources, DEFAULT_TRANSLATIONS_DIR};
pub use values::{
    DEFAULT_CACHED_KEYS, KnownValuesSource, LookupUnavailable, TagValueCache, suggest_values,
};
