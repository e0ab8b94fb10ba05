//! Background loading of the secondary dataset.
//!
//! The worker fetches brand presets and geofence regions, builds the
//! augmented successor of the snapshot it was spawned from and publishes it
//! with a single compare-and-swap. If the published snapshot changed in the
//! meantime (for example after a language switch) the result is dropped.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use arc_swap::ArcSwap;
use log::{debug, info, warn};
use presetdb_core::{
    CatalogSnapshot, Document, EntityError, Feature, FeatureMap, FeatureSource, GeofenceMap,
    GeofenceRegion,
};
use thiserror::Error;

use crate::{CatalogSources, DocumentProvider, ProviderError};

const WORKER_NAME: &str = "presetdb-augment";

/// Errors that abort an augmentation run.
#[derive(Debug, Error)]
pub enum AugmentError {
    /// A secondary document could not be fetched.
    #[error("failed to load secondary document `{name}`")]
    Document {
        /// Logical document name.
        name: String,
        /// Provider failure.
        #[source]
        source: ProviderError,
    },
    /// A secondary document had the wrong top-level shape.
    #[error("secondary document `{name}` must be {expected}")]
    Shape {
        /// Logical document name.
        name: String,
        /// Accepted shape.
        expected: &'static str,
    },
    /// The worker thread could not be started.
    #[error("failed to spawn augmentation worker")]
    Spawn(#[source] io::Error),
    /// The worker thread panicked.
    #[error("augmentation worker panicked")]
    WorkerPanicked,
}

/// How an augmentation run ended.
#[derive(Debug)]
pub enum AugmentOutcome {
    /// The augmented snapshot was published.
    Published,
    /// Another snapshot was published first; the result was dropped.
    Superseded,
    /// Loading failed; the baseline snapshot stays published.
    Failed(AugmentError),
}

/// Handle to an in-flight augmentation run.
#[derive(Debug)]
pub struct AugmentationHandle {
    worker: JoinHandle<AugmentOutcome>,
}

impl AugmentationHandle {
    /// Wait for the run to finish.
    pub fn join(self) -> AugmentOutcome {
        self.worker
            .join()
            .unwrap_or_else(|_| AugmentOutcome::Failed(AugmentError::WorkerPanicked))
    }

    /// Report whether the run has finished.
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }
}

/// Fetch and convert the secondary presets and geofence regions.
///
/// Malformed presets and regions are skipped with a warning.
///
/// # Errors
/// Returns [`AugmentError`] when either document is missing, unparseable or
/// of the wrong shape.
pub fn load_secondary(
    provider: &dyn DocumentProvider,
    sources: &CatalogSources,
) -> Result<(FeatureMap, GeofenceMap), AugmentError> {
    let presets = fetch(provider, &sources.secondary_presets)?;
    let entries = presets
        .get("presets")
        .and_then(Document::as_object)
        .ok_or_else(|| AugmentError::Shape {
            name: sources.secondary_presets.clone(),
            expected: "an object with a `presets` object",
        })?;
    let features: FeatureMap = entries
        .iter()
        .filter_map(
            |(id, entry)| match Feature::from_document(id, FeatureSource::Secondary, entry) {
                Ok(feature) => Some((id.clone(), Arc::new(feature))),
                Err(err) => {
                    warn!("skipping secondary preset `{id}`: {err}");
                    None
                }
            },
        )
        .collect();

    let collection = fetch(provider, &sources.geofences)?;
    let regions = collection
        .get("features")
        .and_then(Document::as_array)
        .ok_or_else(|| AugmentError::Shape {
            name: sources.geofences.clone(),
            expected: "a GeoJSON FeatureCollection",
        })?;
    let geofences: GeofenceMap = regions
        .iter()
        .enumerate()
        .filter_map(|(position, region)| {
            let Some(id) = region_id(region) else {
                warn!("skipping geofence #{position}: missing `id`");
                return None;
            };
            let converted = region
                .get("geometry")
                .ok_or(EntityError::MissingField { field: "geometry" })
                .and_then(|geometry| GeofenceRegion::from_geojson(id, geometry));
            match converted {
                Ok(region) => Some((region.id.clone(), region)),
                Err(err) => {
                    warn!("skipping geofence `{id}`: {err}");
                    None
                }
            }
        })
        .collect();

    info!(
        "loaded {} secondary presets and {} geofence regions",
        features.len(),
        geofences.len()
    );
    Ok((features, geofences))
}

fn region_id(region: &Document) -> Option<&str> {
    region
        .get("id")
        .or_else(|| region.get("properties").and_then(|props| props.get("id")))
        .and_then(Document::as_str)
}

fn fetch(provider: &dyn DocumentProvider, name: &str) -> Result<Document, AugmentError> {
    provider
        .fetch(name)
        .map_err(|source| AugmentError::Document {
            name: name.to_owned(),
            source,
        })
}

/// Load the secondary dataset and publish the augmented snapshot.
///
/// `spawned_from` must be the snapshot published in `target` when the run
/// starts. Publishing only succeeds while it is still the published one.
pub fn augment_and_publish(
    target: &ArcSwap<CatalogSnapshot>,
    spawned_from: &Arc<CatalogSnapshot>,
    provider: &dyn DocumentProvider,
    sources: &CatalogSources,
) -> AugmentOutcome {
    let (secondary, geofences) = match load_secondary(provider, sources) {
        Ok(loaded) => loaded,
        Err(err) => {
            warn!("augmentation aborted, keeping baseline catalog: {err}");
            return AugmentOutcome::Failed(err);
        }
    };
    let augmented = Arc::new(spawned_from.augment(secondary, geofences));
    debug!(
        "combined index holds {} entries",
        augmented.index(true).len()
    );
    let previous = target.compare_and_swap(spawned_from, augmented);
    if Arc::ptr_eq(&*previous, spawned_from) {
        info!(
            "published augmented catalog for `{}`",
            spawned_from.language()
        );
        AugmentOutcome::Published
    } else {
        info!(
            "dropping augmentation for superseded `{}` catalog",
            spawned_from.language()
        );
        AugmentOutcome::Superseded
    }
}

/// Run [`augment_and_publish`] on a named worker thread.
///
/// # Errors
/// Returns [`AugmentError::Spawn`] when the thread cannot be started.
pub fn spawn_augmentation(
    target: Arc<ArcSwap<CatalogSnapshot>>,
    spawned_from: Arc<CatalogSnapshot>,
    provider: Arc<dyn DocumentProvider>,
    sources: CatalogSources,
) -> Result<AugmentationHandle, AugmentError> {
    let worker = thread::Builder::new()
        .name(WORKER_NAME.to_owned())
        .spawn(move || augment_and_publish(&target, &spawned_from, provider.as_ref(), &sources))
        .map_err(AugmentError::Spawn)?;
    Ok(AugmentationHandle { worker })
}
