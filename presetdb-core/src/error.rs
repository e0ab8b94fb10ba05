//! Error types raised while converting documents into catalog entities.

use thiserror::Error;

/// Reasons a single catalog entry could not be turned into its entity type.
///
/// Loaders skip entries that fail with this error instead of aborting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// The entry was not an object.
    #[error("expected an object, found {found}")]
    NotAnObject {
        /// Variant name of the offending node.
        found: &'static str,
    },
    /// A required key was absent.
    #[error("missing required `{field}`")]
    MissingField {
        /// Name of the missing key.
        field: &'static str,
    },
    /// A key held a value of the wrong shape.
    #[error("`{field}` must be {expected}")]
    WrongType {
        /// Name of the offending key.
        field: &'static str,
        /// Human-readable description of the accepted shape.
        expected: &'static str,
    },
    /// A geometry name was not recognised.
    #[error("unknown geometry `{name}`")]
    UnknownGeometry {
        /// Name found in the document.
        name: String,
    },
    /// A location reference could not be interpreted.
    #[error("invalid location reference in `{field}`")]
    InvalidLocation {
        /// List containing the bad reference.
        field: &'static str,
    },
    /// A GeoJSON geometry could not be converted into polygons.
    #[error("unsupported geofence geometry: {reason}")]
    InvalidGeofence {
        /// What was wrong with the geometry.
        reason: &'static str,
    },
}
