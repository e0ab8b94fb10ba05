//! Location-based applicability of features.
//!
//! A feature may carry a [`LocationSet`] listing where it applies and where it
//! does not. References are resolved against the caller's [`GeoContext`] and
//! a [`GeofenceMap`] of named polygon regions loaded alongside the secondary
//! dataset.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`.

use std::collections::BTreeMap;

use geo::{Contains, Coord, Distance, Haversine, LineString, MultiPolygon, Point, Polygon};

use crate::{Document, DocumentMap, EntityError, parse};

/// Code used by location sets to mean "everywhere".
pub const WORLD_CODE: &str = "001";

/// Suffix identifying references to named polygon regions.
pub const REGION_SUFFIX: &str = ".geojson";

/// Radius applied to point references that omit one.
pub const DEFAULT_CIRCLE_RADIUS_KM: f64 = 25.0;

/// Named polygon regions keyed by their lowercase identifier.
pub type GeofenceMap = BTreeMap<String, GeofenceRegion>;

/// Where a query is being made from.
///
/// Either part may be unknown. References that need the missing part never
/// match.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use presetdb_core::GeoContext;
///
/// let here = GeoContext::at(Coord { x: 13.4, y: 52.5 }).with_country("DE");
/// assert_eq!(here.country_code.as_deref(), Some("de"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoContext {
    /// Position of the query, if known.
    pub coord: Option<Coord<f64>>,
    /// Lowercase ISO 3166 country code, if known.
    pub country_code: Option<String>,
}

impl GeoContext {
    /// Context with no known position.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Context at a known position.
    pub fn at(coord: Coord<f64>) -> Self {
        Self {
            coord: Some(coord),
            country_code: None,
        }
    }

    /// Attach a country code, normalised to lowercase.
    #[must_use]
    pub fn with_country(mut self, code: &str) -> Self {
        self.country_code = Some(code.to_lowercase());
        self
    }
}

/// A single entry of a location set.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationRef {
    /// Matches every location.
    World,
    /// Matches a lowercase ISO country code.
    Country(String),
    /// Matches when inside the named geofence region.
    Region(String),
    /// Matches within `radius_km` of a point.
    Circle {
        /// Centre longitude.
        lon: f64,
        /// Centre latitude.
        lat: f64,
        /// Radius in kilometres.
        radius_km: f64,
    },
}

impl LocationRef {
    fn from_document(document: &Document, field: &'static str) -> Result<Self, EntityError> {
        let invalid = EntityError::InvalidLocation { field };
        match document {
            Document::String(code) => {
                let code = code.to_lowercase();
                if code == WORLD_CODE {
                    Ok(Self::World)
                } else if code.ends_with(REGION_SUFFIX) {
                    Ok(Self::Region(code))
                } else {
                    Ok(Self::Country(code))
                }
            }
            Document::Array(items) => {
                let numbers: Option<Vec<f64>> = items.iter().map(Document::as_f64).collect();
                match numbers.as_deref() {
                    Some(&[lon, lat]) => Ok(Self::Circle {
                        lon,
                        lat,
                        radius_km: DEFAULT_CIRCLE_RADIUS_KM,
                    }),
                    Some(&[lon, lat, radius_km]) if radius_km > 0.0 => Ok(Self::Circle {
                        lon,
                        lat,
                        radius_km,
                    }),
                    _ => Err(invalid),
                }
            }
            _ => Err(invalid),
        }
    }

    fn contains(&self, location: &GeoContext, regions: &GeofenceMap) -> bool {
        match self {
            Self::World => true,
            Self::Country(code) => location.country_code.as_deref() == Some(code.as_str()),
            Self::Region(id) => match (location.coord, regions.get(id)) {
                (Some(coord), Some(region)) => region.contains(coord),
                _ => false,
            },
            Self::Circle {
                lon,
                lat,
                radius_km,
            } => location.coord.is_some_and(|coord| {
                let metres = Haversine.distance(Point::new(*lon, *lat), Point::from(coord));
                metres <= radius_km * 1000.0
            }),
        }
    }
}

/// Inclusion and exclusion lists restricting where a feature applies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationSet {
    /// The feature applies only inside one of these, unless the list is empty.
    pub include: Vec<LocationRef>,
    /// The feature never applies inside any of these.
    pub exclude: Vec<LocationRef>,
}

impl LocationSet {
    /// Parse a `{ "include": [...], "exclude": [...] }` document.
    ///
    /// # Errors
    /// Returns [`EntityError`] when the node is not an object or a reference
    /// is neither a code string nor a `[lon, lat(, radius)]` list.
    pub fn from_document(document: &Document) -> Result<Self, EntityError> {
        let map = parse::object(document)?;
        Ok(Self {
            include: Self::refs(map, "include")?,
            exclude: Self::refs(map, "exclude")?,
        })
    }

    fn refs(map: &DocumentMap, field: &'static str) -> Result<Vec<LocationRef>, EntityError> {
        match map.get(field) {
            None | Some(Document::Null) => Ok(Vec::new()),
            Some(Document::Array(items)) => items
                .iter()
                .map(|item| LocationRef::from_document(item, field))
                .collect(),
            Some(_) => Err(EntityError::WrongType {
                field,
                expected: "a list of location references",
            }),
        }
    }

    /// Report whether `location` is inside the set.
    ///
    /// Region references missing from `regions` never match, so a feature
    /// restricted to an unloaded region is excluded until its geofence loads.
    pub fn includes(&self, location: &GeoContext, regions: &GeofenceMap) -> bool {
        let included = self.include.is_empty()
            || self
                .include
                .iter()
                .any(|entry| entry.contains(location, regions));
        included
            && !self
                .exclude
                .iter()
                .any(|entry| entry.contains(location, regions))
    }
}

/// A named polygon set used to geofence features.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceRegion {
    /// Lowercase identifier, e.g. `new_jersey.geojson`.
    pub id: String,
    /// Polygons making up the region.
    pub area: MultiPolygon<f64>,
}

impl GeofenceRegion {
    /// Build a region from a GeoJSON `Polygon` or `MultiPolygon` geometry.
    ///
    /// # Errors
    /// Returns [`EntityError`] for other geometry types or malformed rings.
    pub fn from_geojson(id: &str, geometry: &Document) -> Result<Self, EntityError> {
        let map = parse::object(geometry)?;
        let kind = parse::optional_string(map, "type")?
            .ok_or(EntityError::MissingField { field: "type" })?;
        let coordinates = map
            .get("coordinates")
            .ok_or(EntityError::MissingField {
                field: "coordinates",
            })?;
        let polygons = match kind.as_str() {
            "Polygon" => vec![polygon(coordinates)?],
            "MultiPolygon" => coordinates
                .as_array()
                .ok_or(EntityError::InvalidGeofence {
                    reason: "multipolygon coordinates must be a list",
                })?
                .iter()
                .map(polygon)
                .collect::<Result<_, _>>()?,
            _ => {
                return Err(EntityError::InvalidGeofence {
                    reason: "only Polygon and MultiPolygon are supported",
                });
            }
        };
        Ok(Self {
            id: id.to_lowercase(),
            area: MultiPolygon::new(polygons),
        })
    }

    /// Report whether `coord` lies strictly inside the region.
    pub fn contains(&self, coord: Coord<f64>) -> bool {
        self.area.contains(&Point::from(coord))
    }
}

fn polygon(document: &Document) -> Result<Polygon<f64>, EntityError> {
    let rings = document.as_array().ok_or(EntityError::InvalidGeofence {
        reason: "polygon coordinates must be a list of rings",
    })?;
    let mut rings = rings.iter().map(ring);
    let exterior = rings.next().ok_or(EntityError::InvalidGeofence {
        reason: "polygon has no exterior ring",
    })??;
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn ring(document: &Document) -> Result<LineString<f64>, EntityError> {
    let invalid = EntityError::InvalidGeofence {
        reason: "ring positions must be [lon, lat] pairs",
    };
    let positions = document.as_array().ok_or(invalid.clone())?;
    positions
        .iter()
        .map(|position| match position.as_array() {
            Some([lon, lat, ..]) => match (lon.as_f64(), lat.as_f64()) {
                (Some(x), Some(y)) => Ok(Coord { x, y }),
                _ => Err(invalid.clone()),
            },
            _ => Err(invalid.clone()),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::from)
}
