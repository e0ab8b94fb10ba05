//! Canned catalog documents used by unit and behaviour tests.

use presetdb_core::Document;
use serde_json::json;

use crate::MemoryProvider;

/// Provider holding a small restaurant catalog with a German translation.
///
/// Secondary documents are absent; add them with [`with_secondary`].
pub fn baseline_provider() -> MemoryProvider {
    MemoryProvider::new()
        .with_document(
            "presets.json",
            Document::from(json!({
                "amenity": {
                    "name": "Amenity",
                    "geometry": ["point", "vertex", "area"],
                    "tags": {"amenity": "*"},
                    "searchable": false
                },
                "amenity/restaurant": {
                    "name": "Restaurant",
                    "icon": "maki-restaurant",
                    "geometry": ["point", "vertex", "area"],
                    "tags": {"amenity": "restaurant"},
                    "terms": ["bar", "dining"],
                    "fields": ["name", "cuisine"]
                },
                "amenity/restaurant/pizza": {
                    "name": "Pizza Restaurant",
                    "geometry": ["point", "vertex", "area"],
                    "tags": {"amenity": "restaurant", "cuisine": "pizza"}
                },
                "leisure/park": {
                    "name": "Park",
                    "geometry": ["area"],
                    "tags": {"leisure": "park"}
                }
            })),
        )
        .with_document(
            "fields.json",
            Document::from(json!({
                "internet_access": {
                    "key": "internet_access",
                    "type": "combo",
                    "options": ["yes", "no", "wlan"]
                },
                "opening_hours": {"key": "opening_hours", "type": "text"},
                "cuisine": {"key": "cuisine", "type": "combo", "options": ["pizza", "burger"]}
            })),
        )
        .with_document(
            "preset_categories.json",
            Document::from(json!({
                "category-food": {
                    "name": "Food",
                    "geometry": ["point", "area"],
                    "members": ["amenity/restaurant", "amenity/restaurant/pizza"]
                }
            })),
        )
        .with_document(
            "address_formats.json",
            Document::from(json!([
                {"format": [["housenumber", "street"], ["city", "postcode"]]},
                {"countryCodes": ["de", "at"], "format": [["street", "housenumber"], ["postcode", "city"]]}
            ])),
        )
        .with_document(
            "preset_defaults.json",
            Document::from(json!({
                "point": ["category-food", "amenity/restaurant", "nonexistent"],
                "area": ["leisure/park"]
            })),
        )
        .with_document(
            "translations/de.json",
            Document::from(json!({
                "de": {"presets": {
                    "presets": {
                        "amenity/restaurant": {
                            "name": "Restaurant (de)",
                            "terms": "Gaststätte,Speiselokal"
                        }
                    },
                    "fields": {
                        "internet_access": {
                            "label": "Internetzugang",
                            "options": {"yes": "Ja", "no": "Nein", "wlan": {"title": "WLAN"}}
                        },
                        "opening_hours": {"placeholder": "unbekannt"}
                    },
                    "categories": {"category-food": {"name": "Essen"}}
                }}
            })),
        )
}

/// Add a brand preset and a geofence region to `provider`.
///
/// The brand `brands/amenity/restaurant/pizzeria` only applies inside
/// `berlin.geojson`, a square around `13.4, 52.5`.
pub fn with_secondary(provider: MemoryProvider) -> MemoryProvider {
    provider
        .with_document(
            "nsi_presets.json",
            Document::from(json!({
                "presets": {
                    "brands/amenity/restaurant/pizzeria": {
                        "name": "Pizzeria Uno",
                        "geometry": ["point", "area"],
                        "tags": {"amenity": "restaurant", "brand": "Pizzeria Uno", "cuisine": "pizza"},
                        "locationSet": {"include": ["berlin.geojson"]}
                    },
                    "brands/amenity/restaurant/global": {
                        "name": "Global Grill",
                        "geometry": ["point", "area"],
                        "tags": {"amenity": "restaurant", "brand": "Global Grill"},
                        "locationSet": {"include": ["001"]}
                    },
                    "brands/broken": {"name": "No tags"}
                }
            })),
        )
        .with_document(
            "nsi_geojson.json",
            Document::from(json!({
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "id": "berlin.geojson",
                        "properties": {},
                        "geometry": {
                            "type": "Polygon",
                            "coordinates": [[[13.0, 52.0], [14.0, 52.0], [14.0, 53.0], [13.0, 53.0], [13.0, 52.0]]]
                        }
                    },
                    {"type": "Feature", "properties": {}, "geometry": null}
                ]
            })),
        )
}
