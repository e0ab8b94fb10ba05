#![expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
//! Behavioural tests for tag matching using rstest-bdd.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use presetdb_core::{
    BaselineCatalog, CatalogParts, CatalogSnapshot, Document, Feature, FeatureMap, FeatureSource,
    GeoContext, GeofenceMap, Geometry, Tags,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;

fn parse(id: &str, source: FeatureSource, entry: serde_json::Value) -> (String, Arc<Feature>) {
    let feature = Feature::from_document(id, source, &Document::from(entry))
        .expect("fixture feature should parse");
    (id.to_owned(), Arc::new(feature))
}

fn restaurant_catalog() -> CatalogSnapshot {
    let features: FeatureMap = [
        parse(
            "amenity",
            FeatureSource::Baseline,
            json!({"geometry": ["point", "area"], "tags": {"amenity": "*"}}),
        ),
        parse(
            "amenity/restaurant",
            FeatureSource::Baseline,
            json!({"geometry": ["point", "area"], "tags": {"amenity": "restaurant"}}),
        ),
        parse(
            "amenity/restaurant/pizza",
            FeatureSource::Baseline,
            json!({
                "geometry": ["point", "area"],
                "tags": {"amenity": "restaurant", "cuisine": "pizza"}
            }),
        ),
        parse(
            "leisure/park",
            FeatureSource::Baseline,
            json!({"geometry": ["area"], "tags": {"leisure": "park"}, "matchScore": 5.0}),
        ),
    ]
    .into_iter()
    .collect();
    CatalogSnapshot::new(BaselineCatalog::new(CatalogParts {
        language: "en".to_owned(),
        features,
        fields: BTreeMap::new(),
        categories: BTreeMap::new(),
        address_formats: Vec::new(),
        defaults: BTreeMap::new(),
    }))
}

fn parse_tags(raw: &str) -> Tags {
    raw.trim_matches('"')
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

/// World state for matching scenarios.
#[derive(Debug, Default)]
struct MatchingWorld {
    snapshot: RefCell<Option<CatalogSnapshot>>,
    matched: RefCell<Option<Option<Arc<Feature>>>>,
}

impl MatchingWorld {
    fn match_as(&self, raw: &str, geometry: Geometry) {
        let snapshot = self.snapshot.borrow();
        let snapshot = snapshot.as_ref().expect("catalog should be loaded");
        let result = snapshot.best_match(&parse_tags(raw), geometry, &GeoContext::unknown(), true);
        self.matched.replace(Some(result));
    }
}

#[fixture]
fn world() -> MatchingWorld {
    MatchingWorld::default()
}

#[given("a restaurant catalog")]
fn given_catalog(world: &MatchingWorld) {
    world.snapshot.replace(Some(restaurant_catalog()));
}

#[given("the catalog is augmented with a pizza brand")]
fn given_brand(world: &MatchingWorld) {
    let secondary: FeatureMap = [parse(
        "brands/amenity/restaurant/pizzeria",
        FeatureSource::Secondary,
        json!({
            "geometry": ["point", "area"],
            "tags": {"amenity": "restaurant", "brand": "Pizzeria"},
            "name": "Pizzeria"
        }),
    )]
    .into_iter()
    .collect();
    let augmented = world
        .snapshot
        .borrow()
        .as_ref()
        .expect("catalog should be loaded")
        .augment(secondary, GeofenceMap::new());
    world.snapshot.replace(Some(augmented));
}

#[when("I match {tags} as a point")]
fn when_match_point(world: &MatchingWorld, tags: String) {
    world.match_as(&tags, Geometry::Point);
}

#[when("I match {tags} as an area")]
fn when_match_area(world: &MatchingWorld, tags: String) {
    world.match_as(&tags, Geometry::Area);
}

#[then("the matched preset is {id}")]
fn then_matched(world: &MatchingWorld, id: String) {
    let matched = world.matched.borrow();
    let feature = matched
        .as_ref()
        .expect("a match should have been attempted")
        .as_ref()
        .expect("a preset should match");
    assert_eq!(feature.id, id.trim_matches('"'));
}

#[then("no preset matches")]
fn then_no_match(world: &MatchingWorld) {
    let matched = world.matched.borrow();
    let result = matched.as_ref().expect("a match should have been attempted");
    assert!(result.is_none(), "unexpected match: {result:?}");
}

#[scenario(path = "tests/features/matching.feature", index = 0)]
fn specific_preset_wins(world: MatchingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/matching.feature", index = 1)]
fn geometry_restrictions_hold(world: MatchingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/matching.feature", index = 2)]
fn area_presets_match_areas(world: MatchingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/matching.feature", index = 3)]
fn brands_take_part_after_augmentation(world: MatchingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/matching.feature", index = 4)]
fn empty_tags_match_nothing(world: MatchingWorld) {
    let _ = world;
}
