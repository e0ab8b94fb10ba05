//! Behaviour-driven step definitions driving the match and search scenarios.

use super::helpers::fixture_dir;
use super::*;
use crate::matching::MatchedPreset;
use crate::search::SearchHit;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

/// Aggregates lookup scenario state so each step only needs a single world
/// argument.
#[derive(Debug, Default)]
struct LookupWorld {
    cli_args: RefCell<Vec<String>>,
    output: RefCell<Option<Result<String, CliError>>>,
}

impl LookupWorld {
    fn run(&self, subcommand: &str, leading: &[String]) {
        let mut invocation = vec!["presetdb".to_owned(), subcommand.to_owned()];
        invocation.extend(leading.iter().cloned());
        invocation.extend(self.cli_args.borrow().iter().cloned());
        let mut buffer = Vec::new();
        let outcome = Cli::try_parse_from(invocation)
            .map_err(CliError::ArgumentParsing)
            .and_then(|cli| match cli.command {
                Command::Match(args) => run_match_with(args, &mut buffer),
                Command::Search(args) => run_search_with(args, &mut buffer),
            })
            .map(|()| String::from_utf8(buffer).expect("CLI output is UTF-8"));
        self.output.replace(Some(outcome));
    }

    fn stdout(&self) -> String {
        self.output
            .borrow()
            .as_ref()
            .expect("command ran")
            .as_ref()
            .map(Clone::clone)
            .unwrap_or_else(|err| panic!("expected success, found {err:?}"))
    }

    fn error(&self) -> String {
        let borrowed = self.output.borrow();
        match borrowed.as_ref().expect("command ran") {
            Ok(stdout) => panic!("expected failure, found output {stdout}"),
            Err(err) => format!("{err:?}"),
        }
    }
}

#[fixture]
fn world() -> LookupWorld {
    LookupWorld::default()
}

#[given("the fixture catalog directory")]
fn fixture_catalog(#[from(world)] world: &LookupWorld) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_PRESETS_DIR}"), fixture_dir().into_string()]);
}

#[given("no presets directory is configured")]
fn no_catalog(#[from(world)] world: &LookupWorld) {
    world.cli_args.borrow_mut().clear();
}

#[given("I pass the tag {tag}")]
fn pass_tag(#[from(world)] world: &LookupWorld, tag: String) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_TAG}"), tag.trim_matches('"').to_owned()]);
}

#[given("I pass the location {lon} {lat}")]
fn pass_location(#[from(world)] world: &LookupWorld, lon: String, lat: String) {
    world.cli_args.borrow_mut().extend([
        format!("--{ARG_LON}"),
        lon.trim_matches('"').to_owned(),
        format!("--{ARG_LAT}"),
        lat.trim_matches('"').to_owned(),
    ]);
}

#[given("I include secondary presets")]
fn include_secondary(#[from(world)] world: &LookupWorld) {
    world
        .cli_args
        .borrow_mut()
        .push(format!("--{ARG_INCLUDE_SECONDARY}"));
}

#[when("I run the match command")]
fn run_match(#[from(world)] world: &LookupWorld) {
    world.run("match", &[]);
}

#[when("I search for {query}")]
fn run_search(#[from(world)] world: &LookupWorld, query: String) {
    world.run("search", &[query.trim_matches('"').to_owned()]);
}

#[then("the output names the preset {id}")]
fn output_names_preset(#[from(world)] world: &LookupWorld, id: String) {
    let matched: Option<MatchedPreset> =
        serde_json::from_str(&world.stdout()).expect("match output is JSON");
    let matched = matched.expect("a preset should match");
    assert_eq!(matched.id, id.trim_matches('"'));
}

#[then("the first search hit is {id}")]
fn first_hit(#[from(world)] world: &LookupWorld, id: String) {
    let hits: Vec<SearchHit> =
        serde_json::from_str(&world.stdout()).expect("search output is JSON");
    let first = hits.first().expect("search should return hits");
    assert_eq!(first.id, id.trim_matches('"'));
}

#[then("the CLI reports that the \"presets-dir\" flag is missing")]
fn reports_missing_presets_dir(#[from(world)] world: &LookupWorld) {
    let borrowed = world.output.borrow();
    let error = borrowed
        .as_ref()
        .expect("command ran")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_PRESETS_DIR),
        other => panic!("unexpected error {other:?}"),
    }
}

#[then("the CLI reports an invalid tag")]
fn reports_invalid_tag(#[from(world)] world: &LookupWorld) {
    assert!(world.error().starts_with("InvalidTag"));
}

macro_rules! register_lookup_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/lookup_commands.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: LookupWorld) {
            let _ = world;
        }
    };
}

register_lookup_scenario!(matching_cli_tags, "matching tags passed as CLI flags");
register_lookup_scenario!(
    matching_secondary_brands,
    "matching brand presets when secondary presets are included"
);
register_lookup_scenario!(searching_by_name, "searching for presets by name");
register_lookup_scenario!(
    rejecting_missing_presets_dir,
    "rejecting a missing presets directory"
);
register_lookup_scenario!(rejecting_malformed_tags, "rejecting malformed tags");
