//! Run the reference suite in process and check what discovery collected.
use fixtura::{Config, Report, Selection, Suite, TestCase};
use fixtura_test::{assert_in, ReportExpectations};
use rstest::{fixture, rstest};

fixtura::discover!("tests/suite");

const INJECTION: &str = "suite/test_setup_verification.rs::test_fixture_injection";
const RUNS: &str = "suite/test_setup_verification.rs::test_fixtura_runs";
const SMOKE: &str = "suite/test_setup_verification.rs::test_smoke_marker_works";
const SHADOWS: &str = "suite/api/test_users.rs::test_nearer_fixture_shadows_the_suite_one";
const SESSION: &str = "suite/api/test_users.rs::test_session_is_open";
const CLOSED: &str = "suite/api/test_users.rs::test_sessions_are_closed_after_each_test";
const NOT_READY: &str = "suite/api/test_users.rs::test_not_ready_yet";

#[fixture]
fn suite() -> Suite {
    discovered()
}

#[fixture]
fn config() -> Config {
    Config::load("fixtura.toml").unwrap()
}

fn run(suite: &Suite, config: &Config, selection: Selection) -> Report {
    suite.run(&config.run_options(selection))
}

#[rstest]
fn collect_every_test_in_lexical_path_order(suite: Suite) {
    let ids = suite.tests().iter().map(|t| t.id()).collect::<Vec<_>>();

    assert_eq!(
        vec![SHADOWS, SESSION, CLOSED, NOT_READY, RUNS, INJECTION, SMOKE],
        ids
    );
    assert_eq!(0, suite.discovery_errors().count());
}

#[rstest]
fn run_the_whole_suite(suite: Suite, config: Config) {
    let report = run(&suite, &config, Selection::all());

    ReportExpectations::new()
        .ok(SHADOWS)
        .ok(SESSION)
        .ok(CLOSED)
        .skipped(NOT_READY)
        .ok(RUNS)
        .ok(INJECTION)
        .ok(SMOKE)
        .with_deselected(0)
        .assert(report.to_string());
    assert!(report.is_success());
}

#[rstest]
fn select_the_smoke_tests(suite: Suite, config: Config) {
    let report = run(&suite, &config, Selection::all().with_marker("smoke"));

    ReportExpectations::new()
        .ok(SESSION)
        .ok(SMOKE)
        .with_deselected(5)
        .assert(report.to_string());
}

#[rstest]
#[case::unknown_marker("regression")]
#[case::no_match("nothing_is_marked_so")]
fn run_nothing_when_no_test_carries_the_marker(
    suite: Suite,
    config: Config,
    #[case] marker: &str,
) {
    let report = run(&suite, &config, Selection::all().with_marker(marker));

    let summary = report.summary();
    assert_eq!((0, 0, 0), (summary.passed, summary.failed, summary.errors));
    assert_eq!(7, summary.deselected);
    assert!(report.is_success());
}

#[rstest]
fn inject_the_conftest_fixture(suite: Suite, config: Config) {
    let report = run(&suite, &config, Selection::all().with_keyword("injection"));

    ReportExpectations::new()
        .ok(INJECTION)
        .with_deselected(6)
        .assert(report.to_string());
}

#[rstest]
fn produce_fresh_values_for_every_run(suite: Suite, config: Config) {
    let selection = || Selection::all().with_keyword("api/");

    let first = run(&suite, &config, selection());
    let second = run(&suite, &config, selection());

    assert!(first.is_success(), "{first}");
    assert!(second.is_success(), "{second}");
}

#[rstest]
fn reject_unregistered_markers_in_strict_mode(mut suite: Suite, config: Config) {
    suite.add_test(
        TestCase::new("suite/test_extra.rs", "test_later", |_| Ok(())).marked(["regression"]),
    );

    let report = run(&suite, &config, Selection::all().with_keyword("test_extra"));

    ReportExpectations::new()
        .error("suite/test_extra.rs::test_later")
        .with_deselected(7)
        .assert(report.to_string());
    assert_in!(report.to_string(), "regression");
}
