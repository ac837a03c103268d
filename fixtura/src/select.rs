/// Marker and keyword based test selection.
use crate::TestCase;

/// Keep just the tests that carry `marker`; every test if no marker is
/// given. A marker that nobody uses selects nothing: it is not an error.
pub fn select<'t>(tests: &'t [TestCase], marker: Option<&str>) -> Vec<&'t TestCase> {
    tests
        .iter()
        .filter(|t| marker.map(|m| t.has_marker(m)).unwrap_or(true))
        .collect()
}

/// What to run: an optional marker and some keywords that must all appear
/// in the test id. In exact mode a keyword must be the whole id or the test
/// name instead.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    marker: Option<String>,
    keywords: Vec<String>,
    exact: bool,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    pub fn matches(&self, case: &TestCase) -> bool {
        self.marker
            .as_deref()
            .map(|m| case.has_marker(m))
            .unwrap_or(true)
            && self.keywords.iter().all(|k| self.keyword_matches(case, k))
    }

    fn keyword_matches(&self, case: &TestCase, keyword: &str) -> bool {
        match self.exact {
            true => case.id() == keyword || case.name() == keyword,
            false => case.id().contains(keyword),
        }
    }

    /// Split `tests` in the selected ones (in the given order) and the
    /// number of deselected ones.
    pub fn apply<'t>(&self, tests: &'t [TestCase]) -> (Vec<&'t TestCase>, usize) {
        let selected = select(tests, self.marker())
            .into_iter()
            .filter(|t| self.matches(t))
            .collect::<Vec<_>>();
        let deselected = tests.len() - selected.len();
        (selected, deselected)
    }
}

#[cfg(test)]
mod should {
    use super::*;
    use crate::{inject::Request, Failure};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn noop(_: &Request<'_>) -> Result<(), Failure> {
        Ok(())
    }

    #[fixture]
    fn tests() -> Vec<TestCase> {
        vec![
            TestCase::new("suite/test_setup.rs", "test_fixtura_runs", noop),
            TestCase::new("suite/test_setup.rs", "test_fixture_injection", noop),
            TestCase::new("suite/test_setup.rs", "test_smoke_marker_works", noop).marked(["smoke"]),
            TestCase::new("suite/api/test_users.rs", "test_login", noop)
                .marked(["smoke", "regression"]),
        ]
    }

    fn names(selected: &[&TestCase]) -> Vec<String> {
        selected.iter().map(|t| t.name().to_owned()).collect()
    }

    #[rstest]
    #[case::no_marker(None, &["test_fixtura_runs", "test_fixture_injection", "test_smoke_marker_works", "test_login"])]
    #[case::smoke(Some("smoke"), &["test_smoke_marker_works", "test_login"])]
    #[case::regression(Some("regression"), &["test_login"])]
    #[case::unknown_marker_is_not_an_error(Some("smoek"), &[])]
    fn select_by_marker(
        tests: Vec<TestCase>,
        #[case] marker: Option<&str>,
        #[case] expected: &[&str],
    ) {
        assert_eq!(expected, names(&select(&tests, marker)).as_slice());
    }

    #[rstest]
    fn include_smoke_and_exclude_it_when_selecting_disjoint_marker(tests: Vec<TestCase>) {
        let smoke_only = &tests[2..3];

        assert_eq!(1, select(smoke_only, Some("smoke")).len());
        assert_eq!(0, select(smoke_only, Some("regression")).len());
    }

    #[rstest]
    #[case::keyword(Selection::all().with_keyword("injection"), &["test_fixture_injection"], 3)]
    #[case::keyword_on_path(Selection::all().with_keyword("api/"), &["test_login"], 3)]
    #[case::marker_and_keyword(
        Selection::all().with_marker("smoke").with_keyword("setup"),
        &["test_smoke_marker_works"],
        3
    )]
    #[case::nothing(Selection::all().with_marker("nope"), &[], 4)]
    #[case::exact_name(Selection::all().with_keyword("test_login").exact(true), &["test_login"], 3)]
    #[case::exact_id(
        Selection::all().with_keyword("suite/test_setup.rs::test_fixture_injection").exact(true),
        &["test_fixture_injection"],
        3
    )]
    #[case::exact_refuses_substrings(Selection::all().with_keyword("injection").exact(true), &[], 4)]
    fn count_deselected_tests(
        tests: Vec<TestCase>,
        #[case] selection: Selection,
        #[case] expected: &[&str],
        #[case] deselected: usize,
    ) {
        let (selected, n) = selection.apply(&tests);

        assert_eq!(expected, names(&selected).as_slice());
        assert_eq!(deselected, n);
    }
}
