use std::borrow::Cow;

#[macro_export]
macro_rules! assert_in {
    ($text:expr, $message:expr) => ({
        match (&$text, &$message) {
            (text_val, message_val) => {
                if !text_val.contains(message_val) {
                    panic!(r#"assertion failed: `text don't contain message`
         text: `{}`,
         message: `{}`"#, text_val, message_val)
                }
            }
        }
        });
    ($text:expr, $message:expr, ) => (
        $crate::assert_in!($text, $message)
    );
    ($text:expr, $message:expr, $($arg:tt)+) => ({
        match (&$text, &$message) {
            (text_val, message_val) => {
                if !text_val.contains(message_val) {
                    panic!(r#"assertion failed: `text don't contain message`
         text: `{}`,
         message: `{}`: {}"#, text_val, message_val, format_args!($($arg)+))
                }
            }
        }
        });
}

#[macro_export]
macro_rules! assert_all_in {
    ($text:expr, $expected:expr) => (
        $crate::assert_in!($text, $expected)
    );
    ($text:expr, $expected:expr, ) => (
        $crate::assert_in!($text, $expected)
    );
    ($text:expr, $expected:expr, $( $others:expr ) ,+) => (
        {
            $crate::assert_in!($text, $expected);
            $crate::assert_all_in!($text $(, $others)*);
        }
    );
}

#[macro_export]
macro_rules! assert_not_in {
    ($text:expr, $message:expr) => ({
        match (&$text, &$message) {
            (text_val, message_val) => {
                if text_val.contains(message_val) {
                    panic!(r#"assertion failed: `text contains message`
         text: `{}`,
         message: `{}`"#, text_val, message_val)
                }
            }
        }
        });
    ($text:expr, $message:expr, ) => (
        $crate::assert_not_in!($text, $message)
    );
    ($text:expr, $message:expr, $($arg:tt)+) => ({
        match (&$text, &$message) {
            (text_val, message_val) => {
                if text_val.contains(message_val) {
                    panic!(r#"assertion failed: `text contains message`
         text: `{}`,
         message: `{}`: {}"#, text_val, message_val, format_args!($($arg)+))
                }
            }
        }
        });
}

#[macro_export]
macro_rules! assert_regex {
    ($regex:expr, $text:expr) => ({
        match (&$text, &$regex) {
            (text_val, regex_val) => {
                use $crate::regex::Regex;
                if !Regex::new(regex_val).unwrap().is_match(text_val) {
                    panic!(r#"assertion failed: `text don't satisfy regex`
         regex: `{}`,
         text: `{}`"#, regex_val, text_val)
                }
            }
        }
        });
    ($regex:expr, $text:expr, ) => (
        $crate::assert_regex!($regex, $text)
    );
    ($regex:expr, $text:expr, $($arg:tt)+) => ({
        match (&$text, &$regex) {
            (text_val, regex_val) => {
                use $crate::regex::Regex;
                if !Regex::new(regex_val).unwrap().is_match(text_val) {
                    panic!(r#"assertion failed: `text don't satisfy regex`
         regex: `{}`,
         text: `{}`: {}"#, regex_val, text_val, format_args!($($arg)+))
                }
            }
        }
        });
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Status {
    Ok,
    Failed,
    Error,
    Skipped,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Failed => "FAILED",
            Status::Error => "ERROR",
            Status::Skipped => "skipped",
        }
    }
}

#[derive(Clone)]
struct Expectation<S: AsRef<str>> {
    id: S,
    status: Status,
    exactly: bool,
}

impl<S: AsRef<str>> Expectation<S> {
    fn regex(&self) -> String {
        let id = regex::escape(self.id.as_ref());
        if self.exactly {
            format!(r"(?m)^test {id} \.\.\. {}$", self.status.label())
        } else {
            format!(r"(?m)^test .*{id}.* \.\.\. {}$", self.status.label())
        }
    }

    fn assert(&self, output: &str) {
        assert_regex!(self.regex(), output, "no line for {}", self.id.as_ref());
    }

    fn needs_details(&self) -> bool {
        matches!(self.status, Status::Failed | Status::Error)
    }
}

/// What a rendered fixtura report should contain: a status line for every
/// expected test, the details of failures and errors and the summary.
#[derive(Clone)]
pub struct ReportExpectations<S>
where
    S: AsRef<str> + Clone,
{
    expected: Vec<Expectation<S>>,
    contains: bool,
    deselected: Option<usize>,
}

impl<S> Default for ReportExpectations<S>
where
    S: AsRef<str> + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ReportExpectations<S>
where
    S: AsRef<str> + Clone,
{
    pub fn new() -> Self {
        Self {
            expected: vec![],
            contains: false,
            deselected: None,
        }
    }

    /// Match ids as substrings and don't check the summary counts.
    pub fn with_contains(self, contains: bool) -> Self {
        Self { contains, ..self }
    }

    pub fn with_deselected(self, deselected: usize) -> Self {
        Self {
            deselected: Some(deselected),
            ..self
        }
    }

    fn append(mut self, id: S, status: Status) -> Self {
        let exactly = !self.contains;
        self.expected.push(Expectation {
            id,
            status,
            exactly,
        });
        self
    }

    pub fn ok(self, id: S) -> Self {
        self.append(id, Status::Ok)
    }

    pub fn fail(self, id: S) -> Self {
        self.append(id, Status::Failed)
    }

    pub fn error(self, id: S) -> Self {
        self.append(id, Status::Error)
    }

    pub fn skipped(self, id: S) -> Self {
        self.append(id, Status::Skipped)
    }

    fn count(&self, status: Status) -> usize {
        self.expected.iter().filter(|e| e.status == status).count()
    }

    fn should_fail(&self) -> bool {
        self.expected.iter().any(|e| e.needs_details())
    }

    /// Check the text of a report.
    pub fn assert(&self, report: impl AsRef<str>) {
        let report = report.as_ref();
        if !self.contains {
            assert_in!(report, format!("collected {} test", self.expected.len()));
        }
        self.expected.iter().for_each(|e| e.assert(report));
        if self.count(Status::Failed) > 0 {
            assert_in!(report, "failures:");
        }
        if self.count(Status::Error) > 0 {
            assert_in!(report, "errors:");
        }
        self.expected
            .iter()
            .filter(|e| e.needs_details())
            .for_each(|e| {
                assert_regex!(
                    format!("---- .*{}.* ----", regex::escape(e.id.as_ref())),
                    report
                )
            });
        if !self.contains {
            assert_regex!(
                format!(
                    r"test result: {}\. {} passed; {} failed; {} errors; {} skipped; {}",
                    if self.should_fail() { "FAILED" } else { "ok" },
                    self.count(Status::Ok),
                    self.count(Status::Failed),
                    self.count(Status::Error),
                    self.count(Status::Skipped),
                    self.deselected
                        .map(|d| format!("{d} deselected"))
                        .unwrap_or_else(|| r"\d+ deselected".to_owned())
                ),
                report
            );
        }
    }

    /// Check a finished test binary: exit code `1` when some test should
    /// fail, `0` otherwise, then the report on stdout.
    pub fn assert_output(&self, output: ::std::process::Output) {
        let (expected_code, msg) = if !self.should_fail() {
            (0, "Unexpected fails!")
        } else {
            (1, "Some test should fail!")
        };
        assert_eq!(
            Some(expected_code),
            output.status.code(),
            "{}\n Console: \nOUT:\n{}\nERR:\n{}\n",
            msg,
            output.stdout.str(),
            output.stderr.str()
        );
        let stdout = output.stdout.str();
        if stdout.is_empty() {
            eprintln!("Stderr: {}", output.stderr.str());
            panic!("Empty stdout!");
        }
        self.assert(stdout);
    }
}

pub trait Stringable {
    fn str(&self) -> Cow<'_, str>;
}

impl<B: AsRef<[u8]>> Stringable for B {
    fn str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_ref())
    }
}

pub trait CountMessageOccurrence {
    fn count<S: AsRef<str>>(&self, message: S) -> usize;

    fn count_regex<S: AsRef<str>>(&self, message: S) -> usize;
}

impl<ST> CountMessageOccurrence for ST
where
    ST: AsRef<str>,
{
    fn count<S: AsRef<str>>(&self, message: S) -> usize {
        self.as_ref()
            .lines()
            .filter(|line| line.contains(message.as_ref()))
            .count()
    }

    fn count_regex<S: AsRef<str>>(&self, regex: S) -> usize {
        let regex = regex::Regex::new(regex.as_ref()).unwrap();
        self.as_ref()
            .lines()
            .filter(|line| regex.is_match(line))
            .count()
    }
}
