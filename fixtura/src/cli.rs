/// Command line entry point of a test binary.
use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{capture, case::SKIP, config::Config, Selection, Suite};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "FIXTURA_LOG";

/// Run the fixtura tests of this binary.
#[derive(Parser, Debug, Default, PartialEq)]
#[command(version, about)]
pub struct Args {
    /// Run just the tests whose id contains FILTER
    pub filter: Option<String>,

    /// Run just the tests marked with NAME
    #[arg(short, long, value_name = "NAME")]
    pub marker: Option<String>,

    /// Run just the tests whose id contains SUBSTR (can be repeated)
    #[arg(short, long = "keyword", value_name = "SUBSTR")]
    pub keywords: Vec<String>,

    /// List the selected tests instead of running them
    #[arg(long)]
    pub list: bool,

    /// Show the registered markers
    #[arg(long)]
    pub markers: bool,

    /// Show the fixtures and where they are defined
    #[arg(long)]
    pub fixtures: bool,

    /// Fail the tests that use markers that are not registered
    #[arg(long)]
    pub strict_markers: bool,

    /// Configuration file [default: ./fixtura.toml if present]
    #[arg(long, env = "FIXTURA_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More logs on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print just failures and the summary
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print panic messages as they happen
    #[arg(long, hide = true)]
    pub nocapture: bool,

    /// Match FILTER and keywords against the whole test id or name
    #[arg(long)]
    pub exact: bool,

    #[arg(long, hide = true)]
    pub test_threads: Option<usize>,

    // Other libtest flags that cargo and IDE runners pass on: accepted and
    // ignored.
    #[arg(long, hide = true)]
    pub ignored: bool,

    #[arg(long, hide = true)]
    pub include_ignored: bool,

    #[arg(long, hide = true)]
    pub show_output: bool,

    #[arg(long, hide = true, value_name = "FORMAT")]
    pub format: Option<String>,

    #[arg(long, hide = true, value_name = "WHEN")]
    pub color: Option<String>,
}

impl Args {
    pub fn selection(&self) -> Selection {
        let selection = self
            .marker
            .iter()
            .fold(Selection::all(), |s, m| s.with_marker(m));
        self.filter
            .iter()
            .chain(self.keywords.iter())
            .fold(selection, |s, k| s.with_keyword(k))
            .exact(self.exact)
    }

    fn level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::ERROR,
            (_, 0) => LevelFilter::WARN,
            (_, 1) => LevelFilter::INFO,
            (_, 2) => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Logs go to stderr, filtered by `FIXTURA_LOG` or by the verbosity flags.
pub fn init_logging(args: &Args) {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV)
        .with_default_directive(args.level().into())
        .from_env_lossy();
    // A subscriber installed by the caller wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn list_markers(config: &Config, out: &mut impl Write) -> io::Result<()> {
    for (name, description) in &config.markers {
        writeln!(out, "{name}: {description}")?;
    }
    writeln!(out, "{SKIP}: skip the test without resolving its fixtures")
}

fn list_fixtures(suite: &Suite, out: &mut impl Write) -> io::Result<()> {
    for (_, location, def) in suite.registry().iter() {
        writeln!(
            out,
            "{} [{}] -- {location}{}",
            def.name(),
            def.get_scope(),
            if def.dependencies().is_empty() {
                String::new()
            } else {
                format!(" (requires {})", def.dependencies().join(", "))
            }
        )?;
    }
    Ok(())
}

fn list_tests(suite: &Suite, selection: &Selection, out: &mut impl Write) -> io::Result<()> {
    let (selected, _) = selection.apply(suite.tests());
    for case in &selected {
        let markers = case.markers().collect::<Vec<_>>();
        if markers.is_empty() {
            writeln!(out, "{}: test", case.id())?;
        } else {
            writeln!(out, "{}: test [{}]", case.id(), markers.join(", "))?;
        }
    }
    writeln!(out, "\n{} tests", selected.len())
}

/// Do what `args` ask on `suite`, writing to `out`. Returns whether the run
/// succeeded.
pub fn execute(
    suite: &Suite,
    args: &Args,
    config: &Config,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let selection = args.selection();
    if args.markers {
        list_markers(config, out).context("cannot write markers")?;
        return Ok(true);
    }
    if args.fixtures {
        list_fixtures(suite, out).context("cannot write fixtures")?;
        return Ok(true);
    }
    if args.list {
        list_tests(suite, &selection, out).context("cannot write tests")?;
        return Ok(true);
    }
    capture::echo_panics(args.nocapture);
    let options = config
        .run_options(selection)
        .strict_markers(config.strict_markers || args.strict_markers);
    let report = suite.run(&options);
    let written = if args.quiet {
        report.render_quiet(out)
    } else {
        report.render(out)
    };
    written.context("cannot write report")?;
    Ok(report.is_success())
}

/// Entry point for a `harness = false` test binary: parse the command line,
/// run `suite` and turn the result in the process exit code (`0` success,
/// `1` failures or errors, `2` usage or configuration problems).
pub fn main(suite: Suite) -> ExitCode {
    let args = Args::parse();
    init_logging(&args);
    let outcome = std::env::current_dir()
        .context("cannot find the working directory")
        .and_then(|dir| {
            Config::discover(args.config.as_deref(), dir).context("cannot load configuration")
        })
        .map(|config| execute(&suite, &args, &config, &mut io::stdout().lock()));
    match outcome {
        Ok(Ok(true)) => ExitCode::SUCCESS,
        Ok(Ok(false)) => ExitCode::from(1),
        Ok(Err(e)) | Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
