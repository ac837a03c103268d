extern crate proc_macro;

// Test utility module
#[cfg(test)]
pub(crate) mod test;

#[macro_use]
mod error;
mod parse;
mod refident;
mod render;
mod utils;

use syn::{parse_macro_input, ItemFn};

use crate::parse::{
    discover::{scan, DiscoverArgs},
    fixture::FixtureInfo,
    mark::Markers,
    sys::DefaultSysEngine,
};
use parse::ExtendWithFunctionAttrs;
use quote::ToTokens;

/// Define a fixture: a named producer of test setup data. Every test that
/// names the fixture as an argument receives a reference to the produced
/// value. Fixtures can depend on other fixtures in the same way.
///
/// ```ignore
/// use fixtura::fixture;
/// use std::collections::HashMap;
///
/// #[fixture]
/// pub fn sample_data() -> HashMap<&'static str, &'static str> {
///     HashMap::from([("username", "testuser"), ("role", "qa_engineer")])
/// }
///
/// #[fixture]
/// pub fn username(sample_data: &HashMap<&'static str, &'static str>) -> String {
///     sample_data["username"].to_owned()
/// }
/// ```
///
/// The macro keeps the function as is and adds a companion struct with the
/// same name: `sample_data::NAME` is the registered name and
/// `sample_data::def()` returns the [`FixtureDef`] to register in a `Suite`.
/// [`discover!`] does the registration for you.
///
/// # Rename
///
/// Register the fixture with another name with `#[fixture(name = "...")]`,
/// and inject a fixture in an argument with another name with
/// `#[from(...)]`:
///
/// ```ignore
/// #[fixture(name = "admin")]
/// pub fn administrator(#[from(sample_data)] data: &Data) -> User {
///     User::admin(data)
/// }
/// ```
///
/// # Fallible fixtures
///
/// A fixture that returns a `Result` can fail: every test that depends on it
/// reports a setup error with the error's message.
///
/// ```ignore
/// #[fixture]
/// pub fn config() -> Result<Config, std::io::Error> {
///     Config::load("config.toml")
/// }
/// ```
///
/// # Teardown
///
/// Mark an `&mut Finalizer` argument with `#[finalizer]` and push the code
/// that should run when the test ends, whatever its result is. Finalizers
/// run in reverse order of acquisition.
///
/// ```ignore
/// #[fixture]
/// pub fn workdir(#[finalizer] finalizer: &mut Finalizer) -> PathBuf {
///     let dir = create_workdir();
///     let cleanup = dir.clone();
///     finalizer.add(move || std::fs::remove_dir_all(cleanup).unwrap());
///     dir
/// }
/// ```
///
/// # Once
///
/// A `#[once]` fixture is built at most once per run and shared by every
/// test; its finalizers run when the run ends.
///
/// ```ignore
/// #[fixture]
/// #[once]
/// pub fn server() -> Server {
///     Server::start()
/// }
/// ```
///
/// [`FixtureDef`]: https://docs.rs/fixtura/latest/fixtura/fixture/struct.FixtureDef.html
#[proc_macro_attribute]
pub fn fixture(
    args: proc_macro::TokenStream,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let mut info: FixtureInfo = parse_macro_input!(args as FixtureInfo);
    let mut fixture = parse_macro_input!(input as ItemFn);

    let extend_result = info.extend_with_function_attrs(&mut fixture);

    let mut errors = error::fixture(&fixture, &info);

    if let Err(attrs_errors) = extend_result {
        attrs_errors.to_tokens(&mut errors);
    }

    if errors.is_empty() {
        render::fixture(fixture, info)
    } else {
        errors
    }
    .into()
}

/// Tag a test with one or more markers: `cargo test -- -m smoke` runs just
/// the tests marked `smoke`. The `skip` marker makes the runner skip the
/// test.
///
/// ```ignore
/// use fixtura::mark;
///
/// #[mark(smoke)]
/// pub fn test_login() {}
///
/// #[mark(regression, skip)]
/// pub fn test_legacy_login() {}
/// ```
///
/// The attribute leaves the function untouched: [`discover!`] reads the
/// markers when it collects the test.
#[proc_macro_attribute]
pub fn mark(
    args: proc_macro::TokenStream,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let _markers = parse_macro_input!(args as Markers);
    input
}

/// Scan a directory at compile time and build the suite from what it
/// contains. The path is relative to the crate root.
///
/// ```ignore
/// fixtura::discover!("tests/suite");
///
/// fn main() -> std::process::ExitCode {
///     fixtura::main(discovered())
/// }
/// ```
///
/// Every `conftest.rs` and `test_*.rs` file below the directory becomes a
/// module, and the macro defines a `discovered()` function that returns the
/// `Suite` where:
///
/// - every `#[fixture]` in a `conftest.rs` is registered at its directory,
///   so it's visible in the directory and in all its subdirectories;
/// - every `#[fixture]` in a test file is visible just in that file;
/// - every `pub fn test_*` in a test file is a test: its arguments are the
///   fixtures it requests (by reference) and its `#[mark(...)]` attributes
///   are its markers.
///
/// Files and directories whose name starts with a dot are ignored. Use
/// `exclude("<regex>")` to ignore other paths: the regex is matched against
/// the path relative to the scanned directory.
///
/// ```ignore
/// fixtura::discover!("tests/suite", exclude("^wip/"));
/// ```
///
/// A file that cannot be parsed, or a test that cannot be collected, is
/// reported as an error when the suite runs while everything else still
/// runs. The scan happens at compile time: a new file is discovered at the
/// next build.
#[proc_macro]
pub fn discover(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let args = parse_macro_input!(input as DiscoverArgs);

    match scan::<DefaultSysEngine>(&args) {
        Ok(hierarchy) => render::discover(&hierarchy),
        Err(e) => syn::Error::new_spanned(&args.dir, e.to_string()).to_compile_error(),
    }
    .into()
}
