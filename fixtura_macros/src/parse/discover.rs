/// `discover!` arguments and the compile time scan of the test directory.
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use quote::format_ident;
use regex::Regex;
use relative_path::RelativePath;
use syn::{
    parenthesized,
    parse::{Parse, ParseStream},
    FnArg, Ident, Item, ItemFn, LitStr, Token,
};

use super::{
    hierarchy::{relative_to, File, Folder, Hierarchy, HierarchyError},
    mark::Markers,
    sys::SysEngine,
};
use crate::{
    refident::{MaybeBorrowed, MaybeIdent},
    utils::{attr_ends_with, is_crate_visible, sanitize_ident},
};

pub(crate) const CONFTEST: &str = "conftest.rs";
const PATTERNS: [&str; 2] = ["**/conftest.rs", "**/test_*.rs"];

/// `discover!("tests/suite", exclude("<regex>"))`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DiscoverArgs {
    pub(crate) dir: LitStr,
    exclude: Option<Exclude>,
}

impl Parse for DiscoverArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let dir: LitStr = input.parse()?;
        let mut exclude = None;
        if input.parse::<Option<Token![,]>>()?.is_some() && !input.is_empty() {
            exclude = Some(input.parse::<Exclude>()?);
            input.parse::<Option<Token![,]>>()?;
        }
        if dir.value().is_empty() {
            return Err(syn::Error::new_spanned(
                dir,
                "Expected the directory to scan, relative to the crate root",
            ));
        }
        Ok(Self { dir, exclude })
    }
}

impl DiscoverArgs {
    /// Dot files and directories are ignored, as the paths that match the
    /// exclude regex.
    pub(crate) fn is_valid(&self, p: &RelativePath) -> bool {
        if p.components().any(|c| c.as_str().starts_with('.')) {
            return false;
        }
        match self.exclude.as_ref() {
            Some(exclude) => !exclude.r.is_match(p.as_str()),
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
struct Exclude {
    s: LitStr,
    r: Regex,
}

impl PartialEq for Exclude {
    fn eq(&self, other: &Self) -> bool {
        self.s == other.s
    }
}

impl Parse for Exclude {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: Ident = input.parse()?;
        if name != format_ident!("exclude") {
            return Err(syn::Error::new_spanned(
                name,
                r#"Use exclude("<regex>") to exclude some paths"#,
            ));
        }
        let content;
        let _ = parenthesized!(content in input);
        let s: LitStr = content.parse()?;
        Regex::new(&s.value())
            .map_err(|e| syn::Error::new_spanned(&s, format!("Should be a valid regex: {e}")))
            .map(|r| Self { s, r })
    }
}

/// A test function and what it needs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TestEntry {
    pub(crate) ident: Ident,
    pub(crate) fixtures: Vec<Ident>,
    pub(crate) markers: Vec<String>,
}

/// What a discovered file contributes to the suite.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct SourceFile {
    pub(crate) fixtures: Vec<Ident>,
    pub(crate) tests: Vec<TestEntry>,
    /// Problems that exclude a single item: the rest of the file still runs.
    pub(crate) errors: Vec<String>,
}

/// `Err` when the file cannot be read or parsed at all.
pub(crate) type Content = Result<SourceFile, String>;

pub(crate) fn is_test_file(name: &str) -> bool {
    name.starts_with("test_") && name.ends_with(".rs")
}

impl SourceFile {
    pub(crate) fn analyze(file: &syn::File, test_file: bool) -> Self {
        let mut source = Self::default();
        for item_fn in file.items.iter().filter_map(|item| match item {
            Item::Fn(item_fn) => Some(item_fn),
            _ => None,
        }) {
            if item_fn.attrs.iter().any(|a| attr_ends_with(a, "fixture")) {
                source.fixtures.push(item_fn.sig.ident.clone());
            } else if test_file && item_fn.sig.ident.to_string().starts_with("test_") {
                match test_entry(item_fn) {
                    Ok(entry) => source.tests.push(entry),
                    Err(e) => source.errors.push(e),
                }
            }
        }
        source
    }
}

fn test_entry(item_fn: &ItemFn) -> Result<TestEntry, String> {
    let name = &item_fn.sig.ident;
    if !is_crate_visible(&item_fn.vis) {
        return Err(format!(
            "test `{name}` is not collected: declare it `pub` or `pub(crate)`"
        ));
    }
    if item_fn.sig.asyncness.is_some() {
        return Err(format!("test `{name}` is not collected: async tests are not supported"));
    }
    if !item_fn.sig.generics.params.is_empty() {
        return Err(format!("test `{name}` is not collected: tests cannot be generic"));
    }
    let fixtures = item_fn
        .sig
        .inputs
        .iter()
        .map(|arg| fixture_argument(name, arg))
        .collect::<Result<Vec<_>, _>>()?;
    let markers = Markers::of(item_fn)
        .map_err(|e| format!("test `{name}` is not collected: invalid markers: {e}"))?;
    Ok(TestEntry {
        ident: name.clone(),
        fixtures,
        markers: markers.names(),
    })
}

fn fixture_argument(test: &Ident, arg: &FnArg) -> Result<Ident, String> {
    let ident = arg.maybe_ident().ok_or_else(|| {
        format!("test `{test}` is not collected: arguments should be plain fixture names")
    })?;
    match arg.maybe_borrowed() {
        Some(_) => Ok(ident.clone()),
        None => Err(format!(
            "test `{test}` is not collected: take the fixture `{ident}` by reference (`&T`)"
        )),
    }
}

fn read_source<S: SysEngine>(path: &Path, relative: &RelativePath) -> Content {
    let name = relative.file_name().unwrap_or_default();
    let content = S::read_file(path).map_err(|e| format!("cannot read file: {e}"))?;
    let file = syn::parse_file(&content).map_err(|e| format!("cannot parse file: {e}"))?;
    Ok(SourceFile::analyze(&file, is_test_file(name)))
}

/// Scan `args.dir` below the crate root.
pub(crate) fn scan<S: SysEngine>(args: &DiscoverArgs) -> Result<Hierarchy<Content>, HierarchyError> {
    let crate_root = S::crate_root().map_err(HierarchyError::CrateRoot)?;
    scan_dir::<S>(&crate_root.join(args.dir.value()), args)
}

pub(crate) fn scan_dir<S: SysEngine>(
    dir: &Path,
    args: &DiscoverArgs,
) -> Result<Hierarchy<Content>, HierarchyError> {
    let root = dir
        .canonicalize()
        .ok()
        .filter(|r| r.is_dir())
        .ok_or_else(|| HierarchyError::NotADirectory(dir.to_owned()))?;
    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in PATTERNS {
        files.extend(S::find(&root, pattern).map_err(HierarchyError::InvalidGlob)?);
    }
    files.sort();
    files.dedup();
    let mut selected = Vec::with_capacity(files.len());
    for file in files {
        if args.is_valid(&relative_to(&root, &file)?) {
            selected.push(file);
        }
    }
    let mut hierarchy = Hierarchy::build(&root, selected, read_source::<S>)?;
    report_module_clashes(&mut hierarchy.folder, &root);
    Ok(hierarchy)
}

/// Files and folders of the same folder that would become modules with the
/// same name. The later ones become errors and are not included.
fn report_module_clashes(folder: &mut Folder<Content>, dir: &Path) {
    let mut modules = HashSet::new();
    for file in folder.files.iter_mut().filter(|f| f.content.is_ok()) {
        let module = sanitize_ident(file.stem()).to_string();
        if !modules.insert(module.clone()) {
            file.content = Err(format!(
                "cannot include `{}`: module `{module}` is already defined by another file or directory",
                file.name
            ));
        }
    }
    let mut clashing = Vec::new();
    for inner in std::mem::take(&mut folder.folders) {
        let path = dir.join(&inner.name);
        let module = sanitize_ident(&inner.name).to_string();
        if modules.insert(module.clone()) {
            folder.folders.push(inner);
        } else {
            clashing.push(File::new(
                inner.name.clone(),
                path,
                Err(format!(
                    "cannot include directory `{}`: module `{module}` is already defined by another file or directory",
                    inner.name
                )),
            ));
        }
    }
    folder.files.extend(clashing);
    for inner in &mut folder.folders {
        let path = dir.join(&inner.name);
        report_module_clashes(inner, &path);
    }
}

#[cfg(test)]
mod should {
    use super::*;
    use crate::{parse::sys::DefaultSysEngine, test::*};
    use std::fs;
    use temp_testdir::TempDir;

    fn analyze(code: &str, test_file: bool) -> SourceFile {
        SourceFile::analyze(&syn::parse_file(code).unwrap(), test_file)
    }

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    mod parse_args {
        use super::*;
        use crate::test::assert_eq;

        #[rstest]
        #[case::dir(r#""tests/suite""#, "tests/suite")]
        #[case::trailing_comma(r#""tests/suite","#, "tests/suite")]
        #[case::exclude(r#""tests/suite", exclude("skip_me")"#, "tests/suite")]
        fn accept(#[case] args: &str, #[case] dir: &str) {
            let args: DiscoverArgs = args.ast();

            assert_eq!(dir, args.dir.value());
        }

        #[rstest]
        #[case::empty_dir(r#""""#, "Expected the directory")]
        #[case::unknown_option(r#""tests", include("a")"#, "exclude")]
        #[case::invalid_regex(r#""tests", exclude("[")"#, "valid regex")]
        fn reject(#[case] args: &str, #[case] message: &str) {
            let error = syn::parse_str::<DiscoverArgs>(args).unwrap_err();

            fixtura_test::assert_in!(error.to_string(), message);
        }

        #[rstest]
        #[case::plain("test_a.rs", true)]
        #[case::nested("api/test_a.rs", true)]
        #[case::dot_dir(".hidden/test_a.rs", false)]
        #[case::dot_file("api/.test_a.rs", false)]
        #[case::excluded("legacy/test_a.rs", false)]
        fn select_valid_paths(#[case] path: &str, #[case] expected: bool) {
            let args: DiscoverArgs = r#""tests", exclude("^legacy/")"#.ast();

            assert_eq!(expected, args.is_valid(RelativePath::new(path)));
        }
    }

    mod analyze {
        use super::*;
        use crate::test::assert_eq;

        #[test]
        fn collect_fixtures_and_tests() {
            let source = analyze(
                r#"
                use fixtura::{fixture, mark};

                #[fixture]
                fn user() -> String { "user".into() }

                #[fixtura::fixture(name = "admin")]
                pub fn administrator(user: &String) -> String { user.clone() }

                fn helper() {}

                #[mark(smoke, regression)]
                pub fn test_login(user: &String, admin: &String) {}

                pub(crate) fn test_logout() {}
                "#,
                true,
            );

            assert_eq!(vec![ident("user"), ident("administrator")], source.fixtures);
            assert_eq!(
                vec![
                    TestEntry {
                        ident: ident("test_login"),
                        fixtures: vec![ident("user"), ident("admin")],
                        markers: vec!["smoke".to_owned(), "regression".to_owned()],
                    },
                    TestEntry {
                        ident: ident("test_logout"),
                        fixtures: vec![],
                        markers: vec![],
                    },
                ],
                source.tests
            );
            assert!(source.errors.is_empty());
        }

        #[test]
        fn ignore_tests_in_conftest() {
            let source = analyze("pub fn test_nothing() {}", false);

            assert!(source.tests.is_empty());
            assert!(source.errors.is_empty());
        }

        #[rstest]
        #[case::private("fn test_x() {}", "declare it `pub`")]
        #[case::restricted("pub(super) fn test_x() {}", "declare it `pub`")]
        #[case::asyncness("pub async fn test_x() {}", "async tests")]
        #[case::generic("pub fn test_x<T>() {}", "cannot be generic")]
        #[case::by_value("pub fn test_x(user: String) {}", "take the fixture `user` by reference")]
        #[case::destruct("pub fn test_x((a, b): &(u32, u32)) {}", "plain fixture names")]
        #[case::bad_marker(r#"#[mark("smoke")] pub fn test_x() {}"#, "invalid markers")]
        fn report_tests_that_cannot_be_collected(#[case] code: &str, #[case] message: &str) {
            let source = analyze(code, true);

            assert!(source.tests.is_empty());
            assert_eq!(1, source.errors.len());
            fixtura_test::assert_in!(source.errors[0], message);
        }
    }

    mod scan {
        use super::*;
        use crate::test::assert_eq;

        #[test]
        fn find_conftest_and_test_files_in_lexical_order() {
            let root = TempDir::default();
            let suite = root.join("suite");
            write(&suite, "conftest.rs", "#[fixture] pub fn data() -> u32 { 42 }");
            write(&suite, "test_b.rs", "pub fn test_b() {}");
            write(&suite, "test_a.rs", "pub fn test_a(data: &u32) {}");
            write(&suite, "helpers.rs", "pub fn test_not_collected() {}");
            write(&suite, "api/conftest.rs", "");
            write(&suite, ".cache/test_hidden.rs", "pub fn test_hidden() {}");
            let args: DiscoverArgs = r#""suite""#.ast();

            let hierarchy = scan_dir::<DefaultSysEngine>(&suite, &args).unwrap();

            let folder = hierarchy.folder;
            assert_eq!("suite", folder.name);
            assert_eq!(
                vec!["conftest.rs", "test_a.rs", "test_b.rs"],
                folder.files.iter().map(|f| f.name.as_str()).collect::<Vec<_>>()
            );
            assert_eq!(
                vec!["api"],
                folder.folders.iter().map(|f| f.name.as_str()).collect::<Vec<_>>()
            );
            let conftest = folder.file(CONFTEST).unwrap().content.as_ref().unwrap();
            assert_eq!(vec![ident("data")], conftest.fixtures);
        }

        #[test]
        fn keep_unparsable_files_as_errors() {
            let root = TempDir::default();
            let suite = root.join("suite");
            write(&suite, "test_broken.rs", "pub fn test_broken( {");

            let hierarchy = scan_dir::<DefaultSysEngine>(&suite, &r#""suite""#.ast()).unwrap();

            let error = hierarchy.folder.files[0].content.as_ref().unwrap_err();
            fixtura_test::assert_in!(error, "cannot parse file");
        }

        #[test]
        fn apply_the_exclude_regex() {
            let root = TempDir::default();
            let suite = root.join("suite");
            write(&suite, "test_a.rs", "");
            write(&suite, "wip/test_b.rs", "");

            let hierarchy =
                scan_dir::<DefaultSysEngine>(&suite, &r#""suite", exclude("^wip")"#.ast())
                    .unwrap();

            assert_eq!(1, hierarchy.folder.files.len());
            assert!(hierarchy.folder.folders.is_empty());
        }

        #[test]
        fn report_a_file_and_a_directory_with_the_same_module_name() {
            let root = TempDir::default();
            let suite = root.join("suite");
            write(&suite, "test_a.rs", "pub fn test_a() {}");
            write(&suite, "test_a/test_b.rs", "pub fn test_b() {}");

            let hierarchy = scan_dir::<DefaultSysEngine>(&suite, &r#""suite""#.ast()).unwrap();

            let folder = hierarchy.folder;
            assert!(folder.folders.is_empty());
            assert!(folder.file("test_a.rs").unwrap().content.is_ok());
            let error = folder.file("test_a").unwrap().content.as_ref().unwrap_err();
            fixtura_test::assert_in!(error, "module `test_a` is already defined");
        }

        #[test]
        fn report_directories_that_sanitize_to_the_same_module() {
            let root = TempDir::default();
            let suite = root.join("suite");
            write(&suite, "user-api/test_a.rs", "pub fn test_a() {}");
            write(&suite, "user_api/test_b.rs", "pub fn test_b() {}");

            let hierarchy = scan_dir::<DefaultSysEngine>(&suite, &r#""suite""#.ast()).unwrap();

            let folder = hierarchy.folder;
            assert_eq!(
                vec!["user-api"],
                folder.folders.iter().map(|f| f.name.as_str()).collect::<Vec<_>>()
            );
            let error = folder.file("user_api").unwrap();
            assert_eq!(suite.canonicalize().unwrap().join("user_api"), error.path);
            fixtura_test::assert_in!(
                error.content.as_ref().unwrap_err(),
                "cannot include directory `user_api`"
            );
        }

        #[test]
        fn fail_when_the_directory_does_not_exist() {
            let root = TempDir::default();

            let error =
                scan_dir::<DefaultSysEngine>(&root.join("missing"), &r#""missing""#.ast())
                    .unwrap_err();

            assert!(matches!(error, HierarchyError::NotADirectory(_)));
        }
    }
}
