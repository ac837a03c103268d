use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, LitStr, Path};

use super::{crate_resolver, inject::request_value};
use crate::{
    parse::{
        discover::{Content, SourceFile, TestEntry, CONFTEST},
        hierarchy::{File, Folder, Hierarchy},
    },
    utils::sanitize_ident,
};

const ROOT_MODULE: &str = "__fixtura_discovered";

/// A discovered file: where it lives and how to reach its module.
struct Discovered<'a> {
    location: String,
    module: Vec<Ident>,
    file: &'a File<Content>,
    conftest: bool,
}

/// Render the modules that include every discovered file and the
/// `discovered()` function that builds the suite.
pub(crate) fn render(hierarchy: &Hierarchy<Content>) -> TokenStream {
    let krate = crate_resolver();
    let root = format_ident!("{ROOT_MODULE}");
    let modules = render_folder(&hierarchy.folder);

    let mut discovered = Vec::new();
    collect(&hierarchy.folder, "", &[root.clone()], &mut discovered);
    discovered.sort_by(|a, b| a.file.path.cmp(&b.file.path));

    let statements = discovered.iter().map(|d| render_file(&krate, d));

    quote! {
        #[allow(dead_code)]
        mod #root {
            #modules
        }

        /// The suite made of every discovered fixture and test.
        pub(crate) fn discovered() -> #krate::Suite {
            let mut suite = #krate::Suite::new();
            #(#statements)*
            suite
        }
    }
}

fn render_folder(folder: &Folder<Content>) -> TokenStream {
    let name = sanitize_ident(&folder.name);
    let files = folder
        .files
        .iter()
        .filter(|f| f.content.is_ok())
        .map(|f| {
            let module = sanitize_ident(f.stem());
            let path = LitStr::new(&f.path.display().to_string(), proc_macro2::Span::call_site());
            quote! {
                #[path = #path]
                pub(crate) mod #module;
            }
        });
    let folders = folder.folders.iter().map(render_folder);
    quote! {
        pub(crate) mod #name {
            #(#files)*
            #(#folders)*
        }
    }
}

fn collect<'a>(
    folder: &'a Folder<Content>,
    parent: &str,
    module: &[Ident],
    discovered: &mut Vec<Discovered<'a>>,
) {
    let location = match parent {
        "" => folder.name.clone(),
        parent => format!("{parent}/{}", folder.name),
    };
    let mut module = module.to_vec();
    module.push(sanitize_ident(&folder.name));
    for file in &folder.files {
        let conftest = file.name == CONFTEST;
        let mut file_module = module.clone();
        file_module.push(sanitize_ident(file.stem()));
        discovered.push(Discovered {
            location: match conftest {
                true => location.clone(),
                false => format!("{location}/{}", file.name),
            },
            module: file_module,
            file,
            conftest,
        });
    }
    for inner in &folder.folders {
        collect(inner, &location, &module, discovered);
    }
}

fn render_file(krate: &Path, discovered: &Discovered) -> TokenStream {
    let location = &discovered.location;
    let origin = match discovered.conftest {
        true => format!("{location}/{CONFTEST}"),
        false => location.clone(),
    };
    match &discovered.file.content {
        Err(message) => quote! {
            suite.discovery_error(#origin, #message);
        },
        Ok(SourceFile {
            fixtures,
            tests,
            errors,
        }) => {
            let module = &discovered.module;
            let fixtures = fixtures.iter().map(|fixture| {
                quote! {
                    suite.register(#location, #(#module::)* #fixture::def());
                }
            });
            let tests = tests
                .iter()
                .map(|test| render_test(krate, location, module, test));
            quote! {
                #(#fixtures)*
                #(suite.discovery_error(#origin, #errors);)*
                #(#tests)*
            }
        }
    }
}

fn render_test(krate: &Path, location: &str, module: &[Ident], test: &TestEntry) -> TokenStream {
    let TestEntry {
        ident,
        fixtures,
        markers,
    } = test;
    let name = ident.to_string();
    let request = format_ident!("__request");
    let args = fixtures.iter().map(|f| request_value(&request, f));
    let requested = fixtures.iter().map(ToString::to_string).collect::<Vec<_>>();
    let requires = (!requested.is_empty()).then(|| quote! { .requires([#(#requested),*]) });
    let marked = (!markers.is_empty()).then(|| quote! { .marked([#(#markers),*]) });
    quote! {
        suite.add_test(
            #krate::TestCase::new(#location, #name, |#request: &#krate::Request<'_>| {
                #krate::IntoTestResult::into_test_result(#(#module::)* #ident(#(#args),*))
            })
            #requires
            #marked
        );
    }
}
