use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_quote, ItemFn, Visibility};

use super::{crate_resolver, inject};
use crate::{parse::fixture::FixtureInfo, utils::returns_result};

/// Render the fixture's companion struct: `name::NAME` is the registered
/// name and `name::def()` builds the definition to register.
pub(crate) fn render(fixture: ItemFn, info: FixtureInfo) -> TokenStream {
    let krate = crate_resolver();
    let name = &fixture.sig.ident;
    let fixture_name = info
        .name
        .as_ref()
        .map(|n| n.value())
        .unwrap_or_else(|| name.to_string());
    let visibility: Visibility = match &fixture.vis {
        Visibility::Inherited => parse_quote! { pub(crate) },
        vis => vis.clone(),
    };
    let request = format_ident!("__request");
    let finalizer = format_ident!("__finalizer");

    let args = inject::resolve_arguments(fixture.sig.inputs.iter(), &info, &request, &finalizer);
    let call = quote! { #name(#(#args),*) };
    let produce = if returns_result(&fixture.sig.output) {
        quote! { #call.map_err(#krate::ProducerError::failed) }
    } else {
        quote! { Ok(#call) }
    };

    let requested = inject::requested(fixture.sig.inputs.iter(), &info).collect::<Vec<_>>();
    let requires = (!requested.is_empty()).then(|| quote! { .requires([#(#requested),*]) });
    let scope = info
        .is_once()
        .then(|| quote! { .scope(#krate::Scope::Session) });

    quote! {
        #[allow(non_camel_case_types)]
        #visibility struct #name {}

        impl #name {
            pub const NAME: &'static str = #fixture_name;

            pub fn def() -> #krate::FixtureDef {
                #krate::FixtureDef::new(
                    Self::NAME,
                    |#request: &#krate::Request<'_>, #finalizer: &mut #krate::Finalizer| {
                        #produce
                    },
                )
                #requires
                #scope
            }
        }

        #[allow(dead_code)]
        #fixture
    }
}

#[cfg(test)]
mod should {
    use super::*;
    use crate::{parse::ExtendWithFunctionAttrs, test::*};
    use crate::test::assert_eq;
    use syn::{ImplItem, ItemImpl, ItemStruct};

    struct Rendered {
        companion: ItemStruct,
        def: ItemImpl,
        fixture: ItemFn,
    }

    fn render_fixture(args: &str, code: &str) -> Rendered {
        let mut info: FixtureInfo = args.ast();
        let mut item_fn: ItemFn = code.ast();
        info.extend_with_function_attrs(&mut item_fn).unwrap();
        let file: syn::File = render(item_fn, info).ast();
        let mut items = file.items.into_iter();
        match (items.next(), items.next(), items.next()) {
            (Some(syn::Item::Struct(companion)), Some(syn::Item::Impl(def)), Some(syn::Item::Fn(fixture))) => {
                Rendered {
                    companion,
                    def,
                    fixture,
                }
            }
            other => panic!("Unexpected rendered items: {other:?}"),
        }
    }

    fn const_value(def: &ItemImpl) -> String {
        def.items
            .iter()
            .find_map(|item| match item {
                ImplItem::Const(c) => Some(c.expr.display_code()),
                _ => None,
            })
            .unwrap()
    }

    fn def_body(def: &ItemImpl) -> String {
        def.items
            .iter()
            .find_map(|item| match item {
                ImplItem::Fn(f) if f.sig.ident == "def" => Some(f.block.display_code()),
                _ => None,
            })
            .unwrap()
    }

    #[rstest]
    #[case::private("fn user() -> u32 { 42 }", "pub (crate)")]
    #[case::public("pub fn user() -> u32 { 42 }", "pub")]
    #[case::restricted("pub(super) fn user() -> u32 { 42 }", "pub (super)")]
    fn define_a_companion_struct_visible_by_the_suite(#[case] code: &str, #[case] vis: &str) {
        let rendered = render_fixture("", code);

        assert_eq!(ident("user"), rendered.companion.ident);
        assert_eq!(vis, rendered.companion.vis.display_code());
        assert_eq!(r#""user""#, const_value(&rendered.def));
    }

    #[test]
    fn use_the_given_name() {
        let rendered = render_fixture(r#"name = "admin""#, "fn administrator() -> u32 { 42 }");

        assert_eq!(r#""admin""#, const_value(&rendered.def));
        assert_eq!(ident("administrator"), rendered.companion.ident);
    }

    #[test]
    fn request_the_dependencies() {
        let rendered = render_fixture(
            "",
            "fn user(#[from(sample_data)] data: &Data, db: &Db) -> User { todo!() }",
        );

        let body = def_body(&rendered.def);
        fixtura_test::assert_in!(body, r#". requires (["sample_data" , "db"])"#);
        fixtura_test::assert_in!(body, r#"user (__request . get ("sample_data") ? , __request . get ("db") ?)"#);
    }

    #[test]
    fn keep_the_fixture_function_without_argument_attributes() {
        let rendered = render_fixture(
            "",
            "fn user(#[from(sample_data)] data: &Data, #[finalizer] fin: &mut Finalizer) -> User { todo!() }",
        );

        assert_eq!(
            "fn user(data: &Data, fin: &mut Finalizer) -> User { todo!() }".ast::<ItemFn>().sig,
            rendered.fixture.sig
        );
        assert!(rendered.fixture.attrs.iter().any(|a| a.display_code().contains("dead_code")));
    }

    #[rstest]
    #[case::plain("fn f() -> u32 { 42 }", "Ok (f ())", false)]
    #[case::fallible(
        "fn f() -> Result<u32, String> { Ok(42) }",
        "f () . map_err (:: fixtura :: ProducerError :: failed)",
        false
    )]
    #[case::once("#[once] fn f() -> u32 { 42 }", "Ok (f ())", true)]
    fn produce_the_value(
        #[case] code: &str,
        #[case] produce: &str,
        #[case] session: bool,
    ) {
        let rendered = render_fixture("", code);

        let body = def_body(&rendered.def);
        fixtura_test::assert_in!(body, produce);
        assert_eq!(session, body.contains("Scope :: Session"));
        assert!(!body.contains("requires"));
    }

    #[test]
    fn remove_the_once_attribute() {
        let rendered = render_fixture("", "#[once] fn f() -> u32 { 42 }");

        assert!(!rendered.fixture.attrs.iter().any(|a| a.path().is_ident("once")));
    }
}
