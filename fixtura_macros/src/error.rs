/// Module for error rendering stuff
use proc_macro2::TokenStream;
use syn::{spanned::Spanned, FnArg, ItemFn};

use crate::{
    parse::fixture::FixtureInfo,
    refident::{MaybeBorrowed, MaybeIdent},
};

pub mod messages {
    pub const NOT_A_REFERENCE: &str =
        "Fixture arguments are borrowed from other fixtures: take them by reference (`&T`).";
    pub const DESTRUCT: &str =
        "Fixture arguments should be plain identifiers: the name selects the fixture to inject.";
    pub const FINALIZER_TYPE: &str =
        "The #[finalizer] argument should be a mutable reference: `&mut Finalizer`.";
    pub fn use_more_than_once(name: &str) -> String {
        format!("You cannot use '{name}' attribute more than once for the same argument")
    }
}

pub(crate) fn fixture(fixture: &ItemFn, info: &FixtureInfo) -> TokenStream {
    receiver(fixture)
        .chain(async_fixture(fixture))
        .chain(generic_fixture(fixture))
        .chain(not_injectable_arguments(fixture, info))
        .map(|e| e.to_compile_error())
        .collect()
}

type Errors<'a> = Box<dyn Iterator<Item = syn::Error> + 'a>;

fn receiver(fixture: &ItemFn) -> Errors<'_> {
    Box::new(
        fixture
            .sig
            .inputs
            .iter()
            .filter(|a| matches!(a, FnArg::Receiver(_)))
            .map(|a| syn::Error::new_spanned(a, "Fixtures cannot be methods.")),
    )
}

fn async_fixture(fixture: &ItemFn) -> Errors<'_> {
    Box::new(fixture.sig.asyncness.iter().map(|a| {
        syn::Error::new_spanned(a, "Async fixtures are not supported: fixtures run in sequence.")
    }))
}

fn generic_fixture(fixture: &ItemFn) -> Errors<'_> {
    match fixture.sig.generics.params.is_empty() {
        true => Box::new(std::iter::empty()),
        false => Box::new(std::iter::once(syn::Error::new(
            fixture.sig.generics.span(),
            "Fixtures cannot be generic: the injected value must have a concrete type.",
        ))),
    }
}

fn not_injectable_arguments<'a>(fixture: &'a ItemFn, info: &'a FixtureInfo) -> Errors<'a> {
    Box::new(
        fixture
            .sig
            .inputs
            .iter()
            .filter(|a| matches!(a, FnArg::Typed(_)))
            .filter_map(move |a| match a.maybe_ident() {
                None => Some(syn::Error::new_spanned(a, messages::DESTRUCT)),
                Some(ident) if info.is_finalizer(ident) => match a {
                    FnArg::Typed(t) if matches!(t.ty.as_ref(), syn::Type::Reference(r) if r.mutability.is_some()) => None,
                    _ => Some(syn::Error::new_spanned(a, messages::FINALIZER_TYPE)),
                },
                Some(_) if a.maybe_borrowed().is_none() => {
                    Some(syn::Error::new_spanned(a, messages::NOT_A_REFERENCE))
                }
                Some(_) => None,
            }),
    )
}

#[derive(Debug, Default)]
pub struct ErrorsVec(Vec<syn::Error>);

pub(crate) fn _merge_errors<R1, R2>(
    r1: Result<R1, ErrorsVec>,
    r2: Result<R2, ErrorsVec>,
) -> Result<(R1, R2), ErrorsVec> {
    match (r1, r2) {
        (Ok(r1), Ok(r2)) => Ok((r1, r2)),
        (Ok(_), Err(e)) | (Err(e), Ok(_)) => Err(e),
        (Err(mut e1), Err(mut e2)) => {
            e1.append(&mut e2);
            Err(e1)
        }
    }
}

macro_rules! merge_errors {
    ($e:expr) => {
        $e
    };
    ($e:expr, $($es:expr), +) => {
        crate::error::_merge_errors($e, merge_errors!($($es),*))
    };
}

impl std::ops::Deref for ErrorsVec {
    type Target = Vec<syn::Error>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for ErrorsVec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<syn::Error> for ErrorsVec {
    fn from(errors: syn::Error) -> Self {
        vec![errors].into()
    }
}

impl From<Vec<syn::Error>> for ErrorsVec {
    fn from(errors: Vec<syn::Error>) -> Self {
        Self(errors)
    }
}

impl From<ErrorsVec> for Vec<syn::Error> {
    fn from(v: ErrorsVec) -> Self {
        v.0
    }
}

impl quote::ToTokens for ErrorsVec {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(self.0.iter().map(|e| e.to_compile_error()))
    }
}

impl From<ErrorsVec> for proc_macro::TokenStream {
    fn from(v: ErrorsVec) -> Self {
        use quote::ToTokens;
        v.into_token_stream().into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{parse::ExtendWithFunctionAttrs, test::*};
    use crate::test::assert_eq;
    use fixtura_test::assert_in;

    fn errors(code: &str) -> String {
        let mut item_fn: ItemFn = code.ast();
        let mut info = FixtureInfo::default();
        info.extend_with_function_attrs(&mut item_fn).unwrap();
        fixture(&item_fn, &info).to_string()
    }

    #[rstest]
    #[case::by_value("fn f(db: Db) -> u32 {}", "take them by reference")]
    #[case::by_mut_ref("fn f(db: &mut Db) -> u32 {}", "take them by reference")]
    #[case::destruct("fn f((a, b): &(u32, u32)) -> u32 {}", "plain identifiers")]
    #[case::asyncness("async fn f() -> u32 {}", "Async fixtures are not supported")]
    #[case::generic("fn f<T: Default>() -> T {}", "cannot be generic")]
    #[case::finalizer_by_value("fn f(#[finalizer] fin: Finalizer) -> u32 {}", "`&mut Finalizer`")]
    fn reject_fixtures_that_cannot_be_injected(#[case] code: &str, #[case] message: &str) {
        assert_in!(errors(code), message);
    }

    #[rstest]
    #[case::no_args("fn f() -> u32 {}")]
    #[case::references("fn f(a: &u32, b: &String) -> u32 {}")]
    #[case::finalizer("fn f(a: &u32, #[finalizer] fin: &mut Finalizer) -> u32 {}")]
    fn accept_valid_fixtures(#[case] code: &str) {
        assert_eq!("", errors(code));
    }

    #[test]
    fn merge_all_errors() {
        let a: Result<(), ErrorsVec> = Err(syn::Error::new(proc_macro2::Span::call_site(), "a").into());
        let b: Result<(), ErrorsVec> = Ok(());
        let c: Result<(), ErrorsVec> = Err(syn::Error::new(proc_macro2::Span::call_site(), "c").into());

        let merged = merge_errors!(a, b, c).unwrap_err();

        assert_eq!(vec!["a", "c"], merged.iter().map(|e| e.to_string()).collect::<Vec<_>>());
    }
}
