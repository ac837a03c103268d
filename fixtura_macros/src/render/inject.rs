use proc_macro2::TokenStream;
use quote::quote;
use syn::{FnArg, Ident};

use crate::{parse::fixture::FixtureInfo, refident::MaybeIdent};

/// The expressions that feed the fixture's arguments: the `#[finalizer]`
/// argument takes the producer's finalizer, every other one borrows the
/// value of the fixture with its name from the request.
pub(crate) fn resolve_arguments<'a>(
    args: impl Iterator<Item = &'a FnArg> + 'a,
    info: &'a FixtureInfo,
    request: &'a Ident,
    finalizer: &'a Ident,
) -> impl Iterator<Item = TokenStream> + 'a {
    args.filter_map(MaybeIdent::maybe_ident).map(move |ident| {
        if info.is_finalizer(ident) {
            quote! { #finalizer }
        } else {
            request_value(request, info.resolve(ident))
        }
    })
}

/// The fixture names requested by the arguments, in order.
pub(crate) fn requested<'a>(
    args: impl Iterator<Item = &'a FnArg> + 'a,
    info: &'a FixtureInfo,
) -> impl Iterator<Item = String> + 'a {
    args.filter_map(MaybeIdent::maybe_ident)
        .filter(|ident| !info.is_finalizer(ident))
        .map(|ident| info.resolve(ident).to_string())
}

pub(crate) fn request_value(request: &Ident, fixture: &Ident) -> TokenStream {
    let name = fixture.to_string();
    quote! { #request.get(#name)? }
}
