pub(crate) mod discover;
pub(crate) mod fixture;
pub(crate) mod inject;

pub(crate) use discover::render as discover;
pub(crate) use fixture::render as fixture;

cfg_if::cfg_if! {
    if #[cfg(feature = "crate-name")] {
        mod crate_resolver;

        /// The path of the runtime crate as the caller names it.
        pub(crate) fn crate_resolver() -> syn::Path {
            crate_resolver::crate_name()
        }
    } else {
        pub(crate) fn crate_resolver() -> syn::Path {
            syn::parse_quote! { ::fixtura }
        }
    }
}
