/// `#[mark(..)]` arguments: the markers of a test.
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    Ident, ItemFn, Token,
};

use crate::utils::attr_ends_with;

#[derive(PartialEq, Debug, Default, Clone)]
pub(crate) struct Markers(pub(crate) Vec<Ident>);

impl Parse for Markers {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let markers = Punctuated::<Ident, Token![,]>::parse_terminated(input)?;
        if markers.is_empty() {
            return Err(input.error("Expected at least a marker: #[mark(smoke)]"));
        }
        Ok(Self(markers.into_iter().collect()))
    }
}

impl Markers {
    /// Collect the markers of every `#[mark(..)]` attribute of `item_fn`.
    pub(crate) fn of(item_fn: &ItemFn) -> syn::Result<Self> {
        let mut markers = Vec::new();
        for attr in item_fn.attrs.iter().filter(|a| attr_ends_with(a, "mark")) {
            markers.extend(attr.parse_args::<Markers>()?.0);
        }
        Ok(Self(markers))
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}
