use syn::{FnArg, ItemFn};

use crate::{error::ErrorsVec, refident::MaybeIdent};

pub(crate) mod discover;
pub(crate) mod fixture;
pub(crate) mod hierarchy;
pub(crate) mod mark;
pub(crate) mod sys;

pub(crate) trait ExtendWithFunctionAttrs {
    fn extend_with_function_attrs(
        &mut self,
        item_fn: &mut ItemFn,
    ) -> std::result::Result<(), ErrorsVec>;
}

/// Remove from the argument the attributes accepted by `is_valid_attr` and
/// build something from each of them.
pub(crate) fn extract_argument_attrs<'a, B: 'a + std::fmt::Debug>(
    node: &mut FnArg,
    is_valid_attr: fn(&syn::Attribute) -> bool,
    build: impl Fn(syn::Attribute) -> syn::Result<B> + 'a,
) -> Box<dyn Iterator<Item = syn::Result<B>> + 'a> {
    let name = node.maybe_ident().cloned();
    if name.is_none() {
        return Box::new(std::iter::empty());
    }

    if let FnArg::Typed(ref mut arg) = node {
        let attrs = std::mem::take(&mut arg.attrs);
        let (extracted, remain): (Vec<_>, Vec<_>) = attrs.into_iter().partition(is_valid_attr);

        arg.attrs = remain;

        Box::new(extracted.into_iter().map(build))
    } else {
        Box::new(std::iter::empty())
    }
}

/// Remove from the function the attributes accepted by `is_valid_attr`.
pub(crate) fn extract_fn_attrs(
    item_fn: &mut ItemFn,
    is_valid_attr: fn(&syn::Attribute) -> bool,
) -> Vec<syn::Attribute> {
    let attrs = std::mem::take(&mut item_fn.attrs);
    let (extracted, remain): (Vec<_>, Vec<_>) = attrs.into_iter().partition(is_valid_attr);
    item_fn.attrs = remain;
    extracted
}
