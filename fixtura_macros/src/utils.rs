/// Contains some unsorted functions used across others modules
///
use quote::format_ident;
use syn::{Attribute, Ident, ReturnType, Type, Visibility};
use unicode_ident::{is_xid_continue, is_xid_start};

pub(crate) fn attr_is(attr: &Attribute, name: &str) -> bool {
    attr.path().is_ident(&format_ident!("{}", name))
}

/// Match both `#[name]` and any `#[path::to::name]`.
pub(crate) fn attr_ends_with(attr: &Attribute, name: &str) -> bool {
    attr.path()
        .segments
        .iter()
        .last()
        .map(|s| s.ident == name)
        .unwrap_or(false)
}

/// A fixture is fallible when its return type is some `Result`.
pub(crate) fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, t) => match t.as_ref() {
            Type::Path(tp) => tp
                .path
                .segments
                .iter()
                .last()
                .map(|s| s.ident == "Result")
                .unwrap_or(false),
            _ => false,
        },
        ReturnType::Default => false,
    }
}

/// Items that the crate root can reach through `pub(crate)` modules.
pub(crate) fn is_crate_visible(vis: &Visibility) -> bool {
    match vis {
        Visibility::Public(_) => true,
        Visibility::Restricted(r) => r.in_token.is_none() && r.path.is_ident("crate"),
        Visibility::Inherited => false,
    }
}

/// Turn a file or directory name in a valid module name.
pub(crate) fn sanitize_ident(name: &str) -> Ident {
    let mut sanitized = name
        .chars()
        .map(|c| if is_xid_continue(c) { c } else { '_' })
        .collect::<String>();
    if !sanitized.chars().next().map(is_xid_start).unwrap_or(false) {
        sanitized.insert(0, '_');
    }
    match syn::parse_str::<Ident>(&sanitized) {
        Ok(ident) => ident,
        Err(_) => format_ident!("{}_", sanitized),
    }
}
