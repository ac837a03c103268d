#![macro_use]

/// Unit testing utility module. Collect a bunch of functions and impls to simplify unit
/// testing boilerplate.
///
pub(crate) use pretty_assertions::assert_eq;
pub(crate) use rstest::{fixture, rstest};
use syn::{parse::Parse, parse2, parse_str, Ident};

pub(crate) trait ToAst {
    fn ast<T: Parse>(self) -> T;
}

impl ToAst for &str {
    fn ast<T: Parse>(self) -> T {
        parse_str(self).unwrap()
    }
}

impl ToAst for String {
    fn ast<T: Parse>(self) -> T {
        parse_str(&self).unwrap()
    }
}

impl ToAst for proc_macro2::TokenStream {
    fn ast<T: Parse>(self) -> T {
        parse2(self).unwrap()
    }
}

pub(crate) fn ident(s: impl AsRef<str>) -> Ident {
    s.as_ref().ast()
}

pub(crate) fn fn_arg(s: impl AsRef<str>) -> syn::FnArg {
    s.as_ref().ast()
}

pub(crate) trait DisplayCode {
    fn display_code(&self) -> String;
}

impl<T: quote::ToTokens> DisplayCode for T {
    fn display_code(&self) -> String {
        self.to_token_stream().to_string()
    }
}
