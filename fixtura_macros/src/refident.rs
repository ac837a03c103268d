/// Provide `RefIdent` and `MaybeIdent` traits that give a shortcut to extract identity reference
/// (`syn::Ident` struct).
use proc_macro2::Ident;
use syn::{FnArg, Pat, PatType, Type};

pub trait RefIdent {
    /// Return the reference to ident if any
    fn ident(&self) -> &Ident;
}

pub trait MaybeIdent {
    /// Return the reference to ident if any
    fn maybe_ident(&self) -> Option<&Ident>;
}

impl<I: RefIdent> MaybeIdent for I {
    fn maybe_ident(&self) -> Option<&Ident> {
        Some(self.ident())
    }
}

impl RefIdent for Ident {
    fn ident(&self) -> &Ident {
        self
    }
}

impl MaybeIdent for FnArg {
    fn maybe_ident(&self) -> Option<&Ident> {
        match self {
            FnArg::Typed(pat) => pat.maybe_ident(),
            _ => None,
        }
    }
}

impl MaybeIdent for PatType {
    fn maybe_ident(&self) -> Option<&Ident> {
        self.pat.maybe_ident()
    }
}

impl MaybeIdent for Pat {
    fn maybe_ident(&self) -> Option<&Ident> {
        match self {
            Pat::Ident(ident) => Some(&ident.ident),
            _ => None,
        }
    }
}

pub trait MaybeType {
    /// Return the reference to type if any
    fn maybe_type(&self) -> Option<&Type>;
}

impl MaybeType for FnArg {
    fn maybe_type(&self) -> Option<&Type> {
        match self {
            FnArg::Typed(PatType { ty, .. }) => Some(ty.as_ref()),
            _ => None,
        }
    }
}

/// The type a fixture argument borrows: `T` for `&T`, nothing for
/// `&mut T` or any other type.
pub trait MaybeBorrowed {
    fn maybe_borrowed(&self) -> Option<&Type>;
}

impl MaybeBorrowed for Type {
    fn maybe_borrowed(&self) -> Option<&Type> {
        match self {
            Type::Reference(r) if r.mutability.is_none() => Some(r.elem.as_ref()),
            Type::Paren(p) => p.elem.maybe_borrowed(),
            _ => None,
        }
    }
}

impl MaybeBorrowed for FnArg {
    fn maybe_borrowed(&self) -> Option<&Type> {
        self.maybe_type().and_then(MaybeBorrowed::maybe_borrowed)
    }
}

#[cfg(test)]
mod should {
    use super::*;
    use crate::test::*;
    use crate::test::assert_eq;

    #[rstest]
    #[case::reference("a: &u32", Some("u32"))]
    #[case::nested_reference("a: &&str", Some("& str"))]
    #[case::mutable("a: &mut u32", None)]
    #[case::value("a: u32", None)]
    fn find_the_borrowed_type(#[case] arg: &str, #[case] expected: Option<&str>) {
        let arg = fn_arg(arg);

        assert_eq!(
            expected.map(ToOwned::to_owned),
            arg.maybe_borrowed().map(|t| quote::quote!(#t).to_string())
        );
    }

    #[rstest]
    #[case::ident("sample_data: &u32", Some("sample_data"))]
    #[case::destruct("(a, b): &(u32, u32)", None)]
    fn find_argument_ident(#[case] arg: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            expected.map(ident),
            fn_arg(arg).maybe_ident().cloned()
        );
    }
}
