/// `fixture`'s related data and parsing
use syn::{
    parse::{Parse, ParseStream},
    Ident, ItemFn, LitStr, Meta, Token,
};

use super::{extract_argument_attrs, extract_fn_attrs, ExtendWithFunctionAttrs};
use crate::{
    error::{messages, ErrorsVec},
    refident::MaybeIdent,
    utils::attr_is,
};

#[derive(PartialEq, Debug, Default)]
pub(crate) struct FixtureInfo {
    /// `#[fixture(name = "...")]`: register the fixture with another name.
    pub(crate) name: Option<LitStr>,
    pub(crate) once: Option<syn::Attribute>,
    /// Arguments resolved by `#[from(fixture)]`.
    pub(crate) renames: Vec<(Ident, Ident)>,
    pub(crate) finalizer: Option<Ident>,
}

impl Parse for FixtureInfo {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(Default::default());
        }
        let key: Ident = input.parse()?;
        if key != "name" {
            return Err(syn::Error::new_spanned(
                key,
                r#"Unknown fixture option: use #[fixture(name = "<fixture name>")]"#,
            ));
        }
        let _eq: Token![=] = input.parse()?;
        let name: LitStr = input.parse()?;
        if syn::parse_str::<Ident>(&name.value()).is_err() {
            return Err(syn::Error::new_spanned(
                name,
                "Fixture name should be a valid identifier",
            ));
        }
        Ok(Self {
            name: Some(name),
            ..Default::default()
        })
    }
}

impl FixtureInfo {
    pub(crate) fn is_once(&self) -> bool {
        self.once.is_some()
    }

    pub(crate) fn is_finalizer(&self, arg: &Ident) -> bool {
        self.finalizer.as_ref() == Some(arg)
    }

    /// The fixture injected in `arg`.
    pub(crate) fn resolve<'a>(&'a self, arg: &'a Ident) -> &'a Ident {
        self.renames
            .iter()
            .find(|(a, _)| a == arg)
            .map(|(_, fixture)| fixture)
            .unwrap_or(arg)
    }
}

impl ExtendWithFunctionAttrs for FixtureInfo {
    fn extend_with_function_attrs(
        &mut self,
        item_fn: &mut ItemFn,
    ) -> std::result::Result<(), ErrorsVec> {
        let (once, (renames, finalizer)) = merge_errors!(
            extract_once(item_fn),
            extract_renames(item_fn),
            extract_finalizer(item_fn)
        )?;
        self.once = once;
        self.renames.extend(renames);
        self.finalizer = finalizer;
        Ok(())
    }
}

fn just_a_path(attr: &syn::Attribute) -> syn::Result<()> {
    match &attr.meta {
        Meta::Path(_) => Ok(()),
        _ => Err(syn::Error::new_spanned(
            attr,
            format!(
                "#[{}] doesn't take any argument",
                attr.path()
                    .get_ident()
                    .map(ToString::to_string)
                    .unwrap_or_default()
            ),
        )),
    }
}

fn extract_once(item_fn: &mut ItemFn) -> Result<Option<syn::Attribute>, ErrorsVec> {
    let mut attrs = extract_fn_attrs(item_fn, |a| attr_is(a, "once")).into_iter();
    let once = attrs.next();
    let errors = once
        .iter()
        .filter_map(|a| just_a_path(a).err())
        .chain(attrs.map(|a| syn::Error::new_spanned(a, "You cannot use #[once] more than once")))
        .collect::<Vec<_>>();
    if errors.is_empty() {
        Ok(once)
    } else {
        Err(errors.into())
    }
}

fn extract_renames(item_fn: &mut ItemFn) -> Result<Vec<(Ident, Ident)>, ErrorsVec> {
    let mut renames = vec![];
    let mut errors = vec![];
    for arg in item_fn.sig.inputs.iter_mut() {
        let name = match arg.maybe_ident() {
            Some(name) => name.clone(),
            None => continue,
        };
        let mut found = extract_argument_attrs(
            arg,
            |a| attr_is(a, "from"),
            |attr| attr.parse_args::<Ident>().map(|fixture| (attr, fixture)),
        );
        match found.next() {
            Some(Ok((_, fixture))) => renames.push((name, fixture)),
            Some(Err(e)) => errors.push(e),
            None => {}
        }
        errors.extend(found.map(|r| match r {
            Ok((attr, _)) => syn::Error::new_spanned(attr, messages::use_more_than_once("from")),
            Err(e) => e,
        }));
    }
    if errors.is_empty() {
        Ok(renames)
    } else {
        Err(errors.into())
    }
}

fn extract_finalizer(item_fn: &mut ItemFn) -> Result<Option<Ident>, ErrorsVec> {
    let mut finalizer = None;
    let mut errors = vec![];
    for arg in item_fn.sig.inputs.iter_mut() {
        let name = match arg.maybe_ident() {
            Some(name) => name.clone(),
            None => continue,
        };
        let attrs = extract_argument_attrs(
            arg,
            |a| attr_is(a, "finalizer"),
            |attr| just_a_path(&attr).map(|_| attr),
        )
        .collect::<Vec<_>>();
        for (pos, attr) in attrs.into_iter().enumerate() {
            match attr {
                Err(e) => errors.push(e),
                Ok(attr) if pos > 0 => errors.push(syn::Error::new_spanned(
                    attr,
                    messages::use_more_than_once("finalizer"),
                )),
                Ok(attr) if finalizer.is_some() => errors.push(syn::Error::new_spanned(
                    attr,
                    "Just one argument can receive the #[finalizer]",
                )),
                Ok(_) => finalizer = Some(name.clone()),
            }
        }
    }
    if errors.is_empty() {
        Ok(finalizer)
    } else {
        Err(errors.into())
    }
}
