// Attribute parsing for #[bindable] and #[bind(...)]

use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr, Result};

/// Arguments of `#[bindable(...)]`.
#[derive(Default)]
pub struct TypeArgs {
    /// Override for the registered type name
    pub name: Option<LitStr>,
}

impl TypeArgs {
    pub fn parse(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("name") {
            self.name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported #[bindable] argument; expected `name = \"...\"`"))
        }
    }
}

/// Options collected from `#[bind(...)]` on one method.
#[derive(Default)]
pub struct MethodArgs {
    pub skip: bool,
    pub name: Option<LitStr>,
    pub variadic: bool,
}

/// Parse and remove every `#[bind(...)]` attribute from `attrs`.
pub fn take_method_args(attrs: &mut Vec<Attribute>) -> Result<MethodArgs> {
    let mut args = MethodArgs::default();
    let mut error: Option<syn::Error> = None;

    attrs.retain(|attr| {
        if !attr.path().is_ident("bind") {
            return true;
        }
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                args.skip = true;
                Ok(())
            } else if meta.path.is_ident("variadic") {
                args.variadic = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                args.name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported #[bind] option; expected `skip`, `variadic`, or `name`"))
            }
        });
        if let Err(e) = parsed {
            match &mut error {
                Some(existing) => existing.combine(e),
                None => error = Some(e),
            }
        }
        false
    });

    match error {
        Some(e) => Err(e),
        None => Ok(args),
    }
}
