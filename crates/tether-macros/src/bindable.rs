// #[bindable] proc-macro implementation
//
// Turns an inherent impl block into a Bindable registry: one descriptor and
// one invoker per exported method.

use proc_macro2::TokenStream;
use quote::{format_ident, quote, ToTokens};
use syn::spanned::Spanned;
use syn::{
    FnArg, GenericArgument, ImplItem, ImplItemFn, ItemImpl, LitStr, PathArguments, Result,
    ReturnType, Type, Visibility,
};

use crate::attrs::{take_method_args, TypeArgs};

/// Shape of a method's declared return, with `Result` peeled off.
#[derive(Debug)]
pub enum Returns {
    /// `()` or no return type
    Unit,
    /// `(A, B, ..)`
    Tuple(Vec<Type>),
    /// Anything else
    Single(Type),
}

/// Classified return of one method.
#[derive(Debug)]
pub struct ReturnShape {
    pub values: Returns,
    pub fallible: bool,
}

/// Everything the generator needs about one exported method.
struct Exported {
    ident: syn::Ident,
    guest_name: LitStr,
    params: Vec<Type>,
    variadic_elem: Option<Type>,
    returns: ReturnShape,
}

/// Expands the #[bindable] attribute macro.
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[bindable]
/// impl Dummy {
///     pub fn echo(&self, s: String) -> String { s }
/// }
///
/// // Output:
/// impl Dummy {
///     pub fn echo(&self, s: String) -> String { s }
/// }
///
/// impl ::tether_sdk::Bindable for Dummy {
///     const TYPE_NAME: &'static str = "Dummy";
///     fn methods() -> Vec<::tether_sdk::Method<Self>> {
///         fn __invoke_echo(__this: &Dummy, __args: Vec<HostValue>) -> BridgeResult<Vec<HostValue>> {
///             // Argument extraction
///             // Call
///             // Return conversion
///         }
///         vec![::tether_sdk::Method::new(/* descriptor */, __invoke_echo)]
///     }
/// }
/// ```
pub fn expand_bindable(args: TypeArgs, mut input: ItemImpl) -> Result<TokenStream> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[bindable] must be applied to an inherent impl block",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[bindable] does not support generic impl blocks",
        ));
    }

    let self_ty = input.self_ty.clone();
    let type_name = match args.name {
        Some(name) => name,
        None => LitStr::new(&type_ident(&self_ty)?.to_string(), self_ty.span()),
    };

    let mut exported = Vec::new();
    let mut errors: Option<syn::Error> = None;

    for item in input.items.iter_mut() {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        match collect_method(method) {
            Ok(Some(found)) => exported.push(found),
            Ok(None) => {}
            Err(e) => match &mut errors {
                Some(existing) => existing.combine(e),
                None => errors = Some(e),
            },
        }
    }
    if let Some(e) = errors {
        return Err(e);
    }

    let invokers = exported.iter().map(|m| generate_invoker(&self_ty, m));
    let entries = exported.iter().map(|m| {
        let descriptor = generate_descriptor(m);
        let invoker = invoker_ident(m);
        quote! { ::tether_sdk::Method::new(#descriptor, #invoker) }
    });

    Ok(quote! {
        #input

        impl ::tether_sdk::Bindable for #self_ty {
            const TYPE_NAME: &'static str = #type_name;

            fn methods() -> ::std::vec::Vec<::tether_sdk::Method<Self>> {
                #(#invokers)*

                ::std::vec![#(#entries),*]
            }
        }

        impl ::tether_sdk::HostTyped for #self_ty {
            fn host_type() -> ::tether_sdk::HostType {
                ::tether_sdk::HostType::Object(#type_name)
            }
        }

        impl ::tether_sdk::IntoHost for #self_ty {
            fn into_host(self) -> ::tether_sdk::HostValue {
                ::tether_sdk::HostValue::Object(::tether_sdk::HostObject::new(
                    ::std::rc::Rc::new(self),
                ))
            }
        }
    })
}

fn type_ident(ty: &Type) -> Result<&syn::Ident> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .map(|seg| &seg.ident)
            .ok_or_else(|| syn::Error::new_spanned(ty, "expected a type name")),
        other => Err(syn::Error::new_spanned(
            other,
            "#[bindable] needs a named type; use #[bindable(name = \"...\")]",
        )),
    }
}

/// Inspect one impl method. `Ok(None)` means it is not exported.
fn collect_method(method: &mut ImplItemFn) -> Result<Option<Exported>> {
    let args = take_method_args(&mut method.attrs)?;
    if args.skip || !matches!(method.vis, Visibility::Public(_)) {
        return Ok(None);
    }

    let sig = &method.sig;
    let Some(FnArg::Receiver(receiver)) = sig.inputs.first() else {
        // associated functions are not methods
        return Ok(None);
    };
    if receiver.reference.is_none() {
        return Err(syn::Error::new_spanned(
            receiver,
            "bindable methods must take `&self`; by-value receivers cannot be shared",
        ));
    }
    if receiver.mutability.is_some() {
        return Err(syn::Error::new_spanned(
            receiver,
            "bindable methods must take `&self`; use interior mutability for state",
        ));
    }
    if sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            sig.asyncness,
            "async methods cannot be bound",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "generic methods cannot be bound",
        ));
    }

    let mut params = Vec::new();
    for input in sig.inputs.iter().skip(1) {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };
        if let Type::Reference(_) = &*pat_type.ty {
            return Err(syn::Error::new_spanned(
                &pat_type.ty,
                "bound parameters must be owned types",
            ));
        }
        params.push((*pat_type.ty).clone());
    }

    let variadic_elem = if args.variadic {
        let last = params.last().ok_or_else(|| {
            syn::Error::new_spanned(&sig.ident, "#[bind(variadic)] needs a final `Vec<T>` parameter")
        })?;
        Some(vec_element(last).cloned().ok_or_else(|| {
            syn::Error::new_spanned(last, "#[bind(variadic)] needs a final `Vec<T>` parameter")
        })?)
    } else {
        None
    };

    let guest_name = args
        .name
        .unwrap_or_else(|| LitStr::new(&sig.ident.to_string(), sig.ident.span()));

    Ok(Some(Exported {
        ident: sig.ident.clone(),
        guest_name,
        params,
        variadic_elem,
        returns: classify_return(&sig.output),
    }))
}

/// Element type of `Vec<T>`
fn vec_element(ty: &Type) -> Option<&Type> {
    single_generic(ty, "Vec")
}

fn single_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let seg = path.path.segments.last()?;
    if seg.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(generics) = &seg.arguments else {
        return None;
    };
    match generics.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// Classify a return type. `Result<R, E>` (or a one-argument `Result<R>`
/// alias) is fallible with `R` as the value part.
pub fn classify_return(output: &ReturnType) -> ReturnShape {
    let ty = match output {
        ReturnType::Default => {
            return ReturnShape {
                values: Returns::Unit,
                fallible: false,
            }
        }
        ReturnType::Type(_, ty) => &**ty,
    };

    match single_generic(ty, "Result") {
        Some(ok) => ReturnShape {
            values: classify_value(ok),
            fallible: true,
        },
        None => ReturnShape {
            values: classify_value(ty),
            fallible: false,
        },
    }
}

fn classify_value(ty: &Type) -> Returns {
    match ty {
        Type::Tuple(tuple) if tuple.elems.is_empty() => Returns::Unit,
        Type::Tuple(tuple) => Returns::Tuple(tuple.elems.iter().cloned().collect()),
        Type::Paren(inner) => classify_value(&inner.elem),
        other => Returns::Single(other.clone()),
    }
}

fn invoker_ident(method: &Exported) -> syn::Ident {
    format_ident!("__invoke_{}", method.ident)
}

fn generate_descriptor(method: &Exported) -> TokenStream {
    let name = &method.guest_name;
    let fixed_count = method.params.len() - usize::from(method.variadic_elem.is_some());
    let fixed = method.params.iter().take(fixed_count).map(|ty| {
        quote! { .param(<#ty as ::tether_sdk::HostTyped>::host_type()) }
    });
    let variadic = method.variadic_elem.as_ref().map(|elem| {
        quote! { .variadic(<#elem as ::tether_sdk::HostTyped>::host_type()) }
    });
    let value_types: Vec<&Type> = match &method.returns.values {
        Returns::Unit => Vec::new(),
        Returns::Tuple(types) => types.iter().collect(),
        Returns::Single(ty) => vec![ty],
    };
    let returns = value_types.iter().map(|ty| {
        quote! { .returns(<#ty as ::tether_sdk::HostTyped>::host_type()) }
    });
    let fallible = method.returns.fallible.then(|| quote! { .fallible() });

    quote! {
        ::tether_sdk::MethodDescriptor::new(#name)
            #(#fixed)*
            #variadic
            #(#returns)*
            #fallible
    }
}

fn generate_invoker(self_ty: &Type, method: &Exported) -> TokenStream {
    let invoker = invoker_ident(method);
    let ident = &method.ident;
    let arg_names: Vec<_> = (0..method.params.len())
        .map(|i| format_ident!("__a{}", i))
        .collect();
    let extractions = arg_names.iter().zip(method.params.iter()).map(|(name, ty)| {
        quote! {
            let #name = <#ty as ::tether_sdk::FromHost>::from_host(
                __args.next().unwrap_or_default(),
            )?;
        }
    });

    let into_values = |value: TokenStream| -> TokenStream {
        match &method.returns.values {
            Returns::Unit => quote! {{
                let () = #value;
                ::std::vec::Vec::new()
            }},
            Returns::Single(_) => quote! {
                ::std::vec![::tether_sdk::IntoHost::into_host(#value)]
            },
            Returns::Tuple(types) => {
                let parts: Vec<_> = (0..types.len()).map(|i| format_ident!("__r{}", i)).collect();
                quote! {{
                    let (#(#parts),*) = #value;
                    ::std::vec![#(::tether_sdk::IntoHost::into_host(#parts)),*]
                }}
            }
        }
    };

    let call = quote! { __this.#ident(#(#arg_names),*) };
    let body = if method.returns.fallible {
        let ok_values = into_values(quote! { __ok });
        quote! {
            match #call {
                Ok(__ok) => {
                    let mut __out = #ok_values;
                    __out.push(::tether_sdk::HostValue::Error(None));
                    Ok(__out)
                }
                Err(__err) => Ok(::std::vec![::tether_sdk::HostValue::Error(Some(
                    ::tether_sdk::HostError::from_display(&__err),
                ))]),
            }
        }
    } else {
        let values = into_values(call);
        quote! { Ok(#values) }
    };

    let self_tokens = self_ty.to_token_stream();
    quote! {
        #[allow(unused_mut, unused_variables, non_snake_case)]
        fn #invoker(
            __this: &#self_tokens,
            __args: ::std::vec::Vec<::tether_sdk::HostValue>,
        ) -> ::tether_sdk::BridgeResult<::std::vec::Vec<::tether_sdk::HostValue>> {
            let mut __args = __args.into_iter();
            #(#extractions)*
            #body
        }
    }
}
