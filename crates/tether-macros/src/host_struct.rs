// #[derive(HostStruct)] implementation
//
// Named-field structs become plain aggregates; single-field tuple structs
// become named types over their field's representation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Result};

pub fn expand_host_struct(input: DeriveInput) -> Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "HostStruct cannot be derived for generic types",
        ));
    }

    let ident = &input.ident;
    let name = LitStr::new(&ident.to_string(), ident.span());
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            ident,
            "HostStruct can only be derived for structs",
        ));
    };

    match &data.fields {
        Fields::Named(fields) => {
            let names: Vec<_> = fields
                .named
                .iter()
                .filter_map(|f| f.ident.as_ref())
                .collect();
            let labels: Vec<_> = names
                .iter()
                .map(|n| LitStr::new(&n.to_string(), n.span()))
                .collect();
            let types: Vec<_> = fields.named.iter().map(|f| &f.ty).collect();

            Ok(quote! {
                impl ::tether_sdk::HostTyped for #ident {
                    fn host_type() -> ::tether_sdk::HostType {
                        ::tether_sdk::HostType::Struct(::std::rc::Rc::new(
                            ::tether_sdk::StructType::new(
                                #name,
                                ::std::vec![
                                    #((#labels, <#types as ::tether_sdk::HostTyped>::host_type())),*
                                ],
                            ),
                        ))
                    }
                }

                impl ::tether_sdk::FromHost for #ident {
                    fn from_host(
                        value: ::tether_sdk::HostValue,
                    ) -> ::tether_sdk::BridgeResult<Self> {
                        #[allow(unused_mut, unused_variables)]
                        let mut fields =
                            ::tether_sdk::convert::struct_fields(value, #name)?.into_iter();
                        Ok(#ident {
                            #(#names: <#types as ::tether_sdk::FromHost>::from_host(
                                fields.next().unwrap_or_default(),
                            )?,)*
                        })
                    }
                }

                impl ::tether_sdk::IntoHost for #ident {
                    fn into_host(self) -> ::tether_sdk::HostValue {
                        ::tether_sdk::HostValue::new_struct(
                            <Self as ::tether_sdk::HostTyped>::host_type(),
                            ::std::vec![#(::tether_sdk::IntoHost::into_host(self.#names)),*],
                        )
                    }
                }
            })
        }
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            let inner = &fields.unnamed[0].ty;
            Ok(quote! {
                impl ::tether_sdk::HostTyped for #ident {
                    fn host_type() -> ::tether_sdk::HostType {
                        ::tether_sdk::HostType::Named {
                            name: #name,
                            underlying: ::std::boxed::Box::new(
                                <#inner as ::tether_sdk::HostTyped>::host_type(),
                            ),
                        }
                    }
                }

                impl ::tether_sdk::FromHost for #ident {
                    fn from_host(
                        value: ::tether_sdk::HostValue,
                    ) -> ::tether_sdk::BridgeResult<Self> {
                        let inner = ::tether_sdk::convert::named_inner(value, #name)?;
                        Ok(#ident(<#inner as ::tether_sdk::FromHost>::from_host(inner)?))
                    }
                }

                impl ::tether_sdk::IntoHost for #ident {
                    fn into_host(self) -> ::tether_sdk::HostValue {
                        ::tether_sdk::HostValue::named(
                            #name,
                            ::tether_sdk::IntoHost::into_host(self.0),
                        )
                    }
                }
            })
        }
        other => Err(syn::Error::new_spanned(
            other,
            "HostStruct needs named fields or exactly one unnamed field",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_named_struct_expands() {
        let input: DeriveInput = parse_quote! {
            struct Small { a: i64, label: String }
        };
        let out = expand_host_struct(input).unwrap().to_string();
        assert!(out.contains("StructType"));
        assert!(out.contains("\"label\""));
    }

    #[test]
    fn test_newtype_expands_to_named() {
        let input: DeriveInput = parse_quote! {
            struct UserId(i64);
        };
        let out = expand_host_struct(input).unwrap().to_string();
        assert!(out.contains("Named"));
    }

    #[test]
    fn test_enum_is_rejected() {
        let input: DeriveInput = parse_quote! {
            enum Mode { A, B }
        };
        assert!(expand_host_struct(input).is_err());
    }
}
