// tether-macros: registry generation for Tether bindings
//
// Provides proc-macros that replace runtime reflection:
// - #[bindable] - Generates a Bindable method registry from an impl block
// - #[derive(HostStruct)] - Maps a plain struct or newtype onto the host type model
//
// Example:
// ```
// use tether_macros::{bindable, HostStruct};
//
// #[derive(HostStruct)]
// pub struct Point { x: f64, y: f64 }
//
// pub struct Canvas;
//
// #[bindable]
// impl Canvas {
//     pub fn plot(&self, p: Point) -> bool { p.x >= 0.0 && p.y >= 0.0 }
// }
// ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, ItemImpl};

mod attrs;
mod bindable;
mod host_struct;

/// Generates a `Bindable` registry for an inherent impl block.
///
/// Exported methods are the `pub` methods taking `&self`. Everything else is
/// left alone. Per-method options go in `#[bind(...)]`:
///
/// - `skip` - do not export this method
/// - `name = "..."` - export under a different name
/// - `variadic` - the final `Vec<T>` parameter is a variadic tail of `T`
///
/// Returning `Result<T, E>` makes the method fallible: `E`'s `Display` text
/// becomes the guest-visible error.
///
/// # Example
///
/// ```ignore
/// #[bindable(name = "Dummy")]
/// impl Dummy {
///     pub fn echo(&self, s: String) -> String {
///         s
///     }
///
///     #[bind(variadic)]
///     pub fn vsum(&self, prefix: String, nums: Vec<i64>) -> String {
///         format!("{}{}", prefix, nums.iter().sum::<i64>())
///     }
/// }
/// ```
///
/// Also implements `HostTyped` and `IntoHost` for the type so methods can
/// return new instances by value.
#[proc_macro_attribute]
pub fn bindable(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = attrs::TypeArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(meta));
    parse_macro_input!(attr with parser);
    let input = parse_macro_input!(item as ItemImpl);
    bindable::expand_bindable(args, input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Implements `HostTyped`, `FromHost` and `IntoHost` for a plain struct.
///
/// Named-field structs map to `HostType::Struct`; a single-field tuple
/// struct maps to `HostType::Named` over its field type.
#[proc_macro_derive(HostStruct)]
pub fn derive_host_struct(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    host_struct::expand_host_struct(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
