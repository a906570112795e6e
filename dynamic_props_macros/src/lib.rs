//! Procedural macros for `dynamic_props`.
//!
//! [`macro@dynamic_property_sources`] turns an inherent `impl` block into a
//! `dynamic_props::TestClass` descriptor, recording every associated function
//! and whether it carries the [`macro@dynamic_property_source`] marker.

use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemImpl, parse_macro_input};

mod expand;

use expand::{ClassArgs, expand_test_class};

/// Describe the functions of an inherent `impl` block for dynamic property
/// discovery.
///
/// Accepts an optional `extends = ParentType` argument naming another type
/// that also uses this attribute. Functions marked with
/// `#[dynamic_property_source]` are reported by discovery; the marker is
/// removed from the emitted code.
#[proc_macro_attribute]
pub fn dynamic_property_sources(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = ClassArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(&meta));
    parse_macro_input!(attr with parser);
    let item_impl = parse_macro_input!(item as ItemImpl);

    expand_test_class(&args, item_impl)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Marks an associated function as a dynamic property source.
///
/// Only meaningful inside an `impl` block annotated with
/// `#[dynamic_property_sources]`, which consumes it. Anywhere else it reports
/// a compile error.
#[proc_macro_attribute]
pub fn dynamic_property_source(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item_tokens = proc_macro2::TokenStream::from(item);
    let error = syn::Error::new(
        proc_macro2::Span::call_site(),
        "#[dynamic_property_source] must be used on an associated function inside a \
         #[dynamic_property_sources] impl block",
    )
    .into_compile_error();
    quote! {
        #error
        #item_tokens
    }
    .into()
}
