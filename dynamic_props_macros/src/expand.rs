//! Token generation for `#[dynamic_property_sources]`.

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, FnArg, GenericParam, ImplItem, ImplItemFn, ItemImpl, Type, TypeParamBound};

const MARKER: &str = "dynamic_property_source";
const REGISTRY_TRAIT: &str = "DynamicPropertyRegistry";

/// Arguments accepted by `#[dynamic_property_sources(...)]`.
#[derive(Default)]
pub(crate) struct ClassArgs {
    pub extends: Option<Type>,
}

impl ClassArgs {
    pub(crate) fn parse(&mut self, meta: &ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("extends") {
            if self.extends.is_some() {
                return Err(meta.error("duplicate `extends` argument"));
            }
            self.extends = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported argument; expected `extends = ParentType`"))
        }
    }
}

fn is_marker(attr: &Attribute) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == MARKER)
}

/// Returns `true` for `&mut dyn DynamicPropertyRegistry`, allowing any path
/// prefix and extra lifetime bounds.
pub(crate) fn is_registry_type(ty: &Type) -> bool {
    let Type::Reference(reference) = ty else {
        return false;
    };
    if reference.mutability.is_none() {
        return false;
    }
    let mut inner = reference.elem.as_ref();
    while let Type::Paren(paren) = inner {
        inner = paren.elem.as_ref();
    }
    let Type::TraitObject(object) = inner else {
        return false;
    };
    object.bounds.iter().any(|bound| match bound {
        TypeParamBound::Trait(trait_bound) => trait_bound
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == REGISTRY_TRAIT),
        _ => false,
    })
}

fn has_type_generics(function: &ImplItemFn) -> bool {
    function
        .sig
        .generics
        .params
        .iter()
        .any(|param| !matches!(param, GenericParam::Lifetime(_)))
}

/// Rejects marked functions that no function pointer can call.
fn ensure_invocable(function: &ImplItemFn) -> syn::Result<()> {
    let sig = &function.sig;
    if let Some(token) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            token,
            "#[dynamic_property_source] functions cannot be async",
        ));
    }
    if let Some(token) = &sig.unsafety {
        return Err(syn::Error::new_spanned(
            token,
            "#[dynamic_property_source] functions cannot be unsafe",
        ));
    }
    if has_type_generics(function) {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "#[dynamic_property_source] functions cannot have type or const parameters",
        ));
    }
    Ok(())
}

/// Builds the `MethodDescriptor` expression for one associated function.
pub(crate) fn method_descriptor(function: &ImplItemFn, marked: bool) -> TokenStream2 {
    let ident = &function.sig.ident;
    let name = ident.to_string();
    let has_receiver = function.sig.receiver().is_some();
    let params: Vec<&Type> = function
        .sig
        .inputs
        .iter()
        .filter_map(|input| match input {
            FnArg::Typed(pat_type) => Some(pat_type.ty.as_ref()),
            FnArg::Receiver(_) => None,
        })
        .collect();
    let callable = function.sig.asyncness.is_none()
        && function.sig.unsafety.is_none()
        && !has_type_generics(function);

    let descriptor = match params.as_slice() {
        [only] if !has_receiver && callable && is_registry_type(only) => quote! {
            ::dynamic_props::MethodDescriptor::property_source(#name, |values| {
                ::dynamic_props::IntoMethodResult::into_method_result(Self::#ident(values))
            })
        },
        _ => {
            let receiver = if has_receiver {
                quote!(::dynamic_props::Receiver::Instance)
            } else {
                quote!(::dynamic_props::Receiver::Static)
            };
            let param_types = params.iter().map(|ty| {
                if is_registry_type(ty) {
                    quote!(::dynamic_props::ParamType::PropertyRegistry)
                } else {
                    let rendered = quote!(#ty).to_string();
                    quote!(::dynamic_props::ParamType::Other(::std::string::String::from(#rendered)))
                }
            });
            quote! {
                ::dynamic_props::MethodDescriptor::declared(
                    #name,
                    #receiver,
                    ::std::vec![#(#param_types),*],
                )
            }
        }
    };

    if marked {
        quote!(#descriptor.marked())
    } else {
        descriptor
    }
}

/// Expands the annotated `impl` block and its `TestClass` implementation.
pub(crate) fn expand_test_class(args: &ClassArgs, mut item_impl: ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item_impl.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[dynamic_property_sources] must be placed on an inherent impl block",
        ));
    }
    if !item_impl.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item_impl.generics,
            "#[dynamic_property_sources] does not support generic impl blocks",
        ));
    }

    let mut methods = Vec::new();
    for item in &mut item_impl.items {
        if let ImplItem::Fn(function) = item {
            let marked = function.attrs.iter().any(is_marker);
            if marked {
                ensure_invocable(function)?;
            }
            function.attrs.retain(|attr| !is_marker(attr));
            methods.push(method_descriptor(function, marked));
        }
    }

    let self_ty = &item_impl.self_ty;
    let extends = args.extends.as_ref().map(|parent| {
        quote!(.extends(<#parent as ::dynamic_props::TestClass>::descriptor()))
    });

    Ok(quote! {
        #item_impl

        impl ::dynamic_props::TestClass for #self_ty {
            fn descriptor() -> ::dynamic_props::ClassDescriptor {
                ::dynamic_props::ClassDescriptor::builder(::core::any::type_name::<Self>())
                    #extends
                    #( .method(#methods) )*
                    .build()
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, ensure};
    use rstest::rstest;
    use syn::parse_quote;

    fn first_fn(item: &ItemImpl) -> Result<&ImplItemFn> {
        item.items
            .iter()
            .find_map(|entry| match entry {
                ImplItem::Fn(function) => Some(function),
                _ => None,
            })
            .ok_or_else(|| anyhow::anyhow!("impl block has no functions"))
    }

    #[rstest]
    #[case::bare(parse_quote!(&mut dyn DynamicPropertyRegistry), true)]
    #[case::qualified(parse_quote!(&mut dyn dynamic_props::DynamicPropertyRegistry), true)]
    #[case::with_lifetime(parse_quote!(&mut (dyn DynamicPropertyRegistry + 'static)), true)]
    #[case::shared(parse_quote!(&dyn DynamicPropertyRegistry), false)]
    #[case::owned(parse_quote!(String), false)]
    #[case::other_trait(parse_quote!(&mut dyn Other), false)]
    fn recognises_the_registry_type(#[case] ty: Type, #[case] expected: bool) {
        assert_eq!(is_registry_type(&ty), expected);
    }

    #[rstest]
    fn registry_functions_become_invocable() -> Result<()> {
        let item: ItemImpl = parse_quote! {
            impl Tests {
                fn p1(values: &mut dyn DynamicPropertyRegistry) {}
            }
        };
        let tokens = method_descriptor(first_fn(&item)?, true).to_string();
        ensure!(tokens.contains("property_source"), "unexpected tokens: {tokens}");
        ensure!(tokens.contains("marked"), "marker missing: {tokens}");
        Ok(())
    }

    #[rstest]
    #[case::instance(parse_quote! { impl T { fn non_static(&self, values: &mut dyn DynamicPropertyRegistry) {} } }, "Instance")]
    #[case::bad_args(parse_quote! { impl T { fn bad_args(bad: String) {} } }, "Other")]
    #[case::generic(parse_quote! { impl T { fn generic<R>(values: &mut dyn DynamicPropertyRegistry) {} } }, "declared")]
    fn other_shapes_are_declared_only(#[case] item: ItemImpl, #[case] expected: &str) -> Result<()> {
        let tokens = method_descriptor(first_fn(&item)?, false).to_string();
        ensure!(tokens.contains("declared"), "expected declared descriptor: {tokens}");
        ensure!(tokens.contains(expected), "expected `{expected}` in {tokens}");
        ensure!(!tokens.contains("marked"), "unexpected marker: {tokens}");
        Ok(())
    }

    #[rstest]
    fn markers_are_stripped_from_the_output() -> Result<()> {
        let item: ItemImpl = parse_quote! {
            impl Tests {
                #[dynamic_property_source]
                fn p1(values: &mut dyn DynamicPropertyRegistry) {}
            }
        };
        let tokens = expand_test_class(&ClassArgs::default(), item)?.to_string();
        ensure!(!tokens.contains("# [dynamic_property_source]"), "marker kept: {tokens}");
        ensure!(tokens.contains("TestClass for Tests"), "missing impl: {tokens}");
        Ok(())
    }

    #[rstest]
    fn parent_descriptor_is_linked() -> Result<()> {
        let item: ItemImpl = parse_quote! { impl Sub {} };
        let args = ClassArgs {
            extends: Some(parse_quote!(Base)),
        };
        let tokens = expand_test_class(&args, item)?.to_string();
        ensure!(tokens.contains("extends"), "parent missing: {tokens}");
        ensure!(tokens.contains("Base as :: dynamic_props :: TestClass"), "parent missing: {tokens}");
        Ok(())
    }

    #[rstest]
    #[case::async_fn(
        parse_quote! { impl T { #[dynamic_property_source] async fn p(values: &mut dyn DynamicPropertyRegistry) {} } },
        "cannot be async"
    )]
    #[case::unsafe_fn(
        parse_quote! { impl T { #[dynamic_property_source] unsafe fn p(values: &mut dyn DynamicPropertyRegistry) {} } },
        "cannot be unsafe"
    )]
    #[case::generic_fn(
        parse_quote! { impl T { #[dynamic_property_source] fn p<R>(values: &mut dyn DynamicPropertyRegistry) {} } },
        "cannot have type or const parameters"
    )]
    fn marked_functions_without_an_invoker_are_rejected(
        #[case] item: ItemImpl,
        #[case] expected: &str,
    ) -> Result<()> {
        let Err(err) = expand_test_class(&ClassArgs::default(), item) else {
            anyhow::bail!("expansion should fail");
        };
        ensure!(err.to_string().contains(expected), "unexpected error: {err}");
        Ok(())
    }

    #[rstest]
    fn unmarked_async_functions_are_left_alone() -> Result<()> {
        let item: ItemImpl = parse_quote! {
            impl T {
                async fn helper(values: &mut dyn DynamicPropertyRegistry) {}
            }
        };
        let tokens = expand_test_class(&ClassArgs::default(), item)?.to_string();
        ensure!(tokens.contains("declared"), "expected declared descriptor: {tokens}");
        Ok(())
    }

    #[rstest]
    #[case::trait_impl(parse_quote! { impl Clone for Tests { fn clone(&self) -> Self { Tests } } })]
    #[case::generic(parse_quote! { impl<T> Tests<T> {} })]
    fn unsupported_impl_blocks_are_rejected(#[case] item: ItemImpl) {
        assert!(expand_test_class(&ClassArgs::default(), item).is_err());
    }
}
