//! Attribute macros for the rigor test harness.
//!
//! - `#[suite]`: registers the `test`-prefixed methods of an inherent `impl` block as the suite's tests
//!
//! Registration happens at compile time, so discovery never needs to inspect method names at runtime.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{FnArg, ImplItem, ImplItemFn, ItemImpl, ReturnType, parse_macro_input};

const TEST_PREFIX: &str = "test";

/// Registers every method of the annotated `impl` block whose name starts with `test`.
///
/// The block is emitted unchanged, followed by an implementation of `rigor::RegisterTests` that lists the test
/// methods in declaration order. Test methods take `&mut self` (or `&self`) and no other arguments; they may be
/// `async`, and may return `()` or `rigor::TestResult`.
///
/// # Example
/// ```ignore
/// struct MathSuite {
///     t: TestContext,
/// }
///
/// #[rigor::suite]
/// impl MathSuite {
///     fn test_add(&mut self) {
///         self.t.compare(1 + 1, 2);
///     }
///
///     async fn test_fetch(&mut self) -> TestResult {
///         let value = fetch().await?;
///         self.t.compare(value, 42);
///         Ok(())
///     }
///
///     fn helper(&self) {} // not registered
/// }
///
/// // Generates:
/// impl rigor::RegisterTests for MathSuite {
///     fn tests() -> Vec<rigor::TestCase<Self>> {
///         vec![
///             rigor::TestCase::sync("test_add", /* wrapper */),
///             rigor::TestCase::asynchronous("test_fetch", /* wrapper */),
///         ]
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn suite(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(Span::call_site(), "#[suite] takes no arguments")
            .to_compile_error()
            .into();
    }

    let input = parse_macro_input!(item as ItemImpl);
    match expand_suite(&input) {
        Ok(registration) => TokenStream::from(quote! {
            #input
            #registration
        }),
        Err(err) => {
            let err = err.to_compile_error();
            TokenStream::from(quote! {
                #input
                #err
            })
        }
    }
}

fn expand_suite(input: &ItemImpl) -> syn::Result<proc_macro2::TokenStream> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(path, "#[suite] must be placed on an inherent impl block"));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&input.generics, "#[suite] does not support generic impl blocks"));
    }

    let self_ty = &input.self_ty;
    let mut wrappers = Vec::new();
    let mut cases = Vec::new();

    for item in &input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let name = method.sig.ident.to_string();
        if !name.starts_with(TEST_PREFIX) {
            continue;
        }
        validate_signature(method)?;

        let method_ident = &method.sig.ident;
        let wrapper = format_ident!("__rigor_{}", method_ident);
        let is_async = method.sig.asyncness.is_some();
        let call = if is_async {
            quote! { suite.#method_ident().await }
        } else {
            quote! { suite.#method_ident() }
        };
        let body = match &method.sig.output {
            ReturnType::Default => quote! {
                #call;
                ::core::result::Result::Ok(())
            },
            ReturnType::Type(..) => quote! { ::rigor::IntoTestResult::into_test_result(#call) },
        };

        if is_async {
            wrappers.push(quote! {
                fn #wrapper(suite: &mut #self_ty) -> ::rigor::TestFuture<'_> {
                    ::std::boxed::Box::pin(async move { #body })
                }
            });
            cases.push(quote! { ::rigor::TestCase::asynchronous(#name, #wrapper) });
        } else {
            wrappers.push(quote! {
                fn #wrapper(suite: &mut #self_ty) -> ::rigor::TestResult {
                    #body
                }
            });
            cases.push(quote! { ::rigor::TestCase::sync(#name, #wrapper) });
        }
    }

    Ok(quote! {
        impl ::rigor::RegisterTests for #self_ty {
            fn tests() -> ::std::vec::Vec<::rigor::TestCase<Self>> {
                #(#wrappers)*
                ::std::vec![#(#cases),*]
            }
        }
    })
}

fn validate_signature(method: &ImplItemFn) -> syn::Result<()> {
    let sig = &method.sig;
    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() => {}
        _ => {
            return Err(syn::Error::new_spanned(
                &sig.ident,
                "test methods must take `&mut self` or `&self`",
            ));
        }
    }
    if let Some(extra) = inputs.next() {
        return Err(syn::Error::new_spanned(extra, "test methods take no arguments besides `self`"));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&sig.generics, "test methods cannot be generic"));
    }
    Ok(())
}
