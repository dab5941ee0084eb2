//! `#[apice_async::test]` and `#[apice_async::main]`.
//!
//! Both attributes take an `async fn` and emit two versions of it:
//! - native: a synchronous fn whose body runs through
//!   `apice_async::runtime::block_on` (current-thread runtime + `LocalSet`)
//! - wasm32: the original `async fn`, tagged with `wasm_bindgen_test` for tests

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, Entry::Test)
}

#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, Entry::Main)
}

#[derive(Clone, Copy)]
enum Entry {
    Test,
    Main,
}

fn expand(attr: TokenStream, item: TokenStream, entry: Entry) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new_spanned(
            TokenStream2::from(attr),
            "apice_async attribute macros take no arguments",
        )
        .to_compile_error()
        .into();
    }

    let function = parse_macro_input!(item as ItemFn);
    if function.sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            function.sig.fn_token,
            "apice_async attribute macros require an `async fn`",
        )
        .to_compile_error()
        .into();
    }

    let native = native_variant(&function, entry);
    let wasm = wasm_variant(&function, entry);
    quote!(#native #wasm).into()
}

fn native_variant(function: &ItemFn, entry: Entry) -> TokenStream2 {
    let attrs = &function.attrs;
    let vis = &function.vis;
    let body = &function.block;

    let mut sig = function.sig.clone();
    sig.asyncness = None;

    let test_attr = match entry {
        Entry::Test => quote!(#[test]),
        Entry::Main => TokenStream2::new(),
    };

    quote! {
        #[cfg(not(target_arch = "wasm32"))]
        #(#attrs)*
        #test_attr
        #vis #sig {
            apice_async::runtime::block_on(async move #body)
        }
    }
}

fn wasm_variant(function: &ItemFn, entry: Entry) -> TokenStream2 {
    let attrs = &function.attrs;
    let vis = &function.vis;
    let sig = &function.sig;
    let body = &function.block;

    let test_attr = match entry {
        Entry::Test => quote!(#[apice_async::test_support::wasm_bindgen_test]),
        Entry::Main => TokenStream2::new(),
    };

    quote! {
        #[cfg(target_arch = "wasm32")]
        #(#attrs)*
        #test_attr
        #vis #sig #body
    }
}
