//! Procedural macros for the fnhost function adapter.
//!
//! This crate provides the `#[hosted_function]` attribute macro, which turns
//! a plain async function into a type implementing `HostedFunction`.
//!
//! # Example
//!
//! ```ignore
//! use fnhost::prelude::*;
//!
//! #[hosted_function(name = "greeter")]
//! async fn greet(req: FnRequest, ctx: &FnContext) -> Result<FnResponse, FnError> {
//!     Ok(FnResponse::text(format!("Hello, {}", req.text())))
//! }
//!
//! // expands to `struct GreetFunction;` implementing `HostedFunction`
//! ```

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, punctuated::Punctuated, Expr, ExprLit, ItemFn, Lit, Meta, Token};

/// Attributes for the `#[hosted_function]` macro.
#[derive(Default, Debug)]
struct HostedFunctionAttrs {
    /// Name reported in logs. Defaults to the function's identifier.
    name: Option<String>,
}

impl HostedFunctionAttrs {
    fn parse_meta_list(metas: Punctuated<Meta, Token![,]>) -> syn::Result<Self> {
        let mut attrs = HostedFunctionAttrs::default();

        for meta in metas {
            match meta {
                Meta::NameValue(nv) => {
                    let ident = nv
                        .path
                        .get_ident()
                        .ok_or_else(|| syn::Error::new_spanned(&nv.path, "expected identifier"))?
                        .to_string();

                    let lit = match &nv.value {
                        Expr::Lit(ExprLit { lit, .. }) => lit.clone(),
                        _ => return Err(syn::Error::new_spanned(&nv.value, "expected literal")),
                    };

                    match (ident.as_str(), lit) {
                        ("name", Lit::Str(lit_str)) => attrs.name = Some(lit_str.value()),
                        ("name", other) => {
                            return Err(syn::Error::new_spanned(other, "name must be a string"))
                        }
                        _ => {
                            return Err(syn::Error::new_spanned(
                                nv.path,
                                format!("unknown attribute: {}", ident),
                            ));
                        }
                    }
                }
                _ => {
                    return Err(syn::Error::new_spanned(meta, "expected name = value"));
                }
            }
        }

        Ok(attrs)
    }
}

/// Generate a `HostedFunction` implementation for an async function.
///
/// The function must be `async` and take exactly two arguments, the request
/// and a reference to the context. A unit struct named after the function in
/// PascalCase with a `Function` suffix is emitted next to it.
///
/// # Attributes
///
/// - `name` (optional): name reported in logs
#[proc_macro_attribute]
pub fn hosted_function(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args with Punctuated::<Meta, Token![,]>::parse_terminated);
    let input_fn = parse_macro_input!(input as ItemFn);

    match generate_hosted_function(args, input_fn) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_hosted_function(
    args: Punctuated<Meta, Token![,]>,
    input_fn: ItemFn,
) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = HostedFunctionAttrs::parse_meta_list(args)?;

    if input_fn.sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            &input_fn.sig,
            "hosted_function must be async",
        ));
    }
    if input_fn.sig.inputs.len() != 2 {
        return Err(syn::Error::new_spanned(
            &input_fn.sig.inputs,
            "hosted_function takes (request, &context)",
        ));
    }

    let fn_name = &input_fn.sig.ident;
    let fn_vis = &input_fn.vis;
    let function_name = attrs.name.unwrap_or_else(|| fn_name.to_string());
    let struct_name = format_ident!("{}Function", to_pascal_case(&fn_name.to_string()));

    let expanded = quote! {
        #input_fn

        /// Generated hosted function wrapper.
        #[derive(Debug, Default, Clone, Copy)]
        #fn_vis struct #struct_name;

        #[fnhost::prelude::async_trait]
        impl fnhost::prelude::HostedFunction for #struct_name {
            async fn handle(
                &self,
                request: fnhost::prelude::FnRequest,
                ctx: &fnhost::prelude::FnContext,
            ) -> Result<fnhost::prelude::FnResponse, fnhost::prelude::FnError> {
                #fn_name(request, ctx).await
            }

            fn name(&self) -> &str {
                #function_name
            }
        }
    };

    Ok(expanded)
}

/// Convert a snake_case string to PascalCase.
fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}
