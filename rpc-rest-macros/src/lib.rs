//! Proc-macros that complement the `rpc-rest` crate.
//!
//! The only macro exposed today is [`macro@ProcedureError`], which lets a
//! consuming crate declare the HTTP status and error `code` that one of
//! their own procedure error types should map to once it reaches the
//! adapter's error mapper (see `rpc_rest::error`).

mod error;

use proc_macro::TokenStream;
use quote::quote_spanned;
use syn::spanned::Spanned;

/// Derive `From<Self> for rpc_rest::error::ProcedureFailure` for an error
/// struct or enum, attaching a `code` and HTTP `status` via
/// `#[procedure_error(...)]` attributes.
///
/// ```ignore
/// #[derive(ProcedureError, Debug, thiserror::Error)]
/// enum MathsError {
///     #[error("Division by zero")]
///     #[procedure_error(code = "DIVIDE_BY_ZERO", status = 400)]
///     DivideByZero
/// }
/// ```
///
/// A struct or enum variant holding exactly one unnamed field can instead be
/// marked `#[procedure_error(inner)]`, in which case the failure is
/// delegated to that field's own `Into<ProcedureFailure>` impl.
#[allow(non_snake_case)]
#[proc_macro_derive(ProcedureError, attributes(procedure_error))]
pub fn derive_procedure_error(input: TokenStream) -> TokenStream {
    let item: syn::Item = match syn::parse(input) {
        Ok(item) => item,
        Err(e) => return TokenStream::from(e.to_compile_error()),
    };

    let s = match item {
        syn::Item::Struct(s) => error::parse_struct(s),
        syn::Item::Enum(e) => error::parse_enum(e),
        _ => quote_spanned! {
            item.span() =>
            compile_error!("ProcedureError can only be used on structs and enums");
        },
    };

    TokenStream::from(s)
}
