mod attrs;

use attrs::ProcedureErrorAttrs;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{quote, quote_spanned};

pub fn parse_struct(s: syn::ItemStruct) -> TokenStream2 {
    let struct_name = &s.ident;
    let crate_name = syn::Ident::new("rpc_rest", Span::call_site());

    let attrs = match ProcedureErrorAttrs::parse(&s.attrs) {
        Ok(attrs) => attrs,
        Err(err) => return err.to_compile_error(),
    };
    let attrs = match attrs.finalise() {
        Ok(attrs) => attrs,
        Err(e) => return e.to_compile_error(),
    };

    if attrs.delegate_to_child {
        if let Err(e) = one_unnamed_field(&s.ident, &s.fields) {
            return e.to_compile_error();
        }
        return quote! {
            impl From<#struct_name> for #crate_name::error::ProcedureFailure {
                fn from(s: #struct_name) -> #crate_name::error::ProcedureFailure {
                    s.0.into()
                }
            }
        };
    }

    if !s.generics.params.is_empty() || s.generics.where_clause.is_some() {
        return quote_spanned! {
            s.ident.span() =>
            compile_error!("ProcedureError: generics are not currently supported");
        };
    }

    let code = &attrs.code;
    let status = attrs.status;

    quote! {
        impl From<#struct_name> for #crate_name::error::ProcedureFailure {
            fn from(s: #struct_name) -> #crate_name::error::ProcedureFailure {
                #crate_name::error::ProcedureFailure {
                    code: #code.to_owned(),
                    status: #status,
                    message: format!("{}", s),
                }
            }
        }
    }
}

pub fn parse_enum(e: syn::ItemEnum) -> TokenStream2 {
    let struct_name = &e.ident;
    let crate_name = syn::Ident::new("rpc_rest", Span::call_site());

    let top_level_attrs = match ProcedureErrorAttrs::parse(&e.attrs) {
        Ok(attrs) => attrs,
        Err(err) => return err.to_compile_error(),
    };

    if e.variants.is_empty() {
        return syn::Error::new_spanned(
            e.ident,
            "ProcedureError: enums without variants are not supported",
        )
        .to_compile_error();
    }

    let mut enum_items = TokenStream2::new();
    for variant in e.variants {
        let inner_attrs = match ProcedureErrorAttrs::parse(&variant.attrs) {
            Ok(attrs) => attrs,
            Err(err) => return err.to_compile_error(),
        };
        let attrs = match inner_attrs.finalise_with_parent_attrs(&top_level_attrs) {
            Ok(attrs) => attrs,
            Err(e) => return e.to_compile_error(),
        };

        let ident = &variant.ident;

        if attrs.delegate_to_child {
            if let Err(e) = one_unnamed_field(ident, &variant.fields) {
                return e.to_compile_error();
            }
            enum_items.extend(quote! {
                #struct_name::#ident (inner) => inner.into(),
            });
            continue;
        }

        let full_ident = match variant.fields {
            syn::Fields::Named(..) => quote! { #ident {..} },
            syn::Fields::Unnamed(..) => quote! { #ident (..) },
            syn::Fields::Unit => quote! { #ident },
        };
        let code = &attrs.code;
        let status = attrs.status;

        enum_items.extend(quote! {
            #struct_name::#full_ident => #crate_name::error::ProcedureFailure {
                code: #code.to_owned(),
                status: #status,
                message: format!("{}", s),
            },
        });
    }

    quote! {
        impl From<#struct_name> for #crate_name::error::ProcedureFailure {
            fn from(s: #struct_name) -> #crate_name::error::ProcedureFailure {
                match s {
                    #enum_items
                }
            }
        }
    }
}

fn one_unnamed_field(ident: &syn::Ident, fields: &syn::Fields) -> syn::Result<()> {
    let fields: Vec<_> = match fields {
        syn::Fields::Unnamed(fields) => fields.unnamed.iter().collect(),
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "'#[procedure_error(inner)]' requires exactly one unnamed field (1)",
            ))
        }
    };
    if fields.len() != 1 {
        return Err(syn::Error::new_spanned(
            ident,
            "'#[procedure_error(inner)]' requires exactly one unnamed field (2)",
        ));
    }
    Ok(())
}
