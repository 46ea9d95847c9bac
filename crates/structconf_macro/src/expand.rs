//! Code generation for `#[derive(Settable)]`.
//!
//! For a struct like
//!
//! ```ignore
//! pub struct Config {
//!     #[conf("env:NAME")]
//!     pub name: String,
//!     pub db: Database,
//!     secret: String,
//! }
//! ```
//!
//! the expander emits roughly
//!
//! ```ignore
//! impl Settable for Config {
//!     fn settable_fields<'a>(&'a mut self, fields: &mut Vec<Field<'a>>) -> Result<(), Error> {
//!         let Self { name, db, .. } = self;
//!         Discover::discover(name, Member::new("name", Some("env:NAME")), fields)?;
//!         Discover::discover(db, Member::new("db", None), fields)?;
//!         Ok(())
//!     }
//! }
//!
//! impl Discover for Config { /* delegates to settable_fields */ }
//! ```
//!
//! Destructuring `self` hands out disjoint `&mut` borrows, so every field
//! produced points into the caller's record.

use proc_macro2::TokenStream as QuoteStream;
use quote::{quote, quote_spanned};
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::token::Comma;
use syn::{Data, DeriveInput, Error as SynError, Field, Fields, Result as SynResult, Visibility};

use crate::parse::FieldAttr;

/// The orchestrator for macro expansion.
pub struct Expander;

impl Expander {
    /// Main entry point for expanding the derive macro.
    pub fn expand(input: &DeriveInput) -> SynResult<QuoteStream> {
        let struct_name = &input.ident;
        let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

        let fields = Self::extract_struct_fields(input)?;

        let mut bindings = Vec::new();
        let mut calls = Vec::new();

        for field in fields {
            let attr = FieldAttr::parse_from_field(field)?;

            if matches!(field.vis, Visibility::Inherited) {
                if let (Some(conf), false) = (&attr.attr, attr.skip) {
                    return Err(SynError::new_spanned(
                        conf,
                        "#[conf] on a private field has no effect; make the field `pub`",
                    ));
                }
                continue;
            }

            if attr.skip {
                continue;
            }

            let ident = field
                .ident
                .as_ref()
                .ok_or_else(|| SynError::new_spanned(field, "expected a named field"))?;
            let display = ident.unraw().to_string();
            let annotation = match &attr.annotation {
                Some(lit) => quote! { ::core::option::Option::Some(#lit) },
                None => quote! { ::core::option::Option::None },
            };

            calls.push(quote_spanned! {field.ty.span()=>
                ::structconf::Discover::discover(
                    #ident,
                    ::structconf::Member::new(#display, #annotation),
                    __fields,
                )?;
            });
            bindings.push(ident);
        }

        Ok(quote! {
            impl #impl_generics ::structconf::Settable for #struct_name #ty_generics #where_clause {
                fn settable_fields<'__a>(
                    &'__a mut self,
                    __fields: &mut ::std::vec::Vec<::structconf::Field<'__a>>,
                ) -> ::core::result::Result<(), ::structconf::Error> {
                    let Self { #(#bindings,)* .. } = self;
                    #(#calls)*
                    ::core::result::Result::Ok(())
                }
            }

            impl #impl_generics ::structconf::Discover for #struct_name #ty_generics #where_clause {
                fn discover<'__a>(
                    &'__a mut self,
                    _member: ::structconf::Member,
                    __fields: &mut ::std::vec::Vec<::structconf::Field<'__a>>,
                ) -> ::core::result::Result<(), ::structconf::Error> {
                    ::structconf::Settable::settable_fields(self, __fields)
                }
            }
        })
    }

    /// Validates the input is a struct with named fields.
    fn extract_struct_fields(input: &DeriveInput) -> SynResult<&Punctuated<Field, Comma>> {
        match &input.data {
            Data::Struct(data_struct) => match &data_struct.fields {
                Fields::Named(fields_named) => Ok(&fields_named.named),

                Fields::Unnamed(_) => Err(SynError::new_spanned(
                    input,
                    "Settable does not support tuple structs",
                )),

                Fields::Unit => Err(SynError::new_spanned(
                    input,
                    "Settable does not support unit structs",
                )),
            },

            Data::Enum(_) => Err(SynError::new_spanned(
                input,
                "Settable can only be derived for structs, not enums",
            )),

            Data::Union(_) => Err(SynError::new_spanned(
                input,
                "Settable can only be derived for structs, not unions",
            )),
        }
    }
}
