//! # structconf_macro
//!
//! Procedural macro implementation for the `structconf` crate.
//!
//! This crate provides `#[derive(Settable)]`, which lists a struct's
//! settable fields for the runtime's discovery engine. It is a proc-macro
//! crate and can only export procedural macros.
//!
//! **Note:** Users should depend on the `structconf` crate, not this one
//! directly. `structconf` re-exports this macro along with the runtime
//! types the generated code refers to.
//!
//! # Module Structure
//!
//! - `parse` - Parsing of `#[conf(...)]` field attributes
//! - `expand` - Generation of the `Settable` and `Discover` impls

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod expand;
mod parse;

/// Derives `structconf::Settable` and `structconf::Discover`.
///
/// Every `pub` (or `pub(...)`) field takes part in discovery, in declaration
/// order. Private fields are skipped.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `#[conf("env:NAME,default:5")]` | The field's annotation |
/// | `#[conf(skip)]` | Exclude the field |
///
/// A field may carry at most one `#[conf]` attribute.
///
/// # Example
///
/// ```ignore
/// use structconf::Settable;
///
/// #[derive(Settable, Default)]
/// pub struct Config {
///     #[conf("env:NAME,required")]
///     pub name: String,
///
///     #[conf("env:PORT,flag:port,default:8080")]
///     pub port: u16,
///
///     // Nested records are walked recursively
///     pub db: Database,
///
///     // Optional records are walked only when present
///     pub cache: Option<Cache>,
///
///     #[conf(skip)]
///     pub computed: u64,
/// }
/// ```
///
/// # Generated Code
///
/// - `impl Settable` - appends the struct's fields, recursing into members
/// - `impl Discover` - lets the struct appear as a member of another record
#[proc_macro_derive(Settable, attributes(conf))]
pub fn derive_settable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    // On error, convert to a compile_error!() invocation
    expand::Expander::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
