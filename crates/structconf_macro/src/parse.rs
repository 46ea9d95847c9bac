//! Attribute parsing for `#[conf("...")]` and `#[conf(skip)]`.
//!
//! ```ignore
//! #[conf("env:PORT,flag:port,default:8080")]   // annotation
//! #[conf(skip)]                                // excluded from discovery
//! ```

use syn::parse::ParseStream;
use syn::{Attribute, Error as SynError, Field, Ident, LitStr, Result as SynResult};

/// Parsed `#[conf]` attribute of one field.
#[derive(Default)]
pub struct FieldAttr {
    /// The annotation string, if one was given.
    pub annotation: Option<LitStr>,

    /// Whether the field is excluded.
    pub skip: bool,

    /// The attribute itself, for error spans.
    pub attr: Option<Attribute>,
}

impl FieldAttr {
    /// Reads the `#[conf]` attribute of `field`, if any.
    pub fn parse_from_field(field: &Field) -> SynResult<Self> {
        let mut parsed = Self::default();

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("conf")) {
            if parsed.attr.is_some() {
                return Err(SynError::new_spanned(attr, "duplicate #[conf] attribute"));
            }

            attr.parse_args_with(|input: ParseStream| {
                if input.peek(LitStr) {
                    parsed.annotation = Some(input.parse()?);
                } else {
                    let ident: Ident = input.parse().map_err(|e| {
                        SynError::new(e.span(), "expected #[conf(\"...\")] or #[conf(skip)]")
                    })?;

                    if ident != "skip" {
                        return Err(SynError::new_spanned(
                            ident,
                            "unknown conf option, expected `skip` or a string annotation",
                        ));
                    }
                    parsed.skip = true;
                }

                if !input.is_empty() {
                    return Err(input.error("unexpected tokens after conf option"));
                }
                Ok(())
            })?;

            parsed.attr = Some(attr.clone());
        }

        Ok(parsed)
    }
}
