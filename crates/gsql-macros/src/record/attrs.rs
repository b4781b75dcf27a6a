//! Parsing of `#[gsql(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Lit, Meta, Result, Token,
};

/// Field-level attributes from `#[gsql(...)]`.
#[derive(Debug, Clone)]
pub struct GsqlAttr {
    /// Leave the field out of the schema; queries cannot address it.
    pub skip: bool,
    /// Name used in queries instead of the Rust field name.
    pub rename: Option<String>,
    pub span: Span,
}

impl Default for GsqlAttr {
    fn default() -> Self {
        GsqlAttr {
            skip: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl Parse for GsqlAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = GsqlAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => {
                    attr.skip = true;
                    attr.span = p.span();
                }

                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    match &nv.value {
                        syn::Expr::Lit(syn::ExprLit {
                            lit: Lit::Str(s), ..
                        }) if !s.value().is_empty() => {
                            let name = s.value();
                            if !is_field_name(&name) {
                                return Err(Error::new(
                                    s.span(),
                                    format!(
                                        "rename '{}' is not a valid field name: use letters, digits and underscores, starting with a letter or underscore",
                                        name
                                    ),
                                ));
                            }
                            attr.rename = Some(name);
                            attr.span = s.span();
                        }
                        _ => {
                            return Err(Error::new(
                                nv.value.span(),
                                "rename must be a non-empty string literal",
                            ));
                        }
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown gsql attribute. Expected: skip or rename = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

fn is_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts_well
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.chars().any(|c| c.is_ascii_alphanumeric())
}

/// Extracts `#[gsql(...)]` from a field's attributes.
pub fn parse_gsql_attrs(attrs: &[Attribute]) -> Result<GsqlAttr> {
    for attr in attrs {
        if attr.path().is_ident("gsql") {
            return attr.parse_args::<GsqlAttr>();
        }
    }
    Ok(GsqlAttr::default())
}
