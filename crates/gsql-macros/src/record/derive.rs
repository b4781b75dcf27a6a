//! Implementation of the `#[derive(Record)]` macro.
//!
//! Generates the `Reflect`, `Struct` and `Record` implementations and field
//! name constants for a struct with named fields.

use std::collections::HashMap;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Ident, Result};

use super::attrs::parse_gsql_attrs;

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let type_name = struct_name.to_string();

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unit => return Ok(unit_impl(struct_name, &type_name)),
            Fields::Unnamed(_) => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut field_schemas: Vec<TokenStream> = Vec::new();
    let mut field_arms: Vec<TokenStream> = Vec::new();
    let mut field_mut_arms: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_gsql_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let raw_name = field_name.to_string();
        let query_name = attrs
            .rename
            .unwrap_or_else(|| raw_name.trim_start_matches("r#").to_string());
        let key = normalize_key(&query_name);

        if let Some(previous) = seen.insert(key.clone(), query_name.clone()) {
            return Err(Error::new(
                field.span(),
                format!(
                    "field '{}' collides with '{}': both are queried as '{}'",
                    query_name, previous, key
                ),
            ));
        }

        let ty = &field.ty;
        let const_name: Ident = syn::parse_str(&to_screaming_snake_case(&query_name))
            .map_err(|_| {
                Error::new(
                    field.span(),
                    format!("cannot derive a constant name from '{}'", query_name),
                )
            })?;

        field_constants.push(quote! {
            /// Field name as used in queries.
            pub const #const_name: &'static str = #query_name;
        });

        field_schemas.push(quote! {
            ::gsql::FieldSchema {
                name: #query_name,
                key: #key,
                shape: <#ty as ::gsql::Reflect>::shape,
            },
        });

        field_arms.push(quote! {
            #key => ::std::option::Option::Some(&self.#field_name as &dyn ::gsql::Reflect),
        });

        field_mut_arms.push(quote! {
            #key => ::std::option::Option::Some(&mut self.#field_name as &mut dyn ::gsql::Reflect),
        });
    }

    let reflect = reflect_impl(struct_name);

    let expanded = quote! {
        impl #struct_name {
            #(#field_constants)*
        }

        #reflect

        impl ::gsql::Struct for #struct_name {
            fn struct_schema(&self) -> &'static ::gsql::StructSchema {
                <Self as ::gsql::Record>::schema()
            }

            fn field(&self, key: &str) -> ::std::option::Option<&dyn ::gsql::Reflect> {
                match key {
                    #(#field_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            fn field_mut(&mut self, key: &str) -> ::std::option::Option<&mut dyn ::gsql::Reflect> {
                match key {
                    #(#field_mut_arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::gsql::Record for #struct_name {
            fn schema() -> &'static ::gsql::StructSchema {
                static SCHEMA: ::gsql::StructSchema = ::gsql::StructSchema {
                    name: #type_name,
                    fields: &[
                        #(#field_schemas)*
                    ],
                };
                &SCHEMA
            }
        }
    };

    Ok(expanded)
}

fn reflect_impl(struct_name: &syn::Ident) -> TokenStream {
    quote! {
        impl ::gsql::Reflect for #struct_name {
            fn shape() -> ::gsql::Shape {
                ::gsql::Shape::Struct(<Self as ::gsql::Record>::schema())
            }

            fn dyn_shape(&self) -> ::gsql::Shape {
                <Self as ::gsql::Reflect>::shape()
            }

            fn view(&self) -> ::gsql::View<'_> {
                ::gsql::View::Struct(self)
            }

            fn view_mut(&mut self) -> ::gsql::ViewMut<'_> {
                ::gsql::ViewMut::Struct(self)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn set_from(&mut self, src: &dyn ::gsql::Reflect) -> bool {
                match src.as_any().downcast_ref::<Self>() {
                    ::std::option::Option::Some(value) => {
                        *self = ::std::clone::Clone::clone(value);
                        true
                    }
                    ::std::option::Option::None => false,
                }
            }
        }
    }
}

fn unit_impl(struct_name: &syn::Ident, type_name: &str) -> TokenStream {
    let reflect = reflect_impl(struct_name);
    quote! {
        #reflect

        impl ::gsql::Struct for #struct_name {
            fn struct_schema(&self) -> &'static ::gsql::StructSchema {
                <Self as ::gsql::Record>::schema()
            }

            fn field(&self, _key: &str) -> ::std::option::Option<&dyn ::gsql::Reflect> {
                ::std::option::Option::None
            }

            fn field_mut(&mut self, _key: &str) -> ::std::option::Option<&mut dyn ::gsql::Reflect> {
                ::std::option::Option::None
            }
        }

        impl ::gsql::Record for #struct_name {
            fn schema() -> &'static ::gsql::StructSchema {
                static SCHEMA: ::gsql::StructSchema = ::gsql::StructSchema {
                    name: #type_name,
                    fields: &[],
                };
                &SCHEMA
            }
        }
    }
}

/// Lower case with underscores removed, matching how queries name fields.
fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_alphanumeric();
        }
    }

    result
}
