//! Proc macros for gsql.
//!
//! - [`Record`] - Make a struct queryable by deriving its reflection
//!   accessors and static schema

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod record;

/// Derives `gsql::Record` (and `Reflect`/`Struct`) for a struct.
///
/// Every field type must implement `gsql::Reflect`: scalars, `String`,
/// `Option`, `Box`, `Vec`, string-keyed maps and other `Record` structs.
/// The struct also needs `Default` and `Clone`.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `#[gsql(skip)]` | Hide the field from queries |
/// | `#[gsql(rename = "x")]` | Query the field as `x` |
///
/// Field names match case-insensitively and ignore underscores, so
/// `sub_node`, `subNode` and `SUBNODE` address the same field.
///
/// # Generated Code
///
/// 1. Field name constants (e.g., `Task::NAME`, `Task::SUB_NODE`)
/// 2. `Reflect`, `Struct` and `Record` implementations
///
/// # Example
///
/// ```ignore
/// use gsql::Record;
///
/// #[derive(Debug, Clone, Default, Record)]
/// struct Node {
///     name: String,
///     #[gsql(rename = "children")]
///     sub_nodes: Vec<Node>,
///     #[gsql(skip)]
///     cache: u64,
/// }
///
/// assert_eq!(Node::CHILDREN, "children");
/// ```
#[proc_macro_derive(Record, attributes(gsql))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
