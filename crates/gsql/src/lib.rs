//! gsql - SQL-like queries over in-memory object graphs.
//!
//! gsql filters and projects collections of nested structs without a
//! backing datastore:
//!
//! ```text
//! select <cols> from <type> where <expr> [sort-by <col>] [page <n>]
//!     [limit <n>] [match-case] [descending | ascending]
//! ```
//!
//! - Expressions nest with brackets and join comparators with `and`/`or`
//! - Comparators: `=`, `!=`, `>`, `<`, `>=`, `<=`, `in`, `not in`
//! - Operands are literals or property paths (`node.sub[key].field`) that
//!   may fan out across lists and maps
//! - Results can be projected to the selected columns, sorted and paged
//!
//! # Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use gsql::{Query, Record, Registry};
//!
//! #[derive(Debug, Clone, Default, Record)]
//! struct Host {
//!     name: String,
//!     cores: u32,
//!     labels: HashMap<String, String>,
//! }
//!
//! let registry = Registry::new();
//! registry.register::<Host>();
//!
//! let hosts = vec![
//!     Host {
//!         name: "db-1".into(),
//!         cores: 16,
//!         labels: HashMap::from([("env".into(), "prod".into())]),
//!     },
//!     Host {
//!         name: "web-1".into(),
//!         cores: 4,
//!         labels: HashMap::from([("env".into(), "dev".into())]),
//!     },
//! ];
//!
//! let query = Query::compile(
//!     "select * from host where labels[env] = prod or (cores > 8 and name = web*)",
//!     &registry,
//! )
//! .unwrap();
//!
//! let matched = query.execute(&hosts);
//! assert_eq!(matched.len(), 1);
//! assert_eq!(matched[0].name, "db-1");
//! ```
//!
//! # Comparison Semantics
//!
//! | Kind | Operators | Notes |
//! |------|-----------|-------|
//! | String | all | case-insensitive unless `match-case`; `*` wildcards; `nil` matches empty |
//! | Int / Uint / Float | all | `nil` equals zero; unparsable literals never match |
//! | Bool | `=`, `!=`, `in`, `not in` | |
//! | Pointer | `=`, `!=` | compares presence against `nil` |
//!
//! When a field fans out to several values, a comparator holds if any value
//! satisfies it.

extern crate self as gsql;

mod ast;
mod compare;
mod error;
mod eval;
mod op;
mod options;
mod ordering;
mod parser;
mod path;
mod query;
mod resolve;
mod schema;
mod statement;
mod traits;
mod value;

// Re-export public API
pub use ast::{Comparator, Condition, Conjunction, Expression};
pub use compare::compare;
pub use error::{EvalError, GsqlError, ParseError, ResolutionError, Result};
pub use op::Operator;
pub use options::QueryOptions;
pub use ordering::{compare_values, Dir};
pub use parser::parse;
pub use path::{normalize_name, PropertyPath, Segment};
pub use query::Query;
pub use resolve::{assign, ensure_path, project, resolve, resolve_values};
pub use schema::{Registry, SchemaProvider};
pub use statement::Statement;
pub use traits::{
    FieldSchema, List, Map, Pointer, Record, Reflect, Shape, Struct, StructSchema, View, ViewMut,
};
pub use value::{Kind, Number, Value};

pub use gsql_macros::Record;
