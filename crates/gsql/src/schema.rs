//! Type lookup for query compilation.
//!
//! A query names its root type in `from`. The compiler asks a
//! [`SchemaProvider`] for that type's [`StructSchema`] and binds every path
//! against it. [`Registry`] is the provided implementation.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::ResolutionError;
use crate::path::{normalize_name, PropertyPath};
use crate::traits::{Record, Shape, StructSchema};

/// Looks up root types by name.
pub trait SchemaProvider {
    /// Returns the schema of the type called `name`, compared
    /// case-insensitively.
    fn root_type(&self, name: &str) -> Option<&'static StructSchema>;

    /// Binds `path` against the type called `root`.
    fn resolve_path(&self, path: &str, root: &str) -> Result<PropertyPath, ResolutionError> {
        let schema = self
            .root_type(root)
            .ok_or_else(|| ResolutionError::UnknownType(root.to_string()))?;
        PropertyPath::bind(path, schema)
    }
}

/// Thread-safe set of known record types.
///
/// Registering a type also registers every struct type reachable from its
/// fields.
#[derive(Debug, Default)]
pub struct Registry {
    types: RwLock<HashMap<String, &'static StructSchema>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Registers `T` and the struct types nested in it.
    pub fn register<T: Record>(&self) -> &Self {
        self.register_schema(T::schema());
        self
    }

    pub fn register_schema(&self, schema: &'static StructSchema) {
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        insert_nested(&mut types, schema);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.root_type(name).is_some()
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<&'static str> = types.values().map(|s| s.name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn insert_nested(types: &mut HashMap<String, &'static StructSchema>, schema: &'static StructSchema) {
    let key = normalize_name(schema.name);
    if types.contains_key(&key) {
        return;
    }
    debug!(name = schema.name, "registering type");
    types.insert(key, schema);
    for field in schema.fields {
        if let Shape::Struct(nested) = (field.shape)().element() {
            insert_nested(types, nested);
        }
    }
}

impl SchemaProvider for Registry {
    fn root_type(&self, name: &str) -> Option<&'static StructSchema> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        types.get(&normalize_name(name)).copied()
    }
}
