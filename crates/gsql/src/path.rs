//! Property paths: `type.field[key].sub`.
//!
//! A path is a list of segments, each naming a struct field and optionally
//! carrying a bracketed key. On a list the key is an index, on a map it is
//! the map key. A segment without a key on a list or map fans out across
//! every element.
//!
//! Field names are case-insensitive and ignore underscores, so
//! `SlicePtrNoKey` and `slice_ptr_no_key` name the same field. Keys are
//! kept verbatim.

use std::fmt;

use crate::error::ResolutionError;
use crate::traits::{Shape, StructSchema};

/// Normalizes a field or type name for lookup: lower case, no underscores.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lower-cases `text` except inside `[...]` and `'...'` regions.
pub fn lower_outside_keys(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_key = false;
    let mut in_quote = false;
    for c in text.chars() {
        match c {
            '[' if !in_quote => in_key = true,
            ']' if !in_quote => in_key = false,
            '\'' if !in_key => in_quote = !in_quote,
            _ => {}
        }
        if in_key || in_quote {
            out.push(c);
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Normalized field name.
    pub name: String,
    /// Bracketed key, if any.
    pub key: Option<String>,
}

impl Segment {
    pub fn new(name: &str, key: Option<&str>) -> Self {
        Segment {
            name: normalize_name(name),
            key: key.map(str::to_string),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}[{}]", self.name, key),
            None => f.write_str(&self.name),
        }
    }
}

/// A path bound to a root struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    root: String,
    segments: Vec<Segment>,
}

impl PropertyPath {
    /// Parses `text` and checks every segment against `root`.
    ///
    /// The path may start with the root type name (`node.string`) or omit
    /// it (`string`).
    pub fn bind(text: &str, root: &'static StructSchema) -> Result<Self, ResolutionError> {
        let mut segments = parse_segments(text)?;
        if segments.len() > 1
            && segments[0].key.is_none()
            && segments[0].name == normalize_name(root.name)
        {
            segments.remove(0);
        }
        if segments.is_empty() {
            return Err(ResolutionError::UnknownField {
                ty: root.name.to_string(),
                field: text.to_string(),
            });
        }

        let mut current = Shape::Struct(root);
        let mut previous = root.name;
        for segment in &segments {
            let schema = match current.pointee() {
                Shape::Struct(schema) => schema,
                _ => return Err(ResolutionError::NotAStruct(previous.to_string())),
            };
            let field = schema
                .field(&segment.name)
                .ok_or_else(|| ResolutionError::UnknownField {
                    ty: schema.name.to_string(),
                    field: segment.name.clone(),
                })?;
            current = step_shape((field.shape)(), field.name, segment.key.as_deref())?;
            previous = field.name;
        }

        Ok(PropertyPath {
            root: root.name.to_string(),
            segments,
        })
    }

    /// Root type name as declared.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Canonical identifier, e.g. `node.mapprimary[k1].string`.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root.to_lowercase())?;
        for segment in &self.segments {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

/// Shape reached after applying a segment's key to a field of `shape`.
fn step_shape(shape: Shape, field: &str, key: Option<&str>) -> Result<Shape, ResolutionError> {
    match (shape.pointee(), key) {
        (Shape::List(inner), Some(key)) => {
            key.parse::<usize>()
                .map_err(|_| ResolutionError::InvalidIndex {
                    field: field.to_string(),
                    key: key.to_string(),
                })?;
            Ok(inner())
        }
        (Shape::Map(inner), Some(_)) => Ok(inner()),
        (_, Some(key)) => Err(ResolutionError::KeyOnScalar {
            field: field.to_string(),
            key: key.to_string(),
        }),
        (Shape::List(inner) | Shape::Map(inner), None) => Ok(inner()),
        (other, None) => Ok(other),
    }
}

/// Splits `a.b[k].c` into segments. Dots inside brackets do not split.
fn parse_segments(text: &str) -> Result<Vec<Segment>, ResolutionError> {
    let invalid = || ResolutionError::UnknownField {
        ty: String::new(),
        field: text.to_string(),
    };

    let mut segments = Vec::new();
    let mut rest = text.trim();
    while !rest.is_empty() {
        let end = rest.find(['.', '[']).unwrap_or(rest.len());
        let name = rest[..end].trim();
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(invalid());
        }
        rest = &rest[end..];

        let key = if let Some(inner) = rest.strip_prefix('[') {
            let close = inner.find(']').ok_or_else(invalid)?;
            let key = &inner[..close];
            rest = &inner[close + 1..];
            Some(key)
        } else {
            None
        };
        segments.push(Segment::new(name, key));

        rest = match rest.strip_prefix('.') {
            Some(next) if !next.is_empty() => next,
            Some(_) => return Err(invalid()),
            None if rest.is_empty() => rest,
            None => return Err(invalid()),
        };
    }
    Ok(segments)
}
