//! Reading and writing values at a property path.
//!
//! Reads fan out: a key-less segment over a list or map visits every
//! element, so one path can yield many values. Nil pointers end a branch
//! on read; inside a fanned-out list they are skipped.
//!
//! Writes never fan out. Missing pointers, map entries and list slots are
//! created on the way down; a key-less list segment writes to index 0.

use crate::error::ResolutionError;
use crate::path::{PropertyPath, Segment};
use crate::traits::{Reflect, Shape, View, ViewMut};
use crate::value::Value;

/// Returns every value reached by `path` from `root`.
pub fn resolve<'a>(root: &'a dyn Reflect, path: &PropertyPath) -> Vec<&'a dyn Reflect> {
    let mut out = Vec::new();
    walk(root, path.segments(), &mut out);
    out
}

/// Resolves `path` and flattens the results into comparable leaf values.
pub fn resolve_values<'a>(root: &'a dyn Reflect, path: &PropertyPath) -> Vec<Value<'a>> {
    let mut values = Vec::new();
    for node in resolve(root, path) {
        flatten(node, &mut values);
    }
    values
}

/// Flattens one reflected value into leaf values.
///
/// Lists and maps contribute each element, skipping absent pointers. A
/// standalone absent pointer becomes [`Value::Nil`]; a pointer to a struct
/// becomes [`Value::Pointer`].
pub fn flatten<'a>(node: &'a dyn Reflect, out: &mut Vec<Value<'a>>) {
    match node.view() {
        View::Scalar(value) => out.push(value),
        View::Pointer(None) => out.push(Value::Nil),
        View::Pointer(Some(inner)) => match inner.view() {
            View::Struct(_) => out.push(Value::Pointer),
            _ => flatten(inner, out),
        },
        View::List(list) => {
            for element in (0..list.len()).filter_map(move |index| list.get(index)) {
                flatten_element(element, out);
            }
        }
        View::Map(map) => {
            for element in map.keys().into_iter().filter_map(move |key| map.get(key)) {
                flatten_element(element, out);
            }
        }
        View::Struct(s) => out.push(Value::Struct(s.struct_schema().name)),
    }
}

fn flatten_element<'a>(element: &'a dyn Reflect, out: &mut Vec<Value<'a>>) {
    if !matches!(element.view(), View::Pointer(None)) {
        flatten(element, out);
    }
}

fn walk<'a>(node: &'a dyn Reflect, segments: &[Segment], out: &mut Vec<&'a dyn Reflect>) {
    let Some((segment, rest)) = segments.split_first() else {
        out.push(node);
        return;
    };
    match node.view() {
        View::Pointer(Some(inner)) => walk(inner, segments, out),
        View::Struct(s) => {
            if let Some(field) = s.field(&segment.name) {
                select(field, segment.key.as_deref(), rest, out);
            }
        }
        _ => {}
    }
}

fn select<'a>(
    node: &'a dyn Reflect,
    key: Option<&str>,
    rest: &[Segment],
    out: &mut Vec<&'a dyn Reflect>,
) {
    match node.view() {
        View::Pointer(None) => {
            if key.is_none() && rest.is_empty() {
                out.push(node);
            }
        }
        View::Pointer(Some(inner)) => select(inner, key, rest, out),
        View::List(list) => match key {
            Some(key) => {
                if let Some(element) = key.parse::<usize>().ok().and_then(|i| list.get(i)) {
                    walk(element, rest, out);
                }
            }
            None if rest.is_empty() => out.push(node),
            None => {
                for index in 0..list.len() {
                    match list.get(index) {
                        Some(element) if !matches!(element.view(), View::Pointer(None)) => {
                            walk(element, rest, out)
                        }
                        _ => {}
                    }
                }
            }
        },
        View::Map(map) => match key {
            Some(key) => {
                if let Some(element) = map.get(key) {
                    walk(element, rest, out);
                }
            }
            None if rest.is_empty() => out.push(node),
            None => {
                for key in map.keys() {
                    if let Some(element) = map.get(key) {
                        walk(element, rest, out);
                    }
                }
            }
        },
        View::Scalar(_) | View::Struct(_) => {
            if key.is_none() {
                walk(node, rest, out);
            }
        }
    }
}

/// Returns the single value at `path`, creating anything missing on the way.
pub fn ensure_path<'a>(
    root: &'a mut dyn Reflect,
    path: &PropertyPath,
) -> Result<&'a mut dyn Reflect, ResolutionError> {
    ensure(root, path.segments())
}

/// Writes a clone of `value` at `path`, creating anything missing.
pub fn assign(
    root: &mut dyn Reflect,
    path: &PropertyPath,
    value: &dyn Reflect,
) -> Result<(), ResolutionError> {
    let target = ensure_path(root, path)?;
    if target.set_from(value) {
        Ok(())
    } else {
        Err(ResolutionError::TypeMismatch(path.id()))
    }
}

/// Copies whatever `path` reaches in `src` into `dst` at the same keys.
///
/// `src` and `dst` must be the same type. Branches that are absent in `src`
/// are left untouched in `dst`.
pub fn project(
    src: &dyn Reflect,
    dst: &mut dyn Reflect,
    path: &PropertyPath,
) -> Result<(), ResolutionError> {
    copy_path(src, dst, path.segments(), &path.id())
}

fn ensure<'a>(
    node: &'a mut dyn Reflect,
    segments: &[Segment],
) -> Result<&'a mut dyn Reflect, ResolutionError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(node);
    };
    match node.view_mut() {
        ViewMut::Pointer(pointer) => ensure(pointer.get_or_default(), segments),
        ViewMut::Struct(s) => {
            let ty = s.struct_schema().name;
            let field = s
                .field_mut(&segment.name)
                .ok_or_else(|| ResolutionError::UnknownField {
                    ty: ty.to_string(),
                    field: segment.name.clone(),
                })?;
            let target = if rest.is_empty() && segment.key.is_none() {
                field
            } else {
                select_mut(field, segment)?
            };
            ensure(target, rest)
        }
        _ => Err(ResolutionError::NotAStruct(segment.name.clone())),
    }
}

fn select_mut<'a>(
    node: &'a mut dyn Reflect,
    segment: &Segment,
) -> Result<&'a mut dyn Reflect, ResolutionError> {
    let is_container = matches!(
        node.dyn_shape(),
        Shape::Pointer(_) | Shape::List(_) | Shape::Map(_)
    );
    if !is_container {
        return match &segment.key {
            None => Ok(node),
            Some(key) => Err(ResolutionError::KeyOnScalar {
                field: segment.name.clone(),
                key: key.clone(),
            }),
        };
    }

    match node.view_mut() {
        ViewMut::Pointer(pointer) => select_mut(pointer.get_or_default(), segment),
        ViewMut::List(list) => {
            let index = match &segment.key {
                Some(key) => parse_index(segment, key)?,
                None => 0,
            };
            list.grow(index + 1);
            list.get_mut(index)
                .ok_or_else(|| ResolutionError::InvalidIndex {
                    field: segment.name.clone(),
                    key: index.to_string(),
                })
        }
        ViewMut::Map(map) => match &segment.key {
            Some(key) => Ok(map.entry(key)),
            None => Err(ResolutionError::MissingMapKey(segment.name.clone())),
        },
        _ => Err(ResolutionError::NotAStruct(segment.name.clone())),
    }
}

fn parse_index(segment: &Segment, key: &str) -> Result<usize, ResolutionError> {
    key.parse::<usize>()
        .map_err(|_| ResolutionError::InvalidIndex {
            field: segment.name.clone(),
            key: key.to_string(),
        })
}

fn copy_path(
    src: &dyn Reflect,
    dst: &mut dyn Reflect,
    segments: &[Segment],
    id: &str,
) -> Result<(), ResolutionError> {
    let Some((segment, rest)) = segments.split_first() else {
        return if dst.set_from(src) {
            Ok(())
        } else {
            Err(ResolutionError::TypeMismatch(id.to_string()))
        };
    };
    match (src.view(), dst.view_mut()) {
        (View::Pointer(None), _) => Ok(()),
        (View::Pointer(Some(inner)), ViewMut::Pointer(pointer)) => {
            copy_path(inner, pointer.get_or_default(), segments, id)
        }
        (View::Struct(from), ViewMut::Struct(to)) => {
            let (Some(from), Some(to)) = (from.field(&segment.name), to.field_mut(&segment.name))
            else {
                return Err(ResolutionError::UnknownField {
                    ty: from.struct_schema().name.to_string(),
                    field: segment.name.clone(),
                });
            };
            if rest.is_empty() && segment.key.is_none() {
                copy_path(from, to, rest, id)
            } else {
                copy_entries(from, to, segment, rest, id)
            }
        }
        _ => Err(ResolutionError::NotAStruct(segment.name.clone())),
    }
}

fn copy_entries(
    src: &dyn Reflect,
    dst: &mut dyn Reflect,
    segment: &Segment,
    rest: &[Segment],
    id: &str,
) -> Result<(), ResolutionError> {
    if segment.key.is_none() && !src.dyn_shape().is_collection() {
        return copy_path(src, dst, rest, id);
    }
    match (src.view(), dst.view_mut()) {
        (View::Pointer(None), _) => Ok(()),
        (View::Pointer(Some(inner)), ViewMut::Pointer(pointer)) => {
            copy_entries(inner, pointer.get_or_default(), segment, rest, id)
        }
        (View::List(from), ViewMut::List(to)) => {
            let indices = match &segment.key {
                Some(key) => vec![parse_index(segment, key)?],
                None => (0..from.len()).collect(),
            };
            for index in indices {
                let Some(element) = from.get(index) else {
                    continue;
                };
                to.grow(index + 1);
                if let Some(target) = to.get_mut(index) {
                    copy_path(element, target, rest, id)?;
                }
            }
            Ok(())
        }
        (View::Map(from), ViewMut::Map(to)) => {
            let keys = match &segment.key {
                Some(key) => vec![key.as_str()],
                None => from.keys(),
            };
            for key in keys {
                if let Some(element) = from.get(key) {
                    copy_path(element, to.entry(key), rest, id)?;
                }
            }
            Ok(())
        }
        _ => Err(ResolutionError::KeyOnScalar {
            field: segment.name.clone(),
            key: segment.key.clone().unwrap_or_default(),
        }),
    }
}
