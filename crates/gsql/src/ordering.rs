//! Sorting and paging of query results.

use std::cmp::Ordering;

use crate::path::PropertyPath;
use crate::resolve::resolve_values;
use crate::traits::Reflect;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }
}

/// Compares two values of the same kind.
///
/// Returns `None` if the kinds differ or the comparison is undefined (NaN).
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.compare(*b),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Orders two sort keys in `dir`. Absent keys go last in either direction.
pub fn compare_keys(a: Option<&Value<'_>>, b: Option<&Value<'_>>, dir: Dir) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => dir.apply(compare_values(a, b).unwrap_or(Ordering::Equal)),
    }
}

/// Sorts `items` by the first value `path` resolves to on each. Stable.
pub fn sort_by_path<T: Reflect>(items: &mut Vec<&T>, path: &PropertyPath, dir: Dir) {
    let mut keyed: Vec<(Option<Value<'_>>, &T)> = items
        .iter()
        .map(|item| (sort_key(*item, path), *item))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a.as_ref(), b.as_ref(), dir));
    *items = keyed.into_iter().map(|(_, item)| item).collect();
}

fn sort_key<'a>(item: &'a dyn Reflect, path: &PropertyPath) -> Option<Value<'a>> {
    resolve_values(item, path)
        .into_iter()
        .find(|value| !value.is_nil())
}

/// The slice of `len` items shown on `page` with `limit` items per page.
///
/// `None` or `0` as limit means unlimited and ignores the page.
pub fn page_bounds(len: usize, page: usize, limit: Option<usize>) -> (usize, usize) {
    match limit {
        Some(limit) if limit > 0 => {
            let start = page.saturating_mul(limit).min(len);
            (start, start.saturating_add(limit).min(len))
        }
        _ => (0, len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    #[test]
    fn dir_apply() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
    }

    #[test]
    fn absent_keys_sort_last() {
        let one = Value::Number(Number::I64(1));
        assert_eq!(compare_keys(None, Some(&one), Dir::Asc), Ordering::Greater);
        assert_eq!(compare_keys(None, Some(&one), Dir::Desc), Ordering::Greater);
        assert_eq!(compare_keys(Some(&one), None, Dir::Desc), Ordering::Less);
    }

    #[test]
    fn mismatched_kinds_are_equal() {
        let a = Value::String("a");
        let b = Value::Bool(true);
        assert_eq!(compare_values(&a, &b), None);
        assert_eq!(compare_keys(Some(&a), Some(&b), Dir::Asc), Ordering::Equal);
    }

    #[test]
    fn pages() {
        assert_eq!(page_bounds(25, 0, Some(10)), (0, 10));
        assert_eq!(page_bounds(25, 2, Some(10)), (20, 25));
        assert_eq!(page_bounds(25, 3, Some(10)), (25, 25));
        assert_eq!(page_bounds(25, 5, None), (0, 25));
        assert_eq!(page_bounds(25, 1, Some(0)), (0, 25));
    }
}
