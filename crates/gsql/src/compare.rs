//! Typed comparison of resolved operand values.
//!
//! Each side of a comparator is a list of values: a field path may resolve
//! to many (fan-out), a literal is a single string. The comparison kind is
//! taken from whichever side holds typed values, left first; strings are
//! the fallback. A comparator holds when any left value satisfies it
//! against any right value.
//!
//! String rules:
//! - values are lower-cased unless the query is case sensitive
//! - a value wrapped in single quotes loses the quotes
//! - `nil` matches the empty string and an absent value
//! - `*` alone matches anything; elsewhere it splits the pattern into
//!   segments that must all occur in the other side
//! - wildcards are read from the query literal only, never from field data
//!
//! Numbers parse the literal side; a literal that does not parse never
//! matches, except that `nil` equals zero.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::error::EvalError;
use crate::op::Operator;
use crate::value::{Kind, Number, Value};

/// Literal that stands for an absent or zero value.
pub const NIL: &str = "nil";

/// Side of a comparator that holds the query literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LiteralSide {
    Left,
    Right,
    Neither,
}

/// Compares `left` against `right` with `op`.
///
/// `right` is taken as the query literal: only its wildcards apply.
pub fn compare(
    op: Operator,
    left: &[Value<'_>],
    right: &[Value<'_>],
    case_sensitive: bool,
) -> Result<bool, EvalError> {
    compare_operands(op, left, right, case_sensitive, LiteralSide::Right)
}

pub(crate) fn compare_operands(
    op: Operator,
    left: &[Value<'_>],
    right: &[Value<'_>],
    case_sensitive: bool,
    literal: LiteralSide,
) -> Result<bool, EvalError> {
    let kind = effective_kind(left, right);
    if !op.supports(kind) {
        return Err(EvalError::Unsupported { op, kind });
    }

    if op.is_membership() {
        let members = expand_members(right);
        return Ok(left
            .iter()
            .any(|value| membership(op, kind, value, &members, case_sensitive)));
    }

    Ok(left.iter().any(|l| {
        right
            .iter()
            .any(|r| compare_pair(op, kind, l, r, case_sensitive, literal))
    }))
}

/// Kind used to compare two operand lists.
pub fn effective_kind(left: &[Value<'_>], right: &[Value<'_>]) -> Kind {
    match side_kind(left) {
        Kind::String => side_kind(right),
        kind => kind,
    }
}

fn side_kind(values: &[Value<'_>]) -> Kind {
    values
        .iter()
        .find(|v| !v.is_nil())
        .or_else(|| values.first())
        .map_or(Kind::String, Value::kind)
}

fn compare_pair(
    op: Operator,
    kind: Kind,
    left: &Value<'_>,
    right: &Value<'_>,
    case: bool,
    literal: LiteralSide,
) -> bool {
    if left.is_nil() || right.is_nil() {
        return match op {
            Operator::Eq => nil_eq(left, right),
            Operator::NotEq => !nil_eq(left, right),
            _ => false,
        };
    }
    match kind {
        Kind::String => compare_text(op, left, right, case, literal),
        Kind::Int | Kind::Uint | Kind::Float => compare_numbers(op, kind, left, right),
        Kind::Bool => match (to_bool(left), to_bool(right)) {
            (Some(a), Some(b)) => op.eval_ordering(a.cmp(&b)),
            _ => false,
        },
        // A present pointer never equals a literal.
        Kind::Pointer => op == Operator::NotEq,
        Kind::Struct => false,
    }
}

fn nil_eq(left: &Value<'_>, right: &Value<'_>) -> bool {
    let is_nil = |v: &Value<'_>| match v {
        Value::Nil => true,
        Value::String(s) => strip_quotes(s).eq_ignore_ascii_case(NIL) || s.is_empty(),
        _ => false,
    };
    is_nil(left) && is_nil(right)
}

fn compare_text(
    op: Operator,
    left: &Value<'_>,
    right: &Value<'_>,
    case: bool,
    literal: LiteralSide,
) -> bool {
    let a = prepare(left, case);
    let z = prepare(right, case);
    match op {
        Operator::Eq => text_eq(&a, &z, literal),
        Operator::NotEq => !text_eq(&a, &z, literal),
        _ => op.eval_ordering(a.cmp(&z)),
    }
}

fn text_eq(a: &str, z: &str, literal: LiteralSide) -> bool {
    if (a == NIL && z.is_empty()) || (z == NIL && a.is_empty()) {
        return true;
    }
    match literal {
        LiteralSide::Right => pattern_eq(a, z),
        LiteralSide::Left => pattern_eq(z, a),
        LiteralSide::Neither => a == z,
    }
}

fn pattern_eq(text: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if pattern.contains('*') {
        return wildcard(text, pattern);
    }
    text == pattern
}

/// Every non-empty segment of `pattern` must occur in `text`.
fn wildcard(text: &str, pattern: &str) -> bool {
    pattern
        .split('*')
        .filter(|s| !s.is_empty())
        .all(|segment| text.contains(segment))
}

fn compare_numbers(op: Operator, kind: Kind, left: &Value<'_>, right: &Value<'_>) -> bool {
    if op == Operator::Eq && (nil_zero(left, right) || nil_zero(right, left)) {
        return true;
    }
    match (to_number(left, kind), to_number(right, kind)) {
        (Some(a), Some(b)) => a.compare(b).is_some_and(|o| op.eval_ordering(o)),
        _ => false,
    }
}

fn nil_zero(literal: &Value<'_>, number: &Value<'_>) -> bool {
    let is_nil = matches!(literal, Value::String(s) if strip_quotes(s).eq_ignore_ascii_case(NIL));
    is_nil && matches!(number, Value::Number(n) if n.is_zero())
}

fn membership(op: Operator, kind: Kind, value: &Value<'_>, members: &[Value<'_>], case: bool) -> bool {
    let found = match kind {
        Kind::String => {
            let a = prepare(value, case);
            members.iter().any(|m| a == prepare(m, case))
        }
        Kind::Int | Kind::Uint | Kind::Float => {
            let parsed: Option<Vec<Number>> = std::iter::once(value)
                .chain(members)
                .map(|v| to_number(v, kind))
                .collect();
            match parsed {
                Some(numbers) => numbers[1..]
                    .iter()
                    .any(|m| numbers[0].compare(*m) == Some(Ordering::Equal)),
                None => return op == Operator::NotIn,
            }
        }
        Kind::Bool => {
            let parsed: Option<Vec<bool>> = std::iter::once(value)
                .chain(members)
                .map(to_bool)
                .collect();
            match parsed {
                Some(bools) => bools[1..].contains(&bools[0]),
                None => return op == Operator::NotIn,
            }
        }
        Kind::Pointer | Kind::Struct => false,
    };
    match op {
        Operator::In => found,
        Operator::NotIn => !found,
        _ => false,
    }
}

/// Splits bracketed list literals (`[a, 'b', c]`) into their members.
fn expand_members<'a>(values: &[Value<'a>]) -> Vec<Value<'a>> {
    let mut members = Vec::new();
    for value in values {
        match value.as_str().and_then(list_items) {
            Some(items) => members.extend(items.map(Value::String)),
            None => members.push(*value),
        }
    }
    members
}

/// Items of a `[a,b,c]` literal, trimmed and unquoted.
pub fn list_items(text: &str) -> Option<impl Iterator<Item = &str>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
    Some(
        inner
            .split(',')
            .map(|item| strip_quotes(item.trim()))
            .filter(|item| !item.is_empty()),
    )
}

fn prepare<'a>(value: &Value<'a>, case: bool) -> Cow<'a, str> {
    let text: Cow<'a, str> = match value {
        Value::String(s) => Cow::Borrowed(strip_quotes(*s)),
        Value::Nil => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    };
    if case {
        text
    } else {
        Cow::Owned(text.to_lowercase())
    }
}

/// Removes one pair of wrapping single quotes.
pub fn strip_quotes(text: &str) -> &str {
    text.strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text)
}

fn to_number(value: &Value<'_>, kind: Kind) -> Option<Number> {
    match value {
        Value::Number(n) => Some(*n),
        Value::String(s) => {
            let s = strip_quotes(s.trim());
            match kind {
                Kind::Float => s.parse::<f64>().ok().map(Number::F64),
                _ => s
                    .parse::<i64>()
                    .map(Number::I64)
                    .or_else(|_| s.parse::<u64>().map(Number::U64))
                    .ok(),
            }
        }
        _ => None,
    }
}

fn to_bool(value: &Value<'_>) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Nil => Some(false),
        Value::String(s) => {
            let s = strip_quotes(s.trim());
            if s.eq_ignore_ascii_case("true") {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case(NIL) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value<'_> {
        Value::String(text)
    }

    fn int(n: i64) -> Value<'static> {
        Value::Number(Number::I64(n))
    }

    fn check(op: Operator, left: &[Value<'_>], right: &str) -> bool {
        compare(op, left, &[s(right)], false).unwrap()
    }

    mod strings {
        use super::*;

        #[test]
        fn equality_ignores_case_and_quotes() {
            assert!(check(Operator::Eq, &[s("Hello")], "hello"));
            assert!(check(Operator::Eq, &[s("hello")], "'HELLO'"));
            assert!(!check(Operator::Eq, &[s("hello")], "world"));
        }

        #[test]
        fn case_sensitive() {
            assert!(!compare(Operator::Eq, &[s("Hello")], &[s("hello")], true).unwrap());
            assert!(compare(Operator::Eq, &[s("Hello")], &[s("Hello")], true).unwrap());
        }

        #[test]
        fn wildcards() {
            assert!(check(Operator::Eq, &[s("hello world")], "hello*"));
            assert!(!check(Operator::Eq, &[s("hello world")], "xyz*"));
            assert!(check(Operator::Eq, &[s("hello world")], "*lo*wor*"));
            assert!(!check(Operator::Eq, &[s("hello world")], "hello*xyz"));
            assert!(check(Operator::Eq, &[s("anything")], "*"));
            assert!(!check(Operator::NotEq, &[s("anything")], "*"));
        }

        #[test]
        fn stars_in_field_data_are_plain_text() {
            assert!(!check(Operator::Eq, &[s("*")], "anything"));
            assert!(check(Operator::NotEq, &[s("*")], "anything"));
            assert!(!check(Operator::Eq, &[s("a*c")], "abc"));
            assert!(check(Operator::Eq, &[s("a*c")], "a*c"));

            let pattern_left = |field: &str, literal: &str| {
                compare_operands(
                    Operator::Eq,
                    &[s(literal)],
                    &[s(field)],
                    false,
                    LiteralSide::Left,
                )
                .unwrap()
            };
            assert!(pattern_left("abc", "a*c"));
            assert!(!pattern_left("a*c", "abc"));

            let fields = |a: &str, b: &str| {
                compare_operands(Operator::Eq, &[s(a)], &[s(b)], false, LiteralSide::Neither)
                    .unwrap()
            };
            assert!(!fields("abc", "*"));
            assert!(fields("a*c", "a*c"));
        }

        #[test]
        fn nil_sentinel() {
            assert!(check(Operator::Eq, &[s("")], "nil"));
            assert!(check(Operator::Eq, &[s("nil")], ""));
            assert!(!check(Operator::Eq, &[s("x")], "nil"));
            assert!(check(Operator::NotEq, &[s("x")], "nil"));
        }

        #[test]
        fn ordering() {
            assert!(check(Operator::Gt, &[s("b")], "a"));
            assert!(check(Operator::LtEq, &[s("A")], "a"));
            assert!(!check(Operator::Lt, &[s("b")], "a"));
        }

        #[test]
        fn fan_out_is_existential() {
            let values = [s("192"), s("193")];
            assert!(check(Operator::Eq, &values, "192"));
            assert!(!check(Operator::Eq, &values, "194"));
            assert!(check(Operator::NotEq, &values, "192"));
        }

        #[test]
        fn membership() {
            assert!(check(Operator::In, &[s("b")], "[a,'B',c]"));
            assert!(!check(Operator::In, &[s("d")], "[a,b,c]"));
            assert!(check(Operator::NotIn, &[s("d")], "[a, b, c]"));
        }
    }

    mod numbers {
        use super::*;

        #[test]
        fn ordering() {
            assert!(check(Operator::Eq, &[int(5)], "5"));
            assert!(check(Operator::Gt, &[int(5)], "4"));
            assert!(check(Operator::GtEq, &[int(5)], "5"));
            assert!(check(Operator::Lt, &[int(-5)], "4"));
            assert!(!check(Operator::NotEq, &[int(5)], "5"));
        }

        #[test]
        fn literal_on_the_left() {
            assert!(compare(Operator::Lt, &[s("3")], &[int(5)], false).unwrap());
            assert!(!compare(Operator::Gt, &[s("3")], &[int(5)], false).unwrap());
        }

        #[test]
        fn nil_is_zero_for_equality() {
            assert!(check(Operator::Eq, &[int(0)], "nil"));
            assert!(!check(Operator::Eq, &[int(1)], "nil"));
            assert!(!check(Operator::NotEq, &[int(1)], "nil"));
        }

        #[test]
        fn unparsable_literal_never_matches() {
            assert!(!check(Operator::Eq, &[int(5)], "five"));
            assert!(!check(Operator::NotEq, &[int(5)], "five"));
            assert!(!check(Operator::Gt, &[int(5)], "five"));
        }

        #[test]
        fn membership_asymmetry() {
            assert!(check(Operator::In, &[int(2)], "[1,2,3]"));
            assert!(!check(Operator::In, &[int(4)], "[1,2,3]"));
            assert!(check(Operator::NotIn, &[int(4)], "[1,2,3]"));
            assert!(!check(Operator::In, &[int(2)], "[1,x,2]"));
            assert!(check(Operator::NotIn, &[int(2)], "[1,x,2]"));
        }

        #[test]
        fn unsigned_and_float() {
            let u = Value::Number(Number::U64(7));
            assert!(check(Operator::Eq, &[u], "7"));
            assert!(!check(Operator::Eq, &[u], "-7"));

            let f = Value::Number(Number::F64(1.5));
            assert!(check(Operator::Gt, &[f], "1.25"));
            assert!(check(Operator::Eq, &[f], "1.5"));
        }
    }

    mod other_kinds {
        use super::*;

        #[test]
        fn bools() {
            assert!(check(Operator::Eq, &[Value::Bool(true)], "TRUE"));
            assert!(check(Operator::NotEq, &[Value::Bool(true)], "false"));
            assert!(check(Operator::Eq, &[Value::Bool(false)], "nil"));
            assert!(!check(Operator::Eq, &[Value::Bool(false)], "maybe"));
            assert!(check(Operator::In, &[Value::Bool(false)], "[false]"));
        }

        #[test]
        fn pointers() {
            assert!(check(Operator::Eq, &[Value::Nil], "nil"));
            assert!(!check(Operator::NotEq, &[Value::Nil], "nil"));
            assert!(!check(Operator::Eq, &[Value::Pointer], "nil"));
            assert!(check(Operator::NotEq, &[Value::Pointer], "nil"));
        }

        #[test]
        fn unsupported() {
            assert_eq!(
                compare(Operator::Gt, &[Value::Bool(true)], &[s("x")], false),
                Err(EvalError::Unsupported {
                    op: Operator::Gt,
                    kind: Kind::Bool
                })
            );
            assert!(compare(Operator::Eq, &[Value::Struct("node")], &[s("x")], false).is_err());
        }

        #[test]
        fn kind_comes_from_the_typed_side() {
            assert_eq!(effective_kind(&[s("1")], &[int(1)]), Kind::Int);
            assert_eq!(effective_kind(&[Value::Nil, s("x")], &[s("y")]), Kind::String);
            assert_eq!(effective_kind(&[Value::Nil], &[s("nil")]), Kind::Pointer);
            assert_eq!(effective_kind(&[s("a")], &[s("b")]), Kind::String);
        }
    }
}
